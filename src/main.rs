mod app;
mod config;
mod input;
mod logging;
mod render;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
