use crate::config::{load_settings, project_paths, save_settings_atomic, set_aside, Paths, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_action, Action};
use crate::logging;
use crate::render::{draw_content, draw_hud, draw_tank_walls, Hud, Terminal};
use anyhow::Context;
use fishtank::{Aquarium, Position};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

// Rows of water at the top where sprinkled food lands.
const SURFACE_ROWS: i32 = 3;

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    tank: Aquarium,
    rng: StdRng,
    term: Terminal,
    paused: bool,
    should_quit: bool,
    full_redraw: bool,
    // False when the settings file could not be read or moved aside.
    write_back: bool,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let (settings, bad_settings) = match load_settings(&paths.settings_path) {
            Ok(settings) => (settings, None),
            Err(err) => (Settings::default(), Some(err)),
        };
        logging::init(&paths.log_path, &settings.log_filter)?;
        let mut write_back = true;
        if let Some(err) = bad_settings {
            match set_aside(&paths.settings_path) {
                Ok(backup) => warn!(
                    "{err:#}; using defaults, kept the old file as {}",
                    backup.display()
                ),
                Err(move_err) => {
                    warn!("{err:#}; using defaults and leaving the file alone ({move_err:#})");
                    write_back = false;
                }
            }
        }
        settings.validate()?;

        let (cols, rows) = crossterm::terminal::size().context("could not read terminal size")?;
        let origin = tank_origin(cols, rows, settings.tank_width, settings.tank_height);
        let mut tank = if settings.seed == 0 {
            Aquarium::new(origin, settings.tank_width, settings.tank_height)
        } else {
            Aquarium::seeded(
                origin,
                settings.tank_width,
                settings.tank_height,
                settings.seed,
            )
        }
        .context("could not build the tank")?;

        for stock in &settings.stock {
            for _ in 0..stock.count {
                tank.spawn_fish(&stock.species);
            }
        }
        info!(fish = tank.fish().count(), "tank stocked");

        let rng = if settings.seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(settings.seed ^ 0x5EED)
        };

        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            paths,
            tank,
            rng,
            term,
            paused: false,
            should_quit: false,
            full_redraw: true,
            write_back,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let sim_step = Duration::from_secs_f32(1.0 / self.settings.sim_rate.clamp(1, 240) as f32);

        let mut last_frame = Instant::now();
        let mut sim_accum = Duration::ZERO;

        while !self.should_quit {
            if self.term.resize_if_needed()? {
                self.recenter();
            }

            // input
            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(&ev) {
                    self.apply(action);
                }
                if self.should_quit {
                    break;
                }
            }

            // sim fixed-step
            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            if self.paused {
                sim_accum = Duration::ZERO;
            } else {
                sim_accum = sim_accum.saturating_add(real_dt);
            }
            while sim_accum >= sim_step {
                self.tank.update();
                sim_accum = sim_accum.saturating_sub(sim_step);
            }

            self.render_frame()?;

            // frame cap
            spin_sleep(frame_dt, now);
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePause => {
                self.paused = !self.paused;
                debug!(paused = self.paused, "pause toggled");
            }
            Action::ClearFood => self.tank.clear_food(),
            Action::SprinkleFood => {
                let origin = self.tank.origin();
                let x = self.rng.gen_range(0..self.tank.width());
                let y = self.rng.gen_range(0..SURFACE_ROWS.min(self.tank.height()));
                self.tank.drop_food(origin + Position::new(x, y));
            }
            Action::FeedAt { col, row } => {
                if let Some(position) = tank_cell(&self.tank, col, row) {
                    self.tank.drop_food(position);
                }
            }
            Action::Redraw => self.full_redraw = true,
        }
    }

    fn recenter(&mut self) {
        let origin = tank_origin(
            self.term.cols,
            self.term.rows,
            self.tank.width(),
            self.tank.height(),
        );
        self.tank.translate(origin);
        self.full_redraw = true;
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        self.term.cur.clear();
        draw_tank_walls(
            &mut self.term.cur,
            self.tank.origin(),
            self.tank.width(),
            self.tank.height(),
        );
        draw_content(&mut self.term.cur, &self.tank.get_content());
        draw_hud(
            &mut self.term.cur,
            &Hud {
                fish: self.tank.fish().count(),
                food: self.tank.food().count(),
                ticks: self.tank.ticks(),
                paused: self.paused,
            },
        );

        let diff_only = !std::mem::take(&mut self.full_redraw);
        self.term.present(diff_only)?;
        Ok(())
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        self.term.end()?;
        if self.write_back {
            save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        }
        info!(ticks = self.tank.ticks(), "bye");
        Ok(())
    }
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    let result = app.run();
    if let Err(err) = app.shutdown() {
        error!("could not shut down cleanly: {err:#}");
        if result.is_ok() {
            return Err(err);
        }
    }
    result
}

/// Where the tank interior starts so the framed tank sits in the middle of
/// the screen, above the HUD row.
pub(crate) fn tank_origin(cols: u16, rows: u16, width: i32, height: i32) -> Position {
    let framed_w = width + 4;
    let framed_h = height + 2;
    let usable_rows = rows as i32 - 1;
    Position::new(
        ((cols as i32 - framed_w) / 2).max(0) + 2,
        ((usable_rows - framed_h) / 2).max(0) + 1,
    )
}

/// Maps a screen cell to a tank position if it lies inside the interior.
pub(crate) fn tank_cell(tank: &Aquarium, col: u16, row: u16) -> Option<Position> {
    let p = Position::new(col as i32, row as i32);
    let rel = p - tank.origin();
    ((0..tank.width()).contains(&rel.x) && (0..tank.height()).contains(&rel.y)).then_some(p)
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
