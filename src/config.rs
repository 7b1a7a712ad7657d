use anyhow::{Context, Result};
use directories::ProjectDirs;
use fishtank::Species;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// How many fish of one species go into a fresh tank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Stock {
    pub(crate) species: Species,
    pub(crate) count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    /// Simulation ticks per second.
    pub(crate) sim_rate: u32,
    pub(crate) tank_width: i32,
    pub(crate) tank_height: i32,
    /// 0 seeds from entropy.
    pub(crate) seed: u64,
    pub(crate) log_filter: String,
    pub(crate) stock: Vec<Stock>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 60,
            sim_rate: 20,
            tank_width: 65,
            tank_height: 30,
            seed: 0,
            log_filter: "info".to_string(),
            stock: [
                Species::top_dweller(),
                Species::mid_dweller(),
                Species::bottom_dweller(),
            ]
            .into_iter()
            .map(|species| Stock { species, count: 5 })
            .collect(),
        }
    }
}

impl Settings {
    pub(crate) fn validate(&self) -> Result<()> {
        for stock in &self.stock {
            stock
                .species
                .validate()
                .with_context(|| format!("bad stock entry for {:?}", stock.species.name))?;
        }
        Ok(())
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "fishtank", "Fishtank")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).with_context(|| format!("could not create {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("fishtank.log"),
    })
}

/// Reads settings. A missing file yields the defaults; a file that exists
/// but does not parse is an error so the caller can report it.
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    let Ok(s) = fs::read_to_string(path) else {
        return Ok(Settings::default());
    };
    serde_json::from_str::<Settings>(&s)
        .with_context(|| format!("could not parse {}", path.display()))
}

/// Moves an unreadable settings file to `<name>.json.bak` so the next save
/// does not clobber it. Returns where it went.
pub(crate) fn set_aside(path: &Path) -> Result<PathBuf> {
    let backup = path.with_extension("json.bak");
    atomic_rename(path, &backup)?;
    Ok(backup)
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("could not write {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename over an existing file is not atomic everywhere
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("could not move {} to {}", from.display(), to.display()))?;
    Ok(())
}
