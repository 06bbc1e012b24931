use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use radarctl::geometry::{DEFAULT_MARGIN, DEFAULT_MAX_SIDE, SurfaceDimensions, TargetPosition};
use radarctl::sweep::{DEFAULT_INTERVAL, DEFAULT_STEP, DEFAULT_TOLERANCE};
use radarctl::target::TargetPath;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepConfig {
    pub step_degrees: f64,
    pub interval_ms: u64,
    pub detection_tolerance: f64,
}

impl SweepConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            step_degrees: DEFAULT_STEP,
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            detection_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub margin: i32,
    pub max_side: i32,
}

impl SurfaceConfig {
    pub fn fit(&self, viewport_width: i32) -> SurfaceDimensions {
        SurfaceDimensions::fit(viewport_width, self.margin, self.max_side)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            max_side: DEFAULT_MAX_SIDE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub target_image: TargetPath,
    pub asset_dir: Option<PathBuf>,
    /// Only emphasize the target while the sweep passes over it.
    pub detection_gated: bool,
    pub target_position: TargetPosition,
    pub sweep: SweepConfig,
    pub surface: SurfaceConfig,
    pub noise_seed: Option<u64>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "radarscope", "radar").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("RADAR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_setup() -> Config {
    match get_config_path().and_then(|path| Ok((write_default_config(&path)?, path))) {
        Ok((true, path)) => log::info!("Wrote default config to {}", path.display()),
        Ok((false, _)) => {}
        Err(e) => log::warn!("Failed to write default config: {}", e),
    }

    load_config().unwrap_or_else(|e| {
        log::error!("Failed to load config, using defaults: {}", e);
        Config::default()
    })
}

/// Writes the commented default file unless `path` already exists. Returns
/// whether anything was written.
pub fn write_default_config(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, DEFAULT_CONFIG)?;
    Ok(true)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

fn touches_config(event: &notify::Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Sends `ConfigReload` whenever the config file changes on disk.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    if let Err(e) = watch_config(&tx).await {
        log::error!("Config watcher stopped: {}", e);
    }
}

async fn watch_config(tx: &Sender<AppEvent>) -> Result<(), ConfigError> {
    let config_path = get_config_path()?;
    let config_dir = config_path.parent().ok_or(ConfigError::ConfigDirNotFound)?;
    fs_err::create_dir_all(config_dir)?;

    // notify calls back on its own thread
    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(config_dir, RecursiveMode::NonRecursive)?;

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if touches_config(&event, &config_path) => {
                log::debug!("Config file changed: {:?}", event.kind);
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("Watch error: {}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_matches_defaults() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{
            "target_image": "/missing.png",
            "detection_gated": true,
            "sweep": { "interval_ms": 16 }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.target_image, TargetPath::from("/missing.png"));
        assert!(config.detection_gated);
        assert_eq!(config.sweep.interval(), Duration::from_millis(16));
        assert_eq!(config.sweep.step_degrees, 2.0);
        assert_eq!(config.surface, SurfaceConfig::default());
        assert_eq!(config.target_position, TargetPosition::new(0.7, 0.3));
    }

    #[test]
    fn test_surface_fit_uses_configured_limits() {
        let surface = SurfaceConfig {
            margin: 20,
            max_side: 400,
        };
        assert_eq!(surface.fit(1024).width(), 400);
        assert_eq!(surface.fit(300).width(), 280);
    }

    #[test]
    fn test_default_config_written_once() {
        let dir = std::env::temp_dir().join(format!("radar-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");
        let _ = fs_err::remove_dir_all(&dir);

        assert!(write_default_config(&path).unwrap());
        assert_eq!(fs_err::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        fs_err::write(&path, "detection_gated = true\n").unwrap();
        assert!(!write_default_config(&path).unwrap());
        assert_eq!(
            fs_err::read_to_string(&path).unwrap(),
            "detection_gated = true\n"
        );

        let _ = fs_err::remove_dir_all(&dir);
    }

    #[test]
    fn test_watcher_only_reacts_to_config_file() {
        use notify::event::{AccessKind, CreateKind, ModifyKind};

        let config_path = Path::new("/home/user/.config/radar/config.toml");
        let modified = notify::Event::new(EventKind::Modify(ModifyKind::Any)).add_path(config_path.into());
        let created = notify::Event::new(EventKind::Create(CreateKind::File)).add_path(config_path.into());
        let read = notify::Event::new(EventKind::Access(AccessKind::Any)).add_path(config_path.into());
        let sibling = notify::Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/home/user/.config/radar/config.toml.swp"));

        assert!(touches_config(&modified, config_path));
        assert!(touches_config(&created, config_path));
        assert!(!touches_config(&read, config_path));
        assert!(!touches_config(&sibling, config_path));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let sweep = SweepConfig {
            interval_ms: 0,
            ..SweepConfig::default()
        };
        assert_eq!(sweep.interval(), Duration::from_millis(1));
    }
}
