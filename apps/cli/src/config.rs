use std::fs;
use std::path::{Path, PathBuf};

use attendance_core::LeaveOverlapPolicy;
use serde::{Deserialize, Serialize};

const CONFIG_DIR_NAME: &str = "attendance-tracker";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_PORT: u16 = 3845;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub port: u16,
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    pub reconcile_interval_secs: u64,
    pub leave_overlap: LeaveOverlapPolicy,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            data_dir: None,
            reconcile_interval_secs: DEFAULT_RECONCILE_INTERVAL_SECS,
            leave_overlap: LeaveOverlapPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub paths: ConfigPaths,
    pub created: bool,
}

pub fn load_or_create() -> Result<ConfigLoad, String> {
    load_or_create_in(&config_dir()?)
}

fn load_or_create_in(dir: &Path) -> Result<ConfigLoad, String> {
    fs::create_dir_all(dir)
        .map_err(|err| format!("create config dir {}: {}", dir.display(), err))?;
    let file = dir.join(CONFIG_FILE_NAME);
    let paths = ConfigPaths { file };

    if paths.file.exists() {
        let contents = fs::read_to_string(&paths.file)
            .map_err(|err| format!("read config {}: {}", paths.file.display(), err))?;
        let config: CliConfig = toml::from_str(&contents)
            .map_err(|err| format!("parse config {}: {}", paths.file.display(), err))?;
        if config.reconcile_interval_secs == 0 {
            return Err(format!(
                "parse config {}: reconcile_interval_secs must be positive",
                paths.file.display()
            ));
        }
        return Ok(ConfigLoad {
            config,
            paths,
            created: false,
        });
    }

    let config = CliConfig::default();
    let contents =
        toml::to_string_pretty(&config).map_err(|err| format!("serialize config: {}", err))?;
    fs::write(&paths.file, contents)
        .map_err(|err| format!("write config {}: {}", paths.file.display(), err))?;

    Ok(ConfigLoad {
        config,
        paths,
        created: true,
    })
}

fn config_dir() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|base| base.join(CONFIG_DIR_NAME))
        .ok_or_else(|| "resolve config dir: no config directory on this platform".to_string())
}
