use std::path::PathBuf;

const DATA_DIR_NAME: &str = "attendance-tracker";

/// The configured data dir (with `~` expanded), else the platform data dir.
pub fn resolve_data_dir(configured: Option<&str>) -> Result<PathBuf, String> {
    if let Some(configured) = configured.map(str::trim).filter(|value| !value.is_empty()) {
        return Ok(expand_home(configured));
    }
    dirs::data_dir()
        .map(|base| base.join(DATA_DIR_NAME))
        .ok_or_else(|| "resolve data dir: no data directory on this platform".to_string())
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path {
        "~" => Some(""),
        _ => path.strip_prefix("~/"),
    };
    match (rest, dirs::home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
