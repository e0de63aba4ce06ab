//! Module for locating the persisted registry file

use std::path::PathBuf;

/// Registry file name inside the config directory
const REGISTRY_FILE: &str = "registry.yaml";

/// Base fallback path to use if one cannot be found with XDG
const FALLBACK_BASE_PATH: &str = "/etc/analoghelm";

/// Returns the base path for configuration data
pub fn get_base_path() -> PathBuf {
    let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("analoghelm") else {
        log::warn!("Unable to determine config base path. Using fallback path.");
        return PathBuf::from(FALLBACK_BASE_PATH);
    };
    base_dirs.get_config_home()
}

/// Returns the default path of the persisted registry file
/// (e.g. "~/.config/analoghelm/registry.yaml")
pub fn get_registry_path() -> PathBuf {
    get_base_path().join(REGISTRY_FILE)
}
