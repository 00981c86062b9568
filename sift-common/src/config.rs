//! Root folder resolution for sift services

use std::path::{Path, PathBuf};

/// Resolve the root data folder, in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. `root_folder` key in the service TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    app_dir_name: &str,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = root_folder_from_config(app_dir_name) {
        return path;
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder(app_dir_name)
}

/// Read `root_folder` from the platform config file, if present
fn root_folder_from_config(app_dir_name: &str) -> Option<PathBuf> {
    let config_path = dirs::config_dir()?
        .join(app_dir_name)
        .join("config.toml");
    let content = std::fs::read_to_string(&config_path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    let root = value.get("root_folder")?.as_str()?;
    Some(PathBuf::from(root))
}

/// OS-dependent default root folder path
fn default_root_folder(app_dir_name: &str) -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(app_dir_name))
        .unwrap_or_else(|| PathBuf::from(format!("./{app_dir_name}_data")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let root = resolve_root_folder(
            Some(Path::new("/tmp/sift-cli-root")),
            "SIFT_TEST_UNSET_VAR",
            "sift",
        );
        assert_eq!(root, PathBuf::from("/tmp/sift-cli-root"));
    }

    #[test]
    fn falls_back_to_default_without_overrides() {
        let root = resolve_root_folder(None, "SIFT_TEST_UNSET_VAR", "sift-test-app");
        assert!(root.to_string_lossy().contains("sift-test-app"));
    }
}
