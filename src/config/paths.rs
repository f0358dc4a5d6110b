// Configuration directory resolution

use std::env;
use std::path::{Path, PathBuf};

/// Configuration file name inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "snes9x.conf";

const APP_DIR: &str = "snes9x";
const LEGACY_DIR: &str = ".snes9x";

/// Resolve the configuration directory from `HOME` and `XDG_CONFIG_HOME`
///
/// An explicit `XDG_CONFIG_HOME` always wins. Otherwise `~/.config/snes9x` is
/// used, unless only the legacy `~/.snes9x` directory exists. With neither
/// variable set the directory is `.snes9x`, relative to the working directory.
pub fn resolve_config_dir(home: Option<&Path>, xdg_config_home: Option<&Path>) -> PathBuf {
    match (home, xdg_config_home) {
        (_, Some(xdg)) => xdg.join(APP_DIR),
        (Some(home), None) => {
            let current = home.join(".config").join(APP_DIR);
            let legacy = home.join(LEGACY_DIR);
            if legacy.is_dir() && !current.exists() {
                legacy
            } else {
                current
            }
        }
        (None, None) => PathBuf::from(LEGACY_DIR),
    }
}

/// Configuration directory for the current process environment
pub fn config_dir_from_env() -> PathBuf {
    let var = |name| env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    resolve_config_dir(var("HOME").as_deref(), var("XDG_CONFIG_HOME").as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_xdg_wins() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir(home.path().join(".snes9x")).unwrap();
        let xdg = Path::new("/xdg");
        assert_eq!(
            resolve_config_dir(Some(home.path()), Some(xdg)),
            xdg.join("snes9x")
        );
    }

    #[test]
    fn test_home_default() {
        let home = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_config_dir(Some(home.path()), None),
            home.path().join(".config/snes9x")
        );
    }

    #[test]
    fn test_legacy_dir_used_when_only_it_exists() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir(home.path().join(".snes9x")).unwrap();
        assert_eq!(
            resolve_config_dir(Some(home.path()), None),
            home.path().join(".snes9x")
        );

        fs::create_dir_all(home.path().join(".config/snes9x")).unwrap();
        assert_eq!(
            resolve_config_dir(Some(home.path()), None),
            home.path().join(".config/snes9x")
        );
    }

    #[test]
    fn test_no_environment() {
        assert_eq!(resolve_config_dir(None, None), PathBuf::from(".snes9x"));
    }
}
