//! Locating and parsing the optional TOML configuration file.

use super::file::ConfigFile;
use crate::core::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default file names probed when no explicit path is given, in order.
const DEFAULT_CONFIG_NAMES: [&str; 2] = ["mailvet.toml", "config.toml"];

/// Loads a configuration file. When `explicit_path` is given, the file must
/// exist and parse; otherwise the default names are probed in the current
/// directory and absence is not an error.
pub fn load_config_file(
    explicit_path: Option<&Path>,
) -> Result<Option<(ConfigFile, String)>> {
    if let Some(path) = explicit_path {
        let file = parse_config_file(path)?;
        info!(target: "config", "Loaded configuration from {}", path.display());
        return Ok(Some((file, path.display().to_string())));
    }

    for name in DEFAULT_CONFIG_NAMES {
        let candidate = PathBuf::from(name);
        if candidate.is_file() {
            match parse_config_file(&candidate) {
                Ok(file) => {
                    info!(target: "config", "Loaded configuration from ./{}", name);
                    return Ok(Some((file, name.to_string())));
                }
                Err(e) => {
                    warn!(target: "config", "Ignoring unreadable ./{}: {}", name, e);
                }
            }
        }
    }

    debug!(target: "config", "No configuration file found, using defaults");
    Ok(None)
}

fn parse_config_file(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&contents).map_err(|e| {
        AppError::Config(format!("cannot parse {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = load_config_file(Some(Path::new("/nonexistent/mailvet.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_path_parses_sections() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "[smtp]\nsmtp_timeout = 7\n\n[proxy]\nproxies = [\"http://127.0.0.1:8080\"]\nrotation_threshold = 3\n"
        )
        .unwrap();

        let (file, path) = load_config_file(Some(tmp.path())).unwrap().unwrap();
        assert_eq!(file.smtp.smtp_timeout, Some(7));
        assert_eq!(file.proxy.rotation_threshold, Some(3));
        assert_eq!(path, tmp.path().display().to_string());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "[smtp]\nnot_a_real_key = true\n").unwrap();
        assert!(load_config_file(Some(tmp.path())).is_err());
    }
}
