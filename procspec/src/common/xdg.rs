//! XDG Base Directory lookup for procspec

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "procspec";

/// Get XDG config directory for procspec
/// Falls back to ~/.config/procspec if XDG_CONFIG_HOME is not set
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg_config) if !xdg_config.is_empty() => PathBuf::from(xdg_config).join(APP_DIR),
        _ => match dirs::home_dir() {
            Some(home) => home.join(".config").join(APP_DIR),
            None => PathBuf::from(".config").join(APP_DIR),
        },
    }
}

/// Path of the settings file
pub fn get_config_file() -> PathBuf {
    get_config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_dir_with_xdg() {
        env::set_var("XDG_CONFIG_HOME", "/custom/config");
        assert_eq!(get_config_dir(), PathBuf::from("/custom/config/procspec"));
        assert_eq!(
            get_config_file(),
            PathBuf::from("/custom/config/procspec/config.toml")
        );
        env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    #[serial]
    fn test_config_dir_empty_xdg_falls_back() {
        env::set_var("XDG_CONFIG_HOME", "");
        let dir = get_config_dir();
        assert!(dir.ends_with(".config/procspec"));
        env::remove_var("XDG_CONFIG_HOME");
    }
}
