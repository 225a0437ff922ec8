//! Write or print the configuration file.

use std::path::PathBuf;

use gesturemouse_common::config::{config_file_path, smoothing_from_level, AppConfig};

/// Write a default config, optionally with smoothing set from the 1-10 scale.
pub fn init(path: Option<PathBuf>, force: bool, smoothing_level: Option<u8>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = AppConfig::default();
    if let Some(level) = smoothing_level {
        config.gestures.smoothing = smoothing_from_level(level);
    }
    config
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Print the effective configuration as pretty JSON.
pub fn show(config: &AppConfig) -> anyhow::Result<()> {
    let effective = AppConfig {
        gestures: config.gestures.clamped(),
        ..config.clone()
    };
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = std::env::temp_dir().join("gesturemouse_test_config_init");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        init(Some(path.clone()), false, None).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());
        assert!(init(Some(path.clone()), false, None).is_err());
        init(Some(path), true, None).unwrap();

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_init_applies_smoothing_level() {
        let dir = std::env::temp_dir().join("gesturemouse_test_config_level");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        init(Some(path.clone()), false, Some(1)).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap().gestures.smoothing, 0.0);
        init(Some(path.clone()), true, Some(10)).unwrap();
        let smoothing = AppConfig::load_from(&path).unwrap().gestures.smoothing;
        assert!((smoothing - 0.9).abs() < 1e-9);

        std::fs::remove_dir_all(&dir).ok();
    }
}
