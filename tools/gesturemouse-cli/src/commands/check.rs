//! Validate a configuration file.

use std::path::PathBuf;

use gesturemouse_common::config::{AppConfig, GestureConfig};
use gesturemouse_common::error::GestureError;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("GestureMouse Config Check");
    println!("{}", "=".repeat(50));

    if !path.exists() {
        return Err(GestureError::FileNotFound { path }.into());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid config JSON: {e}"))?;
    println!("[OK] Parsed {}", path.display());

    let issues = clamped_fields(&config.gestures);
    if issues.is_empty() {
        println!("[OK] All gesture parameters in range");
    } else {
        for (field, given, used) in &issues {
            println!("[WARN] {field}: {given} is out of range, {used} will be used");
        }
    }

    let screen_ok = config.screen.width > 0 && config.screen.height > 0;
    if screen_ok {
        println!(
            "[OK] Screen: {}x{}",
            config.screen.width, config.screen.height
        );
    } else {
        println!(
            "[FAIL] Screen: {}x{} (dimensions must be non-zero)",
            config.screen.width, config.screen.height
        );
    }

    println!(
        "[OK] Filter: {:?}{}",
        config.gestures.filter,
        if config.gestures.prediction {
            " with prediction"
        } else {
            ""
        }
    );
    println!("[OK] Log level: {}", config.logging.level);

    println!();
    if !screen_ok {
        anyhow::bail!("Config is not usable");
    }
    if issues.is_empty() {
        println!("Config is valid.");
    } else {
        println!("Config is usable; {} value(s) will be clamped.", issues.len());
    }
    Ok(())
}

/// Fields that clamping would change, as `(name, given, used)`.
pub fn clamped_fields(config: &GestureConfig) -> Vec<(&'static str, String, String)> {
    let clamped = config.clamped();
    let mut issues = Vec::new();

    macro_rules! compare {
        ($($field:ident),* $(,)?) => {
            $(
                if config.$field != clamped.$field {
                    issues.push((
                        stringify!($field),
                        format!("{:?}", config.$field),
                        format!("{:?}", clamped.$field),
                    ));
                }
            )*
        };
    }

    compare!(
        sensitivity,
        smoothing,
        pinch_threshold,
        scroll_threshold,
        scroll_sensitivity,
        click_debounce_ms,
        hold_threshold_ms,
        detection_confidence_min,
        active_area,
    );
    issues
}
