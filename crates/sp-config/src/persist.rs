//! Writing the first-run device selection back into the configuration
//! file, so a document that named no devices (or named devices on a
//! machine where they've since been renamed) settles on a fixed choice
//! instead of re-resolving a default every launch.

use std::path::Path;

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};

/// If the document at `path` has no `devices.capture`/`devices.render`
/// name, fill in the ones actually bound this run and write the file back.
/// A no-op (not an error) when both names are already present.
pub fn persist_device_selection(path: &Path, capture: &str, render: &str) -> ConfigResult<()> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::invalid(path.display().to_string(), format!("failed to read configuration file: {e}"))
    })?;
    let mut value: Value = serde_json::from_str(&text)?;

    let devices = value
        .get_mut("devices")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ConfigError::invalid(path.display().to_string(), "missing \"devices\" object"))?;

    let mut changed = false;
    if devices.get("capture").and_then(Value::as_str).is_none() {
        devices.insert("capture".to_string(), Value::String(capture.to_string()));
        changed = true;
    }
    if devices.get("render").and_then(Value::as_str).is_none() {
        devices.insert("render".to_string(), Value::String(render.to_string()));
        changed = true;
    }

    if changed {
        let pretty = serde_json::to_string_pretty(&value)?;
        std::fs::write(path, pretty).map_err(|e| {
            ConfigError::invalid(path.display().to_string(), format!("failed to write configuration file: {e}"))
        })?;
        log::info!("persisted first-run device selection to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_in_missing_device_names_and_rewrites_the_file() {
        let dir = std::env::temp_dir().join(format!("sp-config-persist-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"devices": {}, "outputs": []}"#).unwrap();

        persist_device_selection(&path, "Speakers", "Speakers").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["devices"]["capture"], "Speakers");
        assert_eq!(value["devices"]["render"], "Speakers");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn leaves_an_already_configured_file_untouched() {
        let dir = std::env::temp_dir().join(format!("sp-config-persist-test2-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        let original = r#"{"devices": {"capture": "A", "render": "B"}, "outputs": []}"#;
        std::fs::write(&path, original).unwrap();

        persist_device_selection(&path, "Other", "Other").unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["devices"]["capture"], "A");
        assert_eq!(value["devices"]["render"], "B");

        std::fs::remove_dir_all(&dir).ok();
    }
}
