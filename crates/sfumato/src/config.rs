//! Configuration file loading for sfumato.
//!
//! Reads `sfumato.config.json` from the current working directory, or from
//! the directory given with `--config`. Also ships the JSON Schema for
//! editor autocompletion.

use serde::{Deserialize, Serialize};
use sfumato::canon::TransformOptions;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "sfumato.config.json";

/// Where [`write_schema`] puts the schema, relative to the project directory
pub const SCHEMA_PATH: &str = "node_modules/.sfumato/sfumato.config.schema.json";

/// Top-level sfumato configuration.
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SfumatoConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Template transform configuration.
    #[serde(default)]
    pub transform: TransformOptions,
}

/// Load `sfumato.config.json` from the given directory (or CWD if None).
///
/// A missing file gives the defaults. So does an unreadable or malformed
/// one, with a warning.
pub fn load_config(dir: Option<&Path>) -> SfumatoConfig {
    let config_path = base_dir(dir).join(CONFIG_FILE);

    if !config_path.exists() {
        return SfumatoConfig::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to parse {}: {}", config_path.display(), e);
                SfumatoConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("failed to read {}: {}", config_path.display(), e);
            SfumatoConfig::default()
        }
    }
}

fn base_dir(dir: Option<&Path>) -> PathBuf {
    dir.map(|d| d.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
}

/// Write the JSON Schema to `node_modules/.sfumato/sfumato.config.schema.json`.
pub fn write_schema(dir: Option<&Path>) -> std::io::Result<PathBuf> {
    let schema_path = base_dir(dir).join(SCHEMA_PATH);
    if let Some(parent) = schema_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&schema_path, SFUMATO_CONFIG_SCHEMA)?;
    Ok(schema_path)
}

/// JSON Schema for `sfumato.config.json`.
pub const SFUMATO_CONFIG_SCHEMA: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "title": "Sfumato Configuration",
  "description": "Configuration file for sfumato - language intelligence core for Vue SFCs",
  "type": "object",
  "properties": {
    "$schema": {
      "type": "string",
      "description": "JSON Schema reference for editor autocompletion"
    },
    "transform": {
      "type": "object",
      "description": "Template transform configuration",
      "properties": {
        "componentPath": {
          "type": "string",
          "description": "Import specifier of the component the template belongs to. Defaults to the first <script src>, or ./component.vue."
        },
        "extraGlobals": {
          "type": "array",
          "description": "Names that template expressions read as globals instead of component members.",
          "items": {
            "type": "string",
            "pattern": "^[$A-Za-z_][$0-9A-Za-z_]*$"
          },
          "examples": [["$t", "$d", "$n", "$route", "$router"]]
        }
      },
      "additionalProperties": false
    }
  },
  "additionalProperties": false
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(load_config(Some(dir.path())), SfumatoConfig::default());
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{
              "$schema": "./node_modules/.sfumato/sfumato.config.schema.json",
              "transform": { "extraGlobals": ["$t", "$route"] }
            }"#,
        )
        .expect("write config");

        let config = load_config(Some(dir.path()));
        assert!(config.schema.is_some());
        assert_eq!(config.transform.extra_globals, vec!["$t", "$route"]);
        assert_eq!(config.transform.component_path, None);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join(CONFIG_FILE), "{ transform: ").expect("write config");
        assert_eq!(load_config(Some(dir.path())), SfumatoConfig::default());
    }

    #[test]
    fn test_schema_is_json() {
        let schema: serde_json::Value =
            serde_json::from_str(SFUMATO_CONFIG_SCHEMA).expect("valid schema");
        assert!(schema["properties"]["transform"]["properties"]["extraGlobals"].is_object());
    }

    #[test]
    fn test_write_schema() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_schema(Some(dir.path())).expect("write schema");
        assert_eq!(path, dir.path().join(SCHEMA_PATH));

        let written = std::fs::read_to_string(&path).expect("read schema");
        assert_eq!(written, SFUMATO_CONFIG_SCHEMA);
        // Writing again overwrites in place
        assert!(write_schema(Some(dir.path())).is_ok());
    }
}
