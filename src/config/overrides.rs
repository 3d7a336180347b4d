//! User override files (`.json`, `.toml`, `.yaml`)

use super::ConfigError;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loads an override file into a JSON value, picking the parser by extension
pub fn load_overrides(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    debug!("Loading overrides from {}", path.display());
    parse_overrides(&content, &extension).map_err(|error| match error {
        ParseFailure::Unsupported => ConfigError::UnsupportedFormat(path.to_path_buf()),
        ParseFailure::Invalid(error) => ConfigError::ParseError {
            field: path.display().to_string(),
            error,
        },
    })
}

enum ParseFailure {
    Unsupported,
    Invalid(String),
}

fn parse_overrides(content: &str, extension: &str) -> Result<Value, ParseFailure> {
    let value = match extension {
        "json" => serde_json::from_str::<Value>(content)
            .map_err(|e| ParseFailure::Invalid(e.to_string()))?,
        "toml" => {
            let parsed = toml::from_str::<toml::Value>(content)
                .map_err(|e| ParseFailure::Invalid(e.to_string()))?;
            serde_json::to_value(parsed).map_err(|e| ParseFailure::Invalid(e.to_string()))?
        }
        "yaml" | "yml" => serde_yaml::from_str::<Value>(content)
            .map_err(|e| ParseFailure::Invalid(e.to_string()))?,
        _ => return Err(ParseFailure::Unsupported),
    };

    if !value.is_object() && !value.is_null() {
        return Err(ParseFailure::Invalid(
            "override file must contain a mapping at the top level".to_string(),
        ));
    }
    Ok(value)
}
