use phantom_core::constants::SNAPSHOT_FORMAT_VERSION;
use phantom_core::error::{ConfigError, Result};
use serde_json::Value;

/// Top-level keys of a snapshot document.
const KNOWN_KEYS: [&str; 4] = ["format_version", "name", "volume_manager", "physics_manager"];

/// Validate the outer shape of a snapshot document and return any
/// compatibility warnings.
///
/// A missing version or unknown top-level keys produce warnings. A document
/// that is not an object, or whose version differs, is rejected.
pub fn validate_document(doc: &Value) -> Result<Vec<String>> {
    let map = doc.as_object().ok_or_else(|| {
        ConfigError::SnapshotMalformed("snapshot document must be an object".to_string())
    })?;

    let mut warnings = Vec::new();

    match map.get("format_version") {
        None => warnings.push(format!(
            "Snapshot has no format_version; assuming version {}",
            SNAPSHOT_FORMAT_VERSION
        )),
        Some(v) => match v.as_u64() {
            Some(n) if n == u64::from(SNAPSHOT_FORMAT_VERSION) => {}
            _ => {
                return Err(ConfigError::SnapshotMalformed(format!(
                    "unsupported snapshot format version {} (expected {})",
                    v, SNAPSHOT_FORMAT_VERSION
                )))
            }
        },
    }

    for key in map.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warnings.push(format!("Ignoring unknown snapshot entry '{}'", key));
        }
    }

    Ok(warnings)
}
