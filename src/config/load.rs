//! Load a SWATS specification from YAML

use super::schema::SwatsSpec;
use super::validate::validate_config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Parse and validate a YAML specification
pub fn parse_config(yaml: &str) -> Result<SwatsSpec> {
    let spec: SwatsSpec = serde_yaml::from_str(yaml)
        .map_err(|e| Error::Serialization(format!("Failed to parse YAML config: {}", e)))?;

    validate_config(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {}", e)))?;

    Ok(spec)
}

/// Read, parse and validate a YAML specification file
///
/// # Example
///
/// ```no_run
/// use swats::config::load_config;
///
/// let spec = load_config("swats.yaml")?;
/// println!("Adam lr: {}", spec.optimizer.lr);
/// # Ok::<(), swats::Error>(())
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<SwatsSpec> {
    let path = config_path.as_ref();
    let yaml_content = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let spec = parse_config(&yaml_content)?;
    tracing::debug!(
        "Loaded config {}: adam lr={}, beta2={}, epochs={}",
        path.display(),
        spec.optimizer.lr,
        spec.optimizer.beta2,
        spec.training.epochs
    );
    Ok(spec)
}
