use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::model::{Dimension, Measure};
use crate::error::ConfigError;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "SUPERSTORE_DASHBOARD_CONFIG";

/// Config file picked up from the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Settings read once at start-up. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset opened at start-up.
    pub data_path: Option<PathBuf>,
    /// Sidebar filters, in cascade order.
    pub dimensions: Vec<Dimension>,
    /// Rows in the entity ranking.
    pub top_n: usize,
    pub entity: Dimension,
    pub rank_measure: Measure,
    pub breakdown_dimension: Dimension,
    pub breakdown_measure: Measure,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            dimensions: Dimension::FILTERS.to_vec(),
            top_n: 10,
            entity: Dimension::Customer,
            rank_measure: Measure::Sales,
            breakdown_dimension: Dimension::Category,
            breakdown_measure: Measure::Sales,
            window_size: [1280.0, 860.0],
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the config from `$SUPERSTORE_DASHBOARD_CONFIG`, then
    /// `./dashboard.json`, then defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(path);
            log::info!("Reading config from {}", path.display());
            return Self::from_file(&path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            log::info!("Reading config from {DEFAULT_CONFIG_FILE}");
            return Self::from_file(local);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(
            &path,
            r#"{ "top_n": 5, "entity": "product", "dimensions": ["category", "sub_category"] }"#,
        )
        .unwrap();

        let cfg = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.entity, Dimension::Product);
        assert_eq!(
            cfg.dimensions,
            vec![Dimension::Category, Dimension::SubCategory]
        );
        assert_eq!(cfg.rank_measure, Measure::Sales);
        assert_eq!(cfg.data_path, None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, "{ top_n: }").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(&path),
            Err(ConfigError::Json { .. })
        ));
    }
}
