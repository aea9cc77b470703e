//! Configuration for the Wabex exporter.

use crate::constants::{DEFAULT_BRUTE_WORKERS, DEFAULT_MAX_DB, DEFAULT_MAX_IV};
use serde::{Deserialize, Serialize};

/// Exporter-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Working directory for decrypted databases and rendered output
    pub output_dir: String,
    /// Worker count for brute-force offset search
    pub brute_force_workers: usize,
    /// IV offset search bound
    pub max_iv_offset: usize,
    /// Database offset search bound
    pub max_db_offset: usize,
    /// Print the crypt15 key stream in hex after derivation
    pub show_crypt15_key: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: "./wabex_data".to_string(),
            brute_force_workers: DEFAULT_BRUTE_WORKERS,
            max_iv_offset: DEFAULT_MAX_IV,
            max_db_offset: DEFAULT_MAX_DB,
            show_crypt15_key: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_search_bounds() {
        let config = ExportConfig::default();
        assert_eq!(config.brute_force_workers, 10);
        assert_eq!(config.max_iv_offset, 200);
        assert_eq!(config.max_db_offset, 200);
        assert!(!config.show_crypt15_key);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = ExportConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: ExportConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.output_dir, config.output_dir);
        assert_eq!(parsed.brute_force_workers, config.brute_force_workers);
    }
}
