use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::EditorResult;
use crate::history::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_CONFIG_NAME: &str = "mailblocks.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of history snapshots kept (0 = unbounded)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Id given to the exported block inside a library block document
    #[serde(default = "default_export_placeholder_id")]
    pub export_placeholder_id: String,

    /// Root block type of freshly created documents
    #[serde(default = "default_layout_block_type")]
    pub layout_block_type: String,

    /// Block type used when a legacy payload carries no `type`
    #[serde(default = "default_legacy_block_type")]
    pub legacy_block_type: String,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_export_placeholder_id() -> String {
    "main-block".to_string()
}

fn default_layout_block_type() -> String {
    "EmailLayout".to_string()
}

fn default_legacy_block_type() -> String {
    "Html".to_string()
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults when absent
    pub fn load(dir: impl AsRef<Path>) -> EditorResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(EditorConfig::default())
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            export_placeholder_id: default_export_placeholder_id(),
            layout_block_type: default_layout_block_type(),
            legacy_block_type: default_legacy_block_type(),
        }
    }
}
