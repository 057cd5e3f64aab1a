//! Block id generation.
//!
//! Imported blocks get fresh ids from an [`IdGenerator`]; exported blocks get
//! positional ids that only need to be unique inside the exported document.
//! Collision checks against the live document are done by the importer, not
//! by the generators.

use chrono::Utc;
use mailblocks_model::BlockId;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Source of fresh block ids
pub trait IdGenerator {
    fn next_id(&mut self, block_type: &str) -> BlockId;
}

/// `block-<type>-<unix millis>-<random suffix>`
#[derive(Debug, Clone, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self, block_type: &str) -> BlockId {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        format!(
            "block-{}-{}-{}",
            type_prefix(block_type),
            Utc::now().timestamp_millis(),
            suffix.to_ascii_lowercase()
        )
    }
}

/// Sequential ids sharing one seed
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    seed: String,
    count: u32,
}

impl SequentialIdGenerator {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self, _block_type: &str) -> BlockId {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }
}

/// Deterministic id derived from a position in the destination document
pub fn position_id(parent: &str, role: &str, index: usize) -> BlockId {
    format!("{}-{}-{}", parent, role, index)
}

fn type_prefix(block_type: &str) -> String {
    let prefix: String = block_type
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if prefix.is_empty() {
        "block".to_string()
    } else {
        prefix
    }
}
