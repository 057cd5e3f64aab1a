//! # Document
//!
//! A document is a flat arena of blocks keyed by id. Blocks point at their
//! children by id only, never by owning reference, so copying a subtree under
//! fresh ids is a plain map transformation.
//!
//! ## Invariants
//!
//! - The `root` entry always exists. No operation here removes it.
//! - The graph reachable from `root` is meant to be a tree, but dangling child
//!   ids (and, after corruption, even cycles) are tolerated: every traversal
//!   skips missing ids and visits each id at most once.
//! - Unreferenced entries may linger in the map; they are harmless.
//!
//! ## Persisted shape
//!
//! ```text
//! {
//!   "root": { "type": "EmailLayout", "data": { "childrenIds": ["a"] } },
//!   "a":    { "type": "Text", "data": { "value": "hi" } }
//! }
//! ```

use crate::block::{Block, BlockId, ChildSlots};
use crate::error::{ModelError, ModelResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Reserved id of the top-level layout block
pub const ROOT_ID: &str = "root";

/// Complete id → block map, including the reserved `root` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "IndexMap<BlockId, Block>")]
pub struct Document {
    blocks: IndexMap<BlockId, Block>,
}

/// A child id listed by `parent` that has no entry in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub parent: BlockId,
    pub missing: BlockId,
}

impl Document {
    /// Empty document: a root layout block with no children
    pub fn new(layout_type: impl Into<String>) -> Self {
        let mut blocks = IndexMap::new();
        blocks.insert(ROOT_ID.to_string(), Block::container(layout_type, Vec::new()));
        Self { blocks }
    }

    /// Build from an existing map; fails when `root` is absent
    pub fn from_blocks(blocks: IndexMap<BlockId, Block>) -> ModelResult<Self> {
        if !blocks.contains_key(ROOT_ID) {
            return Err(ModelError::MissingRoot);
        }
        Ok(Self { blocks })
    }

    pub fn from_json(source: &str) -> ModelResult<Self> {
        let blocks: IndexMap<BlockId, Block> = serde_json::from_str(source)?;
        Self::from_blocks(blocks)
    }

    pub fn from_value(value: Value) -> ModelResult<Self> {
        let blocks: IndexMap<BlockId, Block> = serde_json::from_value(value)?;
        Self::from_blocks(blocks)
    }

    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The top-level layout block
    pub fn root(&self) -> &Block {
        // Every constructor checks for root and nothing removes it
        &self.blocks[ROOT_ID]
    }

    pub fn root_mut(&mut self) -> &mut Block {
        &mut self.blocks[ROOT_ID]
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    /// Add or overwrite one entry. Existing keys keep their position.
    pub fn insert(&mut self, id: impl Into<BlockId>, block: Block) -> Option<Block> {
        self.blocks.insert(id.into(), block)
    }

    /// Shallow merge: adds or overwrites every entry of `partial`, prunes nothing
    pub fn merge(&mut self, partial: impl IntoIterator<Item = (BlockId, Block)>) {
        for (id, block) in partial {
            self.blocks.insert(id, block);
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &BlockId> {
        self.blocks.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockId, &Block)> {
        self.blocks.iter()
    }

    pub fn blocks(&self) -> &IndexMap<BlockId, Block> {
        &self.blocks
    }

    pub fn into_blocks(self) -> IndexMap<BlockId, Block> {
        self.blocks
    }

    /// Ids reachable from `from` (inclusive), depth-first pre-order.
    ///
    /// Dangling ids are skipped and each id is yielded once, so a corrupted
    /// graph with a cycle still terminates.
    pub fn reachable_ids(&self, from: &str) -> Vec<BlockId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.collect_reachable(from, &mut visited, &mut order);
        order
    }

    fn collect_reachable<'a>(
        &'a self,
        id: &'a str,
        visited: &mut HashSet<&'a str>,
        order: &mut Vec<BlockId>,
    ) {
        let Some(block) = self.blocks.get(id) else {
            return;
        };
        if !visited.insert(id) {
            return;
        }
        order.push(id.to_string());
        for child in block.child_ids() {
            self.collect_reachable(child, visited, order);
        }
    }

    /// Every child reference whose target has no entry
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        self.blocks
            .iter()
            .flat_map(|(parent, block)| {
                block
                    .child_ids()
                    .into_iter()
                    .filter(|child| !self.blocks.contains_key(child.as_str()))
                    .map(|child| DanglingReference {
                        parent: parent.clone(),
                        missing: child.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Entries not reachable from root
    pub fn orphan_ids(&self) -> Vec<BlockId> {
        let reachable: HashSet<BlockId> = self.reachable_ids(ROOT_ID).into_iter().collect();
        self.blocks
            .keys()
            .filter(|id| !reachable.contains(*id))
            .cloned()
            .collect()
    }

    /// First block listing `id` as a child, in map order
    pub fn parent_of(&self, id: &str) -> Option<&BlockId> {
        self.blocks
            .iter()
            .find(|(_, block)| block.child_ids().iter().any(|child| child.as_str() == id))
            .map(|(parent, _)| parent)
    }

    /// Canonical nested rendering of the subtree at `id`, ignoring concrete ids.
    ///
    /// Two subtrees are structurally isomorphic exactly when their outlines are
    /// equal. Dangling children are omitted; a block reached a second time is
    /// rendered as `null`. Returns `None` when `id` has no entry.
    pub fn subtree_outline(&self, id: &str) -> Option<Value> {
        let mut visited = HashSet::new();
        self.outline(id, &mut visited)
    }

    fn outline<'a>(&'a self, id: &'a str, visited: &mut HashSet<&'a str>) -> Option<Value> {
        let block = self.blocks.get(id)?;
        if !visited.insert(id) {
            return Some(Value::Null);
        }

        let mut node = Map::new();
        node.insert("type".into(), json!(block.block_type));
        node.insert("data".into(), Value::Object(block.data.props.clone()));

        if let Some(children) = &block.data.children_ids {
            let nested: Vec<Value> = children
                .iter()
                .filter_map(|child| self.outline(child, visited))
                .collect();
            node.insert("children".into(), Value::Array(nested));
        }

        if let Some(columns) = &block.data.columns {
            let mut rendered = Vec::with_capacity(columns.len());
            for column in columns {
                let nested: Vec<Value> = column
                    .children_ids
                    .iter()
                    .filter_map(|child| self.outline(child, visited))
                    .collect();
                rendered.push(json!({ "props": column.props, "children": nested }));
            }
            node.insert("columns".into(), Value::Array(rendered));
        }

        Some(Value::Object(node))
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.blocks.serialize(serializer)
    }
}

impl TryFrom<IndexMap<BlockId, Block>> for Document {
    type Error = ModelError;

    fn try_from(blocks: IndexMap<BlockId, Block>) -> Result<Self, Self::Error> {
        Self::from_blocks(blocks)
    }
}

/// A set of id → block entries to merge into a document.
///
/// Unlike [`Document`] a patch has no `root` requirement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch(IndexMap<BlockId, Block>);

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<BlockId>, block: Block) -> &mut Self {
        self.0.insert(id.into(), block);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(BlockId, Block)> for DocumentPatch {
    fn from_iter<I: IntoIterator<Item = (BlockId, Block)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for DocumentPatch {
    type Item = (BlockId, Block);
    type IntoIter = indexmap::map::IntoIter<BlockId, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
