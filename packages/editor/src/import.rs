//! # Subtree Import
//!
//! Merges foreign block graphs (library blocks, pasted payloads) into the live
//! document.
//!
//! ## Algorithm
//!
//! Depth-first and memoised on the foreign id:
//!
//! 1. Resolving an already-mapped id returns its new id
//! 2. Otherwise a fresh id is drawn (never equal to an id in the live
//!    document or one drawn earlier in the same import), recorded, and the
//!    block is cloned
//! 3. Every child slot of the clone is rewritten to resolved ids; ids with no
//!    entry in the foreign map are dropped
//! 4. The copy is staged under its new id
//!
//! The memo makes each foreign id resolve once, and absent ids are never
//! followed, so the walk terminates even on corrupted input. All staged
//! blocks plus the updated insertion target go into the store in a single
//! `set_document` call: one history entry per import, and nothing is written
//! when the import fails validation.
//!
//! ## Payload shapes
//!
//! - **Graph**: an object with a block-shaped `root` entry. The subtree
//!   hanging off the root's first child is imported.
//! - **Legacy**: anything else that is a JSON object. It becomes one block
//!   under a fresh id, payload kept verbatim, no remapping. Non-object
//!   payloads are rejected.
//!
//! Whole-template "blueprint" replacement does not merge at all; see
//! [`replace_with_blueprint`].

use indexmap::IndexMap;
use mailblocks_model::{
    Block, BlockData, BlockId, ChildSlots, Column, Document, DocumentPatch, ROOT_ID,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

use crate::errors::{EditorError, EditorResult};
use crate::ids::IdGenerator;
use crate::store::EditorStore;

/// Fresh-id draws before falling back to numbered suffixes
const MAX_FRESH_ATTEMPTS: usize = 8;

/// Where an imported block is appended
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InsertTarget {
    /// The root layout's `childrenIds`
    #[default]
    Root,
    /// A block's linear `childrenIds`
    Children(BlockId),
    /// One column of a multi-column block
    Column { block: BlockId, column: usize },
}

impl InsertTarget {
    fn block_id(&self) -> &str {
        match self {
            InsertTarget::Root => ROOT_ID,
            InsertTarget::Children(id) => id,
            InsertTarget::Column { block, .. } => block,
        }
    }

    /// Copy of the live target block with `new_id` appended to the right list
    fn append(&self, document: &Document, new_id: BlockId) -> EditorResult<Block> {
        let id = self.block_id();
        let mut block = document
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::BlockNotFound(id.to_string()))?;

        match self {
            InsertTarget::Root => {
                block.data.children_ids.get_or_insert_with(Vec::new).push(new_id);
            }
            InsertTarget::Children(block_id) => {
                block
                    .data
                    .children_ids
                    .as_mut()
                    .ok_or_else(|| EditorError::NotAContainer(block_id.clone()))?
                    .push(new_id);
            }
            InsertTarget::Column { block: block_id, column } => {
                let slot = block
                    .data
                    .columns
                    .as_mut()
                    .and_then(|columns| columns.get_mut(*column))
                    .ok_or_else(|| EditorError::ColumnNotFound {
                        block: block_id.clone(),
                        column: *column,
                    })?;
                slot.children_ids.push(new_id);
            }
        }
        Ok(block)
    }

    fn validate(&self, document: &Document) -> EditorResult<()> {
        self.append(document, BlockId::new()).map(|_| ())
    }
}

/// A foreign payload, classified by shape
#[derive(Debug, Clone, PartialEq)]
pub enum ImportPayload {
    /// Multi-entry graph; `entry` is the root's first child, if any
    Graph {
        document: Document,
        entry: Option<BlockId>,
    },
    /// Legacy single block, inserted verbatim
    Single(Block),
}

impl ImportPayload {
    /// Classify a raw JSON payload. Only non-object payloads are rejected.
    pub fn classify(value: Value, legacy_block_type: &str) -> EditorResult<Self> {
        let Value::Object(map) = value else {
            return Err(EditorError::MalformedPayload(
                "expected a JSON object".to_string(),
            ));
        };

        if map.get(ROOT_ID).is_some_and(is_block_shaped) {
            match Document::from_value(Value::Object(map.clone())) {
                Ok(document) => {
                    let entry = document.root().child_ids().first().map(|id| id.to_string());
                    return Ok(ImportPayload::Graph { document, entry });
                }
                Err(e) => {
                    debug!(error = %e, "Root-shaped payload is not a document - wrapping as legacy block");
                }
            }
        }

        Ok(ImportPayload::Single(legacy_block(map, legacy_block_type)))
    }
}

fn is_block_shaped(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string)
}

fn legacy_block(mut map: Map<String, Value>, legacy_block_type: &str) -> Block {
    let declared_type = map.get("type").and_then(Value::as_str).map(str::to_string);

    let data = match (declared_type.is_some(), map.remove("data")) {
        (_, Some(Value::Object(data))) => data,
        (true, _) => Map::new(),
        (false, Some(other)) => {
            map.insert("data".to_string(), other);
            map
        }
        (false, None) => map,
    };

    Block {
        block_type: declared_type.unwrap_or_else(|| legacy_block_type.to_string()),
        data: legacy_data(data),
    }
}

/// Split a raw payload object into typed child slots and opaque fields.
///
/// Child slots of the wrong shape are dropped, so the block always
/// serializes back into a loadable document.
fn legacy_data(mut props: Map<String, Value>) -> BlockData {
    let children_ids = take_slot::<Vec<BlockId>>(&mut props, "childrenIds");
    let columns = take_slot::<Vec<Column>>(&mut props, "columns");
    BlockData {
        children_ids,
        columns,
        props,
    }
}

fn take_slot<T: DeserializeOwned>(props: &mut Map<String, Value>, key: &str) -> Option<T> {
    let raw = props.remove(key)?;
    match serde_json::from_value(raw) {
        Ok(slot) => Some(slot),
        Err(e) => {
            warn!(key, error = %e, "Dropping malformed child slot from legacy payload");
            None
        }
    }
}

/// Memoised subtree copier
struct SubtreeImporter<'a> {
    foreign: &'a IndexMap<BlockId, Block>,
    live: &'a Document,
    ids: &'a mut dyn IdGenerator,
    remapped: HashMap<BlockId, BlockId>,
    generated: HashSet<BlockId>,
    staged: DocumentPatch,
}

impl<'a> SubtreeImporter<'a> {
    fn new(
        foreign: &'a IndexMap<BlockId, Block>,
        live: &'a Document,
        ids: &'a mut dyn IdGenerator,
    ) -> Self {
        Self {
            foreign,
            live,
            ids,
            remapped: HashMap::new(),
            generated: HashSet::new(),
            staged: DocumentPatch::new(),
        }
    }

    /// New id for `old_id`, copying its subtree on first visit.
    /// `None` when `old_id` has no entry in the foreign map.
    fn resolve(&mut self, old_id: &str) -> Option<BlockId> {
        if let Some(new_id) = self.remapped.get(old_id) {
            return Some(new_id.clone());
        }

        let foreign = self.foreign;
        let block = foreign.get(old_id)?;
        let new_id = self.fresh_id(&block.block_type);
        self.remapped.insert(old_id.to_string(), new_id.clone());

        let mut copy = block.clone();
        for slot in copy.child_slots_mut() {
            *slot = slot.iter().filter_map(|child| self.resolve(child)).collect();
        }

        self.staged.insert(new_id.clone(), copy);
        Some(new_id)
    }

    fn fresh_id(&mut self, block_type: &str) -> BlockId {
        let mut candidate = self.ids.next_id(block_type);
        let mut attempts = 1;
        while self.is_taken(&candidate) && attempts < MAX_FRESH_ATTEMPTS {
            candidate = self.ids.next_id(block_type);
            attempts += 1;
        }

        let base = candidate.clone();
        let mut suffix = 1;
        while self.is_taken(&candidate) {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        self.generated.insert(candidate.clone());
        candidate
    }

    fn is_taken(&self, id: &str) -> bool {
        id == ROOT_ID || self.live.contains(id) || self.generated.contains(id)
    }
}

/// Copy the subtree at `entry` of `foreign` into the store under fresh ids
/// and append its new id to `target`.
///
/// Returns the new id of the copied entry, or `None` (with no mutation) when
/// `entry` has no block in `foreign`.
#[instrument(skip(store, foreign, ids), fields(foreign_blocks = foreign.len()))]
pub fn import_subtree(
    store: &mut EditorStore,
    foreign: &IndexMap<BlockId, Block>,
    entry: &str,
    target: &InsertTarget,
    ids: &mut dyn IdGenerator,
) -> EditorResult<Option<BlockId>> {
    let live = store.document();
    target.validate(live)?;

    if !foreign.contains_key(entry) {
        warn!(entry, "Import entry has no block in payload - nothing to insert");
        return Ok(None);
    }

    let mut importer = SubtreeImporter::new(foreign, live, ids);
    let Some(new_id) = importer.resolve(entry) else {
        return Ok(None);
    };
    let mut staged = importer.staged;

    let updated_target = target.append(live, new_id.clone())?;
    staged.insert(target.block_id().to_string(), updated_target);

    info!(new_id = %new_id, copied = staged.len() - 1, "Imported subtree");
    store.set_document(staged);
    Ok(Some(new_id))
}

/// Insert a single block verbatim under a fresh id (legacy payloads)
#[instrument(skip(store, block, ids), fields(block_type = %block.block_type))]
pub fn import_block(
    store: &mut EditorStore,
    block: Block,
    target: &InsertTarget,
    ids: &mut dyn IdGenerator,
) -> EditorResult<BlockId> {
    let live = store.document();
    target.validate(live)?;

    let empty = IndexMap::new();
    let mut importer = SubtreeImporter::new(&empty, live, ids);
    let new_id = importer.fresh_id(&block.block_type);

    let mut staged = DocumentPatch::new();
    staged.insert(new_id.clone(), block);
    staged.insert(target.block_id().to_string(), target.append(live, new_id.clone())?);

    info!(new_id = %new_id, "Imported legacy block");
    store.set_document(staged);
    Ok(new_id)
}

/// Import a library-block document: the subtree under its root's first child
pub fn import_document(
    store: &mut EditorStore,
    document: &Document,
    target: &InsertTarget,
    ids: &mut dyn IdGenerator,
) -> EditorResult<Option<BlockId>> {
    let entries = document.root().child_ids();
    let Some(entry) = entries.first().map(|id| id.to_string()) else {
        warn!("Payload root has no children - nothing to insert");
        return Ok(None);
    };
    if entries.len() > 1 {
        warn!(
            entry = %entry,
            dropped = entries.len() - 1,
            "Payload root has several children - importing only the first"
        );
    }
    import_subtree(store, document.blocks(), &entry, target, ids)
}

/// Classify a raw JSON payload and import it
pub fn import_payload(
    store: &mut EditorStore,
    payload: Value,
    target: &InsertTarget,
    ids: &mut dyn IdGenerator,
) -> EditorResult<Option<BlockId>> {
    let legacy_type = store.config().legacy_block_type.clone();
    match ImportPayload::classify(payload, &legacy_type)? {
        ImportPayload::Graph { document, .. } => import_document(store, &document, target, ids),
        ImportPayload::Single(block) => import_block(store, block, target, ids).map(Some),
    }
}

/// Proof that the user confirmed a destructive whole-document replace
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct ReplaceConfirmation {
    _private: (),
}

impl ReplaceConfirmation {
    /// Only call once the user has explicitly agreed to lose the current canvas
    pub fn confirmed() -> Self {
        Self { _private: () }
    }
}

/// Replace the whole document with a template ("blueprint").
///
/// No merge is attempted; the template is assumed self-consistent. The
/// replace is an ordinary recorded edit, so undo brings the old canvas back.
#[instrument(skip_all, fields(blocks = blueprint.len()))]
pub fn replace_with_blueprint(
    store: &mut EditorStore,
    blueprint: &Document,
    _confirmation: ReplaceConfirmation,
) {
    store.replace_document(blueprint.clone());
    store.set_selected_block_id(None);
}
