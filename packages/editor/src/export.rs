//! # Export
//!
//! Turns the live document, or the subtree under the selected block, into a
//! standalone asset for the library.
//!
//! - **Template**: the live document as-is. Imports always remap (or replace
//!   wholesale), so its ids need no rewriting.
//! - **Block**: a fresh minimal document whose root has a single child, the
//!   placeholder id (`main-block` by default), holding a copy of the selected
//!   subtree. Ids below the placeholder are derived from the destination
//!   position (`<parent>-child-<n>`, `<parent>-col<c>-<n>`), so exporting the
//!   same subtree twice yields the same document.
//!
//! Positional ids only have to be unique inside the exported document. This
//! assumes no block payload refers to ids outside its own subtree.
//!
//! Both paths ask the renderer for a preview; a renderer failure leaves the
//! preview empty and the export still succeeds.

use mailblocks_model::{Block, BlockId, ChildSlots, Document, ROOT_ID};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument};

use crate::errors::{EditorError, EditorResult};
use crate::ids::position_id;
use crate::library::AssetKind;
use crate::render::{render_preview, Renderer};
use crate::store::EditorStore;

/// Result of an export, ready to be named and persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAsset {
    pub kind: AssetKind,
    pub document: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_html: Option<String>,
}

/// Export the whole live document as a template
#[instrument(skip_all)]
pub fn export_template(store: &EditorStore, renderer: &dyn Renderer) -> ExportedAsset {
    let document = store.document().clone();
    let preview_html = render_preview(renderer, &document, ROOT_ID);
    info!(blocks = document.len(), has_preview = preview_html.is_some(), "Exported template");

    ExportedAsset {
        kind: AssetKind::Template,
        document,
        preview_html,
    }
}

/// Export the subtree under the selected block as a library block
#[instrument(skip_all, fields(selected = store.selected_block_id()))]
pub fn export_block(store: &EditorStore, renderer: &dyn Renderer) -> EditorResult<ExportedAsset> {
    let selected = store.selected_block_id().ok_or(EditorError::NoSelection)?;
    let document = extract_subtree(
        store.document(),
        selected,
        &store.config().export_placeholder_id,
    )?;
    let preview_html = render_preview(renderer, &document, ROOT_ID);
    info!(blocks = document.len(), has_preview = preview_html.is_some(), "Exported block");

    Ok(ExportedAsset {
        kind: AssetKind::Block,
        document,
        preview_html,
    })
}

/// Copy the subtree at `id` into a standalone document rooted at `placeholder`.
///
/// The new root keeps the source root's type and holds only the placeholder.
/// Dangling children are dropped.
pub fn extract_subtree(source: &Document, id: &str, placeholder: &str) -> EditorResult<Document> {
    if placeholder == ROOT_ID {
        return Err(EditorError::Config(format!(
            "export placeholder id cannot be \"{}\"",
            ROOT_ID
        )));
    }
    if !source.contains(id) {
        return Err(EditorError::BlockNotFound(id.to_string()));
    }

    let mut output = Document::new(source.root().block_type.clone());
    output.root_mut().data.children_ids = Some(vec![placeholder.to_string()]);

    let mut extractor = SubtreeExtractor {
        source,
        output: &mut output,
        remapped: HashMap::new(),
    };
    extractor.copy(id, placeholder.to_string());

    Ok(output)
}

struct SubtreeExtractor<'a> {
    source: &'a Document,
    output: &'a mut Document,
    /// Source id → positional id, so a block reached twice is copied once
    remapped: HashMap<BlockId, BlockId>,
}

impl SubtreeExtractor<'_> {
    fn copy(&mut self, old_id: &str, new_id: BlockId) {
        let Some(block) = self.source.get(old_id) else {
            return;
        };
        self.remapped.insert(old_id.to_string(), new_id.clone());

        let mut copy = block.clone();
        let roles = slot_roles(&copy);
        for (slot, role) in copy.child_slots_mut().into_iter().zip(roles) {
            *slot = self.rewrite(slot, &new_id, &role);
        }

        self.output.insert(new_id, copy);
    }

    fn rewrite(&mut self, children: &[BlockId], parent: &str, role: &str) -> Vec<BlockId> {
        let mut rewritten = Vec::with_capacity(children.len());
        for child in children {
            if let Some(existing) = self.remapped.get(child) {
                rewritten.push(existing.clone());
                continue;
            }
            if !self.source.contains(child) {
                continue;
            }
            let new_child = position_id(parent, role, rewritten.len());
            self.copy(child, new_child.clone());
            rewritten.push(new_child);
        }
        rewritten
    }
}

/// Role name of each child slot, in slot order
fn slot_roles(block: &Block) -> Vec<String> {
    let mut roles = Vec::new();
    if block.data.children_ids.is_some() {
        roles.push("child".to_string());
    }
    if let Some(columns) = &block.data.columns {
        roles.extend((0..columns.len()).map(|c| format!("col{}", c)));
    }
    roles
}
