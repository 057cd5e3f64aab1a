//! # Asset Library
//!
//! Reusable templates and blocks, persisted by an external collaborator.
//!
//! The editor core only fixes the asset shape and the order of operations:
//! exports are computed from the live document first and persisted second,
//! and fetched assets are merged through the store like any other edit. A
//! failed library call is returned to the caller and never leaves the live
//! document half-written.

use indexmap::IndexMap;
use mailblocks_model::{BlockId, Document};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::errors::{EditorError, EditorResult};
use crate::export::{export_block, export_template, ExportedAsset};
use crate::ids::IdGenerator;
use crate::import::{import_document, replace_with_blueprint, InsertTarget, ReplaceConfirmation};
use crate::render::Renderer;
use crate::store::EditorStore;

/// What an asset replaces or inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    /// Whole document, applied by replacing the canvas
    Template,
    /// Standalone subtree document, inserted into the canvas
    Block,
}

/// A named, persisted asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryAsset {
    pub id: String,
    pub name: String,
    pub kind: AssetKind,
    pub document: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_html: Option<String>,
}

impl ExportedAsset {
    pub fn into_library_asset(self, id: impl Into<String>, name: impl Into<String>) -> LibraryAsset {
        LibraryAsset {
            id: id.into(),
            name: name.into(),
            kind: self.kind,
            document: self.document,
            preview_html: self.preview_html,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LibraryError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Library unavailable: {0}")]
    Unavailable(String),

    #[error("Asset rejected: {0}")]
    Rejected(String),
}

/// Persistence collaborator for library assets
pub trait Library {
    /// All assets, optionally filtered by kind
    fn list(&self, kind: Option<AssetKind>) -> Result<Vec<LibraryAsset>, LibraryError>;

    fn fetch(&self, id: &str) -> Result<LibraryAsset, LibraryError>;

    /// Insert or overwrite by id
    fn save(&mut self, asset: LibraryAsset) -> Result<(), LibraryError>;

    fn delete(&mut self, id: &str) -> Result<(), LibraryError>;
}

/// In-process library, used by tests and offline sessions
#[derive(Debug, Default)]
pub struct InMemoryLibrary {
    assets: IndexMap<String, LibraryAsset>,
    offline: bool,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`LibraryError::Unavailable`]
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn check_online(&self) -> Result<(), LibraryError> {
        if self.offline {
            return Err(LibraryError::Unavailable("library is offline".to_string()));
        }
        Ok(())
    }
}

impl Library for InMemoryLibrary {
    fn list(&self, kind: Option<AssetKind>) -> Result<Vec<LibraryAsset>, LibraryError> {
        self.check_online()?;
        Ok(self
            .assets
            .values()
            .filter(|asset| kind.map_or(true, |kind| asset.kind == kind))
            .cloned()
            .collect())
    }

    fn fetch(&self, id: &str) -> Result<LibraryAsset, LibraryError> {
        self.check_online()?;
        self.assets
            .get(id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    fn save(&mut self, asset: LibraryAsset) -> Result<(), LibraryError> {
        self.check_online()?;
        if asset.name.trim().is_empty() {
            return Err(LibraryError::Rejected("asset name is empty".to_string()));
        }
        self.assets.insert(asset.id.clone(), asset);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), LibraryError> {
        self.check_online()?;
        self.assets
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }
}

/// Export the whole document and persist it as a template
#[instrument(skip(store, library, renderer))]
pub fn save_template_to_library(
    store: &EditorStore,
    library: &mut dyn Library,
    renderer: &dyn Renderer,
    id: &str,
    name: &str,
) -> EditorResult<LibraryAsset> {
    let asset = export_template(store, renderer).into_library_asset(id, name);
    persist(library, asset)
}

/// Export the selected subtree and persist it as a library block
#[instrument(skip(store, library, renderer))]
pub fn save_block_to_library(
    store: &EditorStore,
    library: &mut dyn Library,
    renderer: &dyn Renderer,
    id: &str,
    name: &str,
) -> EditorResult<LibraryAsset> {
    let asset = export_block(store, renderer)?.into_library_asset(id, name);
    persist(library, asset)
}

fn persist(library: &mut dyn Library, asset: LibraryAsset) -> EditorResult<LibraryAsset> {
    match library.save(asset.clone()) {
        Ok(()) => {
            info!(asset_id = %asset.id, kind = ?asset.kind, "Saved asset to library");
            Ok(asset)
        }
        Err(e) => {
            warn!(asset_id = %asset.id, error = %e, "Saving asset to library failed");
            Err(e.into())
        }
    }
}

/// Fetch a library block and insert a fresh copy of it at `target`
#[instrument(skip(store, library, ids))]
pub fn insert_from_library(
    store: &mut EditorStore,
    library: &dyn Library,
    asset_id: &str,
    target: &InsertTarget,
    ids: &mut dyn IdGenerator,
) -> EditorResult<Option<BlockId>> {
    let asset = library.fetch(asset_id)?;
    if asset.kind != AssetKind::Block {
        return Err(EditorError::AssetKindMismatch {
            expected: AssetKind::Block,
            found: asset.kind,
        });
    }
    import_document(store, &asset.document, target, ids)
}

/// Fetch a template and replace the whole canvas with it
#[instrument(skip(store, library, confirmation))]
pub fn apply_template_from_library(
    store: &mut EditorStore,
    library: &dyn Library,
    asset_id: &str,
    confirmation: ReplaceConfirmation,
) -> EditorResult<()> {
    let asset = library.fetch(asset_id)?;
    if asset.kind != AssetKind::Template {
        return Err(EditorError::AssetKindMismatch {
            expected: AssetKind::Template,
            found: asset.kind,
        });
    }
    replace_with_blueprint(store, &asset.document, confirmation);
    Ok(())
}
