//! # Blocks
//!
//! A block is one node of the email layout graph. Its id is the key it is
//! stored under in a [`Document`](crate::Document); the block itself only
//! carries a type tag and a type-specific payload.
//!
//! Only two payload fields mean anything to the editor core:
//!
//! - `childrenIds`: ordered ids of the block's direct children
//! - `columns`: ordered columns, each holding its own `childrenIds`
//!
//! Everything else in the payload is kept verbatim so that block types the
//! core knows nothing about survive a load → edit → save cycle untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque block identifier (the key of the block in its document)
pub type BlockId = String;

/// A node in the document graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Tag selecting the render/behaviour variant (e.g. "Text", "ColumnsContainer")
    #[serde(rename = "type")]
    pub block_type: String,

    /// Type-specific payload
    #[serde(default)]
    pub data: BlockData,
}

/// Block payload: the two child-referencing shapes plus opaque fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockData {
    /// Direct linear children
    #[serde(rename = "childrenIds", default, skip_serializing_if = "Option::is_none")]
    pub children_ids: Option<Vec<BlockId>>,

    /// Per-column children (multi-column containers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,

    /// Every other payload field, untouched
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

/// A slot inside a multi-column container
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "childrenIds", default)]
    pub children_ids: Vec<BlockId>,

    /// Column-level styling metadata
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl Block {
    /// Leaf block with an empty payload
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            data: BlockData::default(),
        }
    }

    /// Block holding a linear child list
    pub fn container(block_type: impl Into<String>, children: Vec<BlockId>) -> Self {
        Self {
            block_type: block_type.into(),
            data: BlockData {
                children_ids: Some(children),
                ..BlockData::default()
            },
        }
    }

    /// Multi-column block
    pub fn with_columns(block_type: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            block_type: block_type.into(),
            data: BlockData {
                columns: Some(columns),
                ..BlockData::default()
            },
        }
    }

    /// Set an opaque payload field
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.props.insert(key.into(), value);
        self
    }

    /// Read an opaque payload field
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.data.props.get(key)
    }
}

impl Column {
    pub fn new(children: Vec<BlockId>) -> Self {
        Self {
            children_ids: children,
            props: Map::new(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }
}

/// Uniform access to every ordered child list a block owns.
///
/// Slots are reported in a fixed order: the linear `childrenIds` list first,
/// then each column's list in column order. Anything that walks or rewrites
/// the graph goes through this trait instead of matching on payload shapes.
pub trait ChildSlots {
    /// Every child list, in slot order
    fn child_slots(&self) -> Vec<&[BlockId]>;

    /// Mutable access to every child list, in slot order
    fn child_slots_mut(&mut self) -> Vec<&mut Vec<BlockId>>;

    /// All child ids, flattened in slot order
    fn child_ids(&self) -> Vec<&BlockId> {
        self.child_slots().into_iter().flatten().collect()
    }

    /// Whether the block can hold children at all
    fn has_child_slots(&self) -> bool {
        !self.child_slots().is_empty()
    }
}

impl ChildSlots for BlockData {
    fn child_slots(&self) -> Vec<&[BlockId]> {
        let mut slots = Vec::new();
        if let Some(children) = &self.children_ids {
            slots.push(children.as_slice());
        }
        if let Some(columns) = &self.columns {
            slots.extend(columns.iter().map(|column| column.children_ids.as_slice()));
        }
        slots
    }

    fn child_slots_mut(&mut self) -> Vec<&mut Vec<BlockId>> {
        let mut slots = Vec::new();
        if let Some(children) = &mut self.children_ids {
            slots.push(children);
        }
        if let Some(columns) = &mut self.columns {
            slots.extend(columns.iter_mut().map(|column| &mut column.children_ids));
        }
        slots
    }
}

impl ChildSlots for Block {
    fn child_slots(&self) -> Vec<&[BlockId]> {
        self.data.child_slots()
    }

    fn child_slots_mut(&mut self) -> Vec<&mut Vec<BlockId>> {
        self.data.child_slots_mut()
    }
}
