//! Integration tests for the editor crate

use mailblocks_editor::{
    export_block, export_template, import_document, import_payload, import_subtree, Block, Column,
    Document, EditorConfig, EditorStore, InsertTarget, RandomIdGenerator, RenderError,
    SequentialIdGenerator, ROOT_ID,
};
use serde_json::json;
use std::collections::HashSet;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn renderer(_: &Document, root: &str) -> Result<String, RenderError> {
    Ok(format!("<div id=\"{}\"></div>", root))
}

fn newsletter() -> Document {
    Document::from_value(json!({
        "root": { "type": "EmailLayout", "data": { "backdropColor": "#eee", "childrenIds": ["heading", "cols"] } },
        "heading": { "type": "Heading", "data": { "text": "Weekly" } },
        "cols": {
            "type": "ColumnsContainer",
            "data": {
                "columnsCount": 2,
                "columns": [
                    { "childrenIds": ["card", "missing"] },
                    { "childrenIds": ["button"] }
                ]
            }
        },
        "card": { "type": "Container", "data": { "childrenIds": ["image", "caption"] } },
        "image": { "type": "Image", "data": { "url": "https://example.com/a.png" } },
        "caption": { "type": "Text", "data": { "text": "Caption" } },
        "button": { "type": "Button", "data": { "text": "Read more" } }
    }))
    .unwrap()
}

/// Ids of every block reachable from `id`, including `id`
fn subtree_ids(document: &Document, id: &str) -> HashSet<String> {
    document.reachable_ids(id).into_iter().collect()
}

#[test]
fn test_main_block_round_trip() -> anyhow::Result<()> {
    init_tracing();
    let original = Document::from_value(json!({
        "root": { "type": "layout", "data": { "childrenIds": ["A"] } },
        "A": { "type": "Text", "data": { "value": "hi" } }
    }))?;
    let mut store = EditorStore::with_document(original, EditorConfig::default());

    store.set_selected_block_id(Some("A".into()));
    let exported = export_block(&store, &renderer)?;
    let expected = Document::from_value(json!({
        "root": { "type": "layout", "data": { "childrenIds": ["main-block"] } },
        "main-block": { "type": "Text", "data": { "value": "hi" } }
    }))?;
    assert_eq!(exported.document, expected);

    let new_id = import_document(
        &mut store,
        &exported.document,
        &InsertTarget::Root,
        &mut RandomIdGenerator::new(),
    )?
    .expect("entry block");

    let root_children = store.document().root().data.children_ids.clone().unwrap_or_default();
    assert_eq!(root_children, vec!["A".to_string(), new_id.clone()]);
    assert_eq!(store.document().get(&new_id).unwrap().prop("value"), Some(&json!("hi")));
    assert!(!["A", "root", "main-block"].contains(&new_id.as_str()));
    Ok(())
}

#[test]
fn test_export_then_import_is_isomorphic() -> anyhow::Result<()> {
    init_tracing();
    let source = newsletter();
    let mut editing = EditorStore::with_document(source.clone(), EditorConfig::default());

    for id in source.reachable_ids(ROOT_ID).into_iter().filter(|id| id != ROOT_ID) {
        editing.set_selected_block_id(Some(id.clone()));
        let exported = export_block(&editing, &renderer)?;

        let mut fresh = EditorStore::new(EditorConfig::default());
        let new_id = import_document(
            &mut fresh,
            &exported.document,
            &InsertTarget::Root,
            &mut RandomIdGenerator::new(),
        )?
        .expect("entry block");

        assert_eq!(
            fresh.document().subtree_outline(&new_id),
            source.subtree_outline(&id),
            "subtree of {} changed shape",
            id
        );
    }
    Ok(())
}

#[test]
fn test_double_import_is_id_disjoint() -> anyhow::Result<()> {
    init_tracing();
    let mut store = EditorStore::with_document(newsletter(), EditorConfig::default());
    store.set_selected_block_id(Some("cols".into()));
    let exported = export_block(&store, &renderer)?;
    let existing: HashSet<String> = store.document().ids().cloned().collect();

    let mut ids = RandomIdGenerator::new();
    let first = import_document(&mut store, &exported.document, &InsertTarget::Root, &mut ids)?
        .expect("entry block");
    let second = import_document(&mut store, &exported.document, &InsertTarget::Root, &mut ids)?
        .expect("entry block");

    let first_ids = subtree_ids(store.document(), &first);
    let second_ids = subtree_ids(store.document(), &second);
    assert!(first_ids.is_disjoint(&second_ids));
    assert!(first_ids.is_disjoint(&existing));
    assert!(second_ids.is_disjoint(&existing));

    assert_eq!(
        store.document().subtree_outline(&first),
        store.document().subtree_outline(&second)
    );
    assert_eq!(
        store.document().subtree_outline(&first),
        store.document().subtree_outline("cols")
    );
    Ok(())
}

#[test]
fn test_dangling_ids_never_survive_transfer() -> anyhow::Result<()> {
    let mut store = EditorStore::with_document(newsletter(), EditorConfig::default());
    assert_eq!(store.document().dangling_references().len(), 1);

    store.set_selected_block_id(Some("cols".into()));
    let exported = export_block(&store, &renderer)?;
    assert!(exported.document.dangling_references().is_empty());

    let mut fresh = EditorStore::new(EditorConfig::default());
    let source = newsletter();
    let new_id = import_subtree(
        &mut fresh,
        source.blocks(),
        "cols",
        &InsertTarget::Root,
        &mut SequentialIdGenerator::new("n"),
    )?
    .expect("entry block");
    assert!(fresh.document().dangling_references().is_empty());

    let columns = fresh.document().get(&new_id).unwrap().data.columns.clone().unwrap_or_default();
    assert_eq!(columns[0].children_ids.len(), 1);
    Ok(())
}

#[test]
fn test_undo_redo_walk_reproduces_every_step() {
    let mut store = EditorStore::with_document(newsletter(), EditorConfig::default());
    let mut recorded = vec![store.document().clone()];

    for n in 0..10 {
        if n % 3 == 0 {
            store.set_block(format!("extra-{}", n), Block::new("Divider"));
        } else {
            store.set_block("heading", Block::new("Heading").with_prop("text", json!(format!("v{}", n))));
        }
        recorded.push(store.document().clone());
    }

    for step in (0..10).rev() {
        assert!(store.undo());
        assert_eq!(store.document(), &recorded[step]);
    }
    assert!(!store.can_undo());

    for step in 1..=10 {
        assert!(store.redo());
        assert_eq!(store.document(), &recorded[step]);
    }
    assert!(!store.can_redo());
}

#[test]
fn test_new_edit_discards_redo_tail() {
    let mut store = EditorStore::with_document(newsletter(), EditorConfig::default());
    store.set_block("heading", Block::new("Heading").with_prop("text", json!("first")));
    let before_undo = store.document().clone();

    store.undo();
    store.set_block("heading", Block::new("Heading").with_prop("text", json!("second")));
    assert!(!store.redo());
    assert!(!store.can_redo());
    assert_ne!(store.document(), &before_undo);
}

#[test]
fn test_save_edit_undo_cycle() {
    let mut store = EditorStore::with_document(newsletter(), EditorConfig::default());
    store.set_block("caption", Block::new("Text").with_prop("text", json!("Edited")));
    store.mark_as_saved();
    assert!(!store.has_unsaved_changes());

    store.set_block("caption", Block::new("Text").with_prop("text", json!("Edited again")));
    assert!(store.has_unsaved_changes());

    store.undo();
    assert!(!store.has_unsaved_changes());
}

#[test]
fn test_template_export_and_blueprint_replace() -> anyhow::Result<()> {
    use mailblocks_editor::{replace_with_blueprint, ReplaceConfirmation};

    let mut store = EditorStore::with_document(newsletter(), EditorConfig::default());
    let template = export_template(&store, &renderer);
    assert_eq!(template.preview_html.as_deref(), Some("<div id=\"root\"></div>"));

    let mut other = EditorStore::new(EditorConfig::default());
    other.set_block("x", Block::new("Divider"));
    replace_with_blueprint(&mut other, &template.document, ReplaceConfirmation::confirmed());
    assert_eq!(other.document(), store.document());

    store.set_selected_block_id(Some("heading".into()));
    replace_with_blueprint(&mut store, &Document::new("EmailLayout"), ReplaceConfirmation::confirmed());
    assert_eq!(store.selected_block_id(), None);
    assert_eq!(store.document().len(), 1);
    Ok(())
}

#[test]
fn test_import_into_column_of_live_document() -> anyhow::Result<()> {
    let mut store = EditorStore::with_document(newsletter(), EditorConfig::default());
    let block = Document::from_value(json!({
        "root": { "type": "EmailLayout", "data": { "childrenIds": ["main-block"] } },
        "main-block": { "type": "Spacer", "data": { "height": 16 } }
    }))?;

    let target = InsertTarget::Column {
        block: "cols".into(),
        column: 1,
    };
    let new_id = import_document(&mut store, &block, &target, &mut SequentialIdGenerator::new("s"))?
        .expect("entry block");

    let columns: &Vec<Column> = store.document().get("cols").unwrap().data.columns.as_ref().unwrap();
    assert_eq!(columns[1].children_ids, vec!["button".to_string(), new_id]);
    assert_eq!(columns[0].children_ids.len(), 2);
    Ok(())
}

#[test]
fn test_legacy_payload_lands_as_single_block() -> anyhow::Result<()> {
    let mut store = EditorStore::new(EditorConfig::default());
    let payload = json!({ "html": "<p>Hello</p>" });

    let new_id = import_payload(&mut store, payload, &InsertTarget::Root, &mut SequentialIdGenerator::new("l"))?
        .expect("legacy block");

    let block = store.document().get(&new_id).unwrap();
    assert_eq!(block.block_type, "Html");
    assert_eq!(block.prop("html"), Some(&json!("<p>Hello</p>")));
    assert_eq!(store.document().root().data.children_ids, Some(vec![new_id]));
    Ok(())
}
