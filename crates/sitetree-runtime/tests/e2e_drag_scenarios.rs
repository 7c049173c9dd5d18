#![forbid(unsafe_code)]

//! End-to-end drag scenarios: pointer events through layout, classifier,
//! engines, optimistic store, dispatcher, and the in-memory backend.
//!
//! Run:
//!   cargo test -p sitetree-runtime --test e2e_drag_scenarios

use sitetree_core::{Page, PageId, PageStore, TreeError};
use sitetree_runtime::{
    Dispatcher, EditorConfig, EditorError, EditorMsg, EditorPhase, GatewayError, MemoryBackend,
    Model, MoveOutcome, TreeEditor,
};
use sitetree_widgets::Placement;

// ============================================================================
// Helpers
// ============================================================================

fn id(s: &str) -> PageId {
    PageId::new(s)
}

fn roots() -> Vec<Page> {
    vec![
        Page::new("a", "A", "a").with_order(0),
        Page::new("b", "B", "b").with_order(1),
        Page::new("c", "C", "c").with_order(2),
    ]
}

fn with_child_d() -> Vec<Page> {
    let mut pages = roots();
    pages.push(Page::new("d", "D", "d").with_parent("a"));
    pages.push(Page::new("e", "E", "e").with_parent("a").with_order(1));
    pages
}

fn started(pages: Vec<Page>) -> (Dispatcher<MemoryBackend>, TreeEditor) {
    let mut dispatcher = Dispatcher::new(MemoryBackend::from_pages(pages).unwrap());
    let mut editor = TreeEditor::empty(EditorConfig::default());
    dispatcher.start(&mut editor);
    (dispatcher, editor)
}

fn position(store: &PageStore, page: &str) -> (Option<PageId>, usize) {
    let page = store.get(&id(page)).unwrap();
    (page.parent_id.clone(), page.order_index)
}

fn drag(
    dispatcher: &mut Dispatcher<MemoryBackend>,
    editor: &mut TreeEditor,
    page: &str,
    x: u16,
    y: u16,
) {
    dispatcher.run(editor, EditorMsg::DragStart { page: id(page) });
    dispatcher.run(editor, EditorMsg::Release { x, y });
}

// ============================================================================
// Scenario 1: reorder among roots
// ============================================================================

#[test]
fn drag_first_root_after_second() {
    let (mut dispatcher, mut editor) = started(roots());
    // y6 is the gap after B.
    drag(&mut dispatcher, &mut editor, "a", 0, 6);

    let store = editor.store();
    assert_eq!(position(store, "b"), (None, 0));
    assert_eq!(position(store, "a"), (None, 1));
    assert_eq!(position(store, "c"), (None, 2));
    assert_eq!(dispatcher.backend().store(), store);
    assert_eq!(editor.phase(), EditorPhase::Idle);
}

// ============================================================================
// Scenario 2: drop on another page's row
// ============================================================================

#[test]
fn drop_child_on_other_root_row() {
    let (mut dispatcher, mut editor) = started(with_child_d());
    // y1 A, y3 D, y6 E, y10 B.
    let layout = editor.layout();
    let b_row = layout.item_area(&id("b")).unwrap();
    drag(&mut dispatcher, &mut editor, "d", b_row.x + 3, b_row.y);

    let store = editor.store();
    assert_eq!(position(store, "d"), (Some(id("b")), 0));
    assert_eq!(position(store, "e"), (Some(id("a")), 0));
    assert!(store.validate().is_ok());
    assert_eq!(dispatcher.backend().store(), store);
}

// ============================================================================
// Scenario 3: drop on an empty-children placeholder
// ============================================================================

#[test]
fn drop_root_on_empty_placeholder() {
    let (mut dispatcher, mut editor) = started(roots());
    // y8 is the placeholder under C, indented to x = 4.
    drag(&mut dispatcher, &mut editor, "a", 6, 8);

    let store = editor.store();
    assert_eq!(position(store, "a"), (Some(id("c")), 0));
    assert_eq!(position(store, "b"), (None, 0));
    assert_eq!(position(store, "c"), (None, 1));
    assert_eq!(dispatcher.backend().store(), store);
}

// ============================================================================
// Scenario 4: reparent under own descendant
// ============================================================================

#[test]
fn reparent_under_descendant_is_refused() {
    let (mut dispatcher, mut editor) = started(with_child_d());
    let before = editor.store().clone();
    dispatcher.run(
        &mut editor,
        EditorMsg::Drop {
            page: id("a"),
            placement: Placement::Child { parent: id("d") },
        },
    );

    assert_eq!(editor.store(), &before);
    assert_eq!(dispatcher.backend().attempts(), 0);
    assert!(matches!(
        editor.last_error(),
        Some(EditorError::Rejected(TreeError::InvalidMove { .. }))
    ));
}

// ============================================================================
// Scenario 5: backend failure rolls back
// ============================================================================

#[test]
fn failed_persist_reverts_reorder() {
    let (mut dispatcher, mut editor) = started(roots());
    dispatcher.backend_mut().fail_next("write conflict");
    drag(&mut dispatcher, &mut editor, "a", 0, 6);

    let store = editor.store();
    assert_eq!(position(store, "a"), (None, 0));
    assert_eq!(position(store, "b"), (None, 1));
    assert_eq!(position(store, "c"), (None, 2));
    assert!(matches!(
        editor.last_error(),
        Some(EditorError::Persist(GatewayError::Rejected(_)))
    ));
    assert!(matches!(
        editor.last_outcome(),
        Some(MoveOutcome::RolledBack { .. })
    ));
    assert_eq!(dispatcher.backend().store(), store);
}

// ============================================================================
// Optimistic visibility while the call is pending
// ============================================================================

#[test]
fn view_shows_new_order_before_confirmation() {
    let (mut dispatcher, mut editor) = started(roots());
    let cmd = editor.update(EditorMsg::Drop {
        page: id("c"),
        placement: Placement::Sibling {
            parent: None,
            index: 0,
        },
    });
    dispatcher.submit(cmd);

    let lines: Vec<String> = editor.view().into_iter().filter(|l| !l.is_empty()).collect();
    assert!(lines[0].ends_with('C'), "{lines:?}");
    assert!(matches!(
        editor.phase(),
        EditorPhase::Mutating { in_flight: 1 }
    ));

    let answer = dispatcher.complete_next().unwrap();
    editor.update(answer);
    assert_eq!(editor.phase(), EditorPhase::Idle);
}

// ============================================================================
// Repository edits refetch
// ============================================================================

#[test]
fn delete_refetches_promoted_children() {
    let (mut dispatcher, mut editor) = started(with_child_d());
    dispatcher.run(
        &mut editor,
        EditorMsg::Edit(sitetree_runtime::RepositoryOp::Delete {
            page: id("a"),
            strategy: sitetree_core::DeleteStrategy::PromoteChildren,
        }),
    );

    let store = editor.store();
    assert!(store.get(&id("a")).is_none());
    assert_eq!(position(store, "d"), (None, 2));
    assert_eq!(position(store, "e"), (None, 3));
    assert!(store.validate().is_ok());
}
