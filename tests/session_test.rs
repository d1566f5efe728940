//! Tests for the interactive session: selection, resizing, discarding

use std::rc::Rc;

use rstest::{fixture, rstest};

use rstreemap::application::{Flow, InputEvent, Selection, Session};
use rstreemap::domain::{NodeFactory, Point, Rect, TreeNodeRef};
use rstreemap::util::testing;

const AREA: Rect = Rect {
    x: 0,
    y: 0,
    width: 100,
    height: 50,
};

fn session_with(leaves: &[(&str, i64)]) -> Session {
    testing::init_test_setup();
    let mut factory = NodeFactory::seeded(7);
    let children = leaves
        .iter()
        .map(|(label, weight)| factory.leaf(*label, *weight).unwrap())
        .collect();
    let root = factory.internal("root", children).unwrap();
    Session::new(root, "/", AREA, 0.01)
}

// root(100): A(30) | B(70), laid out side by side in 100x50
#[fixture]
fn session() -> Session {
    session_with(&[("A", 30), ("B", 70)])
}

fn child_weights(tree: &TreeNodeRef) -> Vec<(String, i64)> {
    tree.borrow()
        .children()
        .iter()
        .map(|c| (c.borrow().name().to_string(), c.borrow().weight()))
        .collect()
}

fn click(x: i64, y: i64) -> InputEvent {
    InputEvent::LeftClick(Point::new(x, y))
}

fn rclick(x: i64, y: i64) -> InputEvent {
    InputEvent::RightClick(Point::new(x, y))
}

// ============================================================
// Selection
// ============================================================

#[rstest]
fn given_leaf_when_clicked_then_selected_with_status(mut session: Session) {
    assert_eq!(session.handle(click(15, 25)), Flow::Continue);

    assert!(matches!(
        session.selection(),
        Selection::LeafSelected { size: 30, .. }
    ));
    assert_eq!(session.selected().unwrap().borrow().name(), "A");
    assert_eq!(session.status(), "/root/A     (30)");
}

#[rstest]
fn given_selected_leaf_when_clicked_again_then_deselected(mut session: Session) {
    session.handle(click(15, 25));
    session.handle(click(20, 5));

    assert!(session.selected().is_none());
    assert_eq!(session.status(), "");
}

#[rstest]
fn given_selected_leaf_when_other_leaf_clicked_then_selection_moves(mut session: Session) {
    session.handle(click(15, 25));
    session.handle(click(80, 25));

    assert_eq!(session.selected().unwrap().borrow().name(), "B");
    assert_eq!(session.status(), "/root/B     (70)");
}

#[rstest]
fn given_selected_leaf_when_clicking_outside_then_selection_cleared(mut session: Session) {
    session.handle(click(15, 25));
    session.handle(click(500, 500));

    assert!(session.selected().is_none());
}

// ============================================================
// Keyboard resizing
// ============================================================

#[rstest]
fn given_selected_leaf_when_key_up_then_leaf_and_root_grow(mut session: Session) {
    session.handle(click(15, 25));
    session.handle(InputEvent::KeyUp);

    assert_eq!(session.tree().borrow().weight(), 101);
    assert_eq!(
        child_weights(session.tree()),
        vec![("A".to_string(), 31), ("B".to_string(), 70)]
    );
    assert_eq!(session.status(), "/root/A     (31)");
}

#[rstest]
fn given_selected_leaf_when_key_down_then_leaf_and_root_shrink(mut session: Session) {
    session.handle(click(15, 25));
    session.handle(InputEvent::KeyDown);

    assert_eq!(session.tree().borrow().weight(), 99);
    assert_eq!(session.status(), "/root/A     (29)");
}

#[rstest]
fn given_no_selection_when_key_pressed_then_nothing_changes(mut session: Session) {
    session.handle(InputEvent::KeyUp);
    session.handle(InputEvent::KeyDown);

    assert_eq!(session.tree().borrow().weight(), 100);
}

#[test]
fn given_leaf_of_weight_one_when_key_down_then_stays_at_one() {
    let mut session = session_with(&[("A", 1), ("B", 99)]);
    // A is a one pixel wide column at the left edge
    session.handle(click(0, 25));
    assert_eq!(session.selected().unwrap().borrow().name(), "A");

    session.handle(InputEvent::KeyDown);
    session.handle(InputEvent::KeyDown);

    assert_eq!(session.selected().unwrap().borrow().weight(), 1);
    assert_eq!(session.tree().borrow().weight(), 100);
}

#[rstest]
#[case(30, 1)]
#[case(250, 3)]
#[case(1000, 10)]
fn given_leaf_weight_when_key_up_then_step_is_rounded_up_fraction(
    #[case] weight: i64,
    #[case] step: i64,
) {
    let mut session = session_with(&[("A", weight), ("B", weight)]);
    session.handle(click(10, 10));
    session.handle(InputEvent::KeyUp);

    assert_eq!(session.selected().unwrap().borrow().weight(), weight + step);
}

// ============================================================
// Discarding
// ============================================================

#[rstest]
fn given_leaf_when_right_clicked_then_removed_and_root_shrinks(mut session: Session) {
    session.handle(click(15, 25));
    session.handle(rclick(99, 49));

    assert_eq!(session.tree().borrow().weight(), 30);
    assert_eq!(child_weights(session.tree()), vec![("A".to_string(), 30)]);
    assert!(matches!(session.selection(), Selection::NoSelection));

    let frame = session.frame();
    assert_eq!(frame.tiles.len(), 1);
    assert_eq!(frame.tiles[0].0, AREA);
    assert_eq!(frame.status, "");
}

#[rstest]
fn given_point_outside_when_right_clicked_then_nothing_changes(mut session: Session) {
    session.handle(rclick(101, 10));

    assert_eq!(session.tree().borrow().weight(), 100);
    assert_eq!(session.tree().borrow().children().len(), 2);
}

#[test]
fn given_single_leaf_tree_when_right_clicked_then_tree_is_empty() {
    testing::init_test_setup();
    let root = NodeFactory::seeded(7).leaf("only", 10).unwrap();
    let mut session = Session::new(Rc::clone(&root), "/", AREA, 0.01);

    session.handle(rclick(50, 25));

    assert!(root.borrow().is_empty());
    assert!(session.frame().tiles.is_empty());
    // further clicks hit nothing
    session.handle(click(50, 25));
    assert!(session.selected().is_none());
}

#[test]
fn given_nested_leaf_when_right_clicked_then_every_ancestor_shrinks() {
    testing::init_test_setup();
    let mut factory = NodeFactory::seeded(7);
    let x = factory.leaf("x", 20).unwrap();
    let y = factory.leaf("y", 30).unwrap();
    let group = factory.internal("group", vec![x, y]).unwrap();
    let a = factory.leaf("a", 50).unwrap();
    let root = factory.internal("root", vec![a, group]).unwrap();
    let mut session = Session::new(root, "/", AREA, 0.01);

    // group takes the right half, cut by height: x on top
    session.handle(rclick(75, 5));

    assert_eq!(session.tree().borrow().weight(), 80);
    let group = Rc::clone(&session.tree().borrow().children()[1]);
    assert_eq!(child_weights(&group), vec![("y".to_string(), 30)]);
    assert!(session.tree().borrow().is_consistent());
}

// ============================================================
// Duplicate labels: the first leaf in pre-order is the one edited
// ============================================================

// root(201)
// ├── left(1)
// │   └── mod.rs(1)
// └── right(200)
//     └── mod.rs(200)
fn same_named_files() -> (Session, TreeNodeRef, TreeNodeRef) {
    testing::init_test_setup();
    let mut factory = NodeFactory::seeded(7);
    let small = factory.leaf("mod.rs", 1).unwrap();
    let large = factory.leaf("mod.rs", 200).unwrap();
    let left = factory.internal("left", vec![Rc::clone(&small)]).unwrap();
    let right = factory.internal("right", vec![Rc::clone(&large)]).unwrap();
    let root = factory.internal("root", vec![left, right]).unwrap();
    (Session::new(root, "/", AREA, 0.01), small, large)
}

#[test]
fn given_duplicate_labels_when_key_down_on_heavier_leaf_then_lighter_first_match_stays_at_one() {
    let (mut session, small, large) = same_named_files();
    // "left" is narrower than a pixel, the click lands on right/mod.rs
    session.handle(click(50, 25));
    assert!(Rc::ptr_eq(session.selected().unwrap(), &large));

    session.handle(InputEvent::KeyDown);

    assert_eq!(small.borrow().weight(), 1);
    assert_eq!(large.borrow().weight(), 200);
    assert_eq!(session.tree().borrow().weight(), 201);
    assert!(session.tree().borrow().is_consistent());
    assert!(Rc::ptr_eq(session.selected().unwrap(), &small));
    assert_eq!(session.status(), "/left/mod.rs     (1)");
    assert!(!session.frame().tiles.is_empty());
}

#[test]
fn given_duplicate_labels_when_key_up_on_heavier_leaf_then_step_follows_first_match() {
    let (mut session, small, large) = same_named_files();
    session.handle(click(50, 25));

    session.handle(InputEvent::KeyUp);

    // step is 1% of the edited leaf (1), not of the clicked one (200)
    assert_eq!(small.borrow().weight(), 2);
    assert_eq!(large.borrow().weight(), 200);
    assert_eq!(session.tree().borrow().weight(), 202);
}

#[test]
fn given_duplicate_labels_when_replaying_events_then_weights_stay_consistent() {
    let (mut session, small, large) = same_named_files();
    let script = "click 50 25\ndown\nup\nrclick 50 25\nclick 50 25\ndown\nup\nup\nrclick 50 25\n";

    for event in InputEvent::parse_script(script).unwrap() {
        session.handle(event);
        assert!(session.tree().borrow().is_consistent(), "after {event}");
        let _ = session.frame();
    }

    // first rclick zeroed and dropped left/mod.rs; the second one right/mod.rs
    assert_eq!(small.borrow().weight(), 0);
    assert_eq!(large.borrow().weight(), 0);
    assert!(small.borrow().parent().is_none());
    assert!(large.borrow().parent().is_none());
    assert_eq!(session.tree().borrow().weight(), 0);
    assert!(session.frame().tiles.is_empty());
}

// ============================================================
// Event loop
// ============================================================

#[rstest]
fn given_quit_when_handled_then_flow_stops(mut session: Session) {
    assert_eq!(session.handle(InputEvent::Quit), Flow::Quit);
}

#[rstest]
fn given_event_sequence_when_replayed_then_weights_stay_consistent(mut session: Session) {
    let script = "click 15 25\nup\nup\ndown\nclick 80 25\ndown\nrclick 10 10\nclick 50 25\nup\n";
    for event in InputEvent::parse_script(script).unwrap() {
        session.handle(event);
        assert!(session.tree().borrow().is_consistent(), "after {event}");
    }

    // A was discarded; B (70 - 1 + 1) fills the area and is selected
    assert_eq!(child_weights(session.tree()), vec![("B".to_string(), 70)]);
    assert_eq!(session.status(), "/root/B     (70)");
}
