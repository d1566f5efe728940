//! Tests for building trees from the filesystem and from dataset files

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use rstreemap::application::{ApplicationError, DataSource, DatasetSource, FileSystemSource};
use rstreemap::domain::{layout, NodeFactory, Rect, TreeNodeRef, WeightedTree};
use rstreemap::util::testing;

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(name)
}

fn names(node: &TreeNodeRef) -> Vec<String> {
    node.borrow()
        .children()
        .iter()
        .map(|c| c.borrow().name().to_string())
        .collect()
}

fn child(node: &TreeNodeRef, label: &str) -> TreeNodeRef {
    node.borrow()
        .children()
        .iter()
        .find(|c| c.borrow().name() == label)
        .cloned()
        .unwrap_or_else(|| panic!("no child {label}"))
}

// <tmp>
// ├── a.txt   (10 bytes)
// ├── docs
// │   ├── b.txt   (20 bytes)
// │   └── c.txt   (5 bytes)
// └── empty/
#[fixture]
fn tree_dir() -> TempDir {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "0123456789").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/b.txt"), "x".repeat(20)).unwrap();
    fs::write(dir.path().join("docs/c.txt"), "hello").unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();
    dir
}

// ============================================================
// FileSystemSource
// ============================================================

#[rstest]
fn given_directory_when_building_then_weights_are_file_sizes(tree_dir: TempDir) {
    let tree = FileSystemSource::new(tree_dir.path())
        .build(&mut NodeFactory::seeded(1))
        .unwrap();

    assert_eq!(tree.borrow().weight(), 35);
    assert_eq!(names(&tree), vec!["a.txt", "docs", "empty"]);
    assert_eq!(child(&tree, "docs").borrow().weight(), 25);
    assert_eq!(names(&child(&tree, "docs")), vec!["b.txt", "c.txt"]);
    assert!(tree.borrow().is_consistent());
}

#[rstest]
fn given_empty_subdirectory_when_building_then_zero_weight_leaf(tree_dir: TempDir) {
    let tree = FileSystemSource::new(tree_dir.path())
        .build(&mut NodeFactory::seeded(1))
        .unwrap();

    let empty = child(&tree, "empty");
    assert!(empty.borrow().is_leaf());
    assert_eq!(empty.borrow().weight(), 0);
    // zero weight leaves are not drawn
    assert_eq!(layout(&tree, Rect::new(0, 0, 400, 300)).len(), 3);
}

#[rstest]
fn given_file_in_subdirectory_when_building_path_then_uses_platform_separator(tree_dir: TempDir) {
    let source = FileSystemSource::new(tree_dir.path());
    let tree = source.build(&mut NodeFactory::seeded(1)).unwrap();
    let file = child(&child(&tree, "docs"), "c.txt");

    let sep = MAIN_SEPARATOR_STR;
    assert_eq!(source.separator(), sep);
    assert_eq!(
        tree.path_from(Some(&file), 5, source.separator()),
        format!("{sep}docs{sep}c.txt     (5)")
    );
}

#[rstest]
fn given_single_file_when_building_then_tree_is_one_leaf(tree_dir: TempDir) {
    let tree = FileSystemSource::new(tree_dir.path().join("a.txt"))
        .build(&mut NodeFactory::seeded(1))
        .unwrap();

    assert!(tree.borrow().is_leaf());
    assert_eq!(tree.borrow().name(), "a.txt");
    assert_eq!(tree.borrow().weight(), 10);
}

#[test]
fn given_missing_path_when_building_then_source_not_found() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let result = FileSystemSource::new(&missing).build(&mut NodeFactory::seeded(1));
    assert!(matches!(result, Err(ApplicationError::SourceNotFound(p)) if p == missing));
}

// ============================================================
// DatasetSource
// ============================================================

#[test]
fn given_population_dataset_when_building_then_regions_sum_countries() {
    testing::init_test_setup();
    let source = DatasetSource::load(&resource("population.toml"), " / ").unwrap();
    let tree = source.build(&mut NodeFactory::seeded(1)).unwrap();

    assert_eq!(tree.borrow().name(), "World");
    assert_eq!(tree.borrow().weight(), 467);
    assert_eq!(names(&tree), vec!["Europe", "Asia", "Oceania"]);
    assert_eq!(child(&tree, "Europe").borrow().weight(), 211);
    assert_eq!(child(&tree, "Asia").borrow().weight(), 223);
    assert_eq!(child(&tree, "Oceania").borrow().weight(), 33);
    assert_eq!(tree.leaves().len(), 8);
}

#[test]
fn given_dataset_with_separator_when_building_path_then_document_separator_is_used() {
    let source = DatasetSource::load(&resource("population.toml"), " / ").unwrap();
    let tree = source.build(&mut NodeFactory::seeded(1)).unwrap();
    let fiji = child(&child(&tree, "Oceania"), "Fiji");

    assert_eq!(source.separator(), " > ");
    assert_eq!(
        tree.path_from(Some(&fiji), 1, source.separator()),
        " > Oceania > Fiji     (1)"
    );
}

#[test]
fn given_missing_dataset_when_loading_then_source_not_found() {
    let result = DatasetSource::load(&resource("missing.toml"), " / ");
    assert!(matches!(result, Err(ApplicationError::SourceNotFound(_))));
}

#[test]
fn given_malformed_dataset_when_loading_then_invalid_dataset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "name = \n").unwrap();

    let result = DatasetSource::load(&path, " / ");
    assert!(matches!(result, Err(ApplicationError::InvalidDataset { .. })));
}
