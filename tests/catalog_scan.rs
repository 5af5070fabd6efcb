//! Integration tests for proposal-directory discovery on a real tree.

use std::path::{Path, PathBuf};

use datagate_core::{Catalog, compile_patterns};
use tempfile::TempDir;

fn add_dir(root: &Path, relative: &str) -> PathBuf {
    let dir = root.join(relative);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn scan_finds_shared_directories_at_fixed_depth() {
    let tree = TempDir::new().unwrap();
    let scs = add_dir(tree.path(), "SCS/202401/p000123/usr/Shared/amore");
    let mid = add_dir(tree.path(), "MID/202401/p000777/usr/Shared/amore-online");

    // Proposals without a shared analysis directory are not cataloged.
    add_dir(tree.path(), "FXE/202402/p000555/usr/Shared");
    add_dir(tree.path(), "FXE/202402/p000556");

    // Shared directories at the wrong depth are not cataloged.
    add_dir(tree.path(), "SCS/usr/Shared/amore");

    let catalog = Catalog::scan(tree.path()).unwrap();
    let paths: Vec<&PathBuf> = catalog.entries().iter().map(|entry| &entry.path).collect();
    assert_eq!(paths, vec![&mid, &scs]);
}

#[test]
fn scan_prefers_amore_over_amore_online() {
    let tree = TempDir::new().unwrap();
    let amore = add_dir(tree.path(), "SCS/202401/p000123/usr/Shared/amore");
    add_dir(tree.path(), "SCS/202401/p000123/usr/Shared/amore-online");

    let catalog = Catalog::scan(tree.path()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries()[0].path, amore);
}

#[test]
fn scan_parses_entry_metadata_from_the_path() {
    let tree = TempDir::new().unwrap();
    add_dir(tree.path(), "SCS/202401/p000123/usr/Shared/amore");

    let catalog = Catalog::scan(tree.path()).unwrap();
    let entry = &catalog.entries()[0];
    assert_eq!(entry.proposal, "000123");
    assert_eq!(entry.instrument, "SCS");
    assert_eq!(entry.cycle, "202401");
}

#[test]
fn scan_ignores_stray_files_in_the_tree() {
    let tree = TempDir::new().unwrap();
    add_dir(tree.path(), "SCS/202401/p000123/usr/Shared/amore");
    std::fs::write(tree.path().join("README"), "not an instrument").unwrap();
    std::fs::write(tree.path().join("SCS/202401/notes.txt"), "not a proposal").unwrap();

    let catalog = Catalog::scan(tree.path()).unwrap();
    assert_eq!(catalog.len(), 1);
}

#[test]
fn scan_of_a_missing_root_fails() {
    let tree = TempDir::new().unwrap();
    assert!(Catalog::scan(&tree.path().join("missing")).is_err());
}

#[test]
fn scanned_catalog_filters_against_compiled_patterns() {
    let tree = TempDir::new().unwrap();
    let scs = add_dir(tree.path(), "SCS/202401/p000123/usr/Shared/amore");
    add_dir(tree.path(), "MID/202401/p000777/usr/Shared/amore");

    let catalog = Catalog::scan(tree.path()).unwrap();

    let root = tree.path().display();
    let all = compile_patterns(&[format!("{root}/*")]).unwrap();
    assert_eq!(catalog.filter(&all).len(), 2);

    let by_number = compile_patterns(&[format!("{root}/*/*/p000123")]).unwrap();
    let visible = catalog.filter(&by_number);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].path, scs);

    let none = compile_patterns(&[format!("{root}/HED/*")]).unwrap();
    assert!(catalog.filter(&none).is_empty());
}

#[test]
fn rescan_replaces_the_catalog_wholesale() {
    let tree = TempDir::new().unwrap();
    add_dir(tree.path(), "SCS/202401/p000123/usr/Shared/amore");
    let first = Catalog::scan(tree.path()).unwrap();
    assert_eq!(first.len(), 1);

    std::fs::remove_dir_all(tree.path().join("SCS")).unwrap();
    add_dir(tree.path(), "MID/202402/p000999/usr/Shared/amore");
    let second = Catalog::scan(tree.path()).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second.entries()[0].proposal, "000999");
}
