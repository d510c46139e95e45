//! Differ tests: diff rules, idempotence, the image filter, and real-tree
//! scans through the streaming pipeline.

use inkdex::differ::{diff, is_image_path, scan_files};
use inkdex::service::SnapshotStore;
use inkdex::snapshot::JsonSnapshotStore;
use inkdex::types::{FileSet, ScanOpts};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

fn fileset(entries: &[(&str, i64)]) -> FileSet {
    entries
        .iter()
        .map(|(path, mtime_ns)| (PathBuf::from(path), *mtime_ns))
        .collect()
}

fn serial_opts() -> ScanOpts {
    ScanOpts {
        parallel_walk: false,
        ..Default::default()
    }
}

// --- diff rules ---

#[test]
fn test_diff_new_file_goes_to_index() {
    // snapshot={A: t0}, filesystem={A: t0, B: t1} -> toIndex=[B], toDelete=[]
    let snapshot = fileset(&[("/m/s/c/a.jpg", 100)]);
    let current = fileset(&[("/m/s/c/a.jpg", 100), ("/m/s/c/b.jpg", 200)]);
    let out = diff(&current, &snapshot, 0);
    assert_eq!(out.to_index, vec![PathBuf::from("/m/s/c/b.jpg")]);
    assert!(out.to_delete.is_empty());
}

#[test]
fn test_diff_modified_and_removed() {
    // snapshot={A: t0, B: t0}, filesystem={A: t1} -> toIndex=[A], toDelete=[B]
    let snapshot = fileset(&[("/m/s/c/a.jpg", 100), ("/m/s/c/b.jpg", 100)]);
    let current = fileset(&[("/m/s/c/a.jpg", 150)]);
    let out = diff(&current, &snapshot, 0);
    assert_eq!(out.to_index, vec![PathBuf::from("/m/s/c/a.jpg")]);
    assert_eq!(out.to_delete, vec![PathBuf::from("/m/s/c/b.jpg")]);
}

#[test]
fn test_diff_equal_mtime_no_action() {
    let snapshot = fileset(&[("/m/s/c/a.jpg", 100)]);
    let current = fileset(&[("/m/s/c/a.jpg", 100)]);
    let out = diff(&current, &snapshot, 0);
    assert!(out.to_index.is_empty());
    assert!(out.to_delete.is_empty());
}

#[test]
fn test_diff_older_mtime_no_action() {
    let snapshot = fileset(&[("/m/s/c/a.jpg", 200)]);
    let current = fileset(&[("/m/s/c/a.jpg", 100)]);
    let out = diff(&current, &snapshot, 0);
    assert!(out.to_index.is_empty());
    assert!(out.to_delete.is_empty());
}

#[test]
fn test_diff_mtime_window_tolerance() {
    let snapshot = fileset(&[("/m/s/c/a.jpg", 100)]);
    let within = fileset(&[("/m/s/c/a.jpg", 150)]);
    let beyond = fileset(&[("/m/s/c/a.jpg", 151)]);
    assert!(diff(&within, &snapshot, 50).to_index.is_empty());
    assert_eq!(
        diff(&beyond, &snapshot, 50).to_index,
        vec![PathBuf::from("/m/s/c/a.jpg")]
    );
}

#[test]
fn test_diff_outputs_disjoint() {
    let snapshot = fileset(&[
        ("/m/a/1/p.jpg", 100),
        ("/m/a/2/p.jpg", 100),
        ("/m/b/1/p.jpg", 100),
    ]);
    let current = fileset(&[
        ("/m/a/1/p.jpg", 100), // unchanged
        ("/m/a/2/p.jpg", 999), // modified
        ("/m/c/1/p.jpg", 100), // new
    ]);
    let out = diff(&current, &snapshot, 0);
    for path in &out.to_index {
        assert!(
            !out.to_delete.contains(path),
            "{} in both lists",
            path.display()
        );
    }
    assert_eq!(out.to_index.len(), 2);
    assert_eq!(out.to_delete, vec![PathBuf::from("/m/b/1/p.jpg")]);
}

#[test]
fn test_diff_idempotent_on_unchanged_state() {
    let state = fileset(&[("/m/s/c/a.jpg", 100), ("/m/s/c/b.jpg", 200)]);
    let out = diff(&state, &state, 0);
    assert!(out.is_empty());
}

#[test]
fn test_diff_empty_both_sides() {
    let out = diff(&FileSet::new(), &FileSet::new(), 0);
    assert!(out.is_empty());
}

// --- image filter ---

#[test]
fn test_is_image_path_recognized_extensions() {
    assert!(is_image_path(Path::new("/m/s/c/014.jpg")));
    assert!(is_image_path(Path::new("/m/s/c/014.jpeg")));
    assert!(is_image_path(Path::new("/m/s/c/014.png")));
    assert!(is_image_path(Path::new("/m/s/c/014.JPG")));
    assert!(is_image_path(Path::new("/m/s/c/014.PnG")));
}

#[test]
fn test_is_image_path_rejects_others() {
    assert!(!is_image_path(Path::new("/m/s/c/notes.txt")));
    assert!(!is_image_path(Path::new("/m/s/c/cover.gif")));
    assert!(!is_image_path(Path::new("/m/s/c/noext")));
    assert!(!is_image_path(Path::new("/m/s/c/.hidden")));
}

// --- real-tree scans ---

fn build_tree(root: &Path) {
    let chapter = root.join("Berserk").join("Chapter_057");
    fs::create_dir_all(&chapter).unwrap();
    fs::write(chapter.join("014.jpg"), b"page").unwrap();
    fs::write(chapter.join("015.PNG"), b"page").unwrap();
    fs::write(chapter.join("notes.txt"), b"not a page").unwrap();

    let other = root.join("OnePiece").join("Vol_01");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("001.jpeg"), b"page").unwrap();
}

#[test]
fn test_scan_files_serial_walk() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let current = scan_files(dir.path(), &serial_opts()).unwrap();
    assert_eq!(current.len(), 3, "only image files should be recorded");
    let chapter = dir.path().join("Berserk").join("Chapter_057");
    assert!(current.contains_key(&chapter.join("014.jpg")));
    assert!(current.contains_key(&chapter.join("015.PNG")));
    for mtime_ns in current.values() {
        assert!(*mtime_ns > 0);
    }
}

#[test]
fn test_scan_files_parallel_walk() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let serial = scan_files(dir.path(), &serial_opts()).unwrap();
    let parallel = scan_files(dir.path(), &ScanOpts::default()).unwrap();
    assert_eq!(serial.len(), parallel.len());
    for path in serial.keys() {
        assert!(parallel.contains_key(path), "missing {}", path.display());
    }
}

#[test]
fn test_scan_then_diff_cycle() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    let store = JsonSnapshotStore::new(dir.path().join("snapshot.json"));

    // First run: everything is new.
    let current = scan_files(dir.path(), &serial_opts()).unwrap();
    let out = diff(&current, &store.load_snapshots().unwrap(), 0);
    assert_eq!(out.to_index.len(), 3);
    assert!(out.to_delete.is_empty());

    // Persist and rescan: nothing to do.
    store.save(&current).unwrap();
    let rescan = scan_files(dir.path(), &serial_opts()).unwrap();
    assert!(diff(&rescan, &store.load_snapshots().unwrap(), 0).is_empty());

    // Age one snapshot entry: that path reads as modified.
    let mut snapshot = store.load_snapshots().unwrap();
    let aged = dir
        .path()
        .join("Berserk")
        .join("Chapter_057")
        .join("014.jpg");
    *snapshot.get_mut(&aged).unwrap() -= 1;
    let out = diff(&rescan, &snapshot, 0);
    assert_eq!(out.to_index, vec![aged]);
    assert!(out.to_delete.is_empty());

    // Remove a file on disk: the snapshot's extra path reads as deleted.
    let gone = dir.path().join("OnePiece").join("Vol_01").join("001.jpeg");
    fs::remove_file(&gone).unwrap();
    let rescan = scan_files(dir.path(), &serial_opts()).unwrap();
    let out = diff(&rescan, &store.load_snapshots().unwrap(), 0);
    assert!(out.to_index.is_empty());
    assert_eq!(out.to_delete, vec![gone]);
}

#[test]
fn test_scan_cancelled_before_start() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let opts = ScanOpts {
        parallel_walk: false,
        cancel: Some(Arc::new(AtomicBool::new(true))),
        ..Default::default()
    };
    let err = scan_files(dir.path(), &opts).unwrap_err();
    assert!(err.to_string().contains("cancelled"));
}
