//! Walk thread: streams candidate image paths into the stat pipeline.

use crossbeam_channel::Sender;
use log::warn;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::utils::config::IMAGE_EXTENSIONS;

/// One result from a directory walk: a candidate path or an error.
pub enum WalkOutcome {
    Ok(PathBuf),
    Err(String),
}

fn to_outcome_jwalk(r: Result<jwalk::DirEntry<((), ())>, jwalk::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok(entry.path()),
        Err(err) => WalkOutcome::Err(err.to_string()),
    }
}

fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok(entry.into_path()),
        Err(err) => WalkOutcome::Err(err.to_string()),
    }
}

/// True when the file name carries a recognized image extension, any case.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|want| ext.eq_ignore_ascii_case(want))
        })
}

/// Spawn the walk thread: jwalk on the rayon pool when `parallel` (fan-out
/// bounded by the pool), serial walkdir otherwise. Returns the count of
/// candidate paths sent.
pub fn spawn_walk_thread(
    path_tx: Sender<PathBuf>,
    root: PathBuf,
    follow_links: bool,
    parallel: bool,
) -> JoinHandle<usize> {
    thread::spawn(move || {
        let iter: Box<dyn Iterator<Item = WalkOutcome>> = if parallel {
            Box::new(
                jwalk::WalkDir::new(&root)
                    .follow_links(follow_links)
                    .parallelism(jwalk::Parallelism::RayonDefaultPool {
                        busy_timeout: Duration::from_secs(60),
                    })
                    .into_iter()
                    .map(to_outcome_jwalk),
            )
        } else {
            Box::new(
                walkdir::WalkDir::new(&root)
                    .follow_links(follow_links)
                    .into_iter()
                    .map(to_outcome_walkdir),
            )
        };
        run_walk_loop(path_tx, iter)
    })
}

/// Send every image path from `iter` until it ends or the receiver hangs up
/// (scan cancelled). Walk errors are counted and logged, never fatal: the
/// diff works off whatever the traversal could see.
fn run_walk_loop<I>(path_tx: Sender<PathBuf>, iter: I) -> usize
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut sent = 0_usize;
    let mut skipped = 0_usize;
    for outcome in iter {
        match outcome {
            WalkOutcome::Ok(path) => {
                if is_image_path(&path) {
                    if path_tx.send(path).is_err() {
                        break;
                    }
                    sent += 1;
                }
            }
            WalkOutcome::Err(msg) => {
                log::debug!("walk: skipping entry: {msg}");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("walk: skipped {skipped} unreadable entries");
    }
    sent
}
