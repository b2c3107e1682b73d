//! Whole-session persistence: project bootstrap and snapshots.
//!
//! A snapshot is one versioned JSON record per project holding everything a
//! resumed session needs: class names, the three counters, the trained
//! model (if any), and the accuracy ledger. Snapshots overwrite in place,
//! last write wins; an unreadable or mis-versioned record fails closed with
//! `CorruptSnapshot` rather than restoring half a session.

use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::classifier::LinearModel;
use crate::fsio;
use crate::project::{CLASS_COUNT, ClassLedger, PoolError, Project, draw_random_classes};
use crate::session::{AccuracyLedger, ClassifierSession};
use crate::store::{self, StoreError};

/// File name of the snapshot record under each project root.
pub const SNAPSHOT_FILE_NAME: &str = "session.json";

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors raised while bootstrapping or snapshotting a project.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// No project directory with the given name exists.
    #[error("Project {name:?} not found under {root}")]
    ProjectNotFound { name: String, root: PathBuf },
    /// Creating the project layout failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Drawing random class names failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The snapshot record is unreadable, mis-versioned, or inconsistent.
    #[error("Corrupt snapshot {path}: {detail}")]
    CorruptSnapshot { path: PathBuf, detail: String },
    /// Serializing the snapshot failed.
    #[error("Failed to serialize snapshot for {path}: {source}")]
    SerializeSnapshot {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Writing the snapshot file failed.
    #[error("Failed to write snapshot {path}: {source}")]
    WriteSnapshot {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRecord {
    snapshot_version: u32,
    project_name: String,
    classes: [ClassLedger; CLASS_COUNT],
    model: Option<LinearModel>,
    correct: u32,
    incorrect: u32,
    history: Vec<f32>,
}

/// Create a new project with explicitly supplied class names.
pub fn bootstrap_new(
    projects_root: &Path,
    name: &str,
    class_names: [String; CLASS_COUNT],
) -> Result<Project, PersistenceError> {
    let project = store::init_project(projects_root, name, class_names)?;
    info!(project = name, classes = ?project.class_names(), "bootstrapped new project");
    Ok(project)
}

/// Create a new project with three distinct class names drawn from `pool`.
pub fn bootstrap_new_random<R: Rng>(
    projects_root: &Path,
    name: &str,
    pool: &[String],
    rng: &mut R,
) -> Result<Project, PersistenceError> {
    let class_names = draw_random_classes(pool, rng)?;
    bootstrap_new(projects_root, name, class_names)
}

/// Check that a project directory exists, returning its root.
///
/// `ProjectNotFound` is non-fatal by contract: the interactive caller owns
/// the retry loop over project names.
pub fn bootstrap_existing(projects_root: &Path, name: &str) -> Result<PathBuf, PersistenceError> {
    let root = projects_root.join(name);
    if !root.is_dir() {
        return Err(PersistenceError::ProjectNotFound {
            name: name.to_string(),
            root: projects_root.to_path_buf(),
        });
    }
    Ok(root)
}

/// Path of a project's snapshot record.
pub fn snapshot_path(project_root: &Path) -> PathBuf {
    project_root.join(SNAPSHOT_FILE_NAME)
}

/// Serialize the entire session state to the project's snapshot record.
pub fn save_snapshot(
    project: &Project,
    session: &ClassifierSession,
) -> Result<PathBuf, PersistenceError> {
    let path = snapshot_path(project.root());
    let record = SnapshotRecord {
        snapshot_version: SNAPSHOT_VERSION,
        project_name: project.name().to_string(),
        classes: project.ledgers().clone(),
        model: session.model().cloned(),
        correct: session.accuracy().correct(),
        incorrect: session.accuracy().incorrect(),
        history: session.accuracy().history().to_vec(),
    };
    let data = serde_json::to_vec_pretty(&record).map_err(|source| {
        PersistenceError::SerializeSnapshot {
            path: path.clone(),
            source,
        }
    })?;
    fsio::atomic_write(&path, &data).map_err(|source| PersistenceError::WriteSnapshot {
        path: path.clone(),
        source,
    })?;
    info!(project = project.name(), path = %path.display(), "saved snapshot");
    Ok(path)
}

/// Restore a full session from a project's snapshot record.
///
/// Fails with `ProjectNotFound` if the project directory is absent and with
/// `CorruptSnapshot` if the record is missing, unreadable, mis-versioned,
/// or internally inconsistent. Nothing is partially restored on failure.
pub fn load_snapshot(
    projects_root: &Path,
    name: &str,
) -> Result<(Project, ClassifierSession), PersistenceError> {
    let root = bootstrap_existing(projects_root, name)?;
    let path = snapshot_path(&root);
    let data = std::fs::read(&path).map_err(|source| PersistenceError::CorruptSnapshot {
        path: path.clone(),
        detail: format!("unreadable record: {source}"),
    })?;
    let record: SnapshotRecord =
        serde_json::from_slice(&data).map_err(|source| PersistenceError::CorruptSnapshot {
            path: path.clone(),
            detail: format!("malformed record: {source}"),
        })?;

    if record.snapshot_version != SNAPSHOT_VERSION {
        return Err(PersistenceError::CorruptSnapshot {
            path,
            detail: format!(
                "unsupported snapshot_version {} (expected {SNAPSHOT_VERSION})",
                record.snapshot_version
            ),
        });
    }
    if record.project_name != name {
        return Err(PersistenceError::CorruptSnapshot {
            path,
            detail: format!(
                "record belongs to project {:?}, not {name:?}",
                record.project_name
            ),
        });
    }
    if let Some(model) = &record.model {
        model
            .validate()
            .map_err(|detail| PersistenceError::CorruptSnapshot {
                path: path.clone(),
                detail,
            })?;
    }

    let project = Project::restore(projects_root, record.project_name, record.classes);
    let accuracy = AccuracyLedger::restore(record.correct, record.incorrect, record.history);
    let session = ClassifierSession::restore(record.model, accuracy);
    info!(project = project.name(), "restored session from snapshot");
    Ok((project, session))
}
