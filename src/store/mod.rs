//! Durable, append-only storage of labeled samples.
//!
//! Each project directory holds one subdirectory per class; samples are
//! numbered PNGs named by the ledger counter at the time of the save. The
//! store never touches the counters: incrementing after a successful write
//! stays with the `ClassLedger` so counter ownership lives in one place.

use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};
use thiserror::Error;
use tracing::debug;

use crate::project::{CLASS_COUNT, ClassSlot, Project, ProjectError};
use crate::sample;

/// Errors raised by sample storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The project root already exists, refusing to clobber a corpus.
    #[error("Project directory {path} already exists")]
    AlreadyExists { path: PathBuf },
    /// Project or class names failed validation.
    #[error(transparent)]
    InvalidClassNames(#[from] ProjectError),
    /// Failed to create a project or class directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write a sample image.
    #[error("Failed to write sample {path}: {source}")]
    WriteSample {
        path: PathBuf,
        source: image::ImageError,
    },
    /// An expected sample file is missing or unreadable.
    #[error("Corrupt or missing sample {path}: {source}")]
    CorruptSample {
        path: PathBuf,
        source: image::ImageError,
    },
    /// A stored sample does not have the canonical dimensions.
    #[error("Sample {path} has shape {width}x{height}, expected {side}x{side}", side = sample::SAMPLE_SIDE)]
    WrongSampleShape {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

/// Create a new project's directory layout and return its `Project`.
///
/// Fails with `AlreadyExists` if the project root is already present and
/// with `InvalidClassNames` if the names do not validate.
pub fn init_project(
    projects_root: &Path,
    name: &str,
    class_names: [String; CLASS_COUNT],
) -> Result<Project, StoreError> {
    let project = Project::new(projects_root, name, class_names)?;
    if project.root().exists() {
        return Err(StoreError::AlreadyExists {
            path: project.root().to_path_buf(),
        });
    }
    create_dir(project.root())?;
    for slot in ClassSlot::ALL {
        create_dir(&class_dir(&project, slot))?;
    }
    debug!(project = project.name(), root = %project.root().display(), "initialized project layout");
    Ok(project)
}

/// Path of the sample a class would store under `index`.
pub fn sample_path(project: &Project, slot: ClassSlot, index: u32) -> PathBuf {
    class_dir(project, slot).join(format!("{index}.png"))
}

/// Write a finished drawing as the sample `counter` of `slot`'s class.
///
/// The raster is canonicalized to 50×50 grayscale first. The ledger counter
/// is deliberately not incremented here: the caller advances it only after
/// this returns `Ok`, so a failed write never consumes an index.
pub fn save_sample(
    project: &Project,
    slot: ClassSlot,
    counter: u32,
    image: &RgbImage,
) -> Result<PathBuf, StoreError> {
    let path = sample_path(project, slot, counter);
    let canonical = sample::canonicalize(image);
    canonical
        .save(&path)
        .map_err(|source| StoreError::WriteSample {
            path: path.clone(),
            source,
        })?;
    debug!(class = project.ledger(slot).name(), index = counter, "saved sample");
    Ok(path)
}

/// Lazily read the full corpus: flattened pixel rows paired with their slot,
/// covering all three classes concatenated in class order.
///
/// Any missing or unreadable file surfaces as `CorruptSample`; training
/// treats that as fatal rather than fitting on a partial corpus.
pub fn load_all(
    project: &Project,
) -> impl Iterator<Item = Result<(Vec<f32>, ClassSlot), StoreError>> {
    ClassSlot::ALL.into_iter().flat_map(move |slot| {
        let count = project.ledger(slot).sample_count();
        (1..=count).map(move |index| {
            load_sample(project, slot, index).map(|pixels| (pixels, slot))
        })
    })
}

fn load_sample(project: &Project, slot: ClassSlot, index: u32) -> Result<Vec<f32>, StoreError> {
    let path = sample_path(project, slot, index);
    let image = image::open(&path).map_err(|source| StoreError::CorruptSample {
        path: path.clone(),
        source,
    })?;
    let gray: GrayImage = image.to_luma8();
    if !sample::is_canonical(&gray) {
        return Err(StoreError::WrongSampleShape {
            path,
            width: gray.width(),
            height: gray.height(),
        });
    }
    Ok(sample::flatten(&gray))
}

fn class_dir(project: &Project, slot: ClassSlot) -> PathBuf {
    project.root().join(project.ledger(slot).name())
}

fn create_dir(path: &Path) -> Result<(), StoreError> {
    std::fs::create_dir_all(path).map_err(|source| StoreError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn demo_names() -> [String; CLASS_COUNT] {
        ["cat".to_string(), "dog".to_string(), "bird".to_string()]
    }

    fn solid(rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(120, 120, Rgb(rgb))
    }

    #[test]
    fn init_creates_class_directories() {
        let root = tempdir().unwrap();
        let project = init_project(root.path(), "demo", demo_names()).unwrap();
        for slot in ClassSlot::ALL {
            assert!(class_dir(&project, slot).is_dir());
        }
    }

    #[test]
    fn init_refuses_existing_root() {
        let root = tempdir().unwrap();
        init_project(root.path(), "demo", demo_names()).unwrap();
        assert!(matches!(
            init_project(root.path(), "demo", demo_names()),
            Err(StoreError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn saved_samples_are_sequential_and_readable() {
        let root = tempdir().unwrap();
        let mut project = init_project(root.path(), "demo", demo_names()).unwrap();
        for _ in 0..3 {
            let counter = project.ledger(ClassSlot::First).next_index();
            save_sample(&project, ClassSlot::First, counter, &solid([0, 0, 0])).unwrap();
            project.ledger_mut(ClassSlot::First).advance();
        }
        assert_eq!(project.ledger(ClassSlot::First).next_index(), 4);
        for index in 1..=3 {
            assert!(sample_path(&project, ClassSlot::First, index).is_file());
        }
        let rows: Result<Vec<_>, _> = load_all(&project).collect();
        let rows = rows.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|(_, slot)| *slot == ClassSlot::First));
    }

    #[test]
    fn write_into_missing_class_dir_surfaces_write_error() {
        let root = tempdir().unwrap();
        let project = init_project(root.path(), "demo", demo_names()).unwrap();
        std::fs::remove_dir_all(class_dir(&project, ClassSlot::First)).unwrap();
        let result = save_sample(&project, ClassSlot::First, 1, &solid([0, 0, 0]));
        assert!(matches!(result, Err(StoreError::WriteSample { .. })));
        assert_eq!(project.ledger(ClassSlot::First).next_index(), 1);
    }

    #[test]
    fn missing_sample_is_corrupt() {
        let root = tempdir().unwrap();
        let mut project = init_project(root.path(), "demo", demo_names()).unwrap();
        // Advance the ledger without writing the file.
        project.ledger_mut(ClassSlot::Second).advance();
        let result: Result<Vec<_>, _> = load_all(&project).collect();
        assert!(matches!(result, Err(StoreError::CorruptSample { .. })));
    }

    #[test]
    fn corpus_concatenates_in_class_order() {
        let root = tempdir().unwrap();
        let mut project = init_project(root.path(), "demo", demo_names()).unwrap();
        for slot in [ClassSlot::Third, ClassSlot::First] {
            let counter = project.ledger(slot).next_index();
            save_sample(&project, slot, counter, &solid([255, 255, 255])).unwrap();
            project.ledger_mut(slot).advance();
        }
        let rows: Vec<_> = load_all(&project).map(Result::unwrap).collect();
        let slots: Vec<ClassSlot> = rows.iter().map(|(_, slot)| *slot).collect();
        assert_eq!(slots, vec![ClassSlot::First, ClassSlot::Third]);
    }
}
