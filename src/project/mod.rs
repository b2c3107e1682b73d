//! Project identity and per-class bookkeeping.
//!
//! A project is three named classes plus one sample counter per class. The
//! class list is fixed at creation: renaming or removing a class afterwards
//! is unsupported by design, so the ledgers never change shape. Slot-based
//! indexing keeps every component free of per-class branching.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod pool;
pub use pool::{DEFAULT_CLASS_POOL, PoolError, draw_random_classes, load_pool, parse_pool};

/// Number of classes in every project.
pub const CLASS_COUNT: usize = 3;

/// Errors raised while validating project identity.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// A class name was empty or whitespace-only.
    #[error("Class names must not be empty")]
    EmptyClassName,
    /// A class name cannot be used as a directory component.
    #[error("Class name {name:?} is not usable as a directory name")]
    UnusableClassName { name: String },
    /// Two class names collide (comparison is case-insensitive).
    #[error("Class names must be pairwise distinct; {name:?} repeats")]
    DuplicateClassName { name: String },
    /// The project name was empty or not usable as a directory component.
    #[error("Project name {name:?} is not usable as a directory name")]
    UnusableProjectName { name: String },
}

/// One of the three fixed class positions of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassSlot {
    /// The first class.
    First,
    /// The second class.
    Second,
    /// The third class.
    Third,
}

impl ClassSlot {
    /// All slots in class order.
    pub const ALL: [ClassSlot; CLASS_COUNT] = [ClassSlot::First, ClassSlot::Second, ClassSlot::Third];

    /// Zero-based index of this slot.
    pub fn index(self) -> usize {
        match self {
            ClassSlot::First => 0,
            ClassSlot::Second => 1,
            ClassSlot::Third => 2,
        }
    }

    /// Slot for a zero-based index, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Per-class sample counter.
///
/// `next_index` starts at 1 and only ever grows; indices are never reused,
/// even if a sample file is later deleted externally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLedger {
    name: String,
    next_index: u32,
}

impl ClassLedger {
    /// Create a fresh ledger with no recorded samples.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_index: 1,
        }
    }

    /// Restore a ledger from persisted state.
    pub fn restore(name: impl Into<String>, next_index: u32) -> Self {
        Self {
            name: name.into(),
            next_index: next_index.max(1),
        }
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index the next saved sample will receive.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Number of samples recorded so far.
    pub fn sample_count(&self) -> u32 {
        self.next_index - 1
    }

    /// Consume the current index for a completed save and return it.
    pub fn advance(&mut self) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        index
    }
}

/// Root identity of a labeling session: name, storage root, three ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    root: PathBuf,
    classes: [ClassLedger; CLASS_COUNT],
}

impl Project {
    /// Build a new project rooted under `projects_root`, validating names.
    pub fn new(
        projects_root: &Path,
        name: &str,
        class_names: [String; CLASS_COUNT],
    ) -> Result<Self, ProjectError> {
        validate_dir_component(name).map_err(|_| ProjectError::UnusableProjectName {
            name: name.to_string(),
        })?;
        validate_class_names(&class_names)?;
        Ok(Self {
            name: name.to_string(),
            root: projects_root.join(name),
            classes: class_names.map(ClassLedger::new),
        })
    }

    /// Rebuild a project from persisted ledgers without re-validating names.
    ///
    /// Names were validated at creation time; a snapshot is trusted once it
    /// deserializes (see `persistence`).
    pub fn restore(
        projects_root: &Path,
        name: String,
        classes: [ClassLedger; CLASS_COUNT],
    ) -> Self {
        let root = projects_root.join(&name);
        Self {
            name,
            root,
            classes,
        }
    }

    /// Project name (also the storage directory name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the class subdirectories and the snapshot.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ledger for a slot.
    pub fn ledger(&self, slot: ClassSlot) -> &ClassLedger {
        &self.classes[slot.index()]
    }

    /// Mutable ledger for a slot.
    pub fn ledger_mut(&mut self, slot: ClassSlot) -> &mut ClassLedger {
        &mut self.classes[slot.index()]
    }

    /// All ledgers in class order.
    pub fn ledgers(&self) -> &[ClassLedger; CLASS_COUNT] {
        &self.classes
    }

    /// Class names in class order.
    pub fn class_names(&self) -> [&str; CLASS_COUNT] {
        [
            self.classes[0].name(),
            self.classes[1].name(),
            self.classes[2].name(),
        ]
    }

    /// Match free-text input against the class names, case-insensitively.
    pub fn match_class(&self, text: &str) -> Option<ClassSlot> {
        let wanted = text.trim();
        ClassSlot::ALL
            .into_iter()
            .find(|slot| self.ledger(*slot).name().eq_ignore_ascii_case(wanted))
    }
}

/// Check that three class names are non-empty, directory-safe, and pairwise
/// distinct (case-insensitive).
pub fn validate_class_names(names: &[String; CLASS_COUNT]) -> Result<(), ProjectError> {
    for name in names {
        validate_dir_component(name)?;
    }
    for (idx, name) in names.iter().enumerate() {
        if names[idx + 1..]
            .iter()
            .any(|other| other.eq_ignore_ascii_case(name))
        {
            return Err(ProjectError::DuplicateClassName { name: name.clone() });
        }
    }
    Ok(())
}

fn validate_dir_component(name: &str) -> Result<(), ProjectError> {
    if name.trim().is_empty() {
        return Err(ProjectError::EmptyClassName);
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ProjectError::UnusableClassName {
            name: name.to_string(),
        });
    }
    Ok(())
}
