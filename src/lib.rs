//! Core of an interactive, human-in-the-loop sketch classification trainer.
//!
//! The user draws small sketches, assigns them to one of three classes,
//! trains a linear classifier on the accumulated drawings, and improves it
//! by confirming or correcting live predictions. The drawing canvas and the
//! dialog layer are supplied by the embedding shell through the traits in
//! [`ui`].

/// Application directory helpers.
pub mod app_dirs;
/// Linear classifier primitive and trainer.
pub mod classifier;
/// TOML-backed application settings.
pub mod config;
/// Predict-then-confirm feedback state machine.
pub mod feedback;
/// Tracing setup.
pub mod logging;
/// Project bootstrap and session snapshots.
pub mod persistence;
/// Project identity, class slots, and ledgers.
pub mod project;
/// Canonical sample raster format.
pub mod sample;
/// Classifier session and accuracy tracking.
pub mod session;
/// Labeled sample storage.
pub mod store;
/// Session context and interactive startup/shutdown flows.
pub mod trainer;
/// Collaborator traits for the windowing shell.
pub mod ui;

mod fsio;

#[cfg(test)]
pub(crate) mod testkit;
