//! Collaborator seams for the windowing shell.
//!
//! The trainer core never talks to a concrete toolkit. The drawing canvas
//! and the modal dialog layer are supplied by the embedding application
//! through these traits, which also gives tests cheap scripted fakes.

use image::RgbImage;

/// Outcome of a three-way confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// The user confirmed.
    Yes,
    /// The user declined.
    No,
    /// The user dismissed the dialog without answering.
    Cancel,
}

/// The interactive pixel-buffer widget the user sketches on.
///
/// The surface owns the raster until the core asks for a finished drawing;
/// the core only ever consumes completed images and requests clears.
pub trait DrawingSurface {
    /// Return the current drawing as an RGB raster.
    fn finished_image(&self) -> RgbImage;
    /// Reset the surface to its blank state.
    fn clear(&mut self);
    /// Apply brush configuration (stroke width in pixels, RGB color).
    fn set_brush(&mut self, width: u32, color: [u8; 3]);
}

/// Modal prompt layer (message boxes and simple input dialogs).
pub trait DialogLayer {
    /// Ask a yes/no question the user may also cancel.
    fn ask_yes_no_cancel(&mut self, title: &str, prompt: &str) -> Answer;
    /// Ask for a line of free text; `None` means the prompt was cancelled.
    fn ask_string(&mut self, title: &str, prompt: &str) -> Option<String>;
    /// Show an informational message.
    fn show_info(&mut self, title: &str, message: &str);
    /// Show an error message.
    fn show_error(&mut self, title: &str, message: &str);
}
