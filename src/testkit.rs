//! Scripted fakes for the collaborator traits, shared by unit tests.

use std::collections::VecDeque;

use image::{Rgb, RgbImage};

use crate::ui::{Answer, DialogLayer, DrawingSurface};

/// In-memory drawing surface holding a preset raster.
pub struct FakeSurface {
    drawing: RgbImage,
    clears: usize,
    brush: Option<(u32, [u8; 3])>,
}

impl FakeSurface {
    pub fn new(drawing: RgbImage) -> Self {
        Self {
            drawing,
            clears: 0,
            brush: None,
        }
    }

    /// Replace the raster the next `finished_image` call returns.
    pub fn set_drawing(&mut self, drawing: RgbImage) {
        self.drawing = drawing;
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn brush(&self) -> Option<(u32, [u8; 3])> {
        self.brush
    }
}

impl DrawingSurface for FakeSurface {
    fn finished_image(&self) -> RgbImage {
        self.drawing.clone()
    }

    fn clear(&mut self) {
        self.clears += 1;
        let (width, height) = self.drawing.dimensions();
        self.drawing = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    }

    fn set_brush(&mut self, width: u32, color: [u8; 3]) {
        self.brush = Some((width, color));
    }
}

/// Dialog layer answering from scripted queues.
#[derive(Default)]
pub struct FakeDialogs {
    answers: VecDeque<Answer>,
    strings: VecDeque<Option<String>>,
    infos: Vec<(String, String)>,
    errors: Vec<(String, String)>,
}

impl FakeDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next yes/no/cancel prompt.
    pub fn answer(mut self, answer: Answer) -> Self {
        self.answers.push_back(answer);
        self
    }

    /// Queue a reply for the next string prompt (`None` = cancelled).
    pub fn string(mut self, reply: Option<String>) -> Self {
        self.strings.push_back(reply);
        self
    }

    pub fn infos_shown(&self) -> usize {
        self.infos.len()
    }

    pub fn errors_shown(&self) -> usize {
        self.errors.len()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(|(_, message)| message.as_str())
    }
}

impl DialogLayer for FakeDialogs {
    fn ask_yes_no_cancel(&mut self, _title: &str, _prompt: &str) -> Answer {
        self.answers.pop_front().unwrap_or(Answer::Cancel)
    }

    fn ask_string(&mut self, _title: &str, _prompt: &str) -> Option<String> {
        self.strings.pop_front().unwrap_or(None)
    }

    fn show_info(&mut self, title: &str, message: &str) {
        self.infos.push((title.to_string(), message.to_string()));
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_string(), message.to_string()));
    }
}
