use serde::{Deserialize, Serialize};

use super::frame::Frame;

/// An ordered collection of frames, ordered by ascending frame id.
///
/// `input_path` records the originating media so combined
/// tracking-plus-playback workflows can relocate the source. It is
/// informational only and never interpreted by this crate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub input_path: String,
    pub frames: Vec<Frame>,
}

impl Sequence {
    pub fn new(input_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            frames: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
