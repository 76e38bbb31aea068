use crate::sequence::domain::frame::Frame;
use crate::shared::gray_frame::GrayFrame;

/// Assigns stable identity labels to the faces of successive frames.
///
/// Implementations are stateful: frame N's association depends on the
/// pool state left by frame N-1, so one instance must consume frames in
/// order on a single logical thread. Independent instances share nothing.
pub trait FaceTracker: Send {
    /// Matches `frame`'s faces against the tracked pools and writes the
    /// resolved identity into each `Face::id`.
    ///
    /// `image` is the frame's pixel data in the same coordinate space as
    /// the face bounding boxes and landmarks.
    fn track_frame(&mut self, image: &GrayFrame, frame: &mut Frame);

    /// Resets the id allocator to zero and empties all pools.
    fn clear(&mut self);

    /// Deep copy of all pool state, so instances can diverge from a
    /// common point.
    fn clone_box(&self) -> Box<dyn FaceTracker>;
}
