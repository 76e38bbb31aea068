use serde::{Deserialize, Serialize};

use super::face::Face;

/// Detection results for one frame of a sequence.
///
/// `faces` keeps detector append order; tracking rewrites face ids but
/// never reorders the collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub id: u32,
    pub width: i32,
    pub height: i32,
    pub faces: Vec<Face>,
}

impl Frame {
    pub fn new(id: u32, width: i32, height: i32) -> Self {
        Self {
            id,
            width,
            height,
            faces: Vec::new(),
        }
    }

    /// Looks up a face by identity label.
    pub fn face(&self, id: u32) -> Option<&Face> {
        self.faces.iter().find(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::domain::face::BoundingBox;

    fn face_with_id(id: u32) -> Face {
        Face {
            id,
            bbox: BoundingBox {
                left: 0,
                top: 0,
                width: 10,
                height: 10,
            },
            landmarks: Vec::new(),
        }
    }

    #[test]
    fn test_face_lookup_by_id() {
        let mut frame = Frame::new(0, 640, 480);
        frame.faces.push(face_with_id(3));
        frame.faces.push(face_with_id(7));
        assert_eq!(frame.face(7).unwrap().id, 7);
        assert!(frame.face(1).is_none());
    }

    #[test]
    fn test_new_frame_has_no_faces() {
        let frame = Frame::new(5, 320, 240);
        assert!(frame.faces.is_empty());
        assert_eq!(frame.id, 5);
    }
}
