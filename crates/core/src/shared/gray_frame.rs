use image::GrayImage;
use ndarray::ArrayView2;

use crate::sequence::domain::face::BoundingBox;

/// A single grayscale frame image: contiguous bytes in row-major order.
///
/// Trackers only ever read pixel data; color conversion happens at I/O
/// boundaries before a frame reaches the tracking layer.
#[derive(Clone, Debug)]
pub struct GrayFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize),
            "data length must equal width * height"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn as_ndarray(&self) -> ArrayView2<'_, u8> {
        ArrayView2::from_shape((self.height as usize, self.width as usize), &self.data)
            .expect("frame data length must match dimensions")
    }

    /// Copies the pixels under `bbox` into a standalone image.
    ///
    /// The box is clamped to the frame bounds first and degenerate boxes
    /// are widened to a single pixel, so the result is never empty.
    pub fn roi_image(&self, bbox: &BoundingBox) -> GrayImage {
        let clamped = bbox.clamped(self.width as i32, self.height as i32);
        let x = clamped.left as u32;
        let y = clamped.top as u32;
        let w = clamped.width.max(1) as u32;
        let h = clamped.height.max(1) as u32;

        let mut out = Vec::with_capacity((w * h) as usize);
        for row in y..(y + h).min(self.height) {
            let start = (row * self.width + x) as usize;
            let end = start + w.min(self.width - x) as usize;
            out.extend_from_slice(&self.data[start..end]);
        }
        // Rows clipped at the frame edge are padded so dimensions stay valid.
        out.resize((w * h) as usize, 0);
        GrayImage::from_raw(w, h, out).expect("roi buffer must match dimensions")
    }

    /// Crops `bbox` (clamped to the frame) and resizes to `size` x `size`.
    pub fn crop_resized(&self, bbox: &BoundingBox, size: u32) -> GrayFrame {
        let roi = self.roi_image(bbox);
        let resized =
            image::imageops::resize(&roi, size, size, image::imageops::FilterType::Triangle);
        GrayFrame::new(resized.into_raw(), size, size)
    }
}

impl From<GrayImage> for GrayFrame {
    fn from(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        GrayFrame::new(img.into_raw(), width, height)
    }
}
