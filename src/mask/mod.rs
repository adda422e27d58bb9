//! Binary instance masks.
//!
//! Turns an annotation's polygons or RLE into a [`BinaryMask`] the size of
//! its image, and converts masks into the 0/255 grayscale images written to
//! `gt/`.

mod polygon;
mod rle;

pub use polygon::fill_polygon;
pub use rle::Rle;

use image::GrayImage;

use crate::coco::{AnnotationRecord, ImageRecord, RleCounts, Segmentation};
use crate::error::CocoSampleError;

/// Pixel value written for foreground.
pub const FOREGROUND: u8 = 255;

/// A row-major mask holding 0 (background) or 1 (foreground) per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BinaryMask {
    /// Creates an all-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Marks a pixel as foreground. Out-of-bounds coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32) {
        if x < self.width && y < self.height {
            let offset = self.offset(x, y);
            self.data[offset] = 1;
        }
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.data[self.offset(x, y)] != 0
    }

    /// Number of foreground pixels.
    pub fn area(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Scales the mask to a single-channel image: 0 stays 0, 1 becomes 255.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.data[self.offset(x, y)] * FOREGROUND])
        })
    }
}

/// Rasterizes one annotation at its image's resolution.
///
/// Polygons are filled and unioned. RLE masks must declare the same size as
/// the image record.
pub fn rasterize(
    annotation: &AnnotationRecord,
    image: &ImageRecord,
) -> Result<BinaryMask, CocoSampleError> {
    let decode_error = |message: String| CocoSampleError::MaskDecode {
        annotation_id: annotation.id.as_u64(),
        message,
    };

    match &annotation.segmentation {
        Segmentation::Polygons(polygons) => {
            let mut mask = BinaryMask::new(image.width, image.height);
            for polygon in polygons {
                fill_polygon(&mut mask, polygon);
            }
            Ok(mask)
        }
        Segmentation::Rle(rle) => {
            let [height, width] = rle.size;
            if (width, height) != (image.width, image.height) {
                return Err(decode_error(format!(
                    "RLE size {width}x{height} does not match image {} ({}x{})",
                    image.id, image.width, image.height
                )));
            }

            let decoded = match &rle.counts {
                RleCounts::Compressed(encoded) => {
                    Rle::from_compressed(height, width, encoded).map_err(decode_error)?
                }
                RleCounts::Runs(runs) => Rle::new(height, width, runs.clone()),
            };
            decoded.to_mask().map_err(decode_error)
        }
    }
}
