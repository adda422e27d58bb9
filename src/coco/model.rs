//! In-memory view of a COCO instances file.
//!
//! Only the parts the sampler reads are kept: image sizes and file names,
//! category names, and per-instance area, crowd flag and geometry.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ids::{AnnotationId, CategoryId, ImageId};

/// A parsed COCO instances file.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub images: Vec<ImageRecord>,
    pub categories: Vec<Category>,
    pub annotations: Vec<AnnotationRecord>,
}

impl Dataset {
    /// Category names in the order they appear in the file.
    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|cat| cat.name.clone()).collect()
    }
}

/// An image of the split.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRecord {
    pub id: ImageId,

    /// Path relative to `images/<split>/`.
    pub file_name: String,

    pub width: u32,
    pub height: u32,
}

impl ImageRecord {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }

    /// Total number of pixels, as a float for area-ratio arithmetic.
    pub fn pixel_area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }

    /// Last component of `file_name`.
    pub fn base_name(&self) -> Option<&str> {
        Path::new(&self.file_name).file_name()?.to_str()
    }

    /// `base_name` without its final extension.
    pub fn file_stem(&self) -> Option<&str> {
        Path::new(&self.file_name).file_stem()?.to_str()
    }
}

/// A category (class label).
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub supercategory: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: None,
        }
    }
}

/// One annotated object instance.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationRecord {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,

    /// Pixel area as recorded in the file. Absent in some hand-made files.
    pub area: Option<f64>,

    /// Set for regions covering a crowd of indistinguishable objects.
    pub iscrowd: bool,

    pub segmentation: Segmentation,
}

impl AnnotationRecord {
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        segmentation: Segmentation,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            area: None,
            iscrowd: false,
            segmentation,
        }
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_crowd(mut self, iscrowd: bool) -> Self {
        self.iscrowd = iscrowd;
        self
    }
}

/// Instance geometry as stored in COCO.
///
/// Non-crowd instances are usually polygons; crowd instances use RLE.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segmentation {
    /// One or more polygons, each a flat `[x0, y0, x1, y1, ...]` list.
    Polygons(Vec<Vec<f64>>),
    /// Run-length encoded mask.
    Rle(RleSegmentation),
}

impl Default for Segmentation {
    fn default() -> Self {
        Segmentation::Polygons(Vec::new())
    }
}

/// RLE payload: `size` is `[height, width]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RleSegmentation {
    pub size: [u32; 2],
    pub counts: RleCounts,
}

/// RLE counts, either the compact string form or plain run lengths.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RleCounts {
    Compressed(String),
    Runs(Vec<u32>),
}
