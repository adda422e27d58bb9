//! Writes sampled pairs into the output tree.
//!
//! Layout under the output root:
//!
//! - `images/<category>/<file name>`: byte-for-byte copy of the source image
//! - `gt/<category>/<file stem>.png`: 0/255 instance mask
//! - `list/<manifest name>.txt`: the manifest

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::{debug, warn};

use crate::coco::ImageRecord;
use crate::error::CocoSampleError;
use crate::manifest::ManifestEntry;
use crate::mask;
use crate::sample::Selection;

pub const IMAGES_DIR: &str = "images";
pub const MASKS_DIR: &str = "gt";
pub const LIST_DIR: &str = "list";

/// Paths of the output tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn image_dir(&self, category: &str) -> PathBuf {
        self.root.join(IMAGES_DIR).join(category_dir_name(category))
    }

    pub fn mask_dir(&self, category: &str) -> PathBuf {
        self.root.join(MASKS_DIR).join(category_dir_name(category))
    }

    pub fn manifest_path(&self, manifest_name: &str) -> PathBuf {
        self.root
            .join(LIST_DIR)
            .join(format!("{manifest_name}.txt"))
    }

    /// Creates both category directories. Existing directories are fine.
    pub fn ensure_category_dirs(&self, category: &str) -> Result<(), CocoSampleError> {
        fs::create_dir_all(self.image_dir(category))?;
        fs::create_dir_all(self.mask_dir(category))?;
        Ok(())
    }
}

/// Directory name for a category. Path separators become `_`, and names
/// that would resolve to the parent or current directory get a `_` prefix.
pub fn category_dir_name(category: &str) -> String {
    let name = category.replace(['/', '\\'], "_");
    match name.as_str() {
        "" | "." | ".." => format!("_{name}"),
        _ => name,
    }
}

/// Copies the image of `selection` and writes its mask.
///
/// The mask is rasterized before anything is written, so a decode failure
/// leaves no half-exported pair behind.
pub fn export_selection(
    selection: &Selection<'_>,
    source_image_dir: &Path,
    layout: &OutputLayout,
    category: &str,
) -> Result<ManifestEntry, CocoSampleError> {
    let image = selection.image;
    let mask = mask::rasterize(selection.annotation, image)?;

    let source = source_image_dir.join(&image.file_name);
    let (file_name, stem) = output_names(image)?;
    check_source_dimensions(&source, image);

    let image_path = layout.image_dir(category).join(file_name);
    fs::copy(&source, &image_path).map_err(|source_err| CocoSampleError::ImageCopy {
        from: source.clone(),
        to: image_path.clone(),
        source: source_err,
    })?;

    let mask_path = layout.mask_dir(category).join(format!("{stem}.png"));
    mask.to_gray_image()
        .save_with_format(&mask_path, ImageFormat::Png)
        .map_err(|source| CocoSampleError::MaskWrite {
            path: mask_path.clone(),
            source,
        })?;

    debug!(
        image = %image_path.display(),
        annotation = %selection.annotation.id,
        "exported sample"
    );
    ManifestEntry::from_paths(layout.root(), &image_path, &mask_path)
}

/// Output file name and stem for an image record. Sub-directories in
/// `file_name` are dropped.
fn output_names(image: &ImageRecord) -> Result<(&str, &str), CocoSampleError> {
    match (image.base_name(), image.file_stem()) {
        (Some(file_name), Some(stem)) => Ok((file_name, stem)),
        _ => Err(CocoSampleError::InvalidConfig {
            message: format!("image {} has no usable file name", image.id),
        }),
    }
}

/// Warns when the source file's header disagrees with the record, since
/// the mask is drawn at the record's size.
fn check_source_dimensions(path: &Path, image: &ImageRecord) {
    match imagesize::size(path) {
        Ok(size) => {
            if (size.width, size.height) != (image.width as usize, image.height as usize) {
                warn!(
                    "{} is {}x{} on disk but {}x{} in the annotations; mask follows the annotations",
                    path.display(),
                    size.width,
                    size.height,
                    image.width,
                    image.height
                );
            }
        }
        Err(err) => debug!("could not read image header of {}: {}", path.display(), err),
    }
}
