//! Per-category sampling policy.
//!
//! For one category: shuffle the images that contain it, and walk them in
//! that order picking one eligible instance per image until the quota is
//! met or the images run out. Randomness is supplied by the caller so runs
//! can be made reproducible with a seeded generator.

mod report;

pub use report::{CategoryReport, SampleReport};

use std::collections::HashSet;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use tracing::warn;

use crate::coco::{AnnotationRecord, AreaRange, CocoIndex, ImageRecord};
use crate::error::CocoSampleError;

/// Default number of samples per category.
pub const DEFAULT_QUOTA: usize = 20;

/// Default minimum instance area, as a fraction of the image area.
pub const DEFAULT_MIN_INSTANCE_AREA_RATIO: f64 = 0.1;

/// Sampling options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleOptions {
    /// Maximum number of images exported per category.
    pub quota: usize,
    /// Smallest accepted instance area relative to its image, in (0, 1].
    pub min_instance_area_ratio: f64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            quota: DEFAULT_QUOTA,
            min_instance_area_ratio: DEFAULT_MIN_INSTANCE_AREA_RATIO,
        }
    }
}

/// Validate sampling options before running.
pub fn validate_sample_options(opts: &SampleOptions) -> Result<(), CocoSampleError> {
    if opts.quota == 0 {
        return Err(CocoSampleError::InvalidConfig {
            message: "quota must be greater than 0".to_string(),
        });
    }

    let ratio = opts.min_instance_area_ratio;
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(CocoSampleError::InvalidConfig {
            message: format!("min instance area ratio must be in (0.0, 1.0], got {ratio}"),
        });
    }

    Ok(())
}

/// One image chosen for export together with the instance to cut out of it.
#[derive(Clone, Copy, Debug)]
pub struct Selection<'a> {
    pub image: &'a ImageRecord,
    pub annotation: &'a AnnotationRecord,
}

/// The outcome of sampling one category.
#[derive(Clone, Debug)]
pub struct CategorySample<'a> {
    pub category: String,
    /// False when the dataset has no category with this name.
    pub known: bool,
    /// Number of images containing the category.
    pub pool_size: usize,
    /// At most `quota` selections, in shuffled order.
    pub selections: Vec<Selection<'a>>,
}

/// Samples up to `opts.quota` images for `category`.
///
/// Images with no eligible instance are skipped, as are images whose file
/// stem matches one already selected. The walk stops as soon as the quota
/// is met, so later images are never examined.
pub fn select_category<'a, R: Rng + ?Sized>(
    index: &CocoIndex<'a>,
    category: &str,
    opts: &SampleOptions,
    rng: &mut R,
) -> CategorySample<'a> {
    let category_ids = index.category_ids(category);
    let mut images = index.images_with_categories(category_ids);
    let pool_size = images.len();
    images.shuffle(rng);

    let mut selections = Vec::new();
    let mut stems = HashSet::new();
    for image in images {
        if selections.len() >= opts.quota {
            break;
        }

        let range = AreaRange::for_image(image, opts.min_instance_area_ratio);
        let candidates = index.instance_candidates(image, category_ids, range);
        let Some(&annotation) = candidates.choose(rng) else {
            continue;
        };

        // Exports of one category share a directory, keyed by file stem.
        let Some(stem) = image.file_stem() else {
            warn!("skipping image {}: no usable file name", image.id);
            continue;
        };
        if !stems.insert(stem) {
            warn!(
                "skipping image {} ({}): another '{}' image is already sampled for {}",
                image.id, image.file_name, stem, category
            );
            continue;
        }

        selections.push(Selection { image, annotation });
    }

    CategorySample {
        category: category.to_string(),
        known: !category_ids.is_empty(),
        pool_size,
        selections,
    }
}
