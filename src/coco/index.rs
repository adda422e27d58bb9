//! Lookup tables over a [`Dataset`].
//!
//! Answers the three questions the sampler asks: which category ids carry a
//! name, which images contain a category, and which instances of a category
//! on one image are eligible for export.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use super::model::{AnnotationRecord, Dataset, ImageRecord};
use super::{CategoryId, ImageId};
use crate::mask;

/// Inclusive range of instance areas, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaRange {
    pub min: f64,
    pub max: f64,
}

impl AreaRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `[image_area * min_ratio, image_area]` for the given image.
    pub fn for_image(image: &ImageRecord, min_ratio: f64) -> Self {
        let image_area = image.pixel_area();
        Self::new(image_area * min_ratio, image_area)
    }

    pub fn contains(&self, area: f64) -> bool {
        self.min <= area && area <= self.max
    }
}

/// Borrowing index over a dataset. Build once per run.
pub struct CocoIndex<'a> {
    dataset: &'a Dataset,
    images: HashMap<ImageId, &'a ImageRecord>,
    category_ids: HashMap<&'a str, Vec<CategoryId>>,
    category_images: HashMap<CategoryId, BTreeSet<ImageId>>,
    image_annotations: HashMap<ImageId, Vec<&'a AnnotationRecord>>,
}

impl<'a> CocoIndex<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        let images: HashMap<ImageId, &ImageRecord> =
            dataset.images.iter().map(|img| (img.id, img)).collect();

        let mut category_ids: HashMap<&str, Vec<CategoryId>> = HashMap::new();
        for cat in &dataset.categories {
            category_ids.entry(cat.name.as_str()).or_default().push(cat.id);
        }

        let mut category_images: HashMap<CategoryId, BTreeSet<ImageId>> = HashMap::new();
        let mut image_annotations: HashMap<ImageId, Vec<&AnnotationRecord>> = HashMap::new();
        for ann in &dataset.annotations {
            // Annotations pointing at unknown images cannot be exported.
            if !images.contains_key(&ann.image_id) {
                continue;
            }
            category_images
                .entry(ann.category_id)
                .or_default()
                .insert(ann.image_id);
            image_annotations.entry(ann.image_id).or_default().push(ann);
        }

        Self {
            dataset,
            images,
            category_ids,
            category_images,
            image_annotations,
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Ids of every category with this exact name. Empty if the name is unknown.
    pub fn category_ids(&self, name: &str) -> &[CategoryId] {
        self.category_ids
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn image(&self, id: ImageId) -> Option<&'a ImageRecord> {
        self.images.get(&id).copied()
    }

    /// Images holding at least one annotation of any of `category_ids`,
    /// ordered by image id.
    pub fn images_with_categories(&self, category_ids: &[CategoryId]) -> Vec<&'a ImageRecord> {
        let ids: BTreeSet<ImageId> = category_ids
            .iter()
            .filter_map(|cat_id| self.category_images.get(cat_id))
            .flatten()
            .copied()
            .collect();

        ids.into_iter().filter_map(|id| self.image(id)).collect()
    }

    /// Non-crowd instances of `category_ids` on `image` whose area falls in
    /// `range`.
    ///
    /// The recorded `area` is used when present; otherwise the instance is
    /// rasterized and its pixels counted. An instance that cannot be
    /// rasterized is not eligible.
    pub fn instance_candidates(
        &self,
        image: &ImageRecord,
        category_ids: &[CategoryId],
        range: AreaRange,
    ) -> Vec<&'a AnnotationRecord> {
        let Some(annotations) = self.image_annotations.get(&image.id) else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for &ann in annotations {
            if ann.iscrowd || !category_ids.contains(&ann.category_id) {
                continue;
            }

            let area = match ann.area {
                Some(area) => area,
                None => match mask::rasterize(ann, image) {
                    Ok(mask) => mask.area() as f64,
                    Err(err) => {
                        warn!("skipping annotation {}: {}", ann.id, err);
                        continue;
                    }
                },
            };

            if range.contains(area) {
                candidates.push(ann);
            }
        }

        candidates
    }
}
