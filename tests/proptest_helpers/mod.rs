#![allow(dead_code)]

use cocosample::coco::{AnnotationRecord, Category, Dataset, ImageRecord, Segmentation};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const CATEGORY_NAMES: [&str; 3] = ["cat", "dog", "giraffe"];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// An annotation before ids are assigned: (image index, category index,
/// area fraction of the image, crowd flag).
type RawAnnotation = (usize, usize, f64, bool);

fn arb_image_sizes(max_images: usize) -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((1u32..=64, 1u32..=64), 1..=max_images)
}

fn arb_raw_annotation(max_images: usize) -> impl Strategy<Value = RawAnnotation> {
    (
        0..max_images,
        0..CATEGORY_NAMES.len(),
        0.0f64..=1.2,
        prop::bool::weighted(0.2),
    )
}

/// Random datasets over [`CATEGORY_NAMES`] whose annotations carry an
/// explicit area, some of them crowd regions, some of them too small or
/// larger than their image.
pub fn arb_dataset(max_images: usize, max_annotations: usize) -> BoxedStrategy<Dataset> {
    (
        arb_image_sizes(max_images),
        prop::collection::vec(arb_raw_annotation(max_images), 0..=max_annotations),
    )
        .prop_map(|(sizes, raw)| {
            let images: Vec<ImageRecord> = sizes
                .iter()
                .enumerate()
                .map(|(i, &(w, h))| {
                    ImageRecord::new(i as u64 + 1, format!("img_{:06}.jpg", i + 1), w, h)
                })
                .collect();

            let annotations = raw
                .into_iter()
                .enumerate()
                .map(|(i, (image_idx, cat_idx, fraction, crowd))| {
                    let image = &images[image_idx % images.len()];
                    AnnotationRecord::new(
                        i as u64 + 1,
                        image.id,
                        cat_idx as u64 + 1,
                        Segmentation::default(),
                    )
                    .with_area(fraction * image.pixel_area())
                    .with_crowd(crowd)
                })
                .collect();

            let categories = CATEGORY_NAMES
                .iter()
                .enumerate()
                .map(|(i, name)| Category::new(i as u64 + 1, *name))
                .collect();

            Dataset {
                images,
                categories,
                annotations,
            }
        })
        .boxed()
}
