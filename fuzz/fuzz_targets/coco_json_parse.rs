//! Fuzz target for COCO instances JSON parsing.
//!
//! Feeds arbitrary bytes to the annotation parser and, when parsing
//! succeeds, builds the lookup index over the result.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse

#![no_main]

use cocosample::coco::{from_coco_slice, CocoIndex};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for a fuzzed annotation file.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(dataset) = from_coco_slice(data) {
        let index = CocoIndex::new(&dataset);
        for name in dataset.category_names() {
            let _ = index.images_with_categories(index.category_ids(&name));
        }
    }
});
