//! Fuzz target for splitting manifest lines into image and mask paths.
//!
//! Run with:
//!   cargo +nightly fuzz run manifest_line_parse

#![no_main]

use cocosample::manifest::fuzz_split_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    if let Some((image, mask)) = fuzz_split_line(line) {
        assert_eq!(image.len() + 1 + mask.len(), line.len());
    }
});
