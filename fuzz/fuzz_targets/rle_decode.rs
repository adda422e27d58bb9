//! Fuzz target for compressed RLE decoding.
//!
//! The first two bytes pick the mask size; the rest is the counts string.
//!
//! Run with:
//!   cargo +nightly fuzz run rle_decode

#![no_main]

use cocosample::mask::Rle;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let [h, w, rest @ ..] = data else {
        return;
    };
    let Ok(encoded) = std::str::from_utf8(rest) else {
        return;
    };

    if let Ok(rle) = Rle::from_compressed(u32::from(*h), u32::from(*w), encoded) {
        let _ = rle.to_mask();
    }
});
