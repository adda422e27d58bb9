//! COCO run-length encoding.
//!
//! Runs are laid out column-major and alternate background/foreground,
//! starting with background. The compact string form packs each run into
//! 5-bit groups (plus a continuation bit) offset by ASCII `'0'`, and stores
//! runs after the second as a delta against the run two positions back.

use super::BinaryMask;

/// Decoded run lengths for a `height` x `width` mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rle {
    pub height: u32,
    pub width: u32,
    pub counts: Vec<u32>,
}

impl Rle {
    pub fn new(height: u32, width: u32, counts: Vec<u32>) -> Self {
        Self {
            height,
            width,
            counts,
        }
    }

    /// Parses the compact string form of the counts.
    pub fn from_compressed(height: u32, width: u32, encoded: &str) -> Result<Self, String> {
        let counts = decode_counts(encoded)?;
        Ok(Self::new(height, width, counts))
    }

    /// Expands the runs into a mask.
    ///
    /// Runs covering fewer pixels than the mask leave the remainder as
    /// background; runs covering more are rejected.
    pub fn to_mask(&self) -> Result<BinaryMask, String> {
        let total = self.height as usize * self.width as usize;
        let covered: usize = self.counts.iter().map(|&c| c as usize).sum();
        if covered > total {
            return Err(format!(
                "runs cover {covered} pixels but the mask has {total}"
            ));
        }

        let mut mask = BinaryMask::new(self.width, self.height);
        let height = self.height as usize;
        let mut pos = 0usize;
        for (i, &run) in self.counts.iter().enumerate() {
            let run = run as usize;
            if i % 2 == 1 {
                for idx in pos..pos + run {
                    mask.set((idx / height) as u32, (idx % height) as u32);
                }
            }
            pos += run;
        }

        Ok(mask)
    }
}

fn decode_counts(encoded: &str) -> Result<Vec<u32>, String> {
    let bytes = encoded.as_bytes();
    let mut counts: Vec<i64> = Vec::new();
    let mut p = 0usize;

    while p < bytes.len() {
        let mut value: i64 = 0;
        let mut shift = 0u32;
        loop {
            let Some(&byte) = bytes.get(p) else {
                return Err("truncated run".to_string());
            };
            let chunk = i64::from(byte) - 48;
            if !(0..64).contains(&chunk) {
                return Err(format!("invalid character {:?} at offset {p}", byte as char));
            }
            if shift > 55 {
                return Err(format!("run at offset {p} is too long"));
            }

            value |= (chunk & 0x1f) << shift;
            shift += 5;
            p += 1;

            if chunk & 0x20 == 0 {
                if chunk & 0x10 != 0 {
                    value |= -1i64 << shift;
                }
                break;
            }
        }

        if counts.len() > 2 {
            value = value
                .checked_add(counts[counts.len() - 2])
                .ok_or_else(|| format!("run at offset {p} overflows"))?;
        }
        counts.push(value);
    }

    counts
        .into_iter()
        .map(|c| u32::try_from(c).map_err(|_| format!("run length {c} is out of range")))
        .collect()
}
