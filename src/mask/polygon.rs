//! Scanline fill for COCO polygons.

use super::BinaryMask;

/// Fills one flat `[x0, y0, x1, y1, ...]` polygon into `mask` using the
/// even-odd rule, sampling each pixel at its center.
///
/// Polygons with fewer than three vertices cover no pixels. A trailing odd
/// coordinate is ignored.
pub fn fill_polygon(mask: &mut BinaryMask, coords: &[f64]) {
    let points: Vec<(f64, f64)> = coords
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if points.len() < 3 {
        return;
    }

    let width = f64::from(mask.width());
    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());

    for row in 0..mask.height() {
        let cy = f64::from(row) + 0.5;

        crossings.clear();
        for (i, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(i + 1) % points.len()];
            if (y0 > cy) != (y1 > cy) {
                crossings.push(x0 + (cy - y0) * (x1 - x0) / (y1 - y0));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            // Pixel `col` is inside when span[0] <= col + 0.5 < span[1].
            let start = (span[0] - 0.5).ceil().clamp(0.0, width) as u32;
            let end = (span[1] - 0.5).ceil().clamp(0.0, width) as u32;
            for col in start..end {
                mask.set(col, row);
            }
        }
    }
}
