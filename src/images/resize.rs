//! Derivative-ladder math: fit-inside resize, centered square crop, JPEG
//! encode.
//!
//! Everything here is pure and synchronous — the ingest layer wraps it in
//! `spawn_blocking`. The ladder is walked descending so every rung resizes
//! the previous rung's output, bounding the cost of N derivatives to one
//! full-resolution decode plus N-1 cheap downsizes.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

use crate::error::RenterKitError;

/// One encoded rung of the ladder.
pub struct Derivative {
    /// The ladder size this rung was produced for.
    pub size: u32,
    /// Actual pixel dimensions after resizing (≤ `size` on the longest edge).
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// The full output of one ladder walk.
pub struct LadderOutput {
    /// The largest rung — stored at the record's primary path.
    pub full: Derivative,
    /// Remaining rungs, ascending by size.
    pub thumbnails: Vec<Derivative>,
}

/// Shrink `img` so neither dimension exceeds `size`, preserving aspect
/// ratio with the factor `min(size/w, size/h)`. Never upscales: when both
/// dimensions are already within `size` the image is returned untouched.
pub fn fit_within(img: DynamicImage, size: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    if w <= size && h <= size {
        return img;
    }
    let factor = f64::min(size as f64 / w as f64, size as f64 / h as f64);
    let new_w = ((w as f64 * factor).round() as u32).max(1);
    let new_h = ((h as f64 * factor).round() as u32).max(1);
    img.resize_exact(new_w, new_h, FilterType::Lanczos3)
}

/// Centered square crop to `size × size`, clamped to the image bounds.
pub fn square_crop(img: &DynamicImage, size: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    let crop_w = size.min(w);
    let crop_h = size.min(h);
    let x = (w - crop_w) / 2;
    let y = (h - crop_h) / 2;
    img.crop_imm(x, y, crop_w, crop_h)
}

/// Encode at the configured fixed quality.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, RenterKitError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
    img.write_with_encoder(encoder)
        .map_err(|e| RenterKitError::Internal(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

/// Walk the ladder (already sorted descending) over an RGB-normalized image.
///
/// The largest rung becomes [`LadderOutput::full`]; the smallest rung gets
/// the square crop; `thumbnails` comes back ascending, matching the order
/// persisted into `UnitImage::thumbnail_sizes`.
pub fn build_ladder(
    source: DynamicImage,
    ladder_descending: &[u32],
    quality: u8,
) -> Result<LadderOutput, RenterKitError> {
    debug_assert!(!ladder_descending.is_empty());
    let largest = ladder_descending[0];
    let smallest = ladder_descending[ladder_descending.len() - 1];

    // Discard alpha up front so every rung encodes as consistent JPEG.
    let mut img = DynamicImage::ImageRgb8(source.to_rgb8());

    let mut full: Option<Derivative> = None;
    let mut thumbnails: Vec<Derivative> = Vec::with_capacity(ladder_descending.len() - 1);

    for &size in ladder_descending {
        img = fit_within(img, size);

        let rung = if size == smallest {
            square_crop(&img, size)
        } else {
            img.clone()
        };

        debug!(size, width = rung.width(), height = rung.height(), "ladder rung");

        let derivative = Derivative {
            size,
            width: rung.width(),
            height: rung.height(),
            jpeg: encode_jpeg(&rung, quality)?,
        };

        if size == largest {
            full = Some(derivative);
        } else {
            thumbnails.push(derivative);
        }
    }

    thumbnails.reverse();
    let full = full.ok_or_else(|| RenterKitError::Internal("empty ladder".into()))?;
    Ok(LadderOutput { full, thumbnails })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, image::Rgb([120, 80, 40])))
    }

    #[test]
    fn fit_within_is_noop_when_already_small() {
        let img = fit_within(solid(10, 8), 20);
        assert_eq!((img.width(), img.height()), (10, 8));
    }

    #[test]
    fn fit_within_shrinks_longest_edge_to_size() {
        let img = fit_within(solid(100, 50), 20);
        assert_eq!((img.width(), img.height()), (20, 10));
    }

    #[test]
    fn fit_within_never_upscales() {
        let img = fit_within(solid(21, 21), 20);
        assert_eq!((img.width(), img.height()), (20, 20));
        let img = fit_within(img, 40);
        assert_eq!((img.width(), img.height()), (20, 20));
    }

    #[test]
    fn square_crop_is_centered_and_clamped() {
        let img = square_crop(&solid(30, 10), 10);
        assert_eq!((img.width(), img.height()), (10, 10));
        // narrower than the crop size on one side: clamp, don't pad
        let img = square_crop(&solid(6, 10), 10);
        assert_eq!((img.width(), img.height()), (6, 10));
    }

    #[test]
    fn ladder_21x21_with_5_10_20() {
        let out = build_ladder(solid(21, 21), &[20, 10, 5], 75).unwrap();
        assert_eq!(out.full.size, 20);
        assert_eq!((out.full.width, out.full.height), (20, 20));
        let sizes: Vec<u32> = out.thumbnails.iter().map(|d| d.size).collect();
        assert_eq!(sizes, vec![5, 10]);
        assert_eq!(
            (out.thumbnails[0].width, out.thumbnails[0].height),
            (5, 5)
        );
    }

    #[test]
    fn single_rung_ladder_yields_square_full() {
        let out = build_ladder(solid(50, 30), &[20], 75).unwrap();
        assert!(out.thumbnails.is_empty());
        // fit 50x30 → 20x12, then the square crop clamps to 20x12
        assert_eq!((out.full.width, out.full.height), (20, 12));
    }

    #[test]
    fn encoded_rungs_are_valid_jpeg() {
        let out = build_ladder(solid(40, 40), &[20, 10], 75).unwrap();
        let decoded = image::load_from_memory(&out.full.jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 20));
    }

    #[test]
    fn alpha_is_discarded() {
        let rgba = image::RgbaImage::from_pixel(30, 30, image::Rgba([10, 20, 30, 0]));
        let out = build_ladder(DynamicImage::ImageRgba8(rgba), &[20, 10], 75).unwrap();
        let decoded = image::load_from_memory(&out.full.jpeg).unwrap();
        assert_eq!(decoded.color().channel_count(), 3);
    }
}
