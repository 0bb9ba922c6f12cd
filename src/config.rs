//! Configuration for the image derivative pipeline.
//!
//! All pipeline behaviour is controlled through [`ImageConfig`], built via
//! its [`ImageConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the config across requests, serialise it for logging,
//! and diff two deployments to understand why their derivatives differ.

use crate::error::RenterKitError;
use crate::model::ImageKind;
use serde::{Deserialize, Serialize};

/// Configuration for unit-image ingestion.
///
/// Built via [`ImageConfig::builder()`] or [`ImageConfig::default()`].
///
/// # Example
/// ```rust
/// use renterkit::ImageConfig;
///
/// let config = ImageConfig::builder()
///     .size_ladder(vec![200, 500, 1000])
///     .jpeg_quality(75)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Target pixel sizes to persist. Default: `[200, 500, 1000]`.
    ///
    /// The smallest size becomes the square thumbnail; the largest becomes
    /// the "full" derivative stored at the record's primary path. Order does
    /// not matter here — the pipeline always processes the ladder descending
    /// so each step resizes the previous step's output instead of the
    /// original.
    pub size_ladder: Vec<u32>,

    /// Minimum width and height an upload must decode to. Default: 200.
    ///
    /// Anything smaller fails with
    /// [`RenterKitError::ImageTooSmall`] before a single byte is written.
    pub min_dimension: u32,

    /// JPEG quality for every derivative. Range 1–100. Default: 75.
    ///
    /// One fixed quality for the whole ladder; quality is a deployment
    /// decision, not a per-upload one.
    pub jpeg_quality: u8,

    /// Bound on concurrently-processed images within one batch. Default: 4.
    ///
    /// Decoding is memory-expensive (a full-resolution RGB frame per image
    /// in flight), so the fan-out must stay bounded. Derivative generation
    /// for a single image is always sequential regardless of this value.
    pub concurrency: usize,

    /// Per-unit cap on document scans. Default: 5.
    pub max_documents_per_unit: usize,

    /// Per-unit cap on move-in pictures. Default: 20.
    pub max_move_in_pictures_per_unit: usize,

    /// Per-unit cap on move-out pictures. Default: 20.
    pub max_move_out_pictures_per_unit: usize,

    /// Aggregate per-unit cap across all image kinds. Default: 45.
    pub max_images_per_unit: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            size_ladder: vec![200, 500, 1000],
            min_dimension: 200,
            jpeg_quality: 75,
            concurrency: 4,
            max_documents_per_unit: 5,
            max_move_in_pictures_per_unit: 20,
            max_move_out_pictures_per_unit: 20,
            max_images_per_unit: 45,
        }
    }
}

impl ImageConfig {
    /// Create a new builder for `ImageConfig`.
    pub fn builder() -> ImageConfigBuilder {
        ImageConfigBuilder {
            config: Self::default(),
        }
    }

    /// The ladder sorted descending, deduplicated — the processing order.
    pub fn ladder_descending(&self) -> Vec<u32> {
        let mut ladder = self.size_ladder.clone();
        ladder.sort_unstable_by(|a, b| b.cmp(a));
        ladder.dedup();
        ladder
    }

    /// Smallest ladder size — the square-thumbnail rung.
    pub fn smallest_size(&self) -> u32 {
        self.size_ladder.iter().copied().min().unwrap_or(0)
    }

    /// Largest ladder size — the "full" derivative rung.
    pub fn largest_size(&self) -> u32 {
        self.size_ladder.iter().copied().max().unwrap_or(0)
    }

    /// The per-kind admission cap.
    pub fn limit_for(&self, kind: ImageKind) -> usize {
        match kind {
            ImageKind::Document => self.max_documents_per_unit,
            ImageKind::MoveInPicture => self.max_move_in_pictures_per_unit,
            ImageKind::MoveOutPicture => self.max_move_out_pictures_per_unit,
        }
    }
}

/// Builder for [`ImageConfig`].
#[derive(Debug)]
pub struct ImageConfigBuilder {
    config: ImageConfig,
}

impl ImageConfigBuilder {
    pub fn size_ladder(mut self, sizes: Vec<u32>) -> Self {
        self.config.size_ladder = sizes;
        self
    }

    pub fn min_dimension(mut self, px: u32) -> Self {
        self.config.min_dimension = px.max(1);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_documents_per_unit(mut self, n: usize) -> Self {
        self.config.max_documents_per_unit = n;
        self
    }

    pub fn max_move_in_pictures_per_unit(mut self, n: usize) -> Self {
        self.config.max_move_in_pictures_per_unit = n;
        self
    }

    pub fn max_move_out_pictures_per_unit(mut self, n: usize) -> Self {
        self.config.max_move_out_pictures_per_unit = n;
        self
    }

    pub fn max_images_per_unit(mut self, n: usize) -> Self {
        self.config.max_images_per_unit = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ImageConfig, RenterKitError> {
        let c = &self.config;
        if c.size_ladder.is_empty() {
            return Err(RenterKitError::InvalidConfig(
                "size_ladder must name at least one size".into(),
            ));
        }
        if c.size_ladder.iter().any(|&s| s == 0) {
            return Err(RenterKitError::InvalidConfig(
                "size_ladder sizes must be ≥ 1".into(),
            ));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(RenterKitError::InvalidConfig(format!(
                "jpeg_quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if c.concurrency == 0 {
            return Err(RenterKitError::InvalidConfig(
                "concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_constants() {
        let c = ImageConfig::default();
        assert_eq!(c.size_ladder, vec![200, 500, 1000]);
        assert_eq!(c.min_dimension, 200);
        assert_eq!(c.jpeg_quality, 75);
        assert_eq!(c.max_documents_per_unit, 5);
    }

    #[test]
    fn ladder_descending_sorts_and_dedups() {
        let c = ImageConfig::builder()
            .size_ladder(vec![500, 200, 1000, 500])
            .build()
            .unwrap();
        assert_eq!(c.ladder_descending(), vec![1000, 500, 200]);
        assert_eq!(c.smallest_size(), 200);
        assert_eq!(c.largest_size(), 1000);
    }

    #[test]
    fn empty_ladder_rejected() {
        let err = ImageConfig::builder().size_ladder(vec![]).build().unwrap_err();
        assert!(err.to_string().contains("size_ladder"));
    }

    #[test]
    fn quality_setter_clamps() {
        let c = ImageConfig::builder().jpeg_quality(0).build().unwrap();
        assert_eq!(c.jpeg_quality, 1);
        let c = ImageConfig::builder().jpeg_quality(200).build().unwrap();
        assert_eq!(c.jpeg_quality, 100);
    }

    #[test]
    fn per_kind_limits() {
        let c = ImageConfig::default();
        assert_eq!(c.limit_for(ImageKind::Document), 5);
        assert_eq!(c.limit_for(ImageKind::MoveInPicture), 20);
        assert_eq!(c.limit_for(ImageKind::MoveOutPicture), 20);
    }
}
