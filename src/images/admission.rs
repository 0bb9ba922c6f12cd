//! Admission control: per-unit image counting against configured caps.
//!
//! The counting check runs caller-side, before [`crate::images::ingest`] is
//! invoked, against the unit's existing records. It is not part of the
//! pipeline itself — the pipeline only promises the count queries stay
//! cheap.

use crate::config::ImageConfig;
use crate::error::RenterKitError;
use crate::model::{ImageKind, UnitImage};
use uuid::Uuid;

/// How many images of `kind` the unit already holds.
pub fn count_for(existing: &[UnitImage], unit_id: Uuid, kind: ImageKind) -> usize {
    existing
        .iter()
        .filter(|i| i.unit_id == unit_id && i.kind == kind)
        .count()
}

/// Whether the unit can accept `additional` more images of `kind`.
///
/// Checks the per-kind cap and the aggregate cap; either failing yields
/// [`RenterKitError::TooManyImages`].
pub fn check_admission(
    existing: &[UnitImage],
    unit_id: Uuid,
    kind: ImageKind,
    additional: usize,
    config: &ImageConfig,
) -> Result<(), RenterKitError> {
    let kind_count = count_for(existing, unit_id, kind);
    let kind_limit = config.limit_for(kind);
    if kind_count + additional > kind_limit {
        return Err(RenterKitError::TooManyImages {
            kind,
            limit: kind_limit,
        });
    }

    let total: usize = existing.iter().filter(|i| i.unit_id == unit_id).count();
    if total + additional > config.max_images_per_unit {
        return Err(RenterKitError::TooManyImages {
            kind,
            limit: config.max_images_per_unit,
        });
    }

    Ok(())
}
