//! Ingestion entry points: single-image and bounded-concurrency batch.
//!
//! ## Why spawn_blocking?
//!
//! Decoding an upload and running Lanczos resampling holds a full-resolution
//! RGB frame in memory and saturates a core. `tokio::task::spawn_blocking`
//! keeps that work off the async worker threads; the batch wrapper bounds
//! how many frames are in flight at once.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ImageConfig;
use crate::error::RenterKitError;
use crate::images::{cleanup, resize};
use crate::model::{ImageKind, Owner, Unit, UnitImage};
use crate::store::ContentStore;

/// One not-yet-ingested upload within a batch.
pub struct NewImage {
    pub bytes: Vec<u8>,
    pub kind: ImageKind,
}

/// Validate an upload, generate its derivative ladder, persist everything,
/// and return the record.
///
/// No record is returned unless every derivative write succeeded. A write
/// failure part-way through leaves the files already written for this
/// attempt in the store — an external sweep's responsibility, since this
/// operation holds no transaction over the content store.
///
/// # Errors
/// - [`RenterKitError::ImageDecode`] — bytes are not a raster image
/// - [`RenterKitError::ImageTooSmall`] — either decoded dimension is under
///   `config.min_dimension`; nothing is written
/// - [`RenterKitError::Storage`] — a derivative write failed; no record
pub async fn ingest(
    store: &dyn ContentStore,
    raw_bytes: &[u8],
    kind: ImageKind,
    owner: &Owner,
    unit: &Unit,
    config: &ImageConfig,
) -> Result<UnitImage, RenterKitError> {
    let ladder = config.ladder_descending();
    let quality = config.jpeg_quality;
    let min_dimension = config.min_dimension;
    let bytes = raw_bytes.to_vec();

    let output = tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            RenterKitError::ImageDecode {
                detail: e.to_string(),
            }
        })?;
        if decoded.width() < min_dimension || decoded.height() < min_dimension {
            return Err(RenterKitError::ImageTooSmall { min_dimension });
        }
        resize::build_ladder(decoded, &ladder, quality)
    })
    .await
    .map_err(|e| RenterKitError::Internal(format!("image task panicked: {e}")))??;

    // Fresh identifier, namespaced under the owner: never the original
    // filename, so keys neither collide nor enumerate.
    let stem = format!("uploads/{}/{}", owner.slug, Uuid::new_v4());
    let full_path = format!("{stem}.jpg");

    let mut thumbnail_sizes = Vec::with_capacity(output.thumbnails.len());
    for derivative in output.thumbnails {
        let path = format!("{stem}-{}.jpg", derivative.size);
        store.put(&path, derivative.jpeg).await?;
        thumbnail_sizes.push(derivative.size);
    }
    store.put(&full_path, output.full.jpeg).await?;

    let record = UnitImage {
        id: Uuid::new_v4(),
        path: full_path,
        full_size_width: output.full.width,
        full_size_height: output.full.height,
        thumbnail_sizes,
        kind,
        unit_id: unit.id,
        owner_id: owner.id,
        created_at: Utc::now(),
    };

    debug!(
        path = %record.path,
        width = record.full_size_width,
        height = record.full_size_height,
        sizes = ?record.thumbnail_sizes,
        "ingested unit image"
    );

    Ok(record)
}

/// Ingest a batch of uploads for one unit under bounded concurrency.
///
/// All submitted work is awaited. If any item fails, every record already
/// created by this batch is rolled back (its derivatives deleted,
/// best-effort) and the failure earliest in submission order is returned —
/// a partial batch never remains half-applied.
///
/// Successful records come back in submission order.
pub async fn ingest_batch(
    store: &dyn ContentStore,
    items: Vec<NewImage>,
    owner: &Owner,
    unit: &Unit,
    config: &ImageConfig,
) -> Result<Vec<UnitImage>, RenterKitError> {
    let total = items.len();
    let results: Vec<(usize, Result<UnitImage, RenterKitError>)> =
        stream::iter(items.into_iter().enumerate().map(|(index, item)| async move {
            let result = ingest(store, &item.bytes, item.kind, owner, unit, config).await;
            (index, result)
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    let mut created: Vec<(usize, UnitImage)> = Vec::with_capacity(total);
    let mut first_failure: Option<(usize, RenterKitError)> = None;

    for (index, result) in results {
        match result {
            Ok(record) => created.push((index, record)),
            Err(e) => match &first_failure {
                Some((i, _)) if *i < index => {}
                _ => first_failure = Some((index, e)),
            },
        }
    }

    if let Some((index, error)) = first_failure {
        warn!(
            failed_index = index,
            created = created.len(),
            total,
            "batch ingest failed; rolling back created images"
        );
        for (_, record) in &created {
            cleanup::purge_derivatives(store, record).await;
        }
        return Err(error);
    }

    created.sort_by_key(|(index, _)| *index);
    let records: Vec<UnitImage> = created.into_iter().map(|(_, record)| record).collect();
    info!(count = records.len(), unit = %unit.slug, "batch ingest complete");
    Ok(records)
}
