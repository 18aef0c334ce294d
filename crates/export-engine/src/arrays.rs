//! Stacked-array writers for the training artifacts.

use std::path::Path;

use ndarray::{Array2, Array4};
use ndarray_npy::write_npy;
use playtrace_common::error::{PlaytraceError, PlaytraceResult};
use playtrace_dataset_model::{DatasetItem, KeyEncoder, BYTES_PER_PIXEL};

/// Write all frames as one `[n, h, w, 3]` u8 array.
///
/// Every frame must share the first frame's geometry; a mismatch means
/// the capture backend changed resolution mid-session, which the
/// stacked format cannot represent.
pub fn write_frame_stack(path: &Path, items: &[DatasetItem]) -> PlaytraceResult<()> {
    let first = items.first().ok_or(PlaytraceError::EmptySession)?;
    let geometry = first.frame.geometry();
    let height = geometry.height as usize;
    let width = geometry.width as usize;

    let mut data = Vec::with_capacity(items.len() * height * width * BYTES_PER_PIXEL);
    for item in items {
        if item.frame.geometry() != geometry {
            return Err(PlaytraceError::export(format!(
                "Frame geometry changed mid-session: expected {}x{}, got {}x{}",
                geometry.width,
                geometry.height,
                item.frame.width(),
                item.frame.height()
            )));
        }
        data.extend_from_slice(item.frame.data());
    }

    let stack = Array4::from_shape_vec((items.len(), height, width, BYTES_PER_PIXEL), data)
        .map_err(|e| PlaytraceError::export(format!("Failed to shape frame stack: {e}")))?;
    write_npy(path, &stack)
        .map_err(|e| PlaytraceError::export(format!("Failed to write {}: {e}", path.display())))
}

/// Write all held-key sets as one `[n, k]` f32 one-hot array.
pub fn write_key_stack(
    path: &Path,
    items: &[DatasetItem],
    encoder: &KeyEncoder,
) -> PlaytraceResult<()> {
    let mut data = Vec::with_capacity(items.len() * encoder.len());
    for item in items {
        data.extend(encoder.encode(&item.keys));
    }

    let stack = Array2::from_shape_vec((items.len(), encoder.len()), data)
        .map_err(|e| PlaytraceError::export(format!("Failed to shape key stack: {e}")))?;
    write_npy(path, &stack)
        .map_err(|e| PlaytraceError::export(format!("Failed to write {}: {e}", path.display())))
}
