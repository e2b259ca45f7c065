//! Camera device enumeration.

use nokhwa::query;
use nokhwa::utils::ApiBackend;

use super::types::{CameraError, CameraInfo};

/// List the cameras the native backend can see, ordered by index.
///
/// An empty list is not an error; callers decide whether "no camera" is fatal.
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    let mut cameras: Vec<CameraInfo> = devices
        .into_iter()
        .filter_map(|d| {
            let index = d.index().as_index().ok()?;
            Some(CameraInfo {
                index,
                name: d.human_name(),
                description: d.description().to_string(),
            })
        })
        .collect();
    cameras.sort_by_key(|c| c.index);
    Ok(cameras)
}

/// Look up a single camera by index.
pub fn find_device(index: u32) -> Result<CameraInfo, CameraError> {
    list_devices()?
        .into_iter()
        .find(|d| d.index == index)
        .ok_or(CameraError::DeviceNotFound(index))
}
