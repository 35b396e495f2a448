//! GPU probe.
//!
//! Iterates every video controller the management interface reports. Zero
//! adapters is a valid result; per-adapter gaps (no VRAM figure, no driver
//! version, no vendor token) stay gaps instead of failing the probe.

use serde::Serialize;

use crate::hardware::vendor::SubsystemVendor;
use crate::hardware::UNDETERMINED;
use crate::report::json::{na_if_none, scaled_or_na};
use crate::report::{ProbeError, SectionResult, Subsystem};
use crate::source::{ManagementSource, VideoControllerRow};

/// One detected display adapter.
#[derive(Debug, Clone, Serialize)]
pub struct GpuAdapter {
    pub model: String,
    /// Board partner resolved from the device descriptor.
    pub vendor: SubsystemVendor,
    /// Dedicated video memory; absent when the source reports zero/unknown.
    #[serde(rename = "vram", serialize_with = "scaled_or_na")]
    pub vram_bytes: Option<u64>,
    #[serde(serialize_with = "na_if_none")]
    pub driver_version: Option<String>,
}

impl GpuAdapter {
    pub fn detect_all(source: &dyn ManagementSource) -> SectionResult<Vec<GpuAdapter>> {
        let rows = source
            .video_controllers()
            .map_err(|err| ProbeError::new(Subsystem::Gpu, err))?;
        Ok(rows.into_iter().map(GpuAdapter::from_row).collect())
    }

    fn from_row(row: VideoControllerRow) -> GpuAdapter {
        GpuAdapter {
            model: row
                .name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNDETERMINED.to_string()),
            vendor: SubsystemVendor::resolve(row.device_id.as_deref().unwrap_or_default()),
            vram_bytes: row.adapter_ram.filter(|bytes| *bytes > 0),
            driver_version: row
                .driver_version
                .map(|version| version.trim().to_string())
                .filter(|version| !version.is_empty()),
        }
    }
}
