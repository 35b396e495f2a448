//! Storage probe: one entry per physical disk. Zero disks is an empty
//! sequence, not a failure.

use serde::Serialize;

use crate::hardware::UNDETERMINED;
use crate::report::json::{na_if_none, scaled};
use crate::report::{ProbeError, SectionResult, Subsystem};
use crate::source::{DiskDriveRow, ManagementSource};

/// One physical disk drive.
#[derive(Debug, Clone, Serialize)]
pub struct StorageDevice {
    pub model: String,
    #[serde(rename = "capacity", serialize_with = "scaled")]
    pub capacity_bytes: u64,
    #[serde(rename = "interface_type", serialize_with = "na_if_none")]
    pub interface: Option<String>,
}

impl StorageDevice {
    pub fn detect_all(source: &dyn ManagementSource) -> SectionResult<Vec<StorageDevice>> {
        let rows = source
            .disk_drives()
            .map_err(|err| ProbeError::new(Subsystem::Storage, err))?;
        Ok(rows.into_iter().map(StorageDevice::from_row).collect())
    }

    fn from_row(row: DiskDriveRow) -> StorageDevice {
        StorageDevice {
            model: row
                .model
                .map(|model| model.trim().to_string())
                .filter(|model| !model.is_empty())
                .unwrap_or_else(|| UNDETERMINED.to_string()),
            capacity_bytes: row.size.unwrap_or(0),
            interface: row
                .interface_type
                .map(|interface| interface.trim().to_string())
                .filter(|interface| !interface.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_without_failing() {
        let device = StorageDevice::from_row(DiskDriveRow {
            model: None,
            size: Some(512 * 1024u64.pow(3)),
            interface_type: Some(" ".to_string()),
        });
        assert_eq!(device.model, "undetermined");
        assert_eq!(device.capacity_bytes, 512 * 1024u64.pow(3));
        assert_eq!(device.interface, None);
    }
}
