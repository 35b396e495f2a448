//! Motherboard probe.
//!
//! Hosts expose exactly one base board; an empty enumeration is the failure
//! state here, not an empty record.

use serde::Serialize;

use crate::report::json::na_if_none;
use crate::report::{ProbeError, SectionResult, Subsystem};
use crate::source::ManagementSource;

/// Base board identification.
#[derive(Debug, Clone, Serialize)]
pub struct BoardInfo {
    #[serde(serialize_with = "na_if_none")]
    pub manufacturer: Option<String>,
    #[serde(serialize_with = "na_if_none")]
    pub model: Option<String>,
    #[serde(serialize_with = "na_if_none")]
    pub serial_number: Option<String>,
}

impl BoardInfo {
    pub fn detect(source: &dyn ManagementSource) -> SectionResult<BoardInfo> {
        let rows = source
            .base_boards()
            .map_err(|err| ProbeError::new(Subsystem::Motherboard, err))?;
        let row = rows.into_iter().next().ok_or_else(|| {
            ProbeError::new(
                Subsystem::Motherboard,
                "no base board reported by the management interface",
            )
        })?;
        Ok(BoardInfo {
            manufacturer: clean(row.manufacturer),
            model: clean(row.product),
            serial_number: clean(row.serial_number),
        })
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
