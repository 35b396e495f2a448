//! RAM probe.
//!
//! The installed total comes from the platform's memory stats and the
//! per-module details from the management interface; the two lookups fail
//! independently. A dead module enumeration degrades to an empty module list
//! rather than discarding a perfectly good total.

use serde::Serialize;
use sysinfo::System;
use tracing::warn;

use crate::report::json::{na_if_none, scaled};
use crate::report::{ProbeError, SectionResult, Subsystem};
use crate::source::{ManagementSource, MemoryModuleRow};

/// Installed memory, total plus per-module breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct RamInfo {
    #[serde(rename = "total", serialize_with = "scaled")]
    pub total_bytes: u64,
    pub modules: Vec<RamModule>,
}

/// One physical memory module.
#[derive(Debug, Clone, Serialize)]
pub struct RamModule {
    #[serde(serialize_with = "na_if_none")]
    pub manufacturer: Option<String>,
    #[serde(rename = "capacity", serialize_with = "scaled")]
    pub capacity_bytes: u64,
    #[serde(serialize_with = "na_if_none")]
    pub speed_mhz: Option<u32>,
    #[serde(serialize_with = "na_if_none")]
    pub part_number: Option<String>,
}

impl RamInfo {
    pub fn detect(source: &dyn ManagementSource) -> SectionResult<RamInfo> {
        let mut sys = System::new();
        sys.refresh_memory();
        let total_bytes = sys.total_memory();
        if total_bytes == 0 {
            return Err(ProbeError::new(
                Subsystem::Ram,
                "platform reported no installed memory",
            ));
        }

        let modules = match source.memory_modules() {
            Ok(rows) => rows.into_iter().map(RamModule::from_row).collect(),
            Err(err) => {
                warn!("memory module enumeration failed, reporting total only: {err}");
                Vec::new()
            }
        };

        Ok(RamInfo {
            total_bytes,
            modules,
        })
    }
}

impl RamModule {
    fn from_row(row: MemoryModuleRow) -> RamModule {
        RamModule {
            manufacturer: clean(row.manufacturer),
            capacity_bytes: row.capacity.unwrap_or(0),
            speed_mhz: row.speed_mhz.filter(|mhz| *mhz > 0),
            part_number: clean(row.part_number),
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
