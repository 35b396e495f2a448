//! CPU probe.
//!
//! The brand string and the core counts are two independently-fallible
//! lookups: losing one still reports the other, with "undetermined" filling
//! the gaps. Only a host that reports neither fails the probe outright.

use serde::Serialize;
use sysinfo::System;

use crate::hardware::UNDETERMINED;
use crate::report::json::na_if_none;
use crate::report::{ProbeError, SectionResult, Subsystem};

/// CPU information.
#[derive(Debug, Clone, Serialize)]
pub struct CpuInfo {
    /// Brand string (e.g., "AMD Ryzen 7 5800X 8-Core Processor").
    pub model: String,
    /// Machine architecture the binary runs on.
    pub architecture: String,
    #[serde(serialize_with = "na_if_none")]
    pub physical_cores: Option<usize>,
    #[serde(serialize_with = "na_if_none")]
    pub logical_processors: Option<usize>,
}

impl CpuInfo {
    pub fn detect() -> SectionResult<CpuInfo> {
        let mut sys = System::new();
        sys.refresh_cpu_all();

        let cpus = sys.cpus();
        let model = cpus
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty());
        let logical_processors = if cpus.is_empty() {
            None
        } else {
            Some(cpus.len())
        };
        let physical_cores = sys.physical_core_count();

        if model.is_none() && logical_processors.is_none() && physical_cores.is_none() {
            return Err(ProbeError::new(
                Subsystem::Cpu,
                "no processors reported by the platform",
            ));
        }

        // A physical count above the logical count is a platform reporting
        // glitch; clamp rather than publish an impossible pair.
        let physical_cores = match (physical_cores, logical_processors) {
            (Some(physical), Some(logical)) => Some(physical.min(logical)),
            (physical, _) => physical,
        };

        Ok(CpuInfo {
            model: model.unwrap_or_else(|| UNDETERMINED.to_string()),
            architecture: std::env::consts::ARCH.to_string(),
            physical_cores,
            logical_processors,
        })
    }
}
