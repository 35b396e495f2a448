//! Operating system probe. Reads only local platform descriptors; a failure
//! here means the environment is severely degraded.

use serde::Serialize;
use sysinfo::System;

use crate::hardware::UNDETERMINED;
use crate::report::{ProbeError, SectionResult, Subsystem};

/// Operating system identification.
#[derive(Debug, Clone, Serialize)]
pub struct OsInfo {
    /// Platform name (e.g., "Windows", "Ubuntu").
    pub system: String,
    pub release: String,
    /// Long form of the version string.
    pub version: String,
    pub architecture: String,
}

impl OsInfo {
    pub fn detect() -> SectionResult<OsInfo> {
        let system = System::name();
        let release = System::os_version();
        let version = System::long_os_version();

        if system.is_none() && release.is_none() && version.is_none() {
            return Err(ProbeError::new(
                Subsystem::Os,
                "platform descriptors are unavailable",
            ));
        }

        Ok(OsInfo {
            system: system.unwrap_or_else(|| UNDETERMINED.to_string()),
            release: release.unwrap_or_else(|| UNDETERMINED.to_string()),
            version: version.unwrap_or_else(|| UNDETERMINED.to_string()),
            architecture: std::env::consts::ARCH.to_string(),
        })
    }
}
