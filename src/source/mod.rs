//! Boundary to the OS management interface.
//!
//! The probes never talk to the platform directly; they consume a
//! [`ManagementSource`] handing out typed rows per subsystem, so that every
//! query is individually fallible and a probe can be exercised against a stub
//! in tests. One adapter exists per supported platform:
//!
//! - Linux: sysfs (DRM, DMI, block devices) plus `lspci` and `dmidecode`
//! - Windows: `wmic` CSV queries

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[cfg(any(target_os = "linux", target_os = "windows"))]
mod exec;
#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "windows")]
mod windows;

/// One detected video controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoControllerRow {
    pub name: Option<String>,
    /// Raw device descriptor carrying the `SUBSYS_` vendor token.
    pub device_id: Option<String>,
    /// Dedicated video memory in bytes.
    pub adapter_ram: Option<u64>,
    pub driver_version: Option<String>,
}

/// One installed physical memory module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryModuleRow {
    pub manufacturer: Option<String>,
    /// Module capacity in bytes.
    pub capacity: Option<u64>,
    pub speed_mhz: Option<u32>,
    pub part_number: Option<String>,
}

/// One base board. Hosts report at most one; an empty enumeration means the
/// platform exposed no board at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseBoardRow {
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

/// One physical disk drive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskDriveRow {
    pub model: Option<String>,
    /// Drive capacity in bytes.
    pub size: Option<u64>,
    pub interface_type: Option<String>,
}

/// Row enumerations offered by the OS management interface. Every call is
/// fallible on its own; callers decide how much of a failure to tolerate.
pub trait ManagementSource {
    fn video_controllers(&self) -> Result<Vec<VideoControllerRow>, SourceError>;
    fn memory_modules(&self) -> Result<Vec<MemoryModuleRow>, SourceError>;
    fn base_boards(&self) -> Result<Vec<BaseBoardRow>, SourceError>;
    fn disk_drives(&self) -> Result<Vec<DiskDriveRow>, SourceError>;
}

/// Failure while querying the management interface.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} failed: {reason}")]
    Failed { command: String, reason: String },
    #[error("{command} did not finish within {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Unavailable(String),
}

/// Open the platform's management interface. Fails when the host has no
/// usable adapter, which leaves only the CPU and OS probes functional.
pub fn connect(timeout: Duration) -> Result<Box<dyn ManagementSource>, SourceError> {
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(linux::SysfsSource::connect(timeout)?))
    }

    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(windows::WmiSource::connect(timeout)?))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        let _ = timeout;
        Err(SourceError::Unavailable(format!(
            "no management interface adapter for {}",
            std::env::consts::OS
        )))
    }
}
