//! Report aggregation.
//!
//! [`InventoryReport::collect`] runs the six probes in the fixed report order
//! and records each outcome independently: every subsystem slot holds either
//! a populated record or the error marker for that subsystem, never both.
//! When the management interface itself is down, the CPU and OS probes (which
//! do not depend on it) still run, and the dependent subsystems share one
//! connection-level marker instead of four copies of the same low-level
//! error.

pub mod json;
pub mod text;

use std::fmt;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::hardware::board::BoardInfo;
use crate::hardware::cpu::CpuInfo;
use crate::hardware::gpu::GpuAdapter;
use crate::hardware::os::OsInfo;
use crate::hardware::ram::RamInfo;
use crate::hardware::storage::StorageDevice;
use crate::source::{ManagementSource, SourceError};

/// The six inventoried subsystems, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Cpu,
    Gpu,
    Ram,
    Motherboard,
    Storage,
    Os,
}

impl Subsystem {
    /// Section label, shared by the text banners and the failure markers so
    /// both serializers render subsystems under one name.
    pub fn label(self) -> &'static str {
        match self {
            Subsystem::Cpu => "Processor (CPU)",
            Subsystem::Gpu => "Video adapters (GPU)",
            Subsystem::Ram => "Memory (RAM)",
            Subsystem::Motherboard => "Motherboard",
            Subsystem::Storage => "Storage (SSD/HDD)",
            Subsystem::Os => "Operating system",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure marker substituted for a subsystem record when its probe fails.
#[derive(Debug, Clone, Error)]
#[error("could not collect {subsystem} information: {message}")]
pub struct ProbeError {
    pub subsystem: Subsystem,
    pub message: String,
}

impl ProbeError {
    pub fn new(subsystem: Subsystem, cause: impl fmt::Display) -> Self {
        Self {
            subsystem,
            message: cause.to_string(),
        }
    }
}

/// Outcome of one probe: a record, or the marker for that subsystem alone.
pub type SectionResult<T> = Result<T, ProbeError>;

/// One complete collection run. Immutable once assembled.
#[derive(Debug)]
pub struct InventoryReport {
    pub generated_at: DateTime<Local>,
    pub cpu: SectionResult<CpuInfo>,
    pub gpu: SectionResult<Vec<GpuAdapter>>,
    pub ram: SectionResult<RamInfo>,
    pub motherboard: SectionResult<BoardInfo>,
    pub storage: SectionResult<Vec<StorageDevice>>,
    pub os: SectionResult<OsInfo>,
    /// Set only when the management interface itself was unreachable.
    pub general_error: Option<String>,
}

impl InventoryReport {
    /// Run every probe and assemble their outcomes. The timestamp is taken
    /// before the first probe runs.
    pub fn collect(source: Result<&dyn ManagementSource, &SourceError>) -> Self {
        let generated_at = Local::now();
        match source {
            Ok(source) => InventoryReport {
                generated_at,
                cpu: CpuInfo::detect(),
                gpu: GpuAdapter::detect_all(source),
                ram: RamInfo::detect(source),
                motherboard: BoardInfo::detect(source),
                storage: StorageDevice::detect_all(source),
                os: OsInfo::detect(),
                general_error: None,
            },
            Err(err) => {
                // One shared cause for everything behind the dead connection.
                let cause = format!("OS management interface unavailable: {err}");
                InventoryReport {
                    generated_at,
                    cpu: CpuInfo::detect(),
                    gpu: Err(ProbeError::new(Subsystem::Gpu, &cause)),
                    ram: Err(ProbeError::new(Subsystem::Ram, &cause)),
                    motherboard: Err(ProbeError::new(Subsystem::Motherboard, &cause)),
                    storage: Err(ProbeError::new(Subsystem::Storage, &cause)),
                    os: OsInfo::detect(),
                    general_error: Some(format!(
                        "{cause}; administrative privileges may be required to query some subsystems"
                    )),
                }
            }
        }
    }

    /// Whether any section carries a marker instead of a record.
    pub fn has_failures(&self) -> bool {
        self.general_error.is_some()
            || self.cpu.is_err()
            || self.gpu.is_err()
            || self.ram.is_err()
            || self.motherboard.is_err()
            || self.storage.is_err()
            || self.os.is_err()
    }
}

/// Report timestamp in the fixed `DD-MM-YYYY HH:MM:SS` layout used by both
/// serializers.
pub fn format_timestamp(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%d-%m-%Y %H:%M:%S").to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::source::{
        BaseBoardRow, DiskDriveRow, MemoryModuleRow, SourceError, VideoControllerRow,
    };
    use chrono::TimeZone;

    /// Stub management source with per-subsystem switchable failures.
    #[derive(Default)]
    pub struct StubSource {
        pub fail_video: bool,
        pub fail_memory: bool,
        pub fail_boards: bool,
        pub fail_disks: bool,
        pub videos: Vec<VideoControllerRow>,
        pub modules: Vec<MemoryModuleRow>,
        pub boards: Vec<BaseBoardRow>,
        pub disks: Vec<DiskDriveRow>,
    }

    impl StubSource {
        pub fn populated() -> Self {
            StubSource {
                videos: vec![VideoControllerRow {
                    name: Some("NVIDIA GeForce RTX 3070".to_string()),
                    device_id: Some("PCI\\VEN_10DE&DEV_2484&SUBSYS_87C51043".to_string()),
                    adapter_ram: Some(8 * 1024u64.pow(3)),
                    driver_version: Some("31.0.15.3623".to_string()),
                }],
                modules: vec![MemoryModuleRow {
                    manufacturer: Some("Corsair".to_string()),
                    capacity: Some(16 * 1024u64.pow(3)),
                    speed_mhz: Some(3200),
                    part_number: Some("CMK32GX4M2B3200C16".to_string()),
                }],
                boards: vec![BaseBoardRow {
                    manufacturer: Some("ASUSTeK COMPUTER INC.".to_string()),
                    product: Some("ROG STRIX B550-F GAMING".to_string()),
                    serial_number: Some("210815112801234".to_string()),
                }],
                disks: vec![DiskDriveRow {
                    model: Some("Samsung SSD 970 EVO Plus 1TB".to_string()),
                    size: Some(1000 * 1000u64.pow(3)),
                    interface_type: Some("NVMe".to_string()),
                }],
                ..StubSource::default()
            }
        }
    }

    impl ManagementSource for StubSource {
        fn video_controllers(&self) -> Result<Vec<VideoControllerRow>, SourceError> {
            if self.fail_video {
                return Err(SourceError::Unavailable(
                    "video controller enumeration refused".to_string(),
                ));
            }
            Ok(self.videos.clone())
        }

        fn memory_modules(&self) -> Result<Vec<MemoryModuleRow>, SourceError> {
            if self.fail_memory {
                return Err(SourceError::Unavailable(
                    "memory module enumeration refused".to_string(),
                ));
            }
            Ok(self.modules.clone())
        }

        fn base_boards(&self) -> Result<Vec<BaseBoardRow>, SourceError> {
            if self.fail_boards {
                return Err(SourceError::Unavailable(
                    "base board enumeration refused".to_string(),
                ));
            }
            Ok(self.boards.clone())
        }

        fn disk_drives(&self) -> Result<Vec<DiskDriveRow>, SourceError> {
            if self.fail_disks {
                return Err(SourceError::Unavailable(
                    "disk drive enumeration refused".to_string(),
                ));
            }
            Ok(self.disks.clone())
        }
    }

    /// A timestamp that keeps serializer output reproducible across runs.
    pub fn fixed_timestamp() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 8, 7, 10, 30, 0)
            .single()
            .expect("unambiguous local time")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::StubSource;
    use super::*;

    #[test]
    fn probes_run_in_isolation_from_each_other() {
        let source = StubSource {
            fail_video: true,
            ..StubSource::populated()
        };
        let report = InventoryReport::collect(Ok(&source));

        let gpu_err = report.gpu.as_ref().unwrap_err();
        assert_eq!(gpu_err.subsystem, Subsystem::Gpu);
        assert!(gpu_err.message.contains("refused"));

        assert!(report.cpu.is_ok());
        assert!(report.os.is_ok());
        assert!(report.ram.is_ok());
        assert!(report.motherboard.is_ok());
        assert!(report.storage.is_ok());
        assert!(report.general_error.is_none());
        assert!(report.has_failures());
    }

    #[test]
    fn empty_board_enumeration_marks_only_the_motherboard() {
        let source = StubSource {
            boards: Vec::new(),
            ..StubSource::populated()
        };
        let report = InventoryReport::collect(Ok(&source));

        let board_err = report.motherboard.as_ref().unwrap_err();
        assert_eq!(board_err.subsystem, Subsystem::Motherboard);
        assert!(report.cpu.is_ok());
        assert!(report.gpu.is_ok());
        assert!(report.storage.is_ok());
    }

    #[test]
    fn module_enumeration_failure_keeps_the_ram_total() {
        let source = StubSource {
            fail_memory: true,
            ..StubSource::populated()
        };
        let report = InventoryReport::collect(Ok(&source));

        let ram = report.ram.as_ref().expect("total survives module failure");
        assert!(ram.total_bytes > 0);
        assert!(ram.modules.is_empty());
    }

    #[test]
    fn dead_connection_shares_one_cause_and_spares_cpu_and_os() {
        let err = SourceError::Unavailable("access denied".to_string());
        let report = InventoryReport::collect(Err(&err));

        assert!(report.cpu.is_ok());
        assert!(report.os.is_ok());

        let gpu_message = &report.gpu.as_ref().unwrap_err().message;
        assert!(gpu_message.contains("access denied"));
        assert_eq!(gpu_message, &report.ram.as_ref().unwrap_err().message);
        assert_eq!(
            gpu_message,
            &report.motherboard.as_ref().unwrap_err().message
        );
        assert_eq!(gpu_message, &report.storage.as_ref().unwrap_err().message);

        let general = report.general_error.as_deref().unwrap();
        assert!(general.contains("access denied"));
        assert!(general.contains("privileges"));
    }

    #[test]
    fn fully_populated_run_has_no_failures() {
        let source = StubSource::populated();
        let report = InventoryReport::collect(Ok(&source));
        assert!(!report.has_failures());
        assert_eq!(report.gpu.as_ref().unwrap().len(), 1);
        assert_eq!(report.storage.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn timestamps_use_the_fixed_layout() {
        let stamp = format_timestamp(&test_support::fixed_timestamp());
        assert_eq!(stamp, "07-08-2026 10:30:00");
    }
}
