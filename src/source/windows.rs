//! Windows management-interface adapter.
//!
//! Queries WMI classes through `wmic ... /format:csv` and maps the CSV
//! columns by header name, since wmic orders columns alphabetically rather
//! than as requested.

use std::collections::HashMap;
use std::process::Command;
use std::time::Duration;

use crate::source::exec::run_with_timeout;
use crate::source::{
    BaseBoardRow, DiskDriveRow, ManagementSource, MemoryModuleRow, SourceError, VideoControllerRow,
};

pub struct WmiSource {
    timeout: Duration,
}

impl WmiSource {
    pub fn connect(timeout: Duration) -> Result<Self, SourceError> {
        let source = Self { timeout };
        // A trivial query proves both that wmic exists and that the WMI
        // service answers; either failing makes every row query pointless.
        source.rows(&["computersystem", "get", "Name"])?;
        Ok(source)
    }

    fn rows(&self, args: &[&str]) -> Result<Vec<HashMap<String, String>>, SourceError> {
        let mut command = Command::new("wmic");
        command.args(args).arg("/format:csv");
        let output = run_with_timeout(command, self.timeout)?;
        Ok(parse_wmic_csv(&output))
    }
}

impl ManagementSource for WmiSource {
    fn video_controllers(&self) -> Result<Vec<VideoControllerRow>, SourceError> {
        let rows = self.rows(&[
            "path",
            "win32_VideoController",
            "get",
            "AdapterRAM,DriverVersion,Name,PNPDeviceID",
        ])?;
        Ok(rows
            .into_iter()
            .map(|row| VideoControllerRow {
                name: field(&row, "Name"),
                device_id: field(&row, "PNPDeviceID"),
                adapter_ram: numeric_field(&row, "AdapterRAM"),
                driver_version: field(&row, "DriverVersion"),
            })
            .collect())
    }

    fn memory_modules(&self) -> Result<Vec<MemoryModuleRow>, SourceError> {
        let rows = self.rows(&[
            "MemoryChip",
            "get",
            "Capacity,Manufacturer,PartNumber,Speed",
        ])?;
        Ok(rows
            .into_iter()
            .map(|row| MemoryModuleRow {
                manufacturer: field(&row, "Manufacturer"),
                capacity: numeric_field(&row, "Capacity"),
                speed_mhz: numeric_field(&row, "Speed").map(|speed| speed as u32),
                part_number: field(&row, "PartNumber"),
            })
            .collect())
    }

    fn base_boards(&self) -> Result<Vec<BaseBoardRow>, SourceError> {
        let rows = self.rows(&["baseboard", "get", "Manufacturer,Product,SerialNumber"])?;
        Ok(rows
            .into_iter()
            .map(|row| BaseBoardRow {
                manufacturer: field(&row, "Manufacturer"),
                product: field(&row, "Product"),
                serial_number: field(&row, "SerialNumber"),
            })
            .collect())
    }

    fn disk_drives(&self) -> Result<Vec<DiskDriveRow>, SourceError> {
        let rows = self.rows(&["diskdrive", "get", "InterfaceType,Model,Size"])?;
        Ok(rows
            .into_iter()
            .map(|row| DiskDriveRow {
                model: field(&row, "Model"),
                size: numeric_field(&row, "Size"),
                interface_type: field(&row, "InterfaceType"),
            })
            .collect())
    }
}

fn field(row: &HashMap<String, String>, name: &str) -> Option<String> {
    row.get(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn numeric_field(row: &HashMap<String, String>, name: &str) -> Option<u64> {
    field(row, name).and_then(|value| value.parse().ok())
}

/// Parse wmic CSV output: a header row naming the columns, then one row per
/// instance. Rows whose field count disagrees with the header are dropped.
fn parse_wmic_csv(output: &str) -> Vec<HashMap<String, String>> {
    let mut lines = output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    lines
        .filter_map(|line| {
            let values: Vec<&str> = line.split(',').collect();
            if values.len() != columns.len() {
                return None;
            }
            Some(
                columns
                    .iter()
                    .zip(values)
                    .map(|(column, value)| (column.to_string(), value.trim().to_string()))
                    .collect(),
            )
        })
        .collect()
}
