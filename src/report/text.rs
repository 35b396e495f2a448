//! Plain-text report renderer.
//!
//! Layout is fixed: a banner block with the report title, the generation
//! timestamp, then one banner-introduced section per subsystem in report
//! order. Populated sections render indented field bullets; failed sections
//! render the marker message on a single indented line.

use crate::hardware::board::BoardInfo;
use crate::hardware::cpu::CpuInfo;
use crate::hardware::gpu::GpuAdapter;
use crate::hardware::os::OsInfo;
use crate::hardware::ram::RamInfo;
use crate::hardware::scale::scale_bytes;
use crate::hardware::storage::StorageDevice;
use crate::hardware::UNDETERMINED;
use crate::report::{format_timestamp, InventoryReport, SectionResult, Subsystem};

const TITLE_WIDTH: usize = 41;
const SECTION_WIDTH: usize = 53;

pub fn render(report: &InventoryReport) -> String {
    let mut out = String::new();

    out.push_str(&"=".repeat(TITLE_WIDTH));
    out.push_str("\n   PC hardware inventory report\n");
    out.push_str(&"=".repeat(TITLE_WIDTH));
    out.push('\n');
    out.push_str(&format!(
        "Report generated: {}\n",
        format_timestamp(&report.generated_at)
    ));
    if let Some(general) = &report.general_error {
        out.push_str(&format!("{general}\n"));
    }

    section(&mut out, Subsystem::Cpu, &report.cpu, cpu_bullets);
    section(&mut out, Subsystem::Gpu, &report.gpu, gpu_bullets);
    section(&mut out, Subsystem::Ram, &report.ram, ram_bullets);
    section(
        &mut out,
        Subsystem::Motherboard,
        &report.motherboard,
        board_bullets,
    );
    section(&mut out, Subsystem::Storage, &report.storage, storage_bullets);
    section(&mut out, Subsystem::Os, &report.os, os_bullets);

    out
}

fn section<T>(
    out: &mut String,
    subsystem: Subsystem,
    result: &SectionResult<T>,
    bullets: fn(&mut String, &T),
) {
    out.push('\n');
    out.push_str(&format!(
        "{:=^SECTION_WIDTH$}\n",
        format!(" {} ", subsystem.label())
    ));
    match result {
        Ok(record) => bullets(out, record),
        Err(marker) => out.push_str(&format!("  - {marker}\n")),
    }
}

fn cpu_bullets(out: &mut String, cpu: &CpuInfo) {
    out.push_str(&format!("  - Model: {}\n", cpu.model));
    out.push_str(&format!("  - Architecture: {}\n", cpu.architecture));
    out.push_str(&format!("  - Physical cores: {}\n", count(cpu.physical_cores)));
    out.push_str(&format!(
        "  - Logical processors: {}\n",
        count(cpu.logical_processors)
    ));
}

fn gpu_bullets(out: &mut String, adapters: &Vec<GpuAdapter>) {
    if adapters.is_empty() {
        out.push_str("  - no GPU found\n");
        return;
    }
    for (index, adapter) in adapters.iter().enumerate() {
        out.push_str(&format!("  - Adapter #{}:\n", index + 1));
        if let Some(vendor) = adapter.vendor.name() {
            out.push_str(&format!("    - Vendor: {vendor}\n"));
        }
        out.push_str(&format!("    - Model: {}\n", adapter.model));
        if let Some(vram) = adapter.vram_bytes {
            out.push_str(&format!("    - VRAM: {}\n", scale_bytes(vram)));
        }
        if let Some(driver) = &adapter.driver_version {
            out.push_str(&format!("    - Driver version: {driver}\n"));
        }
    }
}

fn ram_bullets(out: &mut String, ram: &RamInfo) {
    out.push_str(&format!(
        "  - Total installed: {}\n",
        scale_bytes(ram.total_bytes)
    ));
    if ram.modules.is_empty() {
        return;
    }
    out.push_str("  - Installed modules:\n");
    for (index, module) in ram.modules.iter().enumerate() {
        out.push_str(&format!("    - Module #{}:\n", index + 1));
        out.push_str(&format!(
            "      - Manufacturer: {}\n",
            module.manufacturer.as_deref().unwrap_or("N/A")
        ));
        out.push_str(&format!(
            "      - Capacity: {}\n",
            scale_bytes(module.capacity_bytes)
        ));
        match module.speed_mhz {
            Some(speed) => out.push_str(&format!("      - Speed: {speed} MHz\n")),
            None => out.push_str("      - Speed: N/A\n"),
        }
        out.push_str(&format!(
            "      - Part number: {}\n",
            module.part_number.as_deref().unwrap_or("N/A")
        ));
    }
}

fn board_bullets(out: &mut String, board: &BoardInfo) {
    out.push_str(&format!(
        "  - Manufacturer: {}\n",
        board.manufacturer.as_deref().unwrap_or("N/A")
    ));
    out.push_str(&format!(
        "  - Model: {}\n",
        board.model.as_deref().unwrap_or("N/A")
    ));
    out.push_str(&format!(
        "  - Serial number: {}\n",
        board.serial_number.as_deref().unwrap_or("N/A")
    ));
}

fn storage_bullets(out: &mut String, devices: &Vec<StorageDevice>) {
    if devices.is_empty() {
        out.push_str("  - no storage devices detected\n");
        return;
    }
    for (index, device) in devices.iter().enumerate() {
        out.push_str(&format!("  - Disk #{}:\n", index + 1));
        out.push_str(&format!("    - Model: {}\n", device.model));
        out.push_str(&format!(
            "    - Capacity: {}\n",
            scale_bytes(device.capacity_bytes)
        ));
        out.push_str(&format!(
            "    - Interface type: {}\n",
            device.interface.as_deref().unwrap_or("N/A")
        ));
    }
}

fn os_bullets(out: &mut String, os: &OsInfo) {
    out.push_str(&format!(
        "  - System: {} {} ({})\n",
        os.system, os.release, os.version
    ));
    out.push_str(&format!("  - Architecture: {}\n", os.architecture));
}

fn count(value: Option<usize>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => UNDETERMINED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::{fixed_timestamp, StubSource};
    use crate::report::{InventoryReport, ProbeError};

    fn sample_report(source: &StubSource) -> InventoryReport {
        let mut report = InventoryReport::collect(Ok(source));
        report.generated_at = fixed_timestamp();
        report
    }

    #[test]
    fn renders_the_fixed_banner_layout() {
        let source = StubSource::populated();
        let rendered = render(&sample_report(&source));

        assert!(rendered.starts_with(&"=".repeat(41)));
        assert!(rendered.contains("Report generated: 07-08-2026 10:30:00"));
        for label in [
            "Processor (CPU)",
            "Video adapters (GPU)",
            "Memory (RAM)",
            "Motherboard",
            "Storage (SSD/HDD)",
            "Operating system",
        ] {
            assert!(
                rendered.contains(&format!(" {label} ")),
                "missing section banner for {label}"
            );
        }
        assert!(rendered.contains("    - Vendor: ASUS\n"));
        assert!(rendered.contains("    - VRAM: 8.00GB\n"));
        assert!(rendered.contains("      - Part number: CMK32GX4M2B3200C16\n"));
        assert!(rendered.contains("  - Serial number: 210815112801234\n"));
    }

    #[test]
    fn section_order_is_fixed() {
        let source = StubSource::populated();
        let rendered = render(&sample_report(&source));
        let positions: Vec<usize> = [
            "Processor (CPU)",
            "Video adapters (GPU)",
            "Memory (RAM)",
            "Motherboard",
            "Storage (SSD/HDD)",
            "Operating system",
        ]
        .iter()
        .map(|label| rendered.find(label).expect("section present"))
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn zero_adapters_render_the_no_gpu_bullet() {
        let source = StubSource {
            videos: Vec::new(),
            ..StubSource::populated()
        };
        let rendered = render(&sample_report(&source));
        assert!(rendered.contains("  - no GPU found\n"));
    }

    #[test]
    fn failed_section_renders_a_single_marker_line() {
        let source = StubSource {
            boards: Vec::new(),
            ..StubSource::populated()
        };
        let report = sample_report(&source);
        let marker = report.motherboard.as_ref().unwrap_err().to_string();
        let rendered = render(&report);

        assert!(rendered.contains(&format!("  - {marker}\n")));
        // Failure stays confined to its own section.
        assert!(rendered.contains("    - Vendor: ASUS\n"));
        assert!(rendered.contains("  - Total installed: "));
    }

    #[test]
    fn blank_optional_module_fields_render_as_na() {
        let mut source = StubSource::populated();
        source.modules[0].part_number = None;
        source.modules[0].manufacturer = None;
        let rendered = render(&sample_report(&source));
        assert!(rendered.contains("      - Manufacturer: N/A\n"));
        assert!(rendered.contains("      - Part number: N/A\n"));
        assert!(rendered.contains("  - Total installed: "));
    }

    #[test]
    fn rendering_is_idempotent() {
        let source = StubSource::populated();
        let report = sample_report(&source);
        assert_eq!(render(&report), render(&report));
    }

    #[test]
    fn general_error_appears_under_the_title_block() {
        let source = StubSource::populated();
        let mut report = sample_report(&source);
        report.general_error = Some("OS management interface unavailable: denied".to_string());
        report.gpu = Err(ProbeError::new(
            crate::report::Subsystem::Gpu,
            "OS management interface unavailable: denied",
        ));
        let rendered = render(&report);
        assert!(rendered.contains("OS management interface unavailable: denied\n"));
    }
}
