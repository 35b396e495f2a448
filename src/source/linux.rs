//! Linux management-interface adapter.
//!
//! Video controllers are enumerated from the DRM class in sysfs, with names
//! filled in from `lspci` where available; memory modules come from
//! `dmidecode -t 17` (root usually required); the base board from the DMI id
//! files; disks from `/sys/block`. Everything is read through a configurable
//! root so the adapter can be pointed at a fixture tree in tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::debug;

use crate::source::exec::run_with_timeout;
use crate::source::{
    BaseBoardRow, DiskDriveRow, ManagementSource, MemoryModuleRow, SourceError, VideoControllerRow,
};

pub struct SysfsSource {
    timeout: Duration,
    sys_root: PathBuf,
}

impl SysfsSource {
    pub fn connect(timeout: Duration) -> Result<Self, SourceError> {
        let sys_root = PathBuf::from("/sys");
        if !sys_root.join("class").is_dir() {
            return Err(SourceError::Unavailable(
                "sysfs is not mounted at /sys".to_string(),
            ));
        }
        Ok(Self { timeout, sys_root })
    }

    #[cfg(test)]
    fn with_root(sys_root: PathBuf) -> Self {
        Self {
            timeout: Duration::from_secs(5),
            sys_root,
        }
    }

    /// PCI address -> controller name, from `lspci`. Best-effort: without
    /// `lspci` the adapter falls back to bare PCI ids.
    fn lspci_names(&self) -> HashMap<String, String> {
        match run_with_timeout(Command::new("lspci"), self.timeout) {
            Ok(output) => parse_lspci_names(&output),
            Err(err) => {
                debug!("lspci unavailable, using PCI ids for adapter names: {err}");
                HashMap::new()
            }
        }
    }

    fn driver_version(&self, device: &Path) -> Option<String> {
        let driver = fs::read_link(device.join("driver")).ok()?;
        let module = driver.file_name()?.to_string_lossy().into_owned();
        read_field(&self.sys_root.join("module").join(module).join("version"))
    }
}

impl ManagementSource for SysfsSource {
    fn video_controllers(&self) -> Result<Vec<VideoControllerRow>, SourceError> {
        let drm = self.sys_root.join("class/drm");
        if !drm.is_dir() {
            // No DRM class at all: a headless host, not a failure.
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&drm).map_err(|source| SourceError::Read {
            path: drm.clone(),
            source,
        })?;
        // cardN entries are adapters; cardN-<connector> entries are outputs.
        let mut cards: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.starts_with("card") && !name.contains('-')
            })
            .map(|entry| entry.path())
            .collect();
        cards.sort();

        let names = if cards.is_empty() {
            HashMap::new()
        } else {
            self.lspci_names()
        };

        let mut rows = Vec::new();
        for card in cards {
            let device = card.join("device");
            let vendor = read_hex_id(&device.join("vendor"));
            let dev = read_hex_id(&device.join("device"));
            if vendor.is_none() && dev.is_none() {
                continue;
            }
            let sub_vendor = read_hex_id(&device.join("subsystem_vendor"));
            let sub_device = read_hex_id(&device.join("subsystem_device"));

            let slot = read_field(&device.join("uevent")).and_then(|uevent| {
                uevent
                    .lines()
                    .find_map(|line| line.strip_prefix("PCI_SLOT_NAME=").map(str::to_string))
            });
            let name = slot
                .as_deref()
                .and_then(|slot| names.get(slot.trim_start_matches("0000:")).cloned())
                .or_else(|| match (&vendor, &dev) {
                    (Some(v), Some(d)) => Some(format!("PCI device {v}:{d}")),
                    _ => None,
                });

            let adapter_ram = read_field(&device.join("mem_info_vram_total"))
                .and_then(|raw| raw.parse::<u64>().ok());

            rows.push(VideoControllerRow {
                name,
                device_id: Some(build_device_descriptor(
                    vendor.as_deref(),
                    dev.as_deref(),
                    sub_device.as_deref(),
                    sub_vendor.as_deref(),
                )),
                adapter_ram,
                driver_version: self.driver_version(&device),
            });
        }
        Ok(rows)
    }

    fn memory_modules(&self) -> Result<Vec<MemoryModuleRow>, SourceError> {
        let mut command = Command::new("dmidecode");
        command.args(["-t", "17"]);
        let output = run_with_timeout(command, self.timeout)?;
        Ok(parse_dmidecode_modules(&output))
    }

    fn base_boards(&self) -> Result<Vec<BaseBoardRow>, SourceError> {
        let dmi = self.sys_root.join("class/dmi/id");
        let manufacturer = read_field(&dmi.join("board_vendor"));
        let product = read_field(&dmi.join("board_name"));
        // Often root-only; a missing serial does not lose the row.
        let serial_number = read_field(&dmi.join("board_serial"));

        if manufacturer.is_none() && product.is_none() {
            return Ok(Vec::new());
        }
        Ok(vec![BaseBoardRow {
            manufacturer,
            product,
            serial_number,
        }])
    }

    fn disk_drives(&self) -> Result<Vec<DiskDriveRow>, SourceError> {
        let block = self.sys_root.join("block");
        if !block.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&block).map_err(|source| SourceError::Read {
            path: block.clone(),
            source,
        })?;
        let mut devices: Vec<String> = entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !is_virtual_block_device(name))
            .collect();
        devices.sort();

        let mut rows = Vec::new();
        for name in devices {
            let device = block.join(&name);
            let size = read_field(&device.join("size"))
                .and_then(|raw| raw.parse::<u64>().ok())
                .map(|sectors| sectors * 512)
                .filter(|bytes| *bytes > 0);
            let Some(size) = size else {
                // Zero-size entries are empty card readers and similar.
                continue;
            };
            let resolved = fs::canonicalize(&device)
                .map(|path| path.to_string_lossy().into_owned())
                .unwrap_or_default();
            rows.push(DiskDriveRow {
                model: read_field(&device.join("device/model")),
                size: Some(size),
                interface_type: Some(classify_interface(&name, &resolved).to_string()),
            });
        }
        Ok(rows)
    }
}

fn read_field(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_hex_id(path: &Path) -> Option<String> {
    read_field(path).map(|raw| raw.trim_start_matches("0x").to_ascii_uppercase())
}

/// Synthesize a PNP-style descriptor so the vendor resolver sees the same
/// `SUBSYS_<device><vendor>` token Windows reports natively.
fn build_device_descriptor(
    vendor: Option<&str>,
    device: Option<&str>,
    sub_device: Option<&str>,
    sub_vendor: Option<&str>,
) -> String {
    let mut id = format!(
        "PCI\\VEN_{}&DEV_{}",
        vendor.unwrap_or("0000"),
        device.unwrap_or("0000")
    );
    if let (Some(sub_device), Some(sub_vendor)) = (sub_device, sub_vendor) {
        id.push_str(&format!("&SUBSYS_{sub_device}{sub_vendor}"));
    }
    id
}

fn parse_lspci_names(output: &str) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for line in output.lines() {
        if !(line.contains("VGA")
            || line.contains("3D controller")
            || line.contains("Display controller"))
        {
            continue;
        }
        let Some((address, rest)) = line.split_once(' ') else {
            continue;
        };
        let Some((_, name)) = rest.split_once(": ") else {
            continue;
        };
        let name = match name.rfind(" (rev") {
            Some(idx) => &name[..idx],
            None => name,
        };
        names.insert(address.to_string(), name.trim().to_string());
    }
    names
}

/// Parse `dmidecode -t 17` output into one row per populated memory slot.
fn parse_dmidecode_modules(output: &str) -> Vec<MemoryModuleRow> {
    #[derive(Default)]
    struct Block {
        populated: bool,
        capacity: Option<u64>,
        manufacturer: Option<String>,
        speed_mhz: Option<u32>,
        part_number: Option<String>,
    }

    let mut blocks: Vec<Block> = Vec::new();
    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed == "Memory Device" {
            blocks.push(Block {
                populated: true,
                ..Block::default()
            });
            continue;
        }
        let Some(block) = blocks.last_mut() else {
            continue;
        };
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "Size" => {
                if value.eq_ignore_ascii_case("No Module Installed") {
                    block.populated = false;
                } else {
                    block.capacity = parse_dmi_size(value);
                }
            }
            "Manufacturer" => {
                if !is_dmi_placeholder(value) {
                    block.manufacturer = Some(value.to_string());
                }
            }
            "Speed" => {
                block.speed_mhz = value
                    .split_whitespace()
                    .next()
                    .and_then(|raw| raw.parse().ok());
            }
            "Part Number" => {
                if !is_dmi_placeholder(value) {
                    block.part_number = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    blocks
        .into_iter()
        .filter(|block| block.populated)
        .map(|block| MemoryModuleRow {
            manufacturer: block.manufacturer,
            capacity: block.capacity,
            speed_mhz: block.speed_mhz,
            part_number: block.part_number,
        })
        .collect()
}

fn parse_dmi_size(value: &str) -> Option<u64> {
    let mut parts = value.split_whitespace();
    let number: u64 = parts.next()?.parse().ok()?;
    let factor = match parts.next().unwrap_or("MB").to_ascii_uppercase().as_str() {
        "B" => 1,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024u64.pow(3),
        "TB" => 1024u64.pow(4),
        _ => return None,
    };
    Some(number * factor)
}

fn is_dmi_placeholder(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("Unknown")
        || value.eq_ignore_ascii_case("Not Specified")
        || value.eq_ignore_ascii_case("None")
}

fn is_virtual_block_device(name: &str) -> bool {
    const VIRTUAL_PREFIXES: [&str; 7] = ["loop", "ram", "zram", "dm-", "md", "sr", "fd"];
    VIRTUAL_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

fn classify_interface(name: &str, resolved_path: &str) -> &'static str {
    if name.starts_with("nvme") {
        "NVMe"
    } else if name.starts_with("mmcblk") {
        "MMC"
    } else if name.starts_with("vd") {
        "Virtio"
    } else if resolved_path.contains("/usb") {
        "USB"
    } else if resolved_path.contains("/ata") {
        "SATA"
    } else {
        "SCSI"
    }
}
