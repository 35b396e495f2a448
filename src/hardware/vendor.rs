//! Board-partner identification from raw device descriptors.
//!
//! PCI device descriptors (`PCI\VEN_xxxx&DEV_xxxx&SUBSYS_ssssvvvv&...`) embed
//! a subsystem-vendor ID in the low word of the `SUBSYS_` token. That ID names
//! the board partner (ASUS, MSI, ...) as opposed to the chip maker encoded in
//! `VEN_`.

use serde::{Serialize, Serializer};

/// Subsystem-vendor IDs of the common discrete-GPU board partners and the
/// chip vendors' own reference boards.
const VENDOR_TABLE: &[(&str, &str)] = &[
    ("1002", "AMD (Reference Card)"),
    ("1043", "ASUS"),
    ("10DE", "NVIDIA (Founders Edition)"),
    ("1458", "Gigabyte"),
    ("1462", "MSI (Micro-Star International)"),
    ("1569", "Palit"),
    ("1682", "XFX"),
    ("19DA", "Zotac"),
    ("1B4C", "KFA2 / GALAX"),
    ("1DA2", "Sapphire"),
    ("1F0A", "PowerColor"),
    ("3842", "EVGA"),
    ("8086", "Intel"),
];

/// Outcome of resolving a board partner from a device descriptor.
///
/// Resolution never fails: an ID missing from the table keeps the raw hex
/// digits, and a descriptor without a `SUBSYS_` token yields `Undetermined`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubsystemVendor {
    Known(&'static str),
    Unknown { svid: String },
    Undetermined,
}

impl SubsystemVendor {
    /// Resolve the board partner from a raw device descriptor string.
    pub fn resolve(descriptor: &str) -> Self {
        let Some(svid) = extract_svid(descriptor) else {
            return Self::Undetermined;
        };
        match VENDOR_TABLE.iter().find(|(id, _)| *id == svid) {
            Some(&(_, name)) => Self::Known(name),
            None => Self::Unknown { svid },
        }
    }

    /// Human-readable vendor name, or `None` when no vendor was determinable.
    pub fn name(&self) -> Option<String> {
        match self {
            Self::Known(name) => Some((*name).to_string()),
            Self::Unknown { svid } => Some(format!("Unknown vendor (SVID: {svid})")),
            Self::Undetermined => None,
        }
    }
}

impl Serialize for SubsystemVendor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => serializer.serialize_str(&name),
            None => serializer.serialize_str("N/A"),
        }
    }
}

/// Extract the uppercased subsystem-vendor ID from the first `SUBSYS_` token
/// whose low word is four hex digits. The high word carries the subsystem
/// device ID and is not inspected.
fn extract_svid(descriptor: &str) -> Option<String> {
    const TOKEN: &str = "SUBSYS_";

    let upper = descriptor.to_ascii_uppercase();
    let mut rest = upper.as_str();
    while let Some(pos) = rest.find(TOKEN) {
        let tail = &rest.as_bytes()[pos + TOKEN.len()..];
        if tail.len() >= 8 && tail[4..8].iter().all(u8::is_ascii_hexdigit) {
            return Some(String::from_utf8_lossy(&tail[4..8]).into_owned());
        }
        rest = &rest[pos + TOKEN.len()..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::SubsystemVendor;

    #[test]
    fn resolves_known_board_partner_from_low_word() {
        let vendor =
            SubsystemVendor::resolve("PCI\\VEN_10DE&DEV_2484&SUBSYS_87C51043&REV_A1\\4&2283F625");
        assert_eq!(vendor, SubsystemVendor::Known("ASUS"));
        assert_eq!(vendor.name().as_deref(), Some("ASUS"));
    }

    #[test]
    fn unmapped_id_keeps_the_raw_hex_digits() {
        let vendor = SubsystemVendor::resolve("PCI\\VEN_1002&DEV_73BF&SUBSYS_0000FFFF");
        assert_eq!(
            vendor,
            SubsystemVendor::Unknown {
                svid: "FFFF".to_string()
            }
        );
        assert!(vendor.name().unwrap().contains("FFFF"));
    }

    #[test]
    fn descriptor_without_token_is_undetermined() {
        let vendor = SubsystemVendor::resolve("ROOT\\BasicDisplay\\0000");
        assert_eq!(vendor, SubsystemVendor::Undetermined);
        assert_eq!(vendor.name(), None);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let lower = SubsystemVendor::resolve("pci\\ven_10de&dev_2484&subsys_87c51043");
        assert_eq!(lower, SubsystemVendor::Known("ASUS"));
    }

    #[test]
    fn truncated_token_is_skipped_in_favor_of_a_later_match() {
        let vendor = SubsystemVendor::resolve("SUBSYS_XY SUBSYS_12341462&REV_00");
        assert_eq!(
            vendor,
            SubsystemVendor::Known("MSI (Micro-Star International)")
        );
    }

    #[test]
    fn chip_vendor_reference_boards_resolve() {
        let nvidia = SubsystemVendor::resolve("PCI\\VEN_10DE&DEV_2684&SUBSYS_168910DE");
        assert_eq!(nvidia, SubsystemVendor::Known("NVIDIA (Founders Edition)"));
    }
}
