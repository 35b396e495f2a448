//! Structured (JSON) report renderer.
//!
//! Emits one object keyed by subsystem. Optional scalar fields serialize as
//! the explicit `"N/A"` sentinel; the GPU/storage sequences stay plain arrays
//! (empty when nothing was detected); a failed subsystem serializes as
//! `{"error": "<message>"}` in place of its record. `general_error` appears
//! at the top level only when the management interface itself was
//! unreachable.

use anyhow::Result;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::hardware::scale::scale_bytes;
use crate::report::{format_timestamp, InventoryReport, SectionResult};

/// Serialize an optional field, substituting the `"N/A"` sentinel.
pub(crate) fn na_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(value) => value.serialize(serializer),
        None => serializer.serialize_str("N/A"),
    }
}

/// Serialize a byte count in its scaled human-readable form.
pub(crate) fn scaled<S: Serializer>(bytes: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&scale_bytes(*bytes))
}

/// Serialize an optional byte count in scaled form, `"N/A"` when absent.
pub(crate) fn scaled_or_na<S: Serializer>(
    bytes: &Option<u64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => serializer.serialize_str(&scale_bytes(*bytes)),
        None => serializer.serialize_str("N/A"),
    }
}

/// Top-level document; field order here is the emitted key order.
#[derive(Serialize)]
struct JsonReport {
    report_date: String,
    cpu: Value,
    gpu: Value,
    ram: Value,
    motherboard: Value,
    storage: Value,
    os: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    general_error: Option<String>,
}

pub fn render(report: &InventoryReport) -> Result<String> {
    let document = JsonReport {
        report_date: format_timestamp(&report.generated_at),
        cpu: section(&report.cpu)?,
        gpu: section(&report.gpu)?,
        ram: section(&report.ram)?,
        motherboard: section(&report.motherboard)?,
        storage: section(&report.storage)?,
        os: section(&report.os)?,
        general_error: report.general_error.clone(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

fn section<T: Serialize>(result: &SectionResult<T>) -> Result<Value> {
    Ok(match result {
        Ok(record) => serde_json::to_value(record)?,
        Err(marker) => json!({ "error": marker.to_string() }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::{fixed_timestamp, StubSource};
    use crate::report::InventoryReport;
    use crate::source::SourceError;

    fn sample_document(source: &StubSource) -> Value {
        let mut report = InventoryReport::collect(Ok(source));
        report.generated_at = fixed_timestamp();
        serde_json::from_str(&render(&report).unwrap()).unwrap()
    }

    #[test]
    fn populated_report_uses_the_fixed_key_set() {
        let source = StubSource::populated();
        let document = sample_document(&source);

        assert_eq!(document["report_date"], json!("07-08-2026 10:30:00"));
        assert_eq!(
            document["gpu"],
            json!([{
                "model": "NVIDIA GeForce RTX 3070",
                "vendor": "ASUS",
                "vram": "8.00GB",
                "driver_version": "31.0.15.3623"
            }])
        );
        let total = document["ram"]["total"].as_str().unwrap();
        assert!(total.ends_with('B'), "total not scaled: {total}");
        assert_eq!(
            document["ram"]["modules"][0]["part_number"],
            json!("CMK32GX4M2B3200C16")
        );
        assert_eq!(
            document["motherboard"]["model"],
            json!("ROG STRIX B550-F GAMING")
        );
        assert_eq!(document["storage"][0]["interface_type"], json!("NVMe"));
        assert_eq!(document["os"]["architecture"], json!(std::env::consts::ARCH));
        assert!(document.get("general_error").is_none());
    }

    #[test]
    fn zero_adapters_serialize_as_an_empty_sequence() {
        let source = StubSource {
            videos: Vec::new(),
            ..StubSource::populated()
        };
        let document = sample_document(&source);
        assert_eq!(document["gpu"], json!([]));
    }

    #[test]
    fn failed_subsystem_serializes_as_an_error_object() {
        let source = StubSource {
            boards: Vec::new(),
            ..StubSource::populated()
        };
        let document = sample_document(&source);

        let error = document["motherboard"]["error"]
            .as_str()
            .expect("marker object");
        assert!(error.contains("Motherboard"));
        // Other sections stay populated.
        assert!(document["gpu"].as_array().is_some());
        assert!(document["cpu"]["model"].as_str().is_some());
    }

    #[test]
    fn blank_optional_fields_serialize_as_the_sentinel() {
        let mut source = StubSource::populated();
        source.modules[0].part_number = Some("   ".to_string());
        source.modules[0].speed_mhz = None;
        let document = sample_document(&source);

        let module = &document["ram"]["modules"][0];
        assert_eq!(module["part_number"], json!("N/A"));
        assert_eq!(module["speed_mhz"], json!("N/A"));
        assert_eq!(module["manufacturer"], json!("Corsair"));
        // The total stays a correctly scaled size string.
        let total = document["ram"]["total"].as_str().unwrap();
        assert!(total.ends_with('B') && total.contains('.'));
    }

    #[test]
    fn dead_connection_sets_general_error_and_error_objects() {
        let err = SourceError::Unavailable("access denied".to_string());
        let mut report = InventoryReport::collect(Err(&err));
        report.generated_at = fixed_timestamp();
        let document: Value = serde_json::from_str(&render(&report).unwrap()).unwrap();

        assert!(document["general_error"]
            .as_str()
            .unwrap()
            .contains("privileges"));
        assert!(document["gpu"]["error"].as_str().is_some());
        assert!(document["storage"]["error"].as_str().is_some());
        assert!(document["cpu"]["model"].as_str().is_some());
        assert!(document["os"]["system"].as_str().is_some());
    }

    #[test]
    fn rendering_is_idempotent() {
        let source = StubSource::populated();
        let mut report = InventoryReport::collect(Ok(&source));
        report.generated_at = fixed_timestamp();
        assert_eq!(render(&report).unwrap(), render(&report).unwrap());
    }
}
