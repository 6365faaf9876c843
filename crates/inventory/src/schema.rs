//! Wire schema for the reporting backend's saved-query report.
//!
//! Rows arrive loosely shaped; every field is optional at the wire level
//! and validated here. The policy for partial rows is filter-per-row with
//! a diagnostic: one broken reporter must not block reminders for the
//! rest of the fleet, and a malformed row must never coerce into an
//! empty-field [`HostRecord`].

use serde::Deserialize;
use stalewatch_core::{HostRecord, Platform};

use crate::InventorySnapshot;

/// One host row as returned by the report endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRow {
    /// Device serial; required for a usable row.
    #[serde(default)]
    pub hardware_serial: Option<String>,
    /// Platform token; required for a usable row.
    #[serde(default)]
    pub platform: Option<String>,
    /// Reported OS version; required for a usable row.
    #[serde(default)]
    pub observed_version: Option<String>,
}

/// Full report document.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportDocument {
    /// All rows the backend has for the saved query.
    pub results: Vec<ReportRow>,
}

impl ReportDocument {
    /// Convert the document into a snapshot, dropping malformed rows.
    pub fn into_snapshot(self) -> InventorySnapshot {
        let mut hosts = Vec::with_capacity(self.results.len());
        let mut skipped_rows: u32 = 0;

        for row in self.results {
            match validate_row(row) {
                Ok(host) => hosts.push(host),
                Err(reason) => {
                    skipped_rows += 1;
                    tracing::warn!(reason = %reason, "Dropping malformed inventory row");
                }
            }
        }

        InventorySnapshot { hosts, skipped_rows }
    }
}

/// Check one row for the non-empty fields a [`HostRecord`] requires.
fn validate_row(row: ReportRow) -> Result<HostRecord, String> {
    let serial = match row.hardware_serial.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => return Err("missing or empty hardware_serial".to_string()),
    };

    let version = match row.observed_version.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return Err(format!("serial {serial}: missing or empty observed_version")),
    };

    let platform = match row.platform.as_deref() {
        Some(raw) => Platform::parse(raw)
            .ok_or_else(|| format!("serial {serial}: unrecognized platform \"{raw}\""))?,
        None => return Err(format!("serial {serial}: missing platform")),
    };

    Ok(HostRecord {
        hardware_serial: serial,
        observed_version: version,
        platform,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ReportDocument {
        serde_json::from_str(json).expect("document parses")
    }

    #[test]
    fn well_formed_rows_become_host_records() {
        let doc = parse(
            r#"{ "results": [
                 { "hardware_serial": "C02A", "platform": "macos", "observed_version": "14.5" },
                 { "hardware_serial": "PC-9", "platform": "windows", "observed_version": "10.0.19045" } ] }"#,
        );

        let snapshot = doc.into_snapshot();
        assert_eq!(snapshot.skipped_rows, 0);
        assert_eq!(snapshot.hosts.len(), 2);
        assert_eq!(snapshot.hosts[0].hardware_serial, "C02A");
        assert_eq!(snapshot.hosts[1].platform, Platform::Windows);
    }

    #[test]
    fn empty_serial_is_dropped_not_coerced() {
        let doc = parse(
            r#"{ "results": [
                 { "hardware_serial": "  ", "platform": "macos", "observed_version": "14.5" },
                 { "hardware_serial": "C02B", "platform": "macos", "observed_version": "14.5" } ] }"#,
        );

        let snapshot = doc.into_snapshot();
        assert_eq!(snapshot.skipped_rows, 1);
        assert_eq!(snapshot.hosts.len(), 1);
        assert_eq!(snapshot.hosts[0].hardware_serial, "C02B");
    }

    #[test]
    fn missing_version_is_dropped() {
        let doc = parse(
            r#"{ "results": [ { "hardware_serial": "C02C", "platform": "macos" } ] }"#,
        );

        let snapshot = doc.into_snapshot();
        assert_eq!(snapshot.skipped_rows, 1);
        assert!(snapshot.hosts.is_empty());
    }

    #[test]
    fn unrecognized_platform_is_dropped() {
        let doc = parse(
            r#"{ "results": [
                 { "hardware_serial": "AMIGA1", "platform": "amigaos", "observed_version": "3.1" } ] }"#,
        );

        let snapshot = doc.into_snapshot();
        assert_eq!(snapshot.skipped_rows, 1);
        assert!(snapshot.hosts.is_empty());
    }

    #[test]
    fn missing_results_field_fails_to_parse() {
        let result: Result<ReportDocument, _> = serde_json::from_str(r#"{ "rows": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_results_is_a_valid_empty_snapshot() {
        let snapshot = parse(r#"{ "results": [] }"#).into_snapshot();
        assert!(snapshot.hosts.is_empty());
        assert_eq!(snapshot.skipped_rows, 0);
    }
}
