//! Telemetry archiver responses.
//!
//! The archiver answers each channel query with a list of
//! `{meta: {name}, data: [{secs, val, ...}]}` objects. Samples are reduced
//! to the ones that fall on the observing date (UTC).

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::session::ObservingDate;

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiverMeta {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiverSample {
    pub secs: i64,
    pub val: serde_json::Value,
}

/// One channel in an archiver response.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiverChannel {
    pub meta: ArchiverMeta,
    #[serde(default)]
    pub data: Vec<ArchiverSample>,
}

/// A sample kept for the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// `YYYY-MM-DD HH:MM:SS`, UTC
    pub timestamp: String,
    pub secs: i64,
    pub value: serde_json::Value,
}

/// The document written for one telemetry dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryDocument {
    pub dataset: String,
    pub date: String,
    pub channels: BTreeMap<String, Vec<TelemetrySample>>,
}

impl TelemetryDocument {
    pub fn new(dataset: impl Into<String>, date: &ObservingDate) -> Self {
        Self {
            dataset: dataset.into(),
            date: date.canonical(),
            channels: BTreeMap::new(),
        }
    }
}

/// Samples from every entry whose UTC date is `date`.
pub fn filter_samples(entries: &[ArchiverChannel], date: &ObservingDate) -> Vec<TelemetrySample> {
    let wanted = date.canonical();
    entries
        .iter()
        .flat_map(|entry| entry.data.iter())
        .filter_map(|sample| {
            let at = DateTime::from_timestamp(sample.secs, 0)?;
            if at.format("%Y-%m-%d").to_string() != wanted {
                return None;
            }
            Some(TelemetrySample {
                timestamp: at.format("%Y-%m-%d %H:%M:%S").to_string(),
                secs: sample.secs,
                value: sample.val.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-14 23:59:59, 2024-03-15 00:00:00, 2024-03-15 23:59:59, 2024-03-16 00:00:00
    const RESPONSE: &str = r#"[
        {"meta": {"name": "k1:met:tempRaw", "PREC": "2"},
         "data": [
            {"secs": 1710460799, "val": 1.0, "nanos": 0, "severity": 0, "status": 0},
            {"secs": 1710460800, "val": 2.5, "nanos": 0, "severity": 0, "status": 0},
            {"secs": 1710547199, "val": 3.5, "nanos": 0, "severity": 0, "status": 0},
            {"secs": 1710547200, "val": 4.0, "nanos": 0, "severity": 0, "status": 0}
         ]}
    ]"#;

    #[test]
    fn test_filter_keeps_only_observing_date() {
        let entries: Vec<ArchiverChannel> = serde_json::from_str(RESPONSE).unwrap();
        assert_eq!(entries[0].meta.name, "k1:met:tempRaw");

        let samples = filter_samples(&entries, &ObservingDate::parse("2024-03-15").unwrap());
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, "2024-03-15 00:00:00");
        assert_eq!(samples[0].value, serde_json::json!(2.5));
        assert_eq!(samples[1].timestamp, "2024-03-15 23:59:59");
        assert_eq!(samples[1].secs, 1710547199);
    }

    #[test]
    fn test_entry_without_data_is_empty() {
        let entries: Vec<ArchiverChannel> =
            serde_json::from_str(r#"[{"meta": {"name": "k2:dcs:pnt:cam0:fwhm"}}]"#).unwrap();
        let samples = filter_samples(&entries, &ObservingDate::parse("2024-03-15").unwrap());
        assert!(samples.is_empty());
    }

    #[test]
    fn test_document_serializes_channels_by_name() {
        let date = ObservingDate::parse("2024-03-15").unwrap();
        let mut doc = TelemetryDocument::new("k1_fwhm", &date);
        doc.channels.insert("k1:dcs:pnt:cam0:fwhm".to_string(), Vec::new());

        let json: serde_json::Value = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["dataset"], "k1_fwhm");
        assert_eq!(json["date"], "2024-03-15");
        assert!(json["channels"]["k1:dcs:pnt:cam0:fwhm"].is_array());
    }
}
