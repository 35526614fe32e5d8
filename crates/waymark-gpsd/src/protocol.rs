//! gpsd JSON wire protocol
//!
//! Only the TPV (time-position-velocity) report is interpreted; every other
//! report class (VERSION, DEVICES, SKY, ...) is ignored.

use chrono::{DateTime, Local};
use serde::Deserialize;
use waymark_api::PositionSample;

/// WATCH command enabling JSON report streaming
pub(crate) const WATCH_ENABLE: &str = "?WATCH={\"enable\":true,\"json\":true}\n";

/// A gpsd TPV report (unknown fields ignored)
#[derive(Debug, Deserialize)]
pub(crate) struct TpvReport {
    /// Fix mode: 0/1 = no fix, 2 = 2D, 3 = 3D
    #[serde(default)]
    pub mode: u8,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub alt: Option<f64>,
    pub speed: Option<f64>,
    pub track: Option<f64>,
    pub epx: Option<f64>,
    pub epy: Option<f64>,
    pub time: Option<String>,
}

/// Parse one line of gpsd output into a sample.
///
/// Returns None for non-TPV reports, reports without a fix, and anything
/// unparseable — a garbled line is not worth ending the stream over.
pub(crate) fn parse_tpv_line(line: &str) -> Option<PositionSample> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    if value.get("class")?.as_str()? != "TPV" {
        return None;
    }
    let report: TpvReport = serde_json::from_value(value).ok()?;
    report.into_sample()
}

impl TpvReport {
    pub(crate) fn into_sample(self) -> Option<PositionSample> {
        // mode < 2 means gpsd has no fix yet
        if self.mode < 2 {
            return None;
        }
        let latitude = self.lat?;
        let longitude = self.lon?;

        let time = self
            .time
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Local))
            .unwrap_or_else(waymark_util::now);

        let accuracy = match (self.epx, self.epy) {
            (Some(x), Some(y)) => Some(x.max(y)),
            (x, y) => x.or(y),
        };

        Some(PositionSample {
            latitude,
            longitude,
            altitude: self.alt,
            speed: self.speed,
            bearing: self.track,
            accuracy,
            time,
        })
    }
}
