//! CSV export of the retained telemetry.

use spectrum_core::Channel;
use spectrum_core::series::SeriesStore;
use tracing::warn;

pub const CSV_HEADER: &str = "timeStamp,altitude,velocity,temperature";

/// Render every retained sample as CSV, one row per ingest.
///
/// Timestamps come from the altitude series. If the series ever differ in
/// length the output stops at the shortest one.
pub fn to_csv(store: &SeriesStore) -> String {
    let altitude = store.samples(Channel::Altitude);
    let velocity = store.samples(Channel::Velocity);
    let temperature = store.samples(Channel::Temperature);

    let rows = altitude.len().min(velocity.len()).min(temperature.len());
    if !store.is_aligned() {
        warn!("[export] series lengths differ, truncating to {rows} rows");
    }

    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + rows * 32);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for i in 0..rows {
        out.push_str(&altitude[i].timestamp);
        for value in [altitude[i].value, velocity[i].value, temperature[i].value] {
            out.push(',');
            out.push_str(&csv_number(value));
        }
        out.push('\n');
    }
    out
}

/// Shortest round-trip decimal: `9`, `1.5`, `NaN`.
fn csv_number(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    value.to_string()
}
