//! Sensor channels and the samples recorded on them.

use serde::{Deserialize, Serialize};

/// One of the three independent sensor measurement streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Velocity,
    Altitude,
    Temperature,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; 3] = [Channel::Velocity, Channel::Altitude, Channel::Temperature];

    /// Lower-cased payload field carrying this channel's reading.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Velocity => "velocity",
            Self::Altitude => "altitude",
            Self::Temperature => "temperature",
        }
    }

    /// Human-readable label used by renderers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Velocity => "Velocity",
            Self::Altitude => "Altitude",
            Self::Temperature => "Temperature",
        }
    }

    /// Display unit.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Velocity => "m/s",
            Self::Altitude => "m",
            Self::Temperature => "C",
        }
    }

    /// Dense index into per-channel arrays.
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Velocity => 0,
            Self::Altitude => 1,
            Self::Temperature => 2,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A single timestamped scalar reading.
///
/// `timestamp` is a wall-clock label captured at ingest, not an epoch value.
/// Ordering of samples comes from append order alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: String,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self { timestamp: timestamp.into(), value }
    }

    /// Build a sample whose value is rounded to two decimals, the precision
    /// every reading is stored at.
    pub fn rounded(timestamp: impl Into<String>, value: f64) -> Self {
        Self::new(timestamp, round_2dp(value))
    }
}

/// Round to two decimal places via [`to_fixed_2`], so stored values read
/// back exactly as they display. `NaN` and infinities pass through.
#[inline]
pub fn round_2dp(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    fast_float2::parse(to_fixed_2(value)).unwrap_or(value)
}

/// Render a reading with exactly two decimals (`9` → `"9.00"`).
///
/// Rounds the exact binary value; exact half-way values round away from zero
/// (`0.125` → `"0.13"`), while `5.555` (stored as 5.55499…) gives `"5.55"`.
/// Non-finite values render as `NaN` / `Infinity` / `-Infinity`.
pub fn to_fixed_2(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    // A two-decimal tie needs a third decimal of exactly 5 with nothing after
    // it, which in binary means an odd multiple of 1/8.
    let eighths = magnitude * 8.0;
    let is_tie = eighths < 9.0e15 && eighths.fract() == 0.0 && eighths % 2.0 == 1.0;
    if !is_tie {
        // `{:.2}` is exact except on ties, where it picks the even digit.
        return format!("{sign}{magnitude:.2}");
    }

    // `{:.3}` is exact here; bump the thousandths up to the next hundredth.
    let thousandths: u64 = format!("{magnitude:.3}")
        .chars()
        .filter(char::is_ascii_digit)
        .fold(0, |acc, d| acc * 10 + u64::from(d as u8 - b'0'));
    let cents = (thousandths + 5) / 10;
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_decimal_formatting() {
        assert_eq!(to_fixed_2(9.0), "9.00");
        assert_eq!(to_fixed_2(5.111), "5.11");
        assert_eq!(to_fixed_2(-0.5), "-0.50");
        assert_eq!(to_fixed_2(0.0), "0.00");
        assert_eq!(to_fixed_2(f64::NAN), "NaN");
        assert_eq!(to_fixed_2(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn half_way_values_round_like_to_fixed() {
        // Exact ties round away from zero.
        assert_eq!(to_fixed_2(0.125), "0.13");
        assert_eq!(to_fixed_2(2.375), "2.38");
        assert_eq!(to_fixed_2(-0.125), "-0.13");
        assert_eq!(to_fixed_2(1024.625), "1024.63");
        // Decimal-looking ties are below half in binary.
        assert_eq!(to_fixed_2(5.555), "5.55");
        assert_eq!(to_fixed_2(1.005), "1.00");
    }

    #[test]
    fn rounding_matches_display() {
        assert_eq!(round_2dp(5.111), 5.11);
        assert_eq!(round_2dp(5.555), 5.55);
        assert_eq!(round_2dp(0.125), 0.13);
        assert_eq!(round_2dp(1.005 * 1000.0), 1005.0);
        assert!(round_2dp(f64::NAN).is_nan());
        for v in [5.555, 0.125, 1.005, 99.995, -3.14159] {
            assert_eq!(to_fixed_2(round_2dp(v)), to_fixed_2(v));
        }
    }

    #[test]
    fn channel_field_names() {
        let names: Vec<_> = Channel::ALL.iter().map(|c| c.field_name()).collect();
        assert_eq!(names, ["velocity", "altitude", "temperature"]);
        assert_eq!(Channel::Temperature.to_string(), "temperature");
    }
}
