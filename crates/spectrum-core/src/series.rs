//! Per-channel sample series with summary queries.
//!
//! Each [`Channel`] owns an append-only [`ChannelSeries`]. Storage is
//! unbounded; bounding happens only at read time through
//! [`SeriesStore::windowed`], so `min`/`max` and CSV export always see the
//! full retained history.
//!
//! Summary queries return display strings with two decimals and an empty
//! string when the channel has no samples yet. A `NaN` sample (from a payload
//! that lacked the field) makes `min`/`max` read `"NaN"`.

use crate::types::{Channel, Sample, to_fixed_2};

/// Ordered samples of one channel, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ChannelSeries {
    samples: Vec<Sample>,
}

impl ChannelSeries {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn append(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// The last `n` samples (fewer if the series is shorter).
    pub fn windowed(&self, n: usize) -> &[Sample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }

    /// Smallest value, `NaN` if any sample is `NaN`. `None` when empty.
    pub fn min_value(&self) -> Option<f64> {
        self.fold(f64::min)
    }

    /// Largest value, `NaN` if any sample is `NaN`. `None` when empty.
    pub fn max_value(&self) -> Option<f64> {
        self.fold(f64::max)
    }

    fn fold(&self, pick: fn(f64, f64) -> f64) -> Option<f64> {
        let mut iter = self.samples.iter().map(|s| s.value);
        let first = iter.next()?;
        Some(iter.fold(first, |acc, v| {
            if acc.is_nan() || v.is_nan() { f64::NAN } else { pick(acc, v) }
        }))
    }
}

/// Display-ready summary of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeriesSummary {
    pub current: String,
    pub min: String,
    pub max: String,
    pub count: usize,
}

/// The three channel series, owned by the ingestion coordinator.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: [ChannelSeries; 3],
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample to the end of `channel`'s series.
    pub fn append(&mut self, channel: Channel, sample: Sample) {
        self.series[channel.index()].append(sample);
    }

    pub fn series(&self, channel: Channel) -> &ChannelSeries {
        &self.series[channel.index()]
    }

    pub fn len(&self, channel: Channel) -> usize {
        self.series(channel).len()
    }

    pub fn samples(&self, channel: Channel) -> &[Sample] {
        self.series(channel).samples()
    }

    /// Most recent value with two decimals, `""` when empty.
    pub fn last_value(&self, channel: Channel) -> String {
        self.series(channel)
            .last()
            .map(|s| to_fixed_2(s.value))
            .unwrap_or_default()
    }

    /// Minimum over the whole retained series, `""` when empty.
    pub fn min(&self, channel: Channel) -> String {
        self.series(channel).min_value().map(to_fixed_2).unwrap_or_default()
    }

    /// Maximum over the whole retained series, `""` when empty.
    pub fn max(&self, channel: Channel) -> String {
        self.series(channel).max_value().map(to_fixed_2).unwrap_or_default()
    }

    /// Read-only projection of the last `n` samples in arrival order.
    pub fn windowed(&self, channel: Channel, n: usize) -> &[Sample] {
        self.series(channel).windowed(n)
    }

    pub fn summary(&self, channel: Channel) -> SeriesSummary {
        SeriesSummary {
            current: self.last_value(channel),
            min: self.min(channel),
            max: self.max(channel),
            count: self.len(channel),
        }
    }

    /// True when every channel holds the same number of samples.
    pub fn is_aligned(&self) -> bool {
        let n = self.series[0].len();
        self.series.iter().all(|s| s.len() == n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(channel: Channel, values: &[f64]) -> SeriesStore {
        let mut store = SeriesStore::new();
        for (i, v) in values.iter().enumerate() {
            store.append(channel, Sample::new(format!("12:00:{i:02}"), *v));
        }
        store
    }

    #[test]
    fn summary_of_velocity() {
        let store = store_with(Channel::Velocity, &[5.111, 3.2, 9.0]);
        assert_eq!(store.last_value(Channel::Velocity), "9.00");
        assert_eq!(store.max(Channel::Velocity), "9.00");
        assert_eq!(store.min(Channel::Velocity), "3.20");
        assert_eq!(store.len(Channel::Altitude), 0);
    }

    #[test]
    fn empty_channel_sentinels() {
        let store = SeriesStore::new();
        assert_eq!(store.last_value(Channel::Temperature), "");
        assert_eq!(store.min(Channel::Temperature), "");
        assert_eq!(store.max(Channel::Temperature), "");
        assert!(store.windowed(Channel::Temperature, 10).is_empty());
    }

    #[test]
    fn windowed_returns_tail_in_order() {
        let store = store_with(Channel::Altitude, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let window = store.windowed(Channel::Altitude, 2);
        let values: Vec<f64> = window.iter().map(|s| s.value).collect();
        assert_eq!(values, [4.0, 5.0]);
        assert_eq!(window[0].timestamp, "12:00:03");

        // projection only: nothing evicted
        assert_eq!(store.len(Channel::Altitude), 5);
        assert_eq!(store.windowed(Channel::Altitude, 50).len(), 5);
        assert!(store.windowed(Channel::Altitude, 0).is_empty());
    }

    #[test]
    fn min_max_cover_full_history_not_window() {
        let store = store_with(Channel::Temperature, &[-40.0, 1.0, 2.0, 3.0]);
        assert_eq!(store.windowed(Channel::Temperature, 2).len(), 2);
        assert_eq!(store.min(Channel::Temperature), "-40.00");
        assert_eq!(store.max(Channel::Temperature), "3.00");
    }

    #[test]
    fn nan_sample_degrades_statistics() {
        let store = store_with(Channel::Velocity, &[1.0, f64::NAN, 2.0]);
        assert_eq!(store.min(Channel::Velocity), "NaN");
        assert_eq!(store.max(Channel::Velocity), "NaN");
        assert_eq!(store.last_value(Channel::Velocity), "2.00");
    }

    #[test]
    fn alignment() {
        let mut store = SeriesStore::new();
        assert!(store.is_aligned());
        store.append(Channel::Velocity, Sample::new("t", 1.0));
        assert!(!store.is_aligned());
        store.append(Channel::Altitude, Sample::new("t", 1.0));
        store.append(Channel::Temperature, Sample::new("t", 1.0));
        assert!(store.is_aligned());
    }

    #[test]
    fn display_matches_stored_rounding() {
        let mut store = SeriesStore::new();
        store.append(Channel::Velocity, Sample::new("t", 0.125));
        assert_eq!(store.last_value(Channel::Velocity), "0.13");

        store.append(Channel::Velocity, Sample::rounded("t", 5.555));
        assert_eq!(store.last_value(Channel::Velocity), "5.55");

        store.append(Channel::Velocity, Sample::new("t", 5.555));
        assert_eq!(store.last_value(Channel::Velocity), "5.55");
        assert_eq!(store.max(Channel::Velocity), "5.55");
        assert_eq!(store.min(Channel::Velocity), "0.13");
    }
}
