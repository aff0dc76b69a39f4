use crate::error::Result;
use crate::hist::{Distribution, Histogram};
use crate::metric::{Kind, Metric, Sample, WireType};
use crate::tags::Tags;
use crate::trap::TrapMetrics;
use std::time::Duration;

impl TrapMetrics {
    fn record_histogram<F>(&self, name: &str, tags: &Tags, kind: Kind, f: F) -> Result<()>
    where
        F: FnOnce(&mut Histogram),
    {
        let wire_type = match kind {
            Kind::CumulativeHistogram => WireType::CumulativeHistogram,
            _ => WireType::Histogram,
        };
        self.store.update(name, kind, tags, |m| {
            m.wire_type = Some(wire_type);
            let sample = m
                .samples
                .entry(0)
                .or_insert_with(|| Sample::Histogram(Histogram::new()));
            if let Sample::Histogram(ref mut h) = *sample {
                f(h);
            }
            Ok(())
        })
    }

    /// Record a timing, in whatever unit the caller settles on, into a
    /// histogram.
    pub fn histogram_record_timing(&self, name: &str, tags: &Tags, value: f64) -> Result<()> {
        self.histogram_record_value(name, tags, value)
    }

    /// Record a value into a histogram.
    pub fn histogram_record_value(&self, name: &str, tags: &Tags, value: f64) -> Result<()> {
        self.record_histogram(name, tags, Kind::Histogram, |h| h.record_value(value))
    }

    /// Record a duration into a histogram, in seconds with nanosecond
    /// resolution.
    pub fn histogram_record_duration(
        &self,
        name: &str,
        tags: &Tags,
        value: Duration,
    ) -> Result<()> {
        self.record_histogram(name, tags, Kind::Histogram, |h| {
            h.record_duration(value)
        })
    }

    /// Record `count` occurrences of `value` into a histogram.
    pub fn histogram_record_count_for_value(
        &self,
        name: &str,
        tags: &Tags,
        count: u64,
        value: f64,
    ) -> Result<()> {
        self.record_histogram(name, tags, Kind::Histogram, |h| {
            h.record_count_for_value(count, value)
        })
    }

    /// Snapshot of a histogram.
    pub fn histogram_fetch(&self, name: &str, tags: &Tags) -> Result<Metric> {
        self.store.fetch(name, Kind::Histogram, tags)
    }

    /// Record `count` occurrences of `value` into a cumulative histogram.
    pub fn cumulative_histogram_record_count_for_value(
        &self,
        name: &str,
        tags: &Tags,
        count: u64,
        value: f64,
    ) -> Result<()> {
        self.record_histogram(name, tags, Kind::CumulativeHistogram, |h| {
            h.record_count_for_value(count, value)
        })
    }

    /// Snapshot of a cumulative histogram.
    pub fn cumulative_histogram_fetch(&self, name: &str, tags: &Tags) -> Result<Metric> {
        self.store.fetch(name, Kind::CumulativeHistogram, tags)
    }
}
