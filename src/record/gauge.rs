use crate::error::{Error, Result};
use crate::metric::{Kind, Metric, Sample, Value};
use crate::tags::Tags;
use crate::time;
use crate::trap::TrapMetrics;
use chrono::{DateTime, Utc};

/// The numeric kind of a gauge is fixed by its first write.
fn check_kind(m: &Metric, value: Value) -> Result<()> {
    match m.wire_type {
        Some(existing) if existing != value.wire_type() => Err(Error::NumericKindConflict {
            name: m.name.clone(),
            tags: m.tags.to_string(),
            existing,
            given: value.wire_type(),
        }),
        _ => Ok(()),
    }
}

impl TrapMetrics {
    /// Set a gauge sample. The last value set at a timestamp wins; without a
    /// timestamp the sample is sent with `_ts` 0.
    ///
    /// Fails with `NumericKindConflict`, leaving the gauge untouched, if
    /// `value` is not of the numeric kind the gauge was first set with.
    pub fn gauge_set<V>(
        &self,
        name: &str,
        tags: &Tags,
        value: V,
        ts: Option<&DateTime<Utc>>,
    ) -> Result<()>
    where
        V: Into<Value>,
    {
        let value = value.into();
        let key = time::sample_key(ts);
        self.store.update(name, Kind::Gauge, tags, |m| {
            check_kind(m, value)?;
            m.wire_type = Some(value.wire_type());
            m.samples.insert(key, Sample::Value(value));
            Ok(())
        })
    }

    /// Add to the gauge sample at a timestamp, starting from zero if there is
    /// none. Integers wrap.
    ///
    /// Fails as `gauge_set` does on a numeric kind mismatch.
    pub fn gauge_add<V>(
        &self,
        name: &str,
        tags: &Tags,
        value: V,
        ts: Option<&DateTime<Utc>>,
    ) -> Result<()>
    where
        V: Into<Value>,
    {
        let value = value.into();
        let key = time::sample_key(ts);
        self.store.update(name, Kind::Gauge, tags, |m| {
            check_kind(m, value)?;
            let sum = match m.samples.get(&key) {
                Some(&Sample::Value(existing)) => existing.add(value),
                _ => Some(value),
            };
            let sum = sum.ok_or_else(|| Error::NumericKindConflict {
                name: m.name.clone(),
                tags: m.tags.to_string(),
                existing: m.wire_type.unwrap_or_else(|| value.wire_type()),
                given: value.wire_type(),
            })?;
            m.wire_type = Some(value.wire_type());
            m.samples.insert(key, Sample::Value(sum));
            Ok(())
        })
    }

    /// Snapshot of a gauge and all of its samples.
    pub fn gauge_fetch(&self, name: &str, tags: &Tags) -> Result<Metric> {
        self.store.fetch(name, Kind::Gauge, tags)
    }
}
