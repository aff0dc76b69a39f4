//! Encode buffered metrics as httptrap JSON.
//!
//! The document is one JSON object. Every entry is keyed by the metric name
//! with its stream tag suffix and carries the wire type, a timestamp in epoch
//! milliseconds and the value:
//!
//! ```text
//! {"requests|ST[b"aG9zdA==":b"YQ=="]":{"_type":"l","_ts":1600000000000,"_value":"42"}}
//! ```
//!
//! Counters and histograms hold a single sample and are stamped with the
//! time the encode started. Gauges and text metrics produce one entry per
//! sample, stamped with the sample key.

use crate::constants::MAX_METRIC_NAME_LEN;
use crate::error::Result;
use crate::metric::{Metric, Sample, WireType};
use crate::time;
use crate::trap::TrapMetrics;
use std::io::{self, Write};

/// Render the `_value` of a sample.
fn render_value(sample: &Sample) -> io::Result<String> {
    let mut s = String::new();
    match *sample {
        Sample::Value(ref v) => v.write_json(&mut s),
        Sample::Text(ref t) => s = serde_json::to_string(t)?,
        Sample::Histogram(ref h) => {
            s.push('"');
            s.push_str(&h.serialize_b64()?);
            s.push('"');
        }
    }
    Ok(s)
}

/// Streams entries, opening the object on the first one.
struct Entries<'a, W: 'a> {
    out: &'a mut W,
    written: usize,
}

impl<'a, W> Entries<'a, W>
where
    W: Write,
{
    fn new(out: &'a mut W) -> Entries<'a, W> {
        Entries { out, written: 0 }
    }

    fn write(&mut self, key: &str, wire_type: WireType, ts: u64, value: &str) -> io::Result<()> {
        self.out
            .write_all(if self.written == 0 { b"{" } else { b"," })?;
        serde_json::to_writer(&mut *self.out, key)?;
        write!(
            self.out,
            ":{{\"_type\":\"{}\",\"_ts\":{},\"_value\":{}}}",
            wire_type, ts, value
        )?;
        self.written += 1;
        Ok(())
    }

    /// Close the object if anything was written. Returns the entry count.
    fn finish(self) -> io::Result<usize> {
        if self.written > 0 {
            self.out.write_all(b"}")?;
        }
        Ok(self.written)
    }
}

impl TrapMetrics {
    fn write_metric<W>(&self, entries: &mut Entries<W>, m: &Metric, flush_ts: u64) -> io::Result<()>
    where
        W: Write,
    {
        let stream = if self.config.global_tags.is_empty() {
            m.tags.stream()
        } else {
            m.tags.with_global(&self.config.global_tags).stream()
        };
        let mut key = String::with_capacity(m.name.len() + stream.len());
        key.push_str(&m.name);
        key.push_str(&stream);
        if key.len() > MAX_METRIC_NAME_LEN {
            warn!(
                "metric name exceeds max len ({} > {}), dropping: {}",
                key.len(),
                MAX_METRIC_NAME_LEN,
                key
            );
            return Ok(());
        }
        let wire_type = match m.wire_type {
            Some(w) => w,
            None => {
                warn!("unknown wire type, dropping: {}", m);
                return Ok(());
            }
        };

        for (&sample_key, sample) in &m.samples {
            let ts = if m.kind.is_timestamped() {
                sample_key
            } else {
                flush_ts
            };
            let value = match render_value(sample) {
                Ok(v) => v,
                Err(e) => {
                    warn!("encoding value of {} ({}): {}", m.name, m.tags, e);
                    continue;
                }
            };
            entries.write(&key, wire_type, ts, &value)?;
        }
        Ok(())
    }

    /// Encode every buffered metric as httptrap JSON into `w`.
    ///
    /// The store stays locked for the whole encode. Once everything has been
    /// written the store is cleared; if writing fails the error is returned
    /// and every metric is kept. Metrics whose name and stream tags together
    /// exceed `MAX_METRIC_NAME_LEN` are dropped with a warning.
    ///
    /// Returns the number of entries written. Nothing at all is written when
    /// there is nothing to send.
    pub fn write_json_metrics<W>(&self, w: &mut W) -> Result<usize>
    where
        W: Write,
    {
        let mut metrics = self.store.lock();
        if metrics.is_empty() {
            return Ok(0);
        }

        let flush_ts = time::now();
        let mut entries = Entries::new(w);
        for m in metrics.values() {
            self.write_metric(&mut entries, m, flush_ts)?;
        }
        let written = entries.finish()?;

        metrics.clear();
        Ok(written)
    }

    /// Encode every buffered metric into a new buffer, or `None` if there is
    /// nothing to send. See `write_json_metrics`.
    pub fn json_metrics(&self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::with_capacity(self.config.buffer_size);
        match self.write_json_metrics(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf)),
        }
    }
}
