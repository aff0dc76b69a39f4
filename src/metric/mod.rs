//! The metric model: what a metric is, how it is identified and what its
//! samples hold.

use crate::hist::Histogram;
use crate::tags::Tags;
use std::collections::BTreeMap;
use std::fmt;

mod value;

pub use self::value::Value;

/// The recording semantics of a metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A single signed accumulator, stamped at flush time
    Counter,
    /// Point in time numeric samples keyed by timestamp
    Gauge,
    /// A log-linear histogram, stamped at flush time
    Histogram,
    /// A histogram the collector treats as cumulative
    CumulativeHistogram,
    /// Point in time text samples keyed by timestamp
    Text,
}

impl Kind {
    /// Name of the kind, as it takes part in metric identity.
    pub fn as_str(&self) -> &'static str {
        match *self {
            Kind::Counter => "counter",
            Kind::Gauge => "gauge",
            Kind::Histogram => "histogram",
            Kind::CumulativeHistogram => "cumulative_histogram",
            Kind::Text => "text",
        }
    }

    /// Whether the kind keeps one sample per caller timestamp, as opposed to
    /// a single sample stamped when flushed.
    pub fn is_timestamped(&self) -> bool {
        match *self {
            Kind::Gauge | Kind::Text => true,
            Kind::Counter | Kind::Histogram | Kind::CumulativeHistogram => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `_type` of a metric on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireType {
    /// `i`
    Int32,
    /// `I`
    Uint32,
    /// `l`
    Int64,
    /// `L`
    Uint64,
    /// `n`
    Float64,
    /// `h`
    Histogram,
    /// `H`
    CumulativeHistogram,
    /// `s`
    String,
}

impl WireType {
    /// The one letter wire code.
    pub fn code(&self) -> &'static str {
        match *self {
            WireType::Int32 => "i",
            WireType::Uint32 => "I",
            WireType::Int64 => "l",
            WireType::Uint64 => "L",
            WireType::Float64 => "n",
            WireType::Histogram => "h",
            WireType::CumulativeHistogram => "H",
            WireType::String => "s",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single buffered sample.
#[derive(Clone, Debug, PartialEq)]
pub enum Sample {
    /// Counter accumulators and gauge values
    Value(Value),
    /// Sanitized text
    Text(String),
    /// Histograms, regular and cumulative
    Histogram(Histogram),
}

/// Compute the identity of a metric.
///
/// The hash runs over `name|kind|tags` with tags in their canonical sorted
/// rendering, so the insertion order of tags does not matter but their
/// content, the name and the kind all do.
pub fn identity(name: &str, kind: Kind, tags: &Tags) -> u64 {
    let key = format!("{}|{}|{}", name, kind, tags);
    seahash::hash(key.as_bytes())
}

/// A metric and every sample buffered for it since the last flush.
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    /// See `identity`
    pub id: u64,
    /// Metric name, without stream tags
    pub name: String,
    /// Recording semantics
    pub kind: Kind,
    /// Established by the first write, `None` until then
    pub wire_type: Option<WireType>,
    /// Tags as given at creation
    pub tags: Tags,
    /// Samples keyed by epoch milliseconds, 0 meaning untimestamped
    pub samples: BTreeMap<u64, Sample>,
}

impl Metric {
    /// Create a metric with no samples and no wire type.
    pub fn new<S>(name: S, kind: Kind, tags: Tags) -> Metric
    where
        S: Into<String>,
    {
        let name = name.into();
        Metric {
            id: identity(&name, kind, &tags),
            name,
            kind,
            wire_type: None,
            tags,
            samples: BTreeMap::new(),
        }
    }

    /// The sample at `key`, if any.
    pub fn sample(&self, key: u64) -> Option<&Sample> {
        self.samples.get(&key)
    }

    /// The numeric value at `key`, if the sample there is numeric.
    pub fn value(&self, key: u64) -> Option<Value> {
        match self.samples.get(&key) {
            Some(&Sample::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// The text at `key`, if the sample there is text.
    pub fn text(&self, key: u64) -> Option<&str> {
        match self.samples.get(&key) {
            Some(&Sample::Text(ref s)) => Some(s),
            _ => None,
        }
    }

    /// The histogram of a histogram kind metric.
    pub fn histogram(&self) -> Option<&Histogram> {
        match self.samples.get(&0) {
            Some(&Sample::Histogram(ref h)) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id: {}, name: {}, kind: {}, wire type: {}, tags: {}, samples: {}",
            self.id,
            self.name,
            self.kind,
            self.wire_type.map_or("none", |w| w.code()),
            self.tags,
            self.samples.len()
        )
    }
}
