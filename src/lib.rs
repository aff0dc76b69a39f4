//! trapmetrics is an in-process metric aggregation container for httptrap
//! checks. Callers record counters, gauges, histograms and text under a name
//! and a set of tags; the container deduplicates by identity, combines
//! samples per kind and, when asked to flush, encodes everything it holds as
//! httptrap JSON and hands that to a transport.
//!
//! ```
//! use trapmetrics::{Config, Context, Tags, TrapMetrics};
//! use trapmetrics::transport::Null;
//!
//! let tm = TrapMetrics::with_transport(Config::default(), Null::new());
//! let tags = Tags::new().with("service", "api");
//! tm.counter_increment("requests", &tags).unwrap();
//! tm.gauge_set("connections", &tags, 12u32, None).unwrap();
//! tm.histogram_record_value("latency", &tags, 0.042).unwrap();
//! tm.text_set("version", &tags, "1.2.3", None).unwrap();
//!
//! let res = tm.flush(&Context::new()).unwrap();
//! assert!(res.bytes_sent > 0);
//! assert!(tm.is_empty());
//! ```
//!
//! Flush cadence is up to the caller. Nothing runs in the background and
//! nothing is retried.
#![allow(unknown_lints)]
#![deny(trivial_numeric_casts, missing_docs, unstable_features, unused_import_braces)]
extern crate base64;
extern crate byteorder;
extern crate chrono;
extern crate seahash;
extern crate serde;
extern crate serde_json;
extern crate toml;
extern crate unicode_general_category;

#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_derive;

#[cfg(test)]
extern crate quickcheck;

pub mod check_tags;
pub mod config;
pub mod constants;
pub mod encode;
pub mod error;
pub mod flush;
pub mod hist;
pub mod metric;
pub mod record;
pub mod store;
pub mod tags;
pub mod time;
pub mod transport;
pub mod trap;

pub use crate::config::Config;
pub use crate::error::{BoxError, Error, Result};
pub use crate::flush::FlushResult;
pub use crate::hist::{Distribution, Histogram};
pub use crate::metric::{Kind, Metric, Sample, Value, WireType};
pub use crate::tags::{Tag, Tags};
pub use crate::transport::{CheckBundle, Context, TrapResult, Transport};
pub use crate::trap::TrapMetrics;
