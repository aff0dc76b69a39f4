//! The seam between the metric container and whatever delivers encoded
//! metrics to a collector.
//!
//! A `Transport` receives fully encoded httptrap JSON and reports what the
//! collector made of it. Delivery, retries and check management all live on
//! the far side of this trait. Two transports are bundled: `Null`, which
//! discards everything, and `Console`, which writes submissions to any
//! `io::Write`.

use crate::error::BoxError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod console;
mod null;

pub use self::console::Console;
pub use self::null::Null;

/// Cancellation handle passed along with every submission.
///
/// Clones share their cancellation state. A context created with a timeout
/// also counts as cancelled once its deadline has passed.
#[derive(Clone, Debug, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// Create a context that is only ever cancelled explicitly
    pub fn new() -> Context {
        Context::default()
    }

    /// Create a context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Context {
        Context {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Cancel this context and every clone of it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Determine if the context was cancelled or its deadline has passed
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// What a transport reports back about one submission.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrapResult {
    /// Check the metrics were submitted to
    pub check_uuid: String,
    /// Identifier of this submission
    pub submit_uuid: String,
    /// Error text reported by the collector, if any
    pub error: String,
    /// Number of metrics the collector accepted
    pub stats: u64,
    /// Number of metrics the collector filtered out
    pub filtered: u64,
    /// Time spent submitting, retries included
    pub submit_duration: Duration,
    /// Time spent on the final request
    pub last_req_duration: Duration,
    /// Bytes put on the wire
    pub bytes_sent: u64,
}

/// The check configuration a transport may hand back after a tag update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckBundle {
    /// API identifier of the check bundle
    #[serde(rename = "_cid")]
    pub cid: String,
    /// Human readable name
    pub display_name: String,
    /// Check type, `httptrap` for trap checks
    #[serde(rename = "type")]
    pub check_type: String,
    /// Host or identifier the check targets
    pub target: String,
    /// Check tags, `category:value`
    pub tags: Vec<String>,
}

/// Deliver encoded metrics to a collector.
pub trait Transport: Send + Sync {
    /// Submit one httptrap JSON document.
    fn send_metrics(&self, ctx: &Context, data: &[u8]) -> Result<TrapResult, BoxError>;

    /// Replace or add check tags, each `category:value`. Returns the updated
    /// check bundle if the transport knows it.
    fn update_check_tags(
        &self,
        ctx: &Context,
        tags: &[String],
    ) -> Result<Option<CheckBundle>, BoxError>;
}
