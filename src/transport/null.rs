use crate::error::BoxError;
use crate::transport::{CheckBundle, Context, TrapResult, Transport};

/// Null transport
///
/// This transport is intended for testing and demonstration. Every submission
/// it receives is dropped on the floor and reported as sent.
#[derive(Clone, Copy, Debug, Default)]
pub struct Null {}

impl Null {
    /// Create a new Null transport
    pub fn new() -> Null {
        Null {}
    }
}

impl Transport for Null {
    fn send_metrics(&self, _: &Context, data: &[u8]) -> Result<TrapResult, BoxError> {
        // discard point
        Ok(TrapResult {
            bytes_sent: data.len() as u64,
            ..Default::default()
        })
    }

    fn update_check_tags(&self, _: &Context, _: &[String]) -> Result<Option<CheckBundle>, BoxError> {
        Ok(None)
    }
}
