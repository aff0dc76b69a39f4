//! Hand encoded metrics to the transport.

use crate::error::{Error, Result};
use crate::transport::{Context, Transport};
use crate::trap::TrapMetrics;
use std::time::{Duration, Instant};

/// Reported when a flush found nothing to submit.
pub const NO_METRICS: &str = "no metrics to send";

/// Accounting for one flush.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlushResult {
    /// Check the metrics were submitted to
    pub check_uuid: String,
    /// Identifier of the submission
    pub submit_uuid: String,
    /// Error text reported by the collector, or `NO_METRICS`
    pub error: String,
    /// Number of metrics the collector accepted
    pub stats: u64,
    /// Number of metrics the collector filtered out
    pub filtered: u64,
    /// Bytes put on the wire
    pub bytes_sent: u64,
    /// Time spent encoding
    pub encode_duration: Duration,
    /// Time the transport spent submitting
    pub submit_duration: Duration,
    /// Time spent on the transport's final request
    pub last_req_duration: Duration,
    /// Time spent on the whole flush
    pub flush_duration: Duration,
}

impl FlushResult {
    fn nothing_to_send() -> FlushResult {
        FlushResult {
            error: NO_METRICS.to_string(),
            ..Default::default()
        }
    }
}

impl TrapMetrics {
    fn transport(&self) -> Result<&dyn Transport> {
        match self.transport {
            Some(ref t) => Ok(&**t),
            None => Err(Error::NoTransport),
        }
    }

    fn submit(
        &self,
        transport: &dyn Transport,
        ctx: &Context,
        data: &[u8],
        start: Instant,
    ) -> Result<FlushResult> {
        let encode_duration = start.elapsed();
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let res = transport
            .send_metrics(ctx, data)
            .map_err(Error::Transport)?;
        let result = FlushResult {
            check_uuid: res.check_uuid,
            submit_uuid: res.submit_uuid,
            error: res.error,
            stats: res.stats,
            filtered: res.filtered,
            bytes_sent: res.bytes_sent,
            encode_duration,
            submit_duration: res.submit_duration,
            last_req_duration: res.last_req_duration,
            flush_duration: start.elapsed(),
        };
        debug!(
            "flush -- C:{}, S:{}, E:{}, Stats:{}, Filtered:{}, Bytes:{}, Encode:{:?}, Submit:{:?}, LastReq:{:?}, Flush:{:?}",
            result.check_uuid,
            result.submit_uuid,
            result.error,
            result.stats,
            result.filtered,
            result.bytes_sent,
            result.encode_duration,
            result.submit_duration,
            result.last_req_duration,
            result.flush_duration
        );
        Ok(result)
    }

    /// Encode everything buffered and submit it through the transport.
    ///
    /// The encode buffer starts at the configured `buffer_size`. The store is
    /// cleared as soon as encoding succeeds, so metrics are not kept if the
    /// context turns out to be cancelled or the transport fails.
    pub fn flush(&self, ctx: &Context) -> Result<FlushResult> {
        let mut buf = Vec::with_capacity(self.config.buffer_size);
        self.flush_with_buffer(ctx, &mut buf)
    }

    /// As `flush`, encoding into `buf` so its allocation can be reused
    /// across flushes. Anything already in `buf` is discarded.
    pub fn flush_with_buffer(&self, ctx: &Context, buf: &mut Vec<u8>) -> Result<FlushResult> {
        let transport = self.transport()?;
        let start = Instant::now();
        buf.clear();
        if self.write_json_metrics(buf)? == 0 {
            return Ok(FlushResult::nothing_to_send());
        }
        self.submit(transport, ctx, buf, start)
    }

    /// Submit caller encoded httptrap JSON through the transport as is. The
    /// buffered metrics are left alone.
    pub fn flush_raw_json(&self, ctx: &Context, data: &[u8]) -> Result<FlushResult> {
        let transport = self.transport()?;
        if data.is_empty() {
            return Ok(FlushResult::nothing_to_send());
        }
        self.submit(transport, ctx, data, Instant::now())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::error::BoxError;
    use crate::tags::Tags;
    use crate::transport::{CheckBundle, Null, TrapResult};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    impl Transport for Recorder {
        fn send_metrics(&self, _: &Context, data: &[u8]) -> ::std::result::Result<TrapResult, BoxError> {
            self.sent.lock().unwrap().push(data.to_vec());
            Ok(TrapResult {
                check_uuid: "check".to_string(),
                submit_uuid: "submit".to_string(),
                stats: 1,
                bytes_sent: data.len() as u64,
                ..Default::default()
            })
        }

        fn update_check_tags(
            &self,
            _: &Context,
            _: &[String],
        ) -> ::std::result::Result<Option<CheckBundle>, BoxError> {
            Ok(None)
        }
    }

    struct Refuser;

    impl Transport for Refuser {
        fn send_metrics(&self, _: &Context, _: &[u8]) -> ::std::result::Result<TrapResult, BoxError> {
            Err("broker unreachable".into())
        }

        fn update_check_tags(
            &self,
            _: &Context,
            _: &[String],
        ) -> ::std::result::Result<Option<CheckBundle>, BoxError> {
            Ok(None)
        }
    }

    #[test]
    fn no_transport() {
        let tm = TrapMetrics::new(Config::default(), None);
        tm.counter_increment("c", &Tags::new()).unwrap();
        match tm.flush(&Context::new()) {
            Err(Error::NoTransport) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(1, tm.len());
    }

    #[test]
    fn nothing_to_send() {
        let rec = Recorder::default();
        let tm = TrapMetrics::with_transport(Config::default(), rec.clone());
        let res = tm.flush(&Context::new()).unwrap();
        assert_eq!(NO_METRICS, res.error);
        assert!(rec.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn flush_submits_and_clears() {
        let rec = Recorder::default();
        let tm = TrapMetrics::with_transport(Config::default(), rec.clone());
        tm.counter_increment("c", &Tags::new()).unwrap();
        let res = tm.flush(&Context::new()).unwrap();
        assert_eq!("check", res.check_uuid);
        assert_eq!("submit", res.submit_uuid);
        assert_eq!("", res.error);
        assert_eq!(1, res.stats);
        assert!(res.flush_duration >= res.encode_duration);

        let sent = rec.sent.lock().unwrap();
        assert_eq!(1, sent.len());
        assert_eq!(sent[0].len() as u64, res.bytes_sent);
        assert!(tm.is_empty());
    }

    #[test]
    fn flush_with_buffer_reuses() {
        let rec = Recorder::default();
        let tm = TrapMetrics::with_transport(Config::default(), rec.clone());
        let mut buf = b"stale".to_vec();
        tm.gauge_set("g", &Tags::new(), 1i32, None).unwrap();
        tm.flush_with_buffer(&Context::new(), &mut buf).unwrap();
        assert_eq!(
            r#"{"g":{"_type":"i","_ts":0,"_value":1}}"#,
            String::from_utf8(buf).unwrap()
        );
    }

    #[test]
    fn raw_json_leaves_store() {
        let rec = Recorder::default();
        let tm = TrapMetrics::with_transport(Config::default(), rec.clone());
        tm.counter_increment("c", &Tags::new()).unwrap();
        let raw = br#"{"x":{"_type":"i","_ts":1,"_value":1}}"#;
        tm.flush_raw_json(&Context::new(), raw).unwrap();
        assert_eq!(raw.to_vec(), rec.sent.lock().unwrap()[0]);
        assert_eq!(1, tm.len());
        assert_eq!(NO_METRICS, tm.flush_raw_json(&Context::new(), b"").unwrap().error);
    }

    #[test]
    fn cancelled_context() {
        let rec = Recorder::default();
        let tm = TrapMetrics::with_transport(Config::default(), rec.clone());
        tm.counter_increment("c", &Tags::new()).unwrap();
        let ctx = Context::new();
        ctx.cancel();
        match tm.flush(&ctx) {
            Err(Error::Cancelled) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(rec.sent.lock().unwrap().is_empty());
        assert!(tm.is_empty());
    }

    #[test]
    fn transport_failure() {
        let tm = TrapMetrics::with_transport(Config::default(), Refuser);
        tm.counter_increment("c", &Tags::new()).unwrap();
        match tm.flush(&Context::new()) {
            Err(Error::Transport(e)) => assert_eq!("broker unreachable", e.to_string()),
            other => panic!("unexpected {:?}", other),
        }
        assert!(tm.is_empty());
    }

    #[test]
    fn null_transport() {
        let tm = TrapMetrics::with_transport(Config::default(), Null::new());
        tm.text_set("t", &Tags::new(), "x", None).unwrap();
        let res = tm.flush(&Context::new()).unwrap();
        assert!(res.bytes_sent > 0);
    }
}
