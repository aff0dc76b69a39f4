//! The metric container.

use crate::check_tags::CheckTagQueue;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::transport::{CheckBundle, Context, Transport};
use std::fmt;

/// An in-process metric aggregation container.
///
/// Samples are recorded through the `counter_*`, `gauge_*`, `histogram_*`,
/// `cumulative_histogram_*` and `text_*` methods and held until the next
/// flush, which encodes everything buffered into httptrap JSON, clears the
/// container and hands the JSON to the transport. `TrapMetrics` is `Send +
/// Sync`; share it by reference or behind an `Arc`.
pub struct TrapMetrics {
    pub(crate) config: Config,
    pub(crate) store: Store,
    pub(crate) transport: Option<Box<dyn Transport>>,
    pub(crate) check_tags: CheckTagQueue,
}

impl TrapMetrics {
    /// Create a container. Without a transport metrics can still be encoded
    /// with `json_metrics` or `write_json_metrics` but not flushed.
    pub fn new(config: Config, transport: Option<Box<dyn Transport>>) -> TrapMetrics {
        TrapMetrics {
            config,
            store: Store::new(),
            transport,
            check_tags: CheckTagQueue::new(),
        }
    }

    /// Create a container with the given transport
    pub fn with_transport<T>(config: Config, transport: T) -> TrapMetrics
    where
        T: Transport + 'static,
    {
        TrapMetrics::new(config, Some(Box::new(transport)))
    }

    /// The configuration the container was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Identifier of the trap check, as configured
    pub fn trap_id(&self) -> &str {
        &self.config.trap_id
    }

    /// Number of distinct metrics buffered
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Determine if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Queue a check tag for the next `update_check_tags`. Ignored if either
    /// part is empty; the last value queued for a category wins.
    pub fn queue_check_tag(&self, category: &str, value: &str) {
        self.check_tags.queue(category, value);
    }

    /// Submit queued check tags through the transport.
    ///
    /// Returns `Ok(None)` without touching the transport if nothing is
    /// queued. Otherwise the queue is emptied whatever the outcome and the
    /// transport's updated check bundle, if any, is returned.
    pub fn update_check_tags(&self, ctx: &Context) -> Result<Option<CheckBundle>> {
        if self.check_tags.is_empty() {
            return Ok(None);
        }
        let tags = self.check_tags.drain();
        let transport = self.transport.as_ref().ok_or(Error::NoTransport)?;
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        debug!("updating check tags: {}", tags.join(","));
        transport
            .update_check_tags(ctx, &tags)
            .map_err(Error::Transport)
    }
}

impl fmt::Debug for TrapMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TrapMetrics")
            .field("config", &self.config)
            .field("metrics", &self.store.len())
            .field("transport", &self.transport.is_some())
            .field("check_tags", &self.check_tags.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::BoxError;
    use crate::transport::{Null, TrapResult};
    use std::sync::{Arc, Mutex};

    struct Tagger {
        seen: Arc<Mutex<Vec<Vec<String>>>>,
        fail: bool,
    }

    impl Transport for Tagger {
        fn send_metrics(&self, _: &Context, _: &[u8]) -> ::std::result::Result<TrapResult, BoxError> {
            Ok(TrapResult::default())
        }

        fn update_check_tags(
            &self,
            _: &Context,
            tags: &[String],
        ) -> ::std::result::Result<Option<CheckBundle>, BoxError> {
            self.seen.lock().unwrap().push(tags.to_vec());
            if self.fail {
                return Err("api unavailable".into());
            }
            Ok(Some(CheckBundle {
                tags: tags.to_vec(),
                ..Default::default()
            }))
        }
    }

    fn tagger(fail: bool) -> (TrapMetrics, Arc<Mutex<Vec<Vec<String>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let tm = TrapMetrics::with_transport(
            Config::default(),
            Tagger {
                seen: Arc::clone(&seen),
                fail,
            },
        );
        (tm, seen)
    }

    #[test]
    fn is_send_and_sync() {
        fn check<T: Send + Sync>() {}
        check::<TrapMetrics>();
    }

    #[test]
    fn update_with_nothing_queued() {
        let (tm, seen) = tagger(false);
        assert!(tm.update_check_tags(&Context::new()).unwrap().is_none());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn update_sends_sorted_tags() {
        let (tm, seen) = tagger(false);
        tm.queue_check_tag("zone", "b");
        tm.queue_check_tag("app", "web");
        tm.queue_check_tag("zone", "a");
        let bundle = tm.update_check_tags(&Context::new()).unwrap().unwrap();
        assert_eq!(vec!["app:web".to_string(), "zone:a".to_string()], bundle.tags);
        assert_eq!(1, seen.lock().unwrap().len());
        assert!(tm.update_check_tags(&Context::new()).unwrap().is_none());
    }

    #[test]
    fn failed_update_still_clears() {
        let (tm, _) = tagger(true);
        tm.queue_check_tag("app", "web");
        match tm.update_check_tags(&Context::new()) {
            Err(Error::Transport(e)) => assert_eq!("api unavailable", e.to_string()),
            other => panic!("unexpected {:?}", other),
        }
        assert!(tm.check_tags.is_empty());
    }

    #[test]
    fn cancelled_update_still_clears() {
        let (tm, seen) = tagger(false);
        tm.queue_check_tag("app", "web");
        let ctx = Context::new();
        ctx.cancel();
        match tm.update_check_tags(&ctx) {
            Err(Error::Cancelled) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(tm.check_tags.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn update_without_transport() {
        let tm = TrapMetrics::new(Config::default(), None);
        tm.queue_check_tag("app", "web");
        match tm.update_check_tags(&Context::new()) {
            Err(Error::NoTransport) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(tm.check_tags.is_empty());
    }

    #[test]
    fn trap_id_from_config() {
        let config = Config {
            trap_id: "httptrap:1:app".to_string(),
            ..Default::default()
        };
        let tm = TrapMetrics::with_transport(config, Null::new());
        assert_eq!("httptrap:1:app", tm.trap_id());
        assert!(tm.is_empty());
    }
}
