//! The identity keyed metric store.
//!
//! One mutex guards the whole map. Callers never hold a reference into the
//! map across an unlock: mutation runs inside `update` under the lock and
//! lookups hand back clones.

use crate::constants::MAX_TAGS;
use crate::error::{Error, Result};
use crate::metric::{identity, Kind, Metric};
use crate::tags::Tags;
use seahash::SeaHasher;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Map from metric identity to metric.
pub type MetricMap = HashMap<u64, Metric, BuildHasherDefault<SeaHasher>>;

/// A mutex guarded `MetricMap`.
#[derive(Debug, Default)]
pub struct Store {
    metrics: Mutex<MetricMap>,
}

fn validate(name: &str, tags: &Tags) -> Result<()> {
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    if tags.len() > MAX_TAGS {
        return Err(Error::TooManyTags(tags.len()));
    }
    Ok(())
}

impl Store {
    /// Create an empty store
    pub fn new() -> Store {
        Store::default()
    }

    /// Lock the map.
    ///
    /// A panic while the lock was held leaves at worst one partially updated
    /// metric behind, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<MetricMap> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the metric for `(name, kind, tags)`, creating it with
    /// no samples first if it does not exist yet.
    ///
    /// The name must be non-empty and there may be no more than `MAX_TAGS`
    /// tags. Validation happens before the lock is taken and nothing is
    /// created when it fails. If `f` fails the metric is still created but
    /// `f` is expected to have left it as it found it.
    pub fn update<F, T>(&self, name: &str, kind: Kind, tags: &Tags, f: F) -> Result<T>
    where
        F: FnOnce(&mut Metric) -> Result<T>,
    {
        validate(name, tags)?;
        let id = identity(name, kind, tags);
        let mut metrics = self.lock();
        let metric = metrics.entry(id).or_insert_with(|| {
            trace!("new {} metric {} ({})", kind, name, tags);
            Metric::new(name, kind, tags.clone())
        });
        f(metric)
    }

    /// Snapshot of the metric for `(name, kind, tags)`.
    pub fn fetch(&self, name: &str, kind: Kind, tags: &Tags) -> Result<Metric> {
        let id = identity(name, kind, tags);
        match self.lock().get(&id) {
            Some(m) => Ok(m.clone()),
            None => Err(Error::NotFound {
                kind,
                id,
                name: name.to_string(),
                tags: tags.to_string(),
            }),
        }
    }

    /// Number of distinct metrics held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Determine if the store holds no metrics
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
