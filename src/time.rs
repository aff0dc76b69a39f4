//! Timestamps as the collector understands them: milliseconds since the Unix
//! epoch.

use chrono::{DateTime, Utc};

/// Current time in milliseconds since the epoch.
pub fn now() -> u64 {
    to_millis(&Utc::now())
}

/// Convert a timestamp into epoch milliseconds. Pre-epoch times clamp to 0.
pub fn to_millis(ts: &DateTime<Utc>) -> u64 {
    let ms = ts.timestamp_millis();
    if ms < 0 {
        0
    } else {
        ms as u64
    }
}

/// Compute the sample key for an optional caller supplied timestamp.
///
/// Absence of a timestamp maps to the sentinel 0, meaning "stamp me at flush
/// time". Every untimestamped write to a metric therefore lands on the same
/// key.
pub fn sample_key(ts: Option<&DateTime<Utc>>) -> u64 {
    match ts {
        Some(ts) => to_millis(ts),
        None => 0,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sample_key_without_timestamp_is_zero() {
        assert_eq!(0, sample_key(None));
    }

    #[test]
    fn sample_key_is_epoch_millis() {
        let ts = Utc.timestamp_millis(1_600_000_000_123);
        assert_eq!(1_600_000_000_123, sample_key(Some(&ts)));
    }

    #[test]
    fn pre_epoch_clamps() {
        let ts = Utc.timestamp_millis(-5_000);
        assert_eq!(0, to_millis(&ts));
    }

    #[test]
    fn now_is_after_2020() {
        assert!(now() > 1_577_836_800_000);
    }
}
