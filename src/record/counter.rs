use crate::error::Result;
use crate::metric::{Kind, Metric, Sample, Value, WireType};
use crate::tags::Tags;
use crate::trap::TrapMetrics;

fn adjust(m: &mut Metric, delta: i64) -> Result<()> {
    let acc = match m.samples.get(&0) {
        Some(&Sample::Value(Value::Int64(v))) => v,
        _ => 0,
    };
    m.wire_type = Some(WireType::Int64);
    m.samples
        .insert(0, Sample::Value(Value::Int64(acc.wrapping_add(delta))));
    Ok(())
}

impl TrapMetrics {
    /// Add one to a counter.
    pub fn counter_increment(&self, name: &str, tags: &Tags) -> Result<()> {
        self.counter_adjust_by_value(name, tags, 1)
    }

    /// Add `value` to a counter. The accumulator is signed 64 bit and wraps.
    pub fn counter_increment_by_value(&self, name: &str, tags: &Tags, value: u64) -> Result<()> {
        self.counter_adjust_by_value(name, tags, value as i64)
    }

    /// Add `value`, which may be negative, to a counter.
    pub fn counter_adjust_by_value(&self, name: &str, tags: &Tags, value: i64) -> Result<()> {
        self.store
            .update(name, Kind::Counter, tags, |m| adjust(m, value))
    }

    /// Snapshot of a counter. The accumulator is the sample at key 0.
    pub fn counter_fetch(&self, name: &str, tags: &Tags) -> Result<Metric> {
        self.store.fetch(name, Kind::Counter, tags)
    }
}

#[cfg(test)]
mod test {
    use crate::config::Config;
    use crate::error::Error;
    use crate::metric::{Value, WireType};
    use crate::tags::Tags;
    use crate::trap::TrapMetrics;
    use quickcheck::{QuickCheck, TestResult};

    fn tm() -> TrapMetrics {
        TrapMetrics::new(Config::default(), None)
    }

    fn tags() -> Tags {
        Tags::new().with("foo", "bar")
    }

    #[test]
    fn increment() {
        let tm = tm();
        tm.counter_increment("foo", &tags()).unwrap();
        tm.counter_increment("foo", &tags()).unwrap();
        let m = tm.counter_fetch("foo", &tags()).unwrap();
        assert_eq!(Some(Value::Int64(2)), m.value(0));
        assert_eq!(Some(WireType::Int64), m.wire_type);
        assert_eq!(1, m.samples.len());
    }

    #[test]
    fn adjust_down() {
        let tm = tm();
        tm.counter_increment_by_value("foo", &tags(), 10).unwrap();
        tm.counter_adjust_by_value("foo", &tags(), -15).unwrap();
        let m = tm.counter_fetch("foo", &tags()).unwrap();
        assert_eq!(Some(Value::Int64(-5)), m.value(0));
    }

    #[test]
    fn wraps() {
        let tm = tm();
        tm.counter_adjust_by_value("foo", &tags(), i64::max_value())
            .unwrap();
        tm.counter_increment("foo", &tags()).unwrap();
        let m = tm.counter_fetch("foo", &tags()).unwrap();
        assert_eq!(Some(Value::Int64(i64::min_value())), m.value(0));
    }

    #[test]
    fn empty_name() {
        match tm().counter_increment("", &tags()) {
            Err(Error::EmptyName) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn fetch_missing() {
        match tm().counter_fetch("foo", &tags()) {
            Err(Error::NotFound { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn k_increments_equal_one_adjust() {
        fn inner(k: u8) -> TestResult {
            let stepwise = tm();
            for _ in 0..k {
                stepwise.counter_increment("foo", &tags()).unwrap();
            }
            let once = tm();
            once.counter_adjust_by_value("foo", &tags(), i64::from(k))
                .unwrap();
            if k == 0 {
                assert!(stepwise.counter_fetch("foo", &tags()).is_err());
                return TestResult::passed();
            }
            assert_eq!(
                stepwise.counter_fetch("foo", &tags()).unwrap().value(0),
                once.counter_fetch("foo", &tags()).unwrap().value(0)
            );
            TestResult::passed()
        }
        QuickCheck::new()
            .tests(100)
            .max_tests(1000)
            .quickcheck(inner as fn(u8) -> TestResult);
    }
}
