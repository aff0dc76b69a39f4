#[macro_use]
extern crate criterion;

use criterion::Criterion;

extern crate trapmetrics;

use std::time::Duration;
use trapmetrics::{Config, Tags, TrapMetrics};

fn populate(tm: &TrapMetrics) {
    for host in &["web-01", "web-02", "web-03", "db-01"] {
        let tags = Tags::new().with("host", *host).with("service", "api");
        for i in 0..25 {
            let name = format!("requests.{}", i);
            tm.counter_increment(&name, &tags).unwrap();
            tm.gauge_set(&format!("conns.{}", i), &tags, i as u32, None)
                .unwrap();
            tm.histogram_record_duration(
                &format!("latency.{}", i),
                &tags,
                Duration::from_micros(150 * (i + 1)),
            ).unwrap();
            tm.text_set(&format!("version.{}", i), &tags, "1.2.3", None)
                .unwrap();
        }
    }
}

fn experiment() {
    let tm = TrapMetrics::new(Config::default(), None);
    populate(&tm);
    let buf = tm.json_metrics().unwrap();
    assert!(buf.is_some());
}

fn record_histogram(tm: &TrapMetrics, tags: &Tags) {
    for v in &[0.001, 0.5, 3.14, 42.0, 1000.0, -7.5] {
        tm.histogram_record_value("latency", tags, *v).unwrap();
    }
}

fn benchmark(c: &mut Criterion) {
    c.bench_function("populate_and_encode", |b| {
        b.iter(|| experiment());
    });

    let tm = TrapMetrics::new(Config::default(), None);
    let tags = Tags::new().with("host", "web-01");
    c.bench_function("histogram_record_value", move |b| {
        b.iter(|| record_histogram(&tm, &tags));
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
