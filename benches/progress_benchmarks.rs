use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use yuniserver::progress::parse_percent;

fn parse_percent_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_percent");

    let lines = [
        ("stats", "Transferred:   1.205 GiB / 10.000 GiB, 12%, 25.3 MiB/s, ETA 5m56s"),
        ("short", "Transferred: 42.5% done"),
        ("no_percent", "2024/05/01 13:37:00 INFO  : photo.jpg: Copied (new)"),
        ("bad_token", "checking files... % complete"),
    ];

    for (label, line) in lines.iter() {
        group.bench_with_input(BenchmarkId::new("line", label), line, |b, line| {
            b.iter(|| black_box(parse_percent(black_box(line))))
        });
    }
    group.finish();
}

criterion_group!(benches, parse_percent_benchmark);
criterion_main!(benches);
