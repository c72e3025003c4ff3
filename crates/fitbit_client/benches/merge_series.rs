use criterion::{Criterion, criterion_group, criterion_main};
use fitbit_client::series::{SeriesPoint, merge_series};
use std::hint::black_box;

fn daily_series(days: u64, step: u64, base: f64) -> Vec<SeriesPoint> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).expect("start date");
    (0..days)
        .map(|i| SeriesPoint {
            date: (start + chrono::Days::new(i * step)).to_string(),
            value: base + (i % 7) as f64,
        })
        .collect()
}

fn bench_merge_series(c: &mut Criterion) {
    // A year of daily calorie samples joined with sparser scale data, the
    // widest range the dashboard requests.
    let calories_out = daily_series(365, 1, 2400.0);
    let calories_in = daily_series(365, 1, 1900.0);
    let weight = daily_series(120, 3, 70.0);

    c.bench_function("merge_series_three_way_year", |b| {
        b.iter(|| {
            merge_series(black_box(&[&calories_out, &calories_in, &weight]));
        })
    });
}

criterion_group!(benches, bench_merge_series);
criterion_main!(benches);
