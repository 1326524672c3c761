use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trip_window_rust::suitability::{find_alternatives, group, SearchBoundary};
use trip_window_rust::temporal::{align, parse_timezone, TimeWindow};
use trip_window_rust::{EvaluationRequest, Factor, HourlySeries, Preferences, WindowPlanner};

const WEEK_HOURS: usize = 7 * 24;

fn week_series(offset: f64) -> HourlySeries {
    let time = (0..WEEK_HOURS)
        .map(|h| format!("2024-06-{:02}T{:02}:00", 1 + h / 24, h % 24))
        .collect();
    let wave = |scale: f64, base: f64| -> Vec<Option<f64>> {
        (0..WEEK_HOURS)
            .map(|h| Some(base + offset + scale * (h as f64 * std::f64::consts::PI / 12.0).sin()))
            .collect()
    };
    HourlySeries {
        time,
        ..Default::default()
    }
    .with_column(Factor::Temperature, wave(6.0, 18.0))
    .with_column(Factor::Humidity, wave(20.0, 60.0))
    .with_column(Factor::Wind, wave(3.0, 4.0))
    .with_column(Factor::PrecipProbability, wave(30.0, 30.0))
    .with_column(Factor::PrecipAmount, wave(0.5, 0.3))
}

fn bench_planner(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner");

    let prefs = Preferences::default()
        .with(Factor::Temperature, Some(12.0), Some(22.0))
        .with(Factor::Humidity, None, Some(75.0))
        .with(Factor::Wind, None, Some(6.0))
        .with(Factor::PrecipProbability, None, Some(40.0));
    let planner = WindowPlanner::with_defaults();

    for hours in [3usize, 24, 72] {
        let end_day = 3 + hours / 24;
        let end_hour = 9 + hours % 24;
        let request = EvaluationRequest::new(
            "2024-06-03T09:00",
            &format!("2024-06-{:02}T{:02}:00", end_day, end_hour),
            "Europe/Berlin",
        )
        .with_source("forecast", week_series(0.0))
        .with_source("reanalysis", week_series(1.5))
        .with_preferences(prefs.clone());

        group.bench_with_input(BenchmarkId::new("evaluate", hours), &request, |b, request| {
            b.iter(|| planner.evaluate(black_box(request)))
        });
    }

    group.finish();
}

fn bench_building_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("building_blocks");

    let tz = parse_timezone("Europe/Berlin").unwrap();
    let raw = week_series(0.0).time;
    group.bench_function("align_week", |b| b.iter(|| align(black_box(&raw), tz)));

    let times = align(&raw, tz).unwrap();
    let mask: Vec<bool> = (0..WEEK_HOURS).map(|h| h % 7 != 0).collect();
    group.bench_function("group_week", |b| b.iter(|| group(black_box(&times), black_box(&mask))));

    let window = TimeWindow::new(times[80], times[86]).unwrap();
    let boundary = SearchBoundary::around(&times, &window);
    group.bench_function("alternatives_week", |b| {
        b.iter(|| find_alternatives(black_box(&times), black_box(&mask), 6, boundary))
    });

    group.finish();
}

criterion_group!(benches, bench_planner, bench_building_blocks);
criterion_main!(benches);
