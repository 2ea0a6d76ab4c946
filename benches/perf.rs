use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use betsmarter_terminal::filters::{FilterState, LeagueSelection, build_plan};
use betsmarter_terminal::memory_store::{MemoryStore, row_matches};
use betsmarter_terminal::records::parse_records_json;
use betsmarter_terminal::refresh::{page_query, stat_query};
use betsmarter_terminal::stats::{OutcomeCounts, StatKind, stats_view};

fn busy_filters() -> FilterState {
    FilterState {
        search: "manchester".to_string(),
        away: true,
        league: LeagueSelection::Named("Eng1".to_string()),
        odd1: "2.05".to_string(),
        oddx: "3,40".to_string(),
        odd2: "3.60".to_string(),
        tolerance: "0.10".to_string(),
    }
}

fn bench_records_parse(c: &mut Criterion) {
    c.bench_function("records_parse", |b| {
        b.iter(|| {
            let rows = parse_records_json(black_box(MATCHES_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_plan_render(c: &mut Criterion) {
    let filters = busy_filters();
    c.bench_function("plan_render", |b| {
        b.iter(|| {
            let plan = build_plan(black_box(&filters));
            let conditions = plan.conditions().unwrap();
            let mut params = page_query(conditions, 40, 20).to_params();
            for kind in StatKind::ALL {
                params.extend(stat_query(conditions, kind).to_params());
            }
            black_box(params.len());
        })
    });
}

fn bench_memory_filtering(c: &mut Criterion) {
    let base = parse_records_json(MATCHES_JSON).unwrap();
    let rows = base
        .iter()
        .cycle()
        .take(5_000)
        .enumerate()
        .map(|(i, r)| {
            let mut r = r.clone();
            r.id = i as i64;
            r
        })
        .collect::<Vec<_>>();
    let store = MemoryStore::new(rows);
    let over = StatKind::Over.condition();

    c.bench_function("memory_filtering", |b| {
        b.iter(|| {
            let hits = store
                .rows()
                .iter()
                .filter(|r| row_matches(black_box(&over), r))
                .count();
            black_box(hits);
        })
    });
}

fn bench_stats_view(c: &mut Criterion) {
    let counts = OutcomeCounts {
        filtered: 45_123,
        home: 20_011,
        draw: 12_400,
        away: 12_000,
        over: 23_900,
        bts: 25_100,
    };
    let odds = [Some(2.05), Some(3.4), Some(3.6)];
    c.bench_function("stats_view", |b| {
        b.iter(|| {
            let view = stats_view(black_box(&counts), black_box(odds));
            let labels = view.cells.iter().map(|c| c.label()).collect::<Vec<_>>();
            black_box(labels);
        })
    });
}

criterion_group!(
    perf,
    bench_records_parse,
    bench_plan_render,
    bench_memory_filtering,
    bench_stats_view
);
criterion_main!(perf);

static MATCHES_JSON: &str = include_str!("../tests/fixtures/matches_page.json");
