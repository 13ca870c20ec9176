use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use mlb_trending::matchup_locate::locate_matchup_table;
use mlb_trending::matchup_outcome::{ExactMatch, FuzzyMatch};
use mlb_trending::matchup_stats::aggregate;

const RESULTS: [&str; 8] = [
    "Single",
    "Strikeout",
    "Walk",
    "Groundout",
    "Double",
    "Flyout",
    "Home Run",
    "Sacrifice Fly",
];

fn sample_page(rows: usize) -> String {
    let mut html = String::from(
        "<html><body><h2>Career Summary</h2><table><tr><td>x</td></tr></table>\
         <h3>Plate Appearance Logs</h3><table><tr><th>Date</th><th>Inn</th>\
         <th>Count</th><th>Result</th><th>Pitch</th><th>Velo</th></tr>",
    );
    for i in 0..rows {
        html.push_str(&format!(
            "<tr><td>2024-05-{:02}</td><td>{}</td><td>1-1</td><td>{}</td><td>Sinker</td><td>94.1</td></tr>",
            i % 28 + 1,
            i % 9 + 1,
            RESULTS[i % RESULTS.len()]
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn bench_locate(c: &mut Criterion) {
    let page = sample_page(200);
    c.bench_function("matchup_locate_200_rows", |b| {
        b.iter(|| {
            let table = locate_matchup_table(black_box(&page)).unwrap();
            black_box(table.rows.len());
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let table = locate_matchup_table(&sample_page(200)).unwrap();
    c.bench_function("matchup_aggregate_exact", |b| {
        b.iter(|| {
            let stats = aggregate(black_box(&table), &ExactMatch).unwrap();
            black_box(stats.on_base_plus_slugging);
        })
    });
    c.bench_function("matchup_aggregate_fuzzy", |b| {
        b.iter(|| {
            let stats = aggregate(black_box(&table), &FuzzyMatch).unwrap();
            black_box(stats.on_base_plus_slugging);
        })
    });
}

criterion_group!(benches, bench_locate, bench_aggregate);
criterion_main!(benches);
