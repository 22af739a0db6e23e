use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skimmer_scanners::{PatternSelection, PatternSet, RegexScanner};

fn sample_text() -> String {
    "OSHA requires fall protection at heights over 6 feet. Contact \
     safety@example.com or call (555) 123-4567 before March 15, 2024. \
     Budget is $2.5 million under 29 CFR 1926.501."
        .repeat(64)
}

fn keyword_scan(c: &mut Criterion) {
    let entries = [
        ("OSHA", "org"),
        ("EPA", "org"),
        ("fall protection", "term"),
        ("safety", "term"),
        ("hazard", "term"),
    ]
    .iter()
    .map(|(p, v)| (p.to_string(), v.to_string()))
    .collect::<Vec<_>>();
    let set = PatternSet::build("bench", entries, true).unwrap();
    let text = sample_text();

    c.bench_function("keyword_scan", |b| {
        b.iter(|| black_box(set.scan(&text).count()))
    });
}

fn regex_scan(c: &mut Criterion) {
    let scanner = RegexScanner::with_defaults();
    let text = sample_text();

    c.bench_function("regex_scan_default", |b| {
        b.iter(|| black_box(scanner.scan(&text, PatternSelection::Default).len()))
    });
}

criterion_group!(benches, keyword_scan, regex_scan);
criterion_main!(benches);
