// Criterion benchmarks for Exhibitor Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use exhibitor_match::core::{normalize, score, Matcher};
use exhibitor_match::models::{LookingFor, RawExhibitor, VisitorPreferences};
use serde_json::json;

const INDUSTRIES: [&str; 5] = ["Construction", "Energy", "Healthcare", "Logistics", "Agriculture"];
const COUNTRIES: [&str; 4] = ["Libya", "Egypt", "Tunisia", "Turkey"];

fn create_exhibitor(id: usize) -> RawExhibitor {
    serde_json::from_value(json!({
        "id": id,
        "en_name": format!("Exhibitor {}", id),
        "company_industries": [{ "name": INDUSTRIES[id % INDUSTRIES.len()] }],
        "form3_data_entry": {
            "country": COUNTRIES[id % COUNTRIES.len()],
            "tags": ["solar", "cement", "logistics software"],
            "company_description": "Regional supplier of building and energy equipment"
        },
        "event_user": { "gold_sponsorship": id % 7 == 0 },
        "is_partner": id % 11 == 0,
        "teamCount": id % 6
    }))
    .unwrap_or_default()
}

fn create_preferences() -> VisitorPreferences {
    VisitorPreferences::new(["Construction", "Energy"])
        .with_country("Libya")
        .with_interests(["solar", "equipment"])
        .with_looking_for(LookingFor::Sponsors)
}

fn bench_normalize(c: &mut Criterion) {
    let raw = create_exhibitor(7);
    c.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box(&raw)));
    });
}

fn bench_score(c: &mut Criterion) {
    let attrs = normalize(&create_exhibitor(7));
    let preferences = create_preferences();
    c.bench_function("score", |b| {
        b.iter(|| score(black_box(&preferences), black_box(&attrs)));
    });
}

fn bench_generate(c: &mut Criterion) {
    let matcher = Matcher::default();
    let preferences = create_preferences();

    let mut group = c.benchmark_group("generate");

    for exhibitor_count in [10, 100, 500, 2000].iter() {
        let catalog: Vec<RawExhibitor> = (0..*exhibitor_count).map(create_exhibitor).collect();

        group.bench_with_input(
            BenchmarkId::new("catalog", exhibitor_count),
            exhibitor_count,
            |b, _| {
                b.iter(|| matcher.generate(black_box(&preferences), black_box(&catalog)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_score, bench_generate);

criterion_main!(benches);
