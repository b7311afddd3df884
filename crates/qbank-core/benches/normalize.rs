use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use qbank_core::model::OptionsField;
use qbank_core::options::normalize;

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let absent = OptionsField::Absent;
    let strings = OptionsField::from(json!(["Paris", "Lyon", "Nice", "Lille"]));
    let objects = OptionsField::from(json!([
        {"text": "Paris", "is_correct": true, "image_path": "uploads\\img\\paris.png"},
        {"option_text": "Lyon"},
        {"content": "Nice", "is_correct": "false"},
        {"text": "", "is_correct": 0}
    ]));
    let keyed = OptionsField::from(json!({
        "a": {"text": "one"},
        "b": "two",
        "c": 3,
        "d": null
    }));
    let large = OptionsField::from(serde_json::Value::Array(
        (0..200)
            .map(|i| json!({"text": format!("option {i}"), "is_correct": i % 7 == 0}))
            .collect(),
    ));

    group.bench_function("absent", |b| b.iter(|| normalize(black_box(&absent))));
    group.bench_function("strings", |b| b.iter(|| normalize(black_box(&strings))));
    group.bench_function("objects", |b| b.iter(|| normalize(black_box(&objects))));
    group.bench_function("keyed", |b| b.iter(|| normalize(black_box(&keyed))));
    group.bench_function("large_200", |b| b.iter(|| normalize(black_box(&large))));

    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
