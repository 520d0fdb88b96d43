//! Performance benchmarks for conditional expressions
//!
//! Conditionals are compiled once when a form is loaded and evaluated on every
//! keystroke, so evaluation over many drafts is what matters most.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use regform::expression::{EvaluationContext, ExpressionEngine};
use regform::{Draft, EngineConfig, FormDefinition, FormEngine};
use serde_json::{json, Value};
use std::hint::black_box;
use std::path::PathBuf;

const CONDITIONALS: [(&str, &str); 4] = [
    ("simple", "values.placeOfBirth !== 'HEALTH_FACILITY'"),
    (
        "guarded",
        "!draftData || !draftData.registration || draftData.registration.presentAtBirthRegistration !== 'BOTH_PARENTS'",
    ),
    (
        "helper",
        "values.countryPermanent && !isDefaultCountry(values.countryPermanent)",
    ),
    ("array", "values.multipleBirth > 1 || includes(values.tags, 'twin')"),
];

fn drafts(size: usize) -> Vec<(Value, Value)> {
    (0..size)
        .map(|i| {
            let values = json!({
                "placeOfBirth": if i % 2 == 0 { "HEALTH_FACILITY" } else { "PRIVATE_HOME" },
                "countryPermanent": if i % 3 == 0 { "FAR" } else { "XYZ" },
                "multipleBirth": i % 4,
                "tags": ["single", if i % 5 == 0 { "twin" } else { "none" }],
            });
            let draft = json!({
                "registration": {"presentAtBirthRegistration": if i % 2 == 0 { "BOTH_PARENTS" } else { "MOTHER" }},
                "mother": values.clone(),
            });
            (draft, values)
        })
        .collect()
}

/// Parsing cost, paid once per conditional at form load
fn bench_compile(c: &mut Criterion) {
    let engine = ExpressionEngine::new(&EngineConfig::default());
    let mut group = c.benchmark_group("compile");
    for (name, source) in CONDITIONALS {
        group.bench_with_input(BenchmarkId::from_parameter(name), &source, |b, source| {
            b.iter(|| black_box(engine.compile(black_box(source)).unwrap()));
        });
    }
    group.finish();
}

/// Evaluation of a compiled conditional over many drafts
fn bench_evaluate(c: &mut Criterion) {
    let engine = ExpressionEngine::new(&EngineConfig::default());
    let mut group = c.benchmark_group("evaluate");
    for size in [100, 1000, 10000] {
        let inputs = drafts(size);
        for (name, source) in CONDITIONALS {
            let compiled = engine.compile(source).unwrap();
            group.bench_with_input(BenchmarkId::new(name, size), &inputs, |b, inputs| {
                b.iter(|| {
                    let hidden = inputs
                        .iter()
                        .filter(|(draft, values)| {
                            engine.evaluate(&compiled, &EvaluationContext::new(draft, values))
                        })
                        .count();
                    black_box(hidden);
                });
            });
        }
    }
    group.finish();
}

/// Full visibility pass over the birth form's mother section
fn bench_section_visibility(c: &mut Criterion) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/birth_form.json");
    let form = FormDefinition::from_path(&path).unwrap();
    let engine = FormEngine::new(form, EngineConfig::default()).unwrap();
    let draft = Draft::from_value(json!({"mother": {
        "countryPermanent": "XYZ",
        "currentAddressSameAsPermanent": false
    }}))
    .unwrap();

    c.bench_function("visible_fields_mother", |b| {
        b.iter(|| black_box(engine.get_visible_fields("mother", black_box(&draft)).unwrap()));
    });
}

criterion_group!(benches, bench_compile, bench_evaluate, bench_section_visibility);
criterion_main!(benches);
