// Rule engine benchmarks.
//
// Measures rule-string parsing, flat evaluation and nested composition
// with the default English formatter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gatekeep_validator::{Data, FieldValidator, RuleSet, RuleSpec, Validator};
use serde_json::{Value, json};

fn data(value: Value) -> Data {
    match value {
        Value::Object(map) => map,
        _ => Data::new(),
    }
}

fn simple() -> Validator {
    Validator::new(
        RuleSet::builder()
            .rule("age", "required|numeric|min:5")
            .rule("size", "numeric|min:10")
            .rule("email", "required|email")
            .rule("role", "in:admin,editor,viewer")
            .build()
            .unwrap(),
    )
}

fn collection() -> Validator {
    Validator::new(
        RuleSet::builder()
            .rule("items", "required|array|nested_collection:simple")
            .validator("simple", simple())
            .build()
            .unwrap(),
    )
}

fn parse_rule_strings(c: &mut Criterion) {
    c.bench_function("parse_rule_string", |b| {
        b.iter(|| RuleSpec::parse(black_box("bail|required|string|between:3,32|regex:/^[a-z_]+$/i")));
    });
}

fn flat_evaluation(c: &mut Criterion) {
    let validator = simple();
    let valid = data(json!({"age": "42", "size": 12, "email": "a@example.com", "role": "admin"}));
    let invalid = data(json!({"age": 1, "size": "x", "email": "nope", "role": "root"}));

    c.bench_function("flat_valid", |b| {
        b.iter(|| validator.verify(black_box(&valid)).unwrap());
    });
    c.bench_function("flat_invalid", |b| {
        b.iter(|| validator.evaluate(black_box(&invalid)).unwrap());
    });
}

fn nested_collection_evaluation(c: &mut Criterion) {
    let validator = collection();
    let mut group = c.benchmark_group("nested_collection");

    for len in [1_usize, 16, 256] {
        let items: Vec<Value> = (0..len)
            .map(|i| json!({"age": i % 20, "size": 12, "email": "a@example.com"}))
            .collect();
        let input = data(json!({ "items": items }));
        group.bench_with_input(BenchmarkId::from_parameter(len), &input, |b, input| {
            b.iter(|| validator.evaluate(black_box(input)).unwrap());
        });
    }
    group.finish();
}

fn single_field(c: &mut Criterion) {
    let fields = FieldValidator::new();
    let input = data(json!({"port": "8080"}));

    c.bench_function("field_get_integer", |b| {
        b.iter(|| fields.get(black_box(&input), "port", "required|integer|between:1,65535").unwrap());
    });
}

criterion_group!(
    benches,
    parse_rule_strings,
    flat_evaluation,
    nested_collection_evaluation,
    single_field
);
criterion_main!(benches);
