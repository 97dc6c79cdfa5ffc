use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use depdash::features::{FeatureCatalog, RawForm, RawFormValue, normalize};

fn survey_form() -> RawForm {
    [
        ("Academic Pressure", RawFormValue::Number(3.0)),
        ("Work/Study Hours", RawFormValue::Text("8".to_string())),
        ("Financial Stress", RawFormValue::Text("not sure".to_string())),
        ("Dietary Habits", RawFormValue::Label("Moderate".to_string())),
        ("Sleep Duration", RawFormValue::Number(5.5)),
        ("Family History of Mental Illness", RawFormValue::Boolean(true)),
        ("Have you ever had suicidal thoughts ?", RawFormValue::Label("No".to_string())),
        ("CGPA", RawFormValue::Text("7.25".to_string())),
        ("Gender", RawFormValue::Label("Female".to_string())),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let catalog = FeatureCatalog::builtin();
    let specs = catalog.get("RandomForest").expect("builtin features");
    let form = survey_form();
    c.bench_with_input(
        BenchmarkId::new("normalize_survey", specs.len()),
        &form,
        |b, form| {
            b.iter(|| normalize(black_box(specs), black_box(form)));
        },
    );
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
