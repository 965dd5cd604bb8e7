use chrono::Utc;
use coach_hub::models::program::{build_week_view, PrescribedSet, ProgramTemplate};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// A full-size template: 52 weeks, 7 days, 8 sets per day.
fn fixture() -> (ProgramTemplate, Vec<PrescribedSet>) {
    let template = ProgramTemplate {
        id: 1,
        name: "Annual Plan".to_string(),
        description: String::new(),
        num_weeks: 52,
        num_days: 7,
        created_at: Utc::now(),
    };

    let mut sets = Vec::new();
    let mut id = 0;
    for week in 1..=template.num_weeks {
        for day in 1..=template.num_days {
            // Reverse order so the per-day sort has work to do.
            for set_number in (1..=8).rev() {
                id += 1;
                sets.push(PrescribedSet {
                    id,
                    template_id: template.id,
                    week,
                    day,
                    set_number,
                    exercise_id: set_number % 4 + 1,
                    exercise_name: "Back Squat".to_string(),
                    reps: Some(5),
                    percentage: Some(70.0 + set_number as f64),
                    notes: String::new(),
                });
            }
        }
    }
    (template, sets)
}

fn benchmark_week_view(c: &mut Criterion) {
    let (template, sets) = fixture();

    let mut group = c.benchmark_group("week_view");

    group.bench_function("first_week", |b| {
        b.iter(|| build_week_view(black_box(&template), black_box(&sets), 1))
    });

    group.bench_function("last_week", |b| {
        b.iter(|| build_week_view(black_box(&template), black_box(&sets), 52))
    });

    group.finish();
}

criterion_group!(benches, benchmark_week_view);
criterion_main!(benches);
