#![allow(
    clippy::tests_outside_test_module,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    reason = "benchmark"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use jtml::{JtmlEngine, JtmlInterface, Template, to_html};

mod utils;

fn jtml_benchmark(c: &mut Criterion) {
    let template_content = include_str!("template_profile.html");

    let mut engine = JtmlEngine::new();
    engine.add_template("profile", template_content).unwrap();

    // Generate 100 random payloads
    let contexts = utils::generate_random_contexts(100);

    // Print binary size information
    utils::print_binary_size();

    let mut group = c.benchmark_group("Template Rendering");
    group.sample_size(50);

    group.bench_function("jtml_compile", |b| {
        b.iter(|| black_box(Template::from_markup(black_box(template_content)).unwrap()));
    });

    group.bench_function("jtml_render", |b| {
        b.iter(|| {
            for context in &contexts {
                black_box(engine.render("profile", context).unwrap());
            }
        });
    });

    group.bench_function("jtml_render_to_html", |b| {
        b.iter(|| {
            for context in &contexts {
                black_box(to_html(&engine.render("profile", context).unwrap()));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, jtml_benchmark);
criterion_main!(benches);
