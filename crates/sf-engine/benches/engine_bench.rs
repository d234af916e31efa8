use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sf_engine::{
    Catalog, Dimensions, ExtractionEngine, FeatureDefinition, FeatureValue, FnExtractor,
};
use sf_ir::{build, BuildOptions, Event, EventStream, WindowConfig};

/// Four channels of eighth notes for roughly two minutes.
fn busy_stream() -> EventStream {
    let mut stream = EventStream::new(480);
    for step in 0..1000i64 {
        let tick = step * 240;
        for channel in 0..4u8 {
            let pitch = 48 + ((step as u8).wrapping_mul(7).wrapping_add(channel * 5)) % 36;
            stream.push(Event::note_on(tick, channel, pitch, 64 + (step % 48) as u8));
        }
        for channel in 0..4u8 {
            let pitch = 48 + ((step as u8).wrapping_mul(7).wrapping_add(channel * 5)) % 36;
            stream.push(Event::note_off(tick + 200, channel, pitch));
        }
    }
    stream
}

fn catalog() -> Catalog {
    let mut builder = Catalog::builder();
    for i in 0..16 {
        let def = FeatureDefinition::new(format!("Mean Pitch {i}"), "", true, Dimensions::Fixed(1));
        builder = builder.register(FnExtractor::new(def, |_, rep, _| {
            Ok(rep.map_or(FeatureValue::Unavailable, |r| {
                let total: f64 = r.notes.iter().map(|n| n.pitch as f64).sum();
                FeatureValue::scalar(total / r.note_count().max(1) as f64)
            }))
        }));
    }
    let delta = FeatureDefinition::new("Delta", "", true, Dimensions::Fixed(1))
        .with_dependency("Mean Pitch 0", 0)
        .with_dependency("Mean Pitch 0", -1);
    builder
        .register(FnExtractor::new(delta, |_, _, deps| {
            Ok(match (deps.get(0).first(), deps.get(1).first()) {
                (Some(now), Some(before)) => FeatureValue::scalar(now - before),
                _ => FeatureValue::Unavailable,
            })
        }))
        .build()
        .unwrap()
}

fn bench_extraction(c: &mut Criterion) {
    let stream = busy_stream();
    let opts = BuildOptions {
        window: WindowConfig::new(1.0, 0.5),
        ..BuildOptions::default()
    };
    let catalog = Arc::new(catalog());

    c.bench_function("build_representation", |b| {
        b.iter(|| build(black_box(&stream), &opts).unwrap())
    });

    let rep = build(&stream, &opts).unwrap();
    c.bench_function("run_parallel", |b| {
        let engine = ExtractionEngine::new(Arc::clone(&catalog));
        b.iter(|| engine.run(black_box(&stream), rep.as_ref()).unwrap())
    });
    c.bench_function("run_serial", |b| {
        let engine = ExtractionEngine::new(Arc::clone(&catalog)).with_parallelism(false);
        b.iter(|| engine.run(black_box(&stream), rep.as_ref()).unwrap())
    });
}

criterion_group!(benches, bench_extraction);
criterion_main!(benches);
