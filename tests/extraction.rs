//! End-to-end extraction through the session facade.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use symfeat::{
    standard_builder, Catalog, CatalogError, DependencyValues, Dimensions, Event, EventStream,
    ExtractionConfig, ExtractionError, FeatureComputationError, FeatureDefinition, FeatureValue,
    FnExtractor, MalformedInputError, NoteSummary, Session, WindowConfig, STANDARD_FEATURES,
};

/// Three 2-second windows at the default tempo (480 ticks = 0.5 s).
///
/// Window 0: channel 0 plays 60, 64, 67 at velocities 60, 70, 50.
/// Window 1: channel 1 plays 48 and 72.
/// Window 2: channel 9 plays 60.
fn three_window_piece() -> EventStream {
    let notes: [(i64, u8, u8, u8); 6] = [
        (0, 0, 60, 60),
        (480, 0, 64, 70),
        (960, 0, 67, 50),
        (1920, 1, 48, 100),
        (2400, 1, 72, 100),
        (3840, 9, 60, 90),
    ];
    let mut stream = EventStream::new(480);
    for (tick, channel, pitch, velocity) in notes {
        stream.push(Event::note_on(tick, channel, pitch, velocity));
        stream.push(Event::note_off(tick + 240, channel, pitch));
    }
    stream
}

fn config() -> ExtractionConfig {
    ExtractionConfig {
        window: WindowConfig::new(2.0, 0.0),
        ..ExtractionConfig::default()
    }
}

fn scalars(values: &[FeatureValue]) -> Vec<Option<f64>> {
    values.iter().map(FeatureValue::first).collect()
}

#[test]
fn standard_features_over_three_windows() {
    let session = Session::new(config()).unwrap();
    let matrix = session.extract(&three_window_piece()).unwrap();

    assert!(matrix.is_complete());
    assert_eq!(matrix.len(), STANDARD_FEATURES.len());
    assert_eq!(matrix.window_count(), 3);

    let windows = |name: &str| scalars(matrix.get(name).unwrap().windows().unwrap());
    assert_eq!(windows("Range"), vec![Some(7.0), Some(24.0), Some(0.0)]);
    assert_eq!(windows("Range Change"), vec![None, Some(17.0), Some(-24.0)]);
    assert_eq!(windows("Note Density"), vec![Some(1.5), Some(1.0), Some(0.5)]);
    assert_eq!(
        windows("Average Note To Note Dynamics Change"),
        vec![Some(15.0), Some(0.0), Some(0.0)]
    );

    let whole = |name: &str| matrix.get(name).unwrap().single().unwrap().clone();
    assert_eq!(
        whole("Channel Loudness Averages"),
        FeatureValue::from(vec![60.0, 100.0, 90.0])
    );
    assert_eq!(whole("Number Of Active Channels"), FeatureValue::scalar(3.0));
}

#[test]
fn outputs_match_declared_dimensions() {
    let session = Session::new(config()).unwrap();
    let matrix = session.extract(&three_window_piece()).unwrap();

    for entry in matrix.entries() {
        let dims = entry.definition.dimensions();
        let values: Vec<&FeatureValue> = match (entry.single(), entry.windows()) {
            (Some(value), _) => vec![value],
            (_, Some(values)) => values.iter().collect(),
            _ => panic!("{} was not computed", entry.name()),
        };
        for value in values.into_iter().filter_map(FeatureValue::values) {
            assert!(dims.accepts(value.len()), "{} has width {}", entry.name(), value.len());
        }
    }
}

#[test]
fn empty_stream_yields_sentinels() {
    let session = Session::new(config()).unwrap();
    let matrix = session.extract(&EventStream::new(480)).unwrap();

    assert!(matrix.is_complete());
    assert_eq!(matrix.window_count(), 1);
    let legacy = matrix.to_legacy();
    for rows in &legacy {
        assert_eq!(rows.rows.len(), 1, "{}", rows.name);
        assert!(rows.rows[0].iter().all(|&v| v == -1.0), "{}", rows.name);
    }
    let histogram = legacy.iter().find(|r| r.name == "Basic Pitch Histogram").unwrap();
    assert_eq!(histogram.rows[0].len(), 128);
}

#[test]
fn enabled_features_pull_in_dependencies() {
    let session = Session::new(ExtractionConfig {
        enabled: Some(vec!["Range Change".to_string()]),
        ..config()
    })
    .unwrap();

    assert_eq!(session.catalog().topological_order(), vec!["Range", "Range Change"]);
    let matrix = session.extract(&three_window_piece()).unwrap();
    assert_eq!(matrix.len(), 2);
}

#[test]
fn unknown_enabled_feature_is_rejected() {
    let err = Session::new(ExtractionConfig {
        enabled: Some(vec!["Tempo".to_string()]),
        ..config()
    })
    .err()
    .unwrap();
    assert!(matches!(
        err,
        ExtractionError::Catalog(CatalogError::UnknownFeature(name)) if name == "Tempo"
    ));
}

#[test]
fn session_from_toml() {
    let session = Session::from_toml_str(
        r#"
        parallel = false
        enabled = ["Note Density"]

        [window]
        size_seconds = 2.0
        "#,
    )
    .unwrap();
    assert!(!session.config().parallel);

    let matrix = session.extract(&three_window_piece()).unwrap();
    let density = scalars(matrix.get("Note Density").unwrap().windows().unwrap());
    assert_eq!(density, vec![Some(1.5), Some(1.0), Some(0.5)]);
}

#[test]
fn invalid_window_config_is_rejected() {
    let result = Session::new(ExtractionConfig {
        window: WindowConfig::new(0.0, 0.0),
        ..ExtractionConfig::default()
    });
    assert!(matches!(result, Err(ExtractionError::Config(_))));
}

#[test]
fn malformed_input_aborts() {
    let mut stream = three_window_piece();
    stream.push(Event::note_on(10, 0, 60, 80));

    let err = Session::new(config()).unwrap().extract(&stream).unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::Malformed(MalformedInputError::OutOfOrder { .. })
    ));
}

#[test]
fn failing_feature_does_not_stop_the_run() {
    let broken = FnExtractor::new(
        FeatureDefinition::new("Broken", "Always fails", true, Dimensions::Fixed(1))
            .with_dependency("Range", 0),
        |_, rep, _| match rep {
            Some(_) => Err(FeatureComputationError::new("Broken", "unsupported")),
            None => Ok(FeatureValue::Unavailable),
        },
    );
    let catalog = Arc::new(standard_builder().register(broken).build().unwrap());
    let session = Session::with_catalog(config(), catalog).unwrap();
    let matrix = session.extract(&three_window_piece()).unwrap();

    assert!(!matrix.is_complete());
    let failed: Vec<_> = matrix.failed().map(|e| e.name().to_string()).collect();
    assert_eq!(failed, vec!["Broken"]);
    assert_eq!(matrix.errors()[0].window, Some(0));
    assert_eq!(matrix.computed().count(), STANDARD_FEATURES.len());
}

#[test]
fn panicking_feature_does_not_stop_the_run() {
    let fragile = FnExtractor::new(
        FeatureDefinition::new("Fragile", "Panics on any note", true, Dimensions::Fixed(1)),
        |_, rep, _| {
            let pitches: Vec<f64> = Vec::new();
            Ok(match rep {
                Some(r) if !r.is_silent() => FeatureValue::scalar(pitches[0]),
                _ => FeatureValue::Unavailable,
            })
        },
    );
    let catalog = Arc::new(standard_builder().register(fragile).build().unwrap());
    let session = Session::with_catalog(config(), catalog).unwrap();
    let matrix = session.extract(&three_window_piece()).unwrap();

    let failed: Vec<_> = matrix.failed().map(|e| e.name().to_string()).collect();
    assert_eq!(failed, vec!["Fragile"]);
    assert!(matrix.errors()[0].message.contains("panicked"));
    assert_eq!(matrix.computed().count(), STANDARD_FEATURES.len());
    let range = scalars(matrix.get("Range").unwrap().windows().unwrap());
    assert_eq!(range, vec![Some(7.0), Some(24.0), Some(0.0)]);
}

#[test]
fn deep_negative_offset_resolves_unavailable() {
    let deep = FnExtractor::new(
        FeatureDefinition::new("Deep", "", true, Dimensions::Fixed(1))
            .with_dependency("Range", -2_000_000_000),
        |_, _, deps| Ok(deps.get(0).clone()),
    );
    let catalog = Arc::new(standard_builder().register(deep).build().unwrap());
    let session = Session::with_catalog(config(), catalog).unwrap();
    let matrix = session.extract(&three_window_piece()).unwrap();

    let deep = scalars(matrix.get("Deep").unwrap().windows().unwrap());
    assert_eq!(deep, vec![None, None, None]);
}

#[test]
fn too_many_windows_is_rejected() {
    let session = Session::new(ExtractionConfig {
        window: WindowConfig::new(1e-9, 0.0),
        ..ExtractionConfig::default()
    })
    .unwrap();
    let err = session.extract(&three_window_piece()).unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::Malformed(MalformedInputError::TooManyWindows { .. })
    ));
}

#[test]
fn same_window_cycle_fails_before_extraction() {
    let def = |name: &str, dep: &str| {
        FeatureDefinition::new(name, "", true, Dimensions::Fixed(1)).with_dependency(dep, 0)
    };
    fn never(
        _: &EventStream,
        _: Option<&NoteSummary>,
        _: &DependencyValues<'_>,
    ) -> Result<FeatureValue, FeatureComputationError> {
        panic!("extractor must not run")
    }
    let result = Catalog::builder()
        .register(FnExtractor::new(def("A", "B"), never))
        .register(FnExtractor::new(def("B", "A"), never))
        .build();
    assert!(matches!(result, Err(CatalogError::Cycle(_))));
}

#[test]
fn parallel_and_serial_runs_agree() {
    let stream = three_window_piece();
    let parallel = Session::new(config()).unwrap().extract(&stream).unwrap();
    let serial = Session::new(ExtractionConfig {
        parallel: false,
        ..config()
    })
    .unwrap()
    .extract(&stream)
    .unwrap();
    assert_eq!(parallel, serial);
}

#[test]
fn cancelled_session_stops_at_first_window() {
    let flag = Arc::new(AtomicBool::new(true));
    let session = Session::new(config()).unwrap().with_cancellation(flag);
    let err = session.extract(&three_window_piece()).unwrap_err();
    assert!(matches!(err, ExtractionError::Cancelled { window: 0 }));
}
