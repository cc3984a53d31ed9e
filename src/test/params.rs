use crate::error::ConfigError;
use crate::sim::{
    ArrivalPolicy, Catalog, EntryPolicy, ProductType, RunParameters, SimTime, UniformRange,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn small_catalog() -> Catalog {
    Catalog {
        types: vec!["A".to_string(), "B".to_string()],
        stages: vec!["s0".to_string(), "s1".to_string(), "s2".to_string()],
    }
}

fn valid() -> RunParameters {
    RunParameters::uniform(
        small_catalog(),
        UniformRange::new(1, 3),
        UniformRange::new(5, 12),
        0.05,
        UniformRange::new(5, 12),
    )
}

#[test]
fn default_catalog_has_three_types_and_five_stages() {
    let c = Catalog::default();
    assert_eq!(c.type_count(), 3);
    assert_eq!(c.stage_count(), 5);
    assert_eq!(c.type_name(ProductType(1)), "Tablet");
    assert_eq!(c.stage_name(0), "Picking");
    assert_eq!(c.stage_name(99), "?");
}

#[test]
fn uniform_parameters_are_valid() {
    let p = valid();
    assert_eq!(p.validate(), Ok(()));
    assert_eq!(p.service_secs.len(), 2);
    assert!(p.service_secs.iter().all(|row| row.len() == 3));
    assert_eq!(p.service(ProductType(1), 2), UniformRange::new(5, 12));
}

#[test]
fn inverted_ranges_are_rejected() {
    let mut p = valid();
    p.items_per_type = UniformRange::new(4, 2);
    assert!(matches!(
        p.validate(),
        Err(ConfigError::InvalidRange { min: 4, max: 2, .. })
    ));

    let mut p = valid();
    p.service_secs[1][2] = UniformRange::new(9, 3);
    let err = p.validate().expect_err("inverted service range");
    assert!(err.to_string().contains("B/s2"), "message: {err}");

    let mut p = valid();
    p.rework_extra_secs = UniformRange::new(2, 1);
    assert!(matches!(p.validate(), Err(ConfigError::InvalidRange { .. })));
}

#[test]
fn rework_probability_must_be_a_probability() {
    for bad in [-0.1, 1.01, f64::NAN] {
        let mut p = valid();
        p.rework_probability = bad;
        assert!(
            matches!(p.validate(), Err(ConfigError::ReworkProbability(_))),
            "accepted {bad}"
        );
    }
    for ok in [0.0, 1.0] {
        let mut p = valid();
        p.rework_probability = ok;
        assert_eq!(p.validate(), Ok(()));
    }
}

#[test]
fn time_scale_must_be_finite_and_non_negative() {
    let p = valid().with_time_scale(-1.0);
    assert_eq!(p.validate(), Err(ConfigError::TimeScale(-1.0)));
    let p = valid().with_time_scale(f64::INFINITY);
    assert!(matches!(p.validate(), Err(ConfigError::TimeScale(_))));
    assert_eq!(valid().with_time_scale(0.5).validate(), Ok(()));
}

#[test]
fn catalog_and_service_table_must_agree() {
    let mut p = valid();
    p.service_secs.pop();
    assert!(matches!(
        p.validate(),
        Err(ConfigError::ServiceShape {
            types: 1,
            expected_types: 2,
            expected_stages: 3,
            ..
        })
    ));

    let mut p = valid();
    p.service_secs[0].pop();
    assert!(matches!(
        p.validate(),
        Err(ConfigError::ServiceShape { stages: 2, .. })
    ));

    let mut p = valid();
    p.catalog.stages.clear();
    assert_eq!(p.validate(), Err(ConfigError::NoStages));

    let mut p = valid();
    p.catalog.types.clear();
    assert_eq!(p.validate(), Err(ConfigError::NoProductTypes));
}

#[test]
fn generate_fixes_one_base_time_per_station() {
    let mut rng = StdRng::seed_from_u64(42);
    let p = RunParameters::generate(
        Catalog::default(),
        UniformRange::new(10, 20),
        UniformRange::new(5, 12),
        0.05,
        &mut rng,
    )
    .expect("generate");
    assert_eq!(p.service_secs.len(), 3);
    for row in &p.service_secs {
        assert_eq!(row.len(), 5);
        for r in row {
            assert_eq!(r.min, r.max);
            assert!((5..=12).contains(&r.min));
        }
    }
    assert_eq!(p.rework_extra_secs, UniformRange::new(5, 12));

    let mut again = StdRng::seed_from_u64(42);
    let q = RunParameters::generate(
        Catalog::default(),
        UniformRange::new(10, 20),
        UniformRange::new(5, 12),
        0.05,
        &mut again,
    )
    .expect("generate");
    assert_eq!(p, q);
}

#[test]
fn generate_rejects_invalid_input() {
    let mut rng = StdRng::seed_from_u64(1);
    let err = RunParameters::generate(
        Catalog::default(),
        UniformRange::new(1, 2),
        UniformRange::new(12, 5),
        0.0,
        &mut rng,
    )
    .expect_err("inverted duration range");
    assert!(matches!(err, ConfigError::InvalidRange { min: 12, max: 5, .. }));

    let err = RunParameters::generate(
        Catalog::default(),
        UniformRange::new(1, 2),
        UniformRange::new(5, 12),
        2.0,
        &mut rng,
    )
    .expect_err("bad probability");
    assert_eq!(err, ConfigError::ReworkProbability(2.0));
}

#[test]
fn uniform_range_sampling_stays_in_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let r = UniformRange::new(3, 6);
    for _ in 0..200 {
        assert!((3..=6).contains(&r.sample(&mut rng)));
    }
    assert_eq!(UniformRange::fixed(5).sample_secs(&mut rng), SimTime::from_secs(5));
}

#[test]
fn arrival_policies() {
    assert_eq!(ArrivalPolicy::Batch.arrival(7), SimTime::ZERO);
    let every = ArrivalPolicy::Interval { every_secs: 4 };
    assert_eq!(every.arrival(0), SimTime::ZERO);
    assert_eq!(every.arrival(3), SimTime::from_secs(12));
}

#[test]
fn run_parameters_parse_json_with_defaults() {
    let raw = r#"
    {
        "items_per_type": { "min": 1, "max": 2 },
        "service_secs": [
            [ { "min": 5, "max": 5 }, { "min": 5, "max": 5 }, { "min": 5, "max": 5 }, { "min": 5, "max": 5 }, { "min": 5, "max": 5 } ],
            [ { "min": 5, "max": 5 }, { "min": 5, "max": 5 }, { "min": 5, "max": 5 }, { "min": 5, "max": 5 }, { "min": 5, "max": 5 } ],
            [ { "min": 5, "max": 5 }, { "min": 5, "max": 5 }, { "min": 5, "max": 5 }, { "min": 5, "max": 5 }, { "min": 5, "max": 5 } ]
        ],
        "rework_probability": 0.0,
        "rework_extra_secs": { "min": 0, "max": 0 }
    }
    "#;
    let p: RunParameters = serde_json::from_str(raw).expect("parse params");
    assert_eq!(p.catalog, Catalog::default());
    assert_eq!(p.time_scale, 0.0);
    assert_eq!(p.arrival, ArrivalPolicy::Batch);
    assert_eq!(p.entry, EntryPolicy::FirstService);
    assert_eq!(p.validate(), Ok(()));
}

#[test]
fn run_parameters_parse_policies_snake_case() {
    let raw = r#"
    {
        "catalog": { "types": ["A"], "stages": ["only"] },
        "items_per_type": { "min": 0, "max": 0 },
        "service_secs": [ [ { "min": 1, "max": 2 } ] ],
        "rework_probability": 0.5,
        "rework_extra_secs": { "min": 1, "max": 1 },
        "time_scale": 0.01,
        "arrival": { "kind": "interval", "every_secs": 3 },
        "entry": "seeded"
    }
    "#;
    let p: RunParameters = serde_json::from_str(raw).expect("parse params");
    assert_eq!(p.arrival, ArrivalPolicy::Interval { every_secs: 3 });
    assert_eq!(p.entry, EntryPolicy::Seeded);
    assert_eq!(p.validate(), Ok(()));
}

#[test]
fn negative_bounds_do_not_parse() {
    let raw = r#"{ "min": -1, "max": 3 }"#;
    assert!(serde_json::from_str::<UniformRange>(raw).is_err());
}
