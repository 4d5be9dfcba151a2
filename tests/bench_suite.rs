#[allow(dead_code)]
#[path = "../src/bin/physics_bench.rs"]
mod physics_bench;

use clap::Parser;
use pixel_physics::{ParamValue, PhysicsEngine};

#[test]
fn parse_args_defaults_are_stable() {
    let args = physics_bench::Cli::try_parse_from(["physics_bench"]).expect("parse should succeed");

    assert_eq!(args.variant, "liquify");
    assert_eq!(args.group, None);
    assert_eq!(args.width, 320);
    assert_eq!(args.height, 180);
    assert_eq!(args.frames, 30);
    assert_eq!(args.seed, 7);
    assert_eq!(args.boundary, "clamp");
    assert!(args.params.is_empty());
    assert!(!args.list);
}

#[test]
fn parse_args_overrides_work() {
    let args = physics_bench::Cli::try_parse_from([
        "physics_bench",
        "--variant",
        "magnetic",
        "--group",
        "cosmos",
        "--width",
        "64",
        "--height",
        "48",
        "--frames",
        "5",
        "--seed",
        "42",
        "--boundary",
        "wrap",
        "--param",
        "strength=12",
        "--param",
        "field_type=toroidal",
    ])
    .expect("parse should succeed");

    assert_eq!(args.variant, "magnetic");
    assert_eq!(args.group.as_deref(), Some("cosmos"));
    assert_eq!((args.width, args.height, args.frames, args.seed), (64, 48, 5, 42));
    assert_eq!(args.params, vec!["strength=12", "field_type=toroidal"]);
}

#[test]
fn validate_rejects_zero_sizes_and_bad_boundary() {
    for flag in ["--width", "--height", "--frames"] {
        let args = physics_bench::Cli::try_parse_from(["physics_bench", flag, "0"])
            .expect("parse should succeed");
        let err = physics_bench::validate_args(&args).expect_err("zero should be rejected");
        assert!(err.to_string().contains(flag), "{err}");
    }

    let args = physics_bench::Cli::try_parse_from(["physics_bench", "--boundary", "sideways"])
        .expect("parse should succeed");
    assert!(physics_bench::validate_args(&args).is_err());
}

#[test]
fn param_values_parse_by_shape() {
    let (k, v) = physics_bench::parse_param("strength=12.5").expect("number");
    assert_eq!((k.as_str(), v), ("strength", ParamValue::Number(12.5)));
    let (_, v) = physics_bench::parse_param("impulse_at_start=false").expect("flag");
    assert_eq!(v, ParamValue::Flag(false));
    let (_, v) = physics_bench::parse_param("field_type = quadrupole").expect("text");
    assert_eq!(v, ParamValue::Text("quadrupole".to_string()));

    assert!(physics_bench::parse_param("strength").is_err());
    assert!(physics_bench::parse_param("=3").is_err());
}

#[test]
fn group_flag_turns_variant_into_mode() {
    let args = physics_bench::Cli::try_parse_from([
        "physics_bench",
        "--group",
        "organic",
        "--variant",
        "inkdrop",
    ])
    .expect("parse should succeed");
    let params = physics_bench::build_params(&args).expect("params");
    assert_eq!(params.get("mode"), Some(&ParamValue::Text("inkdrop".to_string())));
}

#[test]
fn synthetic_frame_is_not_flat() {
    let frame = physics_bench::synthetic_frame(32, 24);
    assert_eq!((frame.width(), frame.height()), (32, 24));
    assert_ne!(frame.pixel(0, 0), frame.pixel(31, 23));
    assert_ne!(frame.pixel(0, 0), frame.pixel(8, 0));
}

#[test]
fn short_bench_reports_timings_and_motion() {
    let args = physics_bench::Cli::try_parse_from([
        "physics_bench",
        "--variant",
        "gravity",
        "--width",
        "48",
        "--height",
        "32",
        "--frames",
        "4",
    ])
    .expect("parse should succeed");
    let params = physics_bench::build_params(&args).expect("params");
    let mut engine = PhysicsEngine::default();
    let report = physics_bench::run_bench(&mut engine, &args, &params).expect("bench");

    assert_eq!(report.frames, 4);
    assert!(report.mean_ms >= 0.0 && report.max_ms + 1e-9 >= report.mean_ms);
    assert!(report.final_diff > 0.0);
    // The last frame closes the sequence and frees its state.
    assert!(engine.cache().is_empty());
}
