//! Property tests for the profile curve, control law and recorder

use heapless::String;
use proptest::prelude::*;

use reflow_core::config::ControlConfig;
use reflow_core::control::{Intensity, Regulator};
use reflow_core::profile::{PhaseKind, Profile, ProfilePoint};
use reflow_core::recorder::{Sample, SessionRecorder};

/// Strictly increasing points starting at 0 s
fn arb_points() -> impl Strategy<Value = Vec<ProfilePoint>> {
    prop::collection::vec((1.0f32..120.0, 0.0f32..250.0), 0..12).prop_flat_map(|steps| {
        (0.0f32..250.0).prop_map(move |start_c| {
            let mut points = vec![ProfilePoint::new(0.0, start_c)];
            let mut elapsed = 0.0;
            for (dt, target) in &steps {
                elapsed += dt;
                points.push(ProfilePoint::new(elapsed, *target));
            }
            points
        })
    })
}

fn arb_kind() -> impl Strategy<Value = PhaseKind> {
    prop_oneof![
        Just(PhaseKind::Heating),
        Just(PhaseKind::Reflow),
        Just(PhaseKind::Cooling),
    ]
}

fn any_error() -> impl Strategy<Value = f32> {
    prop_oneof![
        -500.0f32..500.0,
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
    ]
}

proptest! {
    #[test]
    fn interpolate_exact_at_points(points in arb_points()) {
        let profile = Profile::new("p", &points, &[], None).unwrap();
        for point in &points {
            prop_assert_eq!(profile.interpolate(point.elapsed_s), point.target_c);
        }
    }

    #[test]
    fn interpolate_between_neighbours(points in arb_points(), fraction in 0.0f32..1.0) {
        let profile = Profile::new("p", &points, &[], None).unwrap();
        for pair in points.windows(2) {
            let t = pair[0].elapsed_s + (pair[1].elapsed_s - pair[0].elapsed_s) * fraction;
            let value = profile.interpolate(t);
            let lo = pair[0].target_c.min(pair[1].target_c) - 0.05;
            let hi = pair[0].target_c.max(pair[1].target_c) + 0.05;
            prop_assert!(value >= lo && value <= hi, "{} outside [{}, {}]", value, lo, hi);
        }
    }

    #[test]
    fn interpolate_clamps_outside_range(points in arb_points(), beyond in 0.001f32..10_000.0) {
        let profile = Profile::new("p", &points, &[], None).unwrap();
        let first = points[0].target_c;
        let last = points[points.len() - 1].target_c;
        prop_assert_eq!(profile.interpolate(-beyond), first);
        prop_assert_eq!(profile.interpolate(0.0), first);
        prop_assert_eq!(profile.interpolate(profile.duration_s() + beyond), last);
    }

    #[test]
    fn interpolate_is_continuous(points in arb_points(), t in 0.0f32..1000.0) {
        let profile = Profile::new("p", &points, &[], None).unwrap();
        // Steepest segment bounds the change over a small step
        let max_slope = points
            .windows(2)
            .map(|w| ((w[1].target_c - w[0].target_c) / (w[1].elapsed_s - w[0].elapsed_s)).abs())
            .fold(0.0f32, f32::max);
        let dt = 0.01;
        let delta = (profile.interpolate(t + dt) - profile.interpolate(t)).abs();
        prop_assert!(delta <= max_slope * dt * 1.1 + 1e-3);
    }

    #[test]
    fn intensity_always_in_range(
        target in any_error(),
        measured in -50.0f32..400.0,
        kind in arb_kind(),
        dampened in any::<bool>(),
    ) {
        let regulator = Regulator::from_config(&ControlConfig::default());
        let out = regulator.compute(target, measured, kind, dampened).percent();
        prop_assert!((0.0..=100.0).contains(&out));
    }

    #[test]
    fn intensity_monotonic_in_error(
        measured in 0.0f32..300.0,
        a in any_error(),
        b in any_error(),
        kind in arb_kind(),
        dampened in any::<bool>(),
    ) {
        let regulator = Regulator::from_config(&ControlConfig::default());
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let out_low = regulator.compute(measured + low, measured, kind, dampened);
        let out_high = regulator.compute(measured + high, measured, kind, dampened);
        prop_assert!(out_low <= out_high);
    }

    #[test]
    fn clamped_intensity_never_escapes(raw in any::<f32>()) {
        let percent = Intensity::new(raw).percent();
        prop_assert!((0.0..=100.0).contains(&percent));
    }

    #[test]
    fn recorder_keeps_only_increasing(stamps in prop::collection::vec(0u64..10_000, 0..50)) {
        let mut recorder = SessionRecorder::new();
        for stamp in stamps {
            let _ = recorder.record(Sample {
                timestamp_ms: stamp,
                measured_c: 20.0,
                target_c: 20.0,
                intensity: Intensity::OFF,
                phase: String::new(),
            });
        }
        let kept: Vec<u64> = recorder.all_samples().map(|s| s.timestamp_ms).collect();
        prop_assert!(kept.windows(2).all(|w| w[0] < w[1]));
    }
}
