use pixel_physics::physics::Plane;
use pixel_physics::physics::remap::remap;
use pixel_physics::physics::variant_names;
use pixel_physics::{Boundary, Frame, ParamSet, PhysicsEngine};

const W: usize = 30;
const H: usize = 20;
const PATCH: [u8; 3] = [250, 40, 10];
const BACKGROUND: [u8; 3] = [20, 60, 200];

fn patch_frame() -> Frame {
    let mut f = Frame::filled(W, H, BACKGROUND);
    for y in 0..10 {
        for x in 0..10 {
            f.set_pixel(x, y, PATCH);
        }
    }
    f
}

fn uniform(v: f32) -> Plane {
    let mut p = Plane::zeros(W, H);
    p.fill(v);
    p
}

fn shifted(boundary: Boundary, dx: f32) -> Frame {
    remap(&patch_frame(), &uniform(dx), &uniform(0.0), boundary)
}

#[test]
fn zero_field_is_identity() {
    let frame = patch_frame();
    for boundary in [Boundary::Clamp, Boundary::Black, Boundary::Wrap, Boundary::Mirror] {
        let out = remap(&frame, &uniform(0.0), &uniform(0.0), boundary);
        assert_eq!(out, frame, "{boundary:?}");
    }
}

#[test]
fn wrap_brings_the_patch_back_on_the_right() {
    // Sampling five pixels to the right moves content left.
    let out = shifted(Boundary::Wrap, 5.0);
    for y in 0..10 {
        for x in 0..5 {
            assert_eq!(out.pixel(x, y), PATCH, "({x},{y})");
        }
        for x in W - 5..W {
            assert_eq!(out.pixel(x, y), PATCH, "wrapped ({x},{y})");
        }
        for x in 5..W - 5 {
            assert_eq!(out.pixel(x, y), BACKGROUND, "({x},{y})");
        }
    }
}

#[test]
fn black_zeroes_samples_outside_the_frame() {
    let out = shifted(Boundary::Black, 5.0);
    for y in 0..H {
        for x in W - 5..W {
            assert_eq!(out.pixel(x, y), [0, 0, 0], "({x},{y})");
        }
    }
    let out = shifted(Boundary::Black, -5.0);
    for y in 0..H {
        for x in 0..5 {
            assert_eq!(out.pixel(x, y), [0, 0, 0], "({x},{y})");
        }
        assert_ne!(out.pixel(5, y), [0, 0, 0]);
    }
}

#[test]
fn clamp_repeats_the_edge_column() {
    let out = shifted(Boundary::Clamp, -5.0);
    for y in 0..H {
        let edge = patch_frame().pixel(0, y);
        for x in 0..5 {
            assert_eq!(out.pixel(x, y), edge, "({x},{y})");
        }
    }
    let out = shifted(Boundary::Clamp, 5.0);
    for x in W - 5..W {
        assert_eq!(out.pixel(x, 0), BACKGROUND);
    }
}

#[test]
fn mirror_reflects_back_into_the_frame() {
    let out = shifted(Boundary::Mirror, -5.0);
    for y in 0..10 {
        // Columns 0..5 read -5..-1, reflected onto columns 4..0 of the patch.
        for x in 0..15 {
            assert_eq!(out.pixel(x, y), PATCH, "({x},{y})");
        }
        assert_eq!(out.pixel(15, y), BACKGROUND);
    }
    for y in 10..H {
        assert_eq!(out.pixel(0, y), BACKGROUND);
    }
}

#[test]
fn fractional_shift_blends_across_the_patch_edge() {
    let out = shifted(Boundary::Clamp, 0.5);
    let got = out.pixel(9, 0);
    let want = [
        ((PATCH[0] as f32 + BACKGROUND[0] as f32) / 2.0).round() as u8,
        ((PATCH[1] as f32 + BACKGROUND[1] as f32) / 2.0).round() as u8,
        ((PATCH[2] as f32 + BACKGROUND[2] as f32) / 2.0).round() as u8,
    ];
    assert_eq!(got, want);
}

#[test]
fn non_finite_offsets_sample_in_place() {
    let frame = patch_frame();
    let out = remap(&frame, &uniform(f32::NAN), &uniform(f32::INFINITY), Boundary::Wrap);
    assert_eq!(out, frame);
}

#[test]
fn uniform_frames_stay_uniform_without_black_border() {
    let frame = Frame::filled(24, 18, [77, 140, 3]);
    for boundary in [Boundary::Clamp, Boundary::Wrap, Boundary::Mirror] {
        for variant in variant_names() {
            let mut engine = PhysicsEngine::default();
            let out = engine
                .apply(&frame, variant, &ParamSet::new(), 8, 0, 1, boundary)
                .expect("render");
            assert_eq!(out, frame, "{variant} under {boundary:?}");
        }
    }
}
