use super::state::{Plane, SimulationState};

/// One integration step shared by every variant:
/// `v = v*damping + f*force_scale`, `d += v`, then `d` is clamped to `±max_disp`.
pub fn advance(
    state: &mut SimulationState,
    fx: &Plane,
    fy: &Plane,
    damping: f32,
    force_scale: f32,
    max_disp: f32,
) {
    let damping = if damping.is_finite() { damping.clamp(0.0, 1.0) } else { 0.0 };
    let force_scale = if force_scale.is_finite() { force_scale } else { 0.0 };
    let max_disp = if max_disp.is_finite() { max_disp.max(0.0) } else { 0.0 };

    step_axis(
        state.vx.as_mut_slice(),
        state.dx.as_mut_slice(),
        fx.as_slice(),
        damping,
        force_scale,
        max_disp,
    );
    step_axis(
        state.vy.as_mut_slice(),
        state.dy.as_mut_slice(),
        fy.as_slice(),
        damping,
        force_scale,
        max_disp,
    );
    state.mark_step();
}

fn step_axis(v: &mut [f32], d: &mut [f32], f: &[f32], damping: f32, force_scale: f32, max_disp: f32) {
    for ((vi, di), fi) in v.iter_mut().zip(d.iter_mut()).zip(f.iter()) {
        let force = if fi.is_finite() { *fi } else { 0.0 };
        let mut next_v = *vi * damping + force * force_scale;
        if !next_v.is_finite() {
            next_v = 0.0;
        }
        *vi = next_v;
        *di = (*di + *vi).clamp(-max_disp, max_disp);
    }
}
