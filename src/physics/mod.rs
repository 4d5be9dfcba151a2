pub mod cache;
pub mod fields;
pub mod grid;
pub mod integrate;
pub mod params;
pub mod remap;
pub mod state;
pub mod variants;
pub mod warmup;

use crate::config::{DEFAULT_FRAME_RATE, PhysicsConfig};
use crate::error::PhysicsError;
use crate::frame::{Boundary, Frame};

pub use cache::StateCache;
pub use fields::{Field, MagneticKind};
pub use grid::Grid;
pub use params::{ParamKind, ParamSet, ParamSpec, ParamValue, ResolvedParams};
pub use state::{Extra, Plane, SimulationState};
pub use variants::{
    Dynamics, Group, VariantSpec, group_modes, group_names, variant_names, variant_spec,
};
pub use warmup::PreviewWarmup;

/// Where a call sits in its sequence.
#[derive(Debug, Clone, Copy)]
struct Call {
    seed: u64,
    frame_index: usize,
    total_frames: usize,
    boundary: Boundary,
}

/// Stateful displacement renderer: owns the per-effect simulation states and
/// drives force, integration and remapping for every call.
pub struct PhysicsEngine {
    config: PhysicsConfig,
    cache: StateCache,
    warmup: PreviewWarmup,
    frame_rate: f32,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsEngine {
    pub fn new(config: PhysicsConfig) -> Self {
        let frame_rate = if config.frame_rate.is_finite() && config.frame_rate > 0.0 {
            config.frame_rate
        } else {
            DEFAULT_FRAME_RATE
        };
        Self {
            config,
            cache: StateCache::new(config.cache_capacity),
            warmup: PreviewWarmup {
                preview_iterations: config.preview_iterations,
                preview_frame_limit: config.preview_frame_limit,
            },
            frame_rate,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Drops every simulation state.
    pub fn reset(&mut self) {
        log::debug!("clearing {} simulation states", self.cache.len());
        self.cache.clear();
    }

    /// Renders one frame of `variant`, advancing the state keyed `"{variant}_{seed}"`.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &mut self,
        frame: &Frame,
        variant: &str,
        params: &ParamSet,
        seed: u64,
        frame_index: usize,
        total_frames: usize,
        boundary: Boundary,
    ) -> Result<Frame, PhysicsError> {
        let spec = variants::lookup(variant)?;
        let key = format!("{}_{seed}", spec.name);
        let call = Call {
            seed,
            frame_index,
            total_frames,
            boundary,
        };
        Ok(self.run(&key, spec, frame, params, call))
    }

    /// Façade dispatch: `params["mode"]` picks one of the group's variants and
    /// the remaining params are filtered to what that variant declares.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_group(
        &mut self,
        group: &str,
        frame: &Frame,
        params: &ParamSet,
        seed: u64,
        frame_index: usize,
        total_frames: usize,
        boundary: Boundary,
    ) -> Result<Frame, PhysicsError> {
        let group = variants::group(group)?;
        let spec = group.select(params)?;
        let mut params = params.clone();
        params.remove("mode");
        let key = format!("{}_{}_{seed}", group.name, spec.name);
        let call = Call {
            seed,
            frame_index,
            total_frames,
            boundary,
        };
        Ok(self.run(&key, spec, frame, &params, call))
    }

    fn run(
        &mut self,
        key: &str,
        spec: &'static VariantSpec,
        frame: &Frame,
        params: &ParamSet,
        call: Call,
    ) -> Frame {
        let (resolved, dropped) = ResolvedParams::resolve(spec.params, params);
        if !dropped.is_empty() {
            log::debug!("{}: ignoring undeclared params {dropped:?}", spec.name);
        }
        let field = spec.build(&resolved);

        let (w, h) = (frame.width(), frame.height());
        let grid = Grid::new(w, h);
        let damping = resolved.num("damping");
        let base_scale = resolved.num("strength") * spec.dynamics.gain * grid.scale;
        let max_disp = spec.dynamics.max_disp_frac * grid.scale;
        let impulse = if resolved.flag("impulse_at_start") {
            spec.dynamics.impulse
        } else {
            1.0
        };
        let iterations = self.warmup.iterations(call.frame_index, call.total_frames);
        let frame_rate = self.frame_rate;
        log::trace!(
            "{key}: frame {}/{} running {iterations} step(s) at {w}x{h}",
            call.frame_index,
            call.total_frames
        );

        let state = self.cache.get_or_create(key, h, w);
        field.prepare_extra(&mut state.extra);

        let mut fx = Plane::zeros(w, h);
        let mut fy = Plane::zeros(w, h);
        for k in 0..iterations {
            let tick = (call.frame_index as u64).saturating_add(k as u64);
            let t = tick as f32 / frame_rate;
            field.force(&grid, t, call.seed, tick, &mut fx, &mut fy);

            let mut scale = base_scale * field.force_gain(&mut state.extra);
            if state.steps() == 0 {
                scale *= impulse;
            }
            integrate::advance(state, &fx, &fy, damping, scale, max_disp);
            state.push_echo();
        }

        let echo = state.echo_mean();
        let (dx, dy) = match &echo {
            Some((ex, ey)) => (ex, ey),
            None => (&state.dx, &state.dy),
        };
        let mut out = remap::remap(frame, dx, dy, call.boundary);
        field.post_process(&mut state.extra, &mut out);

        if call.total_frames > 1 && call.frame_index >= call.total_frames - 1 {
            self.cache.remove(key);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripes(w: usize, h: usize) -> Frame {
        let mut f = Frame::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let v = if (x / 2 + y / 2) % 2 == 0 { 230 } else { 20 };
                f.set_pixel(x, y, [v, (x * 7) as u8, (y * 5) as u8]);
            }
        }
        f
    }

    #[test]
    fn impulse_flag_strengthens_the_first_step() {
        let frame = stripes(24, 16);
        let mut with = PhysicsEngine::default();
        let mut without = PhysicsEngine::default();
        let on = ParamSet::new().with("impulse_at_start", true);
        let off = ParamSet::new().with("impulse_at_start", false);
        with.apply(&frame, "explode", &on, 3, 0, 100, Boundary::Clamp)
            .expect("explode with impulse");
        without
            .apply(&frame, "explode", &off, 3, 0, 100, Boundary::Clamp)
            .expect("explode without impulse");
        let a = with.cache().peek("explode_3").map(|s| s.max_displacement());
        let b = without.cache().peek("explode_3").map(|s| s.max_displacement());
        match (a, b) {
            (Some(a), Some(b)) => assert!(a > b, "impulse {a} vs plain {b}"),
            _ => panic!("explode state missing"),
        }
    }

    #[test]
    fn timewarp_keeps_an_echo_ring() {
        let frame = stripes(16, 16);
        let mut engine = PhysicsEngine::default();
        let params = ParamSet::new().with("echoes", 3);
        for i in 0..5 {
            engine
                .apply(&frame, "timewarp", &params, 1, i, 100, Boundary::Wrap)
                .expect("timewarp");
        }
        let Some(state) = engine.cache().peek("timewarp_1") else {
            panic!("timewarp state missing");
        };
        let Extra::Echo { ring, capacity } = &state.extra else {
            panic!("no echo ring");
        };
        assert_eq!(*capacity, 3);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn non_positive_frame_rate_falls_back() {
        let engine = PhysicsEngine::new(PhysicsConfig {
            frame_rate: 0.0,
            ..PhysicsConfig::default()
        });
        assert!((engine.frame_rate - DEFAULT_FRAME_RATE).abs() < 1e-6);
    }
}
