use super::grid::Grid;
use super::state::{Extra, Plane};
use crate::frame::Frame;
use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, TAU};

// Softening for inverse-square falloffs, in normalised units squared.
const SOFTEN: f32 = 0.05;
const POLE_SOFTEN: f32 = 0.04;
const POLE_GAIN: f32 = 0.08;
const JITTER_CELLS: usize = 16;
const MELT_COLUMNS: usize = 48;
const MAX_EXPANSION: f32 = 8.0;

const SALT_WELLS: u64 = 0x6772_6176;
const SALT_VORTEX: u64 = 0x766f_7274;
const SALT_EXPLODE: u64 = 0x6578_706c;
const SALT_ELASTIC: u64 = 0x656c_6173;
const SALT_MELT: u64 = 0x6d65_6c74;
const SALT_LIQUIFY: u64 = 0x6c69_7175;
const SALT_BLACKHOLE: u64 = 0x626c_6b68;
const SALT_WORMHOLE: u64 = 0x776f_726d;
const SALT_DARK: u64 = 0x6461_726b;
const SALT_MAGNETIC: u64 = 0x6d61_676e;
const SALT_QUANTUM: u64 = 0x7175_616e;
const SALT_TUNNEL: u64 = 0x7475_6e6e;
const SALT_FOLD: u64 = 0x666f_6c64;
const SALT_SUPERFLUID: u64 = 0x7375_7066;
const SALT_TIMEWARP: u64 = 0x7469_6d65;
const SALT_BUBBLES: u64 = 0x6275_6262;
const SALT_INK: u64 = 0x696e_6b64;
const SALT_HAUNT: u64 = 0x6861_756e;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagneticKind {
    Dipole,
    Quadrupole,
    Toroidal,
}

impl MagneticKind {
    pub const NAMES: &'static [&'static str] = &["dipole", "quadrupole", "toroidal"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dipole" => Some(Self::Dipole),
            "quadrupole" => Some(Self::Quadrupole),
            "toroidal" => Some(Self::Toroidal),
            _ => None,
        }
    }
}

/// One physics variant with its resolved shape parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Liquify { wave_scale: f32, speed: f32 },
    Gravity { wells: usize, radius: f32, sign: f32 },
    Vortex { vortices: usize, radius: f32, pull: f32 },
    Explode { center: (f32, f32), decay: f32 },
    Elastic { stiffness: f32, wave_scale: f32 },
    Melt { heat: f32, viscosity: f32 },
    BlackHole { horizon: f32, spin: f32 },
    Wormhole { radius: f32, spin: f32 },
    DarkEnergy { centers: usize, acceleration: f32 },
    Magnetic { kind: MagneticKind, spacing: f32 },
    Quantum { barriers: usize, probability: f32, block: usize },
    DimensionFold { folds: usize, speed: f32 },
    Superfluid { lattice: usize },
    Timewarp { echoes: usize, wave_scale: f32 },
    Bubbles { count: usize, radius: f32, rise: f32 },
    InkDrop { drops: usize, spread: f32 },
    Haunt { persistence: f32, ghost_mix: f32 },
}

impl Field {
    /// Writes the force field at simulated time `t` into `fx`/`fy`.
    ///
    /// Placement randomness is derived from `seed` alone; `tick` (frame index plus
    /// sub-step) only feeds effects that re-roll every step.
    pub fn force(&self, grid: &Grid, t: f32, seed: u64, tick: u64, fx: &mut Plane, fy: &mut Plane) {
        match *self {
            Field::Liquify { wave_scale, speed } => {
                let ph = phases(seed, SALT_LIQUIFY);
                fill(grid, fx, fy, |_, _, x, y| turbulence(x, y, t * speed, wave_scale, &ph));
            }
            Field::Gravity { wells, radius, sign } => {
                let wells = scatter_wells(grid, seed, wells, t);
                fill(grid, fx, fy, |_, _, x, y| {
                    let mut f = (0.0, 0.0);
                    for w in &wells {
                        let (ax, ay) = point_pull(x, y, w.pos, radius);
                        f.0 += ax * w.mass * sign;
                        f.1 += ay * w.mass * sign;
                    }
                    f
                });
            }
            Field::Vortex { vortices, radius, pull } => {
                let cores = scatter_vortices(grid, seed, vortices);
                fill(grid, fx, fy, |_, _, x, y| vortex_force(x, y, &cores, radius, pull));
            }
            Field::Explode { center, decay } => {
                let c = grid.from_unit(center.0, center.1);
                let mut rng = seeded(seed, SALT_EXPLODE);
                let jitter: Vec<f32> = (0..JITTER_CELLS * JITTER_CELLS)
                    .map(|_| (rng.f32() - 0.5) * 0.8)
                    .collect();
                let fade = (-decay * t).exp();
                let extent = grid.extent();
                fill(grid, fx, fy, |_, _, x, y| {
                    let angle = jitter[cell_index(x, y, extent, JITTER_CELLS)];
                    blast(x, y, c, angle, fade)
                });
            }
            Field::Elastic { stiffness, wave_scale } => {
                let ph = phases(seed, SALT_ELASTIC);
                let bounce = (t * stiffness).cos();
                fill(grid, fx, fy, |_, _, x, y| {
                    let (a, b) = turbulence(x, y, t * 0.5, wave_scale, &ph);
                    (a * bounce, b * bounce)
                });
            }
            Field::Melt { heat, viscosity } => {
                let ph = phases(seed, SALT_MELT);
                let mut rng = seeded(seed, SALT_MELT);
                let rates: Vec<f32> = (0..MELT_COLUMNS).map(|_| 0.3 + 0.7 * rng.f32()).collect();
                let (ex, ey) = grid.extent();
                let flow = 1.0 - 0.6 * viscosity;
                fill(grid, fx, fy, |_, _, x, y| {
                    let col = unit_bucket(x / ex, MELT_COLUMNS);
                    let depth = (y / ey + 1.0) * 0.5;
                    let (tx, ty) = turbulence(x, y, t * 0.6, 3.0, &ph);
                    // Sampling from above drags content downward.
                    let drip = heat * rates[col] * (0.4 + 0.6 * depth);
                    (tx * 0.35 * flow, (ty * 0.15 - drip) * flow)
                });
            }
            Field::BlackHole { horizon, spin } => {
                let mut rng = seeded(seed, SALT_BLACKHOLE);
                let c = grid.from_unit(0.4 + 0.2 * rng.f32(), 0.4 + 0.2 * rng.f32());
                fill(grid, fx, fy, |_, _, x, y| black_hole(x, y, c, horizon, spin));
            }
            Field::Wormhole { radius, spin } => {
                let (entry, exit) = wormhole_mouths(grid, seed);
                fill(grid, fx, fy, |_, _, x, y| wormhole(x, y, entry, exit, radius, spin));
            }
            Field::DarkEnergy { centers, .. } => {
                let mut rng = seeded(seed, SALT_DARK);
                let n = centers.max(1);
                let cs: Vec<(f32, f32)> = (0..n).map(|_| scatter(&mut rng, grid, 0.25)).collect();
                let hubble = 0.8 / n as f32;
                fill(grid, fx, fy, |_, _, x, y| {
                    cs.iter().fold((0.0, 0.0), |acc, c| {
                        (acc.0 + (x - c.0) * hubble, acc.1 + (y - c.1) * hubble)
                    })
                });
            }
            Field::Magnetic { kind, spacing } => {
                let mut rng = seeded(seed, SALT_MAGNETIC);
                let c = grid.from_unit(0.45 + 0.1 * rng.f32(), 0.45 + 0.1 * rng.f32());
                let theta = rng.f32() * TAU;
                let orient = if rng.bool() { 1.0 } else { -1.0 };
                match kind {
                    MagneticKind::Toroidal => {
                        fill(grid, fx, fy, |_, _, x, y| toroidal(x, y, c, spacing, orient));
                    }
                    MagneticKind::Dipole | MagneticKind::Quadrupole => {
                        let poles = magnetic_poles(kind, c, theta, spacing, orient);
                        fill(grid, fx, fy, |_, _, x, y| pole_field(x, y, &poles));
                    }
                }
            }
            Field::Quantum { barriers, probability, block } => {
                quantum(grid, t, seed, tick, barriers, probability, block, fx, fy);
            }
            Field::DimensionFold { folds, speed } => {
                let mut rng = seeded(seed, SALT_FOLD);
                let n = folds.max(1);
                let axes: Vec<(f32, f32, f32)> = (0..n)
                    .map(|_| {
                        let theta = rng.f32() * TAU;
                        let offset = (rng.f32() - 0.5) * 0.6;
                        let dir = if rng.bool() { 1.0 } else { -1.0 };
                        (theta, offset, dir)
                    })
                    .collect();
                let weight = 1.0 / (n as f32).sqrt();
                fill(grid, fx, fy, |_, _, x, y| {
                    let mut f = (0.0, 0.0);
                    for &(theta0, offset, dir) in &axes {
                        let (s, c) = (theta0 + dir * speed * t).sin_cos();
                        let (a, b) = fold(x, y, (c, s), offset);
                        f.0 += a * weight;
                        f.1 += b * weight;
                    }
                    f
                });
            }
            Field::Superfluid { lattice } => {
                let cores = vortex_lattice(grid, seed, lattice);
                let n = lattice.max(1) as f32;
                let core = 0.6 / n;
                let mut rng = seeded(seed, SALT_SUPERFLUID ^ 1);
                let drift_phase = rng.f32() * TAU;
                let drift = (
                    0.1 * (t * 0.5 + drift_phase).cos(),
                    0.1 * (t * 0.5 + drift_phase).sin(),
                );
                fill(grid, fx, fy, |_, _, x, y| {
                    let mut f = drift;
                    for &(cx, cy, sign) in &cores {
                        let dx = x - cx;
                        let dy = y - cy;
                        let r = (dx * dx + dy * dy).sqrt();
                        let mag = sign * core / (r * r + core * core) * core * (-r * n * 0.8).exp();
                        f.0 += -dy * mag;
                        f.1 += dx * mag;
                    }
                    f
                });
            }
            Field::Timewarp { wave_scale, .. } => {
                let ph = phases(seed, SALT_TIMEWARP);
                fill(grid, fx, fy, |_, _, x, y| {
                    let (a, b) = turbulence(x, y, t * 0.7, wave_scale, &ph);
                    (a - y * 0.3, b + x * 0.3)
                });
            }
            Field::Bubbles { count, radius, rise } => {
                let bubbles = scatter_bubbles(grid, seed, count, radius, rise, t);
                fill(grid, fx, fy, |_, _, x, y| {
                    let mut f = (0.0, 0.0);
                    for b in &bubbles {
                        let (a, c) = bubble_push(x, y, b);
                        f.0 += a;
                        f.1 += c;
                    }
                    f
                });
            }
            Field::InkDrop { drops, spread } => {
                let drops = scatter_drops(grid, seed, drops);
                fill(grid, fx, fy, |_, _, x, y| {
                    let mut f = (0.0, 0.0);
                    for d in &drops {
                        let (a, b) = ink_ring(x, y, d, t, spread);
                        f.0 += a;
                        f.1 += b;
                    }
                    f
                });
            }
            Field::Haunt { .. } => {
                let ph = phases(seed, SALT_HAUNT);
                let mut rng = seeded(seed, SALT_HAUNT);
                let (s, c) = (rng.f32() * TAU).sin_cos();
                fill(grid, fx, fy, |_, _, x, y| {
                    let (a, b) = turbulence(x, y, t * 0.3, 1.5, &ph);
                    (a * 0.6 + c * 0.35, b * 0.6 + s * 0.35)
                });
            }
        }
    }

    /// Convenience wrapper allocating fresh force planes.
    pub fn force_planes(&self, grid: &Grid, t: f32, seed: u64, tick: u64) -> (Plane, Plane) {
        let mut fx = Plane::zeros(grid.w, grid.h);
        let mut fy = Plane::zeros(grid.w, grid.h);
        self.force(grid, t, seed, tick, &mut fx, &mut fy);
        (fx, fy)
    }

    /// Makes sure `extra` holds the auxiliary state this variant needs.
    pub fn prepare_extra(&self, extra: &mut Extra) {
        match *self {
            Field::Timewarp { echoes, .. } => {
                let cap = echoes.max(1);
                match extra {
                    Extra::Echo { ring, capacity } => {
                        *capacity = cap;
                        while ring.len() > cap {
                            ring.pop_front();
                        }
                    }
                    _ => {
                        *extra = Extra::Echo {
                            ring: VecDeque::with_capacity(cap),
                            capacity: cap,
                        }
                    }
                }
            }
            Field::DarkEnergy { .. } => {
                if !matches!(extra, Extra::Expansion { .. }) {
                    *extra = Extra::Expansion { factor: 1.0 };
                }
            }
            Field::Haunt { .. } => {
                if !matches!(extra, Extra::Haunt { .. }) {
                    *extra = Extra::Haunt { accum: None };
                }
            }
            _ => {}
        }
    }

    /// Per-step multiplier on the force scale (dark-energy expansion).
    pub fn force_gain(&self, extra: &mut Extra) -> f32 {
        match (self, extra) {
            (Field::DarkEnergy { acceleration, .. }, Extra::Expansion { factor }) => {
                *factor = (*factor * (1.0 + acceleration)).min(MAX_EXPANSION);
                *factor
            }
            _ => 1.0,
        }
    }

    /// Frame-level feedback applied after remapping (haunt's ghost trail).
    pub fn post_process(&self, extra: &mut Extra, frame: &mut Frame) {
        let (Field::Haunt { persistence, ghost_mix }, Extra::Haunt { accum }) = (self, extra) else {
            return;
        };
        let (p, g) = (*persistence, *ghost_mix);
        let bytes = frame.as_bytes_mut();
        if !accum.as_ref().is_some_and(|acc| acc.len() == bytes.len()) {
            *accum = Some(bytes.iter().map(|&b| b as f32).collect());
            return;
        }
        if let Some(acc) = accum {
            for (a, b) in acc.iter_mut().zip(bytes.iter_mut()) {
                *a = *a * p + *b as f32 * (1.0 - p);
                *b = (*b as f32 * (1.0 - g) + *a * g).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn fill<F>(grid: &Grid, fx: &mut Plane, fy: &mut Plane, f: F)
where
    F: Fn(usize, usize, f32, f32) -> (f32, f32),
{
    if fx.width() != grid.w || fx.height() != grid.h {
        *fx = Plane::zeros(grid.w, grid.h);
    }
    if fy.width() != grid.w || fy.height() != grid.h {
        *fy = Plane::zeros(grid.w, grid.h);
    }
    let w = grid.w;
    let xs = fx.as_mut_slice();
    let ys = fy.as_mut_slice();
    for py in 0..grid.h {
        let y = grid.ny(py);
        for px in 0..w {
            let (a, b) = f(px, py, grid.nx(px), y);
            xs[py * w + px] = a;
            ys[py * w + px] = b;
        }
    }
}

fn seeded(seed: u64, salt: u64) -> fastrand::Rng {
    fastrand::Rng::with_seed(seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn scatter(rng: &mut fastrand::Rng, grid: &Grid, margin: f32) -> (f32, f32) {
    let span = (1.0 - 2.0 * margin).max(0.0);
    grid.from_unit(margin + rng.f32() * span, margin + rng.f32() * span)
}

fn phases(seed: u64, salt: u64) -> [f32; 12] {
    let mut rng = seeded(seed, salt);
    let mut out = [0.0f32; 12];
    for p in out.iter_mut() {
        *p = rng.f32() * TAU;
    }
    out
}

/// Maps `v` in `[-1, 1]` to one of `n` buckets.
fn unit_bucket(v: f32, n: usize) -> usize {
    (((v + 1.0) * 0.5 * n as f32).floor().max(0.0) as usize).min(n - 1)
}

fn cell_index(x: f32, y: f32, extent: (f32, f32), cells: usize) -> usize {
    let bx = unit_bucket(x / extent.0, cells);
    let by = unit_bucket(y / extent.1, cells);
    by * cells + bx
}

/// Three octaves of sinusoidal noise, halving amplitude and doubling frequency per octave.
fn turbulence(x: f32, y: f32, t: f32, scale: f32, ph: &[f32; 12]) -> (f32, f32) {
    let mut fx = 0.0f32;
    let mut fy = 0.0f32;
    let mut amp = 1.0f32;
    let mut freq = scale;
    for o in 0..3 {
        let p = &ph[o * 4..o * 4 + 4];
        fx += amp * (y * freq + t + p[0]).sin() * (x * freq * 0.7 + p[1]).cos();
        fy += amp * (x * freq + t * 1.3 + p[2]).cos() * (y * freq * 0.8 + p[3]).sin();
        amp *= 0.5;
        freq *= 2.0;
    }
    (fx / 1.75, fy / 1.75)
}

struct Well {
    pos: (f32, f32),
    mass: f32,
}

fn scatter_wells(grid: &Grid, seed: u64, n: usize, t: f32) -> Vec<Well> {
    let mut rng = seeded(seed, SALT_WELLS);
    (0..n.max(1))
        .map(|_| {
            let (x, y) = scatter(&mut rng, grid, 0.15);
            let mass = 0.6 + 0.8 * rng.f32();
            let phase = rng.f32() * TAU;
            Well {
                pos: (x + 0.05 * (t * 0.4 + phase).cos(), y + 0.05 * (t * 0.3 + phase).sin()),
                mass,
            }
        })
        .collect()
}

/// Unit-peak pull toward `p`: `SOFTEN / (r² + SOFTEN)` with an exponential falloff.
fn point_pull(x: f32, y: f32, p: (f32, f32), radius: f32) -> (f32, f32) {
    let dx = p.0 - x;
    let dy = p.1 - y;
    let r2 = dx * dx + dy * dy;
    let r = r2.sqrt();
    let mag = SOFTEN / (r2 + SOFTEN) * (-r / radius.max(1e-3)).exp();
    let inv = 1.0 / (r + 1e-4);
    (dx * inv * mag, dy * inv * mag)
}

fn scatter_vortices(grid: &Grid, seed: u64, n: usize) -> Vec<(f32, f32, f32)> {
    let mut rng = seeded(seed, SALT_VORTEX);
    (0..n.max(1))
        .map(|_| {
            let (x, y) = scatter(&mut rng, grid, 0.2);
            let spin = if rng.bool() { 1.0 } else { -1.0 };
            (x, y, spin)
        })
        .collect()
}

fn vortex_force(x: f32, y: f32, cores: &[(f32, f32, f32)], radius: f32, pull: f32) -> (f32, f32) {
    let mut f = (0.0, 0.0);
    for &(cx, cy, spin) in cores {
        let dx = x - cx;
        let dy = y - cy;
        let r = (dx * dx + dy * dy).sqrt();
        let fall = (-r / radius.max(1e-3)).exp() * r / (r + 0.05);
        let inv = 1.0 / (r + 1e-4);
        f.0 += (-dy * inv * spin - dx * inv * pull) * fall;
        f.1 += (dx * inv * spin - dy * inv * pull) * fall;
    }
    f
}

fn blast(x: f32, y: f32, c: (f32, f32), angle: f32, fade: f32) -> (f32, f32) {
    let dx = x - c.0;
    let dy = y - c.1;
    let r = (dx * dx + dy * dy).sqrt();
    let inv = 1.0 / (r + 1e-4);
    let (s, co) = angle.sin_cos();
    let ux = dx * inv * co - dy * inv * s;
    let uy = dx * inv * s + dy * inv * co;
    let mag = fade * (-r * 1.2).exp() * r / (r + 0.03);
    (ux * mag, uy * mag)
}

fn black_hole(x: f32, y: f32, c: (f32, f32), horizon: f32, spin: f32) -> (f32, f32) {
    let dx = x - c.0;
    let dy = y - c.1;
    let r2 = dx * dx + dy * dy;
    let r = r2.sqrt();
    let inv = 1.0 / (r + 1e-4);
    let soft = horizon * horizon + 0.02;
    let fall = (-r / 0.9).exp();
    let pull = soft / (r2 + soft) * fall;
    let swirl = spin * horizon / (r + horizon) * fall;
    (
        -dx * inv * pull - dy * inv * swirl,
        -dy * inv * pull + dx * inv * swirl,
    )
}

fn wormhole_mouths(grid: &Grid, seed: u64) -> ((f32, f32), (f32, f32)) {
    let mut rng = seeded(seed, SALT_WORMHOLE);
    let (ex, ey) = grid.extent();
    let theta = rng.f32() * TAU;
    let dist = 0.35 + 0.25 * rng.f32();
    let entry = (theta.cos() * dist * ex, theta.sin() * dist * ey);
    let twist = theta + std::f32::consts::PI + (rng.f32() - 0.5) * 0.6;
    let exit = (twist.cos() * dist * ex, twist.sin() * dist * ey);
    (entry, exit)
}

fn wormhole(x: f32, y: f32, entry: (f32, f32), exit: (f32, f32), radius: f32, spin: f32) -> (f32, f32) {
    let radius = radius.max(1e-3);
    let ax = x - entry.0;
    let ay = y - entry.1;
    let ra = (ax * ax + ay * ay).sqrt();
    let inv_a = 1.0 / (ra + 1e-4);
    let fall_a = (-ra / radius).exp();
    let core = ra / (ra + 0.03);

    let bx = x - exit.0;
    let by = y - exit.1;
    let rb = (bx * bx + by * by).sqrt();
    let inv_b = 1.0 / (rb + 1e-4);
    let fall_b = (-rb / radius).exp() * 0.6;

    (
        -ax * inv_a * fall_a - ay * inv_a * spin * fall_a * core + bx * inv_b * fall_b,
        -ay * inv_a * fall_a + ax * inv_a * spin * fall_a * core + by * inv_b * fall_b,
    )
}

fn magnetic_poles(
    kind: MagneticKind,
    c: (f32, f32),
    theta: f32,
    spacing: f32,
    orient: f32,
) -> Vec<(f32, f32, f32)> {
    let count = match kind {
        MagneticKind::Quadrupole => 4,
        _ => 2,
    };
    let step = if count == 4 { FRAC_PI_2 } else { std::f32::consts::PI };
    (0..count)
        .map(|k| {
            let a = theta + step * k as f32;
            let charge = if k % 2 == 0 { orient } else { -orient };
            (c.0 + spacing * a.cos(), c.1 + spacing * a.sin(), charge)
        })
        .collect()
}

fn pole_field(x: f32, y: f32, poles: &[(f32, f32, f32)]) -> (f32, f32) {
    let mut f = (0.0, 0.0);
    for &(px, py, q) in poles {
        let dx = x - px;
        let dy = y - py;
        let d = dx * dx + dy * dy + POLE_SOFTEN;
        let mag = q * POLE_GAIN / (d * d.sqrt());
        f.0 += dx * mag;
        f.1 += dy * mag;
    }
    f
}

fn toroidal(x: f32, y: f32, c: (f32, f32), ring: f32, orient: f32) -> (f32, f32) {
    let dx = x - c.0;
    let dy = y - c.1;
    let r = (dx * dx + dy * dy).sqrt();
    let inv = 1.0 / (r + 1e-4);
    let off = (r - ring) / 0.25;
    let band = (-off * off).exp();
    let radial = -(r - ring) * 0.6 * band;
    (
        (-dy * orient + dx * radial) * inv * band.max(0.05),
        (dx * orient + dy * radial) * inv * band.max(0.05),
    )
}

#[allow(clippy::too_many_arguments)]
fn quantum(
    grid: &Grid,
    t: f32,
    seed: u64,
    tick: u64,
    barriers: usize,
    probability: f32,
    block: usize,
    fx: &mut Plane,
    fy: &mut Plane,
) {
    let mut rng = seeded(seed, SALT_QUANTUM);
    let (ex, ey) = grid.extent();
    let walls: Vec<(bool, f32)> = (0..barriers.max(1))
        .map(|_| {
            let vertical = rng.bool();
            let span = if vertical { ex } else { ey };
            (vertical, (rng.f32() * 1.6 - 0.8) * span)
        })
        .collect();
    let wave_phase = (rng.f32() * TAU, rng.f32() * TAU);

    // Tunneling events re-roll every step.
    let mut events = seeded(seed.wrapping_add(tick), SALT_TUNNEL);
    let block = block.max(1);
    let bw = grid.w.div_ceil(block);
    let bh = grid.h.div_ceil(block);
    let mask: Vec<bool> = (0..bw * bh * walls.len())
        .map(|_| events.f32() < probability)
        .collect();

    fill(grid, fx, fy, |px, py, x, y| {
        let mut f = (
            0.3 * (y * 5.0 + t * 2.0 + wave_phase.0).sin(),
            0.3 * (x * 5.0 - t * 1.7 + wave_phase.1).cos(),
        );
        for (i, &(vertical, pos)) in walls.iter().enumerate() {
            let s = if vertical { x - pos } else { y - pos };
            let near = (-s.abs() / 0.15).exp();
            if near < 1e-3 {
                continue;
            }
            let tunnels = mask[(i * bh + py / block) * bw + px / block];
            let push = if tunnels {
                -s.signum() * 1.2 * near
            } else {
                s.signum() * 0.35 * near
            };
            if vertical {
                f.0 += push;
            } else {
                f.1 += push;
            }
        }
        f
    });
}

/// Folds the half-plane beyond the axis back toward it; a weak crease pull on the near side.
fn fold(x: f32, y: f32, n: (f32, f32), offset: f32) -> (f32, f32) {
    let s = x * n.0 + y * n.1 - offset;
    if s > 0.0 {
        (-n.0 * s * 1.2, -n.1 * s * 1.2)
    } else {
        let crease = 0.25 * (s * 4.0).exp();
        (n.0 * crease, n.1 * crease)
    }
}

fn vortex_lattice(grid: &Grid, seed: u64, lattice: usize) -> Vec<(f32, f32, f32)> {
    let mut rng = seeded(seed, SALT_SUPERFLUID);
    let n = lattice.max(1);
    let flip = if rng.bool() { 1.0 } else { -1.0 };
    let cell = 1.0 / n as f32;
    let mut cores = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let ux = (i as f32 + 0.5 + (rng.f32() - 0.5) * 0.3) * cell;
            let uy = (j as f32 + 0.5 + (rng.f32() - 0.5) * 0.3) * cell;
            let (x, y) = grid.from_unit(ux, uy);
            let sign = if (i + j) % 2 == 0 { flip } else { -flip };
            cores.push((x, y, sign));
        }
    }
    cores
}

struct Bubble {
    pos: (f32, f32),
    reach: f32,
}

fn scatter_bubbles(grid: &Grid, seed: u64, n: usize, radius: f32, rise: f32, t: f32) -> Vec<Bubble> {
    let mut rng = seeded(seed, SALT_BUBBLES);
    let (_, ey) = grid.extent();
    (0..n.max(1))
        .map(|_| {
            let (bx, by) = scatter(&mut rng, grid, 0.1);
            let r = radius * (0.6 + 0.8 * rng.f32());
            let speed = rise * (0.5 + rng.f32());
            let phase = rng.f32() * TAU;
            let lo = -ey - r;
            let hi = ey + r;
            let y = lo + (by - speed * t - lo).rem_euclid(hi - lo);
            let x = bx + 0.04 * (t * 2.0 + phase).sin();
            Bubble {
                pos: (x, y),
                reach: r * 1.5,
            }
        })
        .collect()
}

fn bubble_push(x: f32, y: f32, b: &Bubble) -> (f32, f32) {
    let dx = x - b.pos.0;
    let dy = y - b.pos.1;
    let r = (dx * dx + dy * dy).sqrt();
    if r >= b.reach || b.reach <= 0.0 {
        return (0.0, 0.0);
    }
    let k = 1.0 - r / b.reach;
    let mag = 1.2 * k * k;
    let inv = 1.0 / (r + 1e-4);
    (dx * inv * mag, dy * inv * mag)
}

struct Drop {
    pos: (f32, f32),
    birth: f32,
    swirl: f32,
}

fn scatter_drops(grid: &Grid, seed: u64, n: usize) -> Vec<Drop> {
    let mut rng = seeded(seed, SALT_INK);
    (0..n.max(1))
        .map(|i| {
            let pos = scatter(&mut rng, grid, 0.15);
            let roll = rng.f32();
            // The first drop is already falling when the sequence starts.
            let birth = if i == 0 { -0.2 } else { roll * 3.0 - 1.0 };
            let swirl = if rng.bool() { 0.3 } else { -0.3 };
            Drop { pos, birth, swirl }
        })
        .collect()
}

fn ink_ring(x: f32, y: f32, d: &Drop, t: f32, spread: f32) -> (f32, f32) {
    let age = t - d.birth;
    if age < 0.0 {
        return (0.0, 0.0);
    }
    let front = 0.05 + spread * age;
    let dx = x - d.pos.0;
    let dy = y - d.pos.1;
    let r = (dx * dx + dy * dy).sqrt();
    let off = (r - front) / 0.2;
    let ring = (-off * off).exp() * (-age * 0.4).exp();
    let inv = 1.0 / (r + 1e-4);
    (
        (dx - dy * d.swirl) * inv * ring,
        (dy + dx * d.swirl) * inv * ring,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(fx: &Plane, fy: &Plane) -> f32 {
        fx.as_slice()
            .iter()
            .zip(fy.as_slice())
            .map(|(a, b)| a.abs() + b.abs())
            .sum()
    }

    #[test]
    fn turbulence_is_bounded() {
        let ph = phases(7, SALT_LIQUIFY);
        for i in 0..50 {
            let v = i as f32 * 0.13 - 3.0;
            let (a, b) = turbulence(v, -v, v, 2.5, &ph);
            assert!(a.abs() <= 1.0 + 1e-5 && b.abs() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn attraction_points_toward_the_well() {
        let (ax, ay) = point_pull(0.5, 0.0, (0.0, 0.0), 0.6);
        assert!(ax < 0.0);
        assert!(ay.abs() < 1e-6);
        assert_eq!(point_pull(0.0, 0.0, (0.0, 0.0), 0.6), (0.0, 0.0));
    }

    #[test]
    fn vortex_is_tangential_without_pull() {
        let (fx, fy) = vortex_force(0.3, 0.0, &[(0.0, 0.0, 1.0)], 0.8, 0.0);
        assert!(fx.abs() < 1e-6);
        assert!(fy > 0.0);
    }

    #[test]
    fn fold_reflects_only_the_far_side() {
        let (a, _) = fold(0.5, 0.0, (1.0, 0.0), 0.0);
        assert!(a < 0.0);
        let (b, _) = fold(-0.5, 0.0, (1.0, 0.0), 0.0);
        assert!(b > 0.0 && b < 0.25);
    }

    #[test]
    fn bucket_index_stays_in_range() {
        assert_eq!(unit_bucket(-1.0, 16), 0);
        assert_eq!(unit_bucket(1.0, 16), 15);
        assert_eq!(unit_bucket(-5.0, 16), 0);
        assert_eq!(unit_bucket(0.0, 48), 24);
    }

    #[test]
    fn every_field_is_finite_on_a_single_pixel() {
        let grid = Grid::new(1, 1);
        let fields = [
            Field::Liquify { wave_scale: 2.5, speed: 1.0 },
            Field::Gravity { wells: 3, radius: 0.6, sign: 1.0 },
            Field::Vortex { vortices: 2, radius: 0.8, pull: 0.2 },
            Field::Explode { center: (0.5, 0.5), decay: 1.5 },
            Field::Magnetic { kind: MagneticKind::Toroidal, spacing: 0.35 },
            Field::Quantum { barriers: 4, probability: 0.3, block: 8 },
            Field::Superfluid { lattice: 3 },
        ];
        for field in fields {
            let (fx, fy) = field.force_planes(&grid, 0.0, 1, 0);
            assert!(fx.get(0, 0).is_finite() && fy.get(0, 0).is_finite(), "{field:?}");
        }
    }

    #[test]
    fn quantum_events_change_with_tick() {
        let grid = Grid::new(48, 32);
        let field = Field::Quantum { barriers: 6, probability: 0.5, block: 4 };
        let a = field.force_planes(&grid, 0.0, 9, 0);
        let b = field.force_planes(&grid, 0.0, 9, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn dark_energy_gain_compounds_and_caps() {
        let field = Field::DarkEnergy { centers: 2, acceleration: 0.2 };
        let mut extra = Extra::None;
        field.prepare_extra(&mut extra);
        let first = field.force_gain(&mut extra);
        assert!((first - 1.2).abs() < 1e-6);
        for _ in 0..100 {
            field.force_gain(&mut extra);
        }
        assert!((field.force_gain(&mut extra) - MAX_EXPANSION).abs() < 1e-6);
    }

    #[test]
    fn seeded_fields_differ_across_seeds() {
        let grid = Grid::new(32, 24);
        let field = Field::Gravity { wells: 3, radius: 0.6, sign: 1.0 };
        let (a, ay) = field.force_planes(&grid, 0.0, 1, 0);
        let (b, _) = field.force_planes(&grid, 0.0, 42, 0);
        assert_ne!(a, b);
        assert!(energy(&a, &ay) > 0.0);
    }
}
