use super::fields::{Field, MagneticKind};
use super::params::{ParamSet, ParamSpec, ParamValue, ResolvedParams, choice, flag, integer, number};
use crate::error::PhysicsError;

/// Fixed per-variant integration constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dynamics {
    /// Converts normalised force to pixels per step (before `strength` and frame size).
    pub gain: f32,
    /// Displacement bound as a fraction of the longer frame side.
    pub max_disp_frac: f32,
    /// Force multiplier on the first step of a fresh state when `impulse_at_start` is set.
    pub impulse: f32,
}

impl Dynamics {
    const fn new(gain: f32, max_disp_frac: f32) -> Self {
        Self {
            gain,
            max_disp_frac,
            impulse: 1.0,
        }
    }

    const fn with_impulse(self, impulse: f32) -> Self {
        Self { impulse, ..self }
    }
}

pub struct VariantSpec {
    pub name: &'static str,
    pub group: &'static str,
    pub params: &'static [ParamSpec],
    pub dynamics: Dynamics,
    build: fn(&ResolvedParams) -> Field,
}

impl VariantSpec {
    pub fn build(&self, params: &ResolvedParams) -> Field {
        (self.build)(params)
    }

    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_names(&self) -> Vec<&'static str> {
        self.params.iter().map(|p| p.name).collect()
    }
}

impl std::fmt::Debug for VariantSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantSpec")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("params", &self.param_names())
            .finish()
    }
}

const fn strength(default: f32) -> ParamSpec {
    number("strength", default, 1.0, 30.0)
}

const fn damping(default: f32) -> ParamSpec {
    number("damping", default, 0.8, 0.99)
}

const LIQUIFY: &[ParamSpec] = &[
    strength(6.0),
    number("wave_scale", 2.5, 0.5, 8.0),
    number("speed", 1.0, 0.1, 5.0),
    damping(0.9),
];
const GRAVITY: &[ParamSpec] = &[
    strength(8.0),
    integer("attractors", 3.0, 1.0, 10.0),
    number("radius", 0.6, 0.1, 2.0),
    damping(0.95),
];
const VORTEX: &[ParamSpec] = &[
    strength(6.0),
    integer("vortices", 2.0, 1.0, 6.0),
    number("radius", 0.8, 0.1, 2.0),
    number("pull", 0.2, -1.0, 1.0),
    damping(0.92),
];
const EXPLODE: &[ParamSpec] = &[
    strength(10.0),
    number("center_x", 0.5, 0.0, 1.0),
    number("center_y", 0.5, 0.0, 1.0),
    number("decay", 1.5, 0.0, 10.0),
    flag("impulse_at_start", true),
    damping(0.88),
];
const ELASTIC: &[ParamSpec] = &[
    strength(6.0),
    number("stiffness", 3.0, 0.5, 12.0),
    number("wave_scale", 3.0, 0.5, 8.0),
    damping(0.85),
];
const MELT: &[ParamSpec] = &[
    strength(5.0),
    number("heat", 0.6, 0.0, 1.0),
    number("viscosity", 0.5, 0.0, 1.0),
    damping(0.9),
];
const ANTIGRAVITY: &[ParamSpec] = &[
    strength(8.0),
    integer("repulsors", 3.0, 1.0, 10.0),
    number("radius", 0.6, 0.1, 2.0),
    damping(0.93),
];
const BLACKHOLE: &[ParamSpec] = &[
    strength(12.0),
    number("horizon", 0.12, 0.02, 0.4),
    number("spin", 0.8, -2.0, 2.0),
    damping(0.95),
];
const WORMHOLE: &[ParamSpec] = &[
    strength(8.0),
    number("radius", 0.35, 0.05, 1.0),
    number("spin", 1.0, -3.0, 3.0),
    damping(0.92),
];
const DARK_ENERGY: &[ParamSpec] = &[
    strength(4.0),
    integer("centers", 3.0, 1.0, 6.0),
    number("acceleration", 0.02, 0.0, 0.2),
    damping(0.97),
];
const MAGNETIC: &[ParamSpec] = &[
    strength(7.0),
    choice("field_type", "dipole", MagneticKind::NAMES),
    number("pole_spacing", 0.35, 0.05, 0.9),
    flag("impulse_at_start", true),
    damping(0.9),
];
const QUANTUM: &[ParamSpec] = &[
    strength(6.0),
    integer("barriers", 4.0, 1.0, 10.0),
    number("tunnel_probability", 0.3, 0.0, 1.0),
    integer("block", 8.0, 2.0, 64.0),
    damping(0.86),
];
const DIMENSION_FOLD: &[ParamSpec] = &[
    strength(6.0),
    integer("folds", 2.0, 1.0, 6.0),
    number("fold_speed", 0.5, 0.0, 4.0),
    damping(0.9),
];
const SUPERFLUID: &[ParamSpec] = &[
    strength(4.0),
    integer("lattice", 3.0, 1.0, 8.0),
    number("damping", 0.99, 0.9, 0.999),
];
const TIMEWARP: &[ParamSpec] = &[
    strength(5.0),
    integer("echoes", 4.0, 2.0, 8.0),
    number("wave_scale", 2.0, 0.5, 8.0),
    damping(0.9),
];
const BUBBLES: &[ParamSpec] = &[
    strength(5.0),
    integer("bubbles", 6.0, 1.0, 20.0),
    number("radius", 0.2, 0.05, 0.5),
    number("rise", 0.3, 0.0, 2.0),
    damping(0.9),
];
const INKDROP: &[ParamSpec] = &[
    strength(6.0),
    integer("drops", 4.0, 1.0, 12.0),
    number("spread", 0.6, 0.05, 3.0),
    damping(0.9),
];
const HAUNT: &[ParamSpec] = &[
    strength(4.0),
    number("persistence", 0.85, 0.5, 0.98),
    number("ghost_mix", 0.4, 0.0, 0.9),
    damping(0.93),
];

fn build_liquify(p: &ResolvedParams) -> Field {
    Field::Liquify {
        wave_scale: p.num("wave_scale"),
        speed: p.num("speed"),
    }
}

fn build_gravity(p: &ResolvedParams) -> Field {
    Field::Gravity {
        wells: p.count("attractors"),
        radius: p.num("radius"),
        sign: 1.0,
    }
}

fn build_vortex(p: &ResolvedParams) -> Field {
    Field::Vortex {
        vortices: p.count("vortices"),
        radius: p.num("radius"),
        pull: p.num("pull"),
    }
}

fn build_explode(p: &ResolvedParams) -> Field {
    Field::Explode {
        center: (p.num("center_x"), p.num("center_y")),
        decay: p.num("decay"),
    }
}

fn build_elastic(p: &ResolvedParams) -> Field {
    Field::Elastic {
        stiffness: p.num("stiffness"),
        wave_scale: p.num("wave_scale"),
    }
}

fn build_melt(p: &ResolvedParams) -> Field {
    Field::Melt {
        heat: p.num("heat"),
        viscosity: p.num("viscosity"),
    }
}

fn build_antigravity(p: &ResolvedParams) -> Field {
    Field::Gravity {
        wells: p.count("repulsors"),
        radius: p.num("radius"),
        sign: -1.0,
    }
}

fn build_blackhole(p: &ResolvedParams) -> Field {
    Field::BlackHole {
        horizon: p.num("horizon"),
        spin: p.num("spin"),
    }
}

fn build_wormhole(p: &ResolvedParams) -> Field {
    Field::Wormhole {
        radius: p.num("radius"),
        spin: p.num("spin"),
    }
}

fn build_dark_energy(p: &ResolvedParams) -> Field {
    Field::DarkEnergy {
        centers: p.count("centers"),
        acceleration: p.num("acceleration"),
    }
}

fn build_magnetic(p: &ResolvedParams) -> Field {
    Field::Magnetic {
        kind: MagneticKind::parse(p.text("field_type")).unwrap_or(MagneticKind::Dipole),
        spacing: p.num("pole_spacing"),
    }
}

fn build_quantum(p: &ResolvedParams) -> Field {
    Field::Quantum {
        barriers: p.count("barriers"),
        probability: p.num("tunnel_probability"),
        block: p.count("block"),
    }
}

fn build_dimension_fold(p: &ResolvedParams) -> Field {
    Field::DimensionFold {
        folds: p.count("folds"),
        speed: p.num("fold_speed"),
    }
}

fn build_superfluid(p: &ResolvedParams) -> Field {
    Field::Superfluid {
        lattice: p.count("lattice"),
    }
}

fn build_timewarp(p: &ResolvedParams) -> Field {
    Field::Timewarp {
        echoes: p.count("echoes"),
        wave_scale: p.num("wave_scale"),
    }
}

fn build_bubbles(p: &ResolvedParams) -> Field {
    Field::Bubbles {
        count: p.count("bubbles"),
        radius: p.num("radius"),
        rise: p.num("rise"),
    }
}

fn build_inkdrop(p: &ResolvedParams) -> Field {
    Field::InkDrop {
        drops: p.count("drops"),
        spread: p.num("spread"),
    }
}

fn build_haunt(p: &ResolvedParams) -> Field {
    Field::Haunt {
        persistence: p.num("persistence"),
        ghost_mix: p.num("ghost_mix"),
    }
}

static VARIANTS: &[VariantSpec] = &[
    VariantSpec {
        name: "liquify",
        group: "dynamics",
        params: LIQUIFY,
        dynamics: Dynamics::new(0.0009, 0.3),
        build: build_liquify,
    },
    VariantSpec {
        name: "gravity",
        group: "dynamics",
        params: GRAVITY,
        dynamics: Dynamics::new(0.0006, 0.4),
        build: build_gravity,
    },
    VariantSpec {
        name: "vortex",
        group: "dynamics",
        params: VORTEX,
        dynamics: Dynamics::new(0.0007, 0.4),
        build: build_vortex,
    },
    VariantSpec {
        name: "explode",
        group: "dynamics",
        params: EXPLODE,
        dynamics: Dynamics::new(0.0008, 0.5).with_impulse(6.0),
        build: build_explode,
    },
    VariantSpec {
        name: "elastic",
        group: "dynamics",
        params: ELASTIC,
        dynamics: Dynamics::new(0.0009, 0.3),
        build: build_elastic,
    },
    VariantSpec {
        name: "melt",
        group: "dynamics",
        params: MELT,
        dynamics: Dynamics::new(0.0008, 0.5),
        build: build_melt,
    },
    VariantSpec {
        name: "antigravity",
        group: "cosmos",
        params: ANTIGRAVITY,
        dynamics: Dynamics::new(0.0006, 0.4),
        build: build_antigravity,
    },
    VariantSpec {
        name: "blackhole",
        group: "cosmos",
        params: BLACKHOLE,
        dynamics: Dynamics::new(0.0005, 0.6),
        build: build_blackhole,
    },
    VariantSpec {
        name: "wormhole",
        group: "cosmos",
        params: WORMHOLE,
        dynamics: Dynamics::new(0.0006, 0.5),
        build: build_wormhole,
    },
    VariantSpec {
        name: "dark_energy",
        group: "cosmos",
        params: DARK_ENERGY,
        dynamics: Dynamics::new(0.0004, 0.5),
        build: build_dark_energy,
    },
    VariantSpec {
        name: "magnetic",
        group: "cosmos",
        params: MAGNETIC,
        dynamics: Dynamics::new(0.0006, 0.4).with_impulse(4.0),
        build: build_magnetic,
    },
    VariantSpec {
        name: "quantum",
        group: "impossible",
        params: QUANTUM,
        dynamics: Dynamics::new(0.0008, 0.35),
        build: build_quantum,
    },
    VariantSpec {
        name: "dimension_fold",
        group: "impossible",
        params: DIMENSION_FOLD,
        dynamics: Dynamics::new(0.0008, 0.45),
        build: build_dimension_fold,
    },
    VariantSpec {
        name: "superfluid",
        group: "impossible",
        params: SUPERFLUID,
        dynamics: Dynamics::new(0.0005, 0.35),
        build: build_superfluid,
    },
    VariantSpec {
        name: "timewarp",
        group: "impossible",
        params: TIMEWARP,
        dynamics: Dynamics::new(0.0008, 0.3),
        build: build_timewarp,
    },
    VariantSpec {
        name: "bubbles",
        group: "organic",
        params: BUBBLES,
        dynamics: Dynamics::new(0.0009, 0.3),
        build: build_bubbles,
    },
    VariantSpec {
        name: "inkdrop",
        group: "organic",
        params: INKDROP,
        dynamics: Dynamics::new(0.0009, 0.35),
        build: build_inkdrop,
    },
    VariantSpec {
        name: "haunt",
        group: "organic",
        params: HAUNT,
        dynamics: Dynamics::new(0.0007, 0.3),
        build: build_haunt,
    },
];

/// A façade exposing several variants under one name, selected by `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub name: &'static str,
    pub modes: &'static [&'static str],
}

static GROUPS: &[Group] = &[
    Group {
        name: "dynamics",
        modes: &["liquify", "gravity", "vortex", "explode", "elastic", "melt"],
    },
    Group {
        name: "cosmos",
        modes: &["antigravity", "blackhole", "wormhole", "dark_energy", "magnetic"],
    },
    Group {
        name: "impossible",
        modes: &["quantum", "dimension_fold", "superfluid", "timewarp"],
    },
    Group {
        name: "organic",
        modes: &["bubbles", "inkdrop", "haunt"],
    },
];

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

pub fn variant_names() -> Vec<&'static str> {
    VARIANTS.iter().map(|v| v.name).collect()
}

pub fn group_names() -> Vec<&'static str> {
    GROUPS.iter().map(|g| g.name).collect()
}

pub fn variants() -> &'static [VariantSpec] {
    VARIANTS
}

/// Case-insensitive variant lookup; `-` and `_` are interchangeable.
pub fn lookup(name: &str) -> Result<&'static VariantSpec, PhysicsError> {
    let needle = normalize(name);
    VARIANTS
        .iter()
        .find(|v| v.name == needle)
        .ok_or_else(|| PhysicsError::UnknownVariant {
            name: name.to_string(),
            valid: variant_names(),
        })
}

pub fn group(name: &str) -> Result<&'static Group, PhysicsError> {
    let needle = normalize(name);
    GROUPS
        .iter()
        .find(|g| g.name == needle)
        .ok_or_else(|| PhysicsError::UnknownGroup {
            name: name.to_string(),
            valid: group_names(),
        })
}

pub fn variant_spec(name: &str) -> Option<&'static VariantSpec> {
    lookup(name).ok()
}

pub fn group_modes(name: &str) -> Option<&'static [&'static str]> {
    group(name).ok().map(|g| g.modes)
}

impl Group {
    /// Picks the variant named by `params["mode"]`, defaulting to the first mode.
    pub fn select(&self, params: &ParamSet) -> Result<&'static VariantSpec, PhysicsError> {
        let mode = match params.get("mode") {
            Some(ParamValue::Text(m)) => normalize(m),
            _ => self.modes[0].to_string(),
        };
        if !self.modes.contains(&mode.as_str()) {
            return Err(PhysicsError::UnknownVariant {
                name: mode,
                valid: self.modes.to_vec(),
            });
        }
        lookup(&mode)
    }
}
