use std::collections::VecDeque;

/// Dense row-major H×W matrix of `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    w: usize,
    h: usize,
    data: Vec<f32>,
}

impl Plane {
    pub fn zeros(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.w + x]
    }

    pub fn fill(&mut self, v: f32) {
        self.data.fill(v);
    }

    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0f32, |m, v| m.max(v.abs()))
    }
}

/// Variant-specific auxiliary state carried next to the displacement fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Extra {
    None,
    Echo {
        ring: VecDeque<(Plane, Plane)>,
        capacity: usize,
    },
    Expansion {
        factor: f32,
    },
    Haunt {
        accum: Option<Vec<f32>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub dx: Plane,
    pub dy: Plane,
    pub vx: Plane,
    pub vy: Plane,
    pub extra: Extra,
    steps: u64,
}

impl SimulationState {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            dx: Plane::zeros(w, h),
            dy: Plane::zeros(w, h),
            vx: Plane::zeros(w, h),
            vy: Plane::zeros(w, h),
            extra: Extra::None,
            steps: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.dx.width()
    }

    pub fn height(&self) -> usize {
        self.dx.height()
    }

    pub fn matches(&self, w: usize, h: usize) -> bool {
        self.width() == w && self.height() == h
    }

    /// Integration steps applied since the state was created.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub(crate) fn mark_step(&mut self) {
        self.steps = self.steps.saturating_add(1);
    }

    pub fn max_displacement(&self) -> f32 {
        self.dx.max_abs().max(self.dy.max_abs())
    }

    /// Bytes held by the four displacement/velocity planes.
    pub fn field_bytes(&self) -> usize {
        4 * self.width() * self.height() * std::mem::size_of::<f32>()
    }

    /// Pushes the current displacement into the echo ring (no-op without one).
    pub fn push_echo(&mut self) {
        if let Extra::Echo { ring, capacity } = &mut self.extra {
            while ring.len() >= (*capacity).max(1) {
                ring.pop_front();
            }
            ring.push_back((self.dx.clone(), self.dy.clone()));
        }
    }

    /// Mean of the recorded echoes, or `None` when the state keeps no echo ring.
    pub fn echo_mean(&self) -> Option<(Plane, Plane)> {
        let Extra::Echo { ring, .. } = &self.extra else {
            return None;
        };
        if ring.is_empty() {
            return None;
        }
        let (w, h) = (self.width(), self.height());
        let mut mx = Plane::zeros(w, h);
        let mut my = Plane::zeros(w, h);
        let inv = 1.0 / ring.len() as f32;
        for (ex, ey) in ring.iter().filter(|(ex, _)| ex.width() == w && ex.height() == h) {
            for (m, v) in mx.as_mut_slice().iter_mut().zip(ex.as_slice()) {
                *m += v * inv;
            }
            for (m, v) in my.as_mut_slice().iter_mut().zip(ey.as_slice()) {
                *m += v * inv;
            }
        }
        Some((mx, my))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_ring_is_bounded_and_averaged() {
        let mut s = SimulationState::new(1, 1);
        s.extra = Extra::Echo {
            ring: VecDeque::new(),
            capacity: 2,
        };
        for v in [3.0, 1.0, 5.0] {
            s.dx.fill(v);
            s.push_echo();
        }
        let Extra::Echo { ring, .. } = &s.extra else {
            panic!("echo ring missing");
        };
        assert_eq!(ring.len(), 2);
        let (mx, my) = s.echo_mean().expect("mean");
        assert!((mx.get(0, 0) - 3.0).abs() < 1e-6);
        assert_eq!(my.get(0, 0), 0.0);
    }

    #[test]
    fn plain_state_has_no_echo() {
        let mut s = SimulationState::new(2, 2);
        s.push_echo();
        assert!(s.echo_mean().is_none());
        assert_eq!(s.extra, Extra::None);
    }
}
