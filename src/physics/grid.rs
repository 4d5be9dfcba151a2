/// Per-call coordinate axes. Normalised coordinates are isotropic: the longer
/// frame side spans `[-1, 1]` and the centre of the frame is the origin.
#[derive(Debug, Clone)]
pub struct Grid {
    pub w: usize,
    pub h: usize,
    pub scale: f32,
    xs: Vec<f32>,
    ys: Vec<f32>,
}

impl Grid {
    pub fn new(w: usize, h: usize) -> Self {
        let w = w.max(1);
        let h = h.max(1);
        let scale = w.max(h) as f32;
        let half = scale * 0.5;
        let xs = (0..w)
            .map(|x| (x as f32 + 0.5 - w as f32 * 0.5) / half)
            .collect();
        let ys = (0..h)
            .map(|y| (y as f32 + 0.5 - h as f32 * 0.5) / half)
            .collect();
        Self { w, h, scale, xs, ys }
    }

    #[inline]
    pub fn nx(&self, x: usize) -> f32 {
        self.xs[x]
    }

    #[inline]
    pub fn ny(&self, y: usize) -> f32 {
        self.ys[y]
    }

    pub fn len(&self) -> usize {
        self.w * self.h
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalised half-extents of the frame (the longer side is 1.0).
    pub fn extent(&self) -> (f32, f32) {
        (self.w as f32 / self.scale, self.h as f32 / self.scale)
    }

    /// Maps a `[0, 1]` frame-relative position to normalised coordinates.
    pub fn from_unit(&self, ux: f32, uy: f32) -> (f32, f32) {
        let (ex, ey) = self.extent();
        ((ux * 2.0 - 1.0) * ex, (uy * 2.0 - 1.0) * ey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_are_centred_and_isotropic() {
        let g = Grid::new(4, 2);
        assert!((g.nx(0) + g.nx(3)).abs() < 1e-6);
        assert!((g.ny(0) + g.ny(1)).abs() < 1e-6);
        assert!(((g.nx(1) - g.nx(0)) - (g.ny(1) - g.ny(0))).abs() < 1e-6);
        assert!(g.nx(3) < 1.0);
    }

    #[test]
    fn single_pixel_grid_sits_at_origin() {
        let g = Grid::new(1, 1);
        assert_eq!(g.nx(0), 0.0);
        assert_eq!(g.ny(0), 0.0);
        assert_eq!(g.scale, 1.0);
    }
}
