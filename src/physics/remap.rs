use super::state::Plane;
use crate::frame::{Boundary, Frame};

/// Samples `frame` at `(x + dx, y + dy)` for every output pixel with bilinear
/// interpolation. A displacement field whose shape does not match the frame is
/// treated as zero.
pub fn remap(frame: &Frame, dx: &Plane, dy: &Plane, boundary: Boundary) -> Frame {
    let w = frame.width();
    let h = frame.height();
    let src = frame.as_bytes();
    let field_ok = dx.width() == w && dx.height() == h && dy.width() == w && dy.height() == h;

    let mut out = Frame::new(w, h);
    let dst = out.as_bytes_mut();
    for y in 0..h {
        for x in 0..w {
            let (ox, oy) = if field_ok {
                (finite_or_zero(dx.get(x, y)), finite_or_zero(dy.get(x, y)))
            } else {
                (0.0, 0.0)
            };
            let rgb = sample_bilinear(src, w, h, x as f32 + ox, y as f32 + oy, boundary);
            let i = (y * w + x) * 3;
            dst[i..i + 3].copy_from_slice(&rgb);
        }
    }
    out
}

pub(crate) fn sample_bilinear(
    src: &[u8],
    w: usize,
    h: usize,
    sx: f32,
    sy: f32,
    boundary: Boundary,
) -> [u8; 3] {
    let x0f = sx.floor();
    let y0f = sy.floor();
    let fx = sx - x0f;
    let fy = sy - y0f;
    let x0 = x0f as isize;
    let y0 = y0f as isize;

    let mut acc = [0.0f32; 3];
    for (ix, iy, weight) in [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ] {
        if weight <= 0.0 {
            continue;
        }
        // Black border: out-of-range taps contribute nothing.
        let (Some(px), Some(py)) = (resolve(ix, w, boundary), resolve(iy, h, boundary)) else {
            continue;
        };
        let i = (py * w + px) * 3;
        acc[0] += src[i] as f32 * weight;
        acc[1] += src[i + 1] as f32 * weight;
        acc[2] += src[i + 2] as f32 * weight;
    }

    [to_u8(acc[0]), to_u8(acc[1]), to_u8(acc[2])]
}

/// Resolves an integer sample index into `0..n` under `boundary`, or `None`
/// for a black-border miss.
pub(crate) fn resolve(i: isize, n: usize, boundary: Boundary) -> Option<usize> {
    let n = n.max(1) as isize;
    match boundary {
        Boundary::Clamp => Some(i.clamp(0, n - 1) as usize),
        Boundary::Black => (0..n).contains(&i).then_some(i as usize),
        Boundary::Wrap => Some(i.rem_euclid(n) as usize),
        Boundary::Mirror => {
            let period = 2 * n;
            let m = i.rem_euclid(period);
            Some(if m >= n { period - 1 - m } else { m } as usize)
        }
    }
}

#[inline]
fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_handles_each_policy() {
        assert_eq!(resolve(-3, 5, Boundary::Clamp), Some(0));
        assert_eq!(resolve(9, 5, Boundary::Clamp), Some(4));
        assert_eq!(resolve(-1, 5, Boundary::Black), None);
        assert_eq!(resolve(5, 5, Boundary::Black), None);
        assert_eq!(resolve(4, 5, Boundary::Black), Some(4));
        assert_eq!(resolve(-1, 5, Boundary::Wrap), Some(4));
        assert_eq!(resolve(12, 5, Boundary::Wrap), Some(2));
        assert_eq!(resolve(-1, 5, Boundary::Mirror), Some(0));
        assert_eq!(resolve(-5, 5, Boundary::Mirror), Some(4));
        assert_eq!(resolve(5, 5, Boundary::Mirror), Some(4));
        assert_eq!(resolve(7, 5, Boundary::Mirror), Some(2));
    }

    #[test]
    fn half_pixel_offset_blends_neighbours() {
        let src = [0u8, 0, 0, 200, 100, 50];
        let rgb = sample_bilinear(&src, 2, 1, 0.5, 0.0, Boundary::Clamp);
        assert_eq!(rgb, [100, 50, 25]);
    }

    #[test]
    fn mismatched_field_is_identity() {
        let mut frame = Frame::new(3, 2);
        frame.set_pixel(1, 1, [9, 8, 7]);
        let mut dx = Plane::zeros(2, 2);
        dx.fill(1.0);
        let out = remap(&frame, &dx, &Plane::zeros(2, 2), Boundary::Wrap);
        assert_eq!(out, frame);
    }
}
