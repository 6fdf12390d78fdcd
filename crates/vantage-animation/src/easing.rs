//! Easing curves for reveal transitions.

/// Timing curve applied to a transition's linear progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// CSS `ease-out`: fast start, gentle landing.
    #[default]
    EaseOut,
    /// CSS `ease-in-out`: gentle at both ends.
    EaseInOut,
}

impl Easing {
    /// Maps linear progress `t` through the curve. Input outside `[0, 1]`
    /// clamps; output is always in `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t.clamp(0.0, 1.0),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
        }
    }
}

/// Evaluates the CSS-style cubic bézier with control points `(x1, y1)` and
/// `(x2, y2)` at horizontal position `t`.
///
/// Newton-Raphson on the x polynomial, falling back to bisection when the
/// slope collapses.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let sample_x = |u: f32| ((ax * u + bx) * u + cx) * u;
    let sample_y = |u: f32| ((ay * u + by) * u + cy) * u;
    let sample_dx = |u: f32| (3.0 * ax * u + 2.0 * bx) * u + cx;

    let mut u = t;
    for _ in 0..8 {
        let x_error = sample_x(u) - t;
        if x_error.abs() < 1e-5 {
            return sample_y(u).clamp(0.0, 1.0);
        }
        let dx = sample_dx(u);
        if dx.abs() < 1e-6 {
            break;
        }
        u -= x_error / dx;
    }

    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    u = t;
    for _ in 0..24 {
        let x = sample_x(u);
        if (x - t).abs() < 1e-5 {
            break;
        }
        if x < t {
            lo = u;
        } else {
            hi = u;
        }
        u = (lo + hi) * 0.5;
    }
    sample_y(u).clamp(0.0, 1.0)
}
