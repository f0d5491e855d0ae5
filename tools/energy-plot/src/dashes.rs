//! Dash patterns for chart lines.

/// Line style of a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashStyle {
    Solid,
    Dotted,
    Dashed,
    DashDot,
}

/// Styles given to successive series. The cycle goes on across figures.
pub const DASH_CYCLE: [DashStyle; 4] = [DashStyle::Dotted, DashStyle::Solid, DashStyle::DashDot, DashStyle::Dashed];

impl DashStyle {
    /// Alternating lengths in pixels of drawn and skipped parts, empty for a solid line.
    pub fn pattern(&self) -> &'static [f64] {
        match self {
            DashStyle::Solid => &[],
            DashStyle::Dotted => &[1.5, 2.5],
            DashStyle::Dashed => &[6., 3.],
            DashStyle::DashDot => &[6., 2.5, 1.5, 2.5],
        }
    }
}

/// Splits a polyline into the visible pieces of the dash pattern.
///
/// The pattern continues across the vertices of the polyline.
pub fn dash_segments(points: &[(f64, f64)], pattern: &[f64]) -> Vec<Vec<(f64, f64)>> {
    if points.len() < 2 {
        return Vec::new();
    }
    if pattern.is_empty() || pattern.iter().any(|len| *len <= 0.) {
        return vec![points.to_vec()];
    }

    let mut segments = Vec::new();
    let mut current = vec![points[0]];
    let mut phase = 0;
    let mut left = pattern[0];
    for pair in points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let length = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
        let mut pos = 0.;
        while length - pos > left {
            pos += left;
            let t = pos / length;
            let point = (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
            if phase % 2 == 0 {
                current.push(point);
                segments.push(std::mem::take(&mut current));
            } else {
                current.push(point);
            }
            phase = (phase + 1) % pattern.len();
            left = pattern[phase];
        }
        left -= length - pos;
        if phase % 2 == 0 {
            current.push(to);
        }
    }
    if current.len() > 1 {
        segments.push(current);
    }
    segments
}
