use std::ops::RangeInclusive;

use crate::data::model::AxisRange;

// ---------------------------------------------------------------------------
// Backend-independent figure description
// ---------------------------------------------------------------------------

/// Where the legend box sits inside a subplot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendCorner {
    LowerLeft,
    UpperLeft,
    UpperRight,
}

/// One labelled trace, x in MHz.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: String,
    pub points: Vec<[f64; 2]>,
}

impl Curve {
    pub fn new(label: &str, x: &[f64], y: &[f64]) -> Self {
        Curve {
            label: label.to_string(),
            points: x.iter().zip(y).map(|(&x, &y)| [x, y]).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subplot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// `None` leaves the axis auto-scaled.
    pub x_limit: Option<AxisRange>,
    pub y_limit: Option<AxisRange>,
    pub grid: bool,
    pub legend: LegendCorner,
    pub curves: Vec<Curve>,
    /// Shaded `(lo, hi)` frequency intervals.
    pub bands: Vec<(f64, f64)>,
}

impl Subplot {
    /// Fixed x view from the x-limit, low end first.
    pub fn x_bounds(&self) -> Option<RangeInclusive<f64>> {
        self.x_limit.map(ordered)
    }

    /// Fixed y view from the y-limit, low end first.
    pub fn y_bounds(&self) -> Option<RangeInclusive<f64>> {
        self.y_limit.map(ordered)
    }

    /// Vertical extent for band shading: the y-limit if set, else the data range.
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        if let Some(r) = self.y_limit {
            return Some((r.lo.min(r.hi), r.lo.max(r.hi)));
        }
        let (lo, hi) = self
            .curves
            .iter()
            .flat_map(|c| c.points.iter())
            .map(|p| p[1])
            .filter(|y| y.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            });
        (lo <= hi).then_some((lo, hi))
    }
}

fn ordered(r: AxisRange) -> RangeInclusive<f64> {
    r.lo.min(r.hi)..=r.lo.max(r.hi)
}

/// A window worth of subplots laid out side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Sheet the figure was built from.
    pub sheet: String,
    /// Chart name, e.g. "S11" or "VSWR".
    pub name: String,
    pub subplots: Vec<Subplot>,
}
