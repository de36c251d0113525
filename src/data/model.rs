use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::cell::CellValue;

// ---------------------------------------------------------------------------
// DataFileRef – one measurement file listed under "Raw data"
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataFileRef {
    /// Directory cell joined with the filename cell.
    pub path: PathBuf,
    /// Legend label for the curve.
    pub label: String,
}

// ---------------------------------------------------------------------------
// PlotSetting – per (plot, subplot) key/value directives
// ---------------------------------------------------------------------------

/// Closed numeric interval `[lo, hi]` used for axis limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub lo: f64,
    pub hi: f64,
}

impl AxisRange {
    /// Accepts exactly two values.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            &[lo, hi] => Some(AxisRange { lo, hi }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Any key without "limit" in its name keeps the cell verbatim.
    Cell(CellValue),
    Range(AxisRange),
}

/// Settings for one subplot of one plot, e.g. `title`, `x-limit`, `y-label`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PlotSetting {
    entries: BTreeMap<String, SettingValue>,
}

impl PlotSetting {
    pub fn insert(&mut self, key: &str, value: SettingValue) {
        self.entries.insert(key.to_string(), value);
    }

    /// Text rendering of a verbatim value; ranges and missing keys give `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.entries.get(key)? {
            SettingValue::Cell(cell) if !cell.is_empty() => Some(cell.to_string()),
            _ => None,
        }
    }

    pub fn range(&self, key: &str) -> Option<AxisRange> {
        match self.entries.get(key)? {
            SettingValue::Range(r) => Some(*r),
            SettingValue::Cell(_) => None,
        }
    }
}

/// Outer index: plot (one per "Plot" header column). Inner: subplot.
pub type PlotSettingMatrix = Vec<Vec<PlotSetting>>;

// ---------------------------------------------------------------------------
// BandMark – shaded frequency intervals
// ---------------------------------------------------------------------------

/// Flat list of band edges; consecutive pairs are `(lo, hi)` intervals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BandMark(pub Vec<f64>);

impl BandMark {
    /// Pairs up the edges. An unpaired trailing value is dropped.
    pub fn intervals(&self) -> Vec<(f64, f64)> {
        self.0
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SheetLayout – everything the scanner extracts from one sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLayout {
    pub files: Vec<DataFileRef>,
    pub settings: PlotSettingMatrix,
    pub bandmark: BandMark,
}

impl SheetLayout {
    pub fn num_plot(&self) -> usize {
        self.settings.len()
    }

    pub fn num_subplot(&self) -> usize {
        self.settings.first().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_pairs() {
        let bands = BandMark(vec![100.0, 200.0, 400.0, 500.0]);
        assert_eq!(bands.intervals(), vec![(100.0, 200.0), (400.0, 500.0)]);
    }

    #[test]
    fn odd_band_edge_is_dropped() {
        let bands = BandMark(vec![100.0, 200.0, 400.0]);
        assert_eq!(bands.intervals(), vec![(100.0, 200.0)]);
        assert!(BandMark::default().intervals().is_empty());
    }

    #[test]
    fn setting_accessors() {
        let mut setting = PlotSetting::default();
        setting.insert("title", SettingValue::Cell("Return loss".into()));
        setting.insert("x-limit", SettingValue::Range(AxisRange { lo: 1.0, hi: 2.0 }));
        setting.insert("y-label", SettingValue::Cell(CellValue::Empty));

        assert_eq!(setting.text("title").as_deref(), Some("Return loss"));
        assert_eq!(setting.range("x-limit"), Some(AxisRange { lo: 1.0, hi: 2.0 }));
        assert_eq!(setting.text("x-limit"), None);
        assert_eq!(setting.text("y-label"), None);
        assert_eq!(setting.range("title"), None);
        assert_eq!(setting.text("legend"), None);
    }

    #[test]
    fn axis_range_needs_two_values() {
        assert!(AxisRange::from_slice(&[1.0]).is_none());
        assert!(AxisRange::from_slice(&[1.0, 2.0, 3.0]).is_none());
        assert_eq!(
            AxisRange::from_slice(&[-40.0, 0.0]),
            Some(AxisRange { lo: -40.0, hi: 0.0 })
        );
    }
}
