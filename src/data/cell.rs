use std::fmt;

use calamine::{Data, Range};
use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, reduced to what the layout scanner needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    #[default]
    Empty,
}

impl CellValue {
    /// Blank cells and empty strings both count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(format!("#{e:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet – owned 2-D grid with 1-based addressing
// ---------------------------------------------------------------------------

static EMPTY: CellValue = CellValue::Empty;

/// An owned copy of one worksheet.
///
/// Rows and columns are 1-based, matching how the layout is described in the
/// workbook ("column 3 holds the directory"). Reads outside the stored area
/// return an empty cell.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    /// Build a sheet from literal rows; `""` becomes an empty cell.
    pub fn from_rows<R, C>(name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<CellValue>,
    {
        Sheet {
            name: name.to_string(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Copy a calamine range, keeping absolute positions.
    ///
    /// calamine trims leading empty rows/columns and reports the offset via
    /// `start()`; the scanner needs "column 1" to mean column A.
    pub fn from_range(name: &str, range: &Range<Data>) -> Self {
        let mut sheet = Sheet::new(name);
        let Some((row0, col0)) = range.start() else {
            return sheet;
        };
        for (r, c, data) in range.used_cells() {
            sheet.set(
                row0 as usize + r + 1,
                col0 as usize + c + 1,
                CellValue::from(data),
            );
        }
        sheet
    }

    /// Last row holding any stored cell (0 for an empty sheet).
    pub fn max_row(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        if row == 0 || col == 0 {
            return &EMPTY;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if row == 0 || col == 0 {
            return;
        }
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize_with(col, Default::default);
        }
        cells[col - 1] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_based_access() {
        let sheet = Sheet::from_rows("t", [vec!["a", "b"], vec!["", "d"]]);
        assert_eq!(sheet.cell(1, 1), &CellValue::Text("a".into()));
        assert_eq!(sheet.cell(2, 2), &CellValue::Text("d".into()));
        assert!(sheet.cell(2, 1).is_empty());
        assert!(sheet.cell(9, 9).is_empty());
        assert!(sheet.cell(0, 1).is_empty());
        assert_eq!(sheet.max_row(), 2);
    }

    #[test]
    fn set_grows_grid() {
        let mut sheet = Sheet::new("t");
        sheet.set(3, 4, CellValue::Number(1.0));
        assert_eq!(sheet.max_row(), 3);
        assert_eq!(sheet.cell(3, 4), &CellValue::Number(1.0));
        assert!(sheet.cell(3, 3).is_empty());
    }

    #[test]
    fn range_offset_is_preserved() {
        let mut range = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Raw data".into()));
        range.set_value((3, 2), Data::Int(7));
        let sheet = Sheet::from_range("t", &range);
        assert_eq!(sheet.cell(3, 2).as_text(), Some("Raw data"));
        assert_eq!(sheet.cell(4, 3), &CellValue::Number(7.0));
        assert!(sheet.cell(1, 1).is_empty());
    }

    #[test]
    fn empty_string_counts_as_empty() {
        assert!(CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }
}
