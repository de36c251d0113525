/// Data layer: cell grid, layout scanning, and measurement readers.
///
/// Architecture:
/// ```text
///   workbook (.xlsx / .xls / .ods)
///        │
///        ▼
///   ┌──────────┐
///   │ workbook  │  open file, pick "S11" / "S21" / "Efficiency"
///   └──────────┘
///        │  Sheet (1-based cell grid)
///        ▼
///   ┌──────────┐
///   │  layout   │  Raw data / Plot / Layout / Subplot / Bandmark → SheetLayout
///   └──────────┘
///        │  DataFileRef list
///        ▼
///   ┌─────────────────────┐
///   │ touchstone │ chamber │  .sNp → Network, chamber CSV → EfficiencyCurve
///   └─────────────────────┘
/// ```

pub mod cell;
pub mod chamber;
pub mod coerce;
pub mod error;
pub mod layout;
pub mod model;
pub mod touchstone;
pub mod workbook;
