use thiserror::Error;

use super::cell::CellValue;

// ---------------------------------------------------------------------------
// Text → number coercion for spreadsheet cells and CSV fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("expected a number, found an empty cell")]
    Empty,
}

fn parse_token(tok: &str) -> Result<f64, CoerceError> {
    tok.trim()
        .parse::<f64>()
        .map_err(|_| CoerceError::NotANumber(tok.to_string()))
}

/// Parse a bracketed list such as `"[100, 2500]"`.
///
/// Every `[` and `]` is removed, wherever it appears, and the remainder is
/// split on commas. Whitespace around a token is tolerated; an empty token
/// (e.g. from `"[]"` or `"[1,,2]"`) is an error.
pub fn bracket_to_array(text: &str) -> Result<Vec<f64>, CoerceError> {
    text.replace(['[', ']'], "")
        .split(',')
        .map(parse_token)
        .collect()
}

/// Parse a row of numeric strings, skipping cells that are exactly empty
/// (fixed-width CSV exports pad rows with trailing blanks).
pub fn string_to_array<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<f64>, CoerceError> {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .filter(|tok| !tok.is_empty())
        .map(parse_token)
        .collect()
}

/// Read a single cell as a number. Numeric text is accepted.
pub fn cell_to_f64(cell: &CellValue) -> Result<f64, CoerceError> {
    match cell {
        CellValue::Number(v) => Ok(*v),
        CellValue::Text(s) => parse_token(s),
        CellValue::Empty => Err(CoerceError::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_limits() {
        assert_eq!(bracket_to_array("[100,2500]").unwrap(), vec![100.0, 2500.0]);
        assert_eq!(bracket_to_array("[-40, 0]").unwrap(), vec![-40.0, 0.0]);
        assert_eq!(bracket_to_array(" [ 1.5 ,2e3 ] ").unwrap(), vec![1.5, 2000.0]);
    }

    #[test]
    fn bracket_rejects_garbage() {
        assert_eq!(
            bracket_to_array("[100,abc]"),
            Err(CoerceError::NotANumber("abc".into()))
        );
        assert!(bracket_to_array("[]").is_err());
        assert!(bracket_to_array("[1,,2]").is_err());
    }

    #[test]
    fn string_row_drops_trailing_blanks() {
        let row = ["500", "1000", " 6000", "", ""];
        assert_eq!(string_to_array(&row).unwrap(), vec![500.0, 1000.0, 6000.0]);
    }

    #[test]
    fn string_row_rejects_non_numeric() {
        let row = vec!["1".to_string(), "x".to_string()];
        assert!(matches!(
            string_to_array(&row),
            Err(CoerceError::NotANumber(t)) if t == "x"
        ));
    }

    #[test]
    fn single_cells() {
        assert_eq!(cell_to_f64(&CellValue::Number(3.0)), Ok(3.0));
        assert_eq!(cell_to_f64(&CellValue::Text(" 42 ".into())), Ok(42.0));
        assert_eq!(cell_to_f64(&CellValue::Empty), Err(CoerceError::Empty));
    }
}
