use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use super::coerce::string_to_array;
use super::error::{DataError, DataResult};

const FREQUENCY_LABEL: (&str, &str) = ("Total", "Frequency  (MHz)");
const EFFICIENCY_LABEL: (&str, &str) = ("", "Efficiency (dB)");

// ---------------------------------------------------------------------------
// Chamber efficiency export
// ---------------------------------------------------------------------------

/// Efficiency trace from an antenna chamber CSV export.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyCurve {
    pub freq_mhz: Vec<f64>,
    pub efficiency_db: Vec<f64>,
}

/// Read the total-efficiency trace from a chamber export.
///
/// The export has no header row and rows of varying width. Two label rows
/// carry the data:
/// * `Total, Frequency  (MHz), f1, f2, …` (note the double space)
/// * `, Efficiency (dB), e1, e2, …`
///
/// The first efficiency row ends the scan; later blocks (per-polarisation
/// tables) are ignored.
pub fn read_chamber_csv(path: &Path) -> DataResult<EfficiencyCurve> {
    if !path.is_file() {
        return Err(DataError::MissingFile(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    parse_chamber_csv(file, path)
}

fn parse_chamber_csv<R: Read>(source: R, path: &Path) -> DataResult<EfficiencyCurve> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut freq_mhz: Option<Vec<f64>> = None;
    let mut efficiency_db: Option<Vec<f64>> = None;

    // Chamber software writes Latin-1 headers ("°"), so fields decode lossily.
    for result in reader.byte_records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let fields: Vec<Cow<str>> = record.iter().map(String::from_utf8_lossy).collect();
        let [first, second, values @ ..] = fields.as_slice() else {
            continue;
        };
        let (first, second): (&str, &str) = (first, second);
        let location = || format!("{} line {line}", path.display());

        if (first, second) == FREQUENCY_LABEL && values.first().is_some_and(|v| !v.is_empty()) {
            let parsed = string_to_array(values).map_err(|source| DataError::MalformedCell {
                location: location(),
                source,
            })?;
            freq_mhz = Some(parsed);
        }

        if (first, second) == EFFICIENCY_LABEL {
            let parsed = string_to_array(values).map_err(|source| DataError::MalformedCell {
                location: location(),
                source,
            })?;
            efficiency_db = Some(parsed);
            break;
        }
    }

    let freq_mhz = freq_mhz.ok_or_else(|| DataError::IncompleteCurve {
        path: path.to_path_buf(),
        missing: FREQUENCY_LABEL.1,
    })?;
    let efficiency_db = efficiency_db.ok_or_else(|| DataError::IncompleteCurve {
        path: path.to_path_buf(),
        missing: EFFICIENCY_LABEL.1,
    })?;

    if freq_mhz.len() != efficiency_db.len() {
        return Err(DataError::CurveLengthMismatch {
            path: path.to_path_buf(),
            x_len: freq_mhz.len(),
            y_len: efficiency_db.len(),
        });
    }

    log::debug!(
        "{}: {} efficiency points",
        path.display(),
        efficiency_db.len()
    );
    Ok(EfficiencyCurve {
        freq_mhz,
        efficiency_db,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(text: &str) -> DataResult<EfficiencyCurve> {
        parse_chamber_csv(text.as_bytes(), Path::new("chamber.csv"))
    }

    #[test]
    fn reads_frequency_and_efficiency() {
        let curve = parse(
            "Antenna,ANT1\n\
             Total,Frequency  (MHz),1000,2000,3000,,\n\
             ,Efficiency (dB),-3.0,-2.5,-2.0,,\n",
        )
        .unwrap();
        assert_eq!(curve.freq_mhz, vec![1000.0, 2000.0, 3000.0]);
        assert_eq!(curve.efficiency_db, vec![-3.0, -2.5, -2.0]);
    }

    #[test]
    fn first_efficiency_row_wins() {
        let curve = parse(
            "Total,Frequency  (MHz),1000,2000\n\
             ,Efficiency (dB),-3,-2\n\
             ,Efficiency (dB),-9,-9\n\
             Total,Frequency  (MHz),5,6\n",
        )
        .unwrap();
        assert_eq!(curve.efficiency_db, vec![-3.0, -2.0]);
        assert_eq!(curve.freq_mhz, vec![1000.0, 2000.0]);
    }

    #[test]
    fn frequency_row_with_blank_first_value_is_ignored() {
        let err = parse(
            "Total,Frequency  (MHz),,\n\
             ,Efficiency (dB),-3,-2\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::IncompleteCurve { missing: "Frequency  (MHz)", .. }
        ));
    }

    #[test]
    fn missing_efficiency_row_is_incomplete() {
        let err = parse(
            "Total,Frequency  (MHz),1000,2000\n\
             ,Gain (dBi),1,2\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::IncompleteCurve { missing: "Efficiency (dB)", .. }
        ));
    }

    #[test]
    fn length_mismatch() {
        let err = parse(
            "Total,Frequency  (MHz),1000,2000\n\
             ,Efficiency (dB),-3\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::CurveLengthMismatch { x_len: 2, y_len: 1, .. }
        ));
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        let err = parse(
            "Total,Frequency  (MHz),1000,2000\n\
             ,Efficiency (dB),-3,n/a\n",
        )
        .unwrap_err();
        match err {
            DataError::MalformedCell { location, .. } => {
                assert_eq!(location, "chamber.csv line 2")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn latin1_bytes_do_not_fail_the_file() {
        let export: &[u8] = b"Probe,Dipole 90\xb0\n\
                              Total,Frequency  (MHz),700,800\n\
                              ,Efficiency (dB),-4.5,-4.0\n";
        let curve = parse_chamber_csv(export, Path::new("chamber.csv")).unwrap();
        assert_eq!(curve.freq_mhz, vec![700.0, 800.0]);
        assert_eq!(curve.efficiency_db, vec![-4.5, -4.0]);
    }

    #[test]
    fn short_rows_are_skipped() {
        let curve = parse(
            "x\n\
             \n\
             Total,Frequency  (MHz),1\n\
             ,Efficiency (dB),-1\n",
        )
        .unwrap();
        assert_eq!(curve.freq_mhz, vec![1.0]);
    }

    #[test]
    fn file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Total,Frequency  (MHz),700,800").unwrap();
        writeln!(file, ",Efficiency (dB),-4.5,-4.0").unwrap();
        let curve = read_chamber_csv(file.path()).unwrap();
        assert_eq!(curve.efficiency_db, vec![-4.5, -4.0]);

        let missing = Path::new("/nonexistent/chamber.csv");
        assert!(matches!(
            read_chamber_csv(missing),
            Err(DataError::MissingFile(_))
        ));
    }
}
