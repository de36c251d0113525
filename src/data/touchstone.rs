use std::path::Path;
use std::str::FromStr;

use num_complex::Complex64;
use regex::Regex;

use super::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// Option line (`# GHz S MA R 50`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberFormat {
    RealImag,
    MagAngle,
    DbAngle,
}

impl NumberFormat {
    fn to_complex(self, a: f64, b: f64) -> Complex64 {
        match self {
            NumberFormat::RealImag => Complex64::new(a, b),
            NumberFormat::MagAngle => Complex64::from_polar(a, b.to_radians()),
            NumberFormat::DbAngle => Complex64::from_polar(10f64.powf(a / 20.0), b.to_radians()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Options {
    freq_scale: f64,
    format: NumberFormat,
    z0: f64,
}

impl Default for Options {
    // Touchstone defaults when the option line omits a field.
    fn default() -> Self {
        Options {
            freq_scale: 1e9,
            format: NumberFormat::MagAngle,
            z0: 50.0,
        }
    }
}

impl FromStr for Options {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut opts = Options::default();
        let mut tokens = line.trim_start_matches('#').split_whitespace();
        while let Some(tok) = tokens.next() {
            match tok.to_ascii_uppercase().as_str() {
                "HZ" => opts.freq_scale = 1.0,
                "KHZ" => opts.freq_scale = 1e3,
                "MHZ" => opts.freq_scale = 1e6,
                "GHZ" => opts.freq_scale = 1e9,
                "S" => {}
                p @ ("Y" | "Z" | "G" | "H") => {
                    return Err(format!("{p}-parameters are not supported, only S"))
                }
                "RI" => opts.format = NumberFormat::RealImag,
                "MA" => opts.format = NumberFormat::MagAngle,
                "DB" => opts.format = NumberFormat::DbAngle,
                "R" => {
                    opts.z0 = tokens
                        .next()
                        .and_then(|v| v.parse().ok())
                        .ok_or_else(|| format!("bad reference impedance in '{line}'"))?;
                }
                other => return Err(format!("unknown option '{other}'")),
            }
        }
        Ok(opts)
    }
}

// ---------------------------------------------------------------------------
// Network – frequency vector plus N×N scattering matrix per point
// ---------------------------------------------------------------------------

/// S-parameter data read from a touchstone (`.sNp`) file.
#[derive(Debug, Clone)]
pub struct Network {
    pub name: String,
    pub nports: usize,
    /// Reference impedance in ohms.
    pub z0: f64,
    pub freq_hz: Vec<f64>,
    /// Row-major `nports × nports` block per frequency.
    s: Vec<Complex64>,
}

impl Network {
    /// Read a touchstone file; the port count comes from the `.sNp` extension.
    pub fn from_touchstone(path: &Path) -> DataResult<Self> {
        if !path.is_file() {
            return Err(DataError::MissingFile(path.to_path_buf()));
        }
        let err = |reason: String| DataError::Touchstone {
            path: path.to_path_buf(),
            reason,
        };

        let re_ext = Regex::new(r"(?i)^s(\d+)p$").expect("Invalid regex!");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let nports = re_ext
            .captures(ext)
            .and_then(|caps| caps[1].parse::<usize>().ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| err(format!("'.{ext}' is not a .sNp extension")))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;
        let network = Network::parse(&content, nports, &name).map_err(err)?;
        log::debug!(
            "{}: {}-port '{}', z0 {} ohm, {} points",
            path.display(),
            network.nports,
            network.name,
            network.z0,
            network.freq_hz.len()
        );
        Ok(network)
    }

    /// Parse touchstone text for a known port count.
    pub fn parse(content: &str, nports: usize, name: &str) -> Result<Self, String> {
        let mut opts = Options::default();
        let mut seen_options = false;
        // Version 2 files may declare the 2-port order explicitly.
        let mut two_port_21_first = true;

        let record_len = 1 + 2 * nports * nports;
        let mut record: Vec<f64> = Vec::with_capacity(record_len);
        let mut freq_hz = Vec::new();
        let mut s = Vec::new();

        'lines: for raw in content.lines() {
            let line = raw.split('!').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                // Only the first option line counts.
                if !seen_options {
                    opts = line.parse()?;
                    seen_options = true;
                }
                continue;
            }
            if line.starts_with('[') {
                let lower = line.to_ascii_lowercase();
                if lower.starts_with("[end]") {
                    break;
                }
                if lower.starts_with("[two-port data order]") {
                    two_port_21_first = !lower.contains("12_21");
                }
                continue;
            }

            for tok in line.split_whitespace() {
                let value: f64 = tok
                    .parse()
                    .map_err(|_| format!("'{tok}' is not a number"))?;
                if record.is_empty() {
                    let f = value * opts.freq_scale;
                    if freq_hz.last().is_some_and(|&last| f <= last) {
                        // 2-port files append noise parameters, restarting the sweep.
                        if nports == 2 {
                            break 'lines;
                        }
                        return Err(format!("frequency {tok} does not increase"));
                    }
                }
                record.push(value);
                if record.len() == record_len {
                    freq_hz.push(record[0] * opts.freq_scale);
                    let mut block: Vec<Complex64> = record[1..]
                        .chunks_exact(2)
                        .map(|pair| opts.format.to_complex(pair[0], pair[1]))
                        .collect();
                    if nports == 2 && two_port_21_first {
                        block.swap(1, 2);
                    }
                    s.extend(block);
                    record.clear();
                }
            }
        }

        if !record.is_empty() {
            return Err(format!(
                "truncated data: {} of {record_len} values in the last record",
                record.len()
            ));
        }
        if freq_hz.is_empty() {
            return Err("no network data".to_string());
        }

        Ok(Network {
            name: name.to_string(),
            nports,
            z0: opts.z0,
            freq_hz,
            s,
        })
    }

    pub fn frequency_mhz(&self) -> Vec<f64> {
        self.freq_hz.iter().map(|f| f / 1e6).collect()
    }

    /// S-parameter trace for 0-based port indices (`s(0, 0)` is S11).
    pub fn s(&self, row: usize, col: usize) -> Vec<Complex64> {
        assert!(row < self.nports && col < self.nports, "port index out of range");
        let n = self.nports;
        self.s
            .chunks_exact(n * n)
            .map(|block| block[row * n + col])
            .collect()
    }

    /// Magnitude in dB, `20·log10|Sij|`.
    pub fn s_db(&self, row: usize, col: usize) -> Vec<f64> {
        self.s(row, col)
            .iter()
            .map(|v| 20.0 * v.norm().log10())
            .collect()
    }

    /// Voltage standing wave ratio at a port, `(1+|Sii|)/(1-|Sii|)`.
    pub fn vswr(&self, port: usize) -> Vec<f64> {
        self.s(port, port)
            .iter()
            .map(|v| {
                let gamma = v.norm();
                (1.0 + gamma) / (1.0 - gamma)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn one_port_db() {
        let text = "! antenna\n# MHz S DB R 50\n100 -10 0\n200 -20 90 ! inline\n";
        let net = Network::parse(text, 1, "ant").unwrap();
        assert_eq!(net.freq_hz, vec![100e6, 200e6]);
        assert_eq!(net.frequency_mhz(), vec![100.0, 200.0]);
        let db = net.s_db(0, 0);
        assert!(close(db[0], -10.0) && close(db[1], -20.0));
    }

    #[test]
    fn vswr_from_magnitude() {
        let text = "# Hz S MA R 50\n1e9 0.5 0\n2e9 0 0\n";
        let net = Network::parse(text, 1, "ant").unwrap();
        let vswr = net.vswr(0);
        assert!(close(vswr[0], 3.0));
        assert!(close(vswr[1], 1.0));
    }

    #[test]
    fn two_port_order_and_wrapping() {
        // S11 S21 S12 S22, split over two lines.
        let text = "# GHz S RI R 50\n1 0.1 0 0.9 0\n  0.01 0 0.2 0\n";
        let net = Network::parse(text, 2, "thru").unwrap();
        assert!(close(net.s(1, 0)[0].re, 0.9));
        assert!(close(net.s(0, 1)[0].re, 0.01));
        assert!(close(net.s(1, 1)[0].re, 0.2));
        assert!(close(net.s_db(1, 0)[0], 20.0 * 0.9f64.log10()));
    }

    #[test]
    fn two_port_noise_block_is_ignored() {
        let text = "# GHz S MA R 50\n\
                    1 0.1 0 0.5 0 0.5 0 0.1 0\n\
                    2 0.1 0 0.4 0 0.4 0 0.1 0\n\
                    1 1.5 0.3 10 0.2\n";
        let net = Network::parse(text, 2, "amp").unwrap();
        assert_eq!(net.freq_hz.len(), 2);
    }

    #[test]
    fn unordered_sweep_is_an_error_outside_two_port() {
        let repeated = "# MHz S DB R 50
100 -10 0
200 -12 0
200 -14 0
";
        let err = Network::parse(repeated, 1, "ant").unwrap_err();
        assert!(err.contains("200"), "{err}");

        let block = "0 0 ".repeat(9);
        let three_port = format!("# MHz S RI R 50\n2 {block}\n1 {block}\n");
        assert!(Network::parse(&three_port, 3, "hub").is_err());
    }

    #[test]
    fn version_two_keywords() {
        let text = "[Version] 2.0\n# MHz S RI R 50\n[Number of Ports] 2\n\
                    [Two-Port Data Order] 12_21\n[Network Data]\n\
                    10 0 0 0.3 0 0.7 0 0 0\n[End]\n20 garbage\n";
        let net = Network::parse(text, 2, "v2").unwrap();
        assert!(close(net.s(0, 1)[0].re, 0.3));
        assert!(close(net.s(1, 0)[0].re, 0.7));
    }

    #[test]
    fn defaults_without_option_line() {
        let net = Network::parse("1 0.5 0\n", 1, "bare").unwrap();
        assert_eq!(net.freq_hz, vec![1e9]);
        assert_eq!(net.z0, 50.0);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Network::parse("# GHz Z RI R 50\n1 0 0\n", 1, "z").is_err());
        assert!(Network::parse("# GHz S RI\n1 0\n", 1, "t").is_err());
        assert!(Network::parse("# GHz S RI\n1 x 0\n", 1, "t").is_err());
        assert!(Network::parse("! only comments\n", 1, "t").is_err());
    }

    #[test]
    fn extension_sets_port_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dut.S2P");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# MHz S DB R 50").unwrap();
        writeln!(file, "900 -12 0 -1 0 -40 0 -15 0").unwrap();
        drop(file);

        let net = Network::from_touchstone(&path).unwrap();
        assert_eq!(net.nports, 2);
        assert_eq!(net.name, "dut");
        assert!(close(net.s_db(1, 0)[0], -1.0));

        let bad = dir.path().join("dut.txt");
        std::fs::write(&bad, "1 0 0\n").unwrap();
        assert!(matches!(
            Network::from_touchstone(&bad),
            Err(DataError::Touchstone { .. })
        ));
    }
}
