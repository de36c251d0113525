use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

const DATA_DIR: &str = "measurements";

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Measurement files
// ---------------------------------------------------------------------------

/// Frequencies in MHz: 500 → 3000, step 5.
fn sweep() -> Vec<f64> {
    (0..=500).map(|i| 500.0 + i as f64 * 5.0).collect()
}

/// 1-port antenna with resonances at `(f0, width, depth)`, MA format.
fn write_s1p(path: &Path, resonances: &[(f64, f64, f64)], rng: &mut SimpleRng) -> Result<()> {
    let mut out = String::from("! synthetic antenna return loss\n# MHz S MA R 50\n");
    for f in sweep() {
        let dip: f64 = resonances
            .iter()
            .map(|&(f0, width, depth)| gaussian(f, f0, width, depth))
            .sum();
        let mag = (0.95 - dip + rng.gauss(0.0, 0.005)).clamp(0.02, 0.99);
        let angle = -((f - 500.0) * 0.36) % 360.0;
        writeln!(out, "{f:.1} {mag:.5} {angle:.2}")?;
    }
    std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

/// 2-port band-pass filter centred on `f0`, DB format.
fn write_s2p(path: &Path, f0: f64, bandwidth: f64, rng: &mut SimpleRng) -> Result<()> {
    let mut out = String::from("! synthetic band-pass filter\n# MHz S DB R 50\n");
    for f in sweep() {
        let pass = gaussian(f, f0, bandwidth, 1.0);
        let s21 = -0.8 - 40.0 * (1.0 - pass) + rng.gauss(0.0, 0.05);
        let s11 = -2.0 - 18.0 * pass + rng.gauss(0.0, 0.1);
        writeln!(out, "{f:.1} {s11:.3} 0 {s21:.3} 0 {s21:.3} 0 {s11:.3} 0")?;
    }
    std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

/// Chamber export with a header block, the two label rows and a trailing
/// per-polarisation table that the reader must ignore.
fn write_chamber_csv(path: &Path, peak: f64, rng: &mut SimpleRng) -> Result<()> {
    let freqs: Vec<f64> = (0..=25).map(|i| 500.0 + i as f64 * 100.0).collect();
    let join = |values: &[f64]| {
        values
            .iter()
            .map(|v| format!("{v:.2}"))
            .collect::<Vec<_>>()
            .join(",")
    };
    let eff: Vec<f64> = freqs
        .iter()
        .map(|&f| -8.0 + gaussian(f, peak, 600.0, 6.0) + rng.gauss(0.0, 0.2))
        .collect();
    let theta: Vec<f64> = eff.iter().map(|e| e - 3.0).collect();

    let mut out = String::new();
    writeln!(out, "Chamber Export,Synthetic")?;
    writeln!(out, "Total,Frequency  (MHz),{},,", join(&freqs))?;
    writeln!(out, ",Efficiency (dB),{},,", join(&eff))?;
    writeln!(out, "Theta,Frequency  (MHz),{},,", join(&freqs))?;
    writeln!(out, ",Efficiency (dB),{},,", join(&theta))?;
    std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

enum Cell<'a> {
    Text(&'a str),
    Num(f64),
}

fn write_rows(ws: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            match *cell {
                Cell::Text("") => {}
                Cell::Text(s) => {
                    ws.write_string(r, c, s)?;
                }
                Cell::Num(v) => {
                    ws.write_number(r, c, v)?;
                }
            }
        }
    }
    Ok(())
}

/// Rows for one sheet: raw data, plot headers, per-subplot settings, bands.
fn sheet_rows<'a>(
    files: &[(&'a str, &'a str)],
    plots: &[&'a str],
    subplots: &[Vec<(&'a str, Vec<&'a str>)>],
) -> Vec<Vec<Cell<'a>>> {
    use Cell::{Num, Text};

    let mut rows = vec![vec![Text("Raw data"), Text("Label"), Text("Directory"), Text("File")]];
    for &(label, file) in files {
        rows.push(vec![Text(""), Text(label), Text(DATA_DIR), Text(file)]);
    }
    rows.push(vec![]);

    let mut header = vec![Text("Plot"), Text("")];
    header.extend(plots.iter().map(|&p| Text(p)));
    rows.push(header);
    rows.push(vec![Text("Layout"), Num(subplots.len() as f64)]);

    for (i, settings) in subplots.iter().enumerate() {
        let label = match i {
            0 => "Subplot 1",
            1 => "Subplot 2",
            _ => "Subplot",
        };
        rows.push(vec![Text(label)]);
        for (key, values) in settings {
            let mut row = vec![Text(*key), Text("")];
            row.extend(values.iter().map(|&v| Text(v)));
            rows.push(row);
        }
    }
    rows.push(vec![]);

    rows.push(vec![Text("Bandmark"), Text("LTE")]);
    rows.push(vec![Text("GPS"), Num(1565.0), Num(1585.0)]);
    rows.push(vec![Text("LTE"), Num(700.0), Num(960.0), Num(1710.0), Num(2170.0)]);
    rows
}

fn write_workbook(path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let s11 = sheet_rows(
        &[("Antenna A", "ant_a.s1p"), ("Antenna B", "ant_b.s1p")],
        &["S11", "VSWR"],
        &[
            vec![
                ("title", vec!["Return loss", "VSWR"]),
                ("x-label", vec!["Frequency (MHz)", "Frequency (MHz)"]),
                ("y-label", vec!["S11 (dB)", "VSWR"]),
                ("x-limit", vec!["[500,3000]", "[500,3000]"]),
                ("y-limit", vec!["[-30,0]", "[1,10]"]),
            ],
            vec![
                ("title", vec!["Low band", "Low band"]),
                ("x-label", vec!["Frequency (MHz)", "Frequency (MHz)"]),
                ("y-label", vec!["S11 (dB)", "VSWR"]),
                ("x-limit", vec!["[600,1100]", "[600, 1100]"]),
                ("y-limit", vec!["[-30,0]", "[1,6]"]),
            ],
        ],
    );
    let s21 = sheet_rows(
        &[("Filter", "filter.s2p")],
        &["S21"],
        &[vec![
            ("title", vec!["Insertion loss"]),
            ("x-label", vec!["Frequency (MHz)"]),
            ("y-label", vec!["S21 (dB)"]),
            ("x-limit", vec!["[500,3000]"]),
            ("y-limit", vec!["[-45,0]"]),
        ]],
    );
    let eff = sheet_rows(
        &[("Antenna A", "ant_a_chamber.csv"), ("Antenna B", "ant_b_chamber.csv")],
        &["Efficiency"],
        &[vec![
            ("title", vec!["Total efficiency"]),
            ("x-label", vec!["Frequency (MHz)"]),
            ("y-label", vec!["Efficiency (dB)"]),
            ("x-limit", vec!["[500,3000]"]),
            ("y-limit", vec!["[-10,0]"]),
        ]],
    );

    for (name, rows) in [("S11", &s11), ("S21", &s21), ("Efficiency", &eff)] {
        let ws = workbook.add_worksheet();
        ws.set_name(name)?;
        write_rows(ws, rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample"));
    let data_dir = out_dir.join(DATA_DIR);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    write_s1p(&data_dir.join("ant_a.s1p"), &[(850.0, 60.0, 0.8), (1900.0, 150.0, 0.7)], &mut rng)?;
    write_s1p(&data_dir.join("ant_b.s1p"), &[(800.0, 40.0, 0.6), (2100.0, 200.0, 0.85)], &mut rng)?;
    write_s2p(&data_dir.join("filter.s2p"), 1575.0, 150.0, &mut rng)?;
    write_chamber_csv(&data_dir.join("ant_a_chamber.csv"), 1900.0, &mut rng)?;
    write_chamber_csv(&data_dir.join("ant_b_chamber.csv"), 2100.0, &mut rng)?;

    let workbook = out_dir.join("antenna.xlsx");
    write_workbook(&workbook)?;

    println!("Wrote {}", workbook.display());
    println!("Run: cargo run -- {}", workbook.display());
    Ok(())
}
