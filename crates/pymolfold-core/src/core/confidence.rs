//! pLDDT extraction and the AlphaFold confidence coloring scheme.
//!
//! Predictors store per-residue pLDDT in the B-factor column of their PDB
//! output, either on a 0-1 or a 0-100 scale. Everything here works on the
//! percent scale for reporting while thresholds for coloring are emitted in the
//! structure's own scale.

use std::fmt;

/// B-factor columns of a PDB `ATOM` record, 0-based and end-exclusive.
const BFACTOR_COLUMNS: std::ops::Range<usize> = 60..66;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlddtScale {
    Unit,
    Percent,
}

impl PlddtScale {
    pub fn detect(values: &[f64]) -> Self {
        if values.iter().all(|v| *v <= 1.0) {
            PlddtScale::Unit
        } else {
            PlddtScale::Percent
        }
    }

    pub fn to_percent(self, value: f64) -> f64 {
        match self {
            PlddtScale::Unit => value * 100.0,
            PlddtScale::Percent => value,
        }
    }

    fn from_percent(self, value: f64) -> f64 {
        match self {
            PlddtScale::Unit => value / 100.0,
            PlddtScale::Percent => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceBand {
    VeryHigh,
    Confident,
    Low,
    VeryLow,
}

impl ConfidenceBand {
    pub const ALL: [ConfidenceBand; 4] = [
        ConfidenceBand::VeryHigh,
        ConfidenceBand::Confident,
        ConfidenceBand::Low,
        ConfidenceBand::VeryLow,
    ];

    pub fn classify(percent: f64) -> Self {
        if percent >= 90.0 {
            ConfidenceBand::VeryHigh
        } else if percent >= 70.0 {
            ConfidenceBand::Confident
        } else if percent >= 50.0 {
            ConfidenceBand::Low
        } else {
            ConfidenceBand::VeryLow
        }
    }

    /// Inclusive lower bound on the percent scale.
    pub fn lower_bound(self) -> f64 {
        match self {
            ConfidenceBand::VeryHigh => 90.0,
            ConfidenceBand::Confident => 70.0,
            ConfidenceBand::Low => 50.0,
            ConfidenceBand::VeryLow => 0.0,
        }
    }

    fn upper_bound(self) -> Option<f64> {
        match self {
            ConfidenceBand::VeryHigh => None,
            ConfidenceBand::Confident => Some(90.0),
            ConfidenceBand::Low => Some(70.0),
            ConfidenceBand::VeryLow => Some(50.0),
        }
    }

    pub fn rgb(self) -> [f64; 3] {
        match self {
            ConfidenceBand::VeryHigh => [0.0, 0.325490196078431, 0.843137254901961],
            ConfidenceBand::Confident => [0.341176470588235, 0.792156862745098, 0.976470588235294],
            ConfidenceBand::Low => [1.0, 0.858823529411765, 0.070588235294118],
            ConfidenceBand::VeryLow => [1.0, 0.494117647058824, 0.270588235294118],
        }
    }

    fn key(self) -> &'static str {
        match self {
            ConfidenceBand::VeryHigh => "high",
            ConfidenceBand::Confident => "normal",
            ConfidenceBand::Low => "medium",
            ConfidenceBand::VeryLow => "low",
        }
    }

    pub fn selection_name(self) -> String {
        format!("{}_lddt", self.key())
    }

    pub fn color_name(self) -> String {
        format!("{}_lddt_c", self.key())
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceBand::VeryHigh => "Very high",
            ConfidenceBand::Confident => "Confident",
            ConfidenceBand::Low => "Low",
            ConfidenceBand::VeryLow => "Very low",
        };
        f.write_str(label)
    }
}

/// Raw B-factors of every line mentioning a ` CA ` atom; unparsable lines are skipped.
pub fn residue_plddts(pdb: &str) -> Vec<f64> {
    pdb.lines()
        .filter(|line| line.contains(" CA "))
        .filter_map(|line| {
            line.get(BFACTOR_COLUMNS.start..line.len().min(BFACTOR_COLUMNS.end))
        })
        .filter_map(|field| field.trim().parse::<f64>().ok())
        .collect()
}

/// Mean pLDDT on the percent scale; `0.0` when no CA records are present.
pub fn mean_plddt(pdb: &str) -> f64 {
    let values = residue_plddts(pdb);
    if values.is_empty() {
        return 0.0;
    }
    let scale = PlddtScale::detect(&values);
    values.iter().map(|v| scale.to_percent(*v)).sum::<f64>() / values.len() as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceSummary {
    pub scale: PlddtScale,
    pub mean: f64,
    pub residues: usize,
    /// Residue counts per band, in [`ConfidenceBand::ALL`] order.
    pub band_counts: [usize; 4],
}

pub fn summarize(pdb: &str) -> Option<ConfidenceSummary> {
    let values = residue_plddts(pdb);
    if values.is_empty() {
        return None;
    }
    let scale = PlddtScale::detect(&values);
    let mut band_counts = [0usize; 4];
    for v in &values {
        let band = ConfidenceBand::classify(scale.to_percent(*v));
        let idx = ConfidenceBand::ALL.iter().position(|b| *b == band).unwrap_or(3);
        band_counts[idx] += 1;
    }
    Some(ConfidenceSummary {
        scale,
        mean: mean_plddt(pdb),
        residues: values.len(),
        band_counts,
    })
}

/// PyMOL commands that color `selection` by confidence band.
pub fn coloring_commands(selection: &str, scale: PlddtScale) -> Vec<String> {
    let mut commands = Vec::with_capacity(13);
    for band in ConfidenceBand::ALL {
        let [r, g, b] = band.rgb();
        commands.push(format!("set_color {}, [{}, {}, {}]", band.color_name(), r, g, b));
    }
    for band in ConfidenceBand::ALL {
        let lower = scale.from_percent(band.lower_bound());
        let condition = match band.upper_bound() {
            None => format!("(b > {lower} or b = {lower})"),
            Some(upper) => {
                let upper = scale.from_percent(upper);
                format!("((b < {upper} and b > {lower}) or (b = {lower}))")
            }
        };
        commands.push(format!(
            "select {}, ({}) and {}",
            band.selection_name(),
            selection,
            condition
        ));
    }
    for band in ConfidenceBand::ALL {
        commands.push(format!("color {}, {}", band.color_name(), band.selection_name()));
    }
    commands.push("bg_color white".to_string());
    commands
}
