use log::warn;

use crate::config::Cell;

const NON_FINITE_TOKENS: [&str; 5] = ["inf", "-inf", "infinity", "-infinity", "nan"];

/// Converts a raw textual vote into a number.
///
/// The conversion never fails: blanks, non-numeric content and non-finite
/// values are all absent votes. A cell may hold several partial tallies
/// separated by `/`, in which case the partial tallies are summed.
/// Results are rounded to two decimal places.
pub fn normalize(raw: &str) -> Option<f64> {
    if raw.trim().is_empty() {
        return None;
    }

    if raw.contains('/') {
        let parts: Vec<f64> = raw.split('/').filter_map(normalize).collect();
        if parts.is_empty() {
            return None;
        }
        return normalize_number(parts.iter().sum());
    }

    let s = raw.trim().to_lowercase();
    if NON_FINITE_TOKENS.contains(&s.as_str()) {
        return None;
    }

    match s.parse::<f64>() {
        Ok(x) => normalize_number(x),
        Err(e) => {
            warn!("normalize: could not convert {:?}: {}", raw, e);
            None
        }
    }
}

/// Same as [normalize], for a cell of the table.
pub fn normalize_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) => normalize(s),
        Cell::Number(x) => normalize_number(*x),
    }
}

fn normalize_number(x: f64) -> Option<f64> {
    if !x.is_finite() {
        return None;
    }
    let r = round2(x);
    if r.is_finite() {
        Some(r)
    } else {
        None
    }
}

/// Rounds to two decimal places, half to even on the exact binary value.
fn round2(x: f64) -> f64 {
    // Only odd multiples of 1/8 sit exactly between two hundredths.
    let eighths = x * 8.0;
    if x.abs() < 1e12 && eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let below = (x * 100.0).floor();
        let even = if below % 2.0 == 0.0 { below } else { below + 1.0 };
        return even / 100.0;
    }
    // The formatting is exact, and there is no tie left to break.
    format!("{:.2}", x).parse::<f64>().unwrap_or(x)
}
