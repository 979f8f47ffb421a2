/// Characters the recognition model carries over from handwritten tally
/// and checkmark annotations next to quantities.
const ANNOTATION_NOISE: [char; 4] = ['v', 'V', '✓', '/'];

/// Outcome of normalizing one numeric-looking cell.
///
/// Only additive folding happens here; decimal-separator cleanup and
/// multiplicative folding are requested from the recognition model
/// upstream and are not re-checked on this side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellFold {
    /// The cell held an additive expression; the value is its sum.
    Folded(String),
    /// No expression present; the cleaned cell text, unchanged.
    Passthrough(String),
    /// An expression with an operand that did not parse; left unevaluated.
    Unparsed(String),
}

impl CellFold {
    pub fn as_str(&self) -> &str {
        match self {
            CellFold::Folded(s) | CellFold::Passthrough(s) | CellFold::Unparsed(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            CellFold::Folded(s) | CellFold::Passthrough(s) | CellFold::Unparsed(s) => s,
        }
    }
}

/// Normalize one cell value: strip annotation noise, then fold an
/// additive expression like `1+1` or `2 + 1` into its sum. Never fails —
/// a cell that cannot be evaluated is passed through cleaned.
pub fn fold_cell(raw: &str) -> CellFold {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !ANNOTATION_NOISE.contains(c))
        .collect();

    if !cleaned.contains('+') {
        return CellFold::Passthrough(cleaned);
    }

    let mut total = 0.0_f64;
    for operand in cleaned.split('+') {
        let operand = operand.trim();
        if operand.is_empty() {
            // A dangling plus ("1+") contributes nothing.
            continue;
        }
        match operand.parse::<f64>() {
            Ok(n) => total += n,
            Err(_) => return CellFold::Unparsed(cleaned),
        }
    }

    CellFold::Folded(format_sum(total))
}

/// Integer-valued sums print without a fractional part.
fn format_sum(total: f64) -> String {
    if total.fract() == 0.0 {
        format!("{total:.0}")
    } else {
        total.to_string()
    }
}
