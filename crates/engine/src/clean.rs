// Numeric coercion of raw cell text.
// A cleaned value is never an error: anything that does not read as a finite
// number contributes zero.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberStyle {
    /// Plain decimal or scientific notation, surrounding whitespace allowed.
    #[default]
    Strict,
    /// Strict plus `$`, thousands separators and `(123.45)` negatives.
    Financial,
}

/// Parse a raw field as a finite number.
///
/// Returns `None` for blanks, text, NaN and infinities.
pub fn parse_number(raw: &str, style: NumberStyle) -> Option<f64> {
    let value = match style {
        NumberStyle::Strict => parse_strict(raw)?,
        NumberStyle::Financial => parse_financial(raw)?,
    };
    value.is_finite().then_some(value)
}

/// Cleaned value: the number in `raw`, or 0.0 when it has none.
pub fn clean_value(raw: &str, style: NumberStyle) -> f64 {
    parse_number(raw, style).unwrap_or(0.0)
}

fn parse_strict(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // f64::from_str accepts "inf" and "nan" spellings; is_finite rejects them later
    trimmed.parse::<f64>().ok()
}

/// - Strip `$`, commas, whitespace
/// - Handle `(123.45)` → `-123.45`
/// - Returns None if non-numeric characters remain after stripping
fn parse_financial(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let wrapped = trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')'));
    let (is_negative, inner) = match wrapped {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = inner
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    // Only digits, '.', exponent and a leading sign survive
    for (i, c) in cleaned.chars().enumerate() {
        match c {
            '0'..='9' | '.' | 'e' | 'E' => {}
            '-' | '+' if i == 0 && !is_negative => {}
            '-' | '+' if i > 0 && matches!(cleaned.as_bytes()[i - 1], b'e' | b'E') => {}
            _ => return None,
        }
    }

    let value: f64 = cleaned.parse().ok()?;
    Some(if is_negative { -value } else { value })
}
