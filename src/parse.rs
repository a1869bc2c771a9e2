//! Lenient parsing of free-text numeric fields (reps, weight).
//!
//! A malformed entry parses to zero so one bad log never blocks aggregation
//! over the rest of the journal.

/// Parse the leading number of `text`. `None`, empty and non-numeric input
/// give `0.0`.
///
/// ```
/// use training_journal_lib::parse::parse_number;
/// assert_eq!(parse_number(Some("8-10")), 8.0);
/// assert_eq!(parse_number(Some("12.5kg")), 12.5);
/// assert_eq!(parse_number(Some("abc")), 0.0);
/// ```
pub fn parse_number(text: Option<&str>) -> f64 {
  let Some(text) = text else {
    return 0.0;
  };
  let prefix = numeric_prefix(text.trim_start());
  match prefix.parse::<f64>() {
    Ok(value) if value.is_finite() => value,
    _ => 0.0,
  }
}

/// Longest prefix shaped like `[+-]digits[.digits]`.
fn numeric_prefix(text: &str) -> &str {
  let bytes = text.as_bytes();
  let mut end = 0;

  if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
    end = 1;
  }

  let int_start = end;
  while end < bytes.len() && bytes[end].is_ascii_digit() {
    end += 1;
  }
  let mut has_digits = end > int_start;

  if end < bytes.len() && bytes[end] == b'.' {
    let frac_start = end + 1;
    let mut frac_end = frac_start;
    while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
      frac_end += 1;
    }
    if frac_end > frac_start {
      end = frac_end;
      has_digits = true;
    }
  }

  if has_digits {
    &text[..end]
  } else {
    ""
  }
}
