//! Parsing per-level value lists such as `10/20/30/40`, `10-20` or `25%`.

use crate::data_structs::LevelValue;
use log::trace;

/// Parses a delimited value string into per-level values.
///
/// Never fails: tokens that are not numbers are kept as text, and an empty
/// or placeholder string (`none`, `n/a`, `-`) yields an empty list. A single
/// number stays a single value; padding to the ability's level count is left
/// to the caller.
pub fn parse_values(raw: &str) -> Vec<LevelValue> {
    let text = raw.trim();

    if is_blank(text) {
        return vec![];
    }

    match (text.contains('/'), text.contains('-')) {
        (true, true) => {
            trace!("value string '{}' mixes separators, kept verbatim", text);
            return vec![LevelValue::Text(text.into())];
        },
        (false, true) => if let Some(range) = parse_range(text) {
            return range;
        },
        _ => {}
    }

    let values: Vec<LevelValue> = text.split('/')
                                      .map(str::trim)
                                      .map(parse_piece)
                                      .collect();

    if values.iter().all(|v| v.as_f64().is_none()) {
        trace!("value string '{}' kept verbatim", text);
        return vec![LevelValue::Text(text.into())];
    }

    values
}

/// Like `parse_values`, keeping only the numeric entries.
///
/// Returns `None` if any piece is non-numeric, so callers can treat the whole
/// string as malformed.
pub fn parse_numbers(raw: &str) -> Option<Vec<f64>> {
    parse_values(raw).iter().map(LevelValue::as_f64).collect()
}

fn is_blank(text: &str) -> bool {
    text.is_empty() || text == "-" || text.eq_ignore_ascii_case("none") || text.eq_ignore_ascii_case("n/a")
}

fn parse_range(text: &str) -> Option<Vec<LevelValue>> {
    let parts: Vec<&str> = text.split('-').collect();

    if parts.len() != 2 {
        return None;
    }

    let start = parse_finite(parts[0].trim())?;
    let end = parse_finite(parts[1].trim())?;

    Some(vec![start.into(), end.into()])
}

fn parse_piece(piece: &str) -> LevelValue {
    if let Some(n) = parse_finite(piece) {
        return LevelValue::Number(n);
    }

    if let Some(n) = piece.strip_suffix('%').and_then(|p| parse_finite(p.trim())) {
        return LevelValue::Number(n / 100.0);
    }

    LevelValue::Text(piece.into())
}

/// `f64::from_str` also accepts `inf` and `NaN`, which JSON cannot carry.
fn parse_finite(piece: &str) -> Option<f64> {
    piece.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Fits a list to `levels` entries: repeats the last value when short,
/// truncates when long. An empty list stays empty.
pub fn fit_levels<T: Clone>(mut values: Vec<T>, levels: usize) -> Vec<T> {
    if let Some(last) = values.last().cloned() {
        values.resize(levels, last);
    }

    values
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data_structs::LevelValue::*;

    #[test]
    fn slash_separated() {
        assert_eq!(parse_values("16/14/12/10"),
                   vec![Number(16.0), Number(14.0), Number(12.0), Number(10.0)]);
        assert_eq!(parse_values(" 0.4 / 0.36 / 0.32 "),
                   vec![Number(0.4), Number(0.36), Number(0.32)]);
    }

    #[test]
    fn single_value_stays_single() {
        assert_eq!(parse_values("10"), vec![Number(10.0)]);
    }

    #[test]
    fn placeholders_are_empty() {
        for raw in &["", "  ", "none", "None", "N/A", "n/a", "-"] {
            assert!(parse_values(raw).is_empty(), "{:?}", raw);
        }
    }

    #[test]
    fn ranges() {
        assert_eq!(parse_values("10-20"), vec![Number(10.0), Number(20.0)]);
        assert_eq!(parse_values("-5"), vec![Number(-5.0)]);
    }

    #[test]
    fn percentages() {
        assert_eq!(parse_values("10%/20%"), vec![Number(0.1), Number(0.2)]);
    }

    #[test]
    fn mixed_pieces_are_kept() {
        assert_eq!(parse_values("100/special/300"),
                   vec![Number(100.0), Text("special".into()), Number(300.0)]);
        assert_eq!(parse_numbers("100/special"), None);
        assert_eq!(parse_numbers("1/2"), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn malformed_input_never_panics() {
        for raw in &["abc", "1-2-3", "//", "--", "%", "1e", "-/-", "10 - x", "\u{2013}"] {
            let out = parse_values(raw);
            assert!(!out.is_empty(), "{:?}", raw);
        }
        assert_eq!(parse_values("1-2-3"), vec![Text("1-2-3".into())]);
        assert_eq!(parse_values("a / b"), vec![Text("a / b".into())]);
        assert_eq!(parse_values("inf"), vec![Text("inf".into())]);
    }

    #[test]
    fn mixed_separators_are_kept_verbatim() {
        assert_eq!(parse_values("10/-5"), vec![Text("10/-5".into())]);
        assert_eq!(parse_values(" 10-20/30 "), vec![Text("10-20/30".into())]);
        assert_eq!(parse_numbers("10-20/30"), None);
    }

    #[test]
    fn fitting() {
        assert_eq!(fit_levels(vec![5.0], 4), vec![5.0; 4]);
        assert_eq!(fit_levels(vec![1.0, 2.0, 3.0, 4.0, 5.0], 3), vec![1.0, 2.0, 3.0]);
        assert_eq!(fit_levels(vec![1.0, 2.0], 4), vec![1.0, 2.0, 2.0, 2.0]);
        assert!(fit_levels(Vec::<f64>::new(), 4).is_empty());
    }
}
