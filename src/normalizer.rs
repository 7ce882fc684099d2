//! DICOFRE code normalization.
//!
//! Source spreadsheets frequently store codes as numbers, which drops the leading
//! zero of districts `01`..`09`. Codes one character short of their canonical width
//! regain that zero; codes of any other length pass through untouched.

/// Normalizes a raw code to `width` characters.
///
/// Returns `None` when the trimmed code is empty. A code of exactly `width - 1`
/// characters is left-padded with a single `0`; every other length is returned
/// unchanged.
pub fn normalize(raw: &str, width: usize) -> Option<String> {
    let code = raw.trim();
    if code.is_empty() {
        return None;
    }

    if code.chars().count() + 1 == width {
        Some(format!("0{code}"))
    } else {
        Some(code.to_string())
    }
}

/// Returns the first `parent_width` characters of `code`, or an empty string
/// when the code is shorter than that.
pub fn parent_code(code: &str, parent_width: usize) -> String {
    if code.chars().count() < parent_width {
        return String::new();
    }
    code.chars().take(parent_width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_code_one_short() {
        assert_eq!(normalize("1", 2).as_deref(), Some("01"));
        assert_eq!(normalize("106", 4).as_deref(), Some("0106"));
        assert_eq!(normalize("10601", 6).as_deref(), Some("010601"));
    }

    #[test]
    fn keeps_code_at_width() {
        assert_eq!(normalize("11", 2).as_deref(), Some("11"));
        assert_eq!(normalize("1106", 4).as_deref(), Some("1106"));
        assert_eq!(normalize("110601", 6).as_deref(), Some("110601"));
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(normalize("", 4), None);
        assert_eq!(normalize("   ", 4), None);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize(" 106 ", 4).as_deref(), Some("0106"));
    }

    #[test]
    fn unexpected_lengths_pass_through() {
        assert_eq!(normalize("6", 4).as_deref(), Some("6"));
        assert_eq!(normalize("11060", 4).as_deref(), Some("11060"));
        assert_eq!(normalize("1106011", 6).as_deref(), Some("1106011"));
    }

    #[test]
    fn normalization_is_idempotent() {
        for (raw, width) in [("1", 2), ("106", 4), ("1106", 4), ("10601", 6), ("42", 6)] {
            let once = normalize(raw, width).unwrap();
            let twice = normalize(&once, width).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn parent_code_takes_prefix() {
        assert_eq!(parent_code("1106", 2), "11");
        assert_eq!(parent_code("110601", 4), "1106");
        assert_eq!(parent_code("0106", 2), "01");
    }

    #[test]
    fn parent_code_empty_when_too_short() {
        assert_eq!(parent_code("6", 2), "");
        assert_eq!(parent_code("110", 4), "");
        assert_eq!(parent_code("11", 2), "11");
    }
}
