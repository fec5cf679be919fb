//! Format-preserving token replacement.
//!
//! A token's literal text is split into a marker prefix, an alphanumeric core
//! and a marker suffix:
//!
//! ```text
//! (30)     ->  "("  "30"       ")"
//! N.       ->  ""   "N"        "."
//! 4°       ->  ""   "4"        "°"
//! 1,638.5  ->  ""   "1,638.5"  ""
//! ```
//!
//! Replacing the token keeps the prefix and suffix unless the new value brings
//! its own, and regroups bare digits into thousands when the old core was
//! grouped. This is a heuristic layer: values that do not look like the token
//! they replace are inserted as typed.

/// Replace `original` with `new_value`, carrying over the formatting markers
/// around `original`.
///
/// An empty `new_value` yields an empty string.
pub fn replace_preserving_format(original: &str, new_value: &str) -> String {
    if new_value.is_empty() {
        return String::new();
    }
    let old = FormattedToken::split(original);
    let new = FormattedToken::split(new_value);
    if new.core.is_empty() {
        return new_value.to_string();
    }

    let core = if old.has_digit_grouping() {
        group_thousands(new.core).unwrap_or_else(|| new.core.to_string())
    } else {
        new.core.to_string()
    };

    let prefix = if new.prefix.is_empty() { old.prefix } else { new.prefix };
    let suffix = if new.suffix.is_empty() { old.suffix } else { new.suffix };
    format!("{}{}{}", prefix, core, suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormattedToken<'a> {
    prefix: &'a str,
    core: &'a str,
    suffix: &'a str,
}

impl<'a> FormattedToken<'a> {
    fn split(text: &'a str) -> Self {
        let start = text.find(char::is_alphanumeric);
        let end = text
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_alphanumeric())
            .map(|(i, c)| i + c.len_utf8());
        match (start, end) {
            (Some(start), Some(end)) => FormattedToken {
                prefix: &text[..start],
                core: &text[start..end],
                suffix: &text[end..],
            },
            _ => FormattedToken {
                prefix: text,
                core: "",
                suffix: "",
            },
        }
    }

    fn has_digit_grouping(&self) -> bool {
        let chars: Vec<char> = self.core.chars().collect();
        chars
            .windows(3)
            .any(|w| w[0].is_ascii_digit() && w[1] == ',' && w[2].is_ascii_digit())
    }
}

/// `1638` -> `1,638`, `2000.25` -> `2,000.25`. `None` unless `core` is bare
/// digits with an optional decimal part and more than three integer digits.
fn group_thousands(core: &str) -> Option<String> {
    let (integer, fraction) = match core.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (core, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(integer) || integer.len() <= 3 || !fraction.map_or(true, all_digits) {
        return None;
    }

    let mut grouped = String::with_capacity(core.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    Some(grouped)
}
