use regex::Regex;
use std::sync::OnceLock;

/// Digit runs, including the full-width digits used in Japanese price labels
fn digit_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9０-９]+").expect("valid digit pattern"))
}

/// Parse a digit run into an integer, mapping full-width digits to ASCII.
/// Runs that overflow `u64` are not treated as integers.
fn parse_digits(run: &str) -> Option<u64> {
    let ascii: String = run
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            other => other,
        })
        .collect();

    ascii.parse().ok()
}

/// Extract a `(min, max)` price bound from a free-text descriptor
///
/// Takes the first two integers in left-to-right order, so `"3000〜5000円"`
/// yields `(Some(3000), Some(5000))`. Fewer than two integers yields
/// `(None, None)`.
pub fn parse_price_range(text: &str) -> (Option<u64>, Option<u64>) {
    let mut numbers = digit_runs()
        .find_iter(text)
        .filter_map(|m| parse_digits(m.as_str()));

    match (numbers.next(), numbers.next()) {
        (Some(min), Some(max)) => (Some(min), Some(max)),
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hyphen_range() {
        assert_eq!(parse_price_range("3000-5000円"), (Some(3000), Some(5000)));
        assert_eq!(parse_price_range("1000-2000円"), (Some(1000), Some(2000)));
    }

    #[test]
    fn test_parse_wave_dash_range() {
        assert_eq!(parse_price_range("3000〜5000円"), (Some(3000), Some(5000)));
    }

    #[test]
    fn test_parse_full_width_digits() {
        assert_eq!(parse_price_range("３０００～５０００円"), (Some(3000), Some(5000)));
    }

    #[test]
    fn test_parse_takes_first_two_integers() {
        assert_eq!(parse_price_range("720ml 1500 / 1800ml 3000"), (Some(720), Some(1500)));
    }

    #[test]
    fn test_parse_requires_two_integers() {
        assert_eq!(parse_price_range(""), (None, None));
        assert_eq!(parse_price_range("no numbers"), (None, None));
        assert_eq!(parse_price_range("about 3000円"), (None, None));
    }

    #[test]
    fn test_parse_skips_overflowing_runs() {
        assert_eq!(
            parse_price_range("99999999999999999999999 100-200"),
            (Some(100), Some(200))
        );
    }
}
