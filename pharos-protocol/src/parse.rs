//! Helpers for application-level command parsers
//!
//! Commands on the bus are ASCII-oriented; arguments are runs of decimal
//! digits. These helpers advance a cursor over such a run so handlers
//! can peel arguments off a command tail without pointer arithmetic.

/// Split `input` at the end of its leading run of ASCII digits
///
/// Returns `(digits, rest)`; either part may be empty.
pub fn split_leading_digits(input: &[u8]) -> (&[u8], &[u8]) {
    let end = input
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(input.len());
    input.split_at(end)
}

/// Parse the leading run of ASCII digits as a number
///
/// Returns the value (saturating at `u32::MAX`) and the remaining tail,
/// or `None` for the value when `input` does not start with a digit.
pub fn leading_number(input: &[u8]) -> (Option<u32>, &[u8]) {
    let (digits, rest) = split_leading_digits(input);
    if digits.is_empty() {
        return (None, rest);
    }
    let mut value: u32 = 0;
    for &d in digits {
        value = value
            .saturating_mul(10)
            .saturating_add(u32::from(d - b'0'));
    }
    (Some(value), rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_advances_past_digits() {
        let (digits, rest) = split_leading_digits(b"1234abc");
        assert_eq!(digits, b"1234");
        assert_eq!(rest, b"abc");
    }

    #[test]
    fn test_split_no_digits() {
        let (digits, rest) = split_leading_digits(b"abc");
        assert_eq!(digits, b"");
        assert_eq!(rest, b"abc");
    }

    #[test]
    fn test_split_all_digits() {
        let (digits, rest) = split_leading_digits(b"42");
        assert_eq!(digits, b"42");
        assert_eq!(rest, b"");
    }

    #[test]
    fn test_split_empty() {
        let (digits, rest) = split_leading_digits(b"");
        assert_eq!(digits, b"");
        assert_eq!(rest, b"");
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number(b"255,0,10"), (Some(255), &b",0,10"[..]));
        assert_eq!(leading_number(b"x7"), (None, &b"x7"[..]));
        assert_eq!(leading_number(b"0"), (Some(0), &b""[..]));
    }

    #[test]
    fn test_leading_number_saturates() {
        let (value, rest) = leading_number(b"99999999999999999999");
        assert_eq!(value, Some(u32::MAX));
        assert_eq!(rest, b"");
    }
}
