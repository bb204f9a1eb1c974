//! Panel command set parsed from framed payloads
//!
//! Commands are ASCII: a single selector letter followed by decimal
//! arguments. The framing layer has already stripped the address and
//! terminator; this module only interprets the payload.
//!
//! ```text
//! p<n>        select pattern n
//! c<r>,<g>,<b> solid color
//! b<n>        brightness cap (0-255)
//! a<n>        assign a new bus address
//! v           identification query (custom response)
//! s           status counters query (custom response)
//! ```

use crate::parse::leading_number;

/// A command addressed to this panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelCommand {
    /// Select an animation pattern by index
    SetPattern(u8),
    /// Show a single color across the panel
    SetColor { r: u8, g: u8, b: u8 },
    /// Cap pattern brightness
    SetBrightness(u8),
    /// Persist a new bus address
    SetAddress(u8),
    /// Identification query
    Ident,
    /// Status counters query
    Status,
}

/// Errors from command parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Empty payload
    Empty,
    /// Unrecognized selector letter
    Unknown(u8),
    /// Missing, malformed, or out-of-range argument
    BadArgument,
}

/// Parse one framed payload into a command
pub fn parse_command(payload: &[u8]) -> Result<PanelCommand, CommandError> {
    let (&selector, tail) = payload.split_first().ok_or(CommandError::Empty)?;
    match selector {
        b'p' => {
            let n = byte_arg(tail)?;
            Ok(PanelCommand::SetPattern(n))
        }
        b'c' => {
            let (r, tail) = comma_arg(tail, false)?;
            let (g, tail) = comma_arg(tail, false)?;
            let (b, tail) = comma_arg(tail, true)?;
            if !tail.is_empty() {
                return Err(CommandError::BadArgument);
            }
            Ok(PanelCommand::SetColor { r, g, b })
        }
        b'b' => {
            let n = byte_arg(tail)?;
            Ok(PanelCommand::SetBrightness(n))
        }
        b'a' => {
            let n = byte_arg(tail)?;
            Ok(PanelCommand::SetAddress(n))
        }
        b'v' if tail.is_empty() => Ok(PanelCommand::Ident),
        b's' if tail.is_empty() => Ok(PanelCommand::Status),
        other => Err(CommandError::Unknown(other)),
    }
}

/// One whole-tail numeric argument in 0..=255
fn byte_arg(tail: &[u8]) -> Result<u8, CommandError> {
    match leading_number(tail) {
        (Some(n), rest) if rest.is_empty() && n <= u8::MAX as u32 => Ok(n as u8),
        _ => Err(CommandError::BadArgument),
    }
}

/// One comma-separated numeric argument in 0..=255
///
/// A non-final argument must be followed by a comma, which is consumed.
fn comma_arg(tail: &[u8], last: bool) -> Result<(u8, &[u8]), CommandError> {
    let (value, rest) = leading_number(tail);
    let value = match value {
        Some(n) if n <= u8::MAX as u32 => n as u8,
        _ => return Err(CommandError::BadArgument),
    };
    if last {
        return Ok((value, rest));
    }
    match rest.split_first() {
        Some((b',', after)) => Ok((value, after)),
        _ => Err(CommandError::BadArgument),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_select() {
        assert_eq!(parse_command(b"p2"), Ok(PanelCommand::SetPattern(2)));
        assert_eq!(parse_command(b"p"), Err(CommandError::BadArgument));
        assert_eq!(parse_command(b"p300"), Err(CommandError::BadArgument));
    }

    #[test]
    fn test_color() {
        assert_eq!(
            parse_command(b"c255,0,10"),
            Ok(PanelCommand::SetColor { r: 255, g: 0, b: 10 })
        );
        assert_eq!(parse_command(b"c255,0"), Err(CommandError::BadArgument));
        assert_eq!(parse_command(b"c1,2,3,4"), Err(CommandError::BadArgument));
        assert_eq!(parse_command(b"c256,0,0"), Err(CommandError::BadArgument));
    }

    #[test]
    fn test_address_assignment() {
        assert_eq!(parse_command(b"a18"), Ok(PanelCommand::SetAddress(18)));
        // Zero parses here; the address store rejects it with its own
        // distinguished failure.
        assert_eq!(parse_command(b"a0"), Ok(PanelCommand::SetAddress(0)));
    }

    #[test]
    fn test_queries_take_no_arguments() {
        assert_eq!(parse_command(b"v"), Ok(PanelCommand::Ident));
        assert_eq!(parse_command(b"s"), Ok(PanelCommand::Status));
        assert_eq!(parse_command(b"v1"), Err(CommandError::Unknown(b'v')));
    }

    #[test]
    fn test_rejects() {
        assert_eq!(parse_command(b""), Err(CommandError::Empty));
        assert_eq!(parse_command(b"z9"), Err(CommandError::Unknown(b'z')));
        assert_eq!(parse_command(b"bx"), Err(CommandError::BadArgument));
    }
}
