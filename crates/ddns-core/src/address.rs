//! Parsing of IP-echo responses
//!
//! Shared by every [`AddressResolver`](crate::traits::AddressResolver)
//! implementation so that all of them agree on what a valid answer is.

use crate::error::{Error, Result};
use crate::traits::AddressFamily;
use std::net::IpAddr;

/// Longest first line an IP-echo answer may have.
///
/// The longest textual IPv6 address is 45 bytes; anything past this is not
/// an address and readers may stop buffering here.
pub const MAX_LINE_LEN: usize = 128;

/// Parse the first line of an IP-echo response body.
///
/// Only the bytes before the first `\n` are looked at. Surrounding
/// whitespace (including a trailing `\r`) is ignored.
///
/// # Errors
///
/// - [`Error::Protocol`]: the body is empty or the line is not UTF-8
/// - [`Error::Parse`]: the line is not an IP address literal
/// - [`Error::FamilyMismatch`]: the address is not of `family`
pub fn parse_address(body: &[u8], family: AddressFamily) -> Result<IpAddr> {
    if body.is_empty() {
        return Err(Error::protocol("no output from the IP provider"));
    }

    let line = match body.iter().position(|&b| b == b'\n') {
        Some(end) => &body[..end],
        None => body,
    };

    let text = std::str::from_utf8(line)
        .map_err(|e| Error::protocol(format!("unreadable response from the IP provider: {e}")))?
        .trim();

    let ip: IpAddr = text.parse().map_err(|e: std::net::AddrParseError| Error::Parse {
        input: text.to_string(),
        reason: e.to_string(),
    })?;

    if !family.matches(&ip) {
        return Err(Error::FamilyMismatch {
            family,
            address: ip,
        });
    }

    Ok(ip)
}
