//! Conversions between big-endian wire bytes and typed values.
//!
//! Everything here is pure. Length checks against an option's registered
//! format happen in [`crate::options`]; these helpers assume the caller
//! already knows the slice has the right shape and otherwise use only the
//! complete units present.

use std::net::{IpAddr, Ipv4Addr};

use crate::error::{Error, Result};

pub fn short_to_bytes(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

pub fn bytes_to_short(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

pub fn int_to_bytes(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

pub fn bytes_to_int(bytes: [u8; 4]) -> i32 {
    i32::from_be_bytes(bytes)
}

/// Encodes an address as four octets.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for IPv6 addresses.
pub fn inet_to_bytes(addr: IpAddr) -> Result<[u8; 4]> {
    match addr {
        IpAddr::V4(v4) => Ok(v4.octets()),
        IpAddr::V6(v6) => Err(Error::InvalidArgument(format!(
            "{} is not an IPv4 address",
            v6
        ))),
    }
}

pub fn bytes_to_inet(bytes: [u8; 4]) -> Ipv4Addr {
    Ipv4Addr::from(bytes)
}

pub fn inets_to_bytes(addrs: &[IpAddr]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(addrs.len() * 4);
    for addr in addrs {
        result.extend_from_slice(&inet_to_bytes(*addr)?);
    }
    Ok(result)
}

pub fn bytes_to_inets(bytes: &[u8]) -> Vec<Ipv4Addr> {
    bytes
        .chunks_exact(4)
        .map(|chunk| Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]))
        .collect()
}

pub fn shorts_to_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_be_bytes()).collect()
}

pub fn bytes_to_shorts(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect()
}

/// Maps each character to exactly one byte (its low eight bits).
pub fn string_to_bytes(value: &str) -> Vec<u8> {
    value.chars().map(|c| c as u32 as u8).collect()
}

/// Maps each byte to the character with the same code point.
pub fn bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Decodes a NUL-padded fixed-width field.
///
/// Stops at the first zero byte or after `max_len` bytes, whichever comes first.
pub fn fixed_field_to_string(bytes: &[u8], max_len: usize) -> String {
    let limit = bytes.len().min(max_len);
    let end = bytes[..limit]
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(limit);
    bytes_to_string(&bytes[..end])
}

/// Encodes a string into a NUL-padded fixed-width field.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the encoded string is wider than `N`.
pub fn string_to_fixed_field<const N: usize>(value: &str) -> Result<[u8; N]> {
    let bytes = string_to_bytes(value);
    if bytes.len() > N {
        return Err(Error::InvalidArgument(format!(
            "String of {} bytes does not fit a {}-byte field",
            bytes.len(),
            N
        )));
    }
    let mut field = [0u8; N];
    field[..bytes.len()].copy_from_slice(&bytes);
    Ok(field)
}

/// Decodes a hex string such as `"0a0b0c"` or `"0x0a0b0c"`.
///
/// ASCII whitespace and `:` separators are ignored.
pub fn hex_to_bytes(text: &str) -> Result<Vec<u8>> {
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let digits: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':')
        .collect();

    hex::decode(&digits)
        .map_err(|error| Error::InvalidArgument(format!("Invalid hex string: {}", error)))
}

/// Renders bytes as `0x`-prefixed lowercase hex.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn test_int_is_big_endian_twos_complement() {
        assert_eq!(int_to_bytes(86400), [0, 1, 0x51, 0x80]);
        assert_eq!(int_to_bytes(-1), [0xff; 4]);
        assert_eq!(bytes_to_int([0xff, 0xff, 0xff, 0xfe]), -2);
        assert_eq!(bytes_to_short([0x05, 0xdc]), 1500);
        assert_eq!(short_to_bytes(576), [0x02, 0x40]);
    }

    #[test]
    fn test_inet_rejects_ipv6() {
        let v4 = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 254));
        assert_eq!(inet_to_bytes(v4).unwrap(), [10, 0, 0, 254]);

        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);
        assert!(matches!(inet_to_bytes(v6), Err(Error::InvalidArgument(_))));
        assert!(inets_to_bytes(&[v4, v6]).is_err());
    }

    #[test]
    fn test_address_lists() {
        let bytes = [22, 33, 44, 55, 10, 0, 0, 254];
        let addrs = bytes_to_inets(&bytes);
        assert_eq!(
            addrs,
            vec![Ipv4Addr::new(22, 33, 44, 55), Ipv4Addr::new(10, 0, 0, 254)]
        );

        let ips: Vec<IpAddr> = addrs.into_iter().map(IpAddr::V4).collect();
        assert_eq!(inets_to_bytes(&ips).unwrap(), bytes);
    }

    #[test]
    fn test_short_lists() {
        assert_eq!(shorts_to_bytes(&[68, 296]), vec![0, 68, 1, 40]);
        assert_eq!(bytes_to_shorts(&[0, 68, 1, 40]), vec![68, 296]);
    }

    #[test]
    fn test_string_is_one_byte_per_char() {
        assert_eq!(string_to_bytes("pxe"), b"pxe".to_vec());
        assert_eq!(string_to_bytes("\u{e9}"), vec![0xe9]);
        assert_eq!(bytes_to_string(&[0x68, 0xe9]), "h\u{e9}");
    }

    #[test]
    fn test_fixed_field_stops_at_nul_or_width() {
        assert_eq!(fixed_field_to_string(b"boot\0junk", 64), "boot");
        assert_eq!(fixed_field_to_string(b"abcdef", 3), "abc");
        assert_eq!(fixed_field_to_string(b"", 8), "");
    }

    #[test]
    fn test_hex_to_bytes() {
        assert_eq!(hex_to_bytes("0xdeadBEEF").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(hex_to_bytes("01:02 03").unwrap(), vec![1, 2, 3]);
        assert_eq!(hex_to_bytes("").unwrap(), Vec::<u8>::new());
        assert!(hex_to_bytes("abc").is_err());
        assert!(hex_to_bytes("zz").is_err());
    }

    #[test]
    fn test_bytes_to_hex() {
        assert_eq!(bytes_to_hex(&[0xca, 0xfe, 0x01]), "0xcafe01");
        assert_eq!(bytes_to_hex(&[]), "0x");
    }

    #[test]
    fn test_string_to_fixed_field() {
        let field: [u8; 8] = string_to_fixed_field("srv").unwrap();
        assert_eq!(&field, b"srv\0\0\0\0\0");

        assert!(string_to_fixed_field::<4>("too long").is_err());
        let exact: [u8; 4] = string_to_fixed_field("four").unwrap();
        assert_eq!(&exact, b"four");
    }
}
