//! DHCP options as defined in RFC 2132.
//!
//! DHCP uses options to convey configuration parameters between servers and clients.
//! Each option has a code (1 byte), length (1 byte), and variable-length data.
//!
//! A [`DhcpOption`] stores the raw value bytes. Typed views are validated
//! against the format the [registry](crate::registry) assigns to the code, so
//! reading a lease time as an address is a programming error
//! ([`Error::InvalidArgument`]) while a lease time of three bytes is bad data
//! ([`Error::MalformedValue`]).
//!
//! # References
//!
//! - RFC 2132: DHCP Options and BOOTP Vendor Extensions

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::convert;
use crate::error::{Error, Result};
use crate::packet::DhcpPacket;
use crate::registry::{self, END, OptionFormat, PAD};

/// Largest value that fits the one-byte length field of an option.
pub const MAX_OPTION_LENGTH: usize = 255;

/// DHCP message types (Option 53) as defined in RFC 2132 §9.6.
///
/// These values indicate the purpose of a DHCP message in the protocol exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Client broadcast to locate servers.
    Discover = 1,
    /// Server response to DISCOVER with IP offer.
    Offer = 2,
    /// Client request for offered parameters.
    Request = 3,
    /// Client indicates address is already in use.
    Decline = 4,
    /// Server acknowledgement with configuration.
    Ack = 5,
    /// Server negative acknowledgement.
    Nak = 6,
    /// Client releases IP address.
    Release = 7,
    /// Client requests config without IP allocation.
    Inform = 8,
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Discover),
            2 => Ok(Self::Offer),
            3 => Ok(Self::Request),
            4 => Ok(Self::Decline),
            5 => Ok(Self::Ack),
            6 => Ok(Self::Nak),
            7 => Ok(Self::Release),
            8 => Ok(Self::Inform),
            other => Err(other),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discover => write!(f, "DISCOVER"),
            Self::Offer => write!(f, "OFFER"),
            Self::Request => write!(f, "REQUEST"),
            Self::Decline => write!(f, "DECLINE"),
            Self::Ack => write!(f, "ACK"),
            Self::Nak => write!(f, "NAK"),
            Self::Release => write!(f, "RELEASE"),
            Self::Inform => write!(f, "INFORM"),
        }
    }
}

/// A single DHCP option: code, raw value and the mirror flag.
///
/// The code is never [`PAD`] or [`END`]. A mirror option, when applied to a
/// response with [`apply_option`](Self::apply_option), is replaced by the
/// client's own value for the same code if the request carried one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DhcpOption {
    code: u8,
    value: Vec<u8>,
    mirror: bool,
}

impl DhcpOption {
    /// Creates an option from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `code` is 0 or 255, or if the
    /// value is longer than 255 bytes.
    pub fn new(code: u8, value: impl Into<Vec<u8>>) -> Result<Self> {
        Self::with_mirror(code, value, false)
    }

    /// Creates an option with an explicit mirror flag.
    pub fn with_mirror(code: u8, value: impl Into<Vec<u8>>, mirror: bool) -> Result<Self> {
        check_code(code)?;
        let value = value.into();
        if value.len() > MAX_OPTION_LENGTH {
            return Err(Error::InvalidArgument(format!(
                "Option {} value is {} bytes (maximum {})",
                code,
                value.len(),
                MAX_OPTION_LENGTH
            )));
        }
        Ok(Self {
            code,
            value,
            mirror,
        })
    }

    /// Builds an option without the length ceiling.
    ///
    /// The parser never produces values over 255 bytes, so this only matters
    /// for callers assembling packets by hand; such options are refused when
    /// the packet is serialized.
    pub fn new_unchecked_length(code: u8, value: Vec<u8>) -> Result<Self> {
        check_code(code)?;
        Ok(Self {
            code,
            value,
            mirror: false,
        })
    }

    /// Infallible constructor for a registered code and a value already known
    /// to fit the length field.
    pub(crate) fn registered(code: registry::OptionCode, value: Vec<u8>) -> Self {
        debug_assert!(value.len() <= MAX_OPTION_LENGTH);
        Self {
            code: code as u8,
            value,
            mirror: false,
        }
    }

    pub fn new_as_byte(code: u8, value: u8) -> Result<Self> {
        check_format(code, OptionFormat::Byte)?;
        Self::new(code, vec![value])
    }

    pub fn new_as_short(code: u8, value: u16) -> Result<Self> {
        check_format(code, OptionFormat::Short)?;
        Self::new(code, convert::short_to_bytes(value))
    }

    pub fn new_as_shorts(code: u8, values: &[u16]) -> Result<Self> {
        check_format(code, OptionFormat::ShortList)?;
        Self::new(code, convert::shorts_to_bytes(values))
    }

    pub fn new_as_int(code: u8, value: i32) -> Result<Self> {
        check_format(code, OptionFormat::Int)?;
        Self::new(code, convert::int_to_bytes(value))
    }

    /// Encodes a single address option.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `code` is not an address option or the
    /// address is not IPv4.
    pub fn new_as_inet_addr(code: u8, addr: IpAddr) -> Result<Self> {
        check_format(code, OptionFormat::Inet)?;
        Self::new(code, convert::inet_to_bytes(addr)?)
    }

    pub fn new_as_inet_addrs(code: u8, addrs: &[IpAddr]) -> Result<Self> {
        check_format(code, OptionFormat::InetList)?;
        Self::new(code, convert::inets_to_bytes(addrs)?)
    }

    pub fn new_as_string(code: u8, value: &str) -> Result<Self> {
        check_format(code, OptionFormat::String)?;
        Self::new(code, convert::string_to_bytes(value))
    }

    pub fn new_as_bytes(code: u8, value: &[u8]) -> Result<Self> {
        check_format(code, OptionFormat::ByteList)?;
        Self::new(code, value)
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    /// Raw value bytes, as carried on the wire.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    pub fn is_mirror(&self) -> bool {
        self.mirror
    }

    /// Returns a copy of this option with the mirror flag set to `mirror`.
    pub fn mirrored(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn as_byte(&self) -> Result<u8> {
        let bytes = self.checked_value(OptionFormat::Byte)?;
        Ok(bytes[0])
    }

    pub fn as_short(&self) -> Result<u16> {
        let bytes = self.checked_value(OptionFormat::Short)?;
        Ok(convert::bytes_to_short([bytes[0], bytes[1]]))
    }

    pub fn as_shorts(&self) -> Result<Vec<u16>> {
        let bytes = self.checked_value(OptionFormat::ShortList)?;
        Ok(convert::bytes_to_shorts(bytes))
    }

    pub fn as_int(&self) -> Result<i32> {
        let bytes = self.checked_value(OptionFormat::Int)?;
        Ok(convert::bytes_to_int([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn as_inet_addr(&self) -> Result<Ipv4Addr> {
        let bytes = self.checked_value(OptionFormat::Inet)?;
        Ok(convert::bytes_to_inet([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn as_inet_addrs(&self) -> Result<Vec<Ipv4Addr>> {
        let bytes = self.checked_value(OptionFormat::InetList)?;
        Ok(convert::bytes_to_inets(bytes))
    }

    pub fn as_string(&self) -> Result<String> {
        let bytes = self.checked_value(OptionFormat::String)?;
        Ok(convert::bytes_to_string(bytes))
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        self.checked_value(OptionFormat::ByteList)
    }

    /// Resolves this option against a client request.
    ///
    /// Non-mirror options resolve to themselves. A mirror option resolves to
    /// the request's option with the same code when present, otherwise to
    /// itself (the configured default).
    pub fn apply_option(&self, request: &DhcpPacket) -> DhcpOption {
        if self.mirror
            && let Some(requested) = request.option(self.code)
        {
            return requested.clone();
        }
        self.clone()
    }

    fn checked_value(&self, format: OptionFormat) -> Result<&[u8]> {
        check_format(self.code, format)?;

        let unit = format.unit_size();
        let len = self.value.len();
        let well_formed = if format.is_scalar() {
            len == unit
        } else {
            len.is_multiple_of(unit)
        };

        if !well_formed {
            return Err(Error::MalformedValue {
                code: self.code,
                reason: format!("{} bytes is not a valid {} value", len, format),
            });
        }

        Ok(&self.value)
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = match registry::format_of(self.code) {
            Some(OptionFormat::Inet) => self.as_inet_addr().map(|addr| addr.to_string()),
            Some(OptionFormat::InetList) => self.as_inet_addrs().map(|addrs| join(&addrs)),
            Some(OptionFormat::Int) => self.as_int().map(|value| value.to_string()),
            Some(OptionFormat::Short) => self.as_short().map(|value| value.to_string()),
            Some(OptionFormat::ShortList) => self.as_shorts().map(|values| join(&values)),
            Some(OptionFormat::Byte) => self.as_byte().map(|value| self.describe_byte(value)),
            Some(OptionFormat::String) => self.as_string().map(|value| format!("{:?}", value)),
            Some(OptionFormat::ByteList) | None => Ok(convert::bytes_to_hex(&self.value)),
        };

        match rendered {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "<malformed {}>", convert::bytes_to_hex(&self.value)),
        }
    }

    fn describe_byte(&self, value: u8) -> String {
        if self.code == registry::OptionCode::MessageType as u8
            && let Ok(message_type) = MessageType::try_from(value)
        {
            return format!("{}({})", message_type, value);
        }
        value.to_string()
    }
}

impl fmt::Display for DhcpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match registry::name_of(self.code) {
            Some(name) => write!(f, "{}({})=", name, self.code)?,
            None => write!(f, "unknown-{}({})=", self.code, self.code)?,
        }
        self.fmt_value(f)?;
        if self.mirror {
            f.write_str(" [mirror]")?;
        }
        Ok(())
    }
}

impl From<MessageType> for DhcpOption {
    fn from(message_type: MessageType) -> Self {
        Self::registered(registry::OptionCode::MessageType, vec![message_type as u8])
    }
}

fn check_code(code: u8) -> Result<()> {
    if code == PAD || code == END {
        return Err(Error::InvalidArgument(format!(
            "Option code {} is reserved for PAD/END",
            code
        )));
    }
    Ok(())
}

pub(crate) fn check_format(code: u8, format: OptionFormat) -> Result<()> {
    match registry::format_of(code) {
        Some(registered) if registered == format => Ok(()),
        Some(registered) => Err(Error::InvalidArgument(format!(
            "Option {} is {}, not {}",
            code, registered, format
        ))),
        None => Err(Error::InvalidArgument(format!(
            "Option {} has no registered format",
            code
        ))),
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OptionCode;

    #[test]
    fn test_message_type_conversions() {
        for value in 1..=8u8 {
            let msg_type = MessageType::try_from(value).unwrap();
            assert_eq!(msg_type as u8, value);
        }
        assert!(MessageType::try_from(0).is_err());
        assert!(MessageType::try_from(9).is_err());
    }

    #[test]
    fn test_reserved_codes_rejected() {
        assert!(matches!(
            DhcpOption::new(PAD, vec![1]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            DhcpOption::new(END, Vec::new()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(DhcpOption::new_unchecked_length(END, vec![0; 300]).is_err());
    }

    #[test]
    fn test_value_length_ceiling() {
        assert!(DhcpOption::new(200, vec![0; 255]).is_ok());
        assert!(matches!(
            DhcpOption::new(200, vec![0; 256]),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            DhcpOption::new_unchecked_length(200, vec![0; 256])
                .unwrap()
                .len(),
            256
        );
    }

    #[test]
    fn test_empty_value_is_present() {
        let option = DhcpOption::new(OptionCode::ParameterRequestList as u8, Vec::new()).unwrap();
        assert!(option.is_empty());
        assert_eq!(option.as_bytes().unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_typed_constructors_and_accessors() {
        let lease = DhcpOption::new_as_int(OptionCode::LeaseTime as u8, 86400).unwrap();
        assert_eq!(lease.value(), &[0, 1, 0x51, 0x80]);
        assert_eq!(lease.as_int().unwrap(), 86400);

        let mtu = DhcpOption::new_as_short(OptionCode::InterfaceMtu as u8, 1500).unwrap();
        assert_eq!(mtu.as_short().unwrap(), 1500);

        let kind = DhcpOption::new_as_byte(OptionCode::MessageType as u8, 1).unwrap();
        assert_eq!(kind.as_byte().unwrap(), 1);

        let mask = DhcpOption::new_as_inet_addr(
            OptionCode::SubnetMask as u8,
            IpAddr::V4(Ipv4Addr::new(255, 255, 255, 0)),
        )
        .unwrap();
        assert_eq!(mask.as_inet_addr().unwrap(), Ipv4Addr::new(255, 255, 255, 0));

        let routes = DhcpOption::new_as_inet_addrs(
            OptionCode::StaticRoutes as u8,
            &[
                IpAddr::V4(Ipv4Addr::new(22, 33, 44, 55)),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 254)),
            ],
        )
        .unwrap();
        assert_eq!(routes.as_inet_addrs().unwrap().len(), 2);

        let host = DhcpOption::new_as_string(OptionCode::HostName as u8, "pc-17").unwrap();
        assert_eq!(host.as_string().unwrap(), "pc-17");

        let plateau =
            DhcpOption::new_as_shorts(OptionCode::PathMtuPlateauTable as u8, &[68, 296]).unwrap();
        assert_eq!(plateau.as_shorts().unwrap(), vec![68, 296]);
    }

    #[test]
    fn test_wrong_format_is_invalid_argument() {
        let lease = DhcpOption::new_as_int(OptionCode::LeaseTime as u8, 60).unwrap();
        assert!(matches!(lease.as_inet_addr(), Err(Error::InvalidArgument(_))));
        assert!(matches!(lease.as_short(), Err(Error::InvalidArgument(_))));

        assert!(matches!(
            DhcpOption::new_as_int(OptionCode::SubnetMask as u8, 1),
            Err(Error::InvalidArgument(_))
        ));

        let unknown = DhcpOption::new(200, vec![1, 2, 3, 4]).unwrap();
        assert!(matches!(unknown.as_int(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_bad_length_is_malformed_value() {
        let lease = DhcpOption::new(OptionCode::LeaseTime as u8, vec![0, 0, 0]).unwrap();
        assert!(matches!(
            lease.as_int(),
            Err(Error::MalformedValue { code: 51, .. })
        ));

        let routers = DhcpOption::new(OptionCode::Routers as u8, vec![10, 0, 0, 1, 10]).unwrap();
        assert!(matches!(
            routers.as_inet_addrs(),
            Err(Error::MalformedValue { .. })
        ));

        let kind = DhcpOption::new(OptionCode::MessageType as u8, Vec::new()).unwrap();
        assert!(kind.as_byte().is_err());

        let host = DhcpOption::new(OptionCode::HostName as u8, Vec::new()).unwrap();
        assert_eq!(host.as_string().unwrap(), "");
    }

    #[test]
    fn test_ipv6_rejected_by_inet_constructor() {
        let result = DhcpOption::new_as_inet_addr(
            OptionCode::ServerIdentifier as u8,
            IpAddr::V6(std::net::Ipv6Addr::LOCALHOST),
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_mirror_applies_request_value() {
        let code = OptionCode::HostName as u8;
        let default = DhcpOption::new_as_string(code, "default")
            .unwrap()
            .mirrored(true);

        let mut request = DhcpPacket::new();
        assert_eq!(default.apply_option(&request), default);

        request.set_option_as_string(code, "client-host").unwrap();
        let applied = default.apply_option(&request);
        assert_eq!(Some(&applied), request.option(code));
        assert!(!applied.is_mirror());
    }

    #[test]
    fn test_non_mirror_ignores_request() {
        let code = OptionCode::HostName as u8;
        let fixed = DhcpOption::new_as_string(code, "fixed").unwrap();
        let mut request = DhcpPacket::new();
        request.set_option_as_string(code, "client-host").unwrap();
        assert_eq!(fixed.apply_option(&request), fixed);
    }

    #[test]
    fn test_equality_includes_mirror_flag() {
        let plain = DhcpOption::new(200, vec![1]).unwrap();
        let mirror = plain.clone().mirrored(true);
        assert_ne!(plain, mirror);
        assert_eq!(plain, DhcpOption::new(200, vec![1]).unwrap());
    }

    #[test]
    fn test_display() {
        let lease = DhcpOption::new_as_int(OptionCode::LeaseTime as u8, 86400).unwrap();
        assert_eq!(lease.to_string(), "dhcp-lease-time(51)=86400");

        let kind = DhcpOption::new_as_byte(OptionCode::MessageType as u8, 1).unwrap();
        assert_eq!(kind.to_string(), "dhcp-message-type(53)=DISCOVER(1)");

        let unknown = DhcpOption::new(200, vec![0xde, 0xad]).unwrap().mirrored(true);
        assert_eq!(unknown.to_string(), "unknown-200(200)=0xdead [mirror]");

        let broken = DhcpOption::new(OptionCode::SubnetMask as u8, vec![255]).unwrap();
        assert_eq!(broken.to_string(), "subnet-mask(1)=<malformed 0xff>");
    }

    #[test]
    fn test_message_type_display() {
        assert_eq!(format!("{}", MessageType::Discover), "DISCOVER");
        assert_eq!(format!("{}", MessageType::Offer), "OFFER");
        assert_eq!(format!("{}", MessageType::Request), "REQUEST");
        assert_eq!(format!("{}", MessageType::Decline), "DECLINE");
        assert_eq!(format!("{}", MessageType::Ack), "ACK");
        assert_eq!(format!("{}", MessageType::Nak), "NAK");
        assert_eq!(format!("{}", MessageType::Release), "RELEASE");
        assert_eq!(format!("{}", MessageType::Inform), "INFORM");
    }
}
