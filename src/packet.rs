//! DHCP/BOOTP packet parsing and encoding per RFC 2131.
//!
//! A BOOTP packet is a fixed 236-byte header. A DHCP packet appends a 4-byte
//! magic cookie and a stream of TLV options terminated by an End marker.
//! Whatever follows the terminator is kept verbatim as padding.
//!
//! # Packet Structure
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     op (1)    |   htype (1)   |   hlen (1)    |   hops (1)    |
//! +---------------+---------------+---------------+---------------+
//! |                            xid (4)                            |
//! +-------------------------------+-------------------------------+
//! |           secs (2)            |           flags (2)           |
//! +-------------------------------+-------------------------------+
//! |                          ciaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          yiaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          siaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          giaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          chaddr (16)                          |
//! +---------------------------------------------------------------+
//! |                          sname (64)                           |
//! +---------------------------------------------------------------+
//! |                          file (128)                           |
//! +---------------------------------------------------------------+
//! |              magic cookie (4) = 99.130.83.99 (DHCP only)      |
//! +---------------------------------------------------------------+
//! |                 options (variable, DHCP only)                 |
//! +---------------------------------------------------------------+
//! |                      padding (variable)                       |
//! +---------------------------------------------------------------+
//! ```
//!
//! # References
//!
//! - RFC 951: Bootstrap Protocol
//! - RFC 2131: Dynamic Host Configuration Protocol

use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::convert;
use crate::error::{Error, Result};
use crate::options::{self, DhcpOption, MAX_OPTION_LENGTH, MessageType};
use crate::registry::{END, OptionCode, OptionFormat, PAD};

/// DHCP magic cookie that identifies DHCP packets (vs BOOTP).
pub const DHCP_MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

const DHCP_OP_HTYPE_HLEN_HOPS_SIZE: usize = 4;
const DHCP_XID_SIZE: usize = 4;
const DHCP_SECS_SIZE: usize = 2;
const DHCP_FLAGS_SIZE: usize = 2;
const DHCP_CIADDR_SIZE: usize = 4;
const DHCP_YIADDR_SIZE: usize = 4;
const DHCP_SIADDR_SIZE: usize = 4;
const DHCP_GIADDR_SIZE: usize = 4;
const DHCP_CHADDR_SIZE: usize = 16;
const DHCP_SNAME_SIZE: usize = 64;
const DHCP_FILE_SIZE: usize = 128;

const DHCP_CHADDR_OFFSET: usize = DHCP_OP_HTYPE_HLEN_HOPS_SIZE
    + DHCP_XID_SIZE
    + DHCP_SECS_SIZE
    + DHCP_FLAGS_SIZE
    + DHCP_CIADDR_SIZE
    + DHCP_YIADDR_SIZE
    + DHCP_SIADDR_SIZE
    + DHCP_GIADDR_SIZE;

const DHCP_SNAME_OFFSET: usize = DHCP_CHADDR_OFFSET + DHCP_CHADDR_SIZE;

const DHCP_FILE_OFFSET: usize = DHCP_SNAME_OFFSET + DHCP_SNAME_SIZE;

/// Size of the fixed BOOTP header, and the smallest packet accepted.
pub const BOOTP_HEADER_SIZE: usize = DHCP_FILE_OFFSET + DHCP_FILE_SIZE;

/// Default minimum size of a serialized DHCP packet.
///
/// DHCP requires packets to be at least 300 bytes for compatibility
/// with BOOTP relay agents (RFC 2131 §2).
pub const DHCP_MIN_PACKET_SIZE: usize = BOOTP_HEADER_SIZE + 64;

/// Default size hint for serialization.
///
/// 576 bytes is the minimum MTU that all hosts must accept per RFC 791.
pub const DHCP_DEFAULT_MAX_SIZE: usize = 576;

/// Absolute upper bound on a packet, parsed or serialized (Ethernet MTU).
pub const DHCP_MAX_PACKET_SIZE: usize = 1500;

/// BOOTP/DHCP operation code for client requests.
pub const BOOTREQUEST: u8 = 1;

/// BOOTP/DHCP operation code for server replies.
pub const BOOTREPLY: u8 = 2;

/// Hardware type for Ethernet (most common).
pub const HTYPE_ETHERNET: u8 = 1;

/// Hardware address length for Ethernet (6 bytes).
pub const HLEN_ETHERNET: u8 = 6;

/// A DHCP or BOOTP message.
///
/// Build one with [`new`](Self::new) (RFC 2131 reply defaults) or decode one
/// with [`parse`](Self::parse) / [`parse_from`](Self::parse_from), then turn
/// it back into bytes with [`serialize`](Self::serialize).
///
/// Options are kept in insertion order and keyed by code: setting a code that
/// is already present replaces its value in place.
///
/// Cloning yields an independent copy whose [`truncated`](Self::truncated)
/// flag is reset. Equality covers every field except that flag; the option
/// comparison is by code, independent of order.
#[derive(Debug)]
pub struct DhcpPacket {
    /// Operation code: [`BOOTREQUEST`] (1) or [`BOOTREPLY`] (2).
    pub op: u8,

    /// Hardware address type. [`HTYPE_ETHERNET`] (1) for Ethernet.
    pub htype: u8,

    /// Hardware address length. [`HLEN_ETHERNET`] (6) for Ethernet.
    pub hlen: u8,

    /// Hop count, incremented by relay agents.
    pub hops: u8,

    /// Transaction ID chosen by client, echoed in replies.
    pub xid: u32,

    /// Seconds elapsed since client began address acquisition.
    pub secs: u16,

    /// Flags. Bit 15 (0x8000) = broadcast flag.
    pub flags: u16,

    /// Client IP address (set by client in RENEWING/REBINDING states).
    pub ciaddr: Ipv4Addr,

    /// "Your" IP address - the address being assigned to the client.
    pub yiaddr: Ipv4Addr,

    /// Server IP address (next server in BOOTP, or DHCP server).
    pub siaddr: Ipv4Addr,

    /// Gateway IP address - set by relay agents.
    pub giaddr: Ipv4Addr,

    /// Client hardware address. Only the first `hlen` bytes are meaningful.
    pub chaddr: [u8; 16],

    /// Server host name, NUL padded.
    pub sname: [u8; 64],

    /// Boot file name, NUL padded.
    pub file: [u8; 128],

    /// Whether the magic cookie and options area are present.
    pub is_dhcp: bool,

    /// Bytes following the options terminator (or the BOOTP header).
    pub padding: Vec<u8>,

    /// Remote endpoint the packet came from or is going to. Not encoded.
    pub peer: Option<SocketAddr>,

    options: Vec<DhcpOption>,

    truncated: bool,
}

impl DhcpPacket {
    /// Creates an empty reply with RFC 2131 defaults.
    ///
    /// `op` is [`BOOTREPLY`], the hardware type is Ethernet, DHCP mode is on,
    /// and there are no options and no padding.
    pub fn new() -> Self {
        Self {
            op: BOOTREPLY,
            htype: HTYPE_ETHERNET,
            hlen: HLEN_ETHERNET,
            hops: 0,
            xid: 0,
            secs: 0,
            flags: 0,
            ciaddr: Ipv4Addr::UNSPECIFIED,
            yiaddr: Ipv4Addr::UNSPECIFIED,
            siaddr: Ipv4Addr::UNSPECIFIED,
            giaddr: Ipv4Addr::UNSPECIFIED,
            chaddr: [0; DHCP_CHADDR_SIZE],
            sname: [0; DHCP_SNAME_SIZE],
            file: [0; DHCP_FILE_SIZE],
            is_dhcp: true,
            padding: Vec::new(),
            peer: None,
            options: Vec::new(),
            truncated: false,
        }
    }

    /// Parses a complete datagram in strict mode.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_from(data, 0, data.len(), None, true)
    }

    /// Parses `length` bytes of `buffer` starting at `offset`.
    ///
    /// # Arguments
    ///
    /// * `peer` - Remote endpoint recorded on the packet
    /// * `strict` - Reject an option stream that ends without an End marker
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfBounds`] if `offset + length` exceeds the buffer
    /// - [`Error::InvalidPacket`] if `length` is outside 236..=1500, or if the
    ///   option stream is truncated and `strict` is set
    pub fn parse_from(
        buffer: &[u8],
        offset: usize,
        length: usize,
        peer: Option<SocketAddr>,
        strict: bool,
    ) -> Result<Self> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= buffer.len())
            .ok_or(Error::OutOfBounds {
                offset,
                length,
                capacity: buffer.len(),
            })?;

        if length < BOOTP_HEADER_SIZE {
            return Err(Error::InvalidPacket(format!(
                "Packet too short: {} bytes (minimum {})",
                length, BOOTP_HEADER_SIZE
            )));
        }

        if length > DHCP_MAX_PACKET_SIZE {
            return Err(Error::InvalidPacket(format!(
                "Packet too long: {} bytes (maximum {})",
                length, DHCP_MAX_PACKET_SIZE
            )));
        }

        let data = &buffer[offset..end];

        let mut chaddr = [0u8; DHCP_CHADDR_SIZE];
        chaddr.copy_from_slice(&data[DHCP_CHADDR_OFFSET..DHCP_SNAME_OFFSET]);

        let mut sname = [0u8; DHCP_SNAME_SIZE];
        sname.copy_from_slice(&data[DHCP_SNAME_OFFSET..DHCP_FILE_OFFSET]);

        let mut file = [0u8; DHCP_FILE_SIZE];
        file.copy_from_slice(&data[DHCP_FILE_OFFSET..BOOTP_HEADER_SIZE]);

        let mut packet = Self {
            op: data[0],
            htype: data[1],
            hlen: data[2],
            hops: data[3],
            xid: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            secs: u16::from_be_bytes([data[8], data[9]]),
            flags: u16::from_be_bytes([data[10], data[11]]),
            ciaddr: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            yiaddr: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
            siaddr: Ipv4Addr::new(data[20], data[21], data[22], data[23]),
            giaddr: Ipv4Addr::new(data[24], data[25], data[26], data[27]),
            chaddr,
            sname,
            file,
            is_dhcp: false,
            padding: Vec::new(),
            peer,
            options: Vec::new(),
            truncated: false,
        };

        let mut index = BOOTP_HEADER_SIZE;
        if data[index..].starts_with(&DHCP_MAGIC_COOKIE) {
            packet.is_dhcp = true;
            index += DHCP_MAGIC_COOKIE.len();
            index += packet.read_options(&data[index..])?;
        }

        if packet.truncated && strict {
            return Err(Error::InvalidPacket(
                "Option stream ends without End marker".to_string(),
            ));
        }

        packet.padding = data[index..].to_vec();

        Ok(packet)
    }

    /// Reads TLV options until the End marker, returning the bytes consumed.
    ///
    /// A value cut short by the end of the buffer is kept with whatever bytes
    /// were available; a code without its length byte is dropped. Either way
    /// the packet is flagged as truncated.
    fn read_options(&mut self, data: &[u8]) -> Result<usize> {
        let mut index = 0;

        loop {
            let Some(&code) = data.get(index) else {
                self.truncated = true;
                return Ok(index);
            };
            index += 1;

            if code == PAD {
                continue;
            }

            if code == END {
                return Ok(index);
            }

            let Some(&length) = data.get(index) else {
                self.truncated = true;
                return Ok(index);
            };
            index += 1;

            let available = (length as usize).min(data.len() - index);
            let value = data[index..index + available].to_vec();
            index += available;

            self.set_option(DhcpOption::new(code, value)?);
        }
    }

    /// Encodes the packet with default sizing.
    ///
    /// DHCP packets are padded to at least 300 bytes, BOOTP packets to 236.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let min_size = if self.is_dhcp {
            DHCP_MIN_PACKET_SIZE
        } else {
            BOOTP_HEADER_SIZE
        };
        self.serialize_with(min_size, DHCP_DEFAULT_MAX_SIZE)
    }

    /// Encodes the packet, zero-padding the result up to `min_size`.
    ///
    /// `max_size` only sizes the output buffer; the hard ceiling is 1500 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPacket`] if an option value exceeds 255 bytes
    /// or the encoded packet exceeds 1500 bytes.
    pub fn serialize_with(&self, min_size: usize, max_size: usize) -> Result<Vec<u8>> {
        let capacity = max_size.max(min_size).min(DHCP_MAX_PACKET_SIZE);
        let mut packet = Vec::with_capacity(capacity);

        packet.push(self.op);
        packet.push(self.htype);
        packet.push(self.hlen);
        packet.push(self.hops);

        packet.extend_from_slice(&self.xid.to_be_bytes());
        packet.extend_from_slice(&self.secs.to_be_bytes());
        packet.extend_from_slice(&self.flags.to_be_bytes());

        packet.extend_from_slice(&self.ciaddr.octets());
        packet.extend_from_slice(&self.yiaddr.octets());
        packet.extend_from_slice(&self.siaddr.octets());
        packet.extend_from_slice(&self.giaddr.octets());

        packet.extend_from_slice(&self.chaddr);
        packet.extend_from_slice(&self.sname);
        packet.extend_from_slice(&self.file);

        if self.is_dhcp {
            packet.extend_from_slice(&DHCP_MAGIC_COOKIE);

            for option in &self.options {
                if option.len() > MAX_OPTION_LENGTH {
                    return Err(Error::InvalidPacket(format!(
                        "Option {} value is {} bytes (maximum {})",
                        option.code(),
                        option.len(),
                        MAX_OPTION_LENGTH
                    )));
                }
                packet.push(option.code());
                packet.push(option.len() as u8);
                packet.extend_from_slice(option.value());
            }

            packet.push(END);
        }

        packet.extend_from_slice(&self.padding);

        if packet.len() < min_size {
            packet.resize(min_size, 0);
        }

        if packet.len() > DHCP_MAX_PACKET_SIZE {
            return Err(Error::InvalidPacket(format!(
                "Encoded packet is {} bytes (maximum {})",
                packet.len(),
                DHCP_MAX_PACKET_SIZE
            )));
        }

        Ok(packet)
    }

    /// True when the last parse ran out of bytes before the End marker.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Options in insertion order.
    pub fn options(&self) -> impl Iterator<Item = &DhcpOption> {
        self.options.iter()
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn option(&self, code: u8) -> Option<&DhcpOption> {
        self.options.iter().find(|option| option.code() == code)
    }

    pub fn contains_option(&self, code: u8) -> bool {
        self.option(code).is_some()
    }

    /// Inserts `option`, replacing any option with the same code in place.
    pub fn set_option(&mut self, option: DhcpOption) {
        match self
            .options
            .iter_mut()
            .find(|existing| existing.code() == option.code())
        {
            Some(existing) => *existing = option,
            None => self.options.push(option),
        }
    }

    /// Sets the raw value of `code`; `None` removes the option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for codes 0/255 or values over 255 bytes.
    pub fn set_option_raw(&mut self, code: u8, value: Option<Vec<u8>>) -> Result<()> {
        match value {
            Some(value) => self.set_option(DhcpOption::new(code, value)?),
            None => {
                if code == PAD || code == END {
                    return Err(Error::InvalidArgument(format!(
                        "Option code {} is reserved for PAD/END",
                        code
                    )));
                }
                self.remove_option(code);
            }
        }
        Ok(())
    }

    /// Replaces the whole option list, keeping the given order.
    pub fn set_options(&mut self, options: impl IntoIterator<Item = DhcpOption>) {
        self.options.clear();
        for option in options {
            self.set_option(option);
        }
    }

    pub fn remove_option(&mut self, code: u8) -> Option<DhcpOption> {
        let position = self
            .options
            .iter()
            .position(|option| option.code() == code)?;
        Some(self.options.remove(position))
    }

    pub fn remove_all_options(&mut self) {
        self.options.clear();
    }

    /// Raw value of `code`, if present.
    pub fn option_raw(&self, code: u8) -> Option<&[u8]> {
        self.option(code).map(DhcpOption::value)
    }

    pub fn option_as_byte(&self, code: u8) -> Result<Option<u8>> {
        self.typed_option(code, OptionFormat::Byte, DhcpOption::as_byte)
    }

    pub fn option_as_short(&self, code: u8) -> Result<Option<u16>> {
        self.typed_option(code, OptionFormat::Short, DhcpOption::as_short)
    }

    pub fn option_as_shorts(&self, code: u8) -> Result<Option<Vec<u16>>> {
        self.typed_option(code, OptionFormat::ShortList, DhcpOption::as_shorts)
    }

    pub fn option_as_int(&self, code: u8) -> Result<Option<i32>> {
        self.typed_option(code, OptionFormat::Int, DhcpOption::as_int)
    }

    pub fn option_as_inet_addr(&self, code: u8) -> Result<Option<Ipv4Addr>> {
        self.typed_option(code, OptionFormat::Inet, DhcpOption::as_inet_addr)
    }

    pub fn option_as_inet_addrs(&self, code: u8) -> Result<Option<Vec<Ipv4Addr>>> {
        self.typed_option(code, OptionFormat::InetList, DhcpOption::as_inet_addrs)
    }

    pub fn option_as_string(&self, code: u8) -> Result<Option<String>> {
        self.typed_option(code, OptionFormat::String, DhcpOption::as_string)
    }

    pub fn option_as_bytes(&self, code: u8) -> Result<Option<Vec<u8>>> {
        self.typed_option(code, OptionFormat::ByteList, |option| {
            option.as_bytes().map(<[u8]>::to_vec)
        })
    }

    pub fn set_option_as_byte(&mut self, code: u8, value: u8) -> Result<()> {
        self.set_option(DhcpOption::new_as_byte(code, value)?);
        Ok(())
    }

    pub fn set_option_as_short(&mut self, code: u8, value: u16) -> Result<()> {
        self.set_option(DhcpOption::new_as_short(code, value)?);
        Ok(())
    }

    pub fn set_option_as_shorts(&mut self, code: u8, values: &[u16]) -> Result<()> {
        self.set_option(DhcpOption::new_as_shorts(code, values)?);
        Ok(())
    }

    pub fn set_option_as_int(&mut self, code: u8, value: i32) -> Result<()> {
        self.set_option(DhcpOption::new_as_int(code, value)?);
        Ok(())
    }

    pub fn set_option_as_inet_addr(&mut self, code: u8, addr: IpAddr) -> Result<()> {
        self.set_option(DhcpOption::new_as_inet_addr(code, addr)?);
        Ok(())
    }

    pub fn set_option_as_inet_addrs(&mut self, code: u8, addrs: &[IpAddr]) -> Result<()> {
        self.set_option(DhcpOption::new_as_inet_addrs(code, addrs)?);
        Ok(())
    }

    pub fn set_option_as_string(&mut self, code: u8, value: &str) -> Result<()> {
        self.set_option(DhcpOption::new_as_string(code, value)?);
        Ok(())
    }

    fn typed_option<T>(
        &self,
        code: u8,
        format: OptionFormat,
        read: impl FnOnce(&DhcpOption) -> Result<T>,
    ) -> Result<Option<T>> {
        options::check_format(code, format)?;
        self.option(code).map(read).transpose()
    }

    /// Returns the DHCP message type (Option 53) if present and recognised.
    ///
    /// Returns `None` for BOOTP packets which don't have this option.
    pub fn message_type(&self) -> Option<MessageType> {
        let value = self
            .option_as_byte(OptionCode::MessageType as u8)
            .ok()
            .flatten()?;
        MessageType::try_from(value).ok()
    }

    pub fn set_message_type(&mut self, message_type: MessageType) {
        self.set_option(DhcpOption::from(message_type));
    }

    /// Returns the requested IP address (Option 50) if present.
    ///
    /// Clients include this in DISCOVER to request a specific IP,
    /// and in REQUEST to confirm the offered IP.
    pub fn requested_ip(&self) -> Option<Ipv4Addr> {
        self.option_as_inet_addr(OptionCode::RequestedAddress as u8)
            .ok()
            .flatten()
    }

    /// Returns the server identifier (Option 54) if present.
    pub fn server_identifier(&self) -> Option<Ipv4Addr> {
        self.option_as_inet_addr(OptionCode::ServerIdentifier as u8)
            .ok()
            .flatten()
    }

    /// Returns the client identifier (Option 61) if present.
    pub fn client_identifier(&self) -> Option<&[u8]> {
        self.option_raw(OptionCode::ClientIdentifier as u8)
    }

    /// Returns the client hostname (Option 12) if present.
    pub fn hostname(&self) -> Option<String> {
        self.option_as_string(OptionCode::HostName as u8)
            .ok()
            .flatten()
    }

    /// Returns the parameter request list (Option 55) if present.
    pub fn parameter_request_list(&self) -> Option<&[u8]> {
        self.option_raw(OptionCode::ParameterRequestList as u8)
    }

    /// Returns the requested lease time (Option 51) if present.
    pub fn requested_lease_time(&self) -> Option<i32> {
        self.option_as_int(OptionCode::LeaseTime as u8)
            .ok()
            .flatten()
    }

    /// Returns the client hardware address bytes (respecting hlen).
    pub fn chaddr_bytes(&self) -> &[u8] {
        let len = (self.hlen as usize).min(self.chaddr.len());
        &self.chaddr[..len]
    }

    /// Copies `chaddr` into the fixed field, zero-filling the rest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if more than 16 bytes are given.
    pub fn set_chaddr(&mut self, chaddr: &[u8]) -> Result<()> {
        if chaddr.len() > DHCP_CHADDR_SIZE {
            return Err(Error::InvalidArgument(format!(
                "chaddr is {} bytes (maximum {})",
                chaddr.len(),
                DHCP_CHADDR_SIZE
            )));
        }
        self.chaddr = [0; DHCP_CHADDR_SIZE];
        self.chaddr[..chaddr.len()].copy_from_slice(chaddr);
        Ok(())
    }

    /// Formats the client hardware address as a colon-separated string.
    ///
    /// For Ethernet, returns format like "aa:bb:cc:dd:ee:ff".
    pub fn format_mac(&self) -> String {
        use std::fmt::Write;
        let bytes = self.chaddr_bytes();
        let mut result = String::with_capacity(bytes.len() * 3);
        for (index, byte) in bytes.iter().enumerate() {
            if index > 0 {
                result.push(':');
            }
            let _ = write!(result, "{:02x}", byte);
        }
        result
    }

    /// Returns a unique client identifier.
    ///
    /// Uses Option 61 (Client Identifier) if present, otherwise
    /// constructs an identifier from hardware type + hardware address.
    pub fn client_id(&self) -> Vec<u8> {
        if let Some(id) = self.client_identifier() {
            id.to_vec()
        } else {
            let mut id = vec![self.htype];
            id.extend_from_slice(self.chaddr_bytes());
            id
        }
    }

    /// Returns true if the broadcast flag (bit 15) is set.
    ///
    /// When set, servers must broadcast replies instead of unicasting.
    pub fn is_broadcast(&self) -> bool {
        (self.flags & 0x8000) != 0
    }

    pub fn sname(&self) -> String {
        convert::fixed_field_to_string(&self.sname, DHCP_SNAME_SIZE)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `sname` is longer than 64 bytes.
    pub fn set_sname(&mut self, sname: &str) -> Result<()> {
        self.sname = convert::string_to_fixed_field(sname)?;
        Ok(())
    }

    pub fn file(&self) -> String {
        convert::fixed_field_to_string(&self.file, DHCP_FILE_SIZE)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `file` is longer than 128 bytes.
    pub fn set_file(&mut self, file: &str) -> Result<()> {
        self.file = convert::string_to_fixed_field(file)?;
        Ok(())
    }
}

impl Default for DhcpPacket {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DhcpPacket {
    fn clone(&self) -> Self {
        Self {
            op: self.op,
            htype: self.htype,
            hlen: self.hlen,
            hops: self.hops,
            xid: self.xid,
            secs: self.secs,
            flags: self.flags,
            ciaddr: self.ciaddr,
            yiaddr: self.yiaddr,
            siaddr: self.siaddr,
            giaddr: self.giaddr,
            chaddr: self.chaddr,
            sname: self.sname,
            file: self.file,
            is_dhcp: self.is_dhcp,
            padding: self.padding.clone(),
            peer: self.peer,
            options: self.options.clone(),
            truncated: false,
        }
    }
}

impl PartialEq for DhcpPacket {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op
            && self.htype == other.htype
            && self.hlen == other.hlen
            && self.hops == other.hops
            && self.xid == other.xid
            && self.secs == other.secs
            && self.flags == other.flags
            && self.ciaddr == other.ciaddr
            && self.yiaddr == other.yiaddr
            && self.siaddr == other.siaddr
            && self.giaddr == other.giaddr
            && self.chaddr == other.chaddr
            && self.sname == other.sname
            && self.file == other.file
            && self.is_dhcp == other.is_dhcp
            && self.padding == other.padding
            && self.peer == other.peer
            && self.options.len() == other.options.len()
            && self
                .options
                .iter()
                .all(|option| other.option(option.code()) == Some(option))
    }
}

impl Eq for DhcpPacket {}

impl Hash for DhcpPacket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.op.hash(state);
        self.htype.hash(state);
        self.hlen.hash(state);
        self.hops.hash(state);
        self.xid.hash(state);
        self.secs.hash(state);
        self.flags.hash(state);
        self.ciaddr.hash(state);
        self.yiaddr.hash(state);
        self.siaddr.hash(state);
        self.giaddr.hash(state);
        self.chaddr.hash(state);
        self.sname.hash(state);
        self.file.hash(state);
        self.is_dhcp.hash(state);
        self.padding.hash(state);
        self.peer.hash(state);
        // Order-independent, to agree with `eq`.
        let mut codes: Vec<u8> = self.options.iter().map(DhcpOption::code).collect();
        codes.sort_unstable();
        codes.hash(state);
    }
}

impl fmt::Display for DhcpPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dhcp { "DHCP" } else { "BOOTP" };
        let op = match self.op {
            BOOTREQUEST => "BOOTREQUEST",
            BOOTREPLY => "BOOTREPLY",
            _ => "UNKNOWN",
        };

        writeln!(f, "{} packet", kind)?;
        if let Some(peer) = self.peer {
            writeln!(f, "  peer:   {}", peer)?;
        }
        writeln!(f, "  op:     {} ({})", op, self.op)?;
        writeln!(
            f,
            "  htype:  {}  hlen: {}  hops: {}",
            self.htype, self.hlen, self.hops
        )?;
        writeln!(f, "  xid:    0x{:08x}", self.xid)?;
        writeln!(f, "  secs:   {}  flags: 0x{:04x}", self.secs, self.flags)?;
        writeln!(f, "  ciaddr: {}", self.ciaddr)?;
        writeln!(f, "  yiaddr: {}", self.yiaddr)?;
        writeln!(f, "  siaddr: {}", self.siaddr)?;
        writeln!(f, "  giaddr: {}", self.giaddr)?;
        writeln!(f, "  chaddr: {}", self.format_mac())?;
        writeln!(f, "  sname:  {:?}", self.sname())?;
        writeln!(f, "  file:   {:?}", self.file())?;
        for option in &self.options {
            writeln!(f, "  option: {}", option)?;
        }
        if self.truncated {
            writeln!(f, "  (option stream truncated)")?;
        }
        write!(f, "  padding: {} bytes", self.padding.len())
    }
}
