//! Construction of server replies.
//!
//! The `make_*` builders copy the transaction fields a reply must echo from
//! the request, install the message type first, then apply the caller's
//! policy options. Every reply leaves with its `peer` set to the default
//! destination from [`reply_destination`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tracing::warn;

use crate::options::{DhcpOption, MessageType};
use crate::packet::{BOOTREPLY, DhcpPacket};
use crate::registry::OptionCode;

pub const DHCP_SERVER_PORT: u16 = 67;
pub const DHCP_CLIENT_PORT: u16 = 68;

/// Installs policy options into `response`, resolving mirror options
/// against `request`.
///
/// Later options with the same code replace earlier ones in place.
pub fn apply_options(request: &DhcpPacket, response: &mut DhcpPacket, options: &[DhcpOption]) {
    for option in options {
        response.set_option(option.apply_option(request));
    }
}

/// Picks where a reply to `request` should be sent (RFC 2131 §4.1).
///
/// - Relayed requests go back to the relay agent on the server port.
/// - NAKs, broadcast-flagged requests, and clients without an address get a
///   limited broadcast on the client port.
/// - Everyone else is unicast to `ciaddr`.
pub fn reply_destination(request: &DhcpPacket, message_type: Option<MessageType>) -> SocketAddr {
    let is_nak = message_type == Some(MessageType::Nak);

    if request.giaddr != Ipv4Addr::UNSPECIFIED {
        SocketAddr::new(IpAddr::V4(request.giaddr), DHCP_SERVER_PORT)
    } else if is_nak || request.is_broadcast() || request.ciaddr == Ipv4Addr::UNSPECIFIED {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), DHCP_CLIENT_PORT)
    } else {
        SocketAddr::new(IpAddr::V4(request.ciaddr), DHCP_CLIENT_PORT)
    }
}

/// Creates a DHCP reply skeleton from a request.
///
/// # Preserved Fields
///
/// The following fields are copied from the request:
/// - `xid` (transaction ID)
/// - `flags` (broadcast flag)
/// - `giaddr` (relay agent address)
/// - `chaddr` (client hardware address)
/// - `htype` and `hlen` (hardware type/length)
pub fn make_reply(
    request: &DhcpPacket,
    message_type: MessageType,
    your_ip: Ipv4Addr,
    server_ip: Ipv4Addr,
) -> DhcpPacket {
    let mut reply = reply_header(request, your_ip, server_ip);
    reply.set_message_type(message_type);
    reply.set_option(server_identifier(server_ip));
    reply.peer = Some(reply_destination(request, Some(message_type)));
    reply
}

/// Builds a DHCPOFFER for `offered_ip`.
pub fn make_offer(
    request: &DhcpPacket,
    offered_ip: Ipv4Addr,
    server_ip: Ipv4Addr,
    lease_time: i32,
    options: &[DhcpOption],
) -> DhcpPacket {
    let mut offer = make_reply(request, MessageType::Offer, offered_ip, server_ip);
    offer.set_option(lease_time_option(lease_time));
    apply_options(request, &mut offer, options);
    offer
}

/// Builds a DHCPACK confirming `assigned_ip`.
pub fn make_ack(
    request: &DhcpPacket,
    assigned_ip: Ipv4Addr,
    server_ip: Ipv4Addr,
    lease_time: i32,
    options: &[DhcpOption],
) -> DhcpPacket {
    let mut ack = make_reply(request, MessageType::Ack, assigned_ip, server_ip);
    ack.ciaddr = request.ciaddr;
    ack.set_option(lease_time_option(lease_time));
    apply_options(request, &mut ack, options);
    ack
}

/// Builds the DHCPACK answering a DHCPINFORM: no address, no lease time.
pub fn make_inform_ack(
    request: &DhcpPacket,
    server_ip: Ipv4Addr,
    options: &[DhcpOption],
) -> DhcpPacket {
    let mut ack = make_reply(request, MessageType::Ack, Ipv4Addr::UNSPECIFIED, server_ip);
    ack.ciaddr = request.ciaddr;
    apply_options(request, &mut ack, options);
    ack.remove_option(OptionCode::LeaseTime as u8);
    ack
}

/// Builds a DHCPNAK, optionally carrying a human-readable reason (Option 56).
pub fn make_nak(request: &DhcpPacket, server_ip: Ipv4Addr, message: Option<&str>) -> DhcpPacket {
    let mut nak = reply_header(request, Ipv4Addr::UNSPECIFIED, Ipv4Addr::UNSPECIFIED);
    nak.set_message_type(MessageType::Nak);
    nak.set_option(server_identifier(server_ip));
    if let Some(message) = message {
        match DhcpOption::new_as_string(OptionCode::Message as u8, message) {
            Ok(option) => nak.set_option(option),
            Err(error) => warn!(
                "Sending NAK for xid 0x{:08x} without its message: {}",
                request.xid, error
            ),
        }
    }
    nak.peer = Some(reply_destination(request, Some(MessageType::Nak)));
    nak
}

/// Creates a BOOTP reply packet (no cookie, no message type).
///
/// Used for legacy BOOTP clients. Options are only carried when the request
/// itself was a DHCP-format packet.
pub fn make_bootp_reply(
    request: &DhcpPacket,
    your_ip: Ipv4Addr,
    server_ip: Ipv4Addr,
    options: &[DhcpOption],
) -> DhcpPacket {
    let mut reply = reply_header(request, your_ip, server_ip);
    reply.is_dhcp = request.is_dhcp;
    apply_options(request, &mut reply, options);
    reply.peer = Some(reply_destination(request, None));
    reply
}

fn reply_header(request: &DhcpPacket, your_ip: Ipv4Addr, server_ip: Ipv4Addr) -> DhcpPacket {
    let mut reply = DhcpPacket::new();
    reply.op = BOOTREPLY;
    reply.htype = request.htype;
    reply.hlen = request.hlen;
    reply.xid = request.xid;
    reply.flags = request.flags;
    reply.yiaddr = your_ip;
    reply.siaddr = server_ip;
    reply.giaddr = request.giaddr;
    reply.chaddr = request.chaddr;
    reply
}

fn server_identifier(server_ip: Ipv4Addr) -> DhcpOption {
    DhcpOption::registered(OptionCode::ServerIdentifier, server_ip.octets().to_vec())
}

fn lease_time_option(seconds: i32) -> DhcpOption {
    DhcpOption::registered(OptionCode::LeaseTime, seconds.to_be_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{BOOTREQUEST, HLEN_ETHERNET, HTYPE_ETHERNET};

    fn request(message_type: MessageType) -> DhcpPacket {
        let mut request = DhcpPacket::new();
        request.op = BOOTREQUEST;
        request.htype = HTYPE_ETHERNET;
        request.hlen = HLEN_ETHERNET;
        request.xid = 0x12345678;
        request.flags = 0x8000;
        request
            .set_chaddr(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff])
            .unwrap();
        request.set_message_type(message_type);
        request
    }

    #[test]
    fn test_make_offer() {
        let discover = request(MessageType::Discover);
        let options = [DhcpOption::new_as_inet_addr(
            OptionCode::SubnetMask as u8,
            IpAddr::V4(Ipv4Addr::new(255, 255, 255, 0)),
        )
        .unwrap()];

        let offer = make_offer(
            &discover,
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(192, 168, 1, 1),
            86400,
            &options,
        );

        assert_eq!(offer.op, BOOTREPLY);
        assert_eq!(offer.xid, discover.xid);
        assert_eq!(offer.chaddr, discover.chaddr);
        assert_eq!(offer.yiaddr, Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(offer.message_type(), Some(MessageType::Offer));
        assert_eq!(offer.server_identifier(), Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(offer.requested_lease_time(), Some(86400));

        let codes: Vec<u8> = offer.options().map(DhcpOption::code).collect();
        assert_eq!(codes, vec![53, 54, 51, 1]);
        assert_eq!(
            offer.peer,
            Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), DHCP_CLIENT_PORT))
        );
    }

    #[test]
    fn test_create_reply_copies_htype() {
        let mut discover = request(MessageType::Discover);
        discover.htype = 6;
        discover.hlen = 8;

        let reply = make_reply(
            &discover,
            MessageType::Offer,
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(192, 168, 1, 1),
        );

        assert_eq!(reply.htype, 6);
        assert_eq!(reply.hlen, 8);
        assert_eq!(reply.flags, 0x8000);
    }

    #[test]
    fn test_apply_options_mirrors_client_value() {
        let mut inform = request(MessageType::Inform);
        inform
            .set_option_as_string(OptionCode::HostName as u8, "laptop")
            .unwrap();

        let policy = [
            DhcpOption::new_as_string(OptionCode::HostName as u8, "default-host")
                .unwrap()
                .mirrored(true),
            DhcpOption::new_as_string(OptionCode::DomainName as u8, "example.test")
                .unwrap()
                .mirrored(true),
        ];

        let mut response = DhcpPacket::new();
        apply_options(&inform, &mut response, &policy);

        assert_eq!(response.hostname().as_deref(), Some("laptop"));
        assert_eq!(
            response
                .option_as_string(OptionCode::DomainName as u8)
                .unwrap()
                .as_deref(),
            Some("example.test")
        );
    }

    #[test]
    fn test_inform_ack_has_no_lease() {
        let mut inform = request(MessageType::Inform);
        inform.flags = 0;
        inform.ciaddr = Ipv4Addr::new(10, 0, 0, 7);

        let policy = [DhcpOption::new_as_int(OptionCode::LeaseTime as u8, 600).unwrap()];
        let ack = make_inform_ack(&inform, Ipv4Addr::new(10, 0, 0, 1), &policy);

        assert_eq!(ack.message_type(), Some(MessageType::Ack));
        assert_eq!(ack.yiaddr, Ipv4Addr::UNSPECIFIED);
        assert_eq!(ack.ciaddr, inform.ciaddr);
        assert!(!ack.contains_option(OptionCode::LeaseTime as u8));
        assert_eq!(ack.peer, Some("10.0.0.7:68".parse().unwrap()));
    }

    #[test]
    fn test_make_nak() {
        let mut req = request(MessageType::Request);
        req.flags = 0;
        req.ciaddr = Ipv4Addr::new(10, 0, 0, 7);

        let nak = make_nak(&req, Ipv4Addr::new(10, 0, 0, 1), Some("wrong subnet"));
        assert_eq!(nak.message_type(), Some(MessageType::Nak));
        assert_eq!(nak.yiaddr, Ipv4Addr::UNSPECIFIED);
        assert_eq!(
            nak.option_as_string(OptionCode::Message as u8).unwrap().as_deref(),
            Some("wrong subnet")
        );
        assert_eq!(nak.peer, Some("255.255.255.255:68".parse().unwrap()));
    }

    #[test]
    fn test_make_nak_with_overlong_message() {
        let req = request(MessageType::Request);
        let message = "x".repeat(300);

        let nak = make_nak(&req, Ipv4Addr::new(10, 0, 0, 1), Some(&message));
        assert_eq!(nak.message_type(), Some(MessageType::Nak));
        assert_eq!(nak.server_identifier(), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(!nak.contains_option(OptionCode::Message as u8));
        assert!(nak.serialize().is_ok());
    }

    #[test]
    fn test_make_bootp_reply() {
        let mut bootp = DhcpPacket::new();
        bootp.op = BOOTREQUEST;
        bootp.is_dhcp = false;
        bootp.xid = 7;

        let reply = make_bootp_reply(
            &bootp,
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(192, 168, 1, 1),
            &[],
        );

        assert_eq!(reply.op, BOOTREPLY);
        assert_eq!(reply.xid, 7);
        assert!(!reply.is_dhcp);
        assert!(reply.message_type().is_none());
        assert_eq!(reply.serialize().unwrap().len(), 236);
    }

    #[test]
    fn test_reply_destination_relay() {
        let mut req = request(MessageType::Discover);
        req.giaddr = Ipv4Addr::new(192, 168, 2, 1);
        assert_eq!(
            reply_destination(&req, Some(MessageType::Offer)),
            "192.168.2.1:67".parse().unwrap()
        );
    }

    #[test]
    fn test_reply_destination_unicast() {
        let mut req = request(MessageType::Request);
        req.flags = 0;
        req.ciaddr = Ipv4Addr::new(192, 168, 1, 50);
        assert_eq!(
            reply_destination(&req, Some(MessageType::Ack)),
            "192.168.1.50:68".parse().unwrap()
        );
        assert_eq!(
            reply_destination(&req, Some(MessageType::Nak)),
            "255.255.255.255:68".parse().unwrap()
        );
    }
}
