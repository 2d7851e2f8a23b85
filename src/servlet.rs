//! Message-type dispatch on top of the datagram server.
//!
//! A [`DhcpServlet`] sees decoded requests and returns decoded replies.
//! [`ServletHandler`] adapts one to the server's [`DatagramHandler`] seam:
//! it parses, filters, dispatches, serializes and picks the destination.

use std::net::SocketAddr;

use tracing::{debug, error, info, warn};

use crate::options::MessageType;
use crate::packet::{BOOTREQUEST, DhcpPacket};
use crate::response::reply_destination;
use crate::server::{DatagramHandler, Reply};

/// Request handling hooks, one per client message type.
///
/// Every hook defaults to "no reply". Override [`DhcpServlet::service`] to
/// take over dispatch entirely.
pub trait DhcpServlet: Send + Sync + 'static {
    fn service(&self, request: &DhcpPacket) -> Option<DhcpPacket> {
        match request.message_type() {
            Some(MessageType::Discover) => self.do_discover(request),
            Some(MessageType::Request) => self.do_request(request),
            Some(MessageType::Decline) => self.do_decline(request),
            Some(MessageType::Release) => self.do_release(request),
            Some(MessageType::Inform) => self.do_inform(request),
            Some(message_type) => {
                warn!("Ignoring {} message from client", message_type);
                None
            }
            None if request.is_dhcp && request.contains_option(53) => {
                warn!("Ignoring request with unknown message type");
                None
            }
            None => self.do_bootp(request),
        }
    }

    fn do_discover(&self, _request: &DhcpPacket) -> Option<DhcpPacket> {
        None
    }

    fn do_request(&self, _request: &DhcpPacket) -> Option<DhcpPacket> {
        None
    }

    fn do_decline(&self, _request: &DhcpPacket) -> Option<DhcpPacket> {
        None
    }

    fn do_release(&self, _request: &DhcpPacket) -> Option<DhcpPacket> {
        None
    }

    fn do_inform(&self, _request: &DhcpPacket) -> Option<DhcpPacket> {
        None
    }

    fn do_bootp(&self, _request: &DhcpPacket) -> Option<DhcpPacket> {
        None
    }
}

pub struct ServletHandler<S> {
    servlet: S,
    strict: bool,
}

impl<S: DhcpServlet> ServletHandler<S> {
    pub fn new(servlet: S, strict: bool) -> Self {
        Self { servlet, strict }
    }

    pub fn servlet(&self) -> &S {
        &self.servlet
    }
}

impl<S: DhcpServlet> DatagramHandler for ServletHandler<S> {
    fn service_datagram(&self, datagram: &[u8], source: SocketAddr) -> Option<Reply> {
        let request =
            match DhcpPacket::parse_from(datagram, 0, datagram.len(), Some(source), self.strict) {
                Ok(request) => request,
                Err(error) => {
                    warn!("Dropping malformed packet from {}: {}", source, error);
                    return None;
                }
            };

        if request.op != BOOTREQUEST {
            debug!("Dropping non-BOOTREQUEST packet from {}", source);
            return None;
        }

        match request.message_type() {
            Some(message_type) => info!(
                "{} from {} ({})",
                message_type,
                request.format_mac(),
                source
            ),
            None => info!("BOOTP from {} ({})", request.format_mac(), source),
        }

        let response = self.servlet.service(&request)?;

        let payload = match response.serialize() {
            Ok(payload) => payload,
            Err(error) => {
                error!("Failed to encode reply to {}: {}", source, error);
                return None;
            }
        };

        let destination = response
            .peer
            .unwrap_or_else(|| reply_destination(&request, response.message_type()));

        debug!(
            "Replying to {} with {} bytes",
            destination,
            payload.len()
        );

        Some(Reply {
            payload,
            destination,
        })
    }
}
