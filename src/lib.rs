//! # dhcpcore
//!
//! DHCP (RFC 2131) and BOOTP wire codec, RFC 2132 option registry, and a
//! UDP dispatch server backed by a bounded worker pool.
//!
//! ## Features
//!
//! - Lossless header decoding and encoding, including trailing padding
//! - Option map with typed accessors checked against the registry
//! - Strict and lenient parsing of truncated option streams
//! - Reply builders with RFC 2131 destination rules
//! - Servlet-style message-type dispatch
//! - Worker pool with core and overflow workers and a bounded queue
//!
//! ## Quick Start
//!
//! ```no_run
//! use dhcpcore::{Config, DhcpServer, DhcpServlet, ServletHandler};
//!
//! struct Silent;
//!
//! impl DhcpServlet for Silent {}
//!
//! #[tokio::main]
//! async fn main() -> dhcpcore::Result<()> {
//!     let config = Config::load_or_create("config.json")?;
//!     let handler = ServletHandler::new(Silent, config.strict_parsing);
//!     let server = DhcpServer::bind(&config, handler).await?;
//!     server.run().await
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`DhcpPacket`] - Datagram parsing and serialization
//! - [`DhcpOption`] - A single option with typed accessors
//! - [`registry`] - Option code, name and value format table
//! - [`response`] - OFFER/ACK/NAK/BOOTP reply builders
//! - [`DhcpServlet`] - Per-message-type request hooks
//! - [`DhcpServer`] - UDP listener feeding the [`WorkerPool`]

pub mod config;
pub mod convert;
pub mod error;
pub mod options;
pub mod packet;
pub mod pool;
pub mod registry;
pub mod response;
pub mod server;
pub mod servlet;

pub use config::{Config, OptionSetting, PoolConfig};
pub use error::{Error, Result};
pub use options::{DhcpOption, MessageType};
pub use packet::DhcpPacket;
pub use pool::WorkerPool;
pub use registry::{OptionCode, OptionFormat};
pub use server::{DatagramHandler, DhcpServer, Reply, build_runtime};
pub use servlet::{DhcpServlet, ServletHandler};
