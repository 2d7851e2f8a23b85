//! Error types for the DHCP codec and server.
//!
//! All fallible operations in this crate return [`Result<T>`], which uses
//! the [`Error`] enum for error variants.

/// Errors that can occur while encoding, decoding or serving DHCP packets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File system or network I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller passed a structurally impossible input.
    ///
    /// Examples are option codes 0 or 255, a typed accessor used on an option
    /// whose registered format differs, or a fixed field value that is too long.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An offset/length pair falls outside the supplied buffer.
    #[error("Range {offset}+{length} is outside a buffer of {capacity} bytes")]
    OutOfBounds {
        offset: usize,
        length: usize,
        capacity: usize,
    },

    /// Malformed DHCP packet.
    ///
    /// Raised for packets outside the 236..=1500 byte window, a truncated option
    /// stream in strict mode, an option value over 255 bytes at serialize time,
    /// or a serialized packet larger than 1500 bytes.
    #[error("Invalid DHCP packet: {0}")]
    InvalidPacket(String),

    /// A stored option value does not fit the shape of its registered format.
    #[error("Malformed value for option {code}: {reason}")]
    MalformedValue { code: u8, reason: String },

    /// Invalid server configuration.
    ///
    /// Returned by [`Config::validate`](crate::Config::validate) when the
    /// configuration contains invalid values (e.g., max_workers < core_workers).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Socket creation or configuration error.
    ///
    /// Typically occurs when binding to port 67 without administrator privileges.
    #[error("Socket error: {0}")]
    Socket(String),

    /// The worker pool no longer accepts work.
    #[error("Worker pool is shut down")]
    PoolClosed,
}

/// A specialized Result type for DHCP operations.
pub type Result<T> = std::result::Result<T, Error>;
