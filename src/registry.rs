//! Registry of known DHCP/BOOTP option codes (RFC 2132 and friends).
//!
//! Each registered code carries a value format and a canonical name. The
//! codec consults the registry for typed option access, and the debug
//! renderers use it to print option names and values. Unregistered codes
//! have no format: they are carried as raw bytes and rejected by typed
//! accessors.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Pad option code. Skipped while parsing, never stored.
pub const PAD: u8 = 0;

/// End-of-options marker. Never stored.
pub const END: u8 = 255;

/// Wire format of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionFormat {
    /// A single IPv4 address (4 bytes).
    Inet,
    /// A list of IPv4 addresses (4·n bytes).
    InetList,
    /// A big-endian signed 32-bit integer.
    Int,
    /// A big-endian 16-bit integer.
    Short,
    /// A list of 16-bit integers (2·n bytes).
    ShortList,
    /// A single byte.
    Byte,
    /// Untyped bytes.
    ByteList,
    /// Characters, one byte each.
    String,
}

impl OptionFormat {
    /// Size in bytes of one element of this format.
    pub fn unit_size(self) -> usize {
        match self {
            Self::Inet | Self::InetList | Self::Int => 4,
            Self::Short | Self::ShortList => 2,
            Self::Byte | Self::ByteList | Self::String => 1,
        }
    }

    /// Whether the value is exactly one unit rather than a list.
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Inet | Self::Int | Self::Short | Self::Byte)
    }
}

impl fmt::Display for OptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inet => "inet",
            Self::InetList => "inet-list",
            Self::Int => "int",
            Self::Short => "short",
            Self::ShortList => "short-list",
            Self::Byte => "byte",
            Self::ByteList => "byte-list",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// One registry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub code: u8,
    pub format: OptionFormat,
    pub name: &'static str,
}

macro_rules! option_registry {
    ($($(#[$doc:meta])* $variant:ident = $code:literal, $format:ident, $name:literal;)*) => {
        /// Option codes known to the registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum OptionCode {
            $($(#[$doc])* $variant = $code,)*
        }

        impl TryFrom<u8> for OptionCode {
            type Error = u8;

            fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
                match value {
                    $($code => Ok(Self::$variant),)*
                    other => Err(other),
                }
            }
        }

        impl OptionCode {
            pub fn format(self) -> OptionFormat {
                match self {
                    $(Self::$variant => OptionFormat::$format,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }

        const ENTRIES: &[RegistryEntry] = &[
            $(RegistryEntry { code: $code, format: OptionFormat::$format, name: $name },)*
        ];
    };
}

option_registry! {
    SubnetMask = 1, Inet, "subnet-mask";
    TimeOffset = 2, Int, "time-offset";
    /// Default gateways, in order of preference.
    Routers = 3, InetList, "routers";
    TimeServers = 4, InetList, "time-servers";
    NameServers = 5, InetList, "ien116-name-servers";
    DomainNameServers = 6, InetList, "domain-name-servers";
    LogServers = 7, InetList, "log-servers";
    CookieServers = 8, InetList, "cookie-servers";
    LprServers = 9, InetList, "lpr-servers";
    ImpressServers = 10, InetList, "impress-servers";
    ResourceLocationServers = 11, InetList, "resource-location-servers";
    HostName = 12, String, "host-name";
    BootSize = 13, Short, "boot-size";
    MeritDump = 14, String, "merit-dump";
    DomainName = 15, String, "domain-name";
    SwapServer = 16, Inet, "swap-server";
    RootPath = 17, String, "root-path";
    ExtensionsPath = 18, String, "extensions-path";
    IpForwarding = 19, Byte, "ip-forwarding";
    NonLocalSourceRouting = 20, Byte, "non-local-source-routing";
    PolicyFilter = 21, InetList, "policy-filter";
    MaxDgramReassembly = 22, Short, "max-dgram-reassembly";
    DefaultIpTtl = 23, Byte, "default-ip-ttl";
    PathMtuAgingTimeout = 24, Int, "path-mtu-aging-timeout";
    PathMtuPlateauTable = 25, ShortList, "path-mtu-plateau-table";
    InterfaceMtu = 26, Short, "interface-mtu";
    AllSubnetsLocal = 27, Byte, "all-subnets-local";
    BroadcastAddress = 28, Inet, "broadcast-address";
    PerformMaskDiscovery = 29, Byte, "perform-mask-discovery";
    MaskSupplier = 30, Byte, "mask-supplier";
    RouterDiscovery = 31, Byte, "router-discovery";
    RouterSolicitationAddress = 32, Inet, "router-solicitation-address";
    /// Destination/router pairs.
    StaticRoutes = 33, InetList, "static-routes";
    TrailerEncapsulation = 34, Byte, "trailer-encapsulation";
    ArpCacheTimeout = 35, Int, "arp-cache-timeout";
    Ieee8023Encapsulation = 36, Byte, "ieee802-3-encapsulation";
    DefaultTcpTtl = 37, Byte, "default-tcp-ttl";
    TcpKeepaliveInterval = 38, Int, "tcp-keepalive-interval";
    TcpKeepaliveGarbage = 39, Byte, "tcp-keepalive-garbage";
    NisDomain = 40, String, "nis-domain";
    NisServers = 41, InetList, "nis-servers";
    NtpServers = 42, InetList, "ntp-servers";
    VendorEncapsulatedOptions = 43, ByteList, "vendor-encapsulated-options";
    NetbiosNameServers = 44, InetList, "netbios-name-servers";
    NetbiosDdServer = 45, InetList, "netbios-dd-server";
    NetbiosNodeType = 46, Byte, "netbios-node-type";
    NetbiosScope = 47, String, "netbios-scope";
    FontServers = 48, InetList, "font-servers";
    XDisplayManager = 49, InetList, "x-display-manager";
    RequestedAddress = 50, Inet, "dhcp-requested-address";
    /// Lease duration in seconds.
    LeaseTime = 51, Int, "dhcp-lease-time";
    OptionOverload = 52, Byte, "dhcp-option-overload";
    MessageType = 53, Byte, "dhcp-message-type";
    ServerIdentifier = 54, Inet, "dhcp-server-identifier";
    ParameterRequestList = 55, ByteList, "dhcp-parameter-request-list";
    Message = 56, String, "dhcp-message";
    MaxMessageSize = 57, Short, "dhcp-max-message-size";
    RenewalTime = 58, Int, "dhcp-renewal-time";
    RebindingTime = 59, Int, "dhcp-rebinding-time";
    VendorClassIdentifier = 60, String, "vendor-class-identifier";
    ClientIdentifier = 61, ByteList, "dhcp-client-identifier";
    NwipDomainName = 62, String, "nwip-domain";
    NisPlusDomain = 64, String, "nisplus-domain";
    NisPlusServers = 65, InetList, "nisplus-servers";
    TftpServerName = 66, String, "tftp-server-name";
    BootfileName = 67, String, "bootfile-name";
    MobileIpHomeAgent = 68, InetList, "mobile-ip-home-agent";
    SmtpServer = 69, InetList, "smtp-server";
    Pop3Server = 70, InetList, "pop-server";
    NntpServer = 71, InetList, "nntp-server";
    WwwServer = 72, InetList, "www-server";
    FingerServer = 73, InetList, "finger-server";
    IrcServer = 74, InetList, "irc-server";
    StreettalkServer = 75, InetList, "streettalk-server";
    StreettalkDirectoryAssistance = 76, InetList, "streettalk-directory-assistance-server";
    UserClass = 77, ByteList, "user-class";
    RelayAgentInformation = 82, ByteList, "relay-agent-information";
    NdsServers = 85, InetList, "nds-servers";
    NdsTreeName = 86, String, "nds-tree-name";
    NdsContext = 87, String, "nds-context";
    ClientSystemArchitecture = 93, ShortList, "pxe-system-type";
    AutoConfigure = 116, Byte, "auto-configure";
    SubnetSelection = 118, Inet, "subnet-selection";
    DomainSearch = 119, ByteList, "domain-search";
    ClasslessStaticRoute = 121, ByteList, "classless-static-routes";
}

struct Registry {
    by_code: [Option<RegistryEntry>; 256],
    by_name: HashMap<&'static str, u8>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let mut by_code = [None; 256];
    let mut by_name = HashMap::with_capacity(ENTRIES.len());
    for entry in ENTRIES {
        by_code[entry.code as usize] = Some(*entry);
        by_name.insert(entry.name, entry.code);
    }
    Registry { by_code, by_name }
});

/// Looks up the registry row for `code`.
pub fn entry(code: u8) -> Option<RegistryEntry> {
    REGISTRY.by_code[code as usize]
}

/// Returns the registered format of `code`, or `None` for unknown codes.
pub fn format_of(code: u8) -> Option<OptionFormat> {
    entry(code).map(|entry| entry.format)
}

/// True when `code` is registered with exactly `format`.
pub fn is_format(code: u8, format: OptionFormat) -> bool {
    format_of(code) == Some(format)
}

/// Canonical name of `code`, if registered.
pub fn name_of(code: u8) -> Option<&'static str> {
    entry(code).map(|entry| entry.name)
}

/// Reverse lookup used by configuration files.
pub fn code_by_name(name: &str) -> Option<u8> {
    REGISTRY.by_name.get(name).copied()
}

/// All registered rows in ascending code order.
pub fn entries() -> impl Iterator<Item = &'static RegistryEntry> {
    ENTRIES.iter()
}
