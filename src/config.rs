use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use crate::convert;
use crate::error::{Error, Result};
use crate::options::DhcpOption;
use crate::registry::{self, OptionFormat};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen endpoint as `host:port`.
    pub listen: String,
    pub server_ip: Ipv4Addr,
    pub strict_parsing: bool,
    pub pool: PoolConfig,
    /// Options installed into every reply, in order.
    pub options: Vec<OptionSetting>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub core_workers: usize,
    pub max_workers: usize,
    pub keep_alive_secs: u64,
    pub queue_depth: usize,
}

/// A policy option as written in the config file.
///
/// `name` is a registry name (`"domain-name-servers"`) or a decimal code.
/// `value` is parsed according to the option's format: dotted quads,
/// comma-separated lists, decimal integers, raw strings, or hex for byte
/// lists and unregistered codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSetting {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub mirror: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:67".to_string(),
            server_ip: Ipv4Addr::new(127, 0, 0, 1),
            strict_parsing: true,
            pool: PoolConfig::default(),
            options: Vec::new(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core_workers: 2,
            max_workers: 4,
            keep_alive_secs: 10,
            queue_depth: 20,
        }
    }
}

impl PoolConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl Config {
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if self.pool.core_workers == 0 {
            return Err(Error::InvalidConfig(
                "pool.core_workers must be greater than 0".to_string(),
            ));
        }

        if self.pool.max_workers < self.pool.core_workers {
            return Err(Error::InvalidConfig(
                "pool.max_workers must be greater than or equal to pool.core_workers".to_string(),
            ));
        }

        if self.pool.queue_depth == 0 {
            return Err(Error::InvalidConfig(
                "pool.queue_depth must be greater than 0".to_string(),
            ));
        }

        self.policy_options()?;

        Ok(())
    }

    /// Resolves `listen` to the first IPv4 socket address it names.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let mut addrs = self.listen.to_socket_addrs().map_err(|error| {
            Error::InvalidConfig(format!("listen address {:?}: {}", self.listen, error))
        })?;

        addrs.find(SocketAddr::is_ipv4).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "listen address {:?} has no IPv4 address",
                self.listen
            ))
        })
    }

    pub fn policy_options(&self) -> Result<Vec<DhcpOption>> {
        self.options.iter().map(OptionSetting::to_option).collect()
    }
}

impl OptionSetting {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            mirror: false,
        }
    }

    pub fn to_option(&self) -> Result<DhcpOption> {
        let code = registry::code_by_name(&self.name)
            .or_else(|| self.name.parse::<u8>().ok())
            .ok_or_else(|| Error::InvalidConfig(format!("unknown option {:?}", self.name)))?;

        let value = self.encode_value(code).map_err(|error| {
            Error::InvalidConfig(format!(
                "option {} value {:?}: {}",
                self.name, self.value, error
            ))
        })?;

        DhcpOption::with_mirror(code, value, self.mirror)
            .map_err(|error| Error::InvalidConfig(format!("option {}: {}", self.name, error)))
    }

    fn encode_value(&self, code: u8) -> Result<Vec<u8>> {
        let text = self.value.trim();
        match registry::format_of(code) {
            Some(OptionFormat::Inet) => Ok(parse_number::<Ipv4Addr>(text)?.octets().to_vec()),
            Some(OptionFormat::InetList) => Ok(list(text)
                .map(parse_number::<Ipv4Addr>)
                .collect::<Result<Vec<_>>>()?
                .iter()
                .flat_map(|addr| addr.octets())
                .collect()),
            Some(OptionFormat::Int) => Ok(convert::int_to_bytes(parse_number(text)?).to_vec()),
            Some(OptionFormat::Short) => Ok(convert::short_to_bytes(parse_number(text)?).to_vec()),
            Some(OptionFormat::ShortList) => Ok(convert::shorts_to_bytes(
                &list(text).map(parse_number).collect::<Result<Vec<u16>>>()?,
            )),
            Some(OptionFormat::Byte) => Ok(vec![parse_number::<u8>(text)?]),
            Some(OptionFormat::String) => Ok(convert::string_to_bytes(&self.value)),
            Some(OptionFormat::ByteList) | None => convert::hex_to_bytes(text),
        }
    }
}

fn list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T> {
    text.parse::<T>()
        .map_err(|_| Error::InvalidArgument(format!("cannot parse {:?}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OptionCode;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr().unwrap(), "127.0.0.1:67".parse().unwrap());
        assert_eq!(config.pool.core_workers, 2);
        assert_eq!(config.pool.max_workers, 4);
        assert_eq!(config.pool.keep_alive(), Duration::from_secs(10));
        assert_eq!(config.pool.queue_depth, 20);
    }

    #[test]
    fn test_max_workers_below_core() {
        let config = Config {
            pool: PoolConfig {
                core_workers: 4,
                max_workers: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_queue_depth() {
        let config = Config {
            pool: PoolConfig {
                queue_depth: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_listen_address() {
        let config = Config {
            listen: "not an address".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_option_settings_by_format() {
        let config = Config {
            options: vec![
                OptionSetting::new("subnet-mask", "255.255.255.0"),
                OptionSetting::new("routers", "10.0.0.254, 10.0.0.253"),
                OptionSetting::new("dhcp-lease-time", "86400"),
                OptionSetting::new("interface-mtu", "1500"),
                OptionSetting::new("path-mtu-plateau-table", "68,296"),
                OptionSetting::new("default-ip-ttl", "64"),
                OptionSetting::new("domain-name", "example.test"),
                OptionSetting::new("vendor-encapsulated-options", "0x0102"),
                OptionSetting::new("224", "cafe"),
            ],
            ..Default::default()
        };

        let options = config.policy_options().unwrap();
        assert_eq!(options[0].as_inet_addr().unwrap(), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(options[1].as_inet_addrs().unwrap().len(), 2);
        assert_eq!(options[2].as_int().unwrap(), 86400);
        assert_eq!(options[3].as_short().unwrap(), 1500);
        assert_eq!(options[4].as_shorts().unwrap(), vec![68, 296]);
        assert_eq!(options[5].as_byte().unwrap(), 64);
        assert_eq!(options[6].as_string().unwrap(), "example.test");
        assert_eq!(options[7].as_bytes().unwrap(), &[1, 2]);
        assert_eq!(options[8].code(), 224);
        assert_eq!(options[8].value(), &[0xca, 0xfe]);
    }

    #[test]
    fn test_mirror_setting() {
        let setting = OptionSetting {
            name: "host-name".to_string(),
            value: "default".to_string(),
            mirror: true,
        };
        let option = setting.to_option().unwrap();
        assert_eq!(option.code(), OptionCode::HostName as u8);
        assert!(option.is_mirror());
    }

    #[test]
    fn test_bad_option_settings() {
        assert!(OptionSetting::new("no-such-option", "1").to_option().is_err());
        assert!(OptionSetting::new("subnet-mask", "255.255.255").to_option().is_err());
        assert!(OptionSetting::new("dhcp-lease-time", "forever").to_option().is_err());
        assert!(OptionSetting::new("0", "00").to_option().is_err());
        assert!(OptionSetting::new("255", "00").to_option().is_err());

        let config = Config {
            options: vec![OptionSetting::new("routers", "10.0.0.1,bogus")],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_json_roundtrip_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"listen": "0.0.0.0:1067"}"#).unwrap();
        assert_eq!(config.listen, "0.0.0.0:1067");
        assert_eq!(config.pool.queue_depth, 20);
        assert!(config.strict_parsing);

        let text = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&text).unwrap();
        assert_eq!(back.listen, config.listen);
    }
}
