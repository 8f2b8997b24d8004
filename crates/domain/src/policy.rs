use super::config::{BlacklistConfig, ConfigError, OverwriteConfig};
use super::RecordKind;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

pub const DEFAULT_OVERWRITE_TTL: u32 = 30;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_WIRE_LEN: usize = 255;
const MAX_TXT_STRING_LEN: usize = 255;

/// Check an overwrite target name (CNAME, NS, PTR) and return it without
/// its trailing root dot.
///
/// Labels are 1..=63 bytes of letters, digits, `-` or `_`, and the encoded
/// name fits in 255 bytes.
fn parse_target_name(address: &str) -> Result<String, String> {
    let name = address.strip_suffix('.').unwrap_or(address);
    if name.is_empty() {
        return Err("target name is empty".to_string());
    }

    let mut wire_len = 1;
    for label in name.split('.') {
        if label.is_empty() {
            return Err(format!("'{}' has an empty label", address));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(format!(
                "'{}' has a label longer than {} bytes",
                address, MAX_LABEL_LEN
            ));
        }
        if let Some(c) = label
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(format!("'{}' contains invalid character {:?}", address, c));
        }
        wire_len += label.len() + 1;
    }

    if wire_len > MAX_NAME_WIRE_LEN {
        return Err(format!(
            "'{}' is longer than {} bytes on the wire",
            address, MAX_NAME_WIRE_LEN
        ));
    }
    Ok(name.to_string())
}

/// Payload of a forced answer, already checked against its record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverwriteData {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Name(String),
    Text(String),
}

impl fmt::Display for OverwriteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverwriteData::Ipv4(ip) => write!(f, "{}", ip),
            OverwriteData::Ipv6(ip) => write!(f, "{}", ip),
            OverwriteData::Name(name) => f.write_str(name),
            OverwriteData::Text(text) => write!(f, "\"{}\"", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOverwrite {
    pub name: String,
    pub kind: RecordKind,
    pub data: OverwriteData,
    pub ttl: u32,
}

impl PolicyOverwrite {
    pub fn new(name: impl Into<String>, kind: RecordKind, data: OverwriteData, ttl: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
            ttl,
        }
    }

    /// Compile a configured overwrite, checking that `address` makes sense
    /// for the declared record type.
    pub fn parse(name: &str, entry: &OverwriteConfig) -> Result<Self, ConfigError> {
        let invalid = |reason: String| {
            ConfigError::Validation(format!("Overwrite for '{}': {}", name, reason))
        };

        let kind: RecordKind = entry.record_type.parse().map_err(invalid)?;
        let address = entry.address.trim();
        let data = match kind {
            RecordKind::A => OverwriteData::Ipv4(
                address
                    .parse()
                    .map_err(|_| invalid(format!("'{}' is not an IPv4 address", address)))?,
            ),
            RecordKind::AAAA => OverwriteData::Ipv6(
                address
                    .parse()
                    .map_err(|_| invalid(format!("'{}' is not an IPv6 address", address)))?,
            ),
            RecordKind::CNAME | RecordKind::NS | RecordKind::PTR => {
                OverwriteData::Name(parse_target_name(address).map_err(invalid)?)
            }
            RecordKind::TXT => {
                if entry.address.len() > MAX_TXT_STRING_LEN {
                    return Err(invalid(format!(
                        "TXT data is {} bytes, over the {} byte limit",
                        entry.address.len(),
                        MAX_TXT_STRING_LEN
                    )));
                }
                OverwriteData::Text(entry.address.clone())
            }
            RecordKind::SOA | RecordKind::MX => {
                return Err(invalid(format!("record type {} cannot be overwritten", kind)));
            }
        };

        Ok(Self::new(
            name,
            kind,
            data,
            entry.ttl.unwrap_or(DEFAULT_OVERWRITE_TTL),
        ))
    }

    pub fn matches_type(&self, record_type: u16) -> bool {
        self.kind.code() == record_type
    }
}

/// Exact-name lookup table for overwrites and blacklist entries.
///
/// Immutable once built; reconfiguration builds a new table.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    overwrites: HashMap<String, PolicyOverwrite>,
    blacklist: HashMap<String, Option<String>>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(
        overwrites: &BTreeMap<String, OverwriteConfig>,
        blacklists: &BTreeMap<String, BlacklistConfig>,
    ) -> Result<Self, ConfigError> {
        let mut table = Self::new();
        for (name, entry) in overwrites {
            table = table.with_overwrite(PolicyOverwrite::parse(name, entry)?);
        }
        for (name, entry) in blacklists {
            table
                .blacklist
                .insert(name.clone(), entry.reason().map(str::to_string));
        }
        Ok(table)
    }

    pub fn with_overwrite(mut self, overwrite: PolicyOverwrite) -> Self {
        self.overwrites.insert(overwrite.name.clone(), overwrite);
        self
    }

    pub fn with_blacklisted(mut self, name: impl Into<String>) -> Self {
        self.blacklist.insert(name.into(), None);
        self
    }

    pub fn lookup_overwrite(&self, name: &str) -> Option<&PolicyOverwrite> {
        self.overwrites.get(name)
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.contains_key(name)
    }

    pub fn blacklist_reason(&self, name: &str) -> Option<&str> {
        self.blacklist.get(name).and_then(|reason| reason.as_deref())
    }

    pub fn overwrites(&self) -> impl Iterator<Item = &PolicyOverwrite> {
        self.overwrites.values()
    }

    pub fn overwrite_count(&self) -> usize {
        self.overwrites.len()
    }

    pub fn blacklist_count(&self) -> usize {
        self.blacklist.len()
    }
}
