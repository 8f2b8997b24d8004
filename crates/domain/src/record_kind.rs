use std::fmt;
use std::str::FromStr;

/// Record types the proxy knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
}

impl RecordKind {
    pub fn code(&self) -> u16 {
        match self {
            RecordKind::A => 1,
            RecordKind::NS => 2,
            RecordKind::CNAME => 5,
            RecordKind::SOA => 6,
            RecordKind::PTR => 12,
            RecordKind::MX => 15,
            RecordKind::TXT => 16,
            RecordKind::AAAA => 28,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(RecordKind::A),
            2 => Some(RecordKind::NS),
            5 => Some(RecordKind::CNAME),
            6 => Some(RecordKind::SOA),
            12 => Some(RecordKind::PTR),
            15 => Some(RecordKind::MX),
            16 => Some(RecordKind::TXT),
            28 => Some(RecordKind::AAAA),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::A => "A",
            RecordKind::NS => "NS",
            RecordKind::CNAME => "CNAME",
            RecordKind::SOA => "SOA",
            RecordKind::PTR => "PTR",
            RecordKind::MX => "MX",
            RecordKind::TXT => "TXT",
            RecordKind::AAAA => "AAAA",
        }
    }

    /// Human-readable name for any type code, `TYPE<n>` when unknown.
    pub fn label(code: u16) -> String {
        match Self::from_code(code) {
            Some(kind) => kind.as_str().to_string(),
            None => format!("TYPE{}", code),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(RecordKind::A),
            "NS" => Ok(RecordKind::NS),
            "CNAME" => Ok(RecordKind::CNAME),
            "SOA" => Ok(RecordKind::SOA),
            "PTR" => Ok(RecordKind::PTR),
            "MX" => Ok(RecordKind::MX),
            "TXT" => Ok(RecordKind::TXT),
            "AAAA" => Ok(RecordKind::AAAA),
            other => Err(format!("unknown record type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_names() {
        for kind in [
            RecordKind::A,
            RecordKind::NS,
            RecordKind::CNAME,
            RecordKind::SOA,
            RecordKind::PTR,
            RecordKind::MX,
            RecordKind::TXT,
            RecordKind::AAAA,
        ] {
            assert_eq!(RecordKind::from_code(kind.code()), Some(kind));
            assert_eq!(kind.as_str().parse::<RecordKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("aaaa".parse::<RecordKind>(), Ok(RecordKind::AAAA));
        assert_eq!(" Cname ".parse::<RecordKind>(), Ok(RecordKind::CNAME));
    }

    #[test]
    fn test_label_falls_back_to_numeric_form() {
        assert_eq!(RecordKind::label(28), "AAAA");
        assert_eq!(RecordKind::label(65), "TYPE65");
    }
}
