use crate::DnsError;

/// The record types this server recognizes on the wire. The table is closed:
/// construction from any other code fails, never yielding a partial value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    A = 1,
    Ns = 2,
    Cname = 5,
    Soa = 6,
    Ptr = 12,
    Mx = 15,
    Txt = 16,
    Aaaa = 28,
    Srv = 33,
    Any = 255,
}

impl RecordType {
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Fixed 2-byte big-endian wire form.
    pub fn to_bytes(self) -> [u8; 2] {
        self.code().to_be_bytes()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Ns => "NS",
            Self::Cname => "CNAME",
            Self::Soa => "SOA",
            Self::Ptr => "PTR",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Aaaa => "AAAA",
            Self::Srv => "SRV",
            Self::Any => "ANY",
        }
    }
}

impl TryFrom<u16> for RecordType {
    type Error = DnsError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::A),
            2 => Ok(Self::Ns),
            5 => Ok(Self::Cname),
            6 => Ok(Self::Soa),
            12 => Ok(Self::Ptr),
            15 => Ok(Self::Mx),
            16 => Ok(Self::Txt),
            28 => Ok(Self::Aaaa),
            33 => Ok(Self::Srv),
            255 => Ok(Self::Any),
            other => Err(DnsError::UnknownRecordType(other)),
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
