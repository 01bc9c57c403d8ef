use std::io::Cursor;

use bytes::{Buf, Bytes};

use crate::{DnsError, Name, Networkable, RecordType};

/// One parsed question section. The verbatim byte span is kept alongside the
/// decoded fields so a response can echo the question untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: Name,
    pub type_: RecordType,
    pub class: u16,
    pub bytes: Bytes,
}

impl Question {
    /// Parses a question span: a name followed by a 2-byte type and a 2-byte
    /// class. An unknown record type is a structural failure here, the same
    /// as a truncated span.
    pub fn parse(span: &[u8]) -> Result<Self, DnsError> {
        let mut bytes = Cursor::new(span);

        let name = Name::from_bytes(&mut bytes)?;

        if bytes.remaining() < 4 {
            return Err(DnsError::FormatError);
        }

        let type_ = RecordType::try_from(bytes.get_u16()).or(Err(DnsError::FormatError))?;
        let class = bytes.get_u16();

        Ok(Self {
            name,
            type_,
            class,
            bytes: Bytes::copy_from_slice(span),
        })
    }
}
