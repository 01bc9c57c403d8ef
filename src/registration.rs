use std::io::Cursor;

use bytes::{Buf, Bytes};
use itertools::Itertools;
use tracing::instrument;

use crate::{DnsError, Name, Networkable, RecordType};

/// A parsed registration request.
///
/// Wire layout: transaction id (2) · record type code (2) · name length L
/// (1, excluding the zero terminator) · name section (L + 1 bytes,
/// zero-terminated) · record data length R (2) · record data (R bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub original: Bytes,
    pub transaction_id: u16,
    pub type_: RecordType,
    pub name: Name,
    /// Record data rendered as a dotted-decimal address string.
    pub address: String,
}

impl RegistrationRequest {
    #[instrument(level = "debug", skip_all)]
    pub fn parse(data: &[u8]) -> Result<Self, DnsError> {
        if data.len() < 5 {
            return Err(DnsError::FormatError);
        }

        let mut bytes = Cursor::new(data);
        let transaction_id = bytes.get_u16();
        let type_code = bytes.get_u16();
        let name_len = bytes.get_u8() as usize;

        let name_end = 5 + name_len + 1;
        if data.len() < name_end + 2 {
            return Err(DnsError::FormatError);
        }

        // The declared lengths must account for the buffer exactly.
        let data_len = u16::from_be_bytes([data[name_end], data[name_end + 1]]) as usize;
        if data.len() != name_end + 2 + data_len {
            return Err(DnsError::FormatError);
        }

        let name = Name::from_bytes(&mut Cursor::new(&data[5..name_end]))?;
        if name.is_empty() {
            return Err(DnsError::FormatError);
        }

        let type_ = RecordType::try_from(type_code).or(Err(DnsError::FormatError))?;

        let address = decode_address(&data[name_end + 2..]);
        if address.is_empty() {
            return Err(DnsError::FormatError);
        }

        Ok(Self {
            original: Bytes::copy_from_slice(data),
            transaction_id,
            type_,
            name,
            address,
        })
    }
}

/// Record data bytes rendered as dotted decimal. Any byte count is accepted;
/// the declared record data length is the only bound enforced.
fn decode_address(data: &[u8]) -> String {
    data.iter().join(".")
}
