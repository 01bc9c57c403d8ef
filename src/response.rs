use std::net::Ipv4Addr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::{DnsError, Flags, Header, Networkable, Query};

/// Class IN, the only class ever written into an answer.
const CLASS_IN: u16 = 1;

/// Fixed answer TTL in seconds.
const ANSWER_TTL: u32 = 14;

/// Question section substituted into error responses when the failing
/// datagram yielded none: empty name, type 0, class 1.
const EMPTY_QUESTION: [u8; 6] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x01];

/// Builds the answer for a resolved query: the question echoed verbatim,
/// then one A record whose name is a compression pointer back to the
/// question name at offset 12.
pub fn build_success(query: &Query, address: &str) -> Result<Bytes, DnsError> {
    let address: Ipv4Addr = address.parse().map_err(|_| {
        DnsError::ServerFailure(format!("registered address is not an IPv4 literal: {address}"))
    })?;

    let mut flags = Flags::default();
    flags.set_qr(true);
    flags.set_rd(true);
    flags.set_ra(true);

    let mut header = Header::new(query.header.id, flags);
    header.num_questions = 1;
    header.num_answers = 1;

    let mut response = BytesMut::new();
    response.extend_from_slice(&header.to_bytes());
    response.extend_from_slice(&query.question);
    response.put_u16(0xc00c); // name: pointer to the question name
    response.extend_from_slice(&query.type_.to_bytes());
    response.put_u16(CLASS_IN);
    response.put_u32(ANSWER_TTL);
    response.put_u16(4); // RDLENGTH
    response.extend_from_slice(&address.octets());

    Ok(response.freeze())
}

/// Builds an error response around the given RCODE. Context the failing
/// datagram did not yield falls back to fixed placeholders.
pub fn build_error(rcode: u8, transaction_id: Option<u16>, question: Option<&[u8]>) -> Bytes {
    let mut response = BytesMut::new();
    response.put_u16(transaction_id.unwrap_or(0));
    response.put_u8(0x81);
    response.put_u8(rcode);
    response.put_u16(1); // one question
    response.put_u16(0); // no answers
    response.put_u16(0); // no authority records
    response.put_u16(0); // no additional records
    response.extend_from_slice(question.unwrap_or(&EMPTY_QUESTION));

    response.freeze()
}

/// Acknowledges a registration: the transaction id and one success byte.
pub fn build_registration_ack(transaction_id: u16) -> Bytes {
    let mut response = BytesMut::with_capacity(3);
    response.put_u16(transaction_id);
    response.put_u8(0x01);

    response.freeze()
}
