use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::response::{build_error, build_registration_ack, build_success};
use crate::{DnsError, Query, RecordStore, RecordType, RegistrationRequest, Registry};

/// Where the two endpoints listen.
#[derive(Debug, Clone)]
pub struct Config {
    pub query_addr: SocketAddr,
    pub registration_addr: SocketAddr,
}

/// Binds both endpoints and serves datagrams until the process is stopped.
/// Every datagram is answered exactly once; a failing datagram is answered
/// with an error response and never takes the process down.
pub async fn run(config: Config, registry: Registry) -> io::Result<()> {
    let query_sock = UdpSocket::bind(config.query_addr).await?;
    let registration_sock = UdpSocket::bind(config.registration_addr).await?;

    info!(addr = %config.query_addr, "listening for DNS queries");
    info!(addr = %config.registration_addr, "listening for registration requests");

    let registry = Arc::new(Mutex::new(registry));

    // http://www.dnsflagday.net/2020/
    let mut query_buf = [0; 1232];
    let mut registration_buf = [0; 1232];

    loop {
        tokio::select! {
            received = query_sock.recv_from(&mut query_buf) => {
                let (len, addr) = match received {
                    Ok(received) => received,
                    Err(e) => {
                        warn!(error = %e, "query socket receive failed");
                        continue;
                    }
                };

                debug!(%addr, len, "received DNS query");
                let response = {
                    let registry = registry.lock().unwrap();
                    handle_query(&*registry, &query_buf[..len])
                };
                if let Err(e) = query_sock.send_to(&response, addr).await {
                    warn!(error = %e, %addr, "failed to send query response");
                }
            }
            received = registration_sock.recv_from(&mut registration_buf) => {
                let (len, addr) = match received {
                    Ok(received) => received,
                    Err(e) => {
                        warn!(error = %e, "registration socket receive failed");
                        continue;
                    }
                };

                debug!(%addr, len, "received registration request");
                let response = {
                    let mut registry = registry.lock().unwrap();
                    handle_registration(&mut *registry, &registration_buf[..len])
                };
                if let Err(e) = registration_sock.send_to(&response, addr).await {
                    warn!(error = %e, %addr, "failed to send registration response");
                }
            }
        }
    }
}

/// Answers one DNS query datagram. Always yields a response buffer.
pub fn handle_query<S: RecordStore>(registry: &S, data: &[u8]) -> Bytes {
    match query_response(registry, data) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "query failed");
            error_response(&e, data)
        }
    }
}

fn query_response<S: RecordStore>(registry: &S, data: &[u8]) -> Result<Bytes, DnsError> {
    let query = Query::parse(data)?;

    if query.type_ != RecordType::A {
        return Err(DnsError::NotImplemented {
            transaction_id: Some(query.header.id),
            question: Some(query.question.clone()),
        });
    }

    let address = registry
        .resolve(query.name.as_str())
        .ok_or_else(|| DnsError::NoRecord {
            transaction_id: Some(query.header.id),
            question: Some(query.question.clone()),
        })?;

    debug!(domain = %query.name, %address, "resolved");

    build_success(&query, &address)
}

/// Answers one registration datagram. Always yields a response buffer.
pub fn handle_registration<S: RecordStore>(registry: &mut S, data: &[u8]) -> Bytes {
    match registration_response(registry, data) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "registration failed");
            error_response(&e, data)
        }
    }
}

fn registration_response<S: RecordStore>(registry: &mut S, data: &[u8]) -> Result<Bytes, DnsError> {
    let request = RegistrationRequest::parse(data)?;

    if request.type_ != RecordType::A {
        return Err(DnsError::NotImplemented {
            transaction_id: Some(request.transaction_id),
            question: None,
        });
    }

    info!(domain = %request.name, address = %request.address, "registered");

    let transaction_id = request.transaction_id;
    registry.register(request.name.0, request.address);

    Ok(build_registration_ack(transaction_id))
}

/// Maps a failure onto the wire. The echoed transaction id is recovered from
/// the raw datagram; an unclassified failure answers with the all-zero
/// placeholder instead.
fn error_response(error: &DnsError, data: &[u8]) -> Bytes {
    let transaction_id = match error {
        DnsError::ServerFailure(_) | DnsError::UnknownRecordType(_) => None,
        _ => peer_transaction_id(data),
    };

    build_error(
        error.rcode(),
        transaction_id,
        error.question().map(|question| question.as_ref()),
    )
}

/// The first two datagram bytes, when present.
fn peer_transaction_id(data: &[u8]) -> Option<u16> {
    data.get(..2).map(|id| u16::from_be_bytes([id[0], id[1]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Name, Networkable};

    fn query_bytes(id: u16, name: &str, type_: RecordType) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&id.to_be_bytes());
        data.extend_from_slice(b"\x01\x20\x00\x01\x00\x00\x00\x00\x00\x00");
        data.extend_from_slice(&Name::new(name).to_bytes());
        data.extend_from_slice(&type_.to_bytes());
        data.extend_from_slice(b"\x00\x01");
        data
    }

    fn registration_bytes(id: u16, type_code: u16, name: &str, address: &[u8]) -> Vec<u8> {
        let encoded = Name::new(name).to_bytes();
        let mut data = Vec::new();
        data.extend_from_slice(&id.to_be_bytes());
        data.extend_from_slice(&type_code.to_be_bytes());
        data.push((encoded.len() - 1) as u8);
        data.extend_from_slice(&encoded);
        data.extend_from_slice(&(address.len() as u16).to_be_bytes());
        data.extend_from_slice(address);
        data
    }

    #[test]
    fn resolves_a_seeded_domain() {
        let registry = Registry::seeded();
        let data = query_bytes(0x0102, "https://www.google.com", RecordType::A);

        let response = handle_query(&registry, &data);

        assert_eq!(&response[..4], b"\x01\x02\x81\x80");
        assert_eq!(&response[4..12], b"\x00\x01\x00\x01\x00\x00\x00\x00");
        // RDATA carries the registered address.
        assert_eq!(&response[response.len() - 4..], b"\xac\xd9\x01\x6e");
    }

    #[test]
    fn answers_name_error_for_an_unknown_domain() {
        let registry = Registry::new();
        let data = query_bytes(0x0102, "www.example.com", RecordType::A);

        let response = handle_query(&registry, &data);

        assert_eq!(&response[..4], b"\x01\x02\x81\x03");
        assert_eq!(&response[4..12], b"\x00\x01\x00\x00\x00\x00\x00\x00");
        // The question is echoed back past the header.
        assert_eq!(&response[12..], &data[12..]);
    }

    #[test]
    fn answers_not_implemented_for_non_a_queries() {
        let mut registry = Registry::new();
        registry.register("www.example.com".into(), "1.2.3.4".into());
        let data = query_bytes(0x0102, "www.example.com", RecordType::Txt);

        let response = handle_query(&registry, &data);

        assert_eq!(&response[..4], b"\x01\x02\x81\x04");
        assert_eq!(&response[12..], &data[12..]);
    }

    #[test]
    fn answers_format_error_for_garbage() {
        let registry = Registry::new();

        let response = handle_query(&registry, b"\xde\xad\xbe\xef");

        // Transaction id recovered from the datagram, placeholder question.
        assert_eq!(
            response,
            build_error(1, Some(0xdead), None)
        );
    }

    #[test]
    fn answers_format_error_with_zero_id_for_tiny_datagrams() {
        let registry = Registry::new();

        let response = handle_query(&registry, b"\xde");

        assert_eq!(response, build_error(1, None, None));
    }

    #[test]
    fn registers_then_resolves() {
        let mut registry = Registry::new();
        let data = registration_bytes(0x0007, 1, "example.com", &[1, 2, 3, 4]);

        let ack = handle_registration(&mut registry, &data);
        assert_eq!(ack, b"\x00\x07\x01".to_vec());

        let query = query_bytes(0x0008, "example.com", RecordType::A);
        let response = handle_query(&registry, &query);
        assert_eq!(&response[..4], b"\x00\x08\x81\x80");
        assert_eq!(&response[response.len() - 4..], b"\x01\x02\x03\x04");
    }

    #[test]
    fn rejects_non_a_registrations() {
        let mut registry = Registry::new();
        let data = registration_bytes(0x0007, 16, "example.com", &[1, 2, 3, 4]);

        let response = handle_registration(&mut registry, &data);

        assert_eq!(&response[..4], b"\x00\x07\x81\x04");
        assert_eq!(registry.resolve("example.com"), None);
    }

    #[test]
    fn answers_format_error_for_malformed_registrations() {
        let mut registry = Registry::new();

        let response = handle_registration(&mut registry, b"\x00\x07\x00");

        assert_eq!(response, build_error(1, Some(0x0007), None));
    }

    #[test]
    fn degrades_to_server_failure_for_an_unresolvable_record() {
        // A permissively registered 5-octet record cannot be serialized into
        // an A answer; the response degrades to RCODE 2 with no context.
        let mut registry = Registry::new();
        registry.register("example.com".into(), "1.2.3.4.5".into());

        let response = handle_query(&registry, &query_bytes(0x0102, "example.com", RecordType::A));

        assert_eq!(response, build_error(2, None, None));
    }
}
