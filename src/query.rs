use std::io::Cursor;

use bytes::Bytes;
use tracing::instrument;

use crate::{DnsError, Header, Name, Networkable, Question, RecordType};

/// One parsed, single-question DNS query. Built once per inbound datagram
/// and read-only afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub original: Bytes,
    pub header: Header,
    /// Verbatim question-section bytes, echoed into the response.
    pub question: Bytes,
    pub name: Name,
    pub type_: RecordType,
    pub class: u16,
}

impl Query {
    #[instrument(level = "debug", skip_all)]
    pub fn parse(data: &[u8]) -> Result<Self, DnsError> {
        let mut bytes = Cursor::new(data);
        let header = Header::from_bytes(&mut bytes)?;

        if !validate_length(data, header.num_authorities, header.num_additionals) {
            return Err(DnsError::FormatError);
        }

        // Authority and additional records are taken to be 2 bytes each, so
        // the question section is everything between the header and them.
        let question_end = data.len()
            - header.num_authorities as usize * 2
            - header.num_additionals as usize * 2;
        let question = Question::parse(&data[12..question_end])?;

        if question.name.is_empty() {
            return Err(DnsError::FormatError);
        }

        let query = Self {
            original: Bytes::copy_from_slice(data),
            question: question.bytes,
            name: question.name,
            type_: question.type_,
            class: question.class,
            header,
        };

        // Checked only after the single question parsed cleanly; the record
        // is discarded and the error keeps the transaction id.
        if query.header.num_questions > 1 {
            return Err(DnsError::NotImplemented {
                transaction_id: Some(query.header.id),
                question: None,
            });
        }

        Ok(query)
    }
}

/// The buffer must extend strictly past the header and the fixed-width
/// authority and additional sections.
pub fn validate_length(data: &[u8], authority_count: u16, additional_count: u16) -> bool {
    data.len() > 12 + authority_count as usize * 2 + additional_count as usize * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_question_query() {
        let data =
            b"\x12\x34\x01\x20\x00\x01\x00\x00\x00\x00\x00\x00\x07example\x03com\x00\x00\x01\x00\x01";

        let query = Query::parse(data).unwrap();
        assert_eq!(query.header.id, 0x1234);
        assert!(query.header.flags.rd());
        assert_eq!(query.header.num_questions, 1);
        assert_eq!(query.header.num_answers, 0);
        assert_eq!(query.header.num_authorities, 0);
        assert_eq!(query.header.num_additionals, 0);
        assert_eq!(
            query.question.as_ref(),
            b"\x07example\x03com\x00\x00\x01\x00\x01"
        );
        assert_eq!(query.name.as_str(), "example.com");
        assert_eq!(query.type_, RecordType::A);
        assert_eq!(query.class, 1);
        assert_eq!(query.original.as_ref(), data);
    }

    #[test]
    fn parsing_is_idempotent() {
        let data =
            b"\x12\x34\x01\x20\x00\x01\x00\x00\x00\x00\x00\x00\x07example\x03com\x00\x00\x01\x00\x01";

        assert_eq!(Query::parse(data).unwrap(), Query::parse(data).unwrap());
    }

    #[test]
    fn rejects_multiple_questions() {
        let data = b"\x12\x34\x01\x20\x00\x02\x00\x00\x00\x00\x00\x00\x07example\x03com\x00\x00\x01\x00\x01\x07example\x03net\x00\x00\x01\x00\x01";

        // Both questions are individually well-formed; the count alone
        // decides.
        assert_eq!(
            Query::parse(data),
            Err(DnsError::NotImplemented {
                transaction_id: Some(0x1234),
                question: None,
            })
        );
    }

    #[test]
    fn rejects_an_empty_domain_name() {
        let data = b"\x12\x34\x01\x20\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x01\x00\x01";

        assert_eq!(Query::parse(data), Err(DnsError::FormatError));
    }

    #[test]
    fn rejects_a_question_with_a_short_tail() {
        // The terminator lands early, leaving fewer than 4 bytes of type and
        // class behind it.
        let data =
            b"\x12\x34\x01\x20\x00\x01\x00\x00\x00\x00\x00\x00\x07example\x03com\x00\x01\x00\x01";

        assert_eq!(Query::parse(data), Err(DnsError::FormatError));
    }

    #[test]
    fn rejects_short_buffers() {
        assert_eq!(Query::parse(b"\x12\x34\x01\x20"), Err(DnsError::FormatError));
    }

    #[test]
    fn trims_fixed_width_trailing_records() {
        // Known limitation, preserved on purpose: authority and additional
        // records are accounted as exactly 2 bytes each, which only matches
        // real DNS traffic when both counts are zero.
        let mut data = Vec::new();
        data.extend_from_slice(b"\x12\x34\x01\x20\x00\x01\x00\x00\x00\x00\x00\x01");
        data.extend_from_slice(b"\x07example\x03com\x00\x00\x01\x00\x01");
        data.extend_from_slice(b"\xde\xad");

        let query = Query::parse(&data).unwrap();
        assert_eq!(
            query.question.as_ref(),
            b"\x07example\x03com\x00\x00\x01\x00\x01"
        );
    }

    #[test]
    fn validates_the_strict_length_bound() {
        assert!(validate_length(&vec![0; 17], 1, 1));
        assert!(validate_length(&vec![0; 13], 0, 0));

        assert!(!validate_length(&vec![0; 16], 1, 1));
        assert!(!validate_length(&vec![0; 16], 3, 5));
        assert!(!validate_length(&vec![0; 16], 1, 5));
        assert!(!validate_length(&vec![0; 16], 2, 2));
        assert!(!validate_length(&[], 0, 0));
        assert!(!validate_length(&vec![0; 11], 0, 0));
        assert!(!validate_length(&vec![0; 12], 0, 0));
    }
}
