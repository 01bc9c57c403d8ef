use bytes::Bytes;
use thiserror::Error;

/// Everything that can go wrong while handling a datagram. The variants that
/// answer the client with context carry it as named fields, so the response
/// path can pattern-match instead of re-parsing the failed message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnsError {
    #[error("unknown record type code {0}")]
    UnknownRecordType(u16),

    #[error("malformed message")]
    FormatError,

    #[error("no record for the requested domain")]
    NoRecord {
        transaction_id: Option<u16>,
        question: Option<Bytes>,
    },

    #[error("functionality not implemented")]
    NotImplemented {
        transaction_id: Option<u16>,
        question: Option<Bytes>,
    },

    #[error("server failure: {0}")]
    ServerFailure(String),
}

impl DnsError {
    /// The DNS RCODE this failure answers with. Anything unclassified
    /// degrades to a server failure.
    pub fn rcode(&self) -> u8 {
        match self {
            Self::FormatError => 1,
            Self::NoRecord { .. } => 3,
            Self::NotImplemented { .. } => 4,
            Self::UnknownRecordType(_) | Self::ServerFailure(_) => 2,
        }
    }

    pub fn transaction_id(&self) -> Option<u16> {
        match self {
            Self::NoRecord { transaction_id, .. }
            | Self::NotImplemented { transaction_id, .. } => *transaction_id,
            _ => None,
        }
    }

    /// The verbatim question bytes of the failed query, when the parse got
    /// far enough to capture them.
    pub fn question(&self) -> Option<&Bytes> {
        match self {
            Self::NoRecord { question, .. } | Self::NotImplemented { question, .. } => {
                question.as_ref()
            }
            _ => None,
        }
    }
}
