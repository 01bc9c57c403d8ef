use std::fmt::Display;
use std::io::Cursor;

use bytes::Buf;

use crate::{DnsError, Networkable};

/// A decoded domain name, e.g. `www.example.com` or `https://www.example.com`.
///
/// On the wire a name is a run of length-prefixed labels closed by a
/// zero-length label. Two non-standard leading labels are recognized as
/// literal scheme markers rather than ordinary labels: length 7 reading
/// `http` and length 8 reading `https`.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Networkable for Name {
    fn to_bytes(&self) -> Vec<u8> {
        let mut ret = Vec::new();

        let rest = if let Some(rest) = self.0.strip_prefix("http://") {
            ret.push(7);
            ret.extend_from_slice(b"http");
            rest
        } else if let Some(rest) = self.0.strip_prefix("https://") {
            ret.push(8);
            ret.extend_from_slice(b"https");
            rest
        } else {
            &self.0
        };

        if !rest.is_empty() {
            for section in rest.split('.') {
                ret.push(section.len() as u8);
                ret.extend_from_slice(section.as_bytes());
            }
        }

        ret.push(0);

        ret
    }

    fn from_bytes(bytes: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let mut name = String::new();

        // A scheme marker consumes a different width than an ordinary label
        // (length byte plus 4 or 5 marker bytes) and inserts no dot, so it is
        // handled before the label loop.
        let rest = bytes.chunk();
        let scheme = if rest.len() >= 5 && rest[0] == 7 && rest[1..5] == *b"http" {
            Some(("http://", 5))
        } else if rest.len() >= 6 && rest[0] == 8 && rest[1..6] == *b"https" {
            Some(("https://", 6))
        } else {
            None
        };
        if let Some((prefix, width)) = scheme {
            name.push_str(prefix);
            bytes.advance(width);
        }

        let mut first = true;
        loop {
            if bytes.remaining() < 1 {
                return Err(DnsError::FormatError);
            }

            let len = bytes.get_u8() as usize;
            if len == 0 {
                break;
            }

            if bytes.remaining() < len {
                return Err(DnsError::FormatError);
            }

            if !first {
                name.push('.');
            }

            let chars = bytes.copy_to_bytes(len);
            let s = std::str::from_utf8(&chars).or(Err(DnsError::FormatError))?;
            name.push_str(s);
            first = false;
        }

        Ok(Self(name))
    }
}
