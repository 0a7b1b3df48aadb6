//! Canonical message construction.
//!
//! Layout (all lengths are decimal byte counts):
//!
//! ```text
//! TG-HMAC-SHA256-V1\n
//! <len>:<METHOD>\n
//! <len>:<path>\n
//! <len>:<timestamp>\n
//! <len>:<nonce>\n        or   -\n   when no nonce is sent
//! <len>:<body>\n
//! ```
//!
//! Every field is length-prefixed, so two distinct field tuples can never
//! encode to the same bytes. An absent nonce is encoded as `-`, which cannot
//! start a length prefix, so "no nonce" and "empty nonce" never collide.

pub const CANONICAL_PREFIX: &[u8] = b"TG-HMAC-SHA256-V1\n";

const ABSENT_FIELD: &[u8] = b"-\n";

/// Fields that are covered by the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalRequest<'a> {
    pub method: &'a str,
    /// Request path. Anything from `?` onwards is ignored.
    pub path: &'a str,
    pub timestamp: &'a str,
    pub nonce: Option<&'a str>,
    /// Raw, unparsed request body.
    pub body: &'a [u8],
}

impl CanonicalRequest<'_> {
    /// Serialize into the exact byte sequence that is signed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let method = self.method.to_ascii_uppercase();
        let path = self.path.split('?').next().unwrap_or_default();

        let mut buf = Vec::with_capacity(CANONICAL_PREFIX.len() + 64 + self.body.len());
        buf.extend_from_slice(CANONICAL_PREFIX);
        push_field(&mut buf, method.as_bytes());
        push_field(&mut buf, path.as_bytes());
        push_field(&mut buf, self.timestamp.as_bytes());
        match self.nonce {
            Some(nonce) => push_field(&mut buf, nonce.as_bytes()),
            None => buf.extend_from_slice(ABSENT_FIELD),
        }
        push_field(&mut buf, self.body);
        buf
    }
}

fn push_field(buf: &mut Vec<u8>, value: &[u8]) {
    buf.extend_from_slice(value.len().to_string().as_bytes());
    buf.push(b':');
    buf.extend_from_slice(value);
    buf.push(b'\n');
}
