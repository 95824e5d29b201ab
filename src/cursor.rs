use crate::executor::Record;
use crate::order::OrderSpec;
use ::base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use ::base64::Engine as _;
use ::derive_more::{Display, From};
use ::serde_json::Value;
use ::thiserror::Error;

/// Version tag prepended to every cursor payload.
const CURSOR_VERSION: u8 = b'1';
/// Maximum accepted payload size after the base64 layer is removed.
const MAX_CURSOR_BYTES: usize = 8 * 1024;

/// Opaque token encoding a row's position under a given [`OrderSpec`].
///
/// A cursor is only meaningful against the order spec that produced it;
/// pairing them is the caller's responsibility. Decoding against a spec of
/// different arity fails with [`CursorError::KeyCount`].
#[derive(
    Clone, Debug, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("cursor is not valid base64: {0}")]
    Encoding(#[from] ::base64::DecodeError),
    #[error("cursor field is not valid utf-8")]
    Utf8(#[from] ::std::string::FromUtf8Error),
    #[error("unsupported cursor version `{0}`")]
    Version(u8),
    #[error("malformed cursor payload: {0}")]
    Malformed(&'static str),
    #[error("cursor payload of {len} bytes exceeds the {MAX_CURSOR_BYTES} byte cap")]
    TooLong { len: usize },
    #[error("cursor carries {actual} fields but the order spec has {expected}")]
    KeyCount { expected: usize, actual: usize },
    #[error("row has no value for sort field `{field}`")]
    MissingField { field: String },
}

/// Cursor representation of one sort-key value when the key declares no
/// custom serializer: string contents unquoted, every other JSON value via
/// its canonical rendering.
pub(crate) fn raw_value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Encode `row`'s position under `order` as an opaque token.
///
/// Each key's value is serialized (custom codec first, raw rendering
/// otherwise), framed with a length prefix, and the framed payload is
/// base64-encoded behind a version tag. Length prefixes make the encoding
/// collision-proof for field values of any content.
pub fn encode_cursor<R: Record>(order: &OrderSpec, row: &R) -> Result<Cursor, CursorError> {
    let mut payload = vec![CURSOR_VERSION];
    for key in order.iter() {
        let value = row
            .sort_value(&key.field)
            .ok_or_else(|| CursorError::MissingField {
                field: key.field.clone(),
            })?;
        let raw = match &key.serialize {
            Some(serialize) => serialize(&value),
            None => raw_value_string(&value),
        };
        payload.extend_from_slice(raw.len().to_string().as_bytes());
        payload.push(b':');
        payload.extend_from_slice(raw.as_bytes());
    }
    Ok(Cursor(BASE64.encode(payload)))
}

/// Decode a token back into the tuple of sort-key values it was produced
/// from, applying each key's custom deserializer where declared and
/// keeping the raw string otherwise.
pub fn decode_cursor(order: &OrderSpec, cursor: &Cursor) -> Result<Vec<Value>, CursorError> {
    let payload = BASE64.decode(cursor.as_str())?;
    if payload.len() > MAX_CURSOR_BYTES {
        return Err(CursorError::TooLong { len: payload.len() });
    }
    let Some((&version, mut rest)) = payload.split_first() else {
        return Err(CursorError::Malformed("empty payload"));
    };
    if version != CURSOR_VERSION {
        return Err(CursorError::Version(version));
    }

    let mut fields = Vec::with_capacity(order.len());
    while !rest.is_empty() {
        let colon = rest
            .iter()
            .position(|&b| b == b':')
            .ok_or(CursorError::Malformed("missing length prefix"))?;
        let len: usize = ::std::str::from_utf8(&rest[..colon])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or(CursorError::Malformed("invalid length prefix"))?;
        rest = &rest[colon + 1..];
        if rest.len() < len {
            return Err(CursorError::Malformed(
                "field is shorter than its length prefix",
            ));
        }
        fields.push(String::from_utf8(rest[..len].to_vec())?);
        rest = &rest[len..];
    }

    if fields.len() != order.len() {
        return Err(CursorError::KeyCount {
            expected: order.len(),
            actual: fields.len(),
        });
    }
    Ok(order
        .iter()
        .zip(fields)
        .map(|(key, raw)| match &key.deserialize {
            Some(deserialize) => deserialize(&raw),
            None => Value::String(raw),
        })
        .collect())
}
