use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// A 12-byte document identifier, rendered as 24 hexadecimal characters.
///
/// The first four bytes are the big-endian creation time in seconds, the rest is random,
/// which matches the layout (though not the exact entropy source) of a MongoDB `ObjectId`.
/// Existing clients only ever treat these as opaque strings.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

/// Returned when a string is not a well-formed [`ObjectId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed identifier {0:?}")]
pub struct InvalidIdentifier(pub String);

impl ObjectId {
    pub const HEX_LEN: usize = 24;

    /// Generate a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        // Truncation is fine until 2106.
        let secs = OffsetDateTime::now_utc().unix_timestamp() as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        rand::thread_rng().fill(&mut bytes[4..]);
        Self(bytes)
    }
}

impl FromStr for ObjectId {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `hex::decode_to_slice()` already rejects a wrong length, but checking up front
        // keeps an absurdly long path segment from being echoed back in full by the error.
        if s.len() != Self::HEX_LEN {
            return Err(InvalidIdentifier(s.chars().take(Self::HEX_LEN + 1).collect()));
        }

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidIdentifier(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StrVisitor;

        impl de::Visitor<'_> for StrVisitor {
            type Value = ObjectId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.pad("a 24 character hexadecimal identifier")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(StrVisitor)
    }
}

// Identifiers are stored as `text` so they stay readable in `psql`.
impl Type<Postgres> for ObjectId {
    fn type_info() -> PgTypeInfo {
        <str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <str as Type<Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Postgres> for ObjectId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        <String as Encode<'q, Postgres>>::encode(self.to_string(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for ObjectId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as Decode<'r, Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

/// `OffsetDateTime` serialized as an RFC 3339 (ISO-8601) string.
///
/// `time` has its own `serde` integration but it's behind a feature flag and we only ever
/// want the one format on the wire.
#[derive(sqlx::Type, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamptz(pub OffsetDateTime);

impl Serialize for Timestamptz {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(&Rfc3339).map_err(serde::ser::Error::custom)?)
    }
}
