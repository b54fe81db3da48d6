//! Typed leaf values and their canonical encoding.
//!
//! A leaf is an ordered tuple of typed fields sharing one schema across the
//! whole tree. Each field encodes to a canonical byte string: fixed 32-byte
//! words for addresses (left-padded) and unsigned integers (big-endian), and a
//! 4-byte big-endian length prefix followed by the raw bytes for variable-width
//! fields. The concatenation in schema order, hashed twice, is the leaf node.

use canopy_core::hasher::NodeHasher;
use canopy_core::tree::Node;

use ruint::aliases::U256;
use std::fmt;
use std::str::FromStr;

/// Number of bytes in an address-like identifier.
pub const ADDRESS_LENGTH: usize = 20;

/// Errors producing the canonical encoding of a leaf value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingError {
    /// The value tuple length does not match the schema.
    FieldCountMismatch { expected: usize, got: usize },
    /// A field value's kind does not match the schema's declared kind.
    KindMismatch { field: usize },
    /// An integer field exceeds its declared bit width.
    IntegerOverflow { field: usize, bits: u16 },
    /// An identifier is not 20 bytes of (optionally `0x`-prefixed) hex.
    MalformedIdentifier,
    /// An integer string could not be parsed.
    MalformedInteger,
    /// A byte-string field was not valid hex.
    MalformedBytes,
    /// A variable-width field exceeds the length-prefix range.
    FieldTooLong { field: usize },
    /// A field-kind specification string was not recognized.
    UnknownKind,
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::FieldCountMismatch { expected, got } => {
                write!(f, "value has {} fields, schema declares {}", got, expected)
            }
            EncodingError::KindMismatch { field } => {
                write!(f, "field {} does not match its declared kind", field)
            }
            EncodingError::IntegerOverflow { field, bits } => {
                write!(f, "field {} exceeds its declared width of {} bits", field, bits)
            }
            EncodingError::MalformedIdentifier => {
                write!(f, "identifier is not {} bytes of hex", ADDRESS_LENGTH)
            }
            EncodingError::MalformedInteger => write!(f, "unparseable integer string"),
            EncodingError::MalformedBytes => write!(f, "byte string is not valid hex"),
            EncodingError::FieldTooLong { field } => {
                write!(f, "field {} exceeds the length-prefix range", field)
            }
            EncodingError::UnknownKind => write!(f, "unrecognized field-kind specification"),
        }
    }
}

impl std::error::Error for EncodingError {}

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, EncodingError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| EncodingError::MalformedIdentifier)?;
        if bytes.len() != ADDRESS_LENGTH {
            return Err(EncodingError::MalformedIdentifier);
        }
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

/// The declared type of one leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 20-byte identifier, encoded left-padded to a 32-byte word.
    Address,
    /// Unsigned integer of the declared bit width (8..=256, multiple of 8),
    /// encoded as a 32-byte big-endian word.
    Uint(u16),
    /// Raw bytes, length-prefixed.
    Bytes,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Address => write!(f, "address"),
            FieldKind::Uint(bits) => write!(f, "uint{}", bits),
            FieldKind::Bytes => write!(f, "bytes"),
        }
    }
}

impl FromStr for FieldKind {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "address" => Ok(FieldKind::Address),
            "bytes" => Ok(FieldKind::Bytes),
            _ => {
                let bits = s
                    .strip_prefix("uint")
                    .and_then(|b| b.parse::<u16>().ok())
                    .ok_or(EncodingError::UnknownKind)?;
                if bits == 0 || bits > 256 || bits % 8 != 0 {
                    return Err(EncodingError::UnknownKind);
                }
                Ok(FieldKind::Uint(bits))
            }
        }
    }
}

/// A single typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// An account identifier.
    Address(Address),
    /// An unsigned integer, at most 256 bits.
    Uint(U256),
    /// A raw byte string.
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Shorthand for an address field parsed from hex.
    pub fn address(s: &str) -> Result<Self, EncodingError> {
        Ok(FieldValue::Address(Address::from_hex(s)?))
    }

    /// Shorthand for an unsigned-integer field.
    pub fn uint(v: u64) -> Self {
        FieldValue::Uint(U256::from(v))
    }

    /// Shorthand for a byte-string field.
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        FieldValue::Bytes(b.into())
    }

    /// The canonical string form, as written into snapshots: hex for addresses
    /// and byte strings, decimal for integers.
    pub fn to_string_repr(&self) -> String {
        match self {
            FieldValue::Address(a) => a.to_string(),
            FieldValue::Uint(v) => v.to_string(),
            FieldValue::Bytes(b) => format!("0x{}", hex::encode(b)),
        }
    }

    /// Parse the canonical string form back, guided by the declared kind.
    pub fn parse(kind: FieldKind, s: &str) -> Result<Self, EncodingError> {
        match kind {
            FieldKind::Address => Ok(FieldValue::Address(Address::from_hex(s)?)),
            FieldKind::Uint(_) => {
                let v = U256::from_str(s).map_err(|_| EncodingError::MalformedInteger)?;
                Ok(FieldValue::Uint(v))
            }
            FieldKind::Bytes => {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let b = hex::decode(s).map_err(|_| EncodingError::MalformedBytes)?;
                Ok(FieldValue::Bytes(b))
            }
        }
    }
}

/// An ordered tuple of typed fields: one tree leaf's raw value.
pub type LeafValue = Vec<FieldValue>;

/// The field-type schema shared by every leaf of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSchema(Vec<FieldKind>);

impl LeafSchema {
    /// A schema from already-typed kinds.
    pub fn new(kinds: Vec<FieldKind>) -> Self {
        LeafSchema(kinds)
    }

    /// A schema from specification strings, e.g. `["address", "uint256"]`.
    pub fn parse(specs: &[&str]) -> Result<Self, EncodingError> {
        specs
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<_>, _>>()
            .map(LeafSchema)
    }

    /// The declared kinds, in field order.
    pub fn kinds(&self) -> &[FieldKind] {
        &self.0
    }

    /// Encode a value tuple into its canonical byte string.
    pub fn encode(&self, value: &[FieldValue]) -> Result<Vec<u8>, EncodingError> {
        if value.len() != self.0.len() {
            return Err(EncodingError::FieldCountMismatch {
                expected: self.0.len(),
                got: value.len(),
            });
        }

        let mut out = Vec::with_capacity(32 * self.0.len());
        for (i, (kind, field)) in self.0.iter().zip(value).enumerate() {
            match (kind, field) {
                (FieldKind::Address, FieldValue::Address(a)) => {
                    out.extend_from_slice(&[0u8; 32 - ADDRESS_LENGTH]);
                    out.extend_from_slice(&a.0);
                }
                (FieldKind::Uint(bits), FieldValue::Uint(v)) => {
                    if v.bit_len() > *bits as usize {
                        return Err(EncodingError::IntegerOverflow {
                            field: i,
                            bits: *bits,
                        });
                    }
                    out.extend_from_slice(&v.to_be_bytes::<32>());
                }
                (FieldKind::Bytes, FieldValue::Bytes(b)) => {
                    let len = u32::try_from(b.len())
                        .map_err(|_| EncodingError::FieldTooLong { field: i })?;
                    out.extend_from_slice(&len.to_be_bytes());
                    out.extend_from_slice(b);
                }
                _ => return Err(EncodingError::KindMismatch { field: i }),
            }
        }
        Ok(out)
    }

    /// Hash one value tuple into its leaf node: canonical encoding, hashed twice.
    pub fn leaf_hash<H: NodeHasher>(&self, value: &[FieldValue]) -> Result<Node, EncodingError> {
        Ok(H::hash_leaf(&self.encode(value)?))
    }
}
