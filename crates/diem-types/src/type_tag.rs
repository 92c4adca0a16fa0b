//! Move type tags and identifiers.
//!
//! Type tags name on-chain types in script type arguments, event types and
//! currency codes. `TypeTag` is recursive (`Vector` and `Struct` carry inner
//! tags), so decoding is bounded by a nesting limit rather than the stack.

use std::fmt;

use diem_primitives::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use diem_primitives::{AccountAddress, PrimitivesError};

use crate::TypesError;

/// Maximum `Vector` / `Struct` nesting accepted when decoding a type tag.
pub const MAX_TYPE_TAG_NESTING: usize = 64;

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        // A leading underscore needs at least one more character.
        Some('_') if s.len() > 1 => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// A Move identifier: non-empty ASCII matching `[A-Za-z_][A-Za-z0-9_]*`,
/// excluding a lone `_`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Create a validated identifier.
    ///
    /// # Arguments
    /// * `s` - The identifier text.
    ///
    /// # Returns
    /// `Ok(Identifier)` or `TypesError::InvalidIdentifier`.
    pub fn new(s: impl Into<String>) -> Result<Self, TypesError> {
        let s = s.into();
        if is_valid_identifier(&s) {
            Ok(Identifier(s))
        } else {
            Err(TypesError::InvalidIdentifier(s))
        }
    }

    /// Return the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl CanonicalSerialize for Identifier {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_str(&self.0);
    }
}

impl CanonicalDeserialize for Identifier {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        let s = deserializer.read_str()?;
        if !is_valid_identifier(&s) {
            return Err(PrimitivesError::InvalidValue { what: "identifier", reason: format!("{:?}", s) });
        }
        Ok(Identifier(s))
    }
}

// ---------------------------------------------------------------------------
// StructTag / TypeTag
// ---------------------------------------------------------------------------

/// A fully qualified struct type: `address::module::name<type_params>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructTag {
    /// Address of the publishing account.
    pub address: AccountAddress,
    /// Module name.
    pub module: Identifier,
    /// Struct name.
    pub name: Identifier,
    /// Generic type arguments.
    pub type_params: Vec<TypeTag>,
}

impl StructTag {
    fn decode(deserializer: &mut Deserializer<'_>, depth: usize) -> Result<Self, PrimitivesError> {
        let address = AccountAddress::deserialize(deserializer)?;
        let module = Identifier::deserialize(deserializer)?;
        let name = Identifier::deserialize(deserializer)?;
        let len = deserializer.read_len()?;
        let mut type_params = Vec::with_capacity(len.min(deserializer.remaining()));
        for _ in 0..len {
            type_params.push(TypeTag::decode(deserializer, depth + 1)?);
        }
        Ok(StructTag { address, module, name, type_params })
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}::{}::{}", self.address, self.module, self.name)?;
        if !self.type_params.is_empty() {
            let params: Vec<String> = self.type_params.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", params.join(", "))?;
        }
        Ok(())
    }
}

impl CanonicalSerialize for StructTag {
    fn serialize(&self, serializer: &mut Serializer) {
        self.address.serialize(serializer);
        self.module.serialize(serializer);
        self.name.serialize(serializer);
        serializer.write_seq(&self.type_params);
    }
}

impl CanonicalDeserialize for StructTag {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        StructTag::decode(deserializer, 0)
    }
}

/// A Move type tag.
///
/// Variant indices: Bool=0, U8=1, U64=2, U128=3, Address=4, Signer=5,
/// Vector=6, Struct=7.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(StructTag),
}

impl TypeTag {
    fn decode(deserializer: &mut Deserializer<'_>, depth: usize) -> Result<Self, PrimitivesError> {
        if depth > MAX_TYPE_TAG_NESTING {
            return Err(PrimitivesError::InvalidValue {
                what: "type tag",
                reason: format!("nesting deeper than {}", MAX_TYPE_TAG_NESTING),
            });
        }
        match deserializer.read_variant_index()? {
            0 => Ok(TypeTag::Bool),
            1 => Ok(TypeTag::U8),
            2 => Ok(TypeTag::U64),
            3 => Ok(TypeTag::U128),
            4 => Ok(TypeTag::Address),
            5 => Ok(TypeTag::Signer),
            6 => Ok(TypeTag::Vector(Box::new(TypeTag::decode(deserializer, depth + 1)?))),
            7 => Ok(TypeTag::Struct(StructTag::decode(deserializer, depth + 1)?)),
            index => Err(PrimitivesError::UnknownVariant { type_name: "TypeTag", index }),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::U8 => f.write_str("u8"),
            TypeTag::U64 => f.write_str("u64"),
            TypeTag::U128 => f.write_str("u128"),
            TypeTag::Address => f.write_str("address"),
            TypeTag::Signer => f.write_str("signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(tag) => write!(f, "{}", tag),
        }
    }
}

impl CanonicalSerialize for TypeTag {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            TypeTag::Bool => serializer.write_variant_index(0),
            TypeTag::U8 => serializer.write_variant_index(1),
            TypeTag::U64 => serializer.write_variant_index(2),
            TypeTag::U128 => serializer.write_variant_index(3),
            TypeTag::Address => serializer.write_variant_index(4),
            TypeTag::Signer => serializer.write_variant_index(5),
            TypeTag::Vector(inner) => {
                serializer.write_variant_index(6);
                inner.serialize(serializer);
            }
            TypeTag::Struct(tag) => {
                serializer.write_variant_index(7);
                tag.serialize(serializer);
            }
        }
    }
}

impl CanonicalDeserialize for TypeTag {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        TypeTag::decode(deserializer, 0)
    }
}

/// The type tag of a currency: `0x1::<code>::<code>`.
///
/// # Arguments
/// * `currency_code` - The currency code, e.g. `"XUS"`.
///
/// # Returns
/// `Ok(TypeTag::Struct)`, or `InvalidIdentifier` if the code is not a valid
/// identifier.
pub fn currency_type_tag(currency_code: &str) -> Result<TypeTag, TypesError> {
    let ident = Identifier::new(currency_code)?;
    Ok(TypeTag::Struct(StructTag {
        address: AccountAddress::ONE,
        module: ident.clone(),
        name: ident,
        type_params: Vec::new(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use diem_primitives::bcs::{from_bytes, to_bytes};

    #[test]
    fn test_identifier_validation() {
        for ok in ["XUS", "a", "_a", "coin_1", "A_B_C"] {
            assert!(Identifier::new(ok).is_ok(), "{ok} should be valid");
        }
        for bad in ["", "_", "1abc", "has space", "dash-ed", "ünï"] {
            assert_eq!(
                Identifier::new(bad),
                Err(TypesError::InvalidIdentifier(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_currency_type_tag() {
        let tag = currency_type_tag("XUS").unwrap();
        assert_eq!(tag.to_string(), "0x00000000000000000000000000000001::XUS::XUS");

        let bytes = to_bytes(&tag);
        let mut expected = vec![7u8];
        expected.extend_from_slice(AccountAddress::ONE.as_bytes());
        expected.extend_from_slice(&[3, b'X', b'U', b'S', 3, b'X', b'U', b'S', 0]);
        assert_eq!(bytes, expected);
        assert_eq!(from_bytes::<TypeTag>(&bytes).unwrap(), tag);

        assert!(currency_type_tag("not a code").is_err());
    }

    #[test]
    fn test_nested_vector_roundtrip() {
        let tag = TypeTag::Vector(Box::new(TypeTag::Vector(Box::new(TypeTag::U8))));
        assert_eq!(to_bytes(&tag), vec![6, 6, 1]);
        assert_eq!(from_bytes::<TypeTag>(&[6, 6, 1]).unwrap(), tag);
        assert_eq!(tag.to_string(), "vector<vector<u8>>");
    }

    #[test]
    fn test_unknown_variant() {
        assert_eq!(
            from_bytes::<TypeTag>(&[8]),
            Err(PrimitivesError::UnknownVariant { type_name: "TypeTag", index: 8 })
        );
    }

    #[test]
    fn test_excessive_nesting_is_rejected() {
        let bytes = vec![6u8; MAX_TYPE_TAG_NESTING + 2];
        assert!(matches!(
            from_bytes::<TypeTag>(&bytes),
            Err(PrimitivesError::InvalidValue { what: "type tag", .. })
        ));
    }

    #[test]
    fn test_decoded_identifier_is_validated() {
        let mut bytes = vec![7u8];
        bytes.extend_from_slice(&[0u8; 16]);
        bytes.extend_from_slice(&[1, b'_', 1, b'A', 0]);
        assert!(matches!(
            from_bytes::<TypeTag>(&bytes),
            Err(PrimitivesError::InvalidValue { what: "identifier", .. })
        ));
    }
}
