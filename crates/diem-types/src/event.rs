//! Event keys and contract events.

use std::fmt;
use std::str::FromStr;

use diem_primitives::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use diem_primitives::{AccountAddress, PrimitivesError};

use crate::type_tag::TypeTag;

/// A 24-byte event stream key: u64 LE creation number followed by the
/// owning account address.
///
/// On the canonical wire the key is a length-prefixed byte string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey([u8; EventKey::LENGTH]);

impl EventKey {
    /// Size of an event key in bytes.
    pub const LENGTH: usize = 8 + AccountAddress::LENGTH;

    /// Build a key from its creation number and owning address.
    pub fn new(creation_number: u64, address: AccountAddress) -> Self {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[..8].copy_from_slice(&creation_number.to_le_bytes());
        bytes[8..].copy_from_slice(address.as_bytes());
        EventKey(bytes)
    }

    /// Create a key from a 24-byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; Self::LENGTH] = bytes.try_into().map_err(|_| PrimitivesError::InvalidLength {
            what: "event key",
            expected: Self::LENGTH,
            got: bytes.len(),
        })?;
        Ok(EventKey(arr))
    }

    /// Parse a key from 48 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// The creation number of the event stream.
    pub fn creation_number(&self) -> u64 {
        let mut n = [0u8; 8];
        n.copy_from_slice(&self.0[..8]);
        u64::from_le_bytes(n)
    }

    /// The account that owns the event stream.
    pub fn address(&self) -> AccountAddress {
        let mut addr = [0u8; AccountAddress::LENGTH];
        addr.copy_from_slice(&self.0[8..]);
        AccountAddress::new(addr)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for EventKey {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKey::from_hex(s)
    }
}

impl CanonicalSerialize for EventKey {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_bytes(&self.0);
    }
}

impl CanonicalDeserialize for EventKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        EventKey::from_bytes(&deserializer.read_bytes()?)
    }
}

/// An event emitted by a transaction. Only `V0` (index 0) exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContractEvent {
    V0 {
        key: EventKey,
        sequence_number: u64,
        type_tag: TypeTag,
        event_data: Vec<u8>,
    },
}

impl ContractEvent {
    /// Create a `V0` event.
    pub fn new(key: EventKey, sequence_number: u64, type_tag: TypeTag, event_data: Vec<u8>) -> Self {
        ContractEvent::V0 { key, sequence_number, type_tag, event_data }
    }

    pub fn key(&self) -> &EventKey {
        match self {
            ContractEvent::V0 { key, .. } => key,
        }
    }

    pub fn sequence_number(&self) -> u64 {
        match self {
            ContractEvent::V0 { sequence_number, .. } => *sequence_number,
        }
    }

    pub fn type_tag(&self) -> &TypeTag {
        match self {
            ContractEvent::V0 { type_tag, .. } => type_tag,
        }
    }

    pub fn event_data(&self) -> &[u8] {
        match self {
            ContractEvent::V0 { event_data, .. } => event_data,
        }
    }
}

impl CanonicalSerialize for ContractEvent {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            ContractEvent::V0 { key, sequence_number, type_tag, event_data } => {
                serializer.write_variant_index(0);
                key.serialize(serializer);
                serializer.write_u64(*sequence_number);
                type_tag.serialize(serializer);
                serializer.write_bytes(event_data);
            }
        }
    }
}

impl CanonicalDeserialize for ContractEvent {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(ContractEvent::V0 {
                key: EventKey::deserialize(deserializer)?,
                sequence_number: deserializer.read_u64()?,
                type_tag: TypeTag::deserialize(deserializer)?,
                event_data: deserializer.read_bytes()?,
            }),
            index => Err(PrimitivesError::UnknownVariant { type_name: "ContractEvent", index }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diem_primitives::bcs::{from_bytes, to_bytes};

    #[test]
    fn test_event_key_parts() {
        let key = EventKey::new(3, AccountAddress::ONE);
        assert_eq!(key.creation_number(), 3);
        assert_eq!(key.address(), AccountAddress::ONE);
        assert_eq!(&key.to_hex()[..16], "0300000000000000");
        assert_eq!(key.to_hex().parse::<EventKey>().unwrap(), key);
    }

    #[test]
    fn test_event_key_is_length_prefixed() {
        let key = EventKey::new(0, AccountAddress::ZERO);
        let bytes = to_bytes(&key);
        assert_eq!(bytes.len(), 25);
        assert_eq!(bytes[0], 24);

        let mut short = vec![23u8];
        short.extend_from_slice(&[0u8; 23]);
        assert_eq!(
            from_bytes::<EventKey>(&short),
            Err(PrimitivesError::InvalidLength { what: "event key", expected: 24, got: 23 })
        );
    }

    #[test]
    fn test_contract_event_roundtrip() {
        let event = ContractEvent::new(EventKey::new(1, AccountAddress::ONE), 42, TypeTag::U64, vec![1, 2, 3]);
        let bytes = to_bytes(&event);
        assert_eq!(bytes[0], 0);
        let back = from_bytes::<ContractEvent>(&bytes).unwrap();
        assert_eq!(back.sequence_number(), 42);
        assert_eq!(back.event_data(), &[1, 2, 3]);
        assert_eq!(back, event);
    }
}
