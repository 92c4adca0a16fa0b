//! Payment metadata attached to peer-to-peer transfers.
//!
//! Metadata routes funds between non-custodial and custodial accounts via
//! sub-addresses, links refunds to the event they refund, and carries
//! travel-rule reference ids for large transfers.
//!
//! Variant indices are part of the on-chain format and are never
//! renumbered: Undefined=0, GeneralMetadata=1, TravelRuleMetadata=2,
//! UnstructuredBytesMetadata=3.

use diem_primitives::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use diem_primitives::{AccountAddress, PrimitivesError};

use crate::subaddress::SubAddress;
use crate::TypesError;

/// Suffix appended to the travel-rule dual attestation signing message.
pub const TRAVEL_RULE_ATTEST_SUFFIX: &[u8] = b"@@$$DIEM_ATTEST$$@@";

/// Top-level payment metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Metadata {
    Undefined,
    GeneralMetadata(GeneralMetadata),
    TravelRuleMetadata(TravelRuleMetadata),
    UnstructuredBytesMetadata(UnstructuredBytesMetadata),
}

/// Versioned general metadata. Only `V0` (index 0) exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeneralMetadata {
    V0(GeneralMetadataV0),
}

/// Sub-address routing plus an optional referenced event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeneralMetadataV0 {
    /// Sub-address of the receiving end user, if custodial.
    pub to_subaddress: Option<SubAddress>,
    /// Sub-address of the sending end user, if custodial.
    pub from_subaddress: Option<SubAddress>,
    /// Sequence number of the event this payment refers to (refunds).
    pub referenced_event: Option<u64>,
}

/// Versioned travel-rule metadata. Only `V0` (index 0) exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TravelRuleMetadata {
    V0(TravelRuleMetadataV0),
}

/// Off-chain reference id agreed by both VASPs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TravelRuleMetadataV0 {
    pub off_chain_reference_id: Option<String>,
}

/// Opaque application bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnstructuredBytesMetadata {
    pub metadata: Option<Vec<u8>>,
}

impl Metadata {
    /// Payment from a non-custodial account to a custodial end user.
    pub fn non_custodial_to_custodial(to_subaddress: SubAddress) -> Self {
        Self::general(Some(to_subaddress), None, None)
    }

    /// Payment from a custodial end user to a non-custodial account.
    pub fn custodial_to_non_custodial(from_subaddress: SubAddress) -> Self {
        Self::general(None, Some(from_subaddress), None)
    }

    /// Payment between end users of two custodial accounts.
    pub fn custodial_to_custodial(from_subaddress: SubAddress, to_subaddress: SubAddress) -> Self {
        Self::general(Some(to_subaddress), Some(from_subaddress), None)
    }

    /// Metadata for refunding a received payment.
    ///
    /// The received payment's sub-addresses are swapped so the refund is
    /// routed back to the original sender, and `referenced_event` points at
    /// the received event.
    ///
    /// # Arguments
    /// * `received` - Metadata of the payment being refunded.
    /// * `event_sequence_number` - Sequence number of the received-payment event.
    pub fn refund(received: &Metadata, event_sequence_number: u64) -> Self {
        let (to, from) = match received {
            Metadata::GeneralMetadata(GeneralMetadata::V0(v0)) => (v0.from_subaddress, v0.to_subaddress),
            _ => (None, None),
        };
        Self::general(to, from, Some(event_sequence_number))
    }

    /// Wrap opaque bytes.
    pub fn unstructured_bytes(bytes: Vec<u8>) -> Self {
        Metadata::UnstructuredBytesMetadata(UnstructuredBytesMetadata { metadata: Some(bytes) })
    }

    fn general(
        to_subaddress: Option<SubAddress>,
        from_subaddress: Option<SubAddress>,
        referenced_event: Option<u64>,
    ) -> Self {
        Metadata::GeneralMetadata(GeneralMetadata::V0(GeneralMetadataV0 {
            to_subaddress,
            from_subaddress,
            referenced_event,
        }))
    }

    /// Return the general metadata body, if this is general metadata.
    pub fn as_general(&self) -> Option<&GeneralMetadataV0> {
        match self {
            Metadata::GeneralMetadata(GeneralMetadata::V0(v0)) => Some(v0),
            _ => None,
        }
    }

    /// Canonical bytes, as placed in a peer-to-peer script argument.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_canonical_bytes()
    }

    /// Decode metadata from canonical bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        Ok(Self::from_canonical_bytes(bytes)?)
    }

    /// Decode metadata from hex, as reported in payment events.
    pub fn from_hex(hex_str: &str) -> Result<Self, TypesError> {
        let bytes = hex::decode(hex_str).map_err(PrimitivesError::from)?;
        Self::from_bytes(&bytes)
    }
}

/// Build travel-rule metadata and its dual-attestation signing message.
///
/// # Arguments
/// * `off_chain_reference_id` - Reference id agreed off-chain.
/// * `sender` - Address of the paying account.
/// * `amount` - Amount in the currency's smallest unit.
///
/// # Returns
/// The metadata, and the message the receiving VASP signs:
/// `metadata || sender || u64_le(amount) || "@@$$DIEM_ATTEST$$@@"`.
pub fn travel_rule_metadata(
    off_chain_reference_id: &str,
    sender: AccountAddress,
    amount: u64,
) -> (Metadata, Vec<u8>) {
    let metadata = Metadata::TravelRuleMetadata(TravelRuleMetadata::V0(TravelRuleMetadataV0 {
        off_chain_reference_id: Some(off_chain_reference_id.to_string()),
    }));

    let mut serializer = Serializer::new();
    metadata.serialize(&mut serializer);
    sender.serialize(&mut serializer);
    serializer.write_u64(amount);
    serializer.write_fixed_bytes(TRAVEL_RULE_ATTEST_SUFFIX);
    (metadata, serializer.into_bytes())
}

// ---------------------------------------------------------------------------
// Canonical encoding
// ---------------------------------------------------------------------------

impl CanonicalSerialize for GeneralMetadataV0 {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_option(&self.to_subaddress);
        serializer.write_option(&self.from_subaddress);
        serializer.write_option(&self.referenced_event);
    }
}

impl CanonicalDeserialize for GeneralMetadataV0 {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(GeneralMetadataV0 {
            to_subaddress: deserializer.read_option()?,
            from_subaddress: deserializer.read_option()?,
            referenced_event: deserializer.read_option()?,
        })
    }
}

impl CanonicalSerialize for GeneralMetadata {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            GeneralMetadata::V0(v0) => {
                serializer.write_variant_index(0);
                v0.serialize(serializer);
            }
        }
    }
}

impl CanonicalDeserialize for GeneralMetadata {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(GeneralMetadata::V0(GeneralMetadataV0::deserialize(deserializer)?)),
            index => Err(PrimitivesError::UnknownVariant { type_name: "GeneralMetadata", index }),
        }
    }
}

impl CanonicalSerialize for TravelRuleMetadata {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            TravelRuleMetadata::V0(v0) => {
                serializer.write_variant_index(0);
                serializer.write_option(&v0.off_chain_reference_id);
            }
        }
    }
}

impl CanonicalDeserialize for TravelRuleMetadata {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(TravelRuleMetadata::V0(TravelRuleMetadataV0 {
                off_chain_reference_id: deserializer.read_option()?,
            })),
            index => Err(PrimitivesError::UnknownVariant { type_name: "TravelRuleMetadata", index }),
        }
    }
}

impl CanonicalSerialize for UnstructuredBytesMetadata {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_option(&self.metadata);
    }
}

impl CanonicalDeserialize for UnstructuredBytesMetadata {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(UnstructuredBytesMetadata { metadata: deserializer.read_option()? })
    }
}

impl CanonicalSerialize for Metadata {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            Metadata::Undefined => serializer.write_variant_index(0),
            Metadata::GeneralMetadata(general) => {
                serializer.write_variant_index(1);
                general.serialize(serializer);
            }
            Metadata::TravelRuleMetadata(travel_rule) => {
                serializer.write_variant_index(2);
                travel_rule.serialize(serializer);
            }
            Metadata::UnstructuredBytesMetadata(unstructured) => {
                serializer.write_variant_index(3);
                unstructured.serialize(serializer);
            }
        }
    }
}

impl CanonicalDeserialize for Metadata {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(Metadata::Undefined),
            1 => Ok(Metadata::GeneralMetadata(GeneralMetadata::deserialize(deserializer)?)),
            2 => Ok(Metadata::TravelRuleMetadata(TravelRuleMetadata::deserialize(deserializer)?)),
            3 => Ok(Metadata::UnstructuredBytesMetadata(UnstructuredBytesMetadata::deserialize(deserializer)?)),
            index => Err(PrimitivesError::UnknownVariant { type_name: "Metadata", index }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(byte: u8) -> SubAddress {
        SubAddress::new([byte; 8])
    }

    #[test]
    fn test_non_custodial_to_custodial_bytes() {
        let metadata = Metadata::non_custodial_to_custodial(sub(0xaa));
        let mut expected = vec![1, 0, 1, 8];
        expected.extend_from_slice(&[0xaa; 8]);
        expected.extend_from_slice(&[0, 0]);
        assert_eq!(metadata.to_bytes(), expected);
        assert_eq!(Metadata::from_bytes(&expected).unwrap(), metadata);
    }

    #[test]
    fn test_custodial_routing() {
        let from_only = Metadata::custodial_to_non_custodial(sub(1));
        let general = from_only.as_general().unwrap();
        assert_eq!(general.to_subaddress, None);
        assert_eq!(general.from_subaddress, Some(sub(1)));

        let both = Metadata::custodial_to_custodial(sub(1), sub(2));
        let general = both.as_general().unwrap();
        assert_eq!(general.from_subaddress, Some(sub(1)));
        assert_eq!(general.to_subaddress, Some(sub(2)));
    }

    #[test]
    fn test_refund_swaps_subaddresses() {
        let received = Metadata::custodial_to_custodial(sub(1), sub(2));
        let refund = Metadata::refund(&received, 77);
        let general = refund.as_general().unwrap();
        assert_eq!(general.to_subaddress, Some(sub(1)));
        assert_eq!(general.from_subaddress, Some(sub(2)));
        assert_eq!(general.referenced_event, Some(77));
    }

    #[test]
    fn test_undefined_and_unstructured() {
        assert_eq!(Metadata::Undefined.to_bytes(), vec![0]);
        assert_eq!(Metadata::unstructured_bytes(vec![5, 6]).to_bytes(), vec![3, 1, 2, 5, 6]);
        assert_eq!(Metadata::from_hex("030102aabb").unwrap(), Metadata::unstructured_bytes(vec![0xaa, 0xbb]));
    }

    #[test]
    fn test_subaddress_must_be_eight_bytes() {
        // General V0 with a 7-byte to_subaddress.
        let mut bytes = vec![1, 0, 1, 7];
        bytes.extend_from_slice(&[0u8; 7]);
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(
            Metadata::from_bytes(&bytes),
            Err(TypesError::Primitives(PrimitivesError::InvalidLength {
                what: "sub-address",
                expected: 8,
                got: 7
            }))
        );
    }

    #[test]
    fn test_unknown_metadata_variant() {
        assert_eq!(
            Metadata::from_bytes(&[4]),
            Err(TypesError::Primitives(PrimitivesError::UnknownVariant { type_name: "Metadata", index: 4 }))
        );
    }

    #[test]
    fn test_travel_rule_signing_message() {
        let sender = AccountAddress::from_hex("f72589b71ff4f8d139674a3f7369c69b").unwrap();
        let (metadata, message) = travel_rule_metadata("ref-1", sender, 1_000_000);

        let metadata_bytes = metadata.to_bytes();
        assert_eq!(metadata_bytes, vec![2, 0, 1, 5, b'r', b'e', b'f', b'-', b'1']);

        let mut expected = metadata_bytes;
        expected.extend_from_slice(sender.as_bytes());
        expected.extend_from_slice(&1_000_000u64.to_le_bytes());
        expected.extend_from_slice(b"@@$$DIEM_ATTEST$$@@");
        assert_eq!(message, expected);
    }
}
