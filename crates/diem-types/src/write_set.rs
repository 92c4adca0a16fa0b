//! Write sets and write-set payloads.
//!
//! A write-set transaction applies storage writes directly
//! (`WriteSetPayload::Direct`) or runs a script as a given account
//! (`WriteSetPayload::Script`). Genesis transactions carry one as well.

use diem_primitives::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use diem_primitives::{AccountAddress, PrimitivesError};

use crate::event::ContractEvent;
use crate::script::Script;

/// A storage location: an account address plus a resource or module path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccessPath {
    pub address: AccountAddress,
    pub path: Vec<u8>,
}

impl AccessPath {
    pub fn new(address: AccountAddress, path: Vec<u8>) -> Self {
        AccessPath { address, path }
    }
}

impl CanonicalSerialize for AccessPath {
    fn serialize(&self, serializer: &mut Serializer) {
        self.address.serialize(serializer);
        serializer.write_bytes(&self.path);
    }
}

impl CanonicalDeserialize for AccessPath {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(AccessPath {
            address: AccountAddress::deserialize(deserializer)?,
            path: deserializer.read_bytes()?,
        })
    }
}

/// A single storage write. Deletion=0, Value=1.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WriteOp {
    Deletion,
    Value(Vec<u8>),
}

impl CanonicalSerialize for WriteOp {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            WriteOp::Deletion => serializer.write_variant_index(0),
            WriteOp::Value(bytes) => {
                serializer.write_variant_index(1);
                serializer.write_bytes(bytes);
            }
        }
    }
}

impl CanonicalDeserialize for WriteOp {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(WriteOp::Deletion),
            1 => Ok(WriteOp::Value(deserializer.read_bytes()?)),
            index => Err(PrimitivesError::UnknownVariant { type_name: "WriteOp", index }),
        }
    }
}

/// An ordered list of storage writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct WriteSet(pub Vec<(AccessPath, WriteOp)>);

impl WriteSet {
    pub fn new(writes: Vec<(AccessPath, WriteOp)>) -> Self {
        WriteSet(writes)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(AccessPath, WriteOp)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl CanonicalSerialize for WriteSet {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_seq(&self.0);
    }
}

impl CanonicalDeserialize for WriteSet {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(WriteSet(deserializer.read_seq()?))
    }
}

/// A write set together with the events it emits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChangeSet {
    pub write_set: WriteSet,
    pub events: Vec<ContractEvent>,
}

impl ChangeSet {
    pub fn new(write_set: WriteSet, events: Vec<ContractEvent>) -> Self {
        ChangeSet { write_set, events }
    }
}

impl CanonicalSerialize for ChangeSet {
    fn serialize(&self, serializer: &mut Serializer) {
        self.write_set.serialize(serializer);
        serializer.write_seq(&self.events);
    }
}

impl CanonicalDeserialize for ChangeSet {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(ChangeSet {
            write_set: WriteSet::deserialize(deserializer)?,
            events: deserializer.read_seq()?,
        })
    }
}

/// Payload of a write-set or genesis transaction. Direct=0, Script=1.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WriteSetPayload {
    Direct(ChangeSet),
    Script { execute_as: AccountAddress, script: Script },
}

impl CanonicalSerialize for WriteSetPayload {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            WriteSetPayload::Direct(change_set) => {
                serializer.write_variant_index(0);
                change_set.serialize(serializer);
            }
            WriteSetPayload::Script { execute_as, script } => {
                serializer.write_variant_index(1);
                execute_as.serialize(serializer);
                script.serialize(serializer);
            }
        }
    }
}

impl CanonicalDeserialize for WriteSetPayload {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(WriteSetPayload::Direct(ChangeSet::deserialize(deserializer)?)),
            1 => Ok(WriteSetPayload::Script {
                execute_as: AccountAddress::deserialize(deserializer)?,
                script: Script::deserialize(deserializer)?,
            }),
            index => Err(PrimitivesError::UnknownVariant { type_name: "WriteSetPayload", index }),
        }
    }
}
