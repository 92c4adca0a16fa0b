//! Transaction scripts, modules, and script arguments.

use diem_primitives::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use diem_primitives::{AccountAddress, PrimitivesError};

use crate::type_tag::TypeTag;

/// A typed script argument.
///
/// Variant indices: U8=0, U64=1, U128=2, Address=3, U8Vector=4, Bool=5.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransactionArgument {
    U8(u8),
    U64(u64),
    U128(u128),
    Address(AccountAddress),
    U8Vector(Vec<u8>),
    Bool(bool),
}

impl CanonicalSerialize for TransactionArgument {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            TransactionArgument::U8(v) => {
                serializer.write_variant_index(0);
                serializer.write_u8(*v);
            }
            TransactionArgument::U64(v) => {
                serializer.write_variant_index(1);
                serializer.write_u64(*v);
            }
            TransactionArgument::U128(v) => {
                serializer.write_variant_index(2);
                serializer.write_u128(*v);
            }
            TransactionArgument::Address(addr) => {
                serializer.write_variant_index(3);
                addr.serialize(serializer);
            }
            TransactionArgument::U8Vector(bytes) => {
                serializer.write_variant_index(4);
                serializer.write_bytes(bytes);
            }
            TransactionArgument::Bool(v) => {
                serializer.write_variant_index(5);
                serializer.write_bool(*v);
            }
        }
    }
}

impl CanonicalDeserialize for TransactionArgument {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(TransactionArgument::U8(deserializer.read_u8()?)),
            1 => Ok(TransactionArgument::U64(deserializer.read_u64()?)),
            2 => Ok(TransactionArgument::U128(deserializer.read_u128()?)),
            3 => Ok(TransactionArgument::Address(AccountAddress::deserialize(deserializer)?)),
            4 => Ok(TransactionArgument::U8Vector(deserializer.read_bytes()?)),
            5 => Ok(TransactionArgument::Bool(deserializer.read_bool()?)),
            index => Err(PrimitivesError::UnknownVariant { type_name: "TransactionArgument", index }),
        }
    }
}

/// A Move script: bytecode, type arguments, and value arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Script {
    /// Compiled script bytecode.
    pub code: Vec<u8>,
    /// Generic type arguments.
    pub ty_args: Vec<TypeTag>,
    /// Value arguments in call order.
    pub args: Vec<TransactionArgument>,
}

impl Script {
    /// Create a script from its parts.
    pub fn new(code: Vec<u8>, ty_args: Vec<TypeTag>, args: Vec<TransactionArgument>) -> Self {
        Script { code, ty_args, args }
    }
}

impl CanonicalSerialize for Script {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_bytes(&self.code);
        serializer.write_seq(&self.ty_args);
        serializer.write_seq(&self.args);
    }
}

impl CanonicalDeserialize for Script {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(Script {
            code: deserializer.read_bytes()?,
            ty_args: deserializer.read_seq()?,
            args: deserializer.read_seq()?,
        })
    }
}

/// A Move module to publish.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Module {
    /// Compiled module bytecode.
    pub code: Vec<u8>,
}

impl Module {
    /// Create a module from its bytecode.
    pub fn new(code: Vec<u8>) -> Self {
        Module { code }
    }
}

impl CanonicalSerialize for Module {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_bytes(&self.code);
    }
}

impl CanonicalDeserialize for Module {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(Module { code: deserializer.read_bytes()? })
    }
}
