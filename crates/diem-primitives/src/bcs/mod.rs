//! Canonical binary serialization.
//!
//! Provides the `Serializer` and `Deserializer` cursor types and the
//! `CanonicalSerialize` / `CanonicalDeserialize` traits every on-chain type
//! implements. The encoding has exactly one valid byte representation per
//! value, so independently computed hashes and signatures agree bit for bit.
//!
//! # Encoding rules
//!
//! | Value                       | Encoding                                   |
//! |-----------------------------|--------------------------------------------|
//! | u8/u16/u32/u64/u128         | little-endian, fixed width                 |
//! | bool                        | one byte, 0 or 1                           |
//! | sequence length, variant    | ULEB128, minimal length, at most u32       |
//! | bytes / string              | ULEB128 length + raw bytes (UTF-8)         |
//! | fixed-size array            | raw bytes, no prefix                       |
//! | option                      | tag byte 0/1 + value if present            |
//! | sequence                    | ULEB128 length + elements in order         |

use crate::PrimitivesError;

/// Maximum number of bytes in a ULEB128 encoding of a `u32`.
pub const MAX_ULEB128_BYTES: usize = 5;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A value with a canonical binary encoding.
pub trait CanonicalSerialize {
    /// Append the canonical encoding of `self` to the serializer.
    ///
    /// # Arguments
    /// * `serializer` - The output buffer.
    fn serialize(&self, serializer: &mut Serializer);

    /// Encode `self` into a fresh byte vector.
    ///
    /// # Returns
    /// The canonical bytes of the value.
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut serializer = Serializer::new();
        self.serialize(&mut serializer);
        serializer.into_bytes()
    }
}

/// A value that can be decoded from its canonical binary encoding.
pub trait CanonicalDeserialize: Sized {
    /// Decode one value from the deserializer, advancing its cursor.
    ///
    /// # Arguments
    /// * `deserializer` - The input cursor.
    ///
    /// # Returns
    /// The decoded value, or a decode error. Bytes after the value are left
    /// unread.
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError>;

    /// Decode a complete value from a byte slice.
    ///
    /// The slice must contain exactly one encoded value with no trailing
    /// data.
    ///
    /// # Arguments
    /// * `bytes` - The encoded bytes.
    ///
    /// # Returns
    /// The decoded value, or `TrailingBytes` if input remains after it.
    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let mut deserializer = Deserializer::new(bytes);
        let value = Self::deserialize(&mut deserializer)?;
        deserializer.end()?;
        Ok(value)
    }
}

/// Encode a value into its canonical bytes.
pub fn to_bytes<T: CanonicalSerialize>(value: &T) -> Vec<u8> {
    value.to_canonical_bytes()
}

/// Decode a top-level value, rejecting trailing bytes.
pub fn from_bytes<T: CanonicalDeserialize>(bytes: &[u8]) -> Result<T, PrimitivesError> {
    T::from_canonical_bytes(bytes)
}

// ---------------------------------------------------------------------------
// Serializer
// ---------------------------------------------------------------------------

/// An append-only buffer producing canonical bytes.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    buf: Vec<u8>,
}

impl Serializer {
    /// Create a new empty serializer.
    pub fn new() -> Self {
        Serializer { buf: Vec::new() }
    }

    /// Create a new serializer with a pre-allocated capacity.
    ///
    /// # Arguments
    /// * `capacity` - Initial byte capacity of the internal buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Serializer { buf: Vec::with_capacity(capacity) }
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a little-endian u16.
    pub fn write_u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u32.
    pub fn write_u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u64.
    pub fn write_u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u128.
    pub fn write_u128(&mut self, val: u128) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a bool as a single 0 or 1 byte.
    pub fn write_bool(&mut self, val: bool) {
        self.buf.push(u8::from(val));
    }

    /// Append a minimal ULEB128 encoding of `val`.
    ///
    /// # Arguments
    /// * `val` - The value to encode.
    pub fn write_uleb128(&mut self, mut val: u64) {
        while val >= 0x80 {
            self.buf.push((val as u8 & 0x7f) | 0x80);
            val >>= 7;
        }
        self.buf.push(val as u8);
    }

    /// Append a sequence length prefix.
    pub fn write_len(&mut self, len: usize) {
        self.write_uleb128(len as u64);
    }

    /// Append a sum-type variant index.
    pub fn write_variant_index(&mut self, index: u32) {
        self.write_uleb128(u64::from(index));
    }

    /// Append raw bytes with no length prefix (fixed-size arrays).
    pub fn write_fixed_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a length-prefixed byte string.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_len(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Append an optional value as a presence tag followed by the value.
    pub fn write_option<T: CanonicalSerialize>(&mut self, value: &Option<T>) {
        match value {
            Some(inner) => {
                self.write_u8(1);
                inner.serialize(self);
            }
            None => self.write_u8(0),
        }
    }

    /// Append a length-prefixed sequence of values.
    pub fn write_seq<T: CanonicalSerialize>(&mut self, values: &[T]) {
        self.write_len(values.len());
        for value in values {
            value.serialize(self);
        }
    }

    /// Consume the serializer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Deserializer
// ---------------------------------------------------------------------------

/// A cursor-based reader over canonical bytes.
///
/// Every read either consumes exactly the bytes of the requested value or
/// fails; a failed read never yields a partially filled value.
#[derive(Debug)]
pub struct Deserializer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Deserializer<'a> {
    /// Create a new deserializer positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Deserializer { data, pos: 0 }
    }

    /// Read `n` raw bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read.
    ///
    /// # Returns
    /// A byte slice of length `n`, or `UnexpectedEndOfInput`.
    pub fn read_fixed_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEndOfInput);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size array of `N` raw bytes.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_fixed_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_fixed_bytes(1)?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u64.
    pub fn read_u64(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u128.
    pub fn read_u128(&mut self) -> Result<u128, PrimitivesError> {
        Ok(u128::from_le_bytes(self.read_array()?))
    }

    /// Read a bool, rejecting any byte other than 0 or 1.
    pub fn read_bool(&mut self) -> Result<bool, PrimitivesError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(PrimitivesError::InvalidBool(b)),
        }
    }

    /// Read a minimal ULEB128 value that fits in a `u32`.
    ///
    /// # Returns
    /// The decoded value, `NonCanonicalUleb128` if the encoding carries a
    /// redundant zero group, or `Uleb128Overflow` if it exceeds `u32::MAX`.
    pub fn read_uleb128(&mut self) -> Result<u32, PrimitivesError> {
        let mut value: u64 = 0;
        for shift in (0..32).step_by(7) {
            let byte = self.read_u8()?;
            let digit = byte & 0x7f;
            value |= u64::from(digit) << shift;
            if byte & 0x80 == 0 {
                if shift > 0 && digit == 0 {
                    return Err(PrimitivesError::NonCanonicalUleb128);
                }
                return u32::try_from(value).map_err(|_| PrimitivesError::Uleb128Overflow);
            }
        }
        Err(PrimitivesError::Uleb128Overflow)
    }

    /// Read a sequence length prefix.
    pub fn read_len(&mut self) -> Result<usize, PrimitivesError> {
        Ok(self.read_uleb128()? as usize)
    }

    /// Read a sum-type variant index.
    pub fn read_variant_index(&mut self) -> Result<u32, PrimitivesError> {
        self.read_uleb128()
    }

    /// Read a length-prefixed byte string.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, PrimitivesError> {
        let len = self.read_len()?;
        Ok(self.read_fixed_bytes(len)?.to_vec())
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_str(&mut self) -> Result<String, PrimitivesError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| PrimitivesError::InvalidUtf8(e.to_string()))
    }

    /// Read an optional value.
    pub fn read_option<T: CanonicalDeserialize>(&mut self) -> Result<Option<T>, PrimitivesError> {
        match self.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::deserialize(self)?)),
            tag => Err(PrimitivesError::InvalidOptionTag(tag)),
        }
    }

    /// Read a length-prefixed sequence of values.
    pub fn read_seq<T: CanonicalDeserialize>(&mut self) -> Result<Vec<T>, PrimitivesError> {
        let len = self.read_len()?;
        // Every element takes at least one byte, so the remaining input
        // bounds the allocation.
        let mut values = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            values.push(T::deserialize(self)?);
        }
        Ok(values)
    }

    /// Return the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Assert that the whole input has been consumed.
    ///
    /// # Returns
    /// `Ok(())` at end of input, `TrailingBytes(n)` otherwise.
    pub fn end(&self) -> Result<(), PrimitivesError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(PrimitivesError::TrailingBytes(n)),
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in implementations
// ---------------------------------------------------------------------------

macro_rules! impl_canonical_int {
    ($ty:ty, $write:ident, $read:ident) => {
        impl CanonicalSerialize for $ty {
            fn serialize(&self, serializer: &mut Serializer) {
                serializer.$write(*self);
            }
        }

        impl CanonicalDeserialize for $ty {
            fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
                deserializer.$read()
            }
        }
    };
}

impl_canonical_int!(u8, write_u8, read_u8);
impl_canonical_int!(u16, write_u16, read_u16);
impl_canonical_int!(u32, write_u32, read_u32);
impl_canonical_int!(u64, write_u64, read_u64);
impl_canonical_int!(u128, write_u128, read_u128);
impl_canonical_int!(bool, write_bool, read_bool);

impl CanonicalSerialize for String {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_str(self);
    }
}

impl CanonicalDeserialize for String {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        deserializer.read_str()
    }
}

impl<T: CanonicalSerialize> CanonicalSerialize for Vec<T> {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_seq(self);
    }
}

impl<T: CanonicalDeserialize> CanonicalDeserialize for Vec<T> {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        deserializer.read_seq()
    }
}

impl<T: CanonicalSerialize> CanonicalSerialize for Option<T> {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_option(self);
    }
}

impl<T: CanonicalDeserialize> CanonicalDeserialize for Option<T> {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        deserializer.read_option()
    }
}

impl<T: CanonicalSerialize> CanonicalSerialize for Box<T> {
    fn serialize(&self, serializer: &mut Serializer) {
        self.as_ref().serialize(serializer);
    }
}

impl<T: CanonicalDeserialize> CanonicalDeserialize for Box<T> {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(Box::new(T::deserialize(deserializer)?))
    }
}

impl<const N: usize> CanonicalSerialize for [u8; N] {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_fixed_bytes(self);
    }
}

impl<const N: usize> CanonicalDeserialize for [u8; N] {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        deserializer.read_array()
    }
}

impl<A: CanonicalSerialize, B: CanonicalSerialize> CanonicalSerialize for (A, B) {
    fn serialize(&self, serializer: &mut Serializer) {
        self.0.serialize(serializer);
        self.1.serialize(serializer);
    }
}

impl<A: CanonicalDeserialize, B: CanonicalDeserialize> CanonicalDeserialize for (A, B) {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        let a = A::deserialize(deserializer)?;
        let b = B::deserialize(deserializer)?;
        Ok((a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uleb(value: u64) -> Vec<u8> {
        let mut s = Serializer::new();
        s.write_uleb128(value);
        s.into_bytes()
    }

    #[test]
    fn test_uleb128_encoding() {
        let cases: Vec<(u64, Vec<u8>)> = vec![
            (0, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7f]),
            (128, vec![0x80, 0x01]),
            (300, vec![0xac, 0x02]),
            (16383, vec![0xff, 0x7f]),
            (16384, vec![0x80, 0x80, 0x01]),
            (u32::MAX as u64, vec![0xff, 0xff, 0xff, 0xff, 0x0f]),
        ];

        for (value, expected) in cases {
            assert_eq!(uleb(value), expected, "encoding mismatch for {}", value);
            let mut d = Deserializer::new(&expected);
            assert_eq!(d.read_uleb128().unwrap() as u64, value, "decoding mismatch for {}", value);
            assert_eq!(d.remaining(), 0);
        }
    }

    #[test]
    fn test_uleb128_rejects_non_minimal() {
        let mut d = Deserializer::new(&[0x80, 0x00]);
        assert_eq!(d.read_uleb128(), Err(PrimitivesError::NonCanonicalUleb128));

        let mut d = Deserializer::new(&[0x81, 0x80, 0x00]);
        assert_eq!(d.read_uleb128(), Err(PrimitivesError::NonCanonicalUleb128));
    }

    #[test]
    fn test_uleb128_rejects_overflow() {
        let mut d = Deserializer::new(&[0xff, 0xff, 0xff, 0xff, 0x1f]);
        assert_eq!(d.read_uleb128(), Err(PrimitivesError::Uleb128Overflow));

        let mut d = Deserializer::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert_eq!(d.read_uleb128(), Err(PrimitivesError::Uleb128Overflow));
    }

    #[test]
    fn test_uleb128_truncated() {
        let mut d = Deserializer::new(&[0x80, 0x80]);
        assert_eq!(d.read_uleb128(), Err(PrimitivesError::UnexpectedEndOfInput));
    }

    #[test]
    fn test_integers_little_endian() {
        assert_eq!(to_bytes(&0x1234u16), vec![0x34, 0x12]);
        assert_eq!(to_bytes(&0xDEADBEEFu32), vec![0xef, 0xbe, 0xad, 0xde]);
        assert_eq!(
            to_bytes(&0x0102030405060708u64),
            vec![0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(to_bytes(&1u128).len(), 16);
        assert_eq!(to_bytes(&1u128)[0], 1);
    }

    #[test]
    fn test_bool() {
        assert_eq!(to_bytes(&true), vec![1]);
        assert_eq!(to_bytes(&false), vec![0]);
        assert_eq!(from_bytes::<bool>(&[2]), Err(PrimitivesError::InvalidBool(2)));
    }

    #[test]
    fn test_string_and_bytes() {
        assert_eq!(to_bytes(&"abc".to_string()), vec![3, b'a', b'b', b'c']);
        assert_eq!(to_bytes(&vec![0xaau8, 0xbb]), vec![2, 0xaa, 0xbb]);
        assert_eq!(to_bytes(&String::new()), vec![0]);

        let err = from_bytes::<String>(&[2, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, PrimitivesError::InvalidUtf8(_)));
    }

    #[test]
    fn test_fixed_array_has_no_prefix() {
        assert_eq!(to_bytes(&[7u8; 4]), vec![7, 7, 7, 7]);
        assert_eq!(from_bytes::<[u8; 4]>(&[1, 2, 3, 4]).unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_option() {
        assert_eq!(to_bytes(&None::<u8>), vec![0]);
        assert_eq!(to_bytes(&Some(5u8)), vec![1, 5]);
        assert_eq!(from_bytes::<Option<u8>>(&[2, 5]), Err(PrimitivesError::InvalidOptionTag(2)));
    }

    #[test]
    fn test_sequence_of_strings() {
        let v = vec!["a".to_string(), "bc".to_string()];
        let bytes = to_bytes(&v);
        assert_eq!(bytes, vec![2, 1, b'a', 2, b'b', b'c']);
        assert_eq!(from_bytes::<Vec<String>>(&bytes).unwrap(), v);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        assert_eq!(from_bytes::<u16>(&[1, 2, 3]), Err(PrimitivesError::TrailingBytes(1)));
    }

    #[test]
    fn test_declared_length_past_end() {
        // Claims 100 bytes but carries 2.
        assert_eq!(
            from_bytes::<Vec<u8>>(&[100, 1, 2]),
            Err(PrimitivesError::UnexpectedEndOfInput)
        );
        // A huge declared element count must not allocate up front.
        assert_eq!(
            from_bytes::<Vec<u64>>(&[0xff, 0xff, 0xff, 0xff, 0x0f]),
            Err(PrimitivesError::UnexpectedEndOfInput)
        );
    }

    #[test]
    fn test_tuple_roundtrip() {
        let value = (7u64, "x".to_string());
        let bytes = to_bytes(&value);
        assert_eq!(from_bytes::<(u64, String)>(&bytes).unwrap(), value);
    }
}
