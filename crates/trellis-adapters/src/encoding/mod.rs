//! Step serialization.
//!
//! The lowering pass never builds operator payloads itself. It describes each
//! resolved step as a [`StepDescriptor`] and hands it to a [`StepEncoder`];
//! the resulting bytes are stored in the operator verbatim.

pub mod descriptor;

use bytes::Bytes;
use trellis_common::utils::error::{Error, Result};

pub use descriptor::{KeyBy, Reduce, StepDescriptor, ValueAccum};

/// Serializes step descriptors into opaque operator payloads.
///
/// Encoders must be deterministic: equal descriptors yield equal bytes.
pub trait StepEncoder: Send + Sync {
    /// Encodes one descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the descriptor cannot be encoded.
    fn encode(&self, descriptor: &StepDescriptor) -> Result<Bytes>;
}

/// Encodes descriptors with bincode's standard configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeStepEncoder;

impl BincodeStepEncoder {
    /// Decodes a payload produced by [`StepEncoder::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if `bytes` is not a complete descriptor.
    pub fn decode(&self, bytes: &[u8]) -> Result<StepDescriptor> {
        let (descriptor, read): (StepDescriptor, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| Error::Serialization(e.to_string()))?;
        if read != bytes.len() {
            return Err(Error::Serialization(format!(
                "{} trailing bytes after step descriptor",
                bytes.len() - read
            )));
        }
        Ok(descriptor)
    }
}

impl StepEncoder for BincodeStepEncoder {
    fn encode(&self, descriptor: &StepDescriptor) -> Result<Bytes> {
        let data = bincode::serde::encode_to_vec(descriptor, bincode::config::standard())
            .map_err(|e| Error::Serialization(e.to_string()))?;
        tracing::trace!(step = descriptor.name(), bytes = data.len(), "encoded step");
        Ok(Bytes::from(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::{Predicate, Token};
    use trellis_common::types::{TagId, Value};

    #[test]
    fn test_encode_is_deterministic() {
        let encoder = BincodeStepEncoder;
        let has = StepDescriptor::Has {
            key: "age".into(),
            predicate: Predicate::Gt(Value::Int64(17)),
        };
        assert_eq!(encoder.encode(&has).unwrap(), encoder.encode(&has).unwrap());
        assert_ne!(
            encoder.encode(&has).unwrap(),
            encoder.encode(&StepDescriptor::Id).unwrap()
        );
    }

    #[test]
    fn test_decode_group() {
        let encoder = BincodeStepEncoder;
        let group = StepDescriptor::Group {
            key: KeyBy::Token(Token::Label),
            value: ValueAccum::Custom {
                steps: vec![StepDescriptor::Alias(TagId::new(2))],
                reduce: Reduce::Max,
            },
        };
        let bytes = encoder.encode(&group).unwrap();
        assert_eq!(encoder.decode(&bytes).unwrap(), group);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let encoder = BincodeStepEncoder;
        assert!(matches!(
            encoder.decode(&[0xff, 0xff, 0xff]),
            Err(Error::Serialization(_))
        ));
        let mut bytes = encoder.encode(&StepDescriptor::Path).unwrap().to_vec();
        bytes.push(0);
        assert!(encoder.decode(&bytes).is_err());
    }
}
