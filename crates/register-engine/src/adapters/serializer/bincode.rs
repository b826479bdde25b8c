use crate::domain::entities::{IndexEntry, RegisterEntry};
use crate::domain::errors::SerializationError;
use crate::ports::outbound::RecordSerializer;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default record serializer using bincode.
#[derive(Default)]
pub struct BincodeSerializer;

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    bincode::serialize(value).map_err(|e| SerializationError {
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, SerializationError> {
    bincode::deserialize(data).map_err(|e| SerializationError {
        message: e.to_string(),
    })
}

impl RecordSerializer for BincodeSerializer {
    fn serialize_entry(&self, entry: &RegisterEntry) -> Result<Vec<u8>, SerializationError> {
        encode(entry)
    }

    fn deserialize_entry(&self, data: &[u8]) -> Result<RegisterEntry, SerializationError> {
        decode(data)
    }

    fn serialize_index(&self, row: &IndexEntry) -> Result<Vec<u8>, SerializationError> {
        encode(row)
    }

    fn deserialize_index(&self, data: &[u8]) -> Result<IndexEntry, SerializationError> {
        decode(data)
    }
}
