//! Telemetry payload decoding.
//!
//! The decoder follows the layered structure used for every wire format in
//! this crate:
//! - `layout`: byte offsets and bit masks (source of truth)
//! - `reader`: bounds-checked little-endian reads
//! - `header`, `sensor`, `reading`, `parser`: domain-level decoding with no
//!   direct byte indexing
//! - `error`: explicit, actionable errors
//!
//! Decoding is a single linear pass over an immutable buffer. The header
//! selects one of two framings: a shared presence mask followed by equally
//! sized field blocks, or a sequence of self-describing records (mask +
//! fields). Every error aborts the decode.

pub mod error;
pub mod header;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod reading;
pub mod sensor;

pub use error::DecodeError;
pub use parser::{decode_payload, decode_payload_raw, decode_payload_with};
pub use reading::decode_reading;
pub use sensor::{SensorFields, decode_sensor_data, sensor_data_size};
