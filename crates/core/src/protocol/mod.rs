//! Wire handling for chat payloads over GATT
//!
//! Outgoing text is split into fixed-size chunks with no header, sequence
//! number or end marker. Incoming notifications are concatenated until the
//! buffered text looks like one complete JSON object.

pub mod chunking;
pub mod reassembly;

pub use chunking::{send_chunked, split_into_chunks, GattLink};
pub use reassembly::{is_complete_json, ReassemblyBuffer};
