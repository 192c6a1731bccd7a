//! The private I/O transport: device handle, exchange IOCTL,
//! and batch codec.

pub mod codec;
pub mod device;
pub mod errors;

pub use codec::{validate_batch_alignment, BatchReader};
pub use device::{validate_network_prefix, DeviceChannel, MAX_BATCH_SIZE};
pub use errors::TransportError;
