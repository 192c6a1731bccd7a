//! Batch iteration over a request buffer exchanged with the kernel-resident
//! FSD.
//!
//! A single exchange IOCTL can return several request records back to back,
//! 8-byte aligned; `BatchReader` walks each header-prefixed record in turn
//! until the buffer is exhausted.

use log::{debug, warn};

use crate::abi::header::{aligned_len, HEADER_ALIGNMENT};
use crate::abi::Request;
use crate::transport::TransportError;

/// Iterates the request records packed into one batch buffer.
#[derive(Debug)]
pub struct BatchReader<'a> {
    remaining: &'a [u8],
}

impl<'a> BatchReader<'a> {
    #[must_use]
    pub fn new(batch: &'a [u8]) -> Self {
        debug!("dispatching batch of {} bytes", batch.len());
        BatchReader { remaining: batch }
    }
}

impl<'a> Iterator for BatchReader<'a> {
    type Item = Result<Request<'a>, TransportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        match Request::decode(self.remaining) {
            Ok(request) => {
                let consumed = aligned_len(request.header.size as usize).min(self.remaining.len());
                self.remaining = &self.remaining[consumed..];
                Some(Ok(request))
            }
            Err(err) => {
                warn!("malformed record in batch: {err}");
                self.remaining = &[];
                Some(Err(err))
            }
        }
    }
}

/// Validates that `batch.len()` is a multiple of the wire alignment, the
/// invariant the exchange IOCTL must uphold on every successful call.
pub fn validate_batch_alignment(batch: &[u8]) -> Result<(), TransportError> {
    if batch.len() % HEADER_ALIGNMENT != 0 {
        return Err(TransportError::RecordSizeOutOfRange {
            declared: batch.len() as u32,
            available: batch.len(),
        });
    }
    Ok(())
}
