use std::future::Future;

use tracing::{debug, warn};

use crate::constants::transfer::ATT_HEADER_SIZE;
use crate::error::{ChatError, ChatResult};

/// The write side of a GATT connection
pub trait GattLink: Send + Sync {
    /// Ask for an MTU; resolves to the MTU in effect afterwards.
    fn request_mtu(&self, mtu: u16) -> impl Future<Output = ChatResult<u16>> + Send;

    /// Write one chunk and wait for the write to be confirmed.
    fn write_chunk(&self, chunk: &[u8]) -> impl Future<Output = ChatResult<()>> + Send;
}

/// Split `data` into consecutive `chunk_size` slices; the last may be shorter.
pub fn split_into_chunks(data: &[u8], chunk_size: usize) -> ChatResult<Vec<&[u8]>> {
    if chunk_size == 0 {
        return Err(ChatError::InvalidChunkSize);
    }
    Ok(data.chunks(chunk_size).collect())
}

/// Request the MTU, then write the UTF-8 bytes of `payload` chunk by chunk.
///
/// Each write completes before the next one starts. The first failure stops
/// the transfer. Returns the number of chunks written.
pub async fn send_chunked<L: GattLink>(
    link: &L,
    payload: &str,
    requested_mtu: u16,
    chunk_size: usize,
) -> ChatResult<usize> {
    let chunks = split_into_chunks(payload.as_bytes(), chunk_size)?;

    let mtu = link.request_mtu(requested_mtu).await?;
    if chunk_size + ATT_HEADER_SIZE > mtu as usize {
        warn!("Chunk size {} exceeds negotiated MTU {} minus header", chunk_size, mtu);
    }

    for chunk in &chunks {
        link.write_chunk(chunk).await?;
        debug!("chunk sent, size={}", chunk.len());
    }

    Ok(chunks.len())
}
