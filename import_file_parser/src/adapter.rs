//! Turns a pull-based object body into a lazy stream of byte chunks.
//!
use std::io;

use async_stream::stream;
use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio::io::{AsyncRead, AsyncReadExt};

pub const CHUNK_CAPACITY: usize = 8 * 1024;

/// Reads `reader` one chunk at a time. Nothing is read until the consumer
/// polls for the next chunk. The stream ends after end-of-data or after
/// yielding the first read error, whichever comes first.
pub fn read_chunks<R>(mut reader: R) -> impl Stream<Item = io::Result<Bytes>>
where
    R: AsyncRead + Unpin,
{
    stream! {
        loop {
            let mut buf = BytesMut::with_capacity(CHUNK_CAPACITY);
            match reader.read_buf(&mut buf).await {
                Ok(0) => break,
                Ok(_) => yield Ok(buf.freeze()),
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    }
}
