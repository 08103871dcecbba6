//! Receive buffer decoupling arrival timing from consumption timing

use bytes::{Bytes, BytesMut};
use tokio::sync::RwLock;

use crate::error::LinkError;

/// Unbounded ordered accumulator of inbound bytes.
///
/// Appends happen on the I/O worker task, drains on the control context; all
/// operations take the single internal lock, so no byte is ever delivered
/// twice or dropped between append and drain. The buffer is not cleared on
/// disconnect: undrained bytes from a previous episode stay readable.
#[derive(Debug, Default)]
pub struct ReceiveBuffer {
    data: RwLock<BytesMut>,
}

impl ReceiveBuffer {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BytesMut::with_capacity(1024)),
        }
    }

    /// Append bytes in arrival order.
    pub async fn append(&self, bytes: &[u8]) {
        self.data.write().await.extend_from_slice(bytes);
    }

    /// Current number of buffered bytes.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// Atomically take and clear the full contents.
    pub async fn drain_all(&self) -> Bytes {
        self.data.write().await.split().freeze()
    }

    /// Atomically take and clear the contents, decoded as UTF-8.
    ///
    /// On malformed input the buffer is left untouched and
    /// [`LinkError::EncodingFailure`] is returned; the raw bytes remain
    /// recoverable through [`drain_all`](Self::drain_all).
    pub async fn drain_utf8(&self) -> Result<String, LinkError> {
        let mut guard = self.data.write().await;
        let text = std::str::from_utf8(&guard)
            .map_err(|_| LinkError::EncodingFailure)?
            .to_owned();
        guard.clear();
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_order_preserved() {
        let buf = ReceiveBuffer::new();
        buf.append(b"b1").await;
        buf.append(b"b2").await;
        buf.append(b"b3").await;
        assert_eq!(buf.len().await, 6);
        assert_eq!(&buf.drain_all().await[..], b"b1b2b3");
    }

    #[tokio::test]
    async fn test_drain_clears() {
        let buf = ReceiveBuffer::new();
        buf.append(b"hello").await;
        assert_eq!(buf.drain_utf8().await.unwrap(), "hello");
        assert_eq!(buf.drain_utf8().await.unwrap(), "");
        assert!(buf.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_utf8_leaves_bytes_buffered() {
        let buf = ReceiveBuffer::new();
        buf.append(&[0xff, 0xfe]).await;
        assert!(matches!(
            buf.drain_utf8().await,
            Err(LinkError::EncodingFailure)
        ));
        // Bytes must not be lost by the failed decode
        assert_eq!(buf.len().await, 2);
        assert_eq!(&buf.drain_all().await[..], &[0xff, 0xfe]);
    }

    #[tokio::test]
    async fn test_append_after_drain() {
        let buf = ReceiveBuffer::new();
        buf.append(b"ping").await;
        buf.drain_all().await;
        buf.append(b"pong").await;
        assert_eq!(buf.drain_utf8().await.unwrap(), "pong");
    }
}
