//! Length-prefixed frame encoding/decoding
//!
//! Wire format: [kind byte][4-byte big-endian length][payload]
//! Maximum payload size: 64KB (sanity limit)
//!
//! A zero-length payload is a valid frame: peers send it as a disconnect
//! signal, and the session read loop treats it as end-of-conversation.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

/// Maximum allowed payload size (64KB)
pub const MAX_PAYLOAD: u32 = 64 * 1024;

/// Frame kind for a chat message
pub const KIND_CHAT: u8 = 0;

/// One complete protocol unit, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: u8,
    payload: Vec<u8>,
}

impl Frame {
    /// Build a frame, enforcing the payload size bound.
    pub fn new(kind: u8, payload: Vec<u8>) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD as usize {
            return Err(Error::PayloadTooLarge(payload.len()));
        }
        Ok(Self { kind, payload })
    }

    pub fn kind(&self) -> u8 {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// True for the zero-length disconnect signal.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Encode to wire bytes: kind, length prefix, payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(5 + self.payload.len());
        buf.push(self.kind);
        buf.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }
}

fn map_eof(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::ConnectionClosed
    } else {
        Error::Io(e)
    }
}

/// Read one frame from a stream.
///
/// Each sub-read suspends until its byte count is satisfied. The length
/// prefix is validated against [`MAX_PAYLOAD`] before any payload
/// allocation, so a hostile length cannot trigger an unbounded read.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Frame> {
    let mut kind_buf = [0u8; 1];
    reader.read_exact(&mut kind_buf).await.map_err(map_eof)?;

    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(map_eof)?;

    let len = u32::from_be_bytes(len_buf);
    if len > MAX_PAYLOAD {
        return Err(Error::LengthOutOfBounds {
            declared: len,
            max: MAX_PAYLOAD,
        });
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await.map_err(map_eof)?;

    Ok(Frame {
        kind: kind_buf[0],
        payload,
    })
}

/// Write one frame to a stream and flush it.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &Frame) -> Result<()> {
    writer.write_all(&frame.encode()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_frame_roundtrip() {
        let frame = Frame::new(KIND_CHAT, b"5551234/hello".to_vec()).unwrap();

        let mut buf = Vec::new();
        write_frame(&mut buf, &frame).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).await.unwrap();

        assert_eq!(decoded.kind(), KIND_CHAT);
        assert_eq!(decoded.payload(), b"5551234/hello");
    }

    #[tokio::test]
    async fn test_empty_frame_is_valid() {
        // Empty payload is the peer-disconnect signal, not an error
        let frame = Frame::new(KIND_CHAT, Vec::new()).unwrap();

        let mut buf = Vec::new();
        write_frame(&mut buf, &frame).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).await.unwrap();
        assert!(decoded.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_length_rejected() {
        // Kind byte, then length = MAX_PAYLOAD + 1 and no payload at all;
        // the guard must fire before any payload read is attempted
        let mut bytes = vec![KIND_CHAT];
        bytes.extend_from_slice(&(MAX_PAYLOAD + 1).to_be_bytes());

        let mut cursor = Cursor::new(bytes);
        let result = read_frame(&mut cursor).await;
        assert!(matches!(
            result,
            Err(Error::LengthOutOfBounds { declared, .. }) if declared == MAX_PAYLOAD + 1
        ));
    }

    #[tokio::test]
    async fn test_truncated_stream() {
        // Header promises 10 bytes but the stream ends after 3
        let mut bytes = vec![KIND_CHAT];
        bytes.extend_from_slice(&10u32.to_be_bytes());
        bytes.extend_from_slice(b"abc");

        let mut cursor = Cursor::new(bytes);
        let result = read_frame(&mut cursor).await;
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_eof_before_header() {
        let mut cursor = Cursor::new(Vec::new());
        let result = read_frame(&mut cursor).await;
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[test]
    fn test_encode_too_large() {
        let result = Frame::new(KIND_CHAT, vec![0u8; MAX_PAYLOAD as usize + 1]);
        assert!(matches!(result, Err(Error::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn test_reserved_kind_carried_opaquely() {
        let frame = Frame::new(7, b"anything".to_vec()).unwrap();

        let mut buf = Vec::new();
        write_frame(&mut buf, &frame).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).await.unwrap();
        assert_eq!(decoded.kind(), 7);
        assert_eq!(decoded.payload(), b"anything");
    }
}
