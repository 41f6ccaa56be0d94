//! # Frame Codec
//!
//! Async readers and writers for the primitive frames.
//!
//! All integers are big-endian (network order). Strings carry a 2-byte length
//! prefix, so anything longer than [`MAX_STRING_LEN`] bytes is refused at
//! encode time rather than silently truncated.
//!
//! String payloads are standard UTF-8. This is not the "modified UTF-8" of
//! Java's `DataOutputStream::writeUTF`: a Java peer encodes NUL as `C0 80`
//! and supplementary characters as surrogate pairs (6 bytes), both of which
//! are refused here as invalid UTF-8, and the byte counts of such strings
//! differ between the two encodings. Only names without NUL and outside the
//! supplementary planes interoperate with such a peer.

use crate::errors::WireError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest string payload a 2-byte prefix can describe.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Largest length representable in a store-side (4-byte signed) frame.
pub const MAX_STORE_FRAME_LEN: u64 = i32::MAX as u64;

/// Largest length representable in a client-side (8-byte signed) frame.
pub const MAX_CLIENT_FRAME_LEN: u64 = i64::MAX as u64;

/// Write a length-prefixed string frame.
pub async fn write_string<W>(writer: &mut W, value: &str) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = value.as_bytes();
    if bytes.len() > MAX_STRING_LEN {
        return Err(WireError::StringTooLong {
            len: bytes.len(),
            max: MAX_STRING_LEN,
        });
    }
    writer.write_u16(bytes.len() as u16).await?;
    writer.write_all(bytes).await?;
    Ok(())
}

/// Read a length-prefixed string frame.
pub async fn read_string<R>(reader: &mut R) -> Result<String, WireError>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u16().await? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    String::from_utf8(buf).map_err(|_| WireError::InvalidUtf8)
}

/// Validate a declared length against `max`, returning it as `usize`.
pub fn check_len(declared: i64, max: u64) -> Result<usize, WireError> {
    if declared < 0 || declared as u64 > max {
        return Err(WireError::InvalidLength { declared, max });
    }
    usize::try_from(declared).map_err(|_| WireError::InvalidLength { declared, max })
}

/// Write a 4-byte store-side length.
pub async fn write_store_len<W>(writer: &mut W, len: usize) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let value = i32::try_from(len).map_err(|_| WireError::InvalidLength {
        declared: len as i64,
        max: MAX_STORE_FRAME_LEN,
    })?;
    writer.write_i32(value).await?;
    Ok(())
}

/// Read a 4-byte store-side length, rejecting negatives and values above `max`.
pub async fn read_store_len<R>(reader: &mut R, max: u64) -> Result<usize, WireError>
where
    R: AsyncRead + Unpin,
{
    let declared = reader.read_i32().await?;
    check_len(i64::from(declared), max.min(MAX_STORE_FRAME_LEN))
}

/// Write an 8-byte client-side length.
pub async fn write_client_len<W>(writer: &mut W, len: usize) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let value = i64::try_from(len).map_err(|_| WireError::InvalidLength {
        declared: i64::MAX,
        max: MAX_CLIENT_FRAME_LEN,
    })?;
    writer.write_i64(value).await?;
    Ok(())
}

/// Read an 8-byte client-side length without validating it.
///
/// The coordinator needs the raw value to tell an empty upload apart from a
/// malformed one; everything else should use [`read_client_len`].
pub async fn read_client_len_raw<R>(reader: &mut R) -> Result<i64, WireError>
where
    R: AsyncRead + Unpin,
{
    Ok(reader.read_i64().await?)
}

/// Read an 8-byte client-side length, rejecting negatives and values above `max`.
pub async fn read_client_len<R>(reader: &mut R, max: u64) -> Result<usize, WireError>
where
    R: AsyncRead + Unpin,
{
    let declared = read_client_len_raw(reader).await?;
    check_len(declared, max)
}

/// Read exactly `len` raw bytes.
///
/// Callers must have validated `len` with [`check_len`] (or one of the
/// bounded length readers) first.
pub async fn read_blob<R>(reader: &mut R, len: usize) -> Result<Vec<u8>, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write raw bytes with no framing of their own.
pub async fn write_blob<W>(writer: &mut W, bytes: &[u8]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(bytes).await?;
    Ok(())
}
