//! Length-prefixed bincode framing.
//!
//! Each frame is a `u32` little-endian length followed by that many bytes of
//! bincode. The length is capped before any allocation, so a hostile peer
//! cannot make the server reserve gigabytes with a four-byte header.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single frame. Requests and responses are tiny; anything
/// near this size is an attack or a bug.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Framing-level failures.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("frame of {0} bytes exceeds the {MAX_FRAME_LEN}-byte cap")]
    Oversize(usize),
}

/// Writes one frame.
pub async fn write_frame<S, T>(stream: &mut S, message: &T) -> Result<(), FrameError>
where
    S: AsyncWrite + Unpin,
    T: Serialize,
{
    let bytes = bincode::serialize(message)?;
    if bytes.len() > MAX_FRAME_LEN {
        return Err(FrameError::Oversize(bytes.len()));
    }
    stream.write_all(&(bytes.len() as u32).to_le_bytes()).await?;
    stream.write_all(&bytes).await?;
    stream.flush().await?;
    Ok(())
}

/// Reads one frame. `Ok(None)` means the peer closed the connection cleanly
/// at a frame boundary.
pub async fn read_frame<S, T>(stream: &mut S) -> Result<Option<T>, FrameError>
where
    S: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_bytes = [0u8; 4];
    match stream.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(FrameError::Io(e)),
    }

    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::Oversize(len));
    }

    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;
    Ok(Some(bincode::deserialize(&buf)?))
}
