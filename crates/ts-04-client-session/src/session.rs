//! # Client Session
//!
//! One command per round trip over a persistent stream.

use crate::errors::SessionError;
use shared_wire::{
    check_len, read_blob, read_client_len_raw, read_string, write_blob, write_client_len,
    write_string, ClientCommand, WireError, LISTING_SENTINEL, MAX_CLIENT_FRAME_LEN,
};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

/// Default upper bound for a downloaded file (1 GiB).
pub const DEFAULT_MAX_DOWNLOAD_LEN: u64 = 1024 * 1024 * 1024;

/// A session with the coordinator.
///
/// Generic over the stream so tests can run against an in-memory pipe.
pub struct ClientSession<S> {
    stream: S,
    max_download_len: u64,
}

impl ClientSession<TcpStream> {
    /// Open a TCP session.
    pub async fn connect<A>(address: A) -> Result<Self, SessionError>
    where
        A: ToSocketAddrs + std::fmt::Display,
    {
        let label = address.to_string();
        let stream = TcpStream::connect(address)
            .await
            .map_err(|source| SessionError::Connect {
                address: label.clone(),
                source,
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(coordinator = %label, error = %e, "[ts-04] Cannot set TCP_NODELAY");
        }
        debug!(coordinator = %label, "[ts-04] Connected");
        Ok(Self::new(stream))
    }
}

impl<S> ClientSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an established stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            max_download_len: DEFAULT_MAX_DOWNLOAD_LEN,
        }
    }

    /// Refuse downloads longer than `max` bytes.
    pub fn with_max_download_len(mut self, max: u64) -> Self {
        self.max_download_len = max.min(MAX_CLIENT_FRAME_LEN);
        self
    }

    /// Upload `bytes` as `file_name`, returning the coordinator's status.
    pub async fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<String, SessionError> {
        let mut writer = BufWriter::new(&mut self.stream);
        write_string(&mut writer, ClientCommand::Upload.as_str()).await?;
        write_string(&mut writer, file_name).await?;
        write_client_len(&mut writer, bytes.len()).await?;
        write_blob(&mut writer, bytes).await?;
        writer.flush().await.map_err(WireError::from)?;

        let status = read_string(&mut self.stream).await?;
        debug!(file = %file_name, bytes = bytes.len(), %status, "[ts-04] upload");
        Ok(status)
    }

    /// Download `file_name`. `None` means the coordinator reported length 0.
    pub async fn download(&mut self, file_name: &str) -> Result<Option<Vec<u8>>, SessionError> {
        self.send_keyed(ClientCommand::Download, file_name).await?;

        let declared = read_client_len_raw(&mut self.stream).await?;
        let len = check_len(declared, self.max_download_len).map_err(|_| {
            SessionError::InvalidLength {
                declared,
                max: self.max_download_len,
            }
        })?;
        if len == 0 {
            debug!(file = %file_name, "[ts-04] download: not found");
            return Ok(None);
        }

        let bytes = read_blob(&mut self.stream, len).await?;
        debug!(file = %file_name, bytes = len, "[ts-04] download");
        Ok(Some(bytes))
    }

    /// Listing lines up to (not including) the end marker.
    pub async fn list(&mut self) -> Result<Vec<String>, SessionError> {
        write_string(&mut self.stream, ClientCommand::List.as_str()).await?;
        self.stream.flush().await.map_err(WireError::from)?;

        let mut lines = Vec::new();
        loop {
            let line = match read_string(&mut self.stream).await {
                Ok(line) => line,
                Err(e) if e.is_disconnect() => return Err(SessionError::UnexpectedEndOfListing),
                Err(e) => return Err(e.into()),
            };
            if line == LISTING_SENTINEL {
                return Ok(lines);
            }
            lines.push(line);
        }
    }

    /// Remove `file_name`, returning the coordinator's status.
    pub async fn remove(&mut self, file_name: &str) -> Result<String, SessionError> {
        self.send_keyed(ClientCommand::Remove, file_name).await?;
        Ok(read_string(&mut self.stream).await?)
    }

    /// Send a bare command token and read a single string reply.
    ///
    /// Used for tokens the session does not recognise; the coordinator
    /// answers those with `"Invalid command"`.
    pub async fn send_raw(&mut self, command: &str) -> Result<String, SessionError> {
        write_string(&mut self.stream, command).await?;
        self.stream.flush().await.map_err(WireError::from)?;
        Ok(read_string(&mut self.stream).await?)
    }

    /// End the session. Nothing is sent; the stream is shut down locally.
    pub async fn exit(mut self) -> Result<(), SessionError> {
        self.stream.shutdown().await.map_err(WireError::from)?;
        debug!("[ts-04] Session closed");
        Ok(())
    }

    async fn send_keyed(&mut self, command: ClientCommand, file_name: &str) -> Result<(), SessionError> {
        let mut writer = BufWriter::new(&mut self.stream);
        write_string(&mut writer, command.as_str()).await?;
        write_string(&mut writer, file_name).await?;
        writer.flush().await.map_err(WireError::from)?;
        Ok(())
    }
}
