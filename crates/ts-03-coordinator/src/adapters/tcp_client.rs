//! # TCP Shard Store Client
//!
//! Speaks the store protocol with one fresh connection per call.

use crate::domain::ShardClientError;
use crate::ports::ShardStoreClient;
use async_trait::async_trait;
use shared_wire::{
    read_blob, read_store_len, read_string, write_blob, write_store_len, write_string,
    DeleteStatus, StoreCommand, MAX_STORE_FRAME_LEN,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::debug;
use ts_02_shard_router::StoreAddress;

/// Shard store client over TCP.
#[derive(Clone, Debug)]
pub struct TcpShardStoreClient {
    address: StoreAddress,
    max_shard_len: u64,
}

impl TcpShardStoreClient {
    /// Client for the store at `address`.
    pub fn new(address: StoreAddress) -> Self {
        Self {
            address,
            max_shard_len: MAX_STORE_FRAME_LEN,
        }
    }

    /// Refuse retrieved shards longer than `max` bytes.
    pub fn with_max_shard_len(mut self, max: u64) -> Self {
        self.max_shard_len = max.min(MAX_STORE_FRAME_LEN);
        self
    }

    /// Largest shard `retrieve` accepts.
    pub fn max_shard_len(&self) -> u64 {
        self.max_shard_len
    }

    async fn connect(&self) -> Result<TcpStream, ShardClientError> {
        let stream = TcpStream::connect((self.address.host.as_str(), self.address.port))
            .await
            .map_err(|source| ShardClientError::Connect {
                address: self.address.to_string(),
                source,
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(address = %self.address, error = %e, "[ts-03] Cannot set TCP_NODELAY");
        }
        Ok(stream)
    }

    async fn send_keyed(
        &self,
        command: StoreCommand,
        key: &str,
    ) -> Result<TcpStream, ShardClientError> {
        let mut stream = self.connect().await?;
        let mut writer = BufWriter::new(&mut stream);
        write_string(&mut writer, command.as_str()).await?;
        write_string(&mut writer, key).await?;
        writer.flush().await.map_err(shared_wire::WireError::from)?;
        Ok(stream)
    }
}

#[async_trait]
impl ShardStoreClient for TcpShardStoreClient {
    async fn store(&self, key: &str, bytes: &[u8]) -> Result<(), ShardClientError> {
        let mut stream = self.connect().await?;
        {
            let mut writer = BufWriter::new(&mut stream);
            write_string(&mut writer, StoreCommand::Store.as_str()).await?;
            write_string(&mut writer, key).await?;
            write_store_len(&mut writer, bytes.len()).await?;
            write_blob(&mut writer, bytes).await?;
            writer.flush().await.map_err(shared_wire::WireError::from)?;
        }

        // No reply payload: half-close, then wait for the store to hang up
        stream
            .shutdown()
            .await
            .map_err(shared_wire::WireError::from)?;
        let mut trailing = Vec::new();
        stream
            .read_to_end(&mut trailing)
            .await
            .map_err(shared_wire::WireError::from)?;
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Vec<u8>, ShardClientError> {
        let mut stream = self.send_keyed(StoreCommand::Retrieve, key).await?;
        let len = read_store_len(&mut stream, self.max_shard_len).await?;
        Ok(read_blob(&mut stream, len).await?)
    }

    async fn list_keys(&self) -> Result<Vec<String>, ShardClientError> {
        let mut stream = self.connect().await?;
        write_string(&mut stream, StoreCommand::List.as_str()).await?;

        let count = read_store_len(&mut stream, MAX_STORE_FRAME_LEN).await?;
        let mut keys = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            keys.push(read_string(&mut stream).await?);
        }
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<DeleteStatus, ShardClientError> {
        let mut stream = self.send_keyed(StoreCommand::Remove, key).await?;
        let reply = read_string(&mut stream).await?;
        Ok(DeleteStatus::from_wire(&reply))
    }
}
