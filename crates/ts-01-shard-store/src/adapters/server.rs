//! # Shard Store Protocol Handler
//!
//! Serves the connection-per-request store protocol over TCP.
//!
//! Each connection carries exactly one command token followed by its fields.
//! The handler answers (or, for `store`, simply closes) and the connection
//! ends. Malformed requests are logged and the connection is dropped without
//! touching the inventory.
//!
//! After shutdown the listener closes but requests already accepted are
//! answered before `serve` returns, up to the drain timeout.

use std::sync::Arc;
use std::time::Duration;

use shared_wire::{
    read_blob, read_store_len, read_string, write_blob, write_store_len, write_string,
    DeleteStatus, StoreCommand,
};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use ts_telemetry::STORE_REQUESTS;

use crate::domain::StoreError;
use crate::ports::ShardStoreApi;

/// How long `serve` waits for accepted requests after shutdown.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP front end for a shard store.
pub struct ShardStoreServer<A: ShardStoreApi + 'static> {
    api: Arc<A>,
    drain_timeout: Duration,
}

impl<A: ShardStoreApi + 'static> ShardStoreServer<A> {
    /// Create a server for `api`.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Bound the wait for accepted requests after shutdown.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Accept connections until `shutdown` flips to `true`.
    ///
    /// Each connection runs on its own task. After shutdown those tasks are
    /// awaited for up to the drain timeout, then aborted.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), StoreError> {
        if let Ok(addr) = listener.local_addr() {
            info!("[ts-01] 🗄️  Shard store listening on {}", addr);
        }

        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            let api = Arc::clone(&self.api);
                            connections.spawn(async move {
                                if let Err(e) = handle_connection(api, stream).await {
                                    debug!(%peer, error = %e, "[ts-01] Connection ended with error");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "[ts-01] Accept error");
                        }
                    }
                }
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "[ts-01] Connection task failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("[ts-01] Shard store shutting down");
                        break;
                    }
                }
            }
        }
        drop(listener);

        if !connections.is_empty() {
            info!(open = connections.len(), "[ts-01] Finishing accepted requests");
            let finished = tokio::time::timeout(self.drain_timeout, async {
                while connections.join_next().await.is_some() {}
            })
            .await;
            if finished.is_err() {
                warn!(
                    open = connections.len(),
                    "[ts-01] Requests still open after drain timeout, aborting"
                );
                connections.shutdown().await;
            }
        }

        Ok(())
    }

    /// Serve one request on an already accepted stream.
    pub async fn handle<S>(&self, stream: S) -> Result<(), StoreError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        handle_connection(Arc::clone(&self.api), stream).await
    }
}

async fn handle_connection<A, S>(api: Arc<A>, mut stream: S) -> Result<(), StoreError>
where
    A: ShardStoreApi + 'static,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let token = read_string(&mut stream).await?;
    let Some(command) = StoreCommand::parse(&token) else {
        warn!(command = %token, "[ts-01] Unknown store command");
        STORE_REQUESTS.with_label_values(&["unknown", "error"]).inc();
        return Ok(());
    };

    let result = match command {
        StoreCommand::Store => handle_store(&api, &mut stream).await,
        StoreCommand::Retrieve => handle_retrieve(&api, &mut stream).await,
        StoreCommand::List => handle_list(&api, &mut stream).await,
        StoreCommand::Remove => handle_remove(&api, &mut stream).await,
    };

    let outcome = if result.is_ok() { "ok" } else { "error" };
    STORE_REQUESTS
        .with_label_values(&[command.as_str(), outcome])
        .inc();

    stream.flush().await.map_err(shared_wire::WireError::from)?;
    result
}

async fn handle_store<A, S>(api: &Arc<A>, stream: &mut S) -> Result<(), StoreError>
where
    A: ShardStoreApi + 'static,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let key = read_string(stream).await?;
    let len = read_store_len(stream, api.config().max_blob_size as u64).await?;
    let bytes = read_blob(stream, len).await?;

    let stored_key = key.clone();
    run_blocking(api, move |api| api.store(&stored_key, bytes)).await?;
    debug!(%key, bytes = len, "[ts-01] store");
    Ok(())
}

async fn handle_retrieve<A, S>(api: &Arc<A>, stream: &mut S) -> Result<(), StoreError>
where
    A: ShardStoreApi + 'static,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let key = read_string(stream).await?;

    let lookup_key = key.clone();
    let blob = match run_blocking(api, move |api| api.retrieve(&lookup_key)).await {
        Ok(blob) => blob,
        Err(e) => {
            warn!(%key, error = %e, "[ts-01] Retrieve failed, answering empty");
            None
        }
    };

    // Absent and empty look the same on the wire
    let bytes = blob.unwrap_or_default();
    write_store_len(stream, bytes.len()).await?;
    write_blob(stream, &bytes).await?;
    debug!(%key, bytes = bytes.len(), "[ts-01] retrieve");
    Ok(())
}

async fn handle_list<A, S>(api: &Arc<A>, stream: &mut S) -> Result<(), StoreError>
where
    A: ShardStoreApi + 'static,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let keys = run_blocking(api, |api| api.list_keys()).await?;

    write_store_len(stream, keys.len()).await?;
    for key in &keys {
        write_string(stream, key).await?;
    }
    debug!(count = keys.len(), "[ts-01] ls");
    Ok(())
}

async fn handle_remove<A, S>(api: &Arc<A>, stream: &mut S) -> Result<(), StoreError>
where
    A: ShardStoreApi + 'static,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let key = read_string(stream).await?;

    let delete_key = key.clone();
    let status = match run_blocking(api, move |api| api.delete(&delete_key)).await {
        Ok(status) => status,
        Err(e) => {
            warn!(%key, error = %e, "[ts-01] Remove failed");
            DeleteStatus::Failed
        }
    };

    write_string(stream, &status.to_wire(&key)).await?;
    debug!(%key, ?status, "[ts-01] remove");
    Ok(())
}

/// Run a (possibly disk-bound) API call off the async workers.
async fn run_blocking<A, T, F>(api: &Arc<A>, f: F) -> Result<T, StoreError>
where
    A: ShardStoreApi + 'static,
    T: Send + 'static,
    F: FnOnce(&A) -> Result<T, StoreError> + Send + 'static,
{
    let api = Arc::clone(api);
    tokio::task::spawn_blocking(move || f(&api))
        .await
        .map_err(|e| StoreError::Persistence {
            message: format!("store task failed: {}", e),
        })?
}
