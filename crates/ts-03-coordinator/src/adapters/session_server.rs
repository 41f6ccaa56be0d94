//! # Client Session Server
//!
//! Accepts client connections and serves commands until the client hangs up.
//!
//! ## Session protocol
//!
//! | Command | Client sends | Reply |
//! |---------|--------------|-------|
//! | `upload` | name, `i64` length, bytes | status string |
//! | `download` | name | `i64` length, bytes |
//! | `ls` | - | header, sections, sentinel |
//! | `remove` | name | status string |
//! | other | - | `"Invalid command"` |
//!
//! Command tokens match case-insensitively.
//!
//! ## Shutdown
//!
//! Once shutdown is signalled the listener stops accepting. Sessions idle
//! between commands close; a command already being read or executed runs to
//! its reply first. `serve` returns when every session has ended, or aborts
//! the rest after the drain timeout.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use shared_wire::{
    check_len, listing_entry, listing_section, listing_unavailable, read_blob,
    read_client_len_raw, read_string, remove_failed, remove_succeeded, upload_failed,
    upload_rejected, write_blob, write_client_len, write_string, ClientCommand, WireError,
    INVALID_COMMAND, LISTING_HEADER, LISTING_SENTINEL, UPLOAD_SUCCESSFUL,
};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};
use ts_telemetry::{BYTES_TRANSFERRED, CLIENT_COMMANDS, CLIENT_SESSIONS_ACTIVE};
use uuid::Uuid;

use crate::domain::CoordinatorError;
use crate::ports::CoordinatorApi;

/// How long `serve` waits for open sessions after shutdown.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether the session loop keeps reading commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Close,
}

/// Keeps the active-session gauge accurate however a session ends.
struct ActiveSession;

impl ActiveSession {
    fn enter() -> Self {
        CLIENT_SESSIONS_ACTIVE.inc();
        Self
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        CLIENT_SESSIONS_ACTIVE.dec();
    }
}

/// TCP front end for the coordinator.
pub struct SessionServer<A: CoordinatorApi + 'static> {
    api: Arc<A>,
    drain_timeout: Duration,
}

impl<A: CoordinatorApi + 'static> SessionServer<A> {
    /// Create a server for `api`.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Bound the wait for open sessions after shutdown.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Accept client sessions until `shutdown` flips to `true`, then wait for
    /// open sessions to finish.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), CoordinatorError> {
        if let Ok(addr) = listener.local_addr() {
            info!("[ts-03] 🚀 Coordinator listening on {}", addr);
        }

        let mut sessions = JoinSet::new();
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            if let Err(e) = stream.set_nodelay(true) {
                                debug!(%peer, error = %e, "[ts-03] Cannot set TCP_NODELAY");
                            }
                            self.spawn_session(&mut sessions, stream, peer, shutdown.clone());
                        }
                        Err(e) => {
                            error!(error = %e, "[ts-03] Accept error");
                        }
                    }
                }
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "[ts-03] Session task failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("[ts-03] Coordinator shutting down");
                        break;
                    }
                }
            }
        }
        drop(listener);

        drain(&mut sessions, self.drain_timeout).await;
        Ok(())
    }

    fn spawn_session(
        &self,
        sessions: &mut JoinSet<()>,
        stream: tokio::net::TcpStream,
        peer: SocketAddr,
        shutdown: watch::Receiver<bool>,
    ) {
        let api = Arc::clone(&self.api);
        let session_id = Uuid::new_v4();
        let span = info_span!("session", id = %session_id, %peer);

        sessions.spawn(
            async move {
                info!("[ts-03] Client connected");
                match run_session(api, stream, shutdown).await {
                    Ok(()) => info!("[ts-03] Client disconnected"),
                    Err(e) => debug!(error = %e, "[ts-03] Session ended with error"),
                }
            }
            .instrument(span),
        );
    }

    /// Serve one session on an already accepted stream.
    pub async fn handle<S>(&self, stream: S) -> Result<(), CoordinatorError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (_never, shutdown) = watch::channel(false);
        run_session(Arc::clone(&self.api), stream, shutdown).await
    }
}

/// Wait up to `timeout` for every session, then abort the stragglers.
async fn drain(sessions: &mut JoinSet<()>, timeout: Duration) {
    if sessions.is_empty() {
        return;
    }
    info!(open = sessions.len(), "[ts-03] Waiting for open sessions");

    let finished = tokio::time::timeout(timeout, async {
        while sessions.join_next().await.is_some() {}
    })
    .await;

    if finished.is_err() {
        warn!(
            open = sessions.len(),
            "[ts-03] Sessions still open after drain timeout, aborting"
        );
        sessions.shutdown().await;
    }
}

/// Resolves once shutdown is signalled; never if the sender is gone.
async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    let signalled = shutdown.wait_for(|stop| *stop).await.is_ok();
    if !signalled {
        std::future::pending::<()>().await;
    }
}

async fn run_session<A, S>(
    api: Arc<A>,
    mut stream: S,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), CoordinatorError>
where
    A: CoordinatorApi + 'static,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let _active = ActiveSession::enter();

    loop {
        let token = tokio::select! {
            biased;
            read = read_string(&mut stream) => match read {
                Ok(token) => token,
                // Hanging up between commands is the normal way to end a session
                Err(e) if e.is_disconnect() => return Ok(()),
                Err(e) => return Err(e.into()),
            },
            _ = shutdown_signalled(&mut shutdown) => {
                debug!("[ts-03] Closing idle session for shutdown");
                return Ok(());
            }
        };

        let flow = match ClientCommand::parse(&token) {
            Some(command) => {
                CLIENT_COMMANDS.with_label_values(&[command.as_str()]).inc();
                debug!(%command, "[ts-03] Command received");
                dispatch(api.as_ref(), command, &mut stream).await?
            }
            None => {
                CLIENT_COMMANDS.with_label_values(&["invalid"]).inc();
                debug!(command = %token, "[ts-03] Invalid command");
                write_string(&mut stream, INVALID_COMMAND).await?;
                Flow::Continue
            }
        };
        stream.flush().await.map_err(WireError::from)?;

        if flow == Flow::Close {
            return Ok(());
        }
    }
}

async fn dispatch<A, S>(
    api: &A,
    command: ClientCommand,
    stream: &mut S,
) -> Result<Flow, CoordinatorError>
where
    A: CoordinatorApi,
    S: AsyncRead + AsyncWrite + Unpin,
{
    match command {
        ClientCommand::Upload => handle_upload(api, stream).await,
        ClientCommand::Download => handle_download(api, stream).await,
        ClientCommand::List => handle_list(api, stream).await,
        ClientCommand::Remove => handle_remove(api, stream).await,
        ClientCommand::Exit => Ok(Flow::Close),
    }
}

async fn handle_upload<A, S>(api: &A, stream: &mut S) -> Result<Flow, CoordinatorError>
where
    A: CoordinatorApi,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let file_name = read_string(stream).await?;
    let declared = read_client_len_raw(stream).await?;

    let max = api.config().max_file_size;

    // Nothing follows a non-positive length, so the stream stays in sync
    if declared <= 0 {
        let error = CoordinatorError::InvalidLength { declared, max };
        warn!(file = %file_name, %error, "[ts-03] Upload rejected");
        write_string(stream, &upload_rejected(declared)).await?;
        return Ok(Flow::Continue);
    }

    let len = match check_len(declared, max) {
        Ok(len) => len,
        Err(_) => {
            let error = CoordinatorError::InvalidLength { declared, max };
            warn!(file = %file_name, %error, "[ts-03] Upload too large, closing session");
            write_string(stream, &upload_rejected(declared)).await?;
            return Ok(Flow::Close);
        }
    };

    let bytes = read_blob(stream, len).await?;
    BYTES_TRANSFERRED
        .with_label_values(&["upload"])
        .inc_by(len as u64);

    let report = api.upload(&file_name, &bytes).await;
    let reply = if report.is_success() {
        UPLOAD_SUCCESSFUL.to_string()
    } else {
        upload_failed(&file_name)
    };
    write_string(stream, &reply).await?;
    Ok(Flow::Continue)
}

async fn handle_download<A, S>(api: &A, stream: &mut S) -> Result<Flow, CoordinatorError>
where
    A: CoordinatorApi,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let file_name = read_string(stream).await?;
    let outcome = api.download(&file_name).await;

    match outcome.data {
        Some(bytes) => {
            write_client_len(stream, bytes.len()).await?;
            write_blob(stream, &bytes).await?;
            BYTES_TRANSFERRED
                .with_label_values(&["download"])
                .inc_by(bytes.len() as u64);
        }
        None => write_client_len(stream, 0).await?,
    }
    Ok(Flow::Continue)
}

async fn handle_list<A, S>(api: &A, stream: &mut S) -> Result<Flow, CoordinatorError>
where
    A: CoordinatorApi,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let listings = api.list().await;

    let mut writer = BufWriter::new(stream);
    write_string(&mut writer, LISTING_HEADER).await?;
    for listing in &listings {
        match &listing.keys {
            Some(keys) => {
                write_string(&mut writer, &listing_section(listing.ordinal)).await?;
                for key in keys {
                    write_string(&mut writer, &listing_entry(key)).await?;
                }
            }
            None => write_string(&mut writer, &listing_unavailable(listing.ordinal)).await?,
        }
    }
    write_string(&mut writer, LISTING_SENTINEL).await?;
    writer.flush().await.map_err(WireError::from)?;
    Ok(Flow::Continue)
}

async fn handle_remove<A, S>(api: &A, stream: &mut S) -> Result<Flow, CoordinatorError>
where
    A: CoordinatorApi,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let file_name = read_string(stream).await?;
    let report = api.remove(&file_name).await;

    let reply = if report.is_success() {
        remove_succeeded(&file_name)
    } else {
        remove_failed(&file_name)
    };
    write_string(stream, &reply).await?;
    Ok(Flow::Continue)
}
