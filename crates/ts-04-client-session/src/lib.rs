//! # TS-04 Client Session
//!
//! The caller's side of the coordinator protocol.
//!
//! **Subsystem ID:** 04
//!
//! A session sends one command token, then the command's fields, then waits
//! for the reply. There is no retry and no timeout; a stream fault ends the
//! session.
//!
//! ```rust,ignore
//! use ts_04_client_session::ClientSession;
//!
//! let mut session = ClientSession::connect("127.0.0.1:5000").await?;
//! session.upload("photo.jpg", &bytes).await?;
//! let restored = session.download("photo.jpg").await?;
//! session.exit().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod errors;
mod files;
mod session;

pub use errors::SessionError;
pub use session::{ClientSession, DEFAULT_MAX_DOWNLOAD_LEN};
