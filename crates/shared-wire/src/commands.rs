//! # Command Tokens
//!
//! The first string frame of every request names the operation.

use std::fmt;

/// Commands a client session sends to the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientCommand {
    /// Send a whole file to be sharded.
    Upload,
    /// Fetch and reassemble a file.
    Download,
    /// List shard keys on every store.
    List,
    /// Delete every shard of a file.
    Remove,
    /// End the session (handled locally, never sent).
    Exit,
}

impl ClientCommand {
    /// All commands in display order.
    pub const ALL: [ClientCommand; 5] = [
        ClientCommand::Upload,
        ClientCommand::Download,
        ClientCommand::List,
        ClientCommand::Remove,
        ClientCommand::Exit,
    ];

    /// Parse a command token. Matching is case-insensitive; no trimming.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.as_str().eq_ignore_ascii_case(token))
    }

    /// Wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientCommand::Upload => "upload",
            ClientCommand::Download => "download",
            ClientCommand::List => "ls",
            ClientCommand::Remove => "remove",
            ClientCommand::Exit => "exit",
        }
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands the coordinator sends to a shard store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreCommand {
    /// Write or overwrite a blob.
    Store,
    /// Read a blob.
    Retrieve,
    /// Enumerate keys.
    List,
    /// Delete a blob.
    Remove,
}

impl StoreCommand {
    const ALL: [StoreCommand; 4] = [
        StoreCommand::Store,
        StoreCommand::Retrieve,
        StoreCommand::List,
        StoreCommand::Remove,
    ];

    /// Parse a store command token (exact, lowercase).
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.as_str() == token)
    }

    /// Wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreCommand::Store => "store",
            StoreCommand::Retrieve => "retrieve",
            StoreCommand::List => "ls",
            StoreCommand::Remove => "remove",
        }
    }
}

impl fmt::Display for StoreCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
