//! # Status Strings
//!
//! Human-readable replies that existing clients and stores match on.
//!
//! Internally every outcome is an enum; these helpers are the only place the
//! text form is built or inspected.

/// Reply to a successful upload.
pub const UPLOAD_SUCCESSFUL: &str = "Upload successful";

/// Reply to an unrecognised client command.
pub const INVALID_COMMAND: &str = "Invalid command";

/// First line of a listing.
pub const LISTING_HEADER: &str = "Files on server:";

/// Terminates a listing.
pub const LISTING_SENTINEL: &str = "No more files.";

/// Token a store's delete reply must contain to count as success.
pub const DELETE_SUCCESS_TOKEN: &str = "deleted successfully";

/// Reply to an upload where at least one shard write failed.
pub fn upload_failed(file_name: &str) -> String {
    format!("Upload failed for file {}.", file_name)
}

/// Reply to an upload whose declared length was refused.
pub fn upload_rejected(declared: i64) -> String {
    format!("Upload rejected: invalid length {}.", declared)
}

/// Reply to a remove where every shard was deleted.
pub fn remove_succeeded(file_name: &str) -> String {
    format!("File {} removed successfully.", file_name)
}

/// Reply to a remove where any shard deletion failed.
pub fn remove_failed(file_name: &str) -> String {
    format!("Failed to remove file {} from one or more sub-servers.", file_name)
}

/// Section header for one store in a listing (1-based ordinal).
pub fn listing_section(ordinal: usize) -> String {
    format!("Sub-server {}:", ordinal)
}

/// Section line for a store that could not be reached.
pub fn listing_unavailable(ordinal: usize) -> String {
    format!("Sub-server {}: unavailable", ordinal)
}

/// One key line in a listing.
pub fn listing_entry(key: &str) -> String {
    format!(" - {}", key)
}

/// Outcome of a shard store delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// The blob existed and was removed.
    Deleted,
    /// No blob was stored under the key.
    NotFound,
    /// The store could not complete the delete.
    Failed,
}

impl DeleteStatus {
    /// Render as the store's wire reply.
    pub fn to_wire(self, key: &str) -> String {
        match self {
            DeleteStatus::Deleted => format!("File {} {}.", key, DELETE_SUCCESS_TOKEN),
            DeleteStatus::NotFound => format!("File {} not found.", key),
            DeleteStatus::Failed => format!("Failed to delete file {}.", key),
        }
    }

    /// Interpret a store's wire reply.
    ///
    /// Only the success token is authoritative; any other text is a failure,
    /// refined to `NotFound` when the reply says so.
    pub fn from_wire(message: &str) -> Self {
        if message.contains(DELETE_SUCCESS_TOKEN) {
            DeleteStatus::Deleted
        } else if message.contains("not found") {
            DeleteStatus::NotFound
        } else {
            DeleteStatus::Failed
        }
    }

    /// Whether the delete counts toward an aggregate success.
    pub fn is_success(self) -> bool {
        matches!(self, DeleteStatus::Deleted)
    }
}
