//! # Shard Key Derivation
//!
//! `<file name>_part<index + 1>`. The suffix is one-based while shard indices
//! are zero-based; stores already holding data depend on this exact form.

use crate::domain::ShardIndex;

/// Store key of one shard of `file_name`.
///
/// The file name is used verbatim: no trimming, case folding or path handling.
pub fn derive_key(file_name: &str, index: ShardIndex) -> String {
    format!("{}_part{}", file_name, index.ordinal())
}
