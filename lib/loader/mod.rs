//! Loading decoded classes into stackflow.
//!
//! Class files are decoded by a bytecode container outside this crate. The
//! loaders here read the decoded form.

pub mod json;
