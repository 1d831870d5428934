//! Shared string and file helpers.

pub mod fs;
pub mod slug;
