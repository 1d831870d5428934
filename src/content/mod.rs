//! Content compilation pipeline.
//!
//! ```text
//! source text ──► section::extract ──► markdown (content only) ──► template::render ──► CompiledDocument
//! ```

mod compile;
mod markdown;
pub mod section;
pub mod template;

pub use compile::{CompiledDocument, compile};
