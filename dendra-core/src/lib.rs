//! Shared primitives for the dendra clustering workspace.
//!
//! `dendra-core` provides the foundation the algorithmic crates build on:
//!
//! - **Error types** — [`DendraError`] and [`Result`] for structured error handling
//! - **Traits** — [`Summarizable`] for one-line result summaries
//! - **Cancellation** — [`CancelToken`] for cooperative interruption of
//!   long-running background computations

pub mod cancel;
pub mod error;
pub mod traits;

pub use cancel::CancelToken;
pub use error::{DendraError, Result};
pub use traits::Summarizable;
