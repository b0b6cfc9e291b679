//! Project-document model for text animators.
//!
//! Everything here is plain data: the host editor creates and persists these
//! values, the evaluation core in `text-animator-core` only reads them.

pub mod model;

pub use model::*;
