//! The `topic` module normalizes and validates topic identifiers.
//!
//! Every topic handled by the queue and the coordinator is in canonical
//! `/topics/<name>` form. Both functions here are pure.

pub mod name;

pub use name::{TOPIC_PREFIX, is_valid, normalize};

#[cfg(test)]
mod tests;
