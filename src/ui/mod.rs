//! Terminal presentation helpers.

pub mod markdown;
