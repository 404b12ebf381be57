//! Content Search Service abstractions.

pub mod box_search;
pub mod search;
