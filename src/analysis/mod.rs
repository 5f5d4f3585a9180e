//! Analysis modules.
//!
//! Aggregation of the raw dataset into dashboard series, place filtering
//! for the map explorer and region grouping for the region browser.

pub mod aggregator;
pub mod filters;
pub mod regions;

pub use aggregator::*;
pub use filters::*;
pub use regions::*;
