//! Graphite render API client
//!
//! Fetches recent series for a target expression. The render window is
//! fixed to the last few minutes; historical ranges are never requested.

pub mod client;
pub mod series;

pub use client::{GraphiteClient, GraphiteConfig, GraphiteError};
pub use series::{Datapoint, Series};
