//! Core traits for the public IP lookup
//!
//! These are the seams where implementations are injected:
//!
//! - [`Fetcher`]: Perform the outbound HTTP request under a network constraint
//! - [`Throttle`]: Gate outbound requests (the shared rate limiter)

pub mod fetcher;
pub mod throttle;

pub use fetcher::{FetchRequest, FetchResponse, Fetcher};
pub use throttle::Throttle;
