// # publicip-core
//
// Core library for the public IP lookup provider.
//
// ## Architecture Overview
//
// One lookup answers "which public address is this machine using right now":
// - **Address**: Parsing and family classification of IP literals
// - **RateLimiter**: Shared token bucket gating outbound requests
// - **ProviderConfig**: Resolved settings, built once from host-supplied values
// - **Lookup**: The single-shot request → decode → normalize flow
// - **Fetcher**: Trait for the network-constrained HTTP transport
//
// ## Design Principles
//
// 1. **Single Attempt**: Every failure is terminal for its lookup, nothing retries
// 2. **Injected Shared State**: The rate limiter is passed in, never a global
// 3. **Library-First**: The transport is a trait, implementations live in other crates
// 4. **Explicit Absence**: Optional inputs are `Option`, never empty strings

pub mod address;
pub mod config;
pub mod error;
pub mod lookup;
pub mod network;
pub mod ratelimit;
pub mod response;
pub mod traits;

// Re-export core types for convenience
pub use address::{Address, IpVersion, VersionLabel};
pub use config::{ProviderConfig, ProviderSettings};
pub use error::{Error, Result};
pub use lookup::{Lookup, LookupRequest, LookupResult};
pub use network::{NetworkConstraint, NetworkFamily};
pub use ratelimit::RateLimiter;
pub use traits::{FetchRequest, FetchResponse, Fetcher, Throttle};
