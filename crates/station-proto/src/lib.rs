pub mod client;
pub mod config;
pub mod platform;
pub mod protocol;
pub mod snapshot;

pub use client::{StationClient, StationError, StationService};
pub use snapshot::StationSnapshot;
