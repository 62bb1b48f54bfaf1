pub mod capability;
pub mod context;
pub mod error;
pub mod events;
pub mod executor;
pub mod ledger;
pub mod manifest;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod node_api;
pub mod operations;
pub mod transaction_builder;

#[cfg(feature = "cli")]
pub mod config;
