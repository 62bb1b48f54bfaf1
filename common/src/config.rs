use crate::crypto::ObjectId;

// Package version followed by the short commit hash, set by build.rs
pub const VERSION: &str = env!("BUILD_VERSION");

// Native coin of the ledger
// 1 SUI = 10^9 MIST, every on-chain amount is expressed in MIST
pub const COIN_DECIMALS: u8 = 9;
pub const COIN_VALUE: u64 = 10u64.pow(COIN_DECIMALS as u32);
pub const COIN_TYPE: &str = "0x2::sui::SUI";

// Well-known shared clock object, created at genesis
pub const CLOCK_OBJECT_ID: ObjectId = ObjectId::from_u8(6);
pub const CLOCK_INITIAL_SHARED_VERSION: u64 = 1;

// Default gas budget for a single call: 0.05 SUI
pub const DEFAULT_GAS_BUDGET: u64 = 50_000_000;
// The ledger refuses more gas payment objects than this
pub const MAX_GAS_PAYMENT_OBJECTS: usize = 256;

// Maximum page size accepted by the node for paged queries
pub const MAX_PAGE_SIZE: usize = 50;

// Logical name of the deployed contract package in the manifest
pub const PACKAGE_LOGICAL_NAME: &str = "package";
