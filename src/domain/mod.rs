// src/domain/mod.rs
pub mod bids;
pub mod core;
pub mod snapshot;
pub mod time_remaining;
pub mod validate;

pub use self::bids::*;
pub use self::core::*;
pub use self::snapshot::*;
pub use self::time_remaining::*;
pub use self::validate::*;
