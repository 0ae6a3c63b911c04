// src/rest/mod.rs
pub mod client;
pub mod types;

pub use self::client::*;
pub use self::types::*;
