// src/lib.rs
pub mod domain;
pub mod live;
pub mod money;
pub mod rest;
pub mod session;
pub mod view;

pub use domain::*;
pub use money::*;
