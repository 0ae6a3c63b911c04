// src/view/mod.rs
pub mod controller;
pub mod model;

pub use self::controller::*;
pub use self::model::*;
