pub mod api;
pub mod config;
pub mod error;
pub mod friendship;
pub mod model;
pub mod session;
pub mod state;

pub use crate::error::{Error, Result};
