// DealHub Core - Domain Logic & Ports
// NO infrastructure dependencies (hexagonal layout: adapters live in the sdk crate)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};
