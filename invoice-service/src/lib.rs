//! Invoice Service - gapless invoice numbering, markup pricing and
//! create-or-update-by-number persistence.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
