//! Command handlers behind the `imagify` CLI.

pub mod health;
pub mod image;
pub mod interactive;

pub use health::ping;
pub use image::{open_session, run_operation, wait_for_settled};
