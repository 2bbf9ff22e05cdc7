//! Request coordination for a single backend operation.
//!
//! - [`RequestCoordinator`]: debounces changes, mints tokens, publishes results
//! - [`OperationResult`]: the state the presenter renders
//! - [`RequestToken`]: identifies one scheduled evaluation

mod debounce;
mod request;
mod result;
mod token;

pub use debounce::{Debouncer, DebouncerConfig};
pub use request::{CoordinatorConfig, RequestCoordinator};
pub use result::OperationResult;
pub use token::RequestToken;
pub(crate) use token::TokenMinter;
