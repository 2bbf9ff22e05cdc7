// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod client;
pub mod coordinator;
pub mod config;
pub mod commands;

// Public exports for external consumers
pub use client::{BackendClient, BackendRequest, HttpBackend};
pub use config::AppConfig;
pub use coordinator::{CoordinatorConfig, OperationResult, RequestCoordinator, RequestToken};
pub use crate::core::{Knob, MediaKind, OperationKind, ParameterPatch, ParameterSet, ParameterStore, ParameterView, ResultPayload, Session, SourceImage};
pub use utils::{ClientError, ClientResult, ErrorKind, ImagifyError, ImagifyResult, InputError};

// This library file is the public API for consuming this crate as a library.
// The command-line entry point is in main.rs.
