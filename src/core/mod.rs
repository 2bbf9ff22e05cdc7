//! Core application types and state management.
//!
//! - [`Session`]: owner of the live parameters and their coordinator
//! - [`ParameterStore`]: live knob values and selected image
//! - [`ParameterView`]: the coordinator's read-only handle onto the store
//! - [`ParameterSet`]: immutable snapshot of the knobs
//! - [`SourceImage`] / [`ResultPayload`]: media going to and coming from the backend

mod params;
mod state;
mod types;

pub use params::{ParameterStore, ParameterView};
pub use state::Session;
pub use types::{
    KNOB_DEFAULT, KNOB_MAX, KNOB_MIN, Knob, MediaKind, OperationKind, ParameterPatch, ParameterSet,
    ResultPayload, SourceImage,
};
