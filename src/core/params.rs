//! Live parameter and image state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use crate::core::types::{ParameterPatch, ParameterSet, SourceImage};

#[derive(Debug, Default)]
struct StoreState {
    parameters: ParameterSet,
    image: Option<SourceImage>,
}

fn lock(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    // Every write is a single assignment; a poisoned state is still consistent.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the live knob values and the selected image.
///
/// Pure state: no timers, no network. Only the owner writes; the coordinator
/// reads the same values through a [`ParameterView`], so there is exactly one
/// copy of the parameters and the image.
#[derive(Debug, Default)]
pub struct ParameterStore {
    state: Arc<Mutex<StoreState>>,
}

impl ParameterStore {
    pub fn new(parameters: ParameterSet) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState { parameters, image: None })),
        }
    }

    /// Read-only handle onto this store.
    pub fn view(&self) -> ParameterView {
        ParameterView { state: Arc::clone(&self.state) }
    }

    /// Merges `patch` into the live set and returns the new snapshot.
    pub fn update(&mut self, patch: &ParameterPatch) -> ParameterSet {
        let mut state = lock(&self.state);
        state.parameters = state.parameters.merged(patch);
        debug!("Parameters updated: {}", state.parameters);
        state.parameters
    }

    pub fn snapshot(&self) -> ParameterSet {
        lock(&self.state).parameters
    }

    pub fn image(&self) -> Option<SourceImage> {
        lock(&self.state).image.clone()
    }

    pub fn set_image(&mut self, image: SourceImage) {
        debug!("Source image set: {} ({} bytes)", image.file_name(), image.len());
        lock(&self.state).image = Some(image);
    }

    pub fn clear_image(&mut self) {
        lock(&self.state).image = None;
    }

    /// Restores every knob to its default and returns the snapshot.
    pub fn reset_parameters(&mut self) -> ParameterSet {
        let mut state = lock(&self.state);
        state.parameters = ParameterSet::default();
        state.parameters
    }
}

/// Read access to a [`ParameterStore`] for the coordinator.
#[derive(Debug, Clone)]
pub struct ParameterView {
    state: Arc<Mutex<StoreState>>,
}

impl ParameterView {
    pub fn snapshot(&self) -> ParameterSet {
        lock(&self.state).parameters
    }

    pub fn image(&self) -> Option<SourceImage> {
        lock(&self.state).image.clone()
    }

    pub fn has_image(&self) -> bool {
        lock(&self.state).image.is_some()
    }
}
