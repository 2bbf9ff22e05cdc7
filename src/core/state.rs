//! Session state: the single owner of the parameter store and its coordinator.

use tokio::sync::watch;
use tracing::debug;
use crate::client::BackendClient;
use crate::coordinator::{CoordinatorConfig, OperationResult, RequestCoordinator, RequestToken};
use crate::core::params::ParameterStore;
use crate::core::types::{OperationKind, ParameterPatch, ParameterSet, ResultPayload, SourceImage};
use crate::utils::ImagifyResult;

/// One editing page: live parameters, the selected image and the coordinator
/// that turns them into backend calls.
///
/// Every mutation goes through here: the store is written first, then the
/// coordinator is notified synchronously. The coordinator reads the store
/// through a view and never writes it.
pub struct Session<C: BackendClient> {
    store: ParameterStore,
    coordinator: RequestCoordinator<C>,
}

impl<C: BackendClient> Session<C> {
    /// Creates the store and a coordinator bound to it on the ambient tokio runtime.
    pub fn new(client: C, operation: OperationKind, config: CoordinatorConfig) -> ImagifyResult<Self> {
        let store = ParameterStore::default();
        let coordinator = RequestCoordinator::new(client, operation, config, store.view())?;
        Ok(Self { store, coordinator })
    }

    pub fn operation(&self) -> OperationKind {
        self.coordinator.operation()
    }

    pub fn parameters(&self) -> ParameterSet {
        self.store.snapshot()
    }

    pub fn image(&self) -> Option<SourceImage> {
        self.store.image()
    }

    /// Applies a partial parameter change and notifies the coordinator.
    pub fn update(&mut self, patch: &ParameterPatch) -> ParameterSet {
        let snapshot = self.store.update(patch);
        self.coordinator.on_parameters_changed(snapshot);
        snapshot
    }

    pub fn select_image(&mut self, image: SourceImage) {
        self.store.set_image(image.clone());
        self.coordinator.on_image_selected(&image);
    }

    /// Explicit "apply": evaluates now instead of waiting for the quiet period.
    pub fn apply(&self) -> ImagifyResult<RequestToken> {
        self.coordinator.trigger_now()
    }

    /// Re-runs the current parameters after a failure.
    pub fn retry(&self) -> ImagifyResult<RequestToken> {
        debug!("Retrying {}", self.operation());
        self.coordinator.trigger_now()
    }

    /// Clears image, parameters and result; outstanding responses become stale.
    pub fn reset(&mut self) {
        self.store.clear_image();
        self.store.reset_parameters();
        self.coordinator.reset();
    }

    pub fn result(&self) -> OperationResult {
        self.coordinator.current_result()
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationResult> {
        self.coordinator.subscribe()
    }

    /// Payload to download: exactly the one in the current `Success` state.
    pub fn download(&self) -> Option<ResultPayload> {
        self.coordinator.download_payload()
    }

    pub fn coordinator(&self) -> &RequestCoordinator<C> {
        &self.coordinator
    }
}
