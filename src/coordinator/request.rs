//! Debounced, latest-wins pipeline from parameter changes to a published result.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use crate::client::{BackendClient, BackendRequest};
use crate::coordinator::debounce::{Debouncer, DebouncerConfig};
use crate::coordinator::{OperationResult, RequestToken, TokenMinter};
use crate::core::{OperationKind, ParameterSet, ParameterView, ResultPayload, SourceImage};
use crate::utils::{ClientError, ClientResult, ImagifyError, ImagifyResult, InputError};

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Quiet period before a parameter change is evaluated
    pub debounce: Duration,
    /// Hard deadline per backend call; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    /// Schedule an evaluation as soon as an image is selected (interactive operations only)
    pub evaluate_on_select: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            request_timeout: Some(Duration::from_secs(60)),
            evaluate_on_select: true,
        }
    }
}

struct CoordinatorState {
    minter: TokenMinter,
    /// Token whose response may still be published. `None` after an image
    /// switch or reset, so every outstanding response is stale.
    current: Option<RequestToken>,
    debouncer: Debouncer,
}

struct Shared<C> {
    client: C,
    operation: OperationKind,
    config: CoordinatorConfig,
    runtime: Handle,
    store: ParameterView,
    state: Mutex<CoordinatorState>,
    published: watch::Sender<OperationResult>,
}

/// Turns parameter and image changes into backend calls and publishes the
/// result of the most recently minted token only.
///
/// Parameters and image are read from the session's store at evaluation time;
/// the coordinator keeps no copy of them. Every state transition happens under
/// one lock, so a token is never visible without its `Pending` state.
/// Superseded calls keep running; their responses are dropped on arrival.
pub struct RequestCoordinator<C: BackendClient> {
    shared: Arc<Shared<C>>,
}

impl<C: BackendClient> Clone for RequestCoordinator<C> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<C: BackendClient> RequestCoordinator<C> {
    /// Creates a coordinator bound to the ambient tokio runtime.
    pub fn new(
        client: C,
        operation: OperationKind,
        config: CoordinatorConfig,
        store: ParameterView,
    ) -> ImagifyResult<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| ImagifyError::config(format!("Coordinator needs a tokio runtime: {}", e)))?;
        Ok(Self::with_runtime(client, operation, config, store, runtime))
    }

    pub fn with_runtime(
        client: C,
        operation: OperationKind,
        config: CoordinatorConfig,
        store: ParameterView,
        runtime: Handle,
    ) -> Self {
        let debouncer = Debouncer::new(Some(DebouncerConfig { quiet_period: config.debounce }));
        let (published, _) = watch::channel(OperationResult::Idle);

        Self {
            shared: Arc::new(Shared {
                client,
                operation,
                config,
                runtime,
                store,
                state: Mutex::new(CoordinatorState {
                    minter: TokenMinter::default(),
                    current: None,
                    debouncer,
                }),
                published,
            }),
        }
    }

    pub fn operation(&self) -> OperationKind {
        self.shared.operation
    }

    /// Restarts the quiet period after the store moved to `snapshot`.
    ///
    /// Nothing is scheduled without a selected image, or for one-shot
    /// operations, which only run on [`trigger_now`](Self::trigger_now).
    pub fn on_parameters_changed(&self, snapshot: ParameterSet) {
        let mut state = self.shared.lock_state();

        if !self.shared.store.has_image() {
            debug!("Parameters changed to {} with no image selected, nothing scheduled", snapshot);
            return;
        }
        if !self.shared.operation.is_interactive() {
            debug!("Parameters changed to {}, {} waits for apply", snapshot, self.shared.operation);
            return;
        }

        Shared::schedule(&self.shared, &mut state);
    }

    /// Called after the store's image became `image`: returns the result to
    /// `Idle` and makes every outstanding evaluation stale.
    pub fn on_image_selected(&self, image: &SourceImage) {
        let mut state = self.shared.lock_state();
        state.debouncer.cancel();
        state.current = None;
        info!("Image selected for {}: {} ({} bytes)", self.shared.operation, image.file_name(), image.len());
        self.shared.published.send_replace(OperationResult::Idle);

        if self.shared.operation.is_interactive() && self.shared.config.evaluate_on_select {
            Shared::schedule(&self.shared, &mut state);
        }
    }

    /// Skips the quiet period and evaluates the current snapshot immediately.
    pub fn trigger_now(&self) -> ImagifyResult<RequestToken> {
        let mut state = self.shared.lock_state();
        state.debouncer.cancel();
        Shared::evaluate(&self.shared, &mut state).ok_or_else(|| InputError::NoImageSelected.into())
    }

    /// Returns the result to `Idle` and makes every outstanding evaluation
    /// stale. The store's values are left to its owner.
    pub fn reset(&self) {
        let mut state = self.shared.lock_state();
        state.debouncer.cancel();
        state.current = None;
        self.shared.published.send_replace(OperationResult::Idle);
        debug!("Coordinator for {} reset", self.shared.operation);
    }

    pub fn current_result(&self) -> OperationResult {
        self.shared.published.borrow().clone()
    }

    /// Change notifications for the presenter. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<OperationResult> {
        self.shared.published.subscribe()
    }

    /// The payload of the current `Success` state, if there is one.
    pub fn download_payload(&self) -> Option<ResultPayload> {
        self.shared.published.borrow().payload().cloned()
    }

    /// Whether a debounced evaluation is waiting for its quiet period.
    pub fn has_scheduled_evaluation(&self) -> bool {
        self.shared.lock_state().debouncer.is_pending()
    }
}

impl<C: BackendClient> Shared<C> {
    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        // Transitions have no fallible code between writes; a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule(this: &Arc<Self>, state: &mut CoordinatorState) {
        let weak: Weak<Self> = Arc::downgrade(this);
        let superseded = state.debouncer.schedule(&this.runtime, move |epoch| {
            if let Some(shared) = weak.upgrade() {
                Shared::fire_debounced(&shared, epoch);
            }
        });

        if superseded {
            debug!("Rescheduled {} evaluation", this.operation);
        }
    }

    fn fire_debounced(this: &Arc<Self>, epoch: u64) {
        let mut state = this.lock_state();
        if !state.debouncer.take_if_current(epoch) {
            return;
        }
        Self::evaluate(this, &mut state);
    }

    /// Mints a token, publishes `Pending` and spawns the backend call with the
    /// store's current image and parameters.
    fn evaluate(this: &Arc<Self>, state: &mut CoordinatorState) -> Option<RequestToken> {
        let image = this.store.image()?;
        let token = state.minter.mint();
        state.current = Some(token);
        this.published.send_replace(OperationResult::Pending(token));

        let request = BackendRequest {
            operation: this.operation,
            image,
            parameters: this.store.snapshot(),
        };
        debug!("Evaluating {} {} with {}", this.operation, token, request.parameters);

        let shared = Arc::clone(this);
        this.runtime.spawn(async move {
            let outcome = shared.run(request).await;
            shared.resolve(token, outcome);
        });

        Some(token)
    }

    async fn run(&self, request: BackendRequest) -> ClientResult<ResultPayload> {
        match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.client.execute(request))
                .await
                .unwrap_or(Err(ClientError::Timeout(limit))),
            None => self.client.execute(request).await,
        }
    }

    fn resolve(&self, token: RequestToken, outcome: ClientResult<ResultPayload>) {
        let state = self.lock_state();
        if state.current != Some(token) {
            debug!("Discarding stale {} response for {}", self.operation, token);
            return;
        }

        let next = match outcome {
            Ok(payload) => {
                info!("{} {} succeeded ({} bytes)", self.operation, token, payload.len());
                OperationResult::Success(token, payload)
            }
            Err(err) => {
                warn!("{} {} failed: {}", self.operation, token, err);
                OperationResult::Failed(token, err)
            }
        };
        self.published.send_replace(next);
    }
}
