//! One-shot command handlers: enhance, smile and video.

use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info};
use crate::client::HttpBackend;
use crate::config::AppConfig;
use crate::coordinator::{OperationResult, RequestToken};
use crate::core::{OperationKind, ParameterPatch, ResultPayload, Session};
use crate::utils::{ImagifyError, ImagifyResult, read_source_image, save_payload};

/// Builds a session for `operation` against the configured backend.
pub fn open_session(config: &AppConfig, operation: OperationKind) -> ImagifyResult<Session<HttpBackend>> {
    let backend = HttpBackend::new(&config.api_base, config.connect_timeout())?;
    Session::new(backend, operation, config.coordinator_config(operation))
}

/// Runs `operation` once on the image at `input` and saves the result.
///
/// The call goes through the same coordinator the interactive mode uses, with
/// an explicit apply instead of the debounce timer.
///
/// # Returns
/// Path of the downloaded payload inside `config.output_dir`.
pub async fn run_operation(
    config: &AppConfig,
    operation: OperationKind,
    input: &Path,
    patch: &ParameterPatch,
) -> ImagifyResult<PathBuf> {
    let mut coordinator_config = config.coordinator_config(operation);
    coordinator_config.evaluate_on_select = false;

    let backend = HttpBackend::new(&config.api_base, config.connect_timeout())?;
    let mut session = Session::new(backend, operation, coordinator_config)?;

    let image = read_source_image(input).await?;
    session.update(patch);
    session.select_image(image);

    let token = session.apply()?;
    info!("Running {} on {} with {}", operation, input.display(), session.parameters());

    let payload = into_payload(operation, wait_for_settled(session.subscribe(), token).await)?;
    save_payload(&config.output_dir, &payload).await
}

/// The payload of a settled result, or why there is none.
fn into_payload(operation: OperationKind, settled: OperationResult) -> ImagifyResult<ResultPayload> {
    match settled {
        OperationResult::Success(_, payload) => Ok(payload),
        OperationResult::Failed(_, err) => Err(err.into()),
        other => Err(ImagifyError::no_result(format!("{} ended without a result: {:?}", operation, other))),
    }
}

/// Waits until `token` resolves, or until the result moves past it.
pub async fn wait_for_settled(
    mut results: watch::Receiver<OperationResult>,
    token: RequestToken,
) -> OperationResult {
    loop {
        {
            let current = results.borrow_and_update();
            match &*current {
                OperationResult::Success(t, _) | OperationResult::Failed(t, _) if *t >= token => {
                    return current.clone();
                }
                OperationResult::Pending(t) if *t > token => return current.clone(),
                OperationResult::Idle => {
                    debug!("Result went idle while waiting for {}", token);
                    return OperationResult::Idle;
                }
                _ => {}
            }
        }

        if results.changed().await.is_err() {
            return results.borrow().clone();
        }
    }
}
