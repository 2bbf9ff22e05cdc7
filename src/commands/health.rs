use tracing::info;
use crate::client::HttpBackend;
use crate::config::AppConfig;
use crate::utils::ImagifyResult;

/// Checks that the backend is reachable and returns its greeting.
pub async fn ping(config: &AppConfig) -> ImagifyResult<String> {
    let backend = HttpBackend::new(&config.api_base, config.connect_timeout())?;
    let message = backend.ping().await?;
    info!("Backend at {} is up: {}", backend.api_base(), message);
    Ok(message)
}
