//! Transport to the image-processing backend.
//!
//! - [`BackendClient`]: one async call per request, swappable per operation
//! - [`HttpBackend`]: the `reqwest` implementation talking to the FastAPI service
//! - [`response`]: decoding of the enhance JSON body, binary media and error bodies

mod http;
pub mod response;

use std::future::Future;
use crate::core::{OperationKind, ParameterSet, ResultPayload, SourceImage};
use crate::utils::ClientResult;

pub use http::HttpBackend;

/// Everything a single backend call needs, passed by value.
///
/// The client consumes the request, so nothing about it outlives the call.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub operation: OperationKind,
    pub image: SourceImage,
    pub parameters: ParameterSet,
}

/// Performs one backend call and returns the media or a typed failure.
///
/// A call never partially completes. Implementations must not cache inputs or
/// outputs between calls.
pub trait BackendClient: Send + Sync + 'static {
    fn execute(&self, request: BackendRequest) -> impl Future<Output = ClientResult<ResultPayload>> + Send;
}
