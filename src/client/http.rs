use std::future::Future;
use std::time::Duration;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;
use crate::client::{BackendClient, BackendRequest, response};
use crate::core::{OperationKind, ResultPayload};
use crate::utils::{ClientError, ClientResult, ImagifyError, ImagifyResult};

/// Multipart field carrying the photo on every endpoint.
const FILE_FIELD: &str = "file";
/// Tag the video endpoint expects alongside the upload.
const VIDEO_SOURCE_TAG: &str = "upload";

/// Greeting returned by `GET /`.
#[derive(Debug, Deserialize)]
struct HealthBody {
    message: String,
}

/// [`BackendClient`] speaking multipart HTTP to the Imagify API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    api_base: String,
}

impl HttpBackend {
    /// Builds a client for `api_base`.
    ///
    /// `connect_timeout` bounds connection setup only; per-request deadlines
    /// belong to the coordinator so a timeout resolves just its own token.
    pub fn new(api_base: &str, connect_timeout: Duration) -> ImagifyResult<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();
        if api_base.is_empty() {
            return Err(ImagifyError::config("API base URL cannot be empty"));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ImagifyError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, api_base })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, operation: OperationKind) -> String {
        format!("{}{}", self.api_base, operation.path())
    }

    /// Text fields sent next to the file part.
    fn text_fields(operation: OperationKind) -> &'static [(&'static str, &'static str)] {
        match operation {
            OperationKind::Video => &[("source", VIDEO_SOURCE_TAG)],
            OperationKind::Enhance | OperationKind::Smile => &[],
        }
    }

    fn form_for(request: &BackendRequest) -> ClientResult<Form> {
        // `SourceImage` only admits well-formed image types, so this is a
        // corrupted request rather than a transport problem.
        let part = Part::bytes(request.image.data().to_vec())
            .file_name(request.image.file_name().to_string())
            .mime_str(request.image.content_type())
            .map_err(|e| ClientError::malformed(format!("Invalid upload content type: {}", e)))?;

        let form = Self::text_fields(request.operation)
            .iter()
            .fold(Form::new().part(FILE_FIELD, part), |form, (name, value)| form.text(*name, *value));
        Ok(form)
    }

    /// POST to the operation's endpoint; enhance carries its knobs in the query string.
    fn build_request(&self, request: &BackendRequest) -> ClientResult<reqwest::RequestBuilder> {
        let form = Self::form_for(request)?;
        let mut builder = self.http.post(self.endpoint(request.operation)).multipart(form);
        if request.operation == OperationKind::Enhance {
            builder = builder.query(&request.parameters.query_pairs());
        }
        Ok(builder)
    }

    async fn send(&self, request: BackendRequest) -> ClientResult<ResultPayload> {
        let operation = request.operation;
        let builder = self.build_request(&request)?;
        drop(request);

        debug!("Sending {} request to {}", operation, self.endpoint(operation));
        let res = builder.send().await.map_err(|e| ClientError::network(e.to_string()))?;

        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = res.bytes().await.map_err(|e| ClientError::network(e.to_string()))?;

        debug!(
            "{} response: status {}, {} bytes, content type {:?}",
            operation,
            status,
            body.len(),
            content_type
        );
        response::decode(operation, status, content_type.as_deref(), &body)
    }

    /// Calls `GET /` and returns the backend's greeting.
    pub async fn ping(&self) -> ClientResult<String> {
        let res = self.http.get(format!("{}/", self.api_base)).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::response(status.as_u16(), status.to_string()));
        }
        let body: HealthBody = res.json().await?;
        Ok(body.message)
    }
}

impl BackendClient for HttpBackend {
    fn execute(&self, request: BackendRequest) -> impl Future<Output = ClientResult<ResultPayload>> + Send {
        self.send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Knob, ParameterSet, SourceImage};

    fn backend() -> HttpBackend {
        HttpBackend::new("http://127.0.0.1:8000", Duration::from_secs(5)).unwrap()
    }

    fn request(operation: OperationKind) -> BackendRequest {
        BackendRequest {
            operation,
            image: SourceImage::new("face.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff]).unwrap(),
            parameters: ParameterSet::new(10.0, 20.5, 30.0),
        }
    }

    fn is_multipart(built: &reqwest::Request) -> bool {
        built
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data; boundary="))
    }

    #[test]
    fn enhance_sends_knobs_as_query_and_file_as_form() {
        let built = backend().build_request(&request(OperationKind::Enhance)).unwrap().build().unwrap();

        assert_eq!(built.method(), reqwest::Method::POST);
        assert_eq!(built.url().path(), "/api/enhance/");
        let query: Vec<(String, String)> = built.url().query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                (Knob::Enhancement.query_key().to_string(), "10".to_string()),
                ("sharp".to_string(), "20.5".to_string()),
                ("clarity".to_string(), "30".to_string()),
            ]
        );
        assert!(is_multipart(&built));
        assert!(HttpBackend::text_fields(OperationKind::Enhance).is_empty());
    }

    #[test]
    fn one_shot_operations_have_no_query() {
        for operation in [OperationKind::Smile, OperationKind::Video] {
            let built = backend().build_request(&request(operation)).unwrap().build().unwrap();
            assert_eq!(built.url().query(), None);
            assert_eq!(built.url().path(), operation.path());
            assert!(is_multipart(&built));
        }
    }

    #[test]
    fn only_video_tags_the_upload_source() {
        assert_eq!(HttpBackend::text_fields(OperationKind::Video), &[("source", "upload")]);
        assert!(HttpBackend::text_fields(OperationKind::Smile).is_empty());
        assert_eq!(FILE_FIELD, "file");
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base() {
        let backend = HttpBackend::new("http://127.0.0.1:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.endpoint(OperationKind::Enhance), "http://127.0.0.1:8000/api/enhance/");
        assert_eq!(backend.endpoint(OperationKind::Video), "http://127.0.0.1:8000/api/animate/video");
    }

    #[test]
    fn empty_base_is_rejected() {
        assert!(matches!(
            HttpBackend::new("/", Duration::from_secs(5)),
            Err(ImagifyError::Config(_))
        ));
    }
}
