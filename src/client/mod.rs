//! Thin HTTP client over the posts REST API.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::domain::ImageUpload;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error: status {status} body {body}")]
    Server { status: StatusCode, body: String },
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

/// Shared handle on the backend. Cloning is cheap; the connection pool is shared.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// `base_url` names the backend origin; any path on it is replaced by `/`.
    /// Configuration rejects base URLs with a path before they get here.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)?.join("/")?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("postboard/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(ApiError::Url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.client.get(self.url(path)?);
        Self::handle(Self::send(req, &Method::GET, path).await?).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let req = self.client.post(self.url(path)?).multipart(form);
        Self::handle(Self::send(req, &Method::POST, path).await?).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default,
    {
        let req = self.client.put(self.url(path)?).json(body);
        Self::handle_ack(Self::send(req, &Method::PUT, path).await?).await
    }

    pub async fn put_multipart<T>(&self, path: &str, form: Form) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let req = self.client.put(self.url(path)?).multipart(form);
        Self::handle_ack(Self::send(req, &Method::PUT, path).await?).await
    }

    pub async fn request_no_body(&self, method: Method, path: &str) -> Result<(), ApiError> {
        let req = self.client.request(method.clone(), self.url(path)?);
        let resp = Self::send(req, &method, path).await?;
        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(err) => {
                    debug!(%method, path, error = %err, "failed to read error body");
                    String::new()
                }
            };
            return Err(ApiError::Server { status, body });
        }
        Ok(())
    }

    async fn send(
        req: RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let resp = req.send().await?;
        debug!(%method, path, status = resp.status().as_u16(), "api response");
        Ok(resp)
    }

    async fn handle<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(ApiError::Server { status, body });
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Like [`Self::handle`], but a success body that is empty or not the
    /// expected JSON decodes to `T::default()`: the status alone confirms the
    /// write.
    async fn handle_ack<T: DeserializeOwned + Default>(
        resp: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(ApiError::Server { status, body });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        match serde_json::from_slice(&bytes) {
            Ok(ack) => Ok(ack),
            Err(err) => {
                debug!(
                    status = status.as_u16(),
                    error = %err,
                    "acknowledgement body is not JSON; treating as empty"
                );
                Ok(T::default())
            }
        }
    }
}

/// Build the `image` part of a post form. The backend stores the file under
/// the post title, so the title doubles as the part's file name.
pub fn image_part(upload: &ImageUpload, file_name: &str) -> Result<Part, ApiError> {
    let part = Part::bytes(upload.data.to_vec()).file_name(file_name.to_string());
    match upload.content_type.as_deref() {
        Some(mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}
