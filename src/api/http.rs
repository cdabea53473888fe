//! HTTP transport for the backend's `/api/v1` surface.

use std::sync::Arc;

use reqwest::{header, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::auth::SessionManager;
use crate::errors::ClientError;
use crate::models::{Page, Payload};

const API_PREFIX: &str = "/api/v1";

/// Validated request layer over `reqwest`.
///
/// Payloads and parameters are checked against their schema before anything is sent.
/// Responses are unwrapped from the optional envelope, decoded and checked again. A 401
/// on an authenticated path triggers one token refresh and one retry.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, session: Arc<SessionManager>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        tracing::debug!("{} {}", method, path);
        Ok(request.send().await?)
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Option<Value>, ClientError> {
        let token = self.session.access_token().await;
        let response = self
            .dispatch(&method, path, &query, body.as_ref(), token.as_deref())
            .await?;

        let is_auth_path = path.starts_with("/auth/");
        if response.status() == reqwest::StatusCode::UNAUTHORIZED && !is_auth_path {
            if let Some(rejected) = token {
                let fresh = self.session.refresh_after_rejection(&rejected).await?;
                let retried = self
                    .dispatch(&method, path, &query, body.as_ref(), Some(&fresh))
                    .await?;
                return read_body(retried).await;
            }
        }

        read_body(response).await
    }

    /// GET a single resource.
    pub async fn get<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Validate,
    {
        let body = self.request(Method::GET, path, Vec::new(), None).await?;
        decode_item(required(body, path)?)
    }

    /// GET a single value with query parameters.
    pub async fn get_with<Q, T>(&self, path: &str, params: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + Validate,
        T: DeserializeOwned + Validate,
    {
        let query = query_pairs(params)?;
        let body = self.request(Method::GET, path, query, None).await?;
        decode_item(required(body, path)?)
    }

    /// GET a scalar (e.g. a quantity) with query parameters.
    pub async fn get_scalar<Q, T>(&self, path: &str, params: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + Validate,
        T: DeserializeOwned,
    {
        let query = query_pairs(params)?;
        let body = self.request(Method::GET, path, query, None).await?;
        decode(required(body, path)?)
    }

    /// GET an array of resources.
    pub async fn get_list<T>(&self, path: &str) -> Result<Vec<T>, ClientError>
    where
        T: DeserializeOwned + Validate,
    {
        let body = self.request(Method::GET, path, Vec::new(), None).await?;
        decode_list(required(body, path)?)
    }

    /// GET an array of resources with query parameters.
    pub async fn get_list_with<Q, T>(&self, path: &str, params: &Q) -> Result<Vec<T>, ClientError>
    where
        Q: Serialize + Validate,
        T: DeserializeOwned + Validate,
    {
        let query = query_pairs(params)?;
        let body = self.request(Method::GET, path, query, None).await?;
        decode_list(required(body, path)?)
    }

    /// GET one page of resources.
    pub async fn get_page<Q, T>(&self, path: &str, params: &Q) -> Result<Page<T>, ClientError>
    where
        Q: Serialize + Validate,
        T: DeserializeOwned + Validate,
    {
        let query = query_pairs(params)?;
        let body = self.request(Method::GET, path, query, None).await?;
        decode_page(required(body, path)?)
    }

    pub async fn post<B, T>(&self, path: &str, payload: &B) -> Result<T, ClientError>
    where
        B: Serialize + Validate,
        T: DeserializeOwned + Validate,
    {
        let body = self.send_body(Method::POST, path, payload).await?;
        decode_item(required(body, path)?)
    }

    /// POST where the response body carries nothing of interest.
    pub async fn post_unit<B>(&self, path: &str, payload: &B) -> Result<(), ClientError>
    where
        B: Serialize + Validate,
    {
        self.send_body(Method::POST, path, payload).await?;
        Ok(())
    }

    pub async fn put<B, T>(&self, path: &str, payload: &B) -> Result<T, ClientError>
    where
        B: Serialize + Validate,
        T: DeserializeOwned + Validate,
    {
        let body = self.send_body(Method::PUT, path, payload).await?;
        decode_item(required(body, path)?)
    }

    pub async fn patch<B, T>(&self, path: &str, payload: &B) -> Result<T, ClientError>
    where
        B: Serialize + Validate,
        T: DeserializeOwned + Validate,
    {
        let body = self.send_body(Method::PATCH, path, payload).await?;
        decode_item(required(body, path)?)
    }

    /// PATCH without a body.
    pub async fn patch_empty<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Validate,
    {
        let body = self.request(Method::PATCH, path, Vec::new(), None).await?;
        decode_item(required(body, path)?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request(Method::DELETE, path, Vec::new(), None).await?;
        Ok(())
    }

    async fn send_body<B>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
    ) -> Result<Option<Value>, ClientError>
    where
        B: Serialize + Validate,
    {
        payload.validate()?;
        let body = serde_json::to_value(payload)?;
        self.request(method, path, Vec::new(), Some(body)).await
    }
}

/// Validate `params` and flatten them into query pairs. Absent fields are omitted.
fn query_pairs<Q: Serialize + Validate>(params: &Q) -> Result<Vec<(String, String)>, ClientError> {
    params.validate()?;
    let value = serde_json::to_value(params)?;
    let Value::Object(fields) = value else {
        return Err(ClientError::Validation(
            "Query parameters must be an object".to_string(),
        ));
    };

    Ok(fields
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((name, s)),
            other => Some((name, other.to_string())),
        })
        .collect())
}

/// Read a response body, mapping non-success statuses to errors. Empty bodies are `None`.
async fn read_body(response: Response) -> Result<Option<Value>, ClientError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::from_status(status.as_u16(), &text));
    }
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text)?))
}

/// Decode and validate a single payload from a raw response.
pub(crate) async fn read_payload<T>(response: Response) -> Result<T, ClientError>
where
    T: DeserializeOwned + Validate,
{
    let url = response.url().path().to_string();
    let body = read_body(response).await?;
    decode_item(required(body, &url)?)
}

fn required(body: Option<Value>, path: &str) -> Result<Value, ClientError> {
    body.ok_or_else(|| ClientError::Validation(format!("Empty response body from {}", path)))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    Payload::<T>::decode(value).map(Payload::into_inner)
}

fn decode_item<T>(value: Value) -> Result<T, ClientError>
where
    T: DeserializeOwned + Validate,
{
    let item: T = decode(value)?;
    item.validate()?;
    Ok(item)
}

fn decode_list<T>(value: Value) -> Result<Vec<T>, ClientError>
where
    T: DeserializeOwned + Validate,
{
    let items: Vec<T> = decode(value)?;
    for item in &items {
        item.validate()?;
    }
    Ok(items)
}

fn decode_page<T>(value: Value) -> Result<Page<T>, ClientError>
where
    T: DeserializeOwned + Validate,
{
    let page: Page<T> = decode(value)?;
    page.check_invariants()?;
    for item in &page.items {
        item.validate()?;
    }
    Ok(page)
}
