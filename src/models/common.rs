//! Shared wire shapes: the response envelope, pagination and list parameters.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::errors::ClientError;

/// Response envelope used by the backend: `{ status, code, message, result }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    pub result: T,
}

/// A decoded response body, either wrapped in an [`Envelope`] or bare.
#[derive(Debug, Clone)]
pub enum Payload<T> {
    Enveloped(Envelope<T>),
    Bare(T),
}

impl<T: DeserializeOwned> Payload<T> {
    /// Decode a response body. The envelope form is tried first; the bare form is the
    /// fallback. Fails only if neither shape matches.
    pub fn decode(value: Value) -> Result<Self, ClientError> {
        if value.get("result").is_some() {
            match Envelope::<T>::deserialize(&value) {
                Ok(envelope) => return Ok(Payload::Enveloped(envelope)),
                Err(e) => tracing::debug!("Envelope decode failed, trying bare: {}", e),
            }
        }

        T::deserialize(&value).map(Payload::Bare).map_err(|e| {
            ClientError::Validation(format!("Response did not match the expected shape: {}", e))
        })
    }

    pub fn into_inner(self) -> T {
        match self {
            Payload::Enveloped(envelope) => envelope.result,
            Payload::Bare(value) => value,
        }
    }
}

/// One page of a paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(alias = "content")]
    pub items: Vec<T>,
    #[serde(alias = "number")]
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// `ceil(total / size)`, zero when `size` is zero.
    pub fn expected_total_pages(total_elements: u64, size: u32) -> u32 {
        if size == 0 {
            return 0;
        }
        total_elements.div_ceil(size as u64) as u32
    }

    /// Check that the page is internally consistent.
    pub fn check_invariants(&self) -> Result<(), ClientError> {
        if self.size > 0 && self.items.len() > self.size as usize {
            return Err(ClientError::Validation(format!(
                "Page holds {} items but its size is {}",
                self.items.len(),
                self.size
            )));
        }
        if self.size > 0 {
            let expected = Self::expected_total_pages(self.total_elements, self.size);
            if self.total_pages != expected {
                return Err(ClientError::Validation(format!(
                    "Page reports {} total pages, expected {} for {} elements of size {}",
                    self.total_pages, expected, self.total_elements, self.size
                )));
            }
        }
        Ok(())
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

/// Pagination parameters shared by every paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PageParams {
    pub page: u32,
    #[validate(range(min = 1, message = "page size must be at least 1"))]
    pub size: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

impl PageParams {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }
}

/// Parameters for lists that only paginate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ListParams {
    #[serde(flatten)]
    #[validate(nested)]
    pub paging: PageParams,
}
