//! HTTP client for the contacts backend.
//!
//! Requests are built separately from being sent so they can be inspected.
//! There is no retry, caching or auth layer; failures are returned as
//! [`ApiError`] for the caller to report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::expand_tilde;
use crate::model::{Contact, ContactPage};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}{}", body_suffix(.body))]
    Status { status: StatusCode, body: String },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read photo {}: {source}", .path.display())]
    Photo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn body_suffix(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// One call against the backend, as emitted by the application state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List {
        page: u32,
        size: u32,
    },
    Search {
        term: String,
        page: u32,
        size: u32,
    },
    Get {
        id: i64,
    },
    Create {
        contact: Contact,
        photo: Option<PathBuf>,
    },
    Update {
        id: i64,
        contact: Contact,
        photo: Option<PathBuf>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Page(ContactPage),
    Contact(Contact),
    Deleted,
}

/// Binary photo part of a create/update payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPart {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl PhotoPart {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = guess_mime(Path::new(&file_name));
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self, ApiError> {
        let expanded = expand_tilde(path);
        let bytes = tokio::fs::read(&expanded)
            .await
            .map_err(|source| ApiError::Photo {
                path: expanded.clone(),
                source,
            })?;
        let file_name = expanded
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self::from_bytes(file_name, bytes))
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub struct ContactApi {
    client: Client,
    base_url: String,
}

impl ContactApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub fn build_list(&self, page: u32, size: u32) -> Result<Request, ApiError> {
        Ok(self
            .client
            .get(self.endpoint("contacts"))
            .query(&[("page", page), ("size", size)])
            .build()?)
    }

    pub fn build_search(&self, term: &str, page: u32, size: u32) -> Result<Request, ApiError> {
        Ok(self
            .client
            .get(self.endpoint("contacts/search"))
            .query(&[("searchTerm", term)])
            .query(&[("page", page), ("size", size)])
            .build()?)
    }

    pub fn build_get(&self, id: i64) -> Result<Request, ApiError> {
        Ok(self
            .client
            .get(self.endpoint(&format!("contacts/{}", id)))
            .build()?)
    }

    pub fn build_create(
        &self,
        contact: &Contact,
        photo: Option<PhotoPart>,
    ) -> Result<Request, ApiError> {
        let form = contact_form(contact, photo)?;
        Ok(self
            .client
            .post(self.endpoint("contacts"))
            .multipart(form)
            .build()?)
    }

    pub fn build_update(
        &self,
        id: i64,
        contact: &Contact,
        photo: Option<PhotoPart>,
    ) -> Result<Request, ApiError> {
        let form = contact_form(contact, photo)?;
        Ok(self
            .client
            .put(self.endpoint(&format!("contacts/{}", id)))
            .multipart(form)
            .build()?)
    }

    pub fn build_delete(&self, id: i64) -> Result<Request, ApiError> {
        Ok(self
            .client
            .delete(self.endpoint(&format!("contacts/{}", id)))
            .build()?)
    }

    pub async fn list(&self, page: u32, size: u32) -> Result<ContactPage, ApiError> {
        let response = self.send(self.build_list(page, size)?).await?;
        decode(response).await
    }

    pub async fn search(&self, term: &str, page: u32, size: u32) -> Result<ContactPage, ApiError> {
        let response = self.send(self.build_search(term, page, size)?).await?;
        decode(response).await
    }

    pub async fn get(&self, id: i64) -> Result<Contact, ApiError> {
        let response = self.send(self.build_get(id)?).await?;
        decode(response).await
    }

    pub async fn create(
        &self,
        contact: &Contact,
        photo: Option<PhotoPart>,
    ) -> Result<Contact, ApiError> {
        let response = self.send(self.build_create(contact, photo)?).await?;
        decode(response).await
    }

    pub async fn update(
        &self,
        id: i64,
        contact: &Contact,
        photo: Option<PhotoPart>,
    ) -> Result<Contact, ApiError> {
        let response = self.send(self.build_update(id, contact, photo)?).await?;
        decode(response).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.build_delete(id)?).await?;
        Ok(())
    }

    /// Run one emitted call to completion.
    pub async fn execute(&self, call: ApiCall) -> Result<Reply, ApiError> {
        match call {
            ApiCall::List { page, size } => self.list(page, size).await.map(Reply::Page),
            ApiCall::Search { term, page, size } => {
                self.search(&term, page, size).await.map(Reply::Page)
            }
            ApiCall::Get { id } => self.get(id).await.map(Reply::Contact),
            ApiCall::Create { contact, photo } => {
                let photo = read_photo(photo.as_deref()).await?;
                self.create(&contact, photo).await.map(Reply::Contact)
            }
            ApiCall::Update { id, contact, photo } => {
                let photo = read_photo(photo.as_deref()).await?;
                self.update(id, &contact, photo).await.map(Reply::Contact)
            }
            ApiCall::Delete { id } => self.delete(id).await.map(|_| Reply::Deleted),
        }
    }

    async fn send(&self, request: Request) -> Result<Response, ApiError> {
        debug!(method = %request.method(), url = %request.url(), "sending request");
        let response = self.client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }
}

async fn read_photo(path: Option<&Path>) -> Result<Option<PhotoPart>, ApiError> {
    match path {
        Some(path) => PhotoPart::read(path).await.map(Some),
        None => Ok(None),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Multipart body: a JSON `contact` part plus an optional `photo` part.
fn contact_form(contact: &Contact, photo: Option<PhotoPart>) -> Result<Form, ApiError> {
    let json = serde_json::to_string(contact)?;
    let mut form = Form::new().part("contact", Part::text(json).mime_str("application/json")?);
    if let Some(photo) = photo {
        form = form.part(
            "photo",
            Part::bytes(photo.bytes)
                .file_name(photo.file_name)
                .mime_str(photo.mime)?,
        );
    }
    Ok(form)
}
