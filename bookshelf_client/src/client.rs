use anyhow::Context;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;

use crate::api::{Book, CreateBookRequest, ErrorResponse, UpdateBookRequest};

/// Message used when a failed response does not say what went wrong
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";
pub const DELETE_ERROR_MESSAGE: &str = "Failed to delete book";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Server answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// No response was received
    #[error("{0}")]
    Transport(String),

    /// Server answered with success but the body could not be parsed
    #[error("{message}")]
    InvalidResponse { status: u16, message: String },
}

impl ApiError {
    /// Http status of the failure, 0 if no response was received
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Status { status, .. } | ApiError::InvalidResponse { status, .. } => *status,
            ApiError::Transport(_) => 0,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Status { message, .. } | ApiError::InvalidResponse { message, .. } => message,
            ApiError::Transport(message) => message,
        }
    }
}

impl From<reqwest_middleware::Error> for ApiError {
    fn from(err: reqwest_middleware::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait BookApi: Send + Sync {
    /// Lists all books, in the order returned by the server
    async fn list_books(&self) -> Result<Vec<Book>, ApiError>;
    /// Retrieves a single book
    async fn get_book(&self, book_id: &str) -> Result<Book, ApiError>;
    /// Creates a book, returns it with the id assigned by the server
    async fn create_book(&self, request: &CreateBookRequest) -> Result<Book, ApiError>;
    /// Overwrites the book identified by request id
    async fn update_book(&self, request: &UpdateBookRequest) -> Result<Book, ApiError>;
    /// Deletes a book
    async fn delete_book(&self, book_id: &str) -> Result<(), ApiError>;
}

pub struct BookServiceClient {
    url: String,
    client: ClientWithMiddleware,
}

impl BookServiceClient {
    /// `url` is the api base, e.g. http://localhost:8080/api
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl BookApi for BookServiceClient {
    /// Calls GET /books endpoint
    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        let response = self
            .client
            .get(format!("{}/books", self.url))
            .send()
            .await?;
        parse_response(response, DEFAULT_ERROR_MESSAGE).await
    }

    /// Calls GET /books/{book_id} endpoint
    async fn get_book(&self, book_id: &str) -> Result<Book, ApiError> {
        let response = self
            .client
            .get(format!("{}/books/{}", self.url, book_id))
            .send()
            .await?;
        parse_response(response, DEFAULT_ERROR_MESSAGE).await
    }

    /// Calls POST /books endpoint
    async fn create_book(&self, request: &CreateBookRequest) -> Result<Book, ApiError> {
        let response = self
            .client
            .post(format!("{}/books", self.url))
            .json(request)
            .send()
            .await?;
        parse_response(response, DEFAULT_ERROR_MESSAGE).await
    }

    /// Calls PUT /books/{book_id} endpoint, the body carries the id as well
    async fn update_book(&self, request: &UpdateBookRequest) -> Result<Book, ApiError> {
        let response = self
            .client
            .put(format!("{}/books/{}", self.url, request.id))
            .json(request)
            .send()
            .await?;
        parse_response(response, DEFAULT_ERROR_MESSAGE).await
    }

    /// Calls DELETE /books/{book_id} endpoint, the success body is ignored
    async fn delete_book(&self, book_id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(format!("{}/books/{}", self.url, book_id))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response, DELETE_ERROR_MESSAGE).await)
        }
    }
}

async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback_message: &str,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(response, fallback_message).await);
    }
    response
        .json()
        .await
        .map_err(|err| ApiError::InvalidResponse {
            status: status.as_u16(),
            message: format!("Failed to parse response: {}", err),
        })
}

/// Best effort read of `{"message": ...}` from a failed response
async fn error_from_response(response: reqwest::Response, fallback_message: &str) -> ApiError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorResponse>()
        .await
        .unwrap_or_default()
        .message
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback_message.to_string());
    tracing::debug!("Books api responded with {}: {}", status, message);
    ApiError::Status { status, message }
}
