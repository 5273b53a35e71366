pub mod handlers;
pub mod requests;

use anyhow::{Context, Result};
use serde::Serialize;

pub use handlers::{handle_calculate, handle_history, handle_recommend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    Internal,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::Internal => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

/// The JSON envelope every handler answers with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply<T> {
    pub status: Status,
    pub body: ApiResponse<T>,
}

impl<T: Serialize> ApiReply<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: Status::Ok,
            body: ApiResponse {
                success: true,
                data: Some(data),
                error: None,
                details: None,
                message: None,
            },
        }
    }

    pub fn fail(status: Status, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiResponse {
                success: false,
                data: None,
                error: Some(error.into()),
                details: None,
                message: None,
            },
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.body.details = Some(details);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.body).context("Failed to serialize API response")
    }
}
