use serde::Deserialize;
use thiserror::Error;

pub const UNKNOWN_ERROR_MESSAGE: &str = "Erro desconhecido";

/// Status used when no HTTP response was received at all.
pub const NO_STATUS: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The e-mail given for a new customer is already registered.
    EmailInUse,
    NotFound,
    BadRequest,
    Server,
    /// The request never got a response.
    Transport,
    /// A successful response had a body we couldn't read.
    Decode,
    Other,
}

/// The one error every API call fails with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("API request failed with status {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    /// Raw response body, or a description of the transport failure.
    pub message: String,
    pub kind: ApiErrorKind,
}

// Error body sent by the server, e.g.
// {"status":400,"error":"Bad Request","message":"Email já cadastrado","path":"/customers",...}
#[derive(Deserialize)]
struct ServerErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// `body` is `None` if reading the response body failed.
    pub fn from_response(status: u16, body: Option<String>) -> Self {
        let kind = match status {
            400 | 422 => ApiErrorKind::BadRequest,
            404 => ApiErrorKind::NotFound,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::Other,
        };
        Self {
            status,
            message: body.unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            kind,
        }
    }

    pub fn transport(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()).unwrap_or(NO_STATUS),
            message: err.to_string(),
            kind: ApiErrorKind::Transport,
        }
    }

    pub fn decode(status: u16, err: reqwest::Error) -> Self {
        Self {
            status,
            message: err.to_string(),
            kind: ApiErrorKind::Decode,
        }
    }

    /// The `message` field of the server's JSON error body, if there is one.
    pub fn server_message(&self) -> Option<String> {
        serde_json::from_str::<ServerErrorBody>(&self.message)
            .ok()
            .and_then(|body| body.message)
    }

    /// Customer creation reports a duplicate e-mail either as a conflict or as
    /// a bad request saying the e-mail is already registered. Field validation
    /// failures (`email: must be a well-formed email address`) are not conflicts.
    pub(super) fn classify_customer_conflict(mut self) -> Self {
        let email_in_use = match self.status {
            409 => true,
            400 => {
                let message = self
                    .server_message()
                    .unwrap_or_else(|| self.message.clone())
                    .to_lowercase();
                !is_field_violation(&message)
                    && message.contains("email")
                    && DUPLICATE_MARKERS
                        .iter()
                        .any(|marker| message.contains(marker))
            }
            _ => false,
        };
        if email_in_use {
            self.kind = ApiErrorKind::EmailInUse;
        }
        self
    }
}

const DUPLICATE_MARKERS: [&str; 4] = ["já cadastrado", "já está em uso", "already", "duplicate"];

// Validation errors come as `<field>: <violation>`, one per line
fn is_field_violation(message: &str) -> bool {
    message.split_once(':').is_some_and(|(field, _)| {
        !field.is_empty()
            && field
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
    })
}
