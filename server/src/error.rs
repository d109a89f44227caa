use std::process::{ExitCode, Termination};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use error_stack::Report;
use kernel::{FieldError, KernelError};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

#[derive(Debug)]
pub struct ErrorStatus {
    report: Report<KernelError>,
    input: Option<Value>,
}

impl ErrorStatus {
    pub fn with_input(self, input: Option<Value>) -> Self {
        Self { input, ..self }
    }

    pub fn input(&self) -> Option<&Value> {
        self.input.as_ref()
    }

    pub fn status_code(&self) -> StatusCode {
        match self.report.current_context() {
            KernelError::NotFound => StatusCode::NOT_FOUND,
            KernelError::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            KernelError::Timeout => StatusCode::REQUEST_TIMEOUT,
            KernelError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Report<KernelError>> for ErrorStatus {
    fn from(report: Report<KernelError>) -> Self {
        ErrorStatus {
            report,
            input: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<Value>,
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.report.current_context() {
            KernelError::NotFound | KernelError::Validation => {
                tracing::debug!("Request rejected: {:?}", self.report);
            }
            KernelError::Timeout | KernelError::Internal => {
                tracing::error!("Request failed: {:?}", self.report);
            }
        }

        let field = self.report.downcast_ref::<FieldError>();
        let body = ErrorResponse {
            field: field.map(FieldError::field),
            message: field.map_or_else(
                || self.report.current_context().to_string(),
                |field| field.message().to_string(),
            ),
            input: self.input,
        };
        (status, axum::Json(body)).into_response()
    }
}
