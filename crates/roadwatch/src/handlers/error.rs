use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roadwatch_core::report::{ReportError, TransitionError};
use roadwatch_core::storage::RepositoryError;
use roadwatch_core::user::UserError;

pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_status(err)
        } else if let Some(err) = self.0.downcast_ref::<ReportError>() {
            report_error_status(err)
        } else if let Some(err) = self.0.downcast_ref::<UserError>() {
            user_error_status(err)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status_code.is_server_error() {
            tracing::error!(status = %status_code, error = %self.0, "Request failed");
        } else {
            tracing::warn!(status = %status_code, error = %self.0, "API error");
        }

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Storage failures. An unreachable backend is a 503 so clients may retry.
fn repository_error_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RepositoryError::AlreadyExists { .. } => StatusCode::CONFLICT,
        RepositoryError::InvalidData(_) => StatusCode::BAD_REQUEST,
        RepositoryError::ConnectionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn report_error_status(error: &ReportError) -> StatusCode {
    match error {
        ReportError::InvalidPosition { .. } | ReportError::StatusChangeNotAllowed => {
            StatusCode::BAD_REQUEST
        }
        ReportError::NotFound(_) => StatusCode::NOT_FOUND,
        ReportError::Transition { source, .. } => match source {
            TransitionError::AlreadyTerminal(_) => StatusCode::CONFLICT,
            TransitionError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
        },
        ReportError::CreationFailed | ReportError::UpdateFailed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ReportError::Persistence(err) => repository_error_status(err),
    }
}

fn user_error_status(error: &UserError) -> StatusCode {
    match error {
        UserError::InvalidEmail(_)
        | UserError::EmptyNickname
        | UserError::NicknameTooLong
        | UserError::RoleNotFound(_) => StatusCode::BAD_REQUEST,
        UserError::EmailTaken(_) | UserError::NicknameTaken(_) => StatusCode::CONFLICT,
        UserError::CreationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        UserError::Persistence(err) => repository_error_status(err),
    }
}
