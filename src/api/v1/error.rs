use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::domain_port::RegistryError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(err.clone(), err.to_string()));
        Ok(warp::reply::with_status(json, StatusCode::OK))
    } else {
        let json = warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                code: ApiErrorCode::InternalError,
                message: format!("Unhandled error: {:?}", err),
            }),
        });
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("State mismatch")]
    StateMismatch,
    #[error("Login failed")]
    LoginFailed,
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Profile not found")]
    ProfileNotFound,
    #[error("Agent run failed")]
    AgentFailed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthFlowError> for ApiErrorCode {
    fn from(error: AuthFlowError) -> Self {
        match error {
            AuthFlowError::StateMismatch => ApiErrorCode::StateMismatch,
            AuthFlowError::NoRefreshToken => ApiErrorCode::NotAuthenticated,
            AuthFlowError::Exchange(e) => {
                warn!("Token exchange failed: {}", e);
                ApiErrorCode::LoginFailed
            }
            AuthFlowError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<AgentError> for ApiErrorCode {
    fn from(error: AgentError) -> Self {
        match error {
            AgentError::Runtime(e) => {
                warn!("Agent runtime error: {}", e);
                ApiErrorCode::AgentFailed
            }
            AgentError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<RegistryError> for ApiErrorCode {
    fn from(error: RegistryError) -> Self {
        ApiErrorCode::internal(error)
    }
}
