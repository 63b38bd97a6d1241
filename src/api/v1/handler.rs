use super::error::*;
use crate::application_port::{AgentReply, AgentService, AuthFlow};
use crate::domain_model::{ConnectionProfile, SessionId};
use crate::domain_port::ProfileRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginStartResponse {
    pub authorize_url: String,
    pub state: String,
}

pub async fn begin_login(
    auth_flow: Arc<dyn AuthFlow>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let start = auth_flow
        .begin_login()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = LoginStartResponse {
        authorize_url: start.authorize_url,
        state: start.state,
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

pub async fn complete_login(
    query: CallbackQuery,
    auth_flow: Arc<dyn AuthFlow>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session_id = auth_flow
        .complete_login(&query.code, &query.state)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = SessionResponse {
        session_id: session_id.0,
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse;

pub async fn logout(
    body: LogoutRequest,
    auth_flow: Arc<dyn AuthFlow>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_flow
        .logout(&SessionId(body.session_id))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse)))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse;

pub async fn refresh_session(
    body: RefreshRequest,
    auth_flow: Arc<dyn AuthFlow>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_flow
        .refresh(&SessionId(body.session_id))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(RefreshResponse)))
}

#[derive(Debug, Deserialize)]
pub struct RunAgentRequest {
    pub session_id: String,
    pub prompt: Option<String>,
}

pub async fn run_agent(
    body: RunAgentRequest,
    agent_service: Arc<dyn AgentService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let prompt = body
        .prompt
        .unwrap_or_else(|| "Give me my profile information.".to_string());

    let reply: AgentReply = agent_service
        .run(&SessionId(body.session_id), &prompt)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(reply)))
}

#[derive(Debug, Serialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<String>,
}

pub async fn list_profiles(
    registry: Arc<dyn ProfileRegistry>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let profiles = registry
        .list()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(ProfileListResponse {
        profiles,
    })))
}

pub async fn get_profile(
    name: String,
    registry: Arc<dyn ProfileRegistry>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let profile = registry
        .get(&name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?
        .ok_or_else(|| reject::custom(ApiErrorCode::ProfileNotFound))?;

    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

pub async fn upsert_profile(
    name: String,
    body: ConnectionProfile,
    registry: Arc<dyn ProfileRegistry>,
) -> Result<impl warp::Reply, warp::Rejection> {
    // The path segment names the profile; the body field is ignored.
    let profile = ConnectionProfile { name, ..body };
    registry
        .upsert(profile.clone())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

#[derive(Debug, Serialize)]
pub struct DeleteProfileResponse {
    pub removed: bool,
}

pub async fn delete_profile(
    name: String,
    registry: Arc<dyn ProfileRegistry>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let removed = registry
        .remove(&name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(DeleteProfileResponse {
        removed,
    })))
}

pub async fn health() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&serde_json::json!({"status": "ok"})))
}
