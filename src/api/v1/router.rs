use super::handler;
use crate::domain_model::ConnectionProfile;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::get()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(with(server.auth_flow.clone()))
        .and_then(handler::begin_login);

    // The identity provider redirects back here with code and state.
    let callback = warp::get()
        .and(warp::path("callback"))
        .and(warp::path::end())
        .and(warp::query::<handler::CallbackQuery>())
        .and(with(server.auth_flow.clone()))
        .and_then(handler::complete_login);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_flow.clone()))
        .and_then(handler::logout);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_flow.clone()))
        .and_then(handler::refresh_session);

    let run_agent = warp::post()
        .and(warp::path("agent"))
        .and(warp::path("run"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.agent_service.clone()))
        .and_then(handler::run_agent);

    let list_profiles = warp::get()
        .and(warp::path("profiles"))
        .and(warp::path::end())
        .and(with(server.profile_registry.clone()))
        .and_then(handler::list_profiles);

    let get_profile = warp::get()
        .and(warp::path("profiles"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with(server.profile_registry.clone()))
        .and_then(handler::get_profile);

    let upsert_profile = warp::put()
        .and(warp::path("profiles"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::body::json::<ConnectionProfile>())
        .and(with(server.profile_registry.clone()))
        .and_then(handler::upsert_profile);

    let delete_profile = warp::delete()
        .and(warp::path("profiles"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with(server.profile_registry.clone()))
        .and_then(handler::delete_profile);

    let health = warp::get()
        .and(warp::path("health"))
        .and(warp::path::end())
        .and_then(handler::health);

    login
        .or(callback)
        .or(logout)
        .or(refresh)
        .or(run_agent)
        .or(list_profiles)
        .or(get_profile)
        .or(upsert_profile)
        .or(delete_profile)
        .or(health)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
