mod agent_service;
mod auth_flow;
mod graph_client;

pub use agent_service::*;
pub use auth_flow::*;
pub use graph_client::*;
