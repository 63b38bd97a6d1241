mod agent_service_fake;
mod auth_flow_fake;
mod graph_client_fake;

pub use agent_service_fake::*;
pub use auth_flow_fake::*;
pub use graph_client_fake::*;
