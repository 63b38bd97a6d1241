mod graph_client_http;
mod oauth_flow_http;

pub use graph_client_http::*;
pub use oauth_flow_http::*;
