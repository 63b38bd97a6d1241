use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra::*;
use crate::infra_http::*;
use crate::logger::*;
use crate::settings::Settings;
use crate::tools::GraphToolset;
use std::sync::Arc;

/// Every collaborator the HTTP handlers need, wired once at startup. The
/// credential store is constructed here and handed to the auth flow and
/// the toolset by reference; nothing holds module-level state.
pub struct Server {
    pub auth_flow: Arc<dyn AuthFlow>,
    pub agent_service: Arc<dyn AgentService>,
    pub profile_registry: Arc<dyn ProfileRegistry>,
    pub credential_store: Arc<dyn CredentialStore>,
}

impl Server {
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let credential_store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new(
            settings.credentials.enforce_expiry,
        ));

        let graph_client: Arc<dyn GraphClient> = match settings.graph.backend.as_str() {
            "fake" => Arc::new(FakeGraphClient::new()),
            "real" => Arc::new(HttpGraphClient::try_new()?),
            other => return Err(anyhow::anyhow!("Unknown graph backend: {}", other)),
        };

        let tools = Arc::new(GraphToolset::new(
            credential_store.clone(),
            graph_client,
            settings.graph.base_url.clone(),
            settings.graph.default_site_url.clone(),
        ));

        let auth_flow: Arc<dyn AuthFlow> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeAuthFlow::new(credential_store.clone())),
            "real" => Arc::new(HttpAuthFlow::try_new(
                OAuthConfig {
                    authority: settings.auth.authority.clone(),
                    client_id: settings.auth.client_id.clone(),
                    client_secret: settings.auth.client_secret.clone(),
                    redirect_uri: settings.auth.redirect_uri.clone(),
                    scopes: settings.auth.scopes.clone(),
                },
                credential_store.clone(),
            )?),
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        let agent_service: Arc<dyn AgentService> = match settings.agent.backend.as_str() {
            "fake" => Arc::new(FakeAgentService::new(tools.clone())),
            other => return Err(anyhow::anyhow!("Unknown agent backend: {}", other)),
        };

        let profile_registry: Arc<dyn ProfileRegistry> =
            Arc::new(FileProfileRegistry::open(&settings.profiles.path)?);

        info!("server started");

        Ok(Self {
            auth_flow,
            agent_service,
            profile_registry,
            credential_store,
        })
    }
}
