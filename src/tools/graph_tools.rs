use crate::application_port::{GraphClient, GraphError};
use crate::domain_model::{AccessToken, SessionId};
use crate::domain_port::CredentialStore;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// One executor per downstream Graph API. Every executor looks up the
/// session's credential first and short-circuits with a structured error
/// payload when it is absent; the downstream call is never attempted with
/// an empty token. Outputs are JSON strings because that is what the agent
/// runtime consumes as tool output.
pub struct GraphToolset {
    store: Arc<dyn CredentialStore>,
    graph: Arc<dyn GraphClient>,
    base_url: String,
    default_site_url: Option<String>,
}

impl GraphToolset {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        graph: Arc<dyn GraphClient>,
        base_url: impl Into<String>,
        default_site_url: Option<String>,
    ) -> Self {
        GraphToolset {
            store,
            graph,
            base_url: base_url.into(),
            default_site_url,
        }
    }

    async fn token_or_error(&self, session_id: &SessionId) -> Result<AccessToken, String> {
        match self.store.get_access_token(session_id).await {
            Some(token) => Ok(token),
            None => Err(json!({
                "error": "No token for session",
                "session_id": session_id.0,
            })
            .to_string()),
        }
    }

    pub async fn get_current_user_info(&self, session_id: &SessionId) -> String {
        let token = match self.token_or_error(session_id).await {
            Ok(token) => token,
            Err(payload) => return payload,
        };
        let url = format!("{}/me", self.base_url);
        let resp = match self.graph.get(&url, &token).await {
            Ok(resp) => resp,
            Err(e) => return transport_error(&e),
        };
        if resp.status == 200 {
            let u = &resp.body;
            json!({
                "success": true,
                "user": {
                    "displayName": u.get("displayName"),
                    "userPrincipalName": u.get("userPrincipalName"),
                    "jobTitle": u.get("jobTitle"),
                    "department": u.get("department"),
                    "id": u.get("id"),
                }
            })
            .to_string()
        } else {
            json!({
                "error": format!("Graph error {}", resp.status),
                "message": resp.body,
            })
            .to_string()
        }
    }

    pub async fn list_users(&self, session_id: &SessionId) -> String {
        let token = match self.token_or_error(session_id).await {
            Ok(token) => token,
            Err(payload) => return payload,
        };
        let url = format!("{}/users?$top=5", self.base_url);
        let resp = match self.graph.get(&url, &token).await {
            Ok(resp) => resp,
            Err(e) => return transport_error(&e),
        };
        match resp.status {
            200 => {
                let users: Vec<Value> = resp
                    .body
                    .get("value")
                    .and_then(Value::as_array)
                    .map(|users| {
                        users
                            .iter()
                            .map(|u| {
                                json!({
                                    "displayName": u.get("displayName"),
                                    "userPrincipalName": u.get("userPrincipalName"),
                                    "id": u.get("id"),
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                json!({"success": true, "count": users.len(), "users": users}).to_string()
            }
            status @ (401 | 403) => json!({
                "error": "Insufficient permissions or token invalid",
                "status": status,
                "hint": if status == 403 {
                    "Ensure User.Read.All consent is granted"
                } else {
                    "Re-login"
                },
            })
            .to_string(),
            status => json!({
                "error": format!("Graph error {status}"),
                "message": resp.body,
            })
            .to_string(),
        }
    }

    pub async fn get_sharepoint_site(
        &self,
        session_id: &SessionId,
        site_url: Option<&str>,
    ) -> String {
        let token = match self.token_or_error(session_id).await {
            Ok(token) => token,
            Err(payload) => return payload,
        };
        let Some(site_url) = site_url.or(self.default_site_url.as_deref()) else {
            return json!({"error": "No SharePoint site URL given and no default configured"})
                .to_string();
        };
        let graph_url = match sharepoint_site_url(&self.base_url, site_url) {
            Ok(graph_url) => graph_url,
            Err(details) => {
                return json!({
                    "error": "Invalid SharePoint URL",
                    "details": details,
                })
                .to_string();
            }
        };

        let resp = match self.graph.get(&graph_url, &token).await {
            Ok(resp) => resp,
            Err(e) => return transport_error(&e),
        };
        match resp.status {
            200 => {
                let site = &resp.body;
                let collection = site.get("siteCollection");
                json!({
                    "success": true,
                    "site": {
                        "id": site.get("id"),
                        "name": site.get("name"),
                        "displayName": site.get("displayName"),
                        "webUrl": site.get("webUrl"),
                        "description": site.get("description"),
                        "createdDateTime": site.get("createdDateTime"),
                        "lastModifiedDateTime": site.get("lastModifiedDateTime"),
                        "siteCollection": {
                            "hostname": collection.and_then(|c| c.get("hostname")),
                            "dataLocationCode": collection.and_then(|c| c.get("dataLocationCode")),
                            "root": collection.and_then(|c| c.get("root")),
                        },
                    },
                    "graph_api_url": graph_url,
                })
                .to_string()
            }
            403 => json!({
                "error": "Insufficient permissions to access SharePoint site",
                "status": 403,
                "hint": "Ensure Sites.Read.All or Sites.ReadWrite.All permission is granted",
                "required_permissions": ["Sites.Read.All", "Sites.ReadWrite.All"],
                "attempted_url": graph_url,
            })
            .to_string(),
            404 => json!({
                "error": "SharePoint site not found",
                "status": 404,
                "attempted_url": graph_url,
                "hint": "Check if the site URL is correct and you have access",
            })
            .to_string(),
            status => json!({
                "error": format!("Graph API error {status}"),
                "message": resp.body,
                "attempted_url": graph_url,
            })
            .to_string(),
        }
    }

    pub async fn get_sharepoint_site_lists(
        &self,
        session_id: &SessionId,
        site_id: Option<&str>,
    ) -> String {
        let token = match self.token_or_error(session_id).await {
            Ok(token) => token,
            Err(payload) => return payload,
        };

        // No id given: resolve the default site first and reuse its id.
        let site_id = match site_id {
            Some(site_id) => site_id.to_string(),
            None => {
                let site_result = self.get_sharepoint_site(session_id, None).await;
                match resolve_site_id(&site_result) {
                    Ok(site_id) => site_id,
                    Err(()) => return site_result,
                }
            }
        };

        let url = format!("{}/sites/{site_id}/lists", self.base_url);
        let resp = match self.graph.get(&url, &token).await {
            Ok(resp) => resp,
            Err(e) => return transport_error(&e),
        };
        if resp.status == 200 {
            let lists: Vec<Value> = resp
                .body
                .get("value")
                .and_then(Value::as_array)
                .map(|lists| {
                    lists
                        .iter()
                        .map(|lst| {
                            let inner = lst.get("list");
                            json!({
                                "id": lst.get("id"),
                                "name": lst.get("name"),
                                "displayName": lst.get("displayName"),
                                "webUrl": lst.get("webUrl"),
                                "createdDateTime": lst.get("createdDateTime"),
                                "list": {
                                    "template": inner.and_then(|l| l.get("template")),
                                    "hidden": inner.and_then(|l| l.get("hidden")),
                                },
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            json!({
                "success": true,
                "site_id": site_id,
                "count": lists.len(),
                "lists": lists,
            })
            .to_string()
        } else {
            json!({
                "error": "Failed to get site lists",
                "status": resp.status,
                "message": resp.body,
            })
            .to_string()
        }
    }

    /// Dispatch a tool call by name. Unknown names produce an error payload
    /// rather than failing the whole agent run.
    pub async fn execute(&self, name: &str, args: &Value, session_id: &SessionId) -> String {
        match name {
            "get_current_user_info" => self.get_current_user_info(session_id).await,
            "list_users" => self.list_users(session_id).await,
            "get_sharepoint_site" => {
                let site_url = args.get("site_url").and_then(Value::as_str);
                self.get_sharepoint_site(session_id, site_url).await
            }
            "get_sharepoint_site_lists" => {
                let site_id = args.get("site_id").and_then(Value::as_str);
                self.get_sharepoint_site_lists(session_id, site_id).await
            }
            other => {
                warn!(tool = other, "unknown tool call");
                json!({"error": format!("Unknown function: {other}")}).to_string()
            }
        }
    }

    /// Tool definitions handed to the agent runtime. The session id is
    /// always injected server-side, never chosen by the model.
    pub fn schemas(&self) -> Value {
        json!([
            {
                "type": "function",
                "function": {
                    "name": "get_current_user_info",
                    "description": "Get current signed-in user's profile",
                    "parameters": {"type": "object", "properties": {}, "required": []},
                }
            },
            {
                "type": "function",
                "function": {
                    "name": "list_users",
                    "description": "List directory users (first 5)",
                    "parameters": {"type": "object", "properties": {}, "required": []},
                }
            },
            {
                "type": "function",
                "function": {
                    "name": "get_sharepoint_site",
                    "description": "Get SharePoint site information by URL; uses the configured default site when omitted",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "site_url": {"type": "string", "description": "SharePoint site URL (optional)"},
                        },
                        "required": [],
                    }
                }
            },
            {
                "type": "function",
                "function": {
                    "name": "get_sharepoint_site_lists",
                    "description": "Get all lists from a SharePoint site",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "site_id": {"type": "string", "description": "SharePoint site ID (optional, uses default site if not provided)"},
                        },
                        "required": [],
                    }
                }
            },
        ])
    }
}

fn transport_error(e: &GraphError) -> String {
    json!({"error": "Graph request failed", "message": e.to_string()}).to_string()
}

fn resolve_site_id(site_result: &str) -> Result<String, ()> {
    let parsed: Value = serde_json::from_str(site_result).map_err(|_| ())?;
    if parsed.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(());
    }
    parsed
        .pointer("/site/id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(())
}

/// Translate a SharePoint web URL into its Graph sites endpoint:
/// `/sites/{hostname}:/{site-path}`. Path segments from the page-level part
/// of the URL (SitePages, SiteAssets, Shared Documents) are stripped.
fn sharepoint_site_url(base_url: &str, site_url: &str) -> Result<String, String> {
    let parsed = Url::parse(site_url).map_err(|e| e.to_string())?;
    let hostname = parsed.host_str().ok_or_else(|| "URL has no host".to_string())?;

    let mut site_path_parts: Vec<&str> = Vec::new();
    for part in parsed.path().split('/') {
        if part.is_empty() {
            continue;
        }
        let lowered = part.to_ascii_lowercase();
        if matches!(
            lowered.as_str(),
            "sitepages" | "siteassets" | "shared documents" | "shared%20documents"
        ) {
            break;
        }
        site_path_parts.push(part);
    }

    if site_path_parts.is_empty() {
        Ok(format!("{base_url}/sites/{hostname}"))
    } else {
        Ok(format!(
            "{base_url}/sites/{hostname}:/{}",
            site_path_parts.join("/")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::FakeGraphClient;
    use crate::domain_model::{AccessToken, CredentialBundle};
    use crate::infra::MemoryCredentialStore;

    const BASE: &str = "https://graph.microsoft.com/v1.0";

    fn toolset() -> (GraphToolset, Arc<dyn CredentialStore>, Arc<FakeGraphClient>) {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new(true));
        let graph = Arc::new(FakeGraphClient::new());
        let tools = GraphToolset::new(
            store.clone(),
            graph.clone(),
            BASE,
            Some("https://contoso.sharepoint.test/teams/demo".to_string()),
        );
        (tools, store, graph)
    }

    async fn login(store: &Arc<dyn CredentialStore>, sid: &SessionId) {
        store
            .save(
                sid,
                CredentialBundle {
                    access_token: AccessToken("tok1".to_string()),
                    refresh_token: None,
                    expires_in_secs: 3600,
                },
            )
            .await;
    }

    #[tokio::test]
    async fn absent_credential_short_circuits() {
        let (tools, _, _) = toolset();
        let sid = SessionId::from("sess_abc");

        let payload = tools.get_current_user_info(&sid).await;

        assert_eq!(
            payload,
            r#"{"error":"No token for session","session_id":"sess_abc"}"#
        );
    }

    #[tokio::test]
    async fn user_info_projects_the_profile() {
        let (tools, store, _) = toolset();
        let sid = SessionId::from("sess_abc");
        login(&store, &sid).await;

        let payload: Value =
            serde_json::from_str(&tools.get_current_user_info(&sid).await).unwrap();

        assert_eq!(payload["success"], true);
        assert_eq!(payload["user"]["displayName"], "Demo User");
        assert_eq!(payload["user"]["id"], "user-0001");
    }

    #[tokio::test]
    async fn list_users_maps_permission_errors_to_a_hint() {
        let (tools, store, graph) = toolset();
        let sid = SessionId::from("sess_abc");
        login(&store, &sid).await;
        graph.set_response(
            format!("{BASE}/users?$top=5"),
            403,
            serde_json::json!({"error": {"code": "Authorization_RequestDenied"}}),
        );

        let payload: Value = serde_json::from_str(&tools.list_users(&sid).await).unwrap();

        assert_eq!(payload["error"], "Insufficient permissions or token invalid");
        assert_eq!(payload["status"], 403);
        assert_eq!(payload["hint"], "Ensure User.Read.All consent is granted");
    }

    #[tokio::test]
    async fn site_lists_resolve_the_default_site() {
        let (tools, store, _) = toolset();
        let sid = SessionId::from("sess_abc");
        login(&store, &sid).await;

        let payload: Value =
            serde_json::from_str(&tools.get_sharepoint_site_lists(&sid, None).await).unwrap();

        assert_eq!(payload["success"], true);
        assert_eq!(payload["site_id"], "site-0001");
        assert_eq!(payload["count"], 1);
    }

    #[tokio::test]
    async fn unknown_tool_name_yields_an_error_payload() {
        let (tools, store, _) = toolset();
        let sid = SessionId::from("sess_abc");
        login(&store, &sid).await;

        let payload = tools.execute("drop_tables", &Value::Null, &sid).await;

        assert_eq!(payload, r#"{"error":"Unknown function: drop_tables"}"#);
    }

    #[test]
    fn schemas_cover_every_dispatchable_tool() {
        let (tools, _, _) = toolset();

        let names: Vec<String> = tools
            .schemas()
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["function"]["name"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "get_current_user_info",
                "list_users",
                "get_sharepoint_site",
                "get_sharepoint_site_lists",
            ]
        );
    }

    #[test]
    fn site_urls_are_rewritten_for_graph() {
        assert_eq!(
            sharepoint_site_url(BASE, "https://contoso.sharepoint.test/teams/demo").unwrap(),
            format!("{BASE}/sites/contoso.sharepoint.test:/teams/demo"),
        );
        // Page-level segments are stripped.
        assert_eq!(
            sharepoint_site_url(
                BASE,
                "https://contoso.sharepoint.test/teams/demo/SitePages/Home.aspx"
            )
            .unwrap(),
            format!("{BASE}/sites/contoso.sharepoint.test:/teams/demo"),
        );
        // Root site has no path suffix.
        assert_eq!(
            sharepoint_site_url(BASE, "https://contoso.sharepoint.test/").unwrap(),
            format!("{BASE}/sites/contoso.sharepoint.test"),
        );
        assert!(sharepoint_site_url(BASE, "not a url").is_err());
    }
}
