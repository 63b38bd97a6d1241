use crate::application_port::*;
use crate::domain_model::AccessToken;
use dashmap::DashMap;
use serde_json::json;

/// Canned Graph responses keyed on URL shape, with per-URL overrides for
/// tests. Good enough to exercise every tool executor offline.
pub struct FakeGraphClient {
    overrides: DashMap<String, GraphResponse>,
}

impl FakeGraphClient {
    pub fn new() -> Self {
        FakeGraphClient {
            overrides: DashMap::new(),
        }
    }

    pub fn set_response(&self, url: impl Into<String>, status: u16, body: serde_json::Value) {
        self.overrides
            .insert(url.into(), GraphResponse { status, body });
    }

    fn canned(url: &str) -> GraphResponse {
        if url.ends_with("/me") {
            return GraphResponse {
                status: 200,
                body: json!({
                    "displayName": "Demo User",
                    "userPrincipalName": "demo.user@example.test",
                    "jobTitle": "Engineer",
                    "department": "R&D",
                    "id": "user-0001",
                }),
            };
        }
        if url.contains("/users") {
            return GraphResponse {
                status: 200,
                body: json!({
                    "value": [
                        {"displayName": "Demo User", "userPrincipalName": "demo.user@example.test", "id": "user-0001"},
                        {"displayName": "Second User", "userPrincipalName": "second.user@example.test", "id": "user-0002"},
                    ]
                }),
            };
        }
        if url.contains("/lists") {
            return GraphResponse {
                status: 200,
                body: json!({
                    "value": [
                        {"id": "list-1", "name": "Documents", "displayName": "Documents",
                         "webUrl": "https://contoso.sharepoint.test/teams/demo/Documents",
                         "createdDateTime": "2024-01-01T00:00:00Z",
                         "list": {"template": "documentLibrary", "hidden": false}},
                    ]
                }),
            };
        }
        if url.contains("/sites/") {
            return GraphResponse {
                status: 200,
                body: json!({
                    "id": "site-0001",
                    "name": "demo",
                    "displayName": "Demo Site",
                    "webUrl": "https://contoso.sharepoint.test/teams/demo",
                    "description": "Demo team site",
                    "createdDateTime": "2024-01-01T00:00:00Z",
                    "lastModifiedDateTime": "2024-06-01T00:00:00Z",
                    "siteCollection": {"hostname": "contoso.sharepoint.test", "dataLocationCode": "", "root": {}},
                }),
            };
        }
        GraphResponse {
            status: 404,
            body: json!({"error": {"code": "itemNotFound"}}),
        }
    }
}

impl Default for FakeGraphClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GraphClient for FakeGraphClient {
    async fn get(&self, url: &str, _token: &AccessToken) -> Result<GraphResponse, GraphError> {
        if let Some(overridden) = self.overrides.get(url) {
            return Ok(overridden.clone());
        }
        Ok(Self::canned(url))
    }
}
