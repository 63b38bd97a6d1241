use crate::application_port::*;
use crate::domain_model::SessionId;
use crate::tools::GraphToolset;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

// Stands in for the hosted agent runtime: instead of a model choosing tool
// calls, the prompt is matched against the toolset by keyword and the tool
// output returned verbatim. Exercises the same executor/credential path the
// real runtime would.
pub struct FakeAgentService {
    tools: Arc<GraphToolset>,
}

impl FakeAgentService {
    pub fn new(tools: Arc<GraphToolset>) -> Self {
        FakeAgentService { tools }
    }
}

// Keyword matching is on whole words so that e.g. "some" or "tell me"
// cannot accidentally route a prompt to a tool.
fn select_tool(prompt: &str) -> Option<&'static str> {
    let prompt = prompt.to_ascii_lowercase();
    let words: Vec<&str> = prompt
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |w: &str| words.iter().any(|x| *x == w);

    if has("list") && (has("user") || has("users")) {
        Some("list_users")
    } else if (has("site") || has("sharepoint")) && (has("list") || has("lists")) {
        Some("get_sharepoint_site_lists")
    } else if has("site") || has("sharepoint") {
        Some("get_sharepoint_site")
    } else if has("profile") || prompt.contains("who am i") {
        Some("get_current_user_info")
    } else {
        None
    }
}

#[async_trait::async_trait]
impl AgentService for FakeAgentService {
    async fn run(&self, session_id: &SessionId, prompt: &str) -> Result<AgentReply, AgentError> {
        let response = match select_tool(prompt) {
            Some(tool) => {
                debug!(tool, "fake agent selected a tool");
                self.tools.execute(tool, &Value::Null, session_id).await
            }
            None => format!("I could not match that prompt to a tool: {prompt}"),
        };
        Ok(AgentReply { response })
    }
}
