//! MCP bridge: JSON-RPC 2.0 over stdio.
//!
//! Lets MCP-speaking assistants search the hub's library directory.
//! Requests arrive one JSON object per line on stdin; replies leave the
//! same way on stdout, so logs must stay on stderr. The bridge runs as
//! its own process and reaches the hub over HTTP, which keeps it off
//! the hub's request path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Protocol revision announced during initialization.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// The single tool this bridge exposes.
pub const SEARCH_TOOL: &str = "search_libraries";

/// Result cap for tool-call searches.
const SEARCH_LIMIT: usize = 10;

/// A directory hit returned to the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryHit {
    /// Library display name.
    pub name: String,
    /// Library-node address.
    pub url: String,
    /// Optional description.
    pub description: Option<String>,
    /// Capability/topic tags.
    pub tags: Vec<String>,
}

/// Where the bridge searches for libraries.
#[async_trait]
pub trait LibrarySearch: Send + Sync {
    /// Search the directory.
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<LibraryHit>>;
}

/// Searches a running hub over its HTTP API.
pub struct HttpSearch {
    client: reqwest::Client,
    hub_url: String,
}

impl HttpSearch {
    /// Create a search client against the given hub address.
    pub fn new(hub_url: impl Into<String>) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("atheneum-mcp")
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            hub_url: hub_url.into(),
        })
    }
}

#[derive(Deserialize)]
struct SearchResults {
    results: Vec<LibraryHit>,
}

#[async_trait]
impl LibrarySearch for HttpSearch {
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<LibraryHit>> {
        let url = format!("{}/api/registry/search", self.hub_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", &limit.to_string())])
            .send()
            .await?
            .error_for_status()?;
        let results: SearchResults = response.json().await?;
        Ok(results.results)
    }
}

#[derive(Deserialize)]
struct RpcRequest {
    jsonrpc: Option<String>,
    id: Option<Value>,
    method: Option<String>,
    params: Option<Value>,
}

/// One MCP session over a line-delimited transport.
pub struct McpSession {
    search: Arc<dyn LibrarySearch>,
}

impl McpSession {
    /// Create a session backed by the given search.
    pub fn new(search: Arc<dyn LibrarySearch>) -> Self {
        Self { search }
    }

    /// Handle one request line. Returns the reply line, or `None` for
    /// notifications, which never get a reply.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(_) => return Some(error_response(&Value::Null, -32600, "Invalid Request")),
        };

        if request.jsonrpc.as_deref() != Some("2.0") {
            return Some(error_response(&Value::Null, -32600, "Invalid Request"));
        }

        let method = request.method.unwrap_or_default();
        let params = request.params.unwrap_or(Value::Null);

        let Some(id) = request.id else {
            // The initialized notice is the only notification expected here
            tracing::debug!(%method, "notification received");
            return None;
        };

        let response = match method.as_str() {
            "initialize" => result_response(&id, initialize_result()),
            "tools/list" => result_response(&id, tools_list_result()),
            "tools/call" => self.handle_tool_call(&id, &params).await,
            _ => error_response(&id, -32601, "Method not found"),
        };
        Some(response)
    }

    async fn handle_tool_call(&self, id: &Value, params: &Value) -> String {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if name != SEARCH_TOOL {
            return error_response(id, -32601, &format!("Tool not found: {name}"));
        }

        let query = params
            .get("arguments")
            .and_then(|args| args.get("query"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        match self.search.search(query, SEARCH_LIMIT).await {
            Ok(hits) => {
                let text =
                    serde_json::to_string_pretty(&hits).unwrap_or_else(|_| "[]".to_string());
                result_response(
                    id,
                    json!({
                        "content": [
                            { "type": "text", "text": text }
                        ]
                    }),
                )
            }
            Err(err) => {
                tracing::warn!(%err, "library search failed");
                error_response(id, -32603, &format!("Internal error: {err}"))
            }
        }
    }

    /// Serve the session on this process's stdio until EOF.
    pub async fn run_stdio(&self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(line).await {
                stdout.write_all(response.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }
        Ok(())
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": "atheneum-hub",
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

fn tools_list_result() -> Value {
    json!({
        "tools": [
            {
                "name": SEARCH_TOOL,
                "description": "Search for libraries in the Atheneum network by name or description.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The search term (name or description)"
                        }
                    },
                    "required": ["query"]
                }
            }
        ]
    })
}

fn result_response(id: &Value, result: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": id, "result": result }).to_string()
}

fn error_response(id: &Value, code: i64, message: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSearch(Vec<LibraryHit>);

    #[async_trait]
    impl LibrarySearch for FixedSearch {
        async fn search(&self, _query: &str, _limit: usize) -> anyhow::Result<Vec<LibraryHit>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl LibrarySearch for FailingSearch {
        async fn search(&self, _query: &str, _limit: usize) -> anyhow::Result<Vec<LibraryHit>> {
            anyhow::bail!("hub unreachable")
        }
    }

    fn session() -> McpSession {
        McpSession::new(Arc::new(FixedSearch(vec![LibraryHit {
            name: "Lib A".into(),
            url: "http://lib-a.local".into(),
            description: Some("First library".into()),
            tags: vec!["public".into()],
        }])))
    }

    async fn reply(session: &McpSession, line: &str) -> Value {
        let response = session.handle_line(line).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = reply(
            &session(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await;
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], "atheneum-hub");
    }

    #[tokio::test]
    async fn test_initialized_notification_gets_no_reply() {
        let response = session()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = reply(
            &session(),
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        )
        .await;
        assert_eq!(response["result"]["tools"][0]["name"], SEARCH_TOOL);
        assert_eq!(
            response["result"]["tools"][0]["inputSchema"]["required"][0],
            "query"
        );
    }

    #[tokio::test]
    async fn test_tool_call_returns_text_content() {
        let response = reply(
            &session(),
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"search_libraries","arguments":{"query":"lib"}}}"#,
        )
        .await;
        let content = &response["result"]["content"][0];
        assert_eq!(content["type"], "text");
        let text = content["text"].as_str().unwrap();
        assert!(text.contains("Lib A"));
        assert!(text.contains("http://lib-a.local"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let response = reply(
            &session(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"shelve_book"}}"#,
        )
        .await;
        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = reply(
            &session(),
            r#"{"jsonrpc":"2.0","id":5,"method":"books/burn"}"#,
        )
        .await;
        assert_eq!(response["error"]["code"], -32601);

        // As a notification, silently dropped instead.
        let none = session()
            .handle_line(r#"{"jsonrpc":"2.0","method":"books/burn"}"#)
            .await;
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_malformed_requests() {
        let response = reply(&session(), "not json").await;
        assert_eq!(response["error"]["code"], -32600);
        assert_eq!(response["id"], Value::Null);

        let response = reply(&session(), r#"{"id":1,"method":"initialize"}"#).await;
        assert_eq!(response["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_search_failure_maps_to_internal_error() {
        let session = McpSession::new(Arc::new(FailingSearch));
        let response = session
            .handle_line(
                r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"search_libraries","arguments":{"query":"x"}}}"#,
            )
            .await
            .unwrap();
        let response: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(response["error"]["code"], -32603);
        assert!(response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("hub unreachable"));
    }
}
