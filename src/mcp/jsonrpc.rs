//! # JSON-RPC Adapter
//!
//! Serves an [`McpServer`] as line-delimited JSON-RPC 2.0 over stdio, with
//! the `initialize`, `tools/list` and `tools/call` methods.

use crate::mcp::McpServer;
use crate::CrawlerResult;
use jsonrpc_core::{Error as RpcError, IoHandler, Params, Result as RpcResult, Value};
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

fn lock(server: &Mutex<McpServer>) -> MutexGuard<'_, McpServer> {
    // Keep serving after a call panicked while holding the lock.
    server.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registers the MCP methods for `server`.
pub fn build_handler(server: Arc<Mutex<McpServer>>) -> IoHandler {
    let mut io = IoHandler::new();

    io.add_sync_method("initialize", |_params: Params| -> RpcResult<Value> {
        Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": { "name": "dungeon-crawler", "version": crate::VERSION },
            "capabilities": { "tools": {} }
        }))
    });

    let list_server = Arc::clone(&server);
    io.add_sync_method("tools/list", move |_params: Params| -> RpcResult<Value> {
        let tools = lock(&list_server).list_tools();
        let tools = serde_json::to_value(tools).map_err(|_| RpcError::internal_error())?;
        Ok(json!({ "tools": tools }))
    });

    io.add_sync_method("tools/call", move |params: Params| -> RpcResult<Value> {
        let request: CallParams = params.parse()?;
        debug!("tools/call {}", request.name);
        let result = lock(&server)
            .call_tool(&request.name, &request.arguments)
            .map_err(|err| RpcError::invalid_params(err.to_string()))?;
        serde_json::to_value(result).map_err(|_| RpcError::internal_error())
    });

    io
}

/// Answers requests read from stdin, one per line, until stdin closes.
pub fn serve_stdio(server: McpServer) -> CrawlerResult<()> {
    let handler = build_handler(Arc::new(Mutex::new(server)));
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    info!("Serving MCP over stdio");

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handler.handle_request_sync(&line) {
            writeln!(stdout, "{}", response)?;
            stdout.flush()?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;

    fn handler() -> IoHandler {
        build_handler(Arc::new(Mutex::new(McpServer::new(EngineConfig::seeded(1, 2)))))
    }

    fn request(handler: &IoHandler, method: &str, params: Value) -> Value {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let response = handler.handle_request_sync(&body.to_string()).unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[test]
    fn test_initialize() {
        let response = request(&handler(), "initialize", json!({}));
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], "dungeon-crawler");
    }

    #[test]
    fn test_tools_list() {
        let response = request(&handler(), "tools/list", json!({}));
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 10);
        assert!(tools[0].get("inputSchema").is_some());
    }

    #[test]
    fn test_tools_call_shares_session() {
        let handler = handler();
        let started = request(
            &handler,
            "tools/call",
            json!({ "name": "new_game", "arguments": { "character_name": "Rpc" } }),
        );
        assert_eq!(started["result"]["gameState"]["character"]["name"], "Rpc");

        let look = request(&handler, "tools/call", json!({ "name": "look" }));
        let text = look["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("[This is the dungeon entrance]"));
    }

    #[test]
    fn test_bad_arguments_are_invalid_params() {
        let response = request(
            &handler(),
            "tools/call",
            json!({ "name": "move", "arguments": { "direction": "sideways" } }),
        );
        assert_eq!(response["error"]["code"], -32602);
    }
}
