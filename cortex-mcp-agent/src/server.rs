use cortex::{
    ActionRegistry, ActionRequest, ActionResult, BridgeConfig, ConfigError, Dispatcher, ErrorKind,
    Executor, Params,
};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub const SERVER_NAME: &str = "cortex-os-server";

/// MCP front for the tool surface of the action registry.
#[derive(Debug, Clone)]
pub struct CortexServer {
    dispatcher: Dispatcher,
}

impl CortexServer {
    pub fn new(config: BridgeConfig) -> Result<Self, ConfigError> {
        let registry = ActionRegistry::tool_surface(&config)?;
        Ok(Self::with_dispatcher(Dispatcher::new(
            registry,
            Executor::new(config),
        )))
    }

    pub fn with_dispatcher(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// One tool per registered action, with the schema of its argument type.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .registry()
            .specs()
            .map(|spec| {
                Tool::new(
                    spec.name(),
                    spec.kind.description(),
                    Arc::new(spec.kind.input_schema()),
                )
            })
            .collect()
    }

    /// Runs a tool call through the dispatcher and renders the outcome as text.
    pub async fn invoke(&self, name: &str, arguments: Option<Params>) -> CallToolResult {
        let request = ActionRequest::new(name, arguments.unwrap_or_default());
        let result = self.dispatcher.dispatch(request).await;
        render(name, result)
    }
}

fn render(name: &str, result: ActionResult) -> CallToolResult {
    match result {
        ActionResult::Success { payload } => {
            let text = match payload.get("confirmation").and_then(Value::as_str) {
                Some(confirmation) => confirmation.to_string(),
                None => Value::Object(payload).to_string(),
            };
            CallToolResult::success(vec![Content::text(text)])
        }
        ActionResult::Failure(failure) => {
            let text = match failure.kind {
                ErrorKind::UnknownAction => format!("Unknown tool: {name}"),
                _ => failure.detail,
            };
            CallToolResult::error(vec![Content::text(text)])
        }
    }
}

impl ServerHandler for CortexServer {
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!(tool = %request.name, "tool call");
        let result = self.invoke(&request.name, request.arguments).await;
        if result.is_error == Some(true) {
            warn!(tool = %request.name, "tool call returned an error result");
        }
        Ok(result)
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(server_instructions()),
        }
    }
}

fn server_instructions() -> String {
    "Cortex bridges an assistant to the local Mac.\n\
     - show_popup: display a native alert with a title, message and optional severity \
     (info, warning or critical). The alert dismisses itself after a few seconds.\n\
     - log_activity: append a record of what the user is doing, whether it is productive, \
     and which application it happens in.\n\
     Both tools reply with a single line of text. Failures are reported the same way."
        .to_string()
}
