use std::future::Future;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::{Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ServerHandler};

use crate::model::SpeechRequest;
use crate::speak::SpeakTool;

pub const SERVER_NAME: &str = "Speak Server";

/// MCP front of [`SpeakTool`]; exposes the single `speak` tool.
#[derive(Clone, Debug)]
pub struct SpeakServer {
    tool: SpeakTool,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SpeakServer {
    pub fn new(tool: SpeakTool) -> Self {
        Self {
            tool,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Convert text to speech and play it through the speakers. \
                          Returns a success or error message.")]
    async fn speak(&self, Parameters(request): Parameters<SpeechRequest>) -> String {
        self.tool.speak(request).await
    }
}

#[tool_handler]
impl ServerHandler for SpeakServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Use `speak` to read text aloud on this machine's speakers. \
                 The call returns once playback has finished."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
