use std::sync::Arc;

use khamooshi::types::Place;
use khamooshi::{ErrorBody, OutageChecker, OutageError};
use rmcp::{
    ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Clone)]
pub struct McpServer {
    checker: Arc<OutageChecker>,
    tool_router: ToolRouter<Self>,
}

fn to_mcp_error(err: OutageError) -> McpError {
    let body = ErrorBody::from(&err).to_string();
    if err.is_client_error() {
        McpError::invalid_params(body, None)
    } else {
        McpError::internal_error(body, None)
    }
}

#[tool_router]
impl McpServer {
    /// Servers built from the same checker share its page cache.
    pub fn new(checker: Arc<OutageChecker>) -> Self {
        Self {
            checker,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "check_outages",
        description = "Check the Qom scheduled power outage table (qepd.co.ir) for one or more places. Each place is an alias plus a search phrase matched verbatim against the announcements. Returns the table date and the announced outage hours for every place that was found."
    )]
    pub async fn check_outages(
        &self,
        Parameters(params): Parameters<CheckOutagesParams>,
    ) -> Result<String, McpError> {
        let outage = self
            .checker
            .check(&params.places)
            .await
            .inspect_err(|e| log::error!("Failed to check outages: {e}"))
            .map_err(to_mcp_error)?;

        let json = serde_json::to_string_pretty(&outage).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize outages: {e}"), None)
        })?;

        Ok(json)
    }

    #[tool(
        name = "outage_table_date",
        description = "Return the Gregorian date (YYYY-MM-DD) the current Qom outage table was published for."
    )]
    pub async fn outage_table_date(&self) -> Result<String, McpError> {
        let date = self
            .checker
            .publication_date()
            .await
            .inspect_err(|e| log::error!("Failed to read outage table date: {e}"))
            .map_err(to_mcp_error)?;

        let json = serde_json::to_string(&date).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize date: {e}"), None)
        })?;

        Ok(json)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckOutagesParams {
    places: Vec<Place>,
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(include_str!("./instructions.md").to_string()),
            ..Default::default()
        }
    }
}
