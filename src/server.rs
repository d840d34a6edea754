use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use crate::indexer::Position;
use crate::tools::{format_completions, format_diagnostics, format_location};
use crate::workspace::Workspace;

#[derive(Clone)]
pub struct ScssNavServer {
    workspace: Arc<Workspace>,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindDefinitionParams {
    #[schemars(description = "Stylesheet path (absolute, relative to the workspace root, or a file:// URI)")]
    pub file: String,
    #[schemars(description = "Zero-based line of the reference")]
    pub line: usize,
    #[schemars(description = "Zero-based character column of the reference")]
    pub column: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompleteParams {
    #[schemars(description = "Stylesheet path (absolute, relative to the workspace root, or a file:// URI)")]
    pub file: String,
    #[schemars(description = "Zero-based line of the cursor")]
    pub line: usize,
    #[schemars(description = "Zero-based character column of the cursor")]
    pub column: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentEvent {
    Open,
    Change,
    Save,
    Close,
    Create,
    Delete,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SyncDocumentParams {
    #[schemars(description = "Stylesheet or configuration file the event is about")]
    pub file: String,
    #[schemars(description = "What happened: open, change, save, close, create or delete")]
    pub event: DocumentEvent,
    #[schemars(description = "Full buffer text, required for open and change")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DiagnosticsParams {
    #[schemars(description = "Optional file to check. If omitted, every stylesheet of every repository is checked.")]
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InvalidateParams {
    #[schemars(description = "Optional file whose cached results should be dropped")]
    pub file: Option<String>,
    #[schemars(description = "Optional repository root whose cached results should be dropped")]
    pub repository: Option<String>,
}

#[tool_router]
impl ScssNavServer {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        info!(
            "Serving {} repository context(s) under {}",
            workspace.repositories().len(),
            workspace.root().display()
        );

        Self {
            workspace,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Go to the definition of the SCSS reference at a position: a variable ($name or ns.$name), a mixin (@include name or @include ns.name), a function call (name( or ns.name(), or the quoted path of an @use/@forward/@import, which jumps to the imported file. Resolution follows @use namespaces, @forward chains and tsconfig/jsconfig path aliases.")]
    async fn find_definition(
        &self,
        Parameters(params): Parameters<FindDefinitionParams>,
    ) -> Result<CallToolResult, McpError> {
        let file = self.workspace.resolve_path(&params.file);
        let location = self
            .workspace
            .definition(&file, Position::new(params.line, params.column));

        let output = format_location(location.as_ref(), self.workspace.root());
        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "List SCSS completions at a cursor position: variables after $ or ns.$, mixins after @include, and functions in value positions or after ns. Only symbols reachable through the file's own declarations, its @use/@import edges and their @forward chains are offered; private members (_name, -name) of other files are excluded.")]
    async fn complete(
        &self,
        Parameters(params): Parameters<CompleteParams>,
    ) -> Result<CallToolResult, McpError> {
        let file = self.workspace.resolve_path(&params.file);
        let items = self
            .workspace
            .completion(&file, Position::new(params.line, params.column));

        let output = format_completions(&items, self.workspace.root());
        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "Report unresolved @use/@forward/@import paths, unknown namespaces and namespaced members that cannot be found. Checks one file, or every stylesheet of every repository when no file is given.")]
    async fn diagnostics(
        &self,
        Parameters(params): Parameters<DiagnosticsParams>,
    ) -> Result<CallToolResult, McpError> {
        let diagnostics = match params.file {
            Some(ref f) => self.workspace.diagnostics(&self.workspace.resolve_path(f)),
            None => self.workspace.check_repositories(),
        };

        let output = format_diagnostics(&diagnostics, self.workspace.root());
        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "Tell the server about an editor or file-system event so cached resolution stays correct. Open and change carry the full buffer text, which then takes precedence over the file on disk until close.")]
    async fn sync_document(
        &self,
        Parameters(params): Parameters<SyncDocumentParams>,
    ) -> Result<CallToolResult, McpError> {
        let file = self.workspace.resolve_path(&params.file);

        match params.event {
            DocumentEvent::Open | DocumentEvent::Change => {
                let Some(text) = params.text else {
                    return Ok(CallToolResult::error(vec![Content::text(
                        "The 'text' parameter is required for open and change events",
                    )]));
                };
                self.workspace.did_change(&file, text);
            }
            DocumentEvent::Save => self.workspace.did_save(&file),
            DocumentEvent::Close => self.workspace.did_close(&file),
            DocumentEvent::Create => self.workspace.did_create(&file),
            DocumentEvent::Delete => self.workspace.did_delete(&file),
        }

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Synced {:?} for {}",
            params.event,
            display_relative(&file, &self.workspace)
        ))]))
    }

    #[tool(description = "Drop cached resolution results for a file, for a repository root, or (with no parameters) reload every alias configuration and drop everything.")]
    async fn invalidate(
        &self,
        Parameters(params): Parameters<InvalidateParams>,
    ) -> Result<CallToolResult, McpError> {
        if let Some(ref root) = params.repository {
            if !self.workspace.invalidate_repository(&PathBuf::from(root)) {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "No repository is configured at {}",
                    root
                ))]));
            }
        }
        if let Some(ref f) = params.file {
            self.workspace.invalidate_file(&self.workspace.resolve_path(f));
        }
        if params.file.is_none() && params.repository.is_none() {
            self.workspace.reload();
        }

        Ok(CallToolResult::success(vec![Content::text(
            "Invalidation complete.".to_string(),
        )]))
    }

    #[tool(description = "Show resolver cache statistics: hits, misses and cached entries per repository.")]
    async fn cache_stats(&self) -> Result<CallToolResult, McpError> {
        let stats = self.workspace.cache_stats();
        Ok(CallToolResult::success(vec![Content::text(format!(
            "{}Open documents: {}",
            stats,
            self.workspace.open_documents()
        ))]))
    }
}

fn display_relative(file: &std::path::Path, workspace: &Workspace) -> String {
    file.strip_prefix(workspace.root())
        .unwrap_or(file)
        .display()
        .to_string()
}

#[tool_handler]
impl ServerHandler for ScssNavServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "scss-nav-mcp".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "SCSS navigation server. Resolves @use/@forward/@import through tsconfig path \
                 aliases per repository and provides find_definition, complete, diagnostics, \
                 sync_document, invalidate and cache_stats tools."
                    .to_string(),
            ),
        }
    }
}
