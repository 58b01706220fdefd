/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin
/// 2. Processes tool calls using our habit maker
/// 3. Sends JSON-RPC responses to stdout
/// 4. Pushes a notification whenever a reminder fires

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::reminders::FiredReminder;
use crate::tools;
use crate::{HabitMakerServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying habit maker server
    habit_maker: HabitMakerServer,
    /// Reminders whose timers elapsed
    fired: mpsc::UnboundedReceiver<FiredReminder>,
    /// Whether the client has finished initialization
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(habit_maker: HabitMakerServer, fired: mpsc::UnboundedReceiver<FiredReminder>) -> Self {
        Self {
            habit_maker,
            fired,
            initialized: false,
        }
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut lines = BufReader::new(stdin).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if let Some(response) = self.process_line(&line) {
                            Self::write_message(&mut stdout, &response).await?;
                        }
                    }
                    Ok(None) => {
                        info!("MCP server shutting down (stdin closed)");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read from stdin: {}", e);
                        break;
                    }
                },
                Some(reminder) = self.fired.recv() => {
                    let notification = self.handle_fired_reminder(reminder);
                    Self::write_message(&mut stdout, &notification).await?;
                }
            }
        }

        Ok(())
    }

    /// Write one newline-terminated JSON message
    async fn write_message<T: Serialize>(stdout: &mut Stdout, message: &T) -> Result<(), ServerError> {
        let text = serde_json::to_string(message)?;

        stdout.write_all(text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;

        debug!("Sent message: {}", text);
        Ok(())
    }

    /// Process a single line of JSON-RPC input
    fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request)
    }

    /// Handle a JSON-RPC request; notifications get no response
    fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request.method);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };
        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                info!("MCP client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
                logging: Some(json!({})),
            },
            server_info: ServerInfo {
                name: "Habit Maker MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Self::to_response(id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools = vec![
            Self::tool_definition::<tools::CreateHabitParams>(
                "habit_create",
                "Create a new habit with a frequency, a per-period quota, optional weekly reminders and encouragements",
            ),
            Self::tool_definition::<tools::CheckHabitParams>(
                "habit_check",
                "Check off a habit for today or a past date; checking an already checked day unchecks it",
            ),
            Self::tool_definition::<tools::ListHabitsParams>(
                "habit_list",
                "List habits with streaks, points and scores, filtered and sorted by the saved settings",
            ),
            Self::tool_definition::<tools::StatusParams>(
                "habit_status",
                "Show one habit's progress, best streak and reminders",
            ),
            Self::tool_definition::<tools::UpdateHabitParams>(
                "habit_update",
                "Edit a habit's name, frequency, quota, notes, archive flag, reminders or encouragements",
            ),
            Self::tool_definition::<tools::DeleteHabitParams>(
                "habit_delete",
                "Permanently delete a habit with its check history and reminders",
            ),
            Self::tool_definition::<tools::UpdateSettingsParams>(
                "settings_update",
                "View or change the completion target, first day of week, list filters and sort order",
            ),
        ];

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    fn tool_definition<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
        let schema = schemars::schema_for!(P);
        ToolDefinition {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" })),
        }
    }

    /// Handle tools/call request
    fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params {
            Some(params) => match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid parameters: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        if !self.initialized {
            debug!("Tool '{}' called before initialization finished", tool_params.name);
        }

        let args = tool_params.arguments;
        let lifecycle = self.habit_maker.lifecycle();

        let result = match tool_params.name.as_str() {
            "habit_create" => Self::call_tool(args, |p| tools::create_habit(&lifecycle, p), |r| {
                match &r.habit_id {
                    Some(habit_id) => format!("{}\nHabit ID: {}", r.message, habit_id),
                    None => r.message,
                }
            }),
            "habit_check" => Self::call_tool(args, |p| tools::check_habit(&lifecycle, p), |r| r.message),
            "habit_list" => Self::call_tool(args, |p| tools::list_habits(&lifecycle, p), |r| r.message),
            "habit_status" => Self::call_tool(args, |p| tools::get_habit_status(&lifecycle, p), |r| r.message),
            "habit_update" => Self::call_tool(args, |p| tools::update_habit(&lifecycle, p), |r| r.message),
            "habit_delete" => Self::call_tool(args, |p| tools::delete_habit(&lifecycle, p), |r| r.message),
            "settings_update" => Self::call_tool(args, |p| tools::update_settings(&lifecycle, p), |r| r.message),
            _ => ToolCallResult::error(format!("Unknown tool: {}", tool_params.name)),
        };

        Self::to_response(id, &result)
    }

    /// Deserialize the arguments, run the tool and render its result
    fn call_tool<P, R>(
        args: Map<String, Value>,
        run: impl FnOnce(P) -> Result<R, ServerError>,
        render: impl FnOnce(R) -> String,
    ) -> ToolCallResult
    where
        P: DeserializeOwned,
    {
        let params: P = match serde_json::from_value(Value::Object(args)) {
            Ok(params) => params,
            Err(e) => return ToolCallResult::error(format!("Invalid arguments: {}", e)),
        };

        match run(params) {
            Ok(response) => ToolCallResult::success(render(response)),
            Err(e) => {
                debug!("Tool failed with code {}: {}", server_error_to_json_rpc_code(&e), e);
                ToolCallResult::error(e.to_string())
            }
        }
    }

    /// Build the user notification and line up the habit's next reminders
    fn handle_fired_reminder(&self, reminder: FiredReminder) -> JsonRpcNotification {
        info!("Reminder fired for habit '{}' ({})", reminder.habit_title, reminder.habit_id);

        match self.habit_maker.lifecycle().rearm_after_fire(&reminder.habit_id) {
            Ok(scheduled) => debug!("{} reminder(s) pending for habit {}", scheduled, reminder.habit_id),
            Err(e) => warn!("Could not re-arm reminders for habit {}: {}", reminder.habit_id, e),
        }

        JsonRpcNotification::new(
            "notifications/message",
            json!({
                "level": "info",
                "logger": "habit-maker",
                "data": {
                    "title": reminder.habit_title,
                    "message": "Did you complete it?",
                    "habit_id": reminder.habit_id,
                }
            }),
        )
    }

    fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to serialize result: {}", e),
                None,
            ),
        }
    }
}
