//! Natural-language meeting scheduler
//!
//! One chat-with-tools call; if the model asks for tools they are executed,
//! their outputs appended as `tool` messages, and exactly one follow-up
//! chat produces the final answer. There is no second tool round.

use std::sync::Arc;

use cadence_domain::constants::{SCHEDULER_MAX_TOKENS, SCHEDULER_TEMPERATURE};
use cadence_domain::{
    CadenceError, ChatMessage, ChatRequest, Result, ScheduleOption, ScheduleRequest,
    ScheduleResponse, ToolCall,
};
use chrono::{Duration, NaiveTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use super::ports::ToolExecutor;
use super::router::LlmRouter;
use super::tools::scheduling_tools;
use crate::context::CallContext;
use crate::utils::text::outermost_span;
use crate::utils::time::resolve_timezone;

/// Drives a provider through the scheduling tool protocol
pub struct AiScheduler {
    router: Arc<LlmRouter>,
    tools: Arc<dyn ToolExecutor>,
    provider_name: String,
}

impl AiScheduler {
    /// `provider_name` empty means the router's default provider.
    pub fn new(
        router: Arc<LlmRouter>,
        tools: Arc<dyn ToolExecutor>,
        provider_name: impl Into<String>,
    ) -> Self {
        Self { router, tools, provider_name: provider_name.into() }
    }

    /// Answer a scheduling request with ranked options; never returns an
    /// empty option list.
    pub async fn schedule(
        &self,
        ctx: &CallContext,
        request: &ScheduleRequest,
    ) -> Result<ScheduleResponse> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(CadenceError::InvalidInput("scheduling query is empty".to_string()));
        }

        let timezone = effective_timezone(&request.user_timezone);
        let mut chat = ChatRequest::new(vec![
            ChatMessage::system(system_prompt(timezone)),
            ChatMessage::user(format!(
                "Please help me schedule: {query}\n\nProvide your top 3 recommended meeting times with detailed explanations."
            )),
        ])
        .with_temperature(SCHEDULER_TEMPERATURE)
        .with_max_tokens(SCHEDULER_MAX_TOKENS);

        let provider = self.router.get_provider(&self.provider_name)?;
        let mut response = provider.chat_with_tools(ctx, &chat, &scheduling_tools()).await?;

        if !response.tool_calls.is_empty() {
            debug!(calls = response.tool_calls.len(), "Model requested tool calls");
            let results = self.execute_tool_calls(ctx, &response.tool_calls).await?;

            chat.messages.push(ChatMessage::assistant_with_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            chat.messages.extend(
                response
                    .tool_calls
                    .iter()
                    .zip(results)
                    .map(|(call, output)| ChatMessage::tool_result(call.id.as_str(), output)),
            );

            response = provider.chat(ctx, &chat).await?;
        }

        let mut options = parse_schedule_options(&response.content, timezone);
        if request.max_options > 0 {
            options.truncate(request.max_options);
        }

        let provider_used = if response.provider.is_empty() {
            provider.name().to_string()
        } else {
            response.provider.clone()
        };
        info!(provider = %provider_used, options = options.len(), "Scheduling request answered");

        Ok(ScheduleResponse {
            options,
            analysis: response.content,
            provider_used,
            tokens_used: response.usage.total_tokens,
        })
    }

    async fn execute_tool_calls(&self, ctx: &CallContext, calls: &[ToolCall]) -> Result<Vec<String>> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            match self.tools.execute(ctx, &call.function, &call.arguments).await {
                Ok(output) => results.push(output),
                Err(err @ CadenceError::Cancelled(_)) => return Err(err),
                Err(err) => {
                    warn!(tool = %call.function, error = %err, "Tool execution failed");
                    results.push(format!("Error executing {}: {err}", call.function));
                }
            }
        }
        Ok(results)
    }
}

fn effective_timezone(requested: &str) -> &str {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        "UTC"
    } else {
        trimmed
    }
}

fn system_prompt(timezone: &str) -> String {
    format!(
        r#"You are an expert AI scheduling assistant with deep knowledge of timezone management, working hours across cultures, and meeting optimization.

Your task is to help schedule meetings by:
1. Understanding natural language scheduling requests
2. Considering participant timezones and working hours
3. Avoiding DST transition issues
4. Providing 3 ranked time options with clear explanations
5. Using available tools to check calendars and validate times

Current context:
- User timezone: {timezone}
- Current time: {now}

Guidelines:
- ALWAYS use IANA timezone IDs (e.g., "America/Los_Angeles"), NEVER abbreviations (PST, EST)
- Check for DST transitions when scheduling near spring forward / fall back dates
- Prioritize working hours (9 AM - 5 PM) unless explicitly told otherwise
- Consider timezone fairness for international teams
- Provide clear reasoning for each suggestion
- Use the available tools to gather information before making suggestions

Respond with structured JSON containing your top 3 meeting time options, each with:
- rank (1-3)
- score (0-100)
- start_time (ISO 8601)
- end_time (ISO 8601)
- timezone (IANA ID)
- reasoning (why this time is good)
- warnings (any concerns about this time)
- participants (how this time looks for each participant)"#,
        now = Utc::now().to_rfc3339(),
    )
}

/// Ranked options from the JSON array embedded in a model answer.
///
/// A missing, malformed or empty array yields [`fallback_options`].
pub fn parse_schedule_options(content: &str, timezone: &str) -> Vec<ScheduleOption> {
    let parsed = outermost_span(content, '[', ']')
        .and_then(|json| serde_json::from_str::<Vec<ScheduleOption>>(json).ok())
        .filter(|options| !options.is_empty());

    parsed.unwrap_or_else(|| {
        debug!("No usable options in model answer, using fallback");
        fallback_options(timezone)
    })
}

/// Single synthetic option: tomorrow 14:00 for 30 minutes in `timezone`
/// (UTC when blank or unknown).
pub fn fallback_options(timezone: &str) -> Vec<ScheduleOption> {
    let zone = resolve_timezone(timezone);
    let tomorrow = Utc::now().with_timezone(&zone).date_naive() + Duration::days(1);
    let wall = tomorrow.and_time(NaiveTime::from_hms_opt(14, 0, 0).unwrap_or(NaiveTime::MIN));

    let start = zone
        .from_local_datetime(&wall)
        .earliest()
        .map_or_else(|| Utc.from_utc_datetime(&wall).fixed_offset(), |t| t.fixed_offset());

    vec![ScheduleOption {
        rank: 1,
        score: 85,
        start_time: start,
        end_time: start + Duration::minutes(30),
        timezone: zone.name().to_string(),
        reasoning: "Tomorrow afternoon - good for most timezones".to_string(),
        warnings: Vec::new(),
        participants: std::collections::BTreeMap::new(),
    }]
}
