use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::service::groq_service::GroqClient;
use crate::service::routing;
use crate::service::tools::{ToolCall, ToolDispatcher};

// Loop prevention: the model picks at most this many tool calls per
// user turn before we force a final answer.
pub const MAX_TOOL_CALLS: usize = 5;

const AGENT_RULES: &str = "CRITICAL RULE: ONLY PERFORM THE EXACT ACTION REQUESTED BY THE USER. \
DO NOT ADD EXTRA ACTIONS.\n\
- Call each tool at most once per user request.\n\
- Do not schedule meetings when only availability was asked.\n\
- Do not send emails unless the user asked for an email.\n\
- Dates are YYYY-MM-DD, times are HH:MM.\n\
Reply ONLY with one JSON object, either:\n\
{\"action\":\"tool\",\"tool\":\"<tool name>\",\"arguments\":{...}}\n\
or, once you have what you need:\n\
{\"action\":\"reply\",\"reply\":\"<plain text answer for the user>\"}";

#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    action: String,
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    arguments: Option<Value>,
    #[serde(default)]
    reply: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentAction {
    Tool(ToolCall),
    Reply(String),
}

// The model's envelope, or None when it answered with prose instead of
// the JSON shape.
pub fn parse_action(payload: &str) -> Option<AgentAction> {
    let envelope: ActionEnvelope = serde_json::from_str(payload.trim()).ok()?;
    match envelope.action.as_str() {
        "tool" => {
            let name = envelope.tool?;
            Some(AgentAction::Tool(ToolCall {
                name,
                arguments: envelope.arguments.unwrap_or(Value::Null),
            }))
        }
        "reply" => Some(AgentAction::Reply(envelope.reply?)),
        _ => None,
    }
}

pub struct MeetingAgent {
    groq: Arc<dyn GroqClient>,
    tools: Arc<ToolDispatcher>,
}

impl MeetingAgent {
    pub fn new(groq: Arc<dyn GroqClient>, tools: Arc<ToolDispatcher>) -> Self {
        Self { groq, tools }
    }

    // A full user turn. Never returns Err; every failure becomes a
    // user-facing sentence, matching what the chat front-ends expect.
    pub async fn handle_user_message(&self, text: &str) -> String {
        let mut transcript_of_calls: Vec<(String, String)> = Vec::new();

        for _ in 0..MAX_TOOL_CALLS {
            let prompt = build_turn_prompt(text, &transcript_of_calls);
            let payload = match self.groq.generate_prompt(&prompt, "tool_select").await {
                Ok(p) => p,
                Err(err) => {
                    eprintln!("Groq tool selection failed: {}", err);
                    if transcript_of_calls.is_empty() {
                        return routing::fallback_reply(routing::route_intent(text));
                    }
                    return render_results_plainly(&transcript_of_calls);
                }
            };

            match parse_action(&payload) {
                Some(AgentAction::Reply(reply)) => return reply,
                Some(AgentAction::Tool(call)) => {
                    println!("Calling tool {} with args {}", call.name, call.arguments);
                    let result = match self.tools.dispatch(&call).await {
                        Ok(result) => result,
                        Err(err) => {
                            json!({ "success": false, "error": err.to_string() }).to_string()
                        }
                    };
                    transcript_of_calls.push((call.name, result));
                }
                // Prose instead of the JSON envelope; treat it as the answer.
                None => return payload.trim().to_string(),
            }
        }

        self.final_answer(text, &transcript_of_calls).await
    }

    async fn final_answer(
        &self,
        text: &str,
        transcript_of_calls: &[(String, String)],
    ) -> String {
        let prompt = format!(
            "User message: \"{}\"\nTool results:\n{}",
            text,
            render_results_plainly(transcript_of_calls)
        );
        match self.groq.generate_prompt(&prompt, "final_answer").await {
            Ok(answer) => answer,
            Err(err) => {
                eprintln!("Groq final answer failed: {}", err);
                render_results_plainly(transcript_of_calls)
            }
        }
    }
}

fn build_turn_prompt(text: &str, transcript_of_calls: &[(String, String)]) -> String {
    let mut prompt = format!(
        "{catalog}\n\n{rules}\n\nUser message: \"{text}\"",
        catalog = ToolDispatcher::catalog(),
        rules = AGENT_RULES,
        text = text
    );
    if !transcript_of_calls.is_empty() {
        prompt.push_str("\n\nTool results so far:");
        for (name, result) in transcript_of_calls {
            prompt.push_str(&format!("\n- {}: {}", name, result));
        }
        prompt.push_str(
            "\nIf these results answer the user, reply with the \"reply\" action now.",
        );
    }
    prompt
}

fn render_results_plainly(transcript_of_calls: &[(String, String)]) -> String {
    transcript_of_calls
        .iter()
        .map(|(name, result)| format!("{}: {}", name, result))
        .collect::<Vec<String>>()
        .join("\n")
}
