use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const GROQ_MODEL: &str = "llama-3.1-8b-instant";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize, Deserialize)]
struct GroqMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroqRequest {
    model: String,
    messages: Vec<GroqMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

pub async fn generate_groq_prompt(
    prompt: &str,
    prompt_type: &str,
    api_key: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let now: DateTime<Utc> = Utc::now();

    let full_prompt = match prompt_type {
        "mom" => format!(
            "Convert the following meeting transcript into structured Minutes of Meeting (MoM).\n\
             Include these sections, each with its own heading:\n\
             - Agenda\n\
             - Key Points\n\
             - Decisions\n\
             - Action Items (with owners)\n\n\
             Transcript:\n{transcript}",
            transcript = prompt
        ),
        "tool_select" => format!(
            "Current date and time (UTC): {now}\n\
             {turn}",
            now = now.to_rfc3339(),
            turn = prompt
        ),
        "final_answer" => format!(
            "Current date and time (UTC): {now}\n\
             Write a short, plain-text answer for the user based on the tool results below.\n\
             Mention the concrete outcome (free/busy, event created, email sent) and nothing else.\n\
             {turn}",
            now = now.to_rfc3339(),
            turn = prompt
        ),
        _ => return Err("Not a valid base prompt".to_string().into()),
    };

    query_groq(full_prompt, prompt_type, api_key).await
}

async fn query_groq(
    prompt: String,
    prompt_type: &str,
    api_key: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let system_message = match prompt_type {
        "tool_select" => {
            "You are a strict JSON tool router for a meeting assistant. You read the available \
             tools and the user's message and reply ONLY with a single JSON object, with no \
             markdown, no backticks, and no extra text. You never invent tools and you call each \
             tool at most once per user request."
        }
        "mom" => {
            "You are a careful minute-taker. Reply with plain text containing exactly the \
             requested sections. Do not add commentary before or after the minutes."
        }
        "final_answer" => {
            "You are a meeting assistant. Reply with 1-3 plain-text sentences (no JSON, no \
             markdown headers)."
        }
        _ => "You are a helpful assistant.",
    };

    let request = GroqRequest {
        model: GROQ_MODEL.to_string(),
        messages: vec![
            GroqMessage {
                role: "system".to_string(),
                content: system_message.to_string(),
            },
            GroqMessage {
                role: "user".to_string(),
                content: prompt,
            },
        ],
        max_tokens: 1500,
        temperature: 0.2,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;
    let response = client
        .post(GROQ_CHAT_URL)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        eprintln!("Groq error {}: {}", status, text);
        return Err(format!("Request failed with status {}", status).into());
    }

    let parsed: GroqResponse = serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse JSON: {}\nRaw body: {}", e, text))?;

    if let Some(choice) = parsed.choices.first() {
        Ok(choice.message.content.clone())
    } else {
        Err("No response from Groq".to_string().into())
    }
}
