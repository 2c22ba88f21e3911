use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use log::{debug, error, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::{error::ToolError, protocol::mcp::ToolResult};

use super::sampler::UsageSampler;
use super::server::MockToolServer;

pub const CREDIT_BALANCE: i64 = 10_000;
pub const ORGANIZATION_ID: &str = "demo-org-123";
pub const ORGANIZATION_NAME: &str = "Demo Organization";
pub const IMAGE_ESTIMATED_COST: u64 = 100;
const PLACEHOLDER_IMAGE_BASE: &str = "https://placehold.co/1024x1024/png";
const PROMPT_PREVIEW_CHARS: usize = 50;

const USAGE_MODELS: [&str; 3] = ["gpt-4o", "gpt-4o-mini", "claude-3-5-sonnet-20241022"];
const USAGE_TYPES: [&str; 2] = ["chat", "image"];

/// What a handler gets to see besides its arguments.
pub struct ToolContext<'a> {
    pub sampler: &'a dyn UsageSampler,
    pub now: DateTime<Utc>,
}

/// Run a tool call against `server`, bounded by `deadline`.
///
/// Handlers are synchronous, so the call runs on the blocking pool. When the
/// deadline passes first the caller gets `Timeout`; the handler thread is
/// left to finish and its result is discarded.
pub async fn handle_tool_call(
    server: Arc<MockToolServer>,
    tool_name: &str,
    args: Value,
    deadline: Duration,
) -> Result<ToolResult, ToolError> {
    let name = tool_name.to_string();
    let call = tokio::task::spawn_blocking(move || server.call_tool(&name, &args));

    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            error!("{} did not complete: {}", tool_name, e);
            Ok(ToolResult::error(format!("Tool {} did not complete", tool_name)))
        }
        Err(_) => {
            warn!("{} exceeded the {:?} deadline", tool_name, deadline);
            Err(ToolError::Timeout(deadline))
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_args<T: DeserializeOwned>(args: Map<String, Value>) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(args))?)
}

fn json_result<T: Serialize>(payload: &T) -> Result<ToolResult> {
    Ok(ToolResult::text(serde_json::to_string_pretty(payload)?))
}

// check_credits

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckCreditsInput {
    pub include_transactions: bool,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsReport {
    pub balance: i64,
    pub organization_id: &'static str,
    pub organization_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: &'static str,
    pub created_at: String,
}

pub fn check_credits(input: &CheckCreditsInput, now: DateTime<Utc>) -> CreditsReport {
    let transactions = input.include_transactions.then(|| {
        (0..input.limit)
            .map(|i| {
                let purchase = i % 2 == 0;
                Transaction {
                    id: format!("tx-{}", i + 1),
                    amount: if purchase { 100 } else { -50 },
                    kind: if purchase { "purchase" } else { "deduction" },
                    description: if purchase {
                        "Credit pack purchase"
                    } else {
                        "Text generation usage"
                    },
                    created_at: timestamp(now - ChronoDuration::days(i as i64)),
                }
            })
            .collect()
    });

    CreditsReport {
        balance: CREDIT_BALANCE,
        organization_id: ORGANIZATION_ID,
        organization_name: ORGANIZATION_NAME,
        transactions,
    }
}

pub fn handle_check_credits(
    ctx: &ToolContext<'_>,
    args: Map<String, Value>,
) -> Result<ToolResult> {
    let input: CheckCreditsInput = parse_args(args)?;
    json_result(&check_credits(&input, ctx.now))
}

// get_recent_usage

#[derive(Debug, Clone, Deserialize)]
pub struct RecentUsageInput {
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub model: &'static str,
    pub provider: &'static str,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_cost: u64,
    pub output_cost: u64,
    pub total_cost: u64,
    pub is_successful: bool,
    pub error_message: Option<&'static str>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub total_records: usize,
    pub total_cost: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub usage: Vec<UsageRecord>,
    pub summary: UsageSummary,
}

pub fn recent_usage(limit: usize, sampler: &dyn UsageSampler, now: DateTime<Utc>) -> UsageReport {
    let usage: Vec<UsageRecord> = (0..limit)
        .map(|i| {
            let input_tokens = sampler.sample(100, 1099);
            let output_tokens = sampler.sample(50, 549);
            let input_cost = sampler.sample(1, 10);
            let output_cost = sampler.sample(1, 5);
            let failed = i % 10 == 0;

            UsageRecord {
                id: format!("usage-{}", i + 1),
                kind: USAGE_TYPES[i % USAGE_TYPES.len()],
                model: USAGE_MODELS[i % USAGE_MODELS.len()],
                provider: if i % 3 == 2 { "anthropic" } else { "openai" },
                input_tokens,
                output_tokens,
                input_cost,
                output_cost,
                total_cost: input_cost + output_cost,
                is_successful: !failed,
                error_message: failed.then_some("Rate limit exceeded"),
                created_at: timestamp(now - ChronoDuration::hours(i as i64)),
            }
        })
        .collect();

    let total_cost = usage.iter().map(|r| r.total_cost).sum();
    UsageReport {
        summary: UsageSummary {
            total_records: usage.len(),
            total_cost,
        },
        usage,
    }
}

pub fn handle_get_recent_usage(
    ctx: &ToolContext<'_>,
    args: Map<String, Value>,
) -> Result<ToolResult> {
    let input: RecentUsageInput = parse_args(args)?;
    json_result(&recent_usage(input.limit, ctx.sampler, ctx.now))
}

// generate_text

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTextInput {
    pub prompt: String,
    pub model: String,
    pub max_length: usize,
}

/// Canned reply for `model`, cut to `max_length` characters. Unrecognised
/// models get the gpt-4o reply.
pub fn generate_text(prompt: &str, model: &str, max_length: usize) -> String {
    let response = match model {
        "gpt-4o-mini" => format!(
            "[GPT-4o-mini Mock Response]\n\nPrompt received: \"{prompt}\"\n\nThis lightweight model would provide faster, cost-effective responses for simpler tasks. Mock response demonstrates the structure and format."
        ),
        "claude-3-5-sonnet-20241022" => format!(
            "[Claude 3.5 Sonnet Mock Response]\n\nAnalyzing prompt: \"{prompt}\"\n\nClaude's response would emphasize thoughtful, nuanced answers with strong reasoning capabilities. This demo shows the integration pattern."
        ),
        "gemini-2.0-flash-exp" => format!(
            "[Gemini 2.0 Flash Mock Response]\n\nProcessing: \"{prompt}\"\n\nGoogle's Gemini would provide multimodal capabilities and fast inference. This is a structural demonstration."
        ),
        _ => format!(
            "[GPT-4o Mock Response]\n\nYour prompt: \"{prompt}\"\n\nThis is a demonstration response from the MCP inspector. In a production environment, this would connect to the actual {model} API and generate real content based on your prompt.\n\nKey features:\n- Streaming support\n- Token counting\n- Cost tracking\n- Error handling\n\nTo enable real generation, integrate with AI SDK Gateway or direct provider APIs."
        ),
    };

    response.chars().take(max_length).collect()
}

pub fn handle_generate_text(
    _ctx: &ToolContext<'_>,
    args: Map<String, Value>,
) -> Result<ToolResult> {
    let input: GenerateTextInput = parse_args(args)?;
    debug!(
        "generate_text: model={} max_length={}",
        input.model, input.max_length
    );
    Ok(ToolResult::text(generate_text(
        &input.prompt,
        &input.model,
        input.max_length,
    )))
}

// generate_image

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageInput {
    pub prompt: String,
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReport {
    pub message: &'static str,
    pub prompt: String,
    pub aspect_ratio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    pub mock_image_url: String,
    pub note: &'static str,
    pub estimated_cost: u64,
}

pub fn aspect_ratio_label(aspect_ratio: &str) -> Option<&'static str> {
    match aspect_ratio {
        "1:1" => Some("square composition"),
        "16:9" => Some("wide landscape composition"),
        "9:16" => Some("tall portrait composition"),
        "4:3" => Some("landscape composition"),
        "3:4" => Some("portrait composition"),
        _ => None,
    }
}

/// Characters a URI component keeps as-is besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Placeholder image URL carrying the first 50 characters of the prompt.
pub fn placeholder_image_url(prompt: &str) -> String {
    let preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
    format!(
        "{}?text={}",
        PLACEHOLDER_IMAGE_BASE,
        utf8_percent_encode(&preview, URI_COMPONENT)
    )
}

pub fn generate_image(prompt: &str, aspect_ratio: &str) -> ImageReport {
    ImageReport {
        message: "Image generation demo - mock response",
        prompt: prompt.to_string(),
        aspect_ratio: aspect_ratio.to_string(),
        description: aspect_ratio_label(aspect_ratio),
        mock_image_url: placeholder_image_url(prompt),
        note: "In production, this would generate a real image using Google Gemini 2.5 and upload to Vercel Blob storage",
        estimated_cost: IMAGE_ESTIMATED_COST,
    }
}

pub fn handle_generate_image(
    _ctx: &ToolContext<'_>,
    args: Map<String, Value>,
) -> Result<ToolResult> {
    let input: GenerateImageInput = parse_args(args)?;
    json_result(&generate_image(&input.prompt, &input.aspect_ratio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::sampler::MockUsageSampler;
    use crate::mcp::schema::InputSchema;
    use crate::mcp::tools::ToolSpec;
    use chrono::TimeZone;
    use mockall::predicate::eq;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn credits_without_transactions_omit_the_list() {
        let report = check_credits(
            &CheckCreditsInput {
                include_transactions: false,
                limit: 5,
            },
            now(),
        );
        assert!(report.transactions.is_none());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["balance"], json!(10000));
        assert_eq!(value["organizationId"], json!("demo-org-123"));
        assert!(value.get("transactions").is_none());
    }

    #[test]
    fn transactions_step_back_one_day_each() {
        let report = check_credits(
            &CheckCreditsInput {
                include_transactions: true,
                limit: 3,
            },
            now(),
        );
        let txs = report.transactions.unwrap();
        assert_eq!(txs[0].created_at, "2024-11-05T12:00:00.000Z");
        assert_eq!(txs[1].created_at, "2024-11-04T12:00:00.000Z");
        assert_eq!(txs[2].created_at, "2024-11-03T12:00:00.000Z");
        assert_eq!(txs[1].kind, "deduction");
        assert_eq!(txs[1].description, "Text generation usage");
    }

    #[test]
    fn usage_draws_four_samples_per_record_in_range_order() {
        let mut sampler = MockUsageSampler::new();
        sampler.expect_sample().with(eq(100), eq(1099)).times(2).return_const(500u64);
        sampler.expect_sample().with(eq(50), eq(549)).times(2).return_const(60u64);
        sampler.expect_sample().with(eq(1), eq(10)).times(2).return_const(7u64);
        sampler.expect_sample().with(eq(1), eq(5)).times(2).return_const(2u64);

        let report = recent_usage(2, &sampler, now());
        assert_eq!(report.summary.total_records, 2);
        assert_eq!(report.summary.total_cost, 18);
        assert_eq!(report.usage[0].total_cost, 9);
        assert_eq!(report.usage[1].input_tokens, 500);
    }

    #[test]
    fn usage_cycles_models_types_and_providers() {
        let mut sampler = MockUsageSampler::new();
        sampler.expect_sample().returning(|low, _| low);

        let report = recent_usage(4, &sampler, now());
        let models: Vec<_> = report.usage.iter().map(|r| r.model).collect();
        let kinds: Vec<_> = report.usage.iter().map(|r| r.kind).collect();
        let providers: Vec<_> = report.usage.iter().map(|r| r.provider).collect();
        assert_eq!(
            models,
            ["gpt-4o", "gpt-4o-mini", "claude-3-5-sonnet-20241022", "gpt-4o"]
        );
        assert_eq!(kinds, ["chat", "image", "chat", "image"]);
        assert_eq!(providers, ["openai", "openai", "anthropic", "openai"]);
        assert_eq!(report.usage[0].error_message, Some("Rate limit exceeded"));
        assert_eq!(report.usage[1].error_message, None);
        assert_eq!(report.usage[3].created_at, "2024-11-05T09:00:00.000Z");
    }

    #[test]
    fn failed_usage_serializes_null_error_for_successes() {
        let mut sampler = MockUsageSampler::new();
        sampler.expect_sample().returning(|low, _| low);

        let value = serde_json::to_value(recent_usage(2, &sampler, now())).unwrap();
        assert_eq!(value["usage"][0]["isSuccessful"], json!(false));
        assert_eq!(value["usage"][1]["errorMessage"], Value::Null);
        assert_eq!(value["summary"]["totalRecords"], json!(2));
    }

    #[test]
    fn generate_text_templates_per_model() {
        assert!(generate_text("hi", "gpt-4o-mini", 4000).starts_with("[GPT-4o-mini Mock Response]"));
        assert!(generate_text("hi", "claude-3-5-sonnet-20241022", 4000)
            .starts_with("[Claude 3.5 Sonnet Mock Response]"));
        assert!(generate_text("hi", "gemini-2.0-flash-exp", 4000)
            .starts_with("[Gemini 2.0 Flash Mock Response]"));
    }

    #[test]
    fn generate_text_falls_back_to_gpt_4o() {
        let text = generate_text("hello", "llama-9000", 4000);
        assert!(text.starts_with("[GPT-4o Mock Response]"));
        assert!(text.contains("the actual llama-9000 API"));
    }

    #[test]
    fn generate_text_truncates_on_characters() {
        let text = generate_text("héllo wörld", "gpt-4o", 10);
        assert_eq!(text.chars().count(), 10);
        assert_eq!(text, "[GPT-4o Mo");
    }

    #[test]
    fn image_url_embeds_only_the_first_fifty_characters() {
        let prompt = "a".repeat(80);
        let url = placeholder_image_url(&prompt);
        assert_eq!(
            url,
            format!("https://placehold.co/1024x1024/png?text={}", "a".repeat(50))
        );
    }

    #[test]
    fn image_url_encodes_the_prompt_as_a_uri_component() {
        let url = placeholder_image_url("it's (mostly) fine! 100% *wow* & ü");
        assert_eq!(
            url,
            "https://placehold.co/1024x1024/png?text=it's%20(mostly)%20fine!%20100%25%20*wow*%20%26%20%C3%BC"
        );
    }

    #[test]
    fn image_report_describes_the_aspect_ratio() {
        let report = generate_image("a red fox", "16:9");
        assert_eq!(report.description, Some("wide landscape composition"));
        assert_eq!(report.estimated_cost, 100);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["aspectRatio"], json!("16:9"));
        assert!(value["mockImageUrl"].as_str().unwrap().contains("text=a%20red%20fox"));
    }
    fn sleeps(_ctx: &ToolContext<'_>, _args: Map<String, Value>) -> Result<ToolResult> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(ToolResult::text("done".to_string()))
    }

    static SLOW: &[ToolSpec] = &[ToolSpec {
        name: "slow",
        description: "Takes half a second",
        schema: InputSchema::new(&[]),
        handler: sleeps,
    }];

    #[tokio::test]
    async fn overrunning_handler_hits_the_deadline() {
        let server = Arc::new(MockToolServer::with_tools(SLOW));
        let started = std::time::Instant::now();

        let err = handle_tool_call(server, "slow", json!({}), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout(d) if d == Duration::from_millis(50)));
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn handler_within_the_deadline_completes() {
        let server = Arc::new(MockToolServer::with_tools(SLOW));
        let result = handle_tool_call(server, "slow", Value::Null, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result.first_text(), Some("done"));
        assert!(!result.is_error);
    }
}
