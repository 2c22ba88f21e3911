use anyhow::Result;
use serde_json::{Map, Value};

use crate::protocol::mcp::{ToolDefinition, ToolResult};

use super::handlers::{
    handle_check_credits, handle_generate_image, handle_generate_text, handle_get_recent_usage,
    ToolContext,
};
use super::schema::{DefaultValue, FieldKind, FieldSpec, InputSchema};

pub type ToolHandler = fn(&ToolContext<'_>, Map<String, Value>) -> Result<ToolResult>;

/// One registered tool: its schema and handler travel together.
#[derive(Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: InputSchema,
    pub handler: ToolHandler,
}

impl ToolSpec {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.schema.to_json_schema(),
        }
    }
}

pub const TEXT_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "claude-3-5-sonnet-20241022",
    "gemini-2.0-flash-exp",
];

pub const ASPECT_RATIOS: &[&str] = &["1:1", "16:9", "9:16", "4:3", "3:4"];

pub const CHECK_CREDITS: InputSchema = InputSchema::new(&[
    FieldSpec::optional(
        "includeTransactions",
        "Include recent transactions in the response",
        FieldKind::Boolean,
        DefaultValue::Bool(false),
    ),
    FieldSpec::optional(
        "limit",
        "Number of recent transactions to include",
        FieldKind::Integer { min: 1, max: 20 },
        DefaultValue::Int(5),
    ),
]);

pub const GET_RECENT_USAGE: InputSchema = InputSchema::new(&[FieldSpec::optional(
    "limit",
    "Number of recent usage records to fetch",
    FieldKind::Integer { min: 1, max: 50 },
    DefaultValue::Int(10),
)]);

pub const GENERATE_TEXT: InputSchema = InputSchema::new(&[
    FieldSpec::required(
        "prompt",
        "The text prompt to generate from",
        FieldKind::String { min_len: 1 },
    ),
    FieldSpec::optional(
        "model",
        "The AI model to use for generation",
        FieldKind::Enum(TEXT_MODELS),
        DefaultValue::Str("gpt-4o"),
    ),
    FieldSpec::optional(
        "maxLength",
        "Maximum length of generated text",
        FieldKind::Integer { min: 1, max: 4000 },
        DefaultValue::Int(1000),
    ),
]);

pub const GENERATE_IMAGE: InputSchema = InputSchema::new(&[
    FieldSpec::required(
        "prompt",
        "Description of the image to generate",
        FieldKind::String { min_len: 1 },
    ),
    FieldSpec::optional(
        "aspectRatio",
        "Aspect ratio for the generated image",
        FieldKind::Enum(ASPECT_RATIOS),
        DefaultValue::Str("1:1"),
    ),
]);

pub static TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "check_credits",
        description: "Check credit balance and recent transactions for your organization",
        schema: CHECK_CREDITS,
        handler: handle_check_credits,
    },
    ToolSpec {
        name: "get_recent_usage",
        description: "Get recent API usage statistics including models used, costs, and tokens",
        schema: GET_RECENT_USAGE,
        handler: handle_get_recent_usage,
    },
    ToolSpec {
        name: "generate_text",
        description: "Generate text using AI models (GPT-4, Claude, Gemini). This is a demo version that returns mock responses.",
        schema: GENERATE_TEXT,
        handler: handle_generate_text,
    },
    ToolSpec {
        name: "generate_image",
        description: "Generate images using Google Gemini 2.5. This is a demo version that returns mock image URLs.",
        schema: GENERATE_IMAGE,
        handler: handle_generate_image,
    },
];

pub fn get_tools() -> Vec<ToolDefinition> {
    TOOLS.iter().map(ToolSpec::definition).collect()
}
