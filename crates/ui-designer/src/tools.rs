//! MCP tool catalogue and dispatch.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use uid_core::{DesignerError, OperationKind};
use uid_gemini::{GenerateContentRequest, GenerationConfig, Part, resolve_image};

use crate::context::ToolContext;
use crate::gem_tools;
use crate::prompts;

pub(crate) const GENERATE_UI_DESIGN: &str = "generate_ui_design";
pub(crate) const DESIGN_TO_CODE: &str = "design_to_code";
pub(crate) const ANALYZE_DESIGN: &str = "analyze_design";
pub(crate) const GENERATE_COMPONENT: &str = "generate_component";
pub(crate) const CREATE_CUSTOM_GEM: &str = "create_custom_gem";
pub(crate) const REGENERATE_GEM: &str = "regenerate_gem";
pub(crate) const SHOW_GEM_CONFIG: &str = "show_gem_config";

const IMAGE_DATA_DESCRIPTION: &str =
    "Image file path (supports all common image formats), base64 encoded image data, or image URL";

const NO_IMAGE_NOTE: &str = "\n\n*Note: Image generation was not available. The design specifications above describe the intended UI.*\n";

/// MCP Tool Definition
#[derive(Debug, Serialize)]
pub(crate) struct McpToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl McpToolDef {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

pub(crate) fn tool_definitions() -> Vec<McpToolDef> {
    vec![
        McpToolDef::new(
            GENERATE_UI_DESIGN,
            "Generate UI design mockup and recommendations based on description",
            json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Description of the UI to design"
                    },
                    "style": {
                        "type": "string",
                        "description": "Design style (e.g., modern, minimal, glassmorphism, neumorphism, material, brutalist, etc.)"
                    },
                    "colorScheme": {
                        "type": "string",
                        "description": "Color scheme preference (e.g., light, dark, auto, high-contrast, etc.)"
                    },
                    "framework": {
                        "type": "string",
                        "description": "UI framework preference (e.g., generic, material-ui, ant-design, chakra-ui, bootstrap, etc.)"
                    }
                },
                "required": ["description"]
            }),
        ),
        McpToolDef::new(
            DESIGN_TO_CODE,
            "Convert design screenshot or mockup to production-ready code",
            json!({
                "type": "object",
                "properties": {
                    "imageData": {"type": "string", "description": IMAGE_DATA_DESCRIPTION},
                    "targetFramework": {
                        "type": "string",
                        "description": "Target framework for code generation (e.g., html-css, react, nextjs, vue, svelte, angular, solid, qwik, etc.)"
                    },
                    "styling": {
                        "type": "string",
                        "description": "Styling approach (e.g., css, tailwind, styled-components, css-modules, scss, emotion, vanilla-extract, etc.)"
                    },
                    "includeAccessibility": {
                        "type": "boolean",
                        "description": "Include accessibility attributes",
                        "default": true
                    }
                },
                "required": ["imageData", "targetFramework", "styling"]
            }),
        ),
        McpToolDef::new(
            ANALYZE_DESIGN,
            "Analyze design for accessibility, design system compliance, or specific aspects",
            json!({
                "type": "object",
                "properties": {
                    "imageData": {"type": "string", "description": IMAGE_DATA_DESCRIPTION},
                    "analysisType": {
                        "type": "string",
                        "description": "Type of analysis to perform (e.g., accessibility, design-system, layout, colors, typography, spacing, performance, etc.)"
                    }
                },
                "required": ["imageData", "analysisType"]
            }),
        ),
        McpToolDef::new(
            GENERATE_COMPONENT,
            "Generate a specific UI component with code",
            json!({
                "type": "object",
                "properties": {
                    "componentType": {
                        "type": "string",
                        "description": "Type of component (button, card, form, navbar, etc.)"
                    },
                    "framework": {
                        "type": "string",
                        "description": "Framework to use (e.g., react, vue, nextjs, svelte, web-component, solid, etc.)"
                    },
                    "styling": {
                        "type": "string",
                        "description": "Styling approach (e.g., css, tailwind, styled-components, css-modules, emotion, etc.)"
                    },
                    "props": {
                        "type": "object",
                        "description": "Component properties and configuration"
                    }
                },
                "required": ["componentType", "framework", "styling"]
            }),
        ),
        McpToolDef::new(
            CREATE_CUSTOM_GEM,
            "Create or update a custom Gemini Gem trained on your design system, codebase, and steering files",
            json!({
                "type": "object",
                "properties": {
                    "designSystemFiles": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Paths to design system files to include"
                    },
                    "codebaseExamples": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Paths to example code files from your codebase"
                    },
                    "customInstructions": {
                        "type": "string",
                        "description": "Additional custom instructions for the Gem"
                    },
                    "gemName": {
                        "type": "string",
                        "description": "Name for the custom Gem",
                        "default": gem_tools::DEFAULT_GEM_NAME
                    },
                    "autoDetect": {
                        "type": "boolean",
                        "description": "Automatically detect design system and code files",
                        "default": true
                    }
                }
            }),
        ),
        McpToolDef::new(
            REGENERATE_GEM,
            "Regenerate your custom Gemini Gem (use after design system changes, rebranding, or tech stack updates)",
            json!({
                "type": "object",
                "properties": {
                    "reason": {
                        "type": "string",
                        "description": "Reason for regeneration (e.g., 'rebranding', 'tech switch', 'design system update')"
                    }
                }
            }),
        ),
        McpToolDef::new(
            SHOW_GEM_CONFIG,
            "Show the current custom Gem configuration",
            json!({"type": "object", "properties": {}}),
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateUiDesignArgs {
    description: String,
    style: Option<String>,
    color_scheme: Option<String>,
    framework: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DesignToCodeArgs {
    image_data: String,
    target_framework: String,
    styling: String,
    #[serde(default = "default_true")]
    include_accessibility: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeDesignArgs {
    image_data: String,
    analysis_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateComponentArgs {
    component_type: String,
    framework: String,
    styling: String,
    props: Option<Value>,
}

pub(crate) fn default_true() -> bool {
    true
}

/// Deserialize tool arguments. A missing `arguments` object counts as `{}`.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| {
        DesignerError::InvalidArguments {
            tool: tool.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

pub(crate) fn text_content(text: impl Into<String>) -> Value {
    json!({"type": "text", "text": text.into()})
}

/// Run one tool and wrap the outcome as an MCP `tools/call` result.
///
/// Failures never escape: they become `isError: true` results carrying
/// `Error: <message>`.
pub(crate) async fn call_tool(ctx: &ToolContext, name: &str, arguments: Value) -> Value {
    debug!(tool = name, "Tool call");
    match dispatch(ctx, name, arguments).await {
        Ok(content) => json!({ "content": content }),
        Err(e) => {
            warn!(tool = name, "Tool failed: {e:#}");
            json!({
                "content": [text_content(format!("Error: {e:#}"))],
                "isError": true
            })
        }
    }
}

async fn dispatch(ctx: &ToolContext, name: &str, arguments: Value) -> Result<Vec<Value>> {
    match name {
        GENERATE_UI_DESIGN => generate_ui_design(ctx, parse_args(name, arguments)?).await,
        DESIGN_TO_CODE => {
            let args: DesignToCodeArgs = parse_args(name, arguments)?;
            let prompt = prompts::design_to_code(
                &args.target_framework,
                &args.styling,
                args.include_accessibility,
            );
            image_prompt(ctx, prompt, &args.image_data).await
        }
        ANALYZE_DESIGN => {
            let args: AnalyzeDesignArgs = parse_args(name, arguments)?;
            image_prompt(ctx, prompts::analysis(&args.analysis_type), &args.image_data).await
        }
        GENERATE_COMPONENT => {
            let args: GenerateComponentArgs = parse_args(name, arguments)?;
            let prompt = prompts::component(
                &args.component_type,
                &args.framework,
                &args.styling,
                args.props.as_ref(),
            );
            let text = ctx
                .generate_text(OperationKind::Text, GenerateContentRequest::from_prompt(prompt))
                .await?;
            Ok(vec![text_content(text)])
        }
        CREATE_CUSTOM_GEM => {
            let text = gem_tools::create_custom_gem(ctx, parse_args(name, arguments)?).await?;
            Ok(vec![text_content(text)])
        }
        REGENERATE_GEM => {
            let text = gem_tools::regenerate_gem(ctx, parse_args(name, arguments)?).await?;
            Ok(vec![text_content(text)])
        }
        SHOW_GEM_CONFIG => Ok(vec![text_content(gem_tools::show_gem_config(ctx)?)]),
        _ => Err(DesignerError::UnknownTool(name.to_string()).into()),
    }
}

async fn generate_ui_design(ctx: &ToolContext, args: GenerateUiDesignArgs) -> Result<Vec<Value>> {
    let project_context = ctx.gems().project_context();
    let prompt = prompts::ui_design(&prompts::UiDesignPrompt {
        description: &args.description,
        style: args.style.as_deref(),
        color_scheme: args.color_scheme.as_deref(),
        framework: args.framework.as_deref(),
        project_context: &project_context,
    });

    let request = GenerateContentRequest::from_prompt(prompt)
        .with_config(GenerationConfig::image_generation());
    let response = ctx.generate_image(request).await?;

    let mut content = Vec::new();
    let mut has_image = false;
    for candidate in &response.candidates {
        let parts = candidate.content.iter().flat_map(|c| c.parts.iter());
        for part in parts {
            if let Some(text) = part.text.as_deref().filter(|t| !t.is_empty()) {
                content.push(text_content(text));
            }
            if let Some(blob) = &part.inline_data {
                has_image = true;
                let mime = if blob.mime_type.is_empty() {
                    "image/png"
                } else {
                    blob.mime_type.as_str()
                };
                content.push(text_content(format!(
                    "\n\n![Generated UI Design](data:{mime};base64,{})\n\n",
                    blob.data
                )));
            }
        }
    }

    if !has_image {
        content.push(text_content(NO_IMAGE_NOTE));
    }
    Ok(content)
}

/// Prompt plus the user's image, answered as text by the image model.
async fn image_prompt(ctx: &ToolContext, prompt: String, image_data: &str) -> Result<Vec<Value>> {
    let image = resolve_image(image_data).await?;
    let request = GenerateContentRequest::from_parts(vec![Part::text(prompt), image]);
    let text = ctx.generate_text(OperationKind::Image, request).await?;
    Ok(vec![text_content(text)])
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
