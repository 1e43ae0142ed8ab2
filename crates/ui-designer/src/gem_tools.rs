//! Custom gem tools: create, regenerate and show the saved gem configuration.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use uid_config::{GemConfig, auto_detect_files, project_name, read_file_sections, read_steering};
use uid_core::OperationKind;
use uid_gemini::GenerateContentRequest;

use crate::context::ToolContext;
use crate::prompts;
use crate::tools::default_true;

pub(crate) const DEFAULT_GEM_NAME: &str = "UI Designer Pro";

const CONFIG_FILE_DISPLAY: &str = ".kiro/gem-config.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateGemArgs {
    #[serde(default)]
    design_system_files: Vec<String>,
    #[serde(default)]
    codebase_examples: Vec<String>,
    custom_instructions: Option<String>,
    #[serde(default = "default_gem_name")]
    gem_name: String,
    #[serde(default = "default_true")]
    auto_detect: bool,
}

fn default_gem_name() -> String {
    DEFAULT_GEM_NAME.to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegenerateGemArgs {
    reason: Option<String>,
}

struct GemOutcome {
    response: String,
    gem_name: String,
    steering_found: bool,
    design_system_count: usize,
    code_example_count: usize,
}

impl GemOutcome {
    fn files_analyzed(&self) -> String {
        format!(
            "**Files Analyzed:**\n- Steering files: {}\n- Design system files: {}\n- Code examples: {}",
            if self.steering_found { "✅" } else { "❌" },
            self.design_system_count,
            self.code_example_count,
        )
    }
}

/// Gather project material, ask Gemini for a gem setup guide, then persist
/// the inputs so the gem can be regenerated later.
async fn generate_gem_configuration(ctx: &ToolContext, args: CreateGemArgs) -> Result<GemOutcome> {
    let root = ctx.root();
    let mut design_system_files = args.design_system_files;
    let mut codebase_examples = args.codebase_examples;

    if args.auto_detect {
        let detected = auto_detect_files(root);
        if design_system_files.is_empty() {
            design_system_files = detected.design_system_files;
        }
        if codebase_examples.is_empty() {
            codebase_examples = detected.codebase_examples;
        }
    }

    let project = project_name(root);
    let gem_name = if args.gem_name.is_empty() {
        format!("{DEFAULT_GEM_NAME} - {project}")
    } else {
        args.gem_name
    };

    let steering = read_steering(root);
    let design_system = read_file_sections(root, &design_system_files, false);
    let codebase = read_file_sections(root, &codebase_examples, true);

    let prompt = prompts::gem(&prompts::GemPrompt {
        gem_name: &gem_name,
        steering: &steering,
        design_system: &design_system,
        codebase: &codebase,
        custom_instructions: args.custom_instructions.as_deref(),
        design_system_files: &design_system_files,
        codebase_examples: &codebase_examples,
    });

    let response = ctx
        .generate_text(OperationKind::Text, GenerateContentRequest::from_prompt(prompt))
        .await?;

    let outcome = GemOutcome {
        response,
        gem_name: gem_name.clone(),
        steering_found: !steering.is_empty(),
        design_system_count: design_system_files.len(),
        code_example_count: codebase_examples.len(),
    };

    ctx.gems().save(&GemConfig {
        gem_name,
        design_system_files,
        codebase_examples,
        custom_instructions: args.custom_instructions,
        generated_at: Utc::now(),
        project_name: project,
    })?;
    info!(gem = %outcome.gem_name, "Saved gem configuration");

    Ok(outcome)
}

pub(crate) async fn create_custom_gem(ctx: &ToolContext, args: CreateGemArgs) -> Result<String> {
    let outcome = generate_gem_configuration(ctx, args).await?;
    Ok(format!(
        "# Custom Gem Configuration Generated! 🎉

**Gem Name:** {gem_name}

{files}

---

{response}

---

**💾 Configuration Saved**

Your Gem configuration has been saved to `{CONFIG_FILE_DISPLAY}`.

You can regenerate this Gem anytime by running:
```
Regenerate my custom Gem
```

This is useful after:
- Design system changes
- Rebranding
- Tech stack updates
- Adding new components or patterns
",
        gem_name = outcome.gem_name,
        files = outcome.files_analyzed(),
        response = outcome.response,
    ))
}

pub(crate) async fn regenerate_gem(ctx: &ToolContext, args: RegenerateGemArgs) -> Result<String> {
    let Some(saved) = ctx.gems().load()? else {
        return Ok(NO_PREVIOUS_CONFIG.to_string());
    };

    let previous = saved.generated_at;
    let outcome = generate_gem_configuration(
        ctx,
        CreateGemArgs {
            design_system_files: saved.design_system_files,
            codebase_examples: saved.codebase_examples,
            custom_instructions: saved.custom_instructions,
            gem_name: saved.gem_name,
            // Re-detect in case files were added since the last run.
            auto_detect: true,
        },
    )
    .await?;

    Ok(format!(
        "# Custom Gem Regenerated! 🔄

**Reason:** {reason}
**Gem Name:** {gem_name}
**Previous Generation:** {previous}
**Current Generation:** {current}

{files}

---

{response}

---

**💾 Configuration Updated**

Your Gem configuration has been updated in `{CONFIG_FILE_DISPLAY}`.

**Next Steps:**
1. Copy the configuration above
2. Go to [Google AI Studio](https://aistudio.google.com/)
3. Update your existing Gem or create a new one
4. Test with the provided prompts

**When to Regenerate:**
- After design system changes
- After rebranding
- After tech stack updates
- When adding new components or patterns
- When updating coding standards
",
        reason = args
            .reason
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or("Manual regeneration"),
        gem_name = outcome.gem_name,
        previous = format_timestamp(previous),
        current = format_timestamp(Utc::now()),
        files = outcome.files_analyzed(),
        response = outcome.response,
    ))
}

pub(crate) fn show_gem_config(ctx: &ToolContext) -> Result<String> {
    let Some(saved) = ctx.gems().load()? else {
        return Ok(NO_CONFIG.to_string());
    };

    Ok(format!(
        "# Custom Gem Configuration

**Gem Name:** {gem_name}
**Project:** {project}
**Created:** {created}

## Design System Files ({ds_count})
{ds_list}

## Code Examples ({code_count})
{code_list}

**Configuration File:** `{CONFIG_FILE_DISPLAY}`

**To regenerate:** Type \"Regenerate my custom Gem\"
",
        gem_name = saved.gem_name,
        project = saved.project_name,
        created = format_timestamp(saved.generated_at),
        ds_count = saved.design_system_files.len(),
        ds_list = bullet_list(&saved.design_system_files),
        code_count = saved.codebase_examples.len(),
        code_list = bullet_list(&saved.codebase_examples),
    ))
}

fn bullet_list(files: &[String]) -> String {
    if files.is_empty() {
        return "None detected".to_string();
    }
    files
        .iter()
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

const NO_CONFIG: &str = "# No Gem Configuration Found

No custom Gem configuration exists yet.

**To create it:**
```
Create my custom Gemini Gem
```
";

const NO_PREVIOUS_CONFIG: &str = "# No Previous Gem Configuration Found

It looks like you haven't created a custom Gem yet, or the configuration file is missing.

**To create it now:**
```
Create my custom Gemini Gem
```

This will automatically:
- Scan your steering files
- Detect your design system files
- Analyze your component examples
- Generate a complete Gem configuration
- Save it for future regeneration

**Or check if configuration exists:**
```
Show my Gem configuration
```
";
