//! Prompt text sent to Gemini by each tool.

use serde_json::Value;

pub(crate) struct UiDesignPrompt<'a> {
    pub description: &'a str,
    pub style: Option<&'a str>,
    pub color_scheme: Option<&'a str>,
    pub framework: Option<&'a str>,
    pub project_context: &'a str,
}

pub(crate) fn ui_design(p: &UiDesignPrompt<'_>) -> String {
    format!(
        "Create a professional UI design mockup for:

{description}

Style: {style}
Color Scheme: {color_scheme}
Framework: {framework}
{context}

Generate a high-fidelity UI mockup image showing:
- Complete layout with all UI components
- Proper spacing and alignment
- Color scheme applied
- Typography hierarchy
- Interactive elements (buttons, forms, navigation)
- Responsive design considerations

Also provide a detailed design specification including:
1. Layout structure and component hierarchy
2. Color palette with hex codes
3. Typography recommendations
4. Spacing and sizing guidelines
5. Interactive element states
6. Accessibility considerations",
        description = p.description,
        style = non_empty(p.style).unwrap_or("modern"),
        color_scheme = non_empty(p.color_scheme).unwrap_or("light"),
        framework = non_empty(p.framework).unwrap_or("generic"),
        context = p.project_context,
    )
}

pub(crate) fn design_to_code(framework: &str, styling: &str, accessibility: bool) -> String {
    let a11y = if accessibility {
        "Include ARIA labels and accessibility attributes"
    } else {
        ""
    };
    format!(
        "You are an expert frontend developer. Convert this design to {framework} code using {styling}.

Requirements:
- Generate clean, production-ready code
- Use semantic HTML elements
- {a11y}
- Match the design pixel-perfect
- Extract and use design tokens (colors, spacing, typography)
- Make it responsive
- Include comments explaining key decisions

Provide the complete code with file structure."
    )
}

/// Fixed prompt for a known analysis type, else a generic one naming the focus.
pub(crate) fn analysis(analysis_type: &str) -> String {
    let known = match analysis_type {
        "accessibility" => {
            "Analyze this design for WCAG 2.1 AA compliance. Check color contrast, text sizing, interactive element sizing, keyboard navigation, screen reader compatibility, and provide specific recommendations."
        }
        "design-system" => {
            "Analyze this design and identify the design system patterns used. Extract design tokens, component patterns, and suggest improvements for consistency."
        }
        "layout" => {
            "Analyze the layout structure, grid system, spacing patterns, and responsive design considerations. Provide recommendations for improvement."
        }
        "colors" => {
            "Extract the color palette, analyze color harmony, contrast ratios, and suggest improvements or alternatives."
        }
        "typography" => {
            "Analyze typography choices including font families, sizes, weights, line heights, and hierarchy. Provide recommendations."
        }
        "spacing" => {
            "Analyze spacing patterns, padding, margins, and white space usage. Identify the spacing scale and suggest improvements."
        }
        "performance" => {
            "Analyze the design for performance considerations including image optimization, lazy loading opportunities, and rendering efficiency."
        }
        other => {
            return format!(
                "Analyze this design focusing on: {other}. Provide detailed insights and recommendations."
            );
        }
    };
    known.to_string()
}

pub(crate) fn component(
    component_type: &str,
    framework: &str,
    styling: &str,
    props: Option<&Value>,
) -> String {
    let props = props
        .and_then(|p| serde_json::to_string_pretty(p).ok())
        .unwrap_or_else(|| "{}".to_string());
    format!(
        "Generate a {component_type} component in {framework} using {styling}.

Component specifications:
{props}

Requirements:
- Follow {framework} best practices
- Use TypeScript if applicable
- Include prop types/interfaces
- Make it reusable and customizable
- Add JSDoc comments
- Include usage examples
- Consider accessibility
- Make it responsive

Provide complete, production-ready code."
    )
}

pub(crate) struct GemPrompt<'a> {
    pub gem_name: &'a str,
    pub steering: &'a str,
    pub design_system: &'a str,
    pub codebase: &'a str,
    pub custom_instructions: Option<&'a str>,
    pub design_system_files: &'a [String],
    pub codebase_examples: &'a [String],
}

pub(crate) fn gem(p: &GemPrompt<'_>) -> String {
    let or_default = |text: &str, fallback: &str| {
        if text.is_empty() {
            fallback.to_string()
        } else {
            text.to_string()
        }
    };
    let list = |files: &[String]| or_default(&files.join(", "), "none");

    format!(
        "You are an AI assistant helping to create a custom Gemini Gem configuration for UI design and code generation.

Based on the following information, generate a comprehensive Gem configuration including:
1. System instructions for the Gem
2. Training examples (prompt/response pairs)
3. Knowledge base content
4. Recommended settings

**Gem Name:** {gem_name}

**Steering Files (Best Practices):**
{steering}

**Design System Files:**
{design_system}

**Codebase Examples:**
{codebase}

**Custom Instructions:**
{instructions}

**Auto-detected files:**
- Design system files: {ds_files}
- Code examples: {code_files}

Generate a complete Gem configuration that includes:

1. **System Instructions**: Comprehensive instructions for the Gem that incorporate the steering files, design system, and coding patterns from the examples.

2. **Training Examples**: At least 5 example prompt/response pairs that demonstrate:
   - Generating UI designs in the user's style
   - Converting designs to code using their patterns
   - Analyzing designs according to their standards
   - Generating components following their conventions

3. **Knowledge Base**: Structured knowledge from the steering files and design system.

4. **Implementation Guide**: Step-by-step instructions for creating this Gem in Google AI Studio.

5. **Testing Prompts**: 5 prompts to test the Gem after creation.

Format the output as a comprehensive guide that the user can follow to create their custom Gem.",
        gem_name = p.gem_name,
        steering = p.steering,
        design_system = or_default(p.design_system, "No design system files provided"),
        codebase = or_default(p.codebase, "No codebase examples provided"),
        instructions = non_empty(p.custom_instructions).unwrap_or("None provided"),
        ds_files = list(p.design_system_files),
        code_files = list(p.codebase_examples),
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
