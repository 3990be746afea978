//! Prompt builder for rendering templates with budgeted context.

use crate::budget::ContextBudget;
use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, CONTEXT_VAR, QUESTION_VAR};
use finqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde_json::json;

/// Build a prompt from a definition, a question and ranked context chunks.
///
/// This function:
/// 1. Joins the chunk texts with a single space in rank order
/// 2. Cuts the joined context to the token budget
/// 3. Renders the template with `context` and `question` bound
///
/// # Example
/// ```no_run
/// use finqa_prompt::{build_prompt, ContextBudget, PromptDefinition};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let budget = ContextBudget::new(480)?;
/// let chunks = vec!["total net sales $ 1,000 $ 2,000".to_string()];
/// let built = build_prompt(&PromptDefinition::default(), "What were net sales?", &chunks, &budget)?;
/// println!("{}", built.text);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    question: &str,
    chunks: &[String],
    budget: &ContextBudget,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let joined = chunks.join(" ");
    let context = budget.truncate(&joined)?;

    if context.truncated {
        tracing::info!(
            "Context truncated to {} tokens ({} chunks joined)",
            context.tokens,
            chunks.len()
        );
    }

    let text = render_template(&definition.template, &context.text, question)?;

    Ok(BuiltPrompt {
        text,
        context: context.text,
        metadata: BuiltPromptMetadata {
            prompt_id: definition.id.clone(),
            context_tokens: context.tokens,
            truncated: context.truncated,
        },
    })
}

/// Render a Handlebars template with the context and question bound.
fn render_template(template: &str, context: &str, question: &str) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output; unknown variables are errors
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let data = json!({
        CONTEXT_VAR: context,
        QUESTION_VAR: question,
    });

    handlebars
        .render("prompt", &data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
