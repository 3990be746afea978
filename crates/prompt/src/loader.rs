//! Prompt loader for YAML prompt definitions.

use crate::types::{PromptDefinition, CONTEXT_VAR, QUESTION_VAR};
use finqa_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition from a YAML file.
///
/// # Example
/// ```no_run
/// use finqa_prompt::load_prompt_file;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt_file(Path::new("prompts/answer.yml"))?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt_file(path: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!("Prompt file not found: {:?}", path)));
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e)))?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", path, e)))?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Resolve the prompt to use: the file when configured, else the built-in one.
pub fn resolve_prompt(path: Option<&Path>) -> AppResult<PromptDefinition> {
    match path {
        Some(path) => load_prompt_file(path),
        None => Ok(PromptDefinition::default_answer()),
    }
}

/// Validate a prompt definition.
pub fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    for var in [CONTEXT_VAR, QUESTION_VAR] {
        if !def.template.contains(&format!("{{{{{}}}}}", var)) {
            return Err(AppError::Prompt(format!(
                "Prompt template must reference {{{{{}}}}}",
                var
            )));
        }
    }

    Ok(())
}
