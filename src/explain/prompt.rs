use crate::generate::{GenerationRequest, SamplingParams};
use crate::stages::catalog::Stage;

/// Build the explanation prompt for `stage`. Only the title varies.
pub fn explanation_prompt(stage: &Stage) -> String {
    format!(
        "You are a blockchain expert specializing in the Solana architecture. \
Provide a detailed but clear technical explanation of the '{title}' component/process in the Solana architecture.\n\
Your explanation should be easy for a developer to understand. \
Structure your response into three sections with these exact headings: '### Role', '### Mechanism', and '### Importance'.\n\
For the '### Mechanism' section, use a bulleted list (using hyphens) to explain the key steps or components involved.\n\
Do not use markdown formatting like backticks or asterisks for bolding. Just plain text.",
        title = stage.title
    )
}

/// Prompt plus sampling for `stage`.
pub fn explanation_request(stage: &Stage, sampling: SamplingParams) -> GenerationRequest {
    GenerationRequest {
        prompt: explanation_prompt(stage),
        sampling,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/explain/prompt.rs"]
mod tests;
