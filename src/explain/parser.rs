//! Split collaborator text into the three explanation sections.

/// Section headers, in the order they must appear.
pub const ROLE_MARKER: &str = "### Role";
pub const MECHANISM_MARKER: &str = "### Mechanism";
pub const IMPORTANCE_MARKER: &str = "### Importance";

/// Prefix the collaborator uses when it reports its own failure as content.
pub const ERROR_SENTINEL: &str = "An error occurred";

/// Stands in for sections that could not be extracted.
pub const PLACEHOLDER: &str = "Could not parse.";

/// Shown next to a fallback explanation.
pub const FORMAT_WARNING: &str =
    "The AI response was not in the expected format. Displaying raw text.";

/// A structured explanation. Every field is non-empty.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Explanation {
    pub role: String,
    pub mechanism: String,
    pub importance: String,
}

impl Explanation {
    /// Degraded form: the whole text as the role, placeholders elsewhere.
    pub fn fallback(raw: &str) -> Self {
        Self {
            role: raw.to_string(),
            mechanism: PLACEHOLDER.to_string(),
            importance: PLACEHOLDER.to_string(),
        }
    }
}

/// Result of parsing one response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Parsed {
    /// All three sections were found.
    Explanation(Explanation),
    /// Headers missing or out of order; the raw text is kept.
    Fallback {
        explanation: Explanation,
        warning: &'static str,
    },
    /// The text is an error report, to be shown verbatim.
    Sentinel(String),
}

/// Text after `marker`, searching from `from`. Returns `(body_start, marker_start)`.
fn find_marker(text: &str, marker: &str, from: usize) -> Option<(usize, usize)> {
    text[from..]
        .find(marker)
        .map(|i| (from + i + marker.len(), from + i))
}

fn sections(text: &str) -> Option<Explanation> {
    let (role_at, _) = find_marker(text, ROLE_MARKER, 0)?;
    let (mech_at, role_end) = find_marker(text, MECHANISM_MARKER, role_at)?;
    let (imp_at, mech_end) = find_marker(text, IMPORTANCE_MARKER, mech_at)?;

    let role = text[role_at..role_end].trim();
    let mechanism = text[mech_at..mech_end].trim();
    let importance = text[imp_at..].trim();
    if role.is_empty() || mechanism.is_empty() || importance.is_empty() {
        return None;
    }

    Some(Explanation {
        role: role.to_string(),
        mechanism: mechanism.to_string(),
        importance: importance.to_string(),
    })
}

/// Parse `text`. Never fails: malformed input degrades to [`Parsed::Fallback`].
pub fn parse_explanation(text: &str) -> Parsed {
    if text.trim_start().starts_with(ERROR_SENTINEL) {
        return Parsed::Sentinel(text.trim().to_string());
    }
    match sections(text) {
        Some(explanation) => Parsed::Explanation(explanation),
        None => {
            tracing::warn!(len = text.len(), "explanation headers missing, using raw text");
            Parsed::Fallback {
                explanation: Explanation::fallback(text),
                warning: FORMAT_WARNING,
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/explain/parser.rs"]
mod tests;
