//! What the explanation panel shows, derived from selection and request outcome.

use crate::explain::flow::RequestOutcome;
use crate::explain::parser::Explanation;
use crate::stages::catalog::StageId;

/// Rendering of the mechanism section.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum MechanismView {
    List(Vec<String>),
    Paragraph(String),
}

impl MechanismView {
    /// A list when any line starts with `- `, else one paragraph.
    ///
    /// Each `- ` line opens an item; other non-blank lines continue the current one.
    pub fn from_text(text: &str) -> Self {
        let lines = || text.lines().map(str::trim);
        if !lines().any(|l| l.starts_with("- ")) {
            return Self::Paragraph(text.trim().to_string());
        }

        let mut items: Vec<String> = Vec::new();
        for line in lines().filter(|l| !l.is_empty()) {
            if let Some(item) = line.strip_prefix("- ") {
                items.push(item.trim().to_string());
            } else if let Some(last) = items.last_mut() {
                last.push(' ');
                last.push_str(line);
            } else {
                items.push(line.to_string());
            }
        }
        items.retain(|item| !item.is_empty());
        Self::List(items)
    }
}

/// The panel's content for one frame.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum PanelView {
    /// Nothing selected yet.
    Welcome,
    Loading {
        title: &'static str,
    },
    Error {
        message: String,
    },
    Explanation {
        title: &'static str,
        role: String,
        mechanism: MechanismView,
        importance: String,
        warning: Option<String>,
    },
}

impl PanelView {
    pub fn derive(selected: Option<StageId>, outcome: &RequestOutcome) -> Self {
        let Some(stage) = selected else {
            return Self::Welcome;
        };
        let title = stage.stage().title;
        match outcome {
            RequestOutcome::Idle => Self::Welcome,
            RequestOutcome::Loading { .. } => Self::Loading { title },
            RequestOutcome::Failed { failure, .. } => Self::Error {
                message: failure.message.clone(),
            },
            RequestOutcome::Parsed { explanation, .. } => Self::explanation(title, explanation, None),
            RequestOutcome::ParseFallback {
                explanation,
                warning,
                ..
            } => Self::explanation(title, explanation, Some(warning.to_string())),
        }
    }

    fn explanation(title: &'static str, e: &Explanation, warning: Option<String>) -> Self {
        Self::Explanation {
            title,
            role: e.role.clone(),
            mechanism: MechanismView::from_text(&e.mechanism),
            importance: e.importance.clone(),
            warning,
        }
    }
}

impl std::fmt::Display for PanelView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Welcome => write!(
                f,
                "Explore Solana's Architecture\nSelect a stage to get an explanation of its role and mechanics."
            ),
            Self::Loading { title } => write!(f, "{title}\nLoading..."),
            Self::Error { message } => write!(f, "error: {message}"),
            Self::Explanation {
                title,
                role,
                mechanism,
                importance,
                warning,
            } => {
                if let Some(w) = warning {
                    writeln!(f, "warning: {w}\n")?;
                }
                writeln!(f, "{title}\n\nRole\n{role}\n\nMechanism")?;
                match mechanism {
                    MechanismView::List(items) => {
                        for item in items {
                            writeln!(f, "  - {item}")?;
                        }
                    }
                    MechanismView::Paragraph(p) => writeln!(f, "{p}")?,
                }
                write!(f, "\nImportance\n{importance}")
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/explain/display.rs"]
mod tests;
