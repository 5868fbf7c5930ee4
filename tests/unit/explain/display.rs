use super::*;
use crate::explain::flow::{Failure, FailureKind};
use crate::explain::parser::{FORMAT_WARNING, PLACEHOLDER};

#[test]
fn hyphen_items_become_a_list() {
    assert_eq!(
        MechanismView::from_text("- B\n- C"),
        MechanismView::List(vec!["B".into(), "C".into()])
    );
}

#[test]
fn plain_text_stays_a_paragraph() {
    assert_eq!(
        MechanismView::from_text("  Leaders are known in advance. "),
        MechanismView::Paragraph("Leaders are known in advance.".into())
    );
}

#[test]
fn inline_hyphen_does_not_make_a_list() {
    assert_eq!(
        MechanismView::from_text("A proof-of-history clock."),
        MechanismView::Paragraph("A proof-of-history clock.".into())
    );
}

#[test]
fn bare_dashes_are_not_list_markers() {
    assert_eq!(
        MechanismView::from_text("-A\n-B"),
        MechanismView::Paragraph("-A\n-B".into())
    );
}

#[test]
fn wrapped_items_continue_and_inner_dashes_survive() {
    assert_eq!(
        MechanismView::from_text("- Leader - known early\n  keeps forwarding\n- Second"),
        MechanismView::List(vec![
            "Leader - known early keeps forwarding".into(),
            "Second".into()
        ])
    );
}

#[test]
fn nothing_selected_is_welcome() {
    assert_eq!(PanelView::derive(None, &RequestOutcome::Idle), PanelView::Welcome);
}

#[test]
fn loading_shows_the_stage_title() {
    let outcome = RequestOutcome::Loading {
        stage: StageId::Turbine,
    };
    assert_eq!(
        PanelView::derive(Some(StageId::Turbine), &outcome),
        PanelView::Loading { title: "Turbine" }
    );
}

#[test]
fn failure_message_is_shown_verbatim() {
    let outcome = RequestOutcome::Failed {
        stage: StageId::Users,
        failure: Failure {
            kind: FailureKind::Reported,
            message: "An error occurred: nope".into(),
        },
    };
    assert_eq!(
        PanelView::derive(Some(StageId::Users), &outcome),
        PanelView::Error {
            message: "An error occurred: nope".into()
        }
    );
}

#[test]
fn fallback_carries_the_warning_and_placeholders() {
    let outcome = RequestOutcome::ParseFallback {
        stage: StageId::Consensus,
        explanation: Explanation::fallback("raw"),
        warning: FORMAT_WARNING,
    };
    let view = PanelView::derive(Some(StageId::Consensus), &outcome);
    let PanelView::Explanation {
        title,
        role,
        mechanism,
        warning,
        ..
    } = &view
    else {
        panic!("expected explanation, got {view:?}");
    };
    assert_eq!(*title, "Consensus");
    assert_eq!(role, "raw");
    assert_eq!(mechanism, &MechanismView::Paragraph(PLACEHOLDER.into()));
    assert_eq!(warning.as_deref(), Some(FORMAT_WARNING));
    assert!(view.to_string().starts_with("warning: "));
}

#[test]
fn rendered_text_lists_mechanism_items() {
    let outcome = RequestOutcome::Parsed {
        stage: StageId::GulfStream,
        explanation: Explanation {
            role: "A".into(),
            mechanism: "- B\n- C".into(),
            importance: "D".into(),
        },
    };
    let text = PanelView::derive(Some(StageId::GulfStream), &outcome).to_string();
    assert!(text.starts_with("Gulf Stream"));
    assert!(text.contains("  - B\n  - C\n"));
    assert!(text.ends_with("Importance\nD"));
}
