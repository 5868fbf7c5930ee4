use super::*;

#[test]
fn three_sections_in_order() {
    let text = "### Role\nA\n### Mechanism\n- B\n- C\n### Importance\nD";
    assert_eq!(
        parse_explanation(text),
        Parsed::Explanation(Explanation {
            role: "A".into(),
            mechanism: "- B\n- C".into(),
            importance: "D".into(),
        })
    );
}

#[test]
fn leading_prose_and_whitespace_are_ignored() {
    let text = "Sure! Here it is.\n\n### Role\n\n  Leader rotation.  \n\n### Mechanism\nSteps\n### Importance\n\nSpeed.\n";
    let Parsed::Explanation(e) = parse_explanation(text) else {
        panic!("expected explanation");
    };
    assert_eq!(e.role, "Leader rotation.");
    assert_eq!(e.mechanism, "Steps");
    assert_eq!(e.importance, "Speed.");
}

#[test]
fn missing_importance_falls_back_to_raw_text() {
    let text = "### Role\nA\n### Mechanism\n- B";
    assert_eq!(
        parse_explanation(text),
        Parsed::Fallback {
            explanation: Explanation {
                role: text.into(),
                mechanism: PLACEHOLDER.into(),
                importance: PLACEHOLDER.into(),
            },
            warning: FORMAT_WARNING,
        }
    );
}

#[test]
fn headers_out_of_order_fall_back() {
    let text = "### Mechanism\n- B\n### Role\nA\n### Importance\nD";
    assert!(matches!(parse_explanation(text), Parsed::Fallback { .. }));
}

#[test]
fn empty_section_falls_back() {
    let text = "### Role\n   \n### Mechanism\n- B\n### Importance\nD";
    assert!(matches!(parse_explanation(text), Parsed::Fallback { .. }));
}

#[test]
fn sentinel_is_reported_not_parsed() {
    let text = "An error occurred while generating the explanation: quota exceeded";
    assert_eq!(parse_explanation(text), Parsed::Sentinel(text.into()));
}

#[test]
fn sentinel_wins_even_when_headers_follow() {
    let text = "An error occurred\n### Role\nA\n### Mechanism\nB\n### Importance\nC";
    assert!(matches!(parse_explanation(text), Parsed::Sentinel(_)));
}

#[test]
fn sentinel_text_mid_response_is_ordinary_content() {
    let text = "### Role\nAn error occurred once.\n### Mechanism\nB\n### Importance\nC";
    assert!(matches!(parse_explanation(text), Parsed::Explanation(_)));
}
