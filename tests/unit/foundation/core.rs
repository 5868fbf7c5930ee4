use super::*;

#[test]
fn since_saturates_at_zero() {
    assert_eq!(Millis(500).since(Millis(800)), Millis::ZERO);
    assert_eq!(Millis(800).since(Millis(500)), Millis(300));
}

#[test]
fn progress_clamps_and_handles_empty_spans() {
    assert_eq!(Millis(250).progress_in(Millis(1000)), 0.25);
    assert_eq!(Millis(2000).progress_in(Millis(1000)), 1.0);
    assert_eq!(Millis(0).progress_in(Millis::ZERO), 1.0);
}

#[test]
fn durations_convert_to_whole_millis() {
    assert_eq!(Millis::from_duration(Duration::from_micros(4_000_900)), Millis(4000));
    assert_eq!(Millis::from_duration(Duration::MAX), Millis(u64::MAX));
}

#[test]
fn displays_with_unit() {
    assert_eq!(Millis(9500).to_string(), "9500ms");
}
