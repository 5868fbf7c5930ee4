use super::*;

fn frame_at(ms: u64) -> UsersFrame {
    let script = UsersScript::new().unwrap();
    let pos = script.cycle().locate(Millis(ms));
    script.render(&pos, Millis(ms)).unwrap()
}

#[test]
fn cycle_order_and_period() {
    let script = UsersScript::new().unwrap();
    let states: Vec<_> = script.cycle().entries().map(|(_, s)| s).collect();
    assert_eq!(
        states,
        vec![UsersState::Send, UsersState::Sign, UsersState::Reset]
    );
    assert_eq!(script.cycle().period(), Millis(8000));
}

#[test]
fn send_arrow_peaks_mid_flow_and_fades_out() {
    let mid = frame_at(1000);
    assert_eq!(mid.state, UsersState::Send);
    assert_eq!(mid.send_arrow.opacity, 1.0);
    assert_eq!(mid.send_arrow.path_length, 1.0);
    assert_eq!(mid.sign_arrow, PathFrame::HIDDEN);

    let held = frame_at(2500);
    assert_eq!(held.send_arrow.opacity, 0.0);
    assert_eq!(held.send_arrow.path_length, 1.0);
}

#[test]
fn sign_follows_send_hold() {
    let f = frame_at(3500 + 1000);
    assert_eq!(f.state, UsersState::Sign);
    assert_eq!(f.sign_arrow.opacity, 1.0);
    assert_eq!(f.send_arrow, PathFrame::HIDDEN);
}

#[test]
fn reset_hides_both_arrows() {
    let f = frame_at(7500);
    assert_eq!(f.state, UsersState::Reset);
    assert_eq!(f.send_arrow, PathFrame::HIDDEN);
    assert_eq!(f.sign_arrow, PathFrame::HIDDEN);
}
