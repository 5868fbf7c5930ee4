use super::*;

fn frame_at(s: &VerificationScript, ms: u64) -> VerificationFrame {
    let pos = s.cycle().locate(Millis(ms));
    s.render(&pos, Millis(ms)).unwrap()
}

#[test]
fn cycle_order_and_period() {
    let s = VerificationScript::new().unwrap();
    let entries: Vec<_> = s.cycle().entries().collect();
    assert_eq!(
        entries,
        vec![(Millis(0), VerifyState::Flow), (Millis(6400), VerifyState::Reset)]
    );
    assert_eq!(s.cycle().period(), Millis(6900));
}

#[test]
fn hops_reveal_in_order() {
    let s = VerificationScript::new().unwrap();
    let f = frame_at(&s, 1200);
    assert!(f.hops[0].opacity > 0.0);
    assert_eq!(f.hops[1].opacity, 0.0);
    assert_eq!(f.hops[2].opacity, 0.0);

    let all = frame_at(&s, 2400);
    assert!(all.hops.iter().all(|h| h.opacity == 1.0 && h.scale == 1.0));
    assert_eq!(all.hops[2].from, "shred_verify");
    assert_eq!(all.hops[2].to, "shred_fetch");
}

#[test]
fn reset_hides_hops_but_not_the_indicator() {
    let s = VerificationScript::new().unwrap();
    let f = frame_at(&s, 6500);
    assert_eq!(f.state, VerifyState::Reset);
    assert!(f.hops.iter().all(|h| h.opacity == 0.0));
    // 6500 is 2500 into the 4000ms indicator loop.
    assert_eq!(f.shred.opacity, 1.0);
}

#[test]
fn indicator_runs_off_mount_time() {
    let s = VerificationScript::new().unwrap();
    let pos = s.cycle().locate(Millis(0));
    let a = s.render(&pos, Millis(2000)).unwrap();
    assert!((a.shred.y - 0.5).abs() < 1e-9);
    let b = s.render(&pos, Millis(6000)).unwrap();
    assert_eq!(a.shred, b.shred);
}
