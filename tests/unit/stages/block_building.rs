use super::*;

fn script() -> BlockBuildingScript {
    BlockBuildingScript::new().unwrap()
}

fn frame_at(s: &BlockBuildingScript, ms: u64) -> BlockBuildingFrame {
    let pos = s.cycle().locate(Millis(ms));
    s.render(&pos, Millis(ms)).unwrap()
}

#[test]
fn cycle_order_and_period() {
    let s = script();
    let states: Vec<_> = s.cycle().entries().map(|(_, st)| st).collect();
    assert_eq!(
        states,
        vec![
            BuildState::Idle,
            BuildState::Fetching,
            BuildState::Banking,
            BuildState::Banking,
            BuildState::Banking,
            BuildState::Banking,
            BuildState::Processing,
            BuildState::Shredding,
            BuildState::Writing,
            BuildState::Resetting,
        ]
    );
    assert_eq!(s.cycle().period(), Millis(11_250));
}

#[test]
fn banking_is_visited_four_times_before_processing() {
    let s = script();
    let states: Vec<_> = s.cycle().entries().map(|(_, st)| st).collect();
    let processing = states
        .iter()
        .position(|st| *st == BuildState::Processing)
        .unwrap();
    let banking = states[..processing]
        .iter()
        .filter(|st| **st == BuildState::Banking)
        .count();
    assert_eq!(banking, BANK_SLOTS);
}

#[test]
fn fill_counter_climbs_per_dot_move() {
    let s = script();
    // Banking starts after idle (1500) and fetching (1000).
    assert_eq!(frame_at(&s, 2500).filled_slots, 0);
    assert_eq!(frame_at(&s, 2800).filled_slots, 1);
    assert_eq!(frame_at(&s, 3100).filled_slots, 2);
    assert_eq!(frame_at(&s, 3400).filled_slots, 3);
    assert_eq!(frame_at(&s, 3700).filled_slots, 4);
    assert_eq!(frame_at(&s, 3950).state, BuildState::Banking);
    assert_eq!(frame_at(&s, 4000).state, BuildState::Processing);
    assert_eq!(frame_at(&s, 4000).filled_slots, 4);
}

#[test]
fn fill_counter_is_zero_when_idle_is_reentered() {
    let s = script();
    let resetting = frame_at(&s, 10_800);
    assert_eq!(resetting.state, BuildState::Resetting);
    assert_eq!(resetting.filled_slots, 0);

    let idle = frame_at(&s, 11_250);
    assert_eq!(idle.state, BuildState::Idle);
    assert_eq!(idle.filled_slots, 0);
    assert_eq!(idle.fetch_line, 0.0);
}

#[test]
fn dot_travels_between_slots() {
    let s = script();
    let f = frame_at(&s, 2500 + 300 + 150);
    assert_eq!(f.dot.opacity, 1.0);
    let mid = (slot_y(0) + slot_y(1)) / 2.0;
    assert!((f.dot.y - mid).abs() < 1e-9);
    assert_eq!(frame_at(&s, 4100).dot.opacity, 0.0);
}

#[test]
fn shredding_staggers_fragments() {
    let s = script();
    // Shredding starts at 6000.
    let f = frame_at(&s, 6100);
    assert_eq!(f.state, BuildState::Shredding);
    assert!(f.shreds[0].opacity > 0.0);
    assert_eq!(f.shreds[1].opacity, 0.0);
    assert_eq!(f.shreds.len(), BANK_SLOTS);
}

#[test]
fn db_arrow_flashes_only_while_writing() {
    let s = script();
    // Writing starts at 8950; its peak is 400ms in.
    assert_eq!(frame_at(&s, 9350).db_arrow_opacity, 1.0);
    assert_eq!(frame_at(&s, 500).db_arrow_opacity, 0.2);
}
