use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Light {
    Off,
    Blink,
    On,
}

const FADE: Transition = Transition::new("fade", 400);

fn table() -> Cycle<Light> {
    Cycle::new(vec![
        Step::enter(Light::Off).wait_ms(1000),
        Step::enter(Light::Blink),
        Step::enter(Light::On).play(FADE).wait_ms(600),
    ])
    .unwrap()
}

#[test]
fn period_is_sum_of_transitions_and_holds() {
    assert_eq!(table().period(), Millis(2000));
}

#[test]
fn empty_and_zero_length_cycles_are_rejected() {
    assert!(Cycle::<Light>::new(vec![]).is_err());
    assert!(Cycle::new(vec![Step::enter(Light::Off)]).is_err());
}

#[test]
fn entries_list_every_step_in_order() {
    let entries: Vec<_> = table().entries().collect();
    assert_eq!(
        entries,
        vec![
            (Millis(0), Light::Off),
            (Millis(1000), Light::Blink),
            (Millis(1000), Light::On),
        ]
    );
}

#[test]
fn locate_reports_transition_then_hold() {
    let c = table();
    let pos = c.locate(Millis(1200));
    assert_eq!(pos.state, Light::On);
    assert_eq!(pos.local, Millis(200));
    assert_eq!(
        pos.phase,
        Phase::Transition {
            name: "fade",
            progress: 0.5
        }
    );

    let pos = c.locate(Millis(1500));
    assert_eq!(
        pos.phase,
        Phase::Hold {
            remaining: Millis(500)
        }
    );
}

#[test]
fn locate_wraps_and_counts_cycles() {
    let c = table();
    let pos = c.locate(Millis(4500));
    assert_eq!(pos.cycle, 2);
    assert_eq!(pos.state, Light::Off);
    assert_eq!(pos.local, Millis(500));
}

#[test]
fn zero_length_steps_are_never_located() {
    let c = table();
    assert_eq!(c.locate(Millis(1000)).state, Light::On);
    assert_eq!(c.locate(Millis(999)).state, Light::Off);
}

#[test]
fn step_builders_accumulate_hold() {
    let step = Step::enter(Light::On).play(FADE).wait_ms(100).wait_ms(200);
    assert_eq!(step.hold, Millis(300));
    assert_eq!(step.duration(), Millis(700));
}
