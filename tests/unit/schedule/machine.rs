use super::*;
use crate::schedule::clock::Transition;
use crate::schedule::cycle::Step;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
enum Blink {
    Dark,
    Lit,
}

impl StateName for Blink {
    fn name(self) -> &'static str {
        match self {
            Blink::Dark => "dark",
            Blink::Lit => "lit",
        }
    }
}

struct BlinkScript {
    cycle: Cycle<Blink>,
}

impl BlinkScript {
    fn new() -> Self {
        Self {
            cycle: Cycle::new(vec![
                Step::enter(Blink::Dark).wait_ms(500),
                Step::enter(Blink::Lit)
                    .play(Transition::new("glow", 250))
                    .wait_ms(250),
            ])
            .unwrap(),
        }
    }
}

impl StageScript for BlinkScript {
    type State = Blink;
    type Frame = f64;

    const STAGE: StageId = StageId::Users;

    fn cycle(&self) -> &Cycle<Blink> {
        &self.cycle
    }

    fn render(&self, pos: &CyclePos<Blink>, _elapsed: Millis) -> PipevizResult<f64> {
        Ok(match pos.state {
            Blink::Dark => 0.0,
            Blink::Lit => pos.local.progress_in(Millis(250)),
        })
    }
}

#[test]
fn tick_reports_each_entry_once() {
    let mut m = TimedMachine::mount(BlinkScript::new(), Millis(100), CancellationToken::new());
    let first = m.tick(Millis(100)).unwrap().unwrap();
    assert_eq!(first.entered, Some(Blink::Dark));

    let again = m.tick(Millis(300)).unwrap().unwrap();
    assert_eq!(again.entered, None);

    let lit = m.tick(Millis(725)).unwrap().unwrap();
    assert_eq!(lit.entered, Some(Blink::Lit));
    assert_eq!(lit.frame, 0.5);

    // Same state in the next cycle is a fresh entry.
    let wrapped = m.tick(Millis(1100)).unwrap().unwrap();
    assert_eq!(wrapped.entered, Some(Blink::Dark));
    assert_eq!(wrapped.pos.cycle, 1);
}

#[test]
fn mount_time_offsets_the_timeline() {
    let m = TimedMachine::mount(BlinkScript::new(), Millis(1000), CancellationToken::new());
    assert_eq!(m.position(Millis(1000)).state, Blink::Dark);
    assert_eq!(m.position(Millis(1600)).state, Blink::Lit);
}

#[test]
fn stopped_machine_stops_ticking() {
    let parent = CancellationToken::new();
    let mut m = TimedMachine::mount(BlinkScript::new(), Millis(0), parent.child_token());
    assert!(m.tick(Millis(10)).unwrap().is_some());

    parent.cancel();
    assert!(m.is_stopped());
    assert!(m.tick(Millis(20)).unwrap().is_none());
}
