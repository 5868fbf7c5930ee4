use super::*;

fn frame_at(s: &TurbineScript, ms: u64) -> TurbineFrame {
    let pos = s.cycle().locate(Millis(ms));
    s.render(&pos, Millis(ms)).unwrap()
}

#[test]
fn cycle_order_and_period() {
    let s = TurbineScript::new().unwrap();
    let entries: Vec<_> = s.cycle().entries().collect();
    assert_eq!(
        entries,
        vec![(Millis(0), TurbineState::Visible), (Millis(6300), TurbineState::Hidden)]
    );
    assert_eq!(s.cycle().period(), Millis(7300));
}

#[test]
fn reveal_transition_covers_the_last_leaf() {
    let last = NODES.iter().map(|n| n.delay).max().unwrap();
    assert_eq!(last.plus(NODE_REVEAL), VISIBLE.duration);
}

#[test]
fn tree_grows_top_down() {
    let s = TurbineScript::new().unwrap();
    let f = frame_at(&s, 900);
    assert!(f.nodes[0].scale > 0.0);
    assert!(f.nodes[1..].iter().all(|n| n.scale == 0.0));
    assert!(f.links.iter().all(|l| l.path.path_length == 0.0));
    assert!(f.shred > 0.0 && f.shred < 1.0);

    let full = frame_at(&s, 2300);
    assert!(full.nodes.iter().all(|n| n.scale == 1.0));
    assert!(full.links.iter().all(|l| l.path == PathFrame::drawn(1.0)));
}

#[test]
fn every_link_joins_known_nodes_across_one_layer() {
    for (parent, child, _) in EDGES {
        let p = NODES[parent as usize];
        let c = NODES[child as usize];
        assert_eq!(c.layer, p.layer + 1);
    }
}

#[test]
fn hidden_collapses_the_tree() {
    let s = TurbineScript::new().unwrap();
    let f = frame_at(&s, 6400);
    assert_eq!(f.state, TurbineState::Hidden);
    assert!(f.nodes.iter().all(|n| n.scale == 0.0));
    assert_eq!(f.shred, 0.0);
}
