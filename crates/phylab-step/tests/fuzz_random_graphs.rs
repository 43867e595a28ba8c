use std::collections::BTreeMap;

use phylab_core::{PhyError, PoolValue};
use phylab_step::{StepDef, StepRegistry};
use proptest::prelude::*;

const NAMES: [&str; 8] = ["s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7"];

#[derive(Default)]
struct Journal {
    order: Vec<usize>,
}

fn body<const N: usize>(journal: &mut Journal) -> Result<Option<PoolValue>, PhyError> {
    journal.order.push(N);
    Ok(None)
}

fn defs() -> [StepDef<Journal>; 8] {
    [
        StepDef::new(NAMES[0], body::<0>),
        StepDef::new(NAMES[1], body::<1>),
        StepDef::new(NAMES[2], body::<2>),
        StepDef::new(NAMES[3], body::<3>),
        StepDef::new(NAMES[4], body::<4>),
        StepDef::new(NAMES[5], body::<5>),
        StepDef::new(NAMES[6], body::<6>),
        StepDef::new(NAMES[7], body::<7>),
    ]
}

/// Edges only point from a higher index to a lower one, so the graph is acyclic.
fn acyclic_edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((1usize..8, 0usize..7), 0..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .filter(|(from, to)| to < from)
            .collect()
    })
}

fn reachable(edges: &BTreeMap<usize, Vec<usize>>, start: usize, seen: &mut Vec<bool>) {
    if seen[start] {
        return;
    }
    seen[start] = true;
    for &next in edges.get(&start).into_iter().flatten() {
        reachable(edges, next, seen);
    }
}

proptest! {
    #[test]
    fn every_reachable_step_runs_once_after_its_prerequisites(
        edges in acyclic_edges(),
        target in 0usize..8,
    ) {
        let defs = defs();
        let mut registry = StepRegistry::new();
        for def in defs {
            registry.register(def);
        }
        let mut graph: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (from, to) in &edges {
            registry.depends(defs[*from], &[defs[*to]]);
            graph.entry(*from).or_default().push(*to);
        }

        let mut journal = Journal::default();
        registry.run(&mut journal, NAMES[target]).unwrap();

        let mut seen = vec![false; 8];
        reachable(&graph, target, &mut seen);
        let expected = seen.iter().filter(|&&hit| hit).count();
        prop_assert_eq!(journal.order.len(), expected);
        prop_assert_eq!(journal.order.last().copied(), Some(target));

        let position: BTreeMap<usize, usize> = journal
            .order
            .iter()
            .enumerate()
            .map(|(pos, &step)| (step, pos))
            .collect();
        prop_assert_eq!(position.len(), journal.order.len());
        for (from, to) in &edges {
            if let (Some(a), Some(b)) = (position.get(from), position.get(to)) {
                prop_assert!(b < a, "prerequisite {} ran after {}", to, from);
            }
        }
    }
}
