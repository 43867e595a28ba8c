use std::collections::BTreeMap;

use phylab_core::{PhyError, PoolValue};
use phylab_step::{StepDef, StepRegistry};

#[derive(Default)]
struct Counter {
    calls: BTreeMap<&'static str, usize>,
}

impl Counter {
    fn hit(&mut self, name: &'static str) -> Result<Option<PoolValue>, PhyError> {
        *self.calls.entry(name).or_default() += 1;
        Ok(None)
    }

    fn total(&self) -> usize {
        self.calls.values().sum()
    }
}

fn shared(counter: &mut Counter) -> Result<Option<PoolValue>, PhyError> {
    counter.hit("shared")
}

fn left(counter: &mut Counter) -> Result<Option<PoolValue>, PhyError> {
    counter.hit("left")
}

fn right(counter: &mut Counter) -> Result<Option<PoolValue>, PhyError> {
    counter.hit("right")
}

fn top(counter: &mut Counter) -> Result<Option<PoolValue>, PhyError> {
    counter.hit("top")
}

const SHARED: StepDef<Counter> = StepDef::new("shared", shared);
const LEFT: StepDef<Counter> = StepDef::new("left", left);
const RIGHT: StepDef<Counter> = StepDef::new("right", right);
const TOP: StepDef<Counter> = StepDef::new("top", top);

fn diamond() -> StepRegistry<Counter> {
    let mut registry = StepRegistry::new();
    registry.depends(LEFT, &[SHARED]);
    registry.depends(RIGHT, &[SHARED]);
    registry.depends(TOP, &[LEFT, RIGHT]);
    registry
}

#[test]
fn shared_prerequisite_runs_once_per_invocation() {
    let registry = diamond();
    let mut counter = Counter::default();
    let invocation = registry.run(&mut counter, "top").unwrap();
    assert_eq!(counter.calls["shared"], 1);
    assert_eq!(counter.total(), 4);
    assert_eq!(invocation.executed, ["shared", "left", "right", "top"]);
}

#[test]
fn every_top_level_call_reruns_the_whole_chain() {
    let registry = diamond();
    let mut counter = Counter::default();
    registry.run(&mut counter, "top").unwrap();
    let single_run = counter.total();
    registry.run(&mut counter, "top").unwrap();
    assert_eq!(counter.total(), 2 * single_run);
    assert!(counter.calls.values().all(|&count| count == 2));
}

#[test]
fn reused_context_is_reset_between_invocations() {
    let registry = diamond();
    let mut counter = Counter::default();
    let mut ctx = phylab_step::ExecutionContext::new();
    registry.run_in(&mut counter, "left", &mut ctx).unwrap();
    assert_eq!(ctx.executed(), ["shared", "left"]);
    registry.run_in(&mut counter, "right", &mut ctx).unwrap();
    assert_eq!(ctx.executed(), ["shared", "right"]);
    assert_eq!(counter.calls["shared"], 2);
}
