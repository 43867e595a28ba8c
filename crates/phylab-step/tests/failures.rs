use phylab_core::{DataPool, ErrorInfo, PhyError, PoolValue};
use phylab_step::{ExecutionContext, RunState, StepDef, StepRegistry};

#[derive(Default)]
struct Lab {
    pool: DataPool,
    log: Vec<&'static str>,
}

fn seed(lab: &mut Lab) -> Result<Option<PoolValue>, PhyError> {
    lab.log.push("seed");
    lab.pool.insert("x", 2.0);
    Ok(None)
}

fn needs_missing(lab: &mut Lab) -> Result<Option<PoolValue>, PhyError> {
    lab.log.push("needs_missing");
    let y = lab.pool.scalar("y")?;
    Ok(Some(PoolValue::Scalar(y)))
}

fn explode(lab: &mut Lab) -> Result<Option<PoolValue>, PhyError> {
    lab.log.push("explode");
    Err(PhyError::Data(ErrorInfo::new("test.explode", "boom")))
}

fn top(lab: &mut Lab) -> Result<Option<PoolValue>, PhyError> {
    lab.log.push("top");
    Ok(None)
}

const SEED: StepDef<Lab> = StepDef::new("seed", seed);
const NEEDS_MISSING: StepDef<Lab> = StepDef::new("needs_missing", needs_missing);
const EXPLODE: StepDef<Lab> = StepDef::new("explode", explode);
const TOP: StepDef<Lab> = StepDef::new("top", top);

#[test]
fn missing_key_aborts_the_invocation() {
    let mut registry = StepRegistry::new();
    registry.depends(NEEDS_MISSING, &[SEED]);
    let mut lab = Lab::default();
    let mut ctx = ExecutionContext::new();

    let err = registry
        .run_in(&mut lab, "needs_missing", &mut ctx)
        .unwrap_err();

    assert!(matches!(err, PhyError::MissingKey(ref info) if info.context["key"] == "y"));
    assert_eq!(ctx.state(), &RunState::Failed);
    assert_eq!(ctx.executed(), ["seed", "needs_missing"]);
    assert_eq!(lab.pool.scalar("x").unwrap(), 2.0);
}

#[test]
fn failing_prerequisite_stops_remaining_steps() {
    let mut registry = StepRegistry::new();
    registry.depends(TOP, &[SEED, EXPLODE, NEEDS_MISSING]);
    let mut lab = Lab::default();
    let mut ctx = ExecutionContext::new();

    let err = registry.run_in(&mut lab, "top", &mut ctx).unwrap_err();

    assert_eq!(err.info().code, "test.explode");
    assert_eq!(lab.log, ["seed", "explode"]);
    assert!(ctx.is_executed("seed"));
    assert!(!ctx.is_executed("top"));
    assert_eq!(ctx.state(), &RunState::Failed);
}

#[test]
fn rerun_after_failure_starts_from_scratch() {
    let mut registry = StepRegistry::new();
    registry.depends(NEEDS_MISSING, &[SEED]);
    let mut lab = Lab::default();

    registry.run(&mut lab, "needs_missing").unwrap_err();
    lab.pool.insert("y", 7.0);
    let invocation = registry.run(&mut lab, "needs_missing").unwrap();

    assert_eq!(invocation.output, Some(PoolValue::Scalar(7.0)));
    assert_eq!(lab.log, ["seed", "needs_missing", "seed", "needs_missing"]);
}
