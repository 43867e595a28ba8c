use std::collections::BTreeMap;
use std::fs;

use phylab_core::{PhyError, PoolValue};
use phylab_exp::data::{self, data_path, load_record, strip_info, LoadOutcome};
use phylab_exp::{parse_series, ExperimentKind, HysteresisExp, OhmExp, PendulumExp};
use phylab_exp::Experiment;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn missing_file_writes_template_and_loads_nothing() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target");
    let mut exp = HysteresisExp::new();

    let outcome = data::load(&mut exp, &target).unwrap();

    let path = data_path(&target, ExperimentKind::Hysteresis);
    assert_eq!(outcome, LoadOutcome::Created(path.clone()));
    assert!(path.ends_with("HysteresisExp.json"));
    assert!(exp.pool().is_empty());

    let outcome = data::load(&mut exp, &target).unwrap();
    assert!(matches!(outcome, LoadOutcome::Loaded { entries: 11, .. }));
    assert_eq!(exp.pool().series("X_list").unwrap(), &[0.5, 1.0, 1.5]);
    assert!(!exp.pool().contains("INFO"));
}

#[test]
fn info_keys_are_stripped_at_every_depth() {
    let mut record = json!({
        "INFO": "top",
        "group": { "INFO": "nested", "U": 1.0 },
    });
    strip_info(&mut record);
    assert_eq!(record, json!({ "group": { "U": 1.0 } }));
}

#[test]
fn nested_groups_are_flattened_and_strings_coerced() {
    let mut exp = OhmExp::new();
    let record = json!({
        "INFO": "bench 3",
        "readings": { "U": "4.5", "I": 1.5 },
        "operator": "unnamed",
    });
    let entries = load_record(&mut exp, record).unwrap();
    assert_eq!(entries, 2);
    assert_eq!(exp.pool().scalar("U").unwrap(), 4.5);
    assert!(!exp.pool().contains("operator"));
}

#[test]
fn all_invalid_entries_are_reported_together() {
    let mut exp = HysteresisExp::new();
    let record = json!({
        "N1": "many",
        "C_uf": { "nominal": 2.0, "measured": "n/a" },
        "X_list": [0.5, "x"],
        "Y_list": 3.0,
    });
    let err = load_record(&mut exp, record).unwrap_err();
    let PhyError::Data(info) = err else {
        panic!("expected data error");
    };
    assert_eq!(info.code, "data.invalid");
    assert_eq!(info.context["N1"], "is not a float");
    assert_eq!(info.context["C_uf.measured"], "is not a float");
    assert_eq!(info.context["X_list"], "contains non-float");
    assert_eq!(info.context["Y_list"], "is not a list");
    assert!(exp.pool().is_empty());
}

#[test]
fn non_object_record_is_rejected() {
    let mut exp = PendulumExp::new();
    let err = load_record(&mut exp, json!([1.0, 2.0])).unwrap_err();
    assert_eq!(err.info().code, "data.not_object");
}

#[test]
fn reload_replaces_previous_pool() {
    let mut exp = PendulumExp::new();
    exp.pool_mut().insert("g_results", vec![9.8]);
    load_record(&mut exp, json!({ "L_list": [1.0], "T_list": [2.0] })).unwrap();
    assert!(!exp.pool().contains("g_results"));
    assert_eq!(exp.pool().len(), 2);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let dir = tempdir().unwrap();
    let path = data_path(dir.path(), ExperimentKind::Ohm);
    fs::write(&path, "{ not json").unwrap();
    let mut exp = OhmExp::new();
    let err = data::load(&mut exp, dir.path()).unwrap_err();
    assert!(matches!(err, PhyError::Serde(_)));
}

#[test]
fn save_merges_values_into_existing_file() {
    let dir = tempdir().unwrap();
    let mut values = BTreeMap::new();
    values.insert("U".to_string(), PoolValue::Scalar(3.0));
    let path = data::save(dir.path(), ExperimentKind::Ohm, &values).unwrap();

    values.clear();
    values.insert("I".to_string(), PoolValue::Scalar(1.5));
    data::save(dir.path(), ExperimentKind::Ohm, &values).unwrap();

    let record: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(record["U"], json!(3.0));
    assert_eq!(record["I"], json!(1.5));
    assert_eq!(record["INFO"], json!("cli input"));

    let mut exp = OhmExp::new();
    data::load(&mut exp, dir.path()).unwrap();
    assert_eq!(exp.calc_R().unwrap().output, Some(PoolValue::Scalar(2.0)));
}

#[test]
fn series_parsing_accepts_both_comma_styles() {
    assert_eq!(parse_series("1.0, 2，3 ,, ").unwrap(), vec![1.0, 2.0, 3.0]);
    assert!(parse_series("").unwrap().is_empty());
    let err = parse_series("1.0, abc").unwrap_err();
    assert_eq!(err.info().context["item"], "abc");
}
