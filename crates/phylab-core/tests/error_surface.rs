use phylab_core::errors::{ErrorInfo, PhyError};

#[test]
fn missing_key_surface() {
    let err = PhyError::missing_key("T_list");
    assert_eq!(err.info().code, "pool.missing_key");
    assert_eq!(err.info().context.get("key").map(String::as_str), Some("T_list"));
    assert!(err.info().hint.is_some());
}

#[test]
fn step_not_found_surface() {
    let err = PhyError::step_not_found("calc_R");
    assert!(matches!(err, PhyError::StepNotFound(ref info) if info.code == "step.not_found"));
    assert!(err.to_string().contains("step=calc_R"));
}

#[test]
fn cycle_surface_lists_path() {
    let path = vec!["a".to_string(), "b".to_string(), "a".to_string()];
    let err = PhyError::cyclic_dependency(&path);
    assert_eq!(
        err.info().context.get("path").map(String::as_str),
        Some("a -> b -> a")
    );
}

#[test]
fn binding_surface() {
    let err = PhyError::binding("calc_R", "OhmExp");
    assert_eq!(err.info().code, "step.binding");
    assert_eq!(
        err.info().context.get("expected").map(String::as_str),
        Some("OhmExp")
    );
}

#[test]
fn display_includes_context_and_hint() {
    let err = PhyError::Data(
        ErrorInfo::new("data.invalid", "invalid data")
            .with_context("U", "not a float")
            .with_hint("fix the data file"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("data error: invalid data (code: data.invalid)"));
    assert!(rendered.contains("U=not a float"));
    assert!(rendered.ends_with("hint: fix the data file"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = PhyError::missing_key("U");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "MissingKey");
    assert_eq!(json["detail"]["code"], "pool.missing_key");
}
