//! Experiment data files: template creation, validation and pool loading.
//!
//! A data file is a JSON object whose leaves are numbers, numeric strings or
//! arrays of those. Nested objects are flattened into the pool and every
//! `INFO` key, at any depth, is a free-form note that never reaches the pool.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use phylab_core::{DataPool, ErrorInfo, PhyError, PoolValue};
use serde_json::{Map, Number, Value};
use tracing::{info, warn};

use crate::experiment::{Experiment, ExperimentKind};
use crate::serde::{from_json_slice, to_pretty_json};

/// Key of free-form notes inside data files.
pub const INFO_KEY: &str = "INFO";

/// Result of [`load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No data file existed; the template was written and nothing was loaded.
    Created(PathBuf),
    /// The data file was validated and pushed into the pool.
    Loaded {
        /// File that was read.
        path: PathBuf,
        /// Number of pool entries after loading.
        entries: usize,
    },
}

/// Location of the data file for `kind` under `dir`.
pub fn data_path(dir: &Path, kind: ExperimentKind) -> PathBuf {
    dir.join(format!("{}.json", kind.data_name()))
}

/// Loads the data file of `experiment` from `dir` into its pool.
///
/// Creates `dir` when missing. When the data file is missing the template is
/// written instead and the pool is left untouched.
pub fn load(experiment: &mut dyn Experiment, dir: &Path) -> Result<LoadOutcome, PhyError> {
    let kind = experiment.kind();
    fs::create_dir_all(dir).map_err(|err| io_error("data.create_dir", dir, err))?;
    let path = data_path(dir, kind);
    if !path.exists() {
        write_record(&path, &kind.template())?;
        info!(path = %path.display(), "created data template");
        return Ok(LoadOutcome::Created(path));
    }
    let bytes = fs::read(&path).map_err(|err| io_error("data.read", &path, err))?;
    let record: Value = from_json_slice(&bytes)?;
    let entries = load_record(experiment, record)?;
    info!(path = %path.display(), entries, "loaded experiment data");
    Ok(LoadOutcome::Loaded { path, entries })
}

/// Replaces the pool of `experiment` with the contents of `record`.
pub fn load_record(experiment: &mut dyn Experiment, mut record: Value) -> Result<usize, PhyError> {
    let kind = experiment.kind();
    strip_info(&mut record);
    let Value::Object(map) = &mut record else {
        return Err(PhyError::Data(
            ErrorInfo::new("data.not_object", "data record must be a JSON object")
                .with_context("experiment", kind.name()),
        ));
    };
    validate(kind, map)?;
    let pool = experiment.pool_mut();
    pool.clear();
    push_to_pool(pool, map);
    Ok(pool.len())
}

/// Removes every [`INFO_KEY`] entry at any nesting depth.
pub fn strip_info(value: &mut Value) {
    if let Value::Object(map) = value {
        map.remove(INFO_KEY);
        for child in map.values_mut() {
            strip_info(child);
        }
    }
}

/// Checks declared inputs and rewrites numeric strings as numbers in place.
///
/// Every offending entry is collected before failing, so one error lists all
/// of them.
pub fn validate(kind: ExperimentKind, record: &mut Map<String, Value>) -> Result<(), PhyError> {
    let mut problems = BTreeMap::new();
    for key in kind.float_keys() {
        if let Some(value) = record.get_mut(*key) {
            check_float(key, value, &mut problems);
        }
    }
    for key in kind.list_keys() {
        if let Some(value) = record.get_mut(*key) {
            check_list(key, value, &mut problems);
        }
    }
    if problems.is_empty() {
        return Ok(());
    }
    let info = problems.into_iter().fold(
        ErrorInfo::new("data.invalid", "invalid experiment data")
            .with_hint("fix the listed entries in the data file"),
        |info, (path, problem)| info.with_context(path, problem),
    );
    Err(PhyError::Data(info.with_context("experiment", kind.name())))
}

fn check_float(path: &str, value: &mut Value, problems: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(children) => {
            for (child, value) in children.iter_mut() {
                check_float(&format!("{path}.{child}"), value, problems);
            }
        }
        other => match coerce_number(other) {
            Some(number) => *other = number,
            None => {
                problems.insert(path.to_string(), "is not a float".to_string());
            }
        },
    }
}

fn check_list(path: &str, value: &mut Value, problems: &mut BTreeMap<String, String>) {
    let Value::Array(items) = value else {
        problems.insert(path.to_string(), "is not a list".to_string());
        return;
    };
    let coerced: Option<Vec<Value>> = items.iter().map(coerce_number).collect();
    match coerced {
        Some(numbers) => *items = numbers,
        None => {
            problems.insert(path.to_string(), "contains non-float".to_string());
        }
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    parse_float(value).and_then(Number::from_f64).map(Value::Number)
}

fn parse_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite())
}

fn push_to_pool(pool: &mut DataPool, record: &Map<String, Value>) {
    for (key, value) in record {
        match value {
            Value::Object(children) => push_to_pool(pool, children),
            Value::Array(items) => match items.iter().map(parse_float).collect::<Option<Vec<_>>>() {
                Some(series) => pool.insert(key.clone(), PoolValue::Series(series)),
                None => warn!(key = key.as_str(), "skipping non-numeric list"),
            },
            other => match parse_float(other) {
                Some(scalar) => pool.insert(key.clone(), PoolValue::Scalar(scalar)),
                None => warn!(key = key.as_str(), "skipping non-numeric value"),
            },
        }
    }
}

/// Merges `values` into the data file of `kind` under `dir`.
///
/// Existing entries not named in `values` are kept; previous notes are
/// replaced by a single `INFO` note.
pub fn save(
    dir: &Path,
    kind: ExperimentKind,
    values: &BTreeMap<String, PoolValue>,
) -> Result<PathBuf, PhyError> {
    fs::create_dir_all(dir).map_err(|err| io_error("data.create_dir", dir, err))?;
    let path = data_path(dir, kind);
    let mut record = if path.exists() {
        let bytes = fs::read(&path).map_err(|err| io_error("data.read", &path, err))?;
        from_json_slice::<Value>(&bytes)?
    } else {
        kind.template()
    };
    strip_info(&mut record);
    let Value::Object(map) = &mut record else {
        return Err(PhyError::Data(
            ErrorInfo::new("data.not_object", "data record must be a JSON object")
                .with_context("path", path.display().to_string()),
        ));
    };
    for (key, value) in values {
        let encoded = serde_json::to_value(value).map_err(|err| {
            PhyError::Serde(ErrorInfo::new("json.encode", err.to_string()).with_context("key", key))
        })?;
        map.insert(key.clone(), encoded);
    }
    map.insert(INFO_KEY.to_string(), Value::String("cli input".to_string()));
    write_record(&path, &record)?;
    info!(path = %path.display(), updated = values.len(), "saved experiment data");
    Ok(path)
}

/// Parses comma separated numbers; accepts ASCII and full-width commas.
pub fn parse_series(text: &str) -> Result<Vec<f64>, PhyError> {
    text.replace('\u{ff0c}', ",")
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| {
                    PhyError::Data(
                        ErrorInfo::new("data.parse", "value is not a float").with_context("item", item),
                    )
                })
        })
        .collect()
}

fn write_record(path: &Path, record: &Value) -> Result<(), PhyError> {
    let body = to_pretty_json(record)?;
    fs::write(path, body).map_err(|err| io_error("data.write", path, err))
}

fn io_error(code: &str, path: &Path, err: std::io::Error) -> PhyError {
    PhyError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}
