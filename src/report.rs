//! Merge policy for JSON test reports.
//!
//! The first report seeds an accumulator and every later report is folded
//! into it. Array-valued keys accumulate in input order, while
//! `tests_failures` always holds the most recent report's failures: a test
//! that failed earlier but is absent later is taken to have passed on rerun.

use crate::error::{MergeError, Side};
use log::debug;
use serde_json::{Map, Value};

/// Key holding the failures observed in a single run.
pub const TESTS_FAILURES: &str = "tests_failures";

/// Key holding the run summary; the base report's value is kept as-is.
pub const TESTS_SUMMARY_MESSAGES: &str = "tests_summary_messages";

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, MergeError> {
    value.as_object_mut().ok_or(MergeError::NotAnObject)
}

/// Fold `incoming` into `base`.
///
/// Only keys already present in `base` are considered. A key missing from
/// `incoming` (or set to `null`) contributes nothing. If `incoming` carries
/// no `tests_failures`, the run is treated as having none.
///
/// # Errors
///
/// Returns [`MergeError::NotAnObject`] when either document is not an
/// object, and [`MergeError::NotAnArray`] when a concatenated key holds a
/// non-array value on either side. `base` is left untouched on error.
pub fn merge_reports(base: &mut Value, incoming: Value) -> Result<(), MergeError> {
    let Value::Object(mut incoming) = incoming else {
        return Err(MergeError::NotAnObject);
    };
    let base = as_object_mut(base)?;

    // Validate every key first so a failure leaves the accumulator intact.
    let mut appended = Vec::new();
    for (key, current) in base.iter() {
        if key == TESTS_FAILURES || key == TESTS_SUMMARY_MESSAGES {
            continue;
        }
        if !current.is_array() {
            return Err(not_an_array(key, Side::Base));
        }
        match incoming.remove(key) {
            None | Some(Value::Null) => {
                debug!("incoming report has no `{key}`; nothing to append");
            }
            Some(Value::Array(items)) => appended.push((key.clone(), items)),
            Some(_) => return Err(not_an_array(key, Side::Incoming)),
        }
    }

    for (key, mut items) in appended {
        if let Some(Value::Array(current)) = base.get_mut(&key) {
            current.append(&mut items);
        }
    }

    let failures = incoming
        .remove(TESTS_FAILURES)
        .unwrap_or_else(|| Value::Object(Map::new()));
    base.insert(TESTS_FAILURES.to_owned(), failures);
    Ok(())
}

fn not_an_array(key: &str, side: Side) -> MergeError {
    MergeError::NotAnArray {
        key: key.into(),
        side,
    }
}

/// Fold each report of `rest` into `base`, in order, and return the result.
///
/// # Errors
///
/// Returns the index within `rest` of the first report that failed to merge
/// alongside the [`MergeError`].
pub fn fold_reports<I>(mut base: Value, rest: I) -> Result<Value, (usize, MergeError)>
where
    I: IntoIterator<Item = Value>,
{
    for (index, incoming) in rest.into_iter().enumerate() {
        merge_reports(&mut base, incoming).map_err(|e| (index, e))?;
    }
    Ok(base)
}
