use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::refs::invalid;
use crate::status::{ResultStatus, normalize_status};

/// One result to write back: a test case and its status in the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    pub testcase_id: i64,
    pub result_status: ResultStatus,
}

impl ResultEntry {
    pub fn new(testcase_id: i64, result: impl Into<ResultStatus>) -> Self {
        Self {
            testcase_id,
            result_status: result.into(),
        }
    }
}

impl<S: Into<ResultStatus>> From<(i64, S)> for ResultEntry {
    fn from((testcase_id, result): (i64, S)) -> Self {
        ResultEntry::new(testcase_id, result)
    }
}

impl TryFrom<&Value> for ResultEntry {
    type Error = Error;

    /// Accepts `[testcase_id, result]` or an object with `testcase_id` (or `id`)
    /// and `result_status` (or `result`). A missing result means NOTRUN.
    fn try_from(value: &Value) -> Result<Self> {
        let (id, result) = match value {
            Value::Array(pair) => (pair.first(), pair.get(1)),
            Value::Object(map) => (
                first_present(&[map.get("testcase_id"), map.get("id")]),
                first_present(&[map.get("result_status"), map.get("result")]),
            ),
            other => return Err(invalid("[testcase_id, result] pair or result object", other)),
        };

        let testcase_id = id
            .and_then(Value::as_i64)
            .ok_or_else(|| invalid("integer testcase id in result entry", value))?;
        let result_status = normalize_status(result.unwrap_or(&Value::Null));

        Ok(ResultEntry {
            testcase_id,
            result_status,
        })
    }
}

fn first_present<'a>(candidates: &[Option<&'a Value>]) -> Option<&'a Value> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|v| !v.is_null())
}

/// The results written in one bulk update.
///
/// A single entry converts into a one-element batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBatch(pub Vec<ResultEntry>);

impl ResultBatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn mappings(&self, testrun_id: i64) -> Vec<MappingUpdate> {
        self.0
            .iter()
            .map(|entry| MappingUpdate {
                ids: MappingIds {
                    testrun_id,
                    testcase_id: entry.testcase_id,
                },
                mapped: MappedFields {
                    result_status: entry.result_status.clone(),
                },
            })
            .collect()
    }
}

impl From<ResultEntry> for ResultBatch {
    fn from(entry: ResultEntry) -> Self {
        ResultBatch(vec![entry])
    }
}

impl From<Vec<ResultEntry>> for ResultBatch {
    fn from(entries: Vec<ResultEntry>) -> Self {
        ResultBatch(entries)
    }
}

impl<const N: usize> From<[ResultEntry; N]> for ResultBatch {
    fn from(entries: [ResultEntry; N]) -> Self {
        ResultBatch(entries.into())
    }
}

impl FromIterator<ResultEntry> for ResultBatch {
    fn from_iter<I: IntoIterator<Item = ResultEntry>>(iter: I) -> Self {
        ResultBatch(iter.into_iter().collect())
    }
}

impl TryFrom<&Value> for ResultBatch {
    type Error = Error;

    /// An array is a list of entries; anything else is a single entry.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items.iter().map(ResultEntry::try_from).collect(),
            single => ResultEntry::try_from(single).map(ResultBatch::from),
        }
    }
}

/// Association record between a test case and a test run, as written by
/// `testcase/mapping/bulk/testcase:testrun`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MappingUpdate {
    pub(crate) ids: MappingIds,
    pub(crate) mapped: MappedFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MappingIds {
    pub(crate) testrun_id: i64,
    pub(crate) testcase_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MappedFields {
    pub(crate) result_status: ResultStatus,
}
