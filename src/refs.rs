//! Arguments that name a project or a test run by id, by name/title, or by
//! an entity the caller already fetched.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Project, TestRun};

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectRef {
    ById(i64),
    ByName(String),
    /// Already resolved; selecting it needs no lookup.
    Resolved(Project),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunRef {
    ById(i64),
    ByTitle(String),
    /// Already resolved; no `testrun/find` is issued for it.
    Resolved(TestRun),
}

impl ProjectRef {
    pub(crate) fn label(&self) -> String {
        match self {
            ProjectRef::ById(id) => id.to_string(),
            ProjectRef::ByName(name) => name.clone(),
            ProjectRef::Resolved(p) => p.id.to_string(),
        }
    }
}

impl RunRef {
    pub(crate) fn label(&self) -> String {
        match self {
            RunRef::ById(id) => id.to_string(),
            RunRef::ByTitle(title) => title.clone(),
            RunRef::Resolved(run) => run.id.to_string(),
        }
    }
}

impl From<i64> for ProjectRef {
    fn from(id: i64) -> Self {
        ProjectRef::ById(id)
    }
}

impl From<&str> for ProjectRef {
    fn from(name: &str) -> Self {
        ProjectRef::ByName(name.to_string())
    }
}

impl From<String> for ProjectRef {
    fn from(name: String) -> Self {
        ProjectRef::ByName(name)
    }
}

impl From<Project> for ProjectRef {
    fn from(project: Project) -> Self {
        ProjectRef::Resolved(project)
    }
}

impl From<&Project> for ProjectRef {
    fn from(project: &Project) -> Self {
        ProjectRef::Resolved(project.clone())
    }
}

impl From<i64> for RunRef {
    fn from(id: i64) -> Self {
        RunRef::ById(id)
    }
}

impl From<&str> for RunRef {
    fn from(title: &str) -> Self {
        RunRef::ByTitle(title.to_string())
    }
}

impl From<String> for RunRef {
    fn from(title: String) -> Self {
        RunRef::ByTitle(title)
    }
}

impl From<TestRun> for RunRef {
    fn from(run: TestRun) -> Self {
        RunRef::Resolved(run)
    }
}

impl From<&TestRun> for RunRef {
    fn from(run: &TestRun) -> Self {
        RunRef::Resolved(run.clone())
    }
}

impl TryFrom<&Value> for ProjectRef {
    type Error = Error;

    /// Objects are taken as resolved projects; a missing `id` becomes 0.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Number(_) => integer_id(value).map(ProjectRef::ById),
            Value::String(name) => Ok(ProjectRef::ByName(name.clone())),
            Value::Object(map) => {
                let id = match map.get("id") {
                    None | Some(Value::Null) => 0,
                    Some(id) => integer_id(id)?,
                };
                let mut extra = map.clone();
                extra.remove("id");
                let name = match extra.remove("name") {
                    Some(Value::String(name)) => name,
                    _ => String::new(),
                };
                Ok(ProjectRef::Resolved(Project { id, name, extra }))
            }
            other => Err(invalid("project id, name or object", other)),
        }
    }
}

impl TryFrom<&Value> for RunRef {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Number(_) => integer_id(value).map(RunRef::ById),
            Value::String(title) => Ok(RunRef::ByTitle(title.clone())),
            Value::Object(_) => serde_json::from_value::<TestRun>(value.clone())
                .map(RunRef::Resolved)
                .map_err(|e| Error::InvalidArgument(format!("not a test run object: {e}"))),
            other => Err(invalid("test run id, title or object", other)),
        }
    }
}

fn integer_id(value: &Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| invalid("integer id", value))
}

pub(crate) fn invalid(expected: &str, got: &Value) -> Error {
    Error::InvalidArgument(format!("expected {expected}, got {got}"))
}
