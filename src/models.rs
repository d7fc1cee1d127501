use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Top-level container scoping test runs and test cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Remaining fields, kept as returned by the service.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named execution cycle inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRun {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reply of the identity check (`account/me`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "loggedIn", default, deserialize_with = "null_as_default")]
    pub logged_in: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataList<T> {
    pub(crate) data: Vec<T>,
}

impl<T> DataList<T> {
    pub(crate) fn into_first(self) -> Option<T> {
        self.data.into_iter().next()
    }
}
