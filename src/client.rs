use std::fmt;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::config::load_config;
use crate::error::{Error, Result, error_from_body};
use crate::models::{Account, DataList, Project, TestCase, TestRun};
use crate::refs::{ProjectRef, RunRef};
use crate::results::ResultBatch;
use crate::transport::{ApiRequest, HttpTransport, Transport};
use crate::util::endpoint_url;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the Testiny app, always ending in `/`.
    pub url: Url,
    /// API key sent as `x-api-key`. Requests fail with
    /// [`Error::MissingCredential`] while this is `None`.
    pub key: Option<String>,
    /// Whether to verify TLS certificates.
    pub verify: bool,
    /// Per-request timeout; `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Resolves a configuration from explicit values, then `TESTINY_APIKEY` /
    /// `TESTINY_BASEURL`, then `TESTINY_RC` or `.testinyrc`.
    pub fn resolve(key: Option<String>, url: Option<String>) -> Result<Self> {
        load_config(url, key, None)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Client for the Testiny REST API.
///
/// Holds the selected project as session state: run and case lookups are
/// scoped to it, so call [`Client::select_project`] first. Until a project
/// is selected the id is 0 and the service simply matches nothing.
pub struct Client {
    url: Url,
    key: Option<String>,
    project_id: i64,
    connected: bool,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url.as_str())
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("project_id", &self.project_id)
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client from `TESTINY_APIKEY` / `TESTINY_BASEURL` and/or `.testinyrc`.
    pub fn from_env() -> Result<Self> {
        Self::with_overrides(None, None)
    }

    /// Creates a client with an optional API key and base URL taking
    /// precedence over the environment.
    pub fn with_overrides(key: Option<String>, url: Option<String>) -> Result<Self> {
        Self::new(ClientConfig::resolve(key, url)?)
    }

    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.verify, config.timeout)?;
        Ok(Self {
            url: config.url,
            key: config.key,
            project_id: 0,
            connected: false,
            transport: Box::new(transport),
        })
    }

    /// Replaces the HTTP transport, e.g. with a recording double in tests.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.url
    }

    /// Id of the selected project, 0 if none is selected.
    pub fn project_id(&self) -> i64 {
        self.project_id
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Checks that the API key works; returns the account when logged in.
    pub fn check_connection(&self) -> Result<Option<Account>> {
        let me: Account = self.get("account/me")?;
        Ok(me.logged_in.then_some(me))
    }

    /// Verifies the API key against `account/me` and marks the client connected.
    ///
    /// [`Client::select_project`] runs this on its first call, so an invalid
    /// key is reported before any project-scoped query is made.
    pub fn connect(&mut self) -> Result<Account> {
        let account = self.check_connection()?.ok_or(Error::NotLoggedIn)?;
        self.connected = true;
        tracing::debug!(url = %self.url, "connected to Testiny");
        Ok(account)
    }

    pub fn get_projects(&self) -> Result<Vec<Project>> {
        let list: DataList<Project> = self.get("project")?;
        Ok(list.data)
    }

    /// Finds a project by id or name; `None` looks up the selected project.
    pub fn get_project(&self, project: Option<ProjectRef>) -> Result<Option<Project>> {
        let find = match project {
            None => json!({ "id": self.project_id }),
            Some(ProjectRef::ById(id)) => json!({ "id": id }),
            Some(ProjectRef::ByName(name)) => json!({ "filter": { "name": name } }),
            Some(ProjectRef::Resolved(p)) => {
                return Err(Error::InvalidArgument(format!(
                    "get_project expects a project id or name, got project {}",
                    p.id
                )));
            }
        };
        let list: DataList<Project> = self.post("project/find", &[], &find)?;
        Ok(list.into_first())
    }

    /// Selects the project used as context by all run and case calls.
    /// Returns the selected project id.
    pub fn select_project(&mut self, project: impl Into<ProjectRef>) -> Result<i64> {
        if !self.connected {
            self.connect()?;
        }

        let id = match project.into() {
            ProjectRef::Resolved(p) => p.id,
            lookup => {
                let label = lookup.label();
                self.get_project(Some(lookup))?
                    .ok_or(Error::ProjectNotFound(label))?
                    .id
            }
        };

        self.project_id = id;
        tracing::info!(project_id = id, "selected Testiny project");
        Ok(id)
    }

    /// Finds a test run by id or title inside the selected project.
    pub fn get_test_run(&self, run: impl Into<RunRef>) -> Result<Option<TestRun>> {
        let find = match run.into() {
            RunRef::ById(id) => json!({ "id": id, "filter": { "project_id": self.project_id } }),
            RunRef::ByTitle(title) => {
                json!({ "filter": { "title": title, "project_id": self.project_id } })
            }
            RunRef::Resolved(r) => {
                return Err(Error::InvalidArgument(format!(
                    "get_test_run expects a test run id or title, got test run {}",
                    r.id
                )));
            }
        };
        let list: DataList<TestRun> = self.post("testrun/find", &[], &find)?;
        Ok(list.into_first())
    }

    fn resolve_run(&self, run: RunRef) -> Result<TestRun> {
        match run {
            RunRef::Resolved(run) => Ok(run),
            lookup => {
                let label = lookup.label();
                self.get_test_run(lookup)?
                    .ok_or(Error::TestRunNotFound(label))
            }
        }
    }

    /// Lists every test case mapped to a test run.
    pub fn get_test_cases_for_run(&self, run: impl Into<RunRef>) -> Result<Vec<TestCase>> {
        let run = self.resolve_run(run.into())?;
        let find = json!({
            "map": {
                "entities": ["testcase", "testrun"],
                "ids": [{ "testrun_id": run.id }]
            }
        });
        let list: DataList<TestCase> = self.post("testcase/find", &[], &find)?;
        Ok(list.data)
    }

    /// Writes result statuses for test cases of a run in one bulk request.
    ///
    /// The batch succeeds or fails as a whole. Returns the service reply.
    pub fn update_results_for_run(
        &self,
        run: impl Into<RunRef>,
        results: impl Into<ResultBatch>,
    ) -> Result<Value> {
        let run = self.resolve_run(run.into())?;
        let mappings = results.into().mappings(run.id);
        tracing::info!(
            testrun_id = run.id,
            count = mappings.len(),
            "updating test case results"
        );
        self.post(
            "testcase/mapping/bulk/testcase:testrun",
            &[("op", "update")],
            &mappings,
        )
    }

    fn get<TResp: DeserializeOwned>(&self, endpoint: &str) -> Result<TResp> {
        let value = self.send(Method::GET, endpoint, &[], None)?;
        serde_json::from_value(value).map_err(Error::InvalidResponse)
    }

    fn post<TReq: Serialize + ?Sized, TResp: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &TReq,
    ) -> Result<TResp> {
        let body = serde_json::to_string(body).map_err(Error::Serialize)?;
        let value = self.send(Method::POST, endpoint, query, Some(body))?;
        serde_json::from_value(value).map_err(Error::InvalidResponse)
    }

    /// Performs one call against `<base>api/v1/<endpoint>` and returns the
    /// parsed JSON reply.
    ///
    /// HTTP status >= 400 becomes [`Error::Api`] with the service's
    /// `message`; a body that is not JSON becomes [`Error::InvalidResponse`].
    pub fn request(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value> {
        let body = body.map(Value::to_string);
        self.send(method, endpoint, query, body)
    }

    fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<Value> {
        let key = self.key.as_deref().ok_or(Error::MissingCredential)?;

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(key)?);
        if method == Method::POST || method == Method::PUT {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let request = ApiRequest {
            url: endpoint_url(&self.url, endpoint, query)?,
            method,
            headers,
            body,
        };
        tracing::debug!(method = %request.method, url = %request.url, "sending API request");

        let resp = self.transport.send(&request)?;
        tracing::debug!(status = resp.status, url = %request.url, "received API response");

        if resp.status >= 400 {
            return Err(error_from_body(resp.status, &resp.body));
        }
        serde_json::from_str(&resp.body).map_err(Error::InvalidResponse)
    }
}
