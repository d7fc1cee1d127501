//! A small Rust client for the Testiny test-management API.
//!
//! The typical flow: select a project, find a test run, list its test
//! cases, then write back result statuses in one bulk request.
//!
//! ## Quick start
//! - Configure authentication via environment variables (`TESTINY_APIKEY`,
//!   optionally `TESTINY_BASEURL`) or a `.testinyrc` file (supported in the
//!   current directory and in your home directory).
//! - Select a project, then call the run and result methods on [`Client`].
//!
//! ```no_run
//! use testiny::{Client, ResultEntry};
//!
//! fn main() -> testiny::Result<()> {
//!     let mut client = Client::from_env()?;
//!     client.select_project("My Demo Project")?;
//!
//!     let cases = client.get_test_cases_for_run("Staging Review 2")?;
//!     let results: Vec<ResultEntry> = cases
//!         .iter()
//!         .map(|case| ResultEntry::new(case.id, "PASS"))
//!         .collect();
//!     client.update_results_for_run("Staging Review 2", results)?;
//!     Ok(())
//! }
//! ```
//!
//! Result values are normalized by [`normalize_status`]: booleans, `0`/`1`
//! and common words such as `"ok"` or `"failure"` map onto
//! [`ResultStatus`]; other text is passed through upper-cased.

#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
mod models;
mod refs;
mod results;
mod status;
mod transport;
mod util;

pub use client::{Client, ClientConfig};
pub use config::DEFAULT_BASE_URL;
pub use error::{Error, Result};
pub use models::{Account, Project, TestCase, TestRun};
pub use refs::{ProjectRef, RunRef};
pub use reqwest::Method;
pub use results::{ResultBatch, ResultEntry};
pub use status::{ResultStatus, normalize_status};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
