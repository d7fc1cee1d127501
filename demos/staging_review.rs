use anyhow::{Result, bail};
use testiny::{Client, ResultEntry, ResultStatus};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Configure authentication via env vars or a `.testinyrc` file.
    let mut client = Client::from_env()?;
    client.select_project("My Demo Project")?;

    let Some(run) = client.get_test_run("Staging Review 2")? else {
        bail!("test run 'Staging Review 2' not found");
    };
    println!("{run:#?}");

    let cases = client.get_test_cases_for_run(&run)?;
    println!("{cases:#?}");
    if cases.len() < 4 {
        bail!("expected at least 4 test cases, found {}", cases.len());
    }

    client.update_results_for_run(
        &run,
        vec![
            ResultEntry::new(cases[0].id, ResultStatus::Blocked),
            ResultEntry::new(cases[1].id, "PASSED"),
            ResultEntry::new(cases[2].id, false),
            ResultEntry::new(cases[3].id, None::<bool>),
        ],
    )?;
    Ok(())
}
