use std::path::{Path, PathBuf};

use crate::client::ClientConfig;
use crate::error::{Error, Result};
use crate::util::{env_non_empty, normalize_base_url};

/// Production endpoint used when no base URL is configured anywhere.
pub const DEFAULT_BASE_URL: &str = "https://app.testiny.io/";

pub(crate) const ENV_API_KEY: &str = "TESTINY_APIKEY";
pub(crate) const ENV_BASE_URL: &str = "TESTINY_BASEURL";
pub(crate) const ENV_RC: &str = "TESTINY_RC";
const RC_FILE_NAME: &str = ".testinyrc";

#[derive(Debug, Default, PartialEq)]
struct RcConfig {
    url: Option<String>,
    key: Option<String>,
    verify: Option<bool>,
}

pub(crate) fn load_config(
    url: Option<String>,
    key: Option<String>,
    verify: Option<bool>,
) -> Result<ClientConfig> {
    resolve_config(url, key, verify, env_non_empty, &rc_candidates())
}

/// Precedence per field: explicit argument, environment, first existing rc file, default.
fn resolve_config(
    url: Option<String>,
    key: Option<String>,
    verify: Option<bool>,
    env: impl Fn(&str) -> Option<String>,
    rc_candidates: &[PathBuf],
) -> Result<ClientConfig> {
    let mut url = url.or_else(|| env(ENV_BASE_URL));
    let mut key = key.or_else(|| env(ENV_API_KEY));
    let mut file_verify: Option<bool> = None;

    if url.is_none() || key.is_none() || verify.is_none() {
        if let Some(rc_path) = rc_candidates.iter().find(|p| p.exists()) {
            let cfg = read_rc(rc_path).map_err(|source| Error::Config {
                path: rc_path.clone(),
                source,
            })?;
            tracing::debug!(path = %rc_path.display(), "loaded Testiny configuration file");
            url = url.or(cfg.url);
            key = key.or(cfg.key);
            file_verify = cfg.verify;
        }
    }

    let url = normalize_base_url(url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
    // An absent key is not fatal here; every request checks it again.
    let key = key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let verify = verify.or(file_verify).unwrap_or(true);

    Ok(ClientConfig {
        url,
        key,
        verify,
        timeout: None,
    })
}

fn read_rc(path: &Path) -> std::io::Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

impl RcConfig {
    fn set(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        match name {
            "url" => self.url = Some(value.to_string()),
            "key" => self.key = Some(value.to_string()),
            "verify" => self.verify = Some(value != "0"),
            _ => {}
        }
    }
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .peekable();

    while let Some(line) = lines.next() {
        // URLs contain colons themselves, so only the first one separates.
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let mut value = strip_quotes(value);
        // A bare `name:` takes its value from the next line unless that line is another entry.
        if value.is_empty() {
            if let Some(next) = lines.next_if(|l| !l.contains(':')) {
                value = strip_quotes(next);
            }
        }
        cfg.set(name.trim(), value);
    }

    cfg
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    ['"', '\'']
        .into_iter()
        .find_map(|q| s.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(s)
}

/// `TESTINY_RC` alone when set, otherwise `./.testinyrc` then `~/.testinyrc`.
fn rc_candidates() -> Vec<PathBuf> {
    if let Some(explicit) = env_non_empty(ENV_RC) {
        return vec![PathBuf::from(explicit)];
    }
    [std::env::current_dir().ok(), dirs::home_dir()]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(RC_FILE_NAME))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn write_rc(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_when_nothing_is_configured() {
        let cfg = resolve_config(None, None, None, env_from(&[]), &[]).unwrap();
        assert_eq!(cfg.url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(cfg.key, None);
        assert!(cfg.verify);
        assert_eq!(cfg.timeout, None);
    }

    #[test]
    fn explicit_arguments_win_over_environment() {
        let env = env_from(&[
            (ENV_API_KEY, "env-key"),
            (ENV_BASE_URL, "https://env.testiny.example/"),
        ]);
        let cfg = resolve_config(
            Some("https://arg.testiny.example".into()),
            Some("  arg-key \n".into()),
            None,
            env,
            &[],
        )
        .unwrap();
        assert_eq!(cfg.url.as_str(), "https://arg.testiny.example/");
        assert_eq!(cfg.key.as_deref(), Some("arg-key"));
    }

    #[test]
    fn environment_is_used_when_no_arguments() {
        let env = env_from(&[(ENV_API_KEY, "env-key"), (ENV_BASE_URL, "http://localhost:8080")]);
        let cfg = resolve_config(None, None, None, env, &[]).unwrap();
        assert_eq!(cfg.url.as_str(), "http://localhost:8080/");
        assert_eq!(cfg.key.as_deref(), Some("env-key"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let cfg = resolve_config(None, Some("   ".into()), None, env_from(&[]), &[]).unwrap();
        assert_eq!(cfg.key, None);
    }

    #[test]
    fn malformed_url_fails_construction() {
        let err = resolve_config(Some("not a url".into()), None, None, env_from(&[]), &[])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn rc_file_fills_missing_fields() {
        let rc = write_rc("# testiny\nurl: https://rc.testiny.example/\nkey: 'rc-key'\nverify: 0\n");
        let env = env_from(&[(ENV_API_KEY, "env-key")]);
        let cfg = resolve_config(None, None, None, env, &[rc.path().to_path_buf()]).unwrap();
        assert_eq!(cfg.url.as_str(), "https://rc.testiny.example/");
        assert_eq!(cfg.key.as_deref(), Some("env-key"));
        assert!(!cfg.verify);
    }

    #[test]
    fn missing_rc_candidates_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join(RC_FILE_NAME);
        let rc = write_rc("key: second");
        let cfg = resolve_config(
            None,
            None,
            Some(true),
            env_from(&[]),
            &[absent, rc.path().to_path_buf()],
        )
        .unwrap();
        assert_eq!(cfg.key.as_deref(), Some("second"));
        assert!(cfg.verify);
    }

    #[test]
    fn rc_value_on_following_line() {
        let cfg = parse_rc("key:\n  \"abc123\"\nurl: https://x.example/\n");
        assert_eq!(
            cfg,
            RcConfig {
                url: Some("https://x.example/".into()),
                key: Some("abc123".into()),
                verify: None,
            }
        );
    }

    #[test]
    fn bare_entry_does_not_swallow_the_next_entry() {
        let cfg = parse_rc("key:\nurl: https://x.example/\nverify:\n0\n");
        assert_eq!(
            cfg,
            RcConfig {
                url: Some("https://x.example/".into()),
                key: None,
                verify: Some(false),
            }
        );
    }

    #[test]
    fn quotes_are_stripped_only_in_pairs() {
        assert_eq!(strip_quotes(" 'abc' "), "abc");
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("\"abc'"), "\"abc'");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
