use std::path::PathBuf;

use anyhow::Context;
use codedrop_db::dedup::{DEFAULT_DEDUP_WINDOW_MINUTES, DEFAULT_SIMILAR_LIMIT};

/// Path value that opens an in-memory database instead of a file.
pub const IN_MEMORY: &str = ":memory:";

/// One minute up to one week.
const DEDUP_WINDOW_MINUTES_RANGE: std::ops::RangeInclusive<i64> = 1..=10_080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub dedup_window_minutes: i64,
    pub similar_limit: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let db_path = lookup("CODEDROP_DB_PATH")
            .unwrap_or_else(|| "codedrop.db".into())
            .into();

        let dedup_window_minutes = match lookup("CODEDROP_DEDUP_WINDOW_MINUTES") {
            Some(raw) => {
                let minutes: i64 = raw.parse().with_context(|| {
                    format!("CODEDROP_DEDUP_WINDOW_MINUTES={raw:?} is not a number")
                })?;
                if !DEDUP_WINDOW_MINUTES_RANGE.contains(&minutes) {
                    anyhow::bail!(
                        "CODEDROP_DEDUP_WINDOW_MINUTES={minutes} is outside {}..={} minutes",
                        DEDUP_WINDOW_MINUTES_RANGE.start(),
                        DEDUP_WINDOW_MINUTES_RANGE.end()
                    );
                }
                minutes
            }
            None => DEFAULT_DEDUP_WINDOW_MINUTES,
        };

        let similar_limit = match lookup("CODEDROP_SIMILAR_LIMIT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("CODEDROP_SIMILAR_LIMIT={raw:?} is not a number"))?,
            None => DEFAULT_SIMILAR_LIMIT,
        };

        Ok(Self {
            db_path,
            dedup_window_minutes,
            similar_limit,
        })
    }

    pub fn in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("codedrop.db"));
        assert_eq!(config.dedup_window_minutes, 60);
        assert_eq!(config.similar_limit, 5);
        assert!(!config.in_memory());
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CODEDROP_DB_PATH", ":memory:"),
            ("CODEDROP_DEDUP_WINDOW_MINUTES", "15"),
            ("CODEDROP_SIMILAR_LIMIT", "3"),
        ]))
        .unwrap();
        assert!(config.in_memory());
        assert_eq!(config.dedup_window_minutes, 15);
        assert_eq!(config.similar_limit, 3);
    }

    #[test]
    fn dedup_window_is_bounded() {
        for raw in ["0", "-5", "10081", "9223372036854775807"] {
            let err = Config::from_lookup(lookup(&[("CODEDROP_DEDUP_WINDOW_MINUTES", raw)]))
                .unwrap_err();
            assert!(
                err.to_string().contains("CODEDROP_DEDUP_WINDOW_MINUTES"),
                "{raw}: {err}"
            );
        }

        for raw in ["1", "10080"] {
            let config =
                Config::from_lookup(lookup(&[("CODEDROP_DEDUP_WINDOW_MINUTES", raw)])).unwrap();
            assert_eq!(config.dedup_window_minutes.to_string(), raw);
        }
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = Config::from_lookup(lookup(&[("CODEDROP_SIMILAR_LIMIT", "five")])).unwrap_err();
        assert!(err.to_string().contains("CODEDROP_SIMILAR_LIMIT"));
    }
}
