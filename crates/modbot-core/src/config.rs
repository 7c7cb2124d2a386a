use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, security::AdminSet, Result};

/// Placeholder shipped in sample configs; never a usable token.
pub const PLACEHOLDER_TOKEN: &str = "<PUT_YOUR_TOKEN_HERE>";

/// Typed configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    pub admins: AdminSet,
    pub data_file: PathBuf,

    // Telegram limits
    pub telegram_safe_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| lookup("BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;
        if telegram_bot_token.trim() == PLACEHOLDER_TOKEN {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN still holds the placeholder value".to_string(),
            ));
        }

        let admin_ids = parse_csv_i64(lookup("MODBOT_ADMINS"))?;
        let admins = AdminSet::new(admin_ids)?;

        let data_file = lookup("MODBOT_DATA_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("mod_data.json"));

        let telegram_safe_limit = lookup("TELEGRAM_SAFE_LIMIT")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(4000);

        Ok(Self {
            telegram_bot_token,
            admins,
            data_file,
            telegram_safe_limit,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn parse_csv_i64(v: Option<String>) -> Result<Vec<i64>> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| Error::Config(format!("MODBOT_ADMINS: invalid user id {s:?}")))
        })
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::UserId;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn loads_defaults() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("MODBOT_ADMINS", "1, 2,3"),
        ]))
        .unwrap();

        assert_eq!(cfg.telegram_bot_token, "123:abc");
        assert!(cfg.admins.is_admin(Some(UserId(2))));
        assert!(!cfg.admins.is_admin(Some(UserId(4))));
        assert_eq!(cfg.data_file, PathBuf::from("mod_data.json"));
        assert_eq!(cfg.telegram_safe_limit, 4000);
    }

    #[test]
    fn falls_back_to_bot_token() {
        let cfg = Config::from_lookup(lookup(&[
            ("BOT_TOKEN", "456:def"),
            ("MODBOT_ADMINS", "7"),
            ("MODBOT_DATA_FILE", "/var/lib/modbot/state.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.telegram_bot_token, "456:def");
        assert_eq!(cfg.data_file, PathBuf::from("/var/lib/modbot/state.json"));
    }

    #[test]
    fn rejects_placeholder_token() {
        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", PLACEHOLDER_TOKEN),
            ("MODBOT_ADMINS", "1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn requires_token() {
        let err = Config::from_lookup(lookup(&[("MODBOT_ADMINS", "1")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn requires_admins() {
        let err = Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "x")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "x"),
            ("MODBOT_ADMINS", "1,bob"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn strips_dotenv_quotes() {
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("'abc'"), "abc");
        assert_eq!(strip_quotes("abc"), "abc");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn dotenv_fills_missing_vars_only() {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let path = std::path::PathBuf::from(format!(
            "/tmp/modbot-dotenv-{}-{ts}.env",
            std::process::id()
        ));
        fs::write(
            &path,
            "# MODBOT_TEST_DOTENV_COMMENT=nope\n\
             \n\
             MODBOT_TEST_DOTENV_PLAIN=plain\n\
             MODBOT_TEST_DOTENV_QUOTED=\"quoted value\"\n\
             MODBOT_TEST_DOTENV_PRESET=from-file\n\
             not a pair\n",
        )
        .unwrap();
        env::set_var("MODBOT_TEST_DOTENV_PRESET", "from-env");

        load_dotenv_if_present(&path);

        assert_eq!(env::var("MODBOT_TEST_DOTENV_PLAIN").unwrap(), "plain");
        assert_eq!(env::var("MODBOT_TEST_DOTENV_QUOTED").unwrap(), "quoted value");
        assert_eq!(env::var("MODBOT_TEST_DOTENV_PRESET").unwrap(), "from-env");
        assert!(env::var_os("MODBOT_TEST_DOTENV_COMMENT").is_none());
        assert!(env::var_os("# MODBOT_TEST_DOTENV_COMMENT").is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_dotenv_is_ignored() {
        load_dotenv_if_present(Path::new("/tmp/modbot-no-such-file.env"));
    }
}
