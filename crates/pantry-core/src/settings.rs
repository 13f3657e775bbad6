use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::coercion::DateProcessor;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Procurement spend analytics for housing-site canteens
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pantry-monitor",
    about = "Procurement spend analytics for housing-site canteens",
    version
)]
pub struct Settings {
    /// Table source: a local file path or an http(s) URL
    #[arg(long)]
    pub source: Option<String>,

    /// Bearer token sent with HTTP sources
    #[arg(long, env = "PANTRY_TOKEN")]
    pub token: Option<String>,

    /// Start of the reporting window (defaults to the data range)
    #[arg(long, value_parser = parse_cli_date)]
    pub from: Option<NaiveDate>,

    /// End of the reporting window (defaults to the data range)
    #[arg(long, value_parser = parse_cli_date)]
    pub to: Option<NaiveDate>,

    /// Housing site filter ("all" disables the filter)
    #[arg(long, default_value = "all")]
    pub site: String,

    /// Category filter ("all" disables the filter)
    #[arg(long, default_value = "all")]
    pub category: String,

    /// Number of entries in the item rankings
    #[arg(long, default_value = "10")]
    pub top_n: usize,

    /// Seconds before the cached table download goes stale
    #[arg(long, default_value = "300")]
    pub cache_ttl: u64,

    /// Bypass the table cache for this run
    #[arg(long)]
    pub refresh: bool,

    /// Report format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub report: String,

    /// Write the filtered records as CSV to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

/// Map a selector value to an equality filter.
///
/// The sentinel `"all"` (any casing) means "no filter applied"; because the
/// engine sees `None` in that case, the sentinel can never match a literal
/// data value.
pub fn selector_filter(value: &str) -> Option<String> {
    if value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    DateProcessor::parse(s).ok_or_else(|| format!("unrecognised date: {s}"))
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.pantry-monitor/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.pantry-monitor/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".pantry-monitor").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to the default path, creating parent directories
    /// if needed.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default config file if it exists.
    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] but accepts an explicit
    /// argument list, enabling unit-testing without spawning subprocesses.
    pub fn load_with_last_used_from_args(args: Vec<std::ffi::OsString>) -> Self {
        Self::load_with_last_used_impl(args, &LastUsedParams::config_path())
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());

        // Parse into the typed struct using the same args.
        let mut settings = Settings::parse_from(args);

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return settings;
        }

        let last = LastUsedParams::load_from(config_path);

        // Merge last-used values for fields that were NOT explicitly set on
        // the command line (CLI always wins). The date window is run-specific
        // and never loaded from last-used.
        if !is_arg_explicitly_set(&matches, "source") && settings.source.is_none() {
            settings.source = last.source;
        }
        if !is_arg_explicitly_set(&matches, "site") {
            if let Some(v) = last.site {
                settings.site = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "category") {
            if let Some(v) = last.category {
                settings.category = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top_n") {
            if let Some(v) = last.top_n {
                settings.top_n = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "cache_ttl") {
            if let Some(v) = last.cache_ttl {
                settings.cache_ttl = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "report") {
            if let Some(v) = last.report {
                settings.report = v;
            }
        }

        // Persist current settings for next run.
        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            source: s.source.clone(),
            site: Some(s.site.clone()),
            category: Some(s.category.clone()),
            top_n: Some(s.top_n),
            cache_ttl: Some(s.cache_ttl),
            report: Some(s.report.clone()),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Build the config path inside `tmp`.
    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    /// Save `params` to `tmp`, then load them back.
    fn round_trip(tmp: &TempDir, params: &LastUsedParams) -> LastUsedParams {
        let path = tmp_config_path(tmp);
        params.save_to(&path).expect("save");
        LastUsedParams::load_from(&path)
    }

    // ── selector_filter ───────────────────────────────────────────────────────

    #[test]
    fn test_selector_filter_all_is_none() {
        assert!(selector_filter("all").is_none());
        assert!(selector_filter("All").is_none());
        assert!(selector_filter("ALL").is_none());
    }

    #[test]
    fn test_selector_filter_literal_value() {
        assert_eq!(selector_filter("Site A"), Some("Site A".to_string()));
    }

    // ── LastUsedParams persistence ────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let params = LastUsedParams {
            source: Some("/data/table.csv".to_string()),
            site: Some("Site A".to_string()),
            category: Some("Food".to_string()),
            top_n: Some(5),
            cache_ttl: Some(600),
            report: Some("json".to_string()),
        };

        let loaded = round_trip(&tmp, &params);

        assert_eq!(loaded.source, Some("/data/table.csv".to_string()));
        assert_eq!(loaded.site, Some("Site A".to_string()));
        assert_eq!(loaded.category, Some("Food".to_string()));
        assert_eq!(loaded.top_n, Some(5));
        assert_eq!(loaded.cache_ttl, Some(600));
        assert_eq!(loaded.report, Some("json".to_string()));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            site: Some("Site A".to_string()),
            ..Default::default()
        };
        params.save_to(&path).expect("save");
        assert!(path.exists(), "file must exist after save");

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists(), "file must be gone after clear");
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.source.is_none());
        assert!(loaded.site.is_none());
        assert!(loaded.category.is_none());
        assert!(loaded.top_n.is_none());
        assert!(loaded.cache_ttl.is_none());
        assert!(loaded.report.is_none());
    }

    // ── Settings defaults ─────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["pantry-monitor"]);

        assert!(settings.source.is_none());
        assert!(settings.from.is_none());
        assert!(settings.to.is_none());
        assert_eq!(settings.site, "all");
        assert_eq!(settings.category, "all");
        assert_eq!(settings.top_n, 10);
        assert_eq!(settings.cache_ttl, 300);
        assert!(!settings.refresh);
        assert_eq!(settings.report, "text");
        assert!(settings.export.is_none());
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_settings_cli_date_window() {
        let settings =
            Settings::parse_from(["pantry-monitor", "--from", "2024-01-01", "--to", "2024-02-01"]);
        assert_eq!(
            settings.from,
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(
            settings.to,
            Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
        );
    }

    #[test]
    fn test_settings_cli_day_first_date() {
        let settings = Settings::parse_from(["pantry-monitor", "--from", "15/01/2024"]);
        assert_eq!(
            settings.from,
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_settings_cli_site_and_category() {
        let settings = Settings::parse_from([
            "pantry-monitor",
            "--site",
            "Site A",
            "--category",
            "Food",
        ]);
        assert_eq!(settings.site, "Site A");
        assert_eq!(settings.category, "Food");
    }

    #[test]
    fn test_settings_cli_debug_flag() {
        let settings = Settings::parse_from(["pantry-monitor", "--debug"]);
        assert!(settings.debug);
    }

    // ── From<&Settings> for LastUsedParams ────────────────────────────────────

    #[test]
    fn test_from_settings_to_last_used() {
        let mut settings = Settings::parse_from(["pantry-monitor"]);
        settings.source = Some("https://example.test/table".to_string());
        settings.site = "Site B".to_string();
        settings.top_n = 3;

        let last = LastUsedParams::from(&settings);

        assert_eq!(last.source, Some("https://example.test/table".to_string()));
        assert_eq!(last.site, Some("Site B".to_string()));
        assert_eq!(last.top_n, Some(3));
        // The date window is not persisted.
    }

    // ── load_with_last_used (uses config path injection) ──────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_site() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            site: Some("Site A".to_string()),
            ..Default::default()
        };
        params.save_to(&config_path).expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["pantry-monitor".into()], &config_path);
        assert_eq!(settings.site, "Site A");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            site: Some("Site A".to_string()),
            ..Default::default()
        };
        params.save_to(&config_path).expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["pantry-monitor".into(), "--site".into(), "Site B".into()],
            &config_path,
        );
        assert_eq!(settings.site, "Site B");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            site: Some("Site A".to_string()),
            ..Default::default()
        };
        params.save_to(&config_path).expect("save");
        assert!(config_path.exists(), "file must exist before clear");

        Settings::load_with_last_used_impl(
            vec!["pantry-monitor".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["pantry-monitor".into(), "--debug".into()],
            &config_path,
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec!["pantry-monitor".into(), "--top-n".into(), "7".into()],
            &config_path,
        );

        assert!(
            config_path.exists(),
            "config file must be persisted after run"
        );
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.top_n, Some(7));
    }

    #[test]
    fn test_load_with_last_used_source_from_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            source: Some("/data/table.csv".to_string()),
            ..Default::default()
        };
        params.save_to(&config_path).expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["pantry-monitor".into()], &config_path);
        assert_eq!(settings.source, Some("/data/table.csv".to_string()));
    }
}
