//! Snapshot filename rendering and inversion.
//!
//! Filenames are built from a template (`SNAPSHOT_{date}_{type}_{milestone}.md`
//! by default) and later inverted back into their parts by a regex derived
//! from the same template. Rendering and parsing are exact inverses for any
//! milestone that passes validation, so a filename is the snapshot's id.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::config::SnapshotPolicy;
use crate::{ChronicleError, Result};

/// Prefix that distinguishes archive bundles from active snapshots.
pub const ARCHIVE_PREFIX: &str = "ARCHIVE_";

/// Milestone reported for filenames that do not conform to the template.
pub const UNKNOWN_MILESTONE: &str = "Unknown";

/// Parts recovered from a conforming snapshot filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub date: NaiveDate,
    pub capture_type: String,
    pub milestone: String,
}

/// Compiled filename codec for one snapshot policy.
#[derive(Debug)]
pub struct SnapshotNaming {
    date_format: String,
    filename_pattern: String,
    name_regex: Regex,
    archive_regex: Regex,
}

impl SnapshotNaming {
    /// Compile the template and its archive-name counterpart.
    ///
    /// # Errors
    /// `ChronicleError::Configuration` when the template produces an invalid
    /// regex (possible with exotic literal characters in the date format).
    pub fn new(policy: &SnapshotPolicy) -> Result<Self> {
        let date_class = date_class(&policy.date_format);
        let name_src = template_regex(&policy.filename_pattern, &date_class);
        let name_regex = Regex::new(&name_src).map_err(|e| {
            ChronicleError::configuration(format!(
                "filename pattern {} does not invert: {e}",
                policy.filename_pattern
            ))
        })?;

        let archive_src = format!(
            "^{}(?P<first>{date_class})_to_(?P<last>{date_class})\\.md$",
            regex::escape(ARCHIVE_PREFIX)
        );
        let archive_regex = Regex::new(&archive_src).map_err(|e| {
            ChronicleError::configuration(format!("archive name pattern does not invert: {e}"))
        })?;

        Ok(Self {
            date_format: policy.date_format.clone(),
            filename_pattern: policy.filename_pattern.clone(),
            name_regex,
            archive_regex,
        })
    }

    /// Build the filename for a snapshot taken at `timestamp`.
    pub fn render(&self, timestamp: &DateTime<Utc>, capture_type: &str, milestone: &str) -> String {
        let date = timestamp.format(&self.date_format).to_string();
        self.filename_pattern
            .replace("{date}", &date)
            .replace("{type}", capture_type)
            .replace("{milestone}", milestone)
    }

    /// Format a bare date the way `render` would.
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }

    /// Invert a snapshot filename. Returns `None` when the name does not
    /// conform to the template; callers substitute the sentinel parts.
    pub fn parse(&self, filename: &str) -> Option<ParsedName> {
        let caps = self.name_regex.captures(filename)?;
        let date = self.parse_date(caps.name("date")?.as_str())?;
        Some(ParsedName {
            date,
            capture_type: caps
                .name("kind")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            milestone: caps
                .name("milestone")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        })
    }

    /// Bundle filename covering the inclusive date range `first..=last`.
    pub fn archive_name(&self, first: NaiveDate, last: NaiveDate) -> String {
        format!(
            "{ARCHIVE_PREFIX}{}_to_{}.md",
            self.format_date(first),
            self.format_date(last)
        )
    }

    /// Start date declared by a bundle filename, if it conforms.
    pub fn parse_archive(&self, filename: &str) -> Option<NaiveDate> {
        let caps = self.archive_regex.captures(filename)?;
        self.parse_date(caps.name("first")?.as_str())
    }

    /// Whether a filename denotes an archive bundle rather than a snapshot.
    pub fn is_archive(filename: &str) -> bool {
        filename.starts_with(ARCHIVE_PREFIX)
    }

    fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, &self.date_format)
            .or_else(|_| {
                NaiveDateTime::parse_from_str(text, &self.date_format).map(|dt| dt.date())
            })
            .ok()
    }
}

/// Translate the template into an anchored regex: literals escaped,
/// placeholders replaced by capture groups.
fn template_regex(pattern: &str, date_class: &str) -> String {
    let mut src = String::from("^");
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        src.push_str(&regex::escape(&rest[..open]));
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            src.push_str(&regex::escape(tail));
            rest = "";
            break;
        };
        match &tail[..=close] {
            "{date}" => {
                src.push_str("(?P<date>");
                src.push_str(date_class);
                src.push(')');
            }
            "{type}" => src.push_str("(?P<kind>[A-Za-z0-9]+)"),
            "{milestone}" => src.push_str("(?P<milestone>.+)"),
            other => src.push_str(&regex::escape(other)),
        }
        rest = &tail[close + 1..];
    }
    src.push_str(&regex::escape(rest));
    src.push('$');
    src
}

/// Digit classes matching what the strftime format renders.
fn date_class(format: &str) -> String {
    let mut out = String::new();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push_str(&regex::escape(&c.to_string()));
            continue;
        }
        match chars.next() {
            Some('Y') => out.push_str(r"\d{4}"),
            Some('y') | Some('m') | Some('d') | Some('H') | Some('M') | Some('S') => {
                out.push_str(r"\d{2}")
            }
            Some('j') => out.push_str(r"\d{3}"),
            Some('%') => out.push_str(&regex::escape("%")),
            // unrecognized specifier: match any run of digits
            Some(_) => out.push_str(r"\d+"),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn naming() -> SnapshotNaming {
        SnapshotNaming::new(&SnapshotPolicy::default()).unwrap()
    }

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let name = naming().render(&timestamp, "manual", "initial-setup");
        assert_eq!(name, "SNAPSHOT_2024-01-15_manual_initial-setup.md");
    }

    #[test]
    fn test_parse_inverts_render() {
        let naming = naming();
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        let name = naming.render(&timestamp, "manual", "auth-landed");

        let parsed = naming.parse(&name).unwrap();
        assert_eq!(parsed.milestone, "auth-landed");
        assert_eq!(parsed.capture_type, "manual");
        // truncated to the day granularity of the default date format
        assert_eq!(parsed.date, timestamp.date_naive());
    }

    #[test]
    fn test_parse_keeps_hyphenated_milestones_verbatim() {
        let parsed = naming()
            .parse("SNAPSHOT_2024-01-20_manual_add-authentication.md")
            .unwrap();
        assert_eq!(parsed.milestone, "add-authentication");
    }

    #[test]
    fn test_parse_rejects_nonconforming_names() {
        let naming = naming();
        assert!(naming.parse("notes.md").is_none());
        assert!(naming.parse("SNAPSHOT_20240115_manual_x.md").is_none());
        assert!(naming.parse("ARCHIVE_2024-01-01_to_2024-02-01.md").is_none());
    }

    #[test]
    fn test_archive_name_roundtrip() {
        let naming = naming();
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let name = naming.archive_name(first, last);
        assert_eq!(name, "ARCHIVE_2024-01-01_to_2024-02-01.md");
        assert!(SnapshotNaming::is_archive(&name));
        assert_eq!(naming.parse_archive(&name), Some(first));
    }

    #[test]
    fn test_custom_date_format_inverts() {
        let policy = SnapshotPolicy {
            date_format: "%Y%m%d".to_string(),
            ..SnapshotPolicy::default()
        };
        let naming = SnapshotNaming::new(&policy).unwrap();
        let timestamp = Utc.with_ymd_and_hms(2024, 7, 4, 1, 2, 3).unwrap();

        let name = naming.render(&timestamp, "manual", "compact-dates");
        assert_eq!(name, "SNAPSHOT_20240704_manual_compact-dates.md");
        let parsed = naming.parse(&name).unwrap();
        assert_eq!(parsed.date, timestamp.date_naive());
    }
}
