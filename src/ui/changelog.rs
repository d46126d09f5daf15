//! ui::changelog
//!
//! Plain-text changelog rendering.
//!
//! # Format
//!
//! Releases are printed oldest first. Each release block is:
//!
//! ```text
//! =================================================
//! my-project - v1.2.0 (Released 2020-1-15)
//! 	Add login page
//! 	Fix crash on empty input
//!
//! ```
//!
//! Commits keep the order the API returned them in (newest first). Commits
//! whose title starts with `Merge branch` are left out.

use std::io::{self, Write};

use chrono::Datelike;

use crate::core::types::{Release, Timestamp};

/// Line printed above every release header.
pub const SEPARATOR: &str = "=================================================";

/// Title prefix of commits that are never listed.
pub const MERGE_COMMIT_PREFIX: &str = "Merge branch";

/// Whether a commit title is merge noise rather than a change.
pub fn is_merge_commit(title: &str) -> bool {
    title.starts_with(MERGE_COMMIT_PREFIX)
}

/// Format a release date as `Y-M-D` without zero padding.
pub fn format_release_date(date: &Timestamp) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

/// Sort releases oldest first, keeping input order for equal dates.
pub fn sort_releases(releases: &mut [Release]) {
    releases.sort_by_key(|release| release.release_date);
}

/// Render the changelog to a string.
pub fn render(mut releases: Vec<Release>, project_name: &str) -> String {
    sort_releases(&mut releases);

    let mut text = String::new();
    for release in &releases {
        text.push_str(SEPARATOR);
        text.push('\n');
        text.push_str(&format!(
            "{} - {} (Released {})\n",
            project_name,
            release.version_name,
            format_release_date(&release.release_date)
        ));

        for commit in release.commits.iter().filter(|c| !is_merge_commit(&c.title)) {
            text.push('\t');
            text.push_str(&commit.title);
            text.push('\n');
        }

        text.push('\n');
    }

    text
}

/// Write the changelog for `releases` to `out`.
pub fn write_changelog<W: Write>(
    out: &mut W,
    releases: Vec<Release>,
    project_name: &str,
) -> io::Result<()> {
    out.write_all(render(releases, project_name).as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{parse_timestamp, Commit};

    fn release(version: &str, date: &str, titles: &[&str]) -> Release {
        Release {
            version_name: version.to_string(),
            release_date: parse_timestamp(date).unwrap(),
            commits: titles
                .iter()
                .enumerate()
                .map(|(i, t)| Commit::new(format!("{}-{}", version, i), *t))
                .collect(),
        }
    }

    mod merge_filter {
        use super::*;

        #[test]
        fn prefix_match_only() {
            assert!(is_merge_commit("Merge branch 'x' into 'master'"));
            assert!(is_merge_commit("Merge branch"));
            assert!(!is_merge_commit("merge branch 'x'"));
            assert!(!is_merge_commit("Revert \"Merge branch 'x'\""));
            assert!(!is_merge_commit("Merge request !12"));
        }
    }

    mod dates {
        use super::*;

        #[test]
        fn no_zero_padding() {
            let date = parse_timestamp("2020-01-05T10:00:00Z").unwrap();
            assert_eq!(format_release_date(&date), "2020-1-5");
        }

        #[test]
        fn uses_recorded_offset() {
            // 23:30 on Dec 31 in -05:00 is already Jan 1 in UTC
            let date = parse_timestamp("2019-12-31T23:30:00-05:00").unwrap();
            assert_eq!(format_release_date(&date), "2019-12-31");
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn single_release_example() {
            let output = render(
                vec![release("v1", "2020-01-01", &["Add feature", "Merge branch 'x'"])],
                "proj",
            );

            assert_eq!(
                output,
                format!("{}\nproj - v1 (Released 2020-1-1)\n\tAdd feature\n\n", SEPARATOR)
            );
        }

        #[test]
        fn releases_sorted_oldest_first() {
            let output = render(
                vec![
                    release("v3", "2021-03-01", &["three"]),
                    release("v1", "2019-01-01", &["one"]),
                    release("v2", "2020-02-01", &["two"]),
                ],
                "proj",
            );

            let v1 = output.find("v1").unwrap();
            let v2 = output.find("v2").unwrap();
            let v3 = output.find("v3").unwrap();
            assert!(v1 < v2 && v2 < v3);
        }

        #[test]
        fn equal_dates_keep_input_order() {
            let output = render(
                vec![
                    release("b", "2020-01-01", &[]),
                    release("a", "2020-01-01", &[]),
                ],
                "proj",
            );

            assert!(output.find("proj - b").unwrap() < output.find("proj - a").unwrap());
        }

        #[test]
        fn commits_keep_batch_order() {
            let output = render(
                vec![release("v1", "2020-01-01", &["newest", "middle", "oldest"])],
                "proj",
            );

            let lines: Vec<&str> = output.lines().collect();
            assert_eq!(lines[2..5], ["\tnewest", "\tmiddle", "\toldest"]);
        }

        #[test]
        fn release_with_only_merges_still_has_header() {
            let output = render(
                vec![release("v1", "2020-01-01", &["Merge branch 'a'"])],
                "proj",
            );

            assert!(output.contains("proj - v1 (Released 2020-1-1)"));
            assert!(!output.contains('\t'));
        }

        #[test]
        fn no_releases_renders_nothing() {
            assert_eq!(render(vec![], "proj"), "");
        }
    }
}
