//! JQL queries issued by the client.

use chrono::NaiveDate;

/// Open, in-progress and paused work assigned to `user`, newest first.
pub fn loggable_tasks(user: &str) -> String {
    format!(
        r#"assignee = "{}" AND status IN (Open, "In Progress", "PAUSED") AND type != Epic AND type != Bug ORDER BY created DESC"#,
        escape(user)
    )
}

/// Like [`loggable_tasks`] but also including finished work.
pub fn estimate_targets(user: &str) -> String {
    format!(
        r#"assignee = "{}" AND status IN (Open, "In Progress", "PAUSED", "DONE") AND type != Epic AND type != Bug ORDER BY created DESC"#,
        escape(user)
    )
}

/// Estimated issues anywhere whose summary mentions any of `keywords`.
pub fn keyword_search(keywords: &[String]) -> String {
    let clauses = keywords
        .iter()
        .map(|kw| format!(r#"summary ~ "{}""#, escape(kw)))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("({clauses}) AND timeoriginalestimate IS NOT EMPTY ORDER BY created DESC")
}

/// Issues assigned to `user` with work logged on or after `since`.
pub fn worklogs_since(user: &str, since: NaiveDate) -> String {
    format!(
        r#"assignee = "{}" AND worklogDate >= "{}" ORDER BY created DESC"#,
        escape(user),
        since.format("%Y-%m-%d")
    )
}

fn escape(value: &str) -> String {
    value.replace('\\', r"\\").replace('"', r#"\""#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loggable_query_matches_assignee() {
        assert_eq!(
            loggable_tasks("me@example.com"),
            r#"assignee = "me@example.com" AND status IN (Open, "In Progress", "PAUSED") AND type != Epic AND type != Bug ORDER BY created DESC"#
        );
    }

    #[test]
    fn estimate_targets_include_done() {
        assert!(estimate_targets("me").contains(r#""PAUSED", "DONE")"#));
    }

    #[test]
    fn keyword_query_ors_summary_clauses() {
        let keywords = vec!["login".to_string(), "bug".to_string()];
        assert_eq!(
            keyword_search(&keywords),
            r#"(summary ~ "login" OR summary ~ "bug") AND timeoriginalestimate IS NOT EMPTY ORDER BY created DESC"#
        );
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        let keywords = vec![r#"say "hi"\"#.to_string()];
        assert_eq!(
            keyword_search(&keywords),
            r#"(summary ~ "say \"hi\"\\") AND timeoriginalestimate IS NOT EMPTY ORDER BY created DESC"#
        );
    }

    #[test]
    fn worklog_query_uses_iso_date() {
        let since = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        assert_eq!(
            worklogs_since("me", since),
            r#"assignee = "me" AND worklogDate >= "2025-01-13" ORDER BY created DESC"#
        );
    }
}
