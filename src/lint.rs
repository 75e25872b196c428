//! Line-level linter for MT message text.
//!
//! ## Rules
//!
//! - **No trailing whitespace**: lines must not end with spaces or tabs.
//! - **No tabs**: tab characters are outside the SWIFT `x` character set.
//! - **Tag line shape**: a line starting with `:` must be a well-formed `:TAG:` line,
//!   otherwise the tokenizer reads it as continuation text.
//! - **Dash lines**: a line starting with `-` is a page terminator only when it is
//!   exactly `-`; anything else is read as content.
//! - **Line length**: content lines longer than 35 characters exceed every MT101
//!   multi-line field (warning).
//!
//! Run via the `mt101 lint` subcommand. Exit code 1 if any error-level findings.

use crate::tokenizer::{split_tag_line, PAGE_TERMINATOR};

/// Longest line any MT101 field accepts (`35x` lines of `:59:` and `:70:`).
pub const MAX_LINE_LEN: usize = 35;

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    NoTrailingWhitespace,
    NoTabs,
    /// Line starts with `:` but is not a `:TAG:` line.
    MalformedTagLine,
    /// Line starts with `-` but is not the page terminator.
    DashLine,
    LineTooLong,
}

impl LintRule {
    pub fn id(self) -> &'static str {
        match self {
            LintRule::NoTrailingWhitespace => "no-trailing-whitespace",
            LintRule::NoTabs => "no-tabs",
            LintRule::MalformedTagLine => "malformed-tag-line",
            LintRule::DashLine => "dash-line",
            LintRule::LineTooLong => "line-too-long",
        }
    }
}

/// A single lint message with location.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub line: usize,
    pub column: usize,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

/// Run all lint rules on message text. Returns messages in line order.
pub fn lint(source: &str) -> Vec<LintMessage> {
    let mut out = Vec::new();

    for (i, line) in source.lines().enumerate() {
        let line_no = i + 1;
        let mut push = |column: usize, rule: LintRule, severity: Severity, message: String| {
            out.push(LintMessage {
                line: line_no,
                column,
                rule,
                severity,
                message,
            })
        };

        let trimmed = line.trim_end();
        if trimmed.len() != line.len() {
            push(
                trimmed.chars().count() + 1,
                LintRule::NoTrailingWhitespace,
                Severity::Warning,
                "trailing whitespace not allowed".to_string(),
            );
        }

        if let Some(col) = line.chars().position(|c| c == '\t') {
            push(
                col + 1,
                LintRule::NoTabs,
                Severity::Error,
                "tab character is not allowed in message text".to_string(),
            );
        }

        // Content after the `:TAG:` prefix counts toward the line length.
        let (content, content_col) = match split_tag_line(trimmed) {
            Some((tag, content)) => (content, tag.chars().count() + 3),
            None => (trimmed, 1),
        };

        if trimmed.starts_with(':') && split_tag_line(trimmed).is_none() {
            push(
                1,
                LintRule::MalformedTagLine,
                Severity::Error,
                format!("'{}' is not a ':TAG:' line and will be read as content", trimmed),
            );
        }

        if trimmed.starts_with('-') && trimmed != PAGE_TERMINATOR {
            push(
                1,
                LintRule::DashLine,
                Severity::Warning,
                "line starts with '-' but is not a page terminator".to_string(),
            );
        }

        let len = content.chars().count();
        if len > MAX_LINE_LEN {
            push(
                content_col + MAX_LINE_LEN,
                LintRule::LineTooLong,
                Severity::Warning,
                format!("line is {} characters, fields allow at most {}", len, MAX_LINE_LEN),
            );
        }
    }

    out
}

/// Replace tabs with spaces and strip trailing whitespace.
pub fn lint_fix(source: &str) -> String {
    let out_lines: Vec<String> = source
        .lines()
        .map(|line| line.replace('\t', " ").trim_end().to_string())
        .collect();
    out_lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(src: &str) -> Vec<LintRule> {
        lint(src).iter().map(|m| m.rule).collect()
    }

    #[test]
    fn lint_trailing_whitespace() {
        let msgs = lint(":20:REF1  \n-");
        assert_eq!(msgs.len(), 1, "{:?}", msgs);
        assert_eq!(msgs[0].rule, LintRule::NoTrailingWhitespace);
        assert_eq!(msgs[0].line, 1);
        assert_eq!(msgs[0].column, 9);
    }

    #[test]
    fn lint_tabs() {
        let msgs = lint(":59:/ACC1\nJOHN\tDOE\n-");
        let tabs: Vec<_> = msgs.iter().filter(|m| m.rule == LintRule::NoTabs).collect();
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].line, 2);
        assert_eq!(tabs[0].column, 5);
    }

    #[test]
    fn lint_malformed_tag_and_dash_lines() {
        assert_eq!(rules(":20 REF\n-"), vec![LintRule::MalformedTagLine]);
        assert_eq!(rules(":20:REF\n--\n"), vec![LintRule::DashLine]);
    }

    #[test]
    fn lint_line_too_long_counts_content_only() {
        let ok = format!(":70:{}\n-", "A".repeat(35));
        assert!(lint(&ok).is_empty());
        let long = format!(":70:{}\n-", "A".repeat(36));
        let msgs = lint(&long);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].rule, LintRule::LineTooLong);
        assert_eq!(msgs[0].severity, Severity::Warning);
    }

    #[test]
    fn lint_clean_message_passes() {
        let src = ":20:REF1\n:21:TXN1\n:32B:EUR100,00\n:59:/ACC1\nNAME\n-\n";
        assert!(lint(src).is_empty(), "{:?}", lint(src));
    }

    #[test]
    fn lint_fix_removes_whitespace_findings() {
        let fixed = lint_fix(":20:REF1 \n:59:/ACC1\nJOHN\tDOE\t\n-");
        assert_eq!(fixed, ":20:REF1\n:59:/ACC1\nJOHN DOE\n-\n");
        assert!(lint(&fixed).is_empty());
    }
}
