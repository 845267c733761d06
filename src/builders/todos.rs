use anyhow::{Context, Result};
use regex::Regex;

use crate::core::engine::{FileRewriter, RewriteOutcome};

/// A marker comment in any of its sloppy spellings: `//todo`, `// TODO -`,
/// `//  Fixme:` and so on. Doc comments (`///`, `//!`) are excluded before
/// this pattern is applied.
pub const TODO_PATTERN: &str =
    r"^(?P<indent>\s*)//+\s*(?P<tag>(?i:todo|fixme))\b(?P<sep>[\s:,!.-]*)(?P<rest>.*)";

/// Normalizes TODO/FIXME comments to the canonical `// TODO: text` shape.
///
/// Only whole-line `//` comments are touched; doc comments and trailing
/// comments on code lines are left alone. A line already in canonical form
/// is not counted as a match, so the rewrite is idempotent.
pub struct TodoRewriter {
    pattern: Regex,
}

impl TodoRewriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(TODO_PATTERN).context("invalid todo pattern")?,
        })
    }
}

impl FileRewriter for TodoRewriter {
    fn name(&self) -> &str {
        "todos"
    }

    fn rewrite(&self, input: &str) -> RewriteOutcome {
        let mut out = String::with_capacity(input.len());
        let mut matches = 0usize;

        for line in input.split_inclusive('\n') {
            let (body, eol) = split_eol(line);
            let trimmed = body.trim_start();

            let is_plain_comment = trimmed.starts_with("//")
                && !trimmed.starts_with("///")
                && !trimmed.starts_with("//!");
            if !is_plain_comment {
                out.push_str(line);
                continue;
            }

            let Some(caps) = self.pattern.captures(body) else {
                out.push_str(line);
                continue;
            };

            let indent = &caps["indent"];
            let tag = caps["tag"].to_uppercase();
            let rest = caps["rest"].trim();
            let canonical = if rest.is_empty() {
                format!("{indent}// {tag}")
            } else {
                format!("{indent}// {tag}: {rest}")
            };

            if canonical == body {
                out.push_str(line);
            } else {
                matches += 1;
                out.push_str(&canonical);
                out.push_str(eol);
            }
        }

        RewriteOutcome { text: out, matches }
    }
}

fn split_eol(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(input: &str) -> RewriteOutcome {
        TodoRewriter::new().unwrap().rewrite(input)
    }

    #[test]
    fn test_normalizes_sloppy_todo() {
        let out = rewrite("//todo fix the parser\n");
        assert_eq!(out.text, "// TODO: fix the parser\n");
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_normalizes_fixme_with_dash() {
        let out = rewrite("    // FIXME - handle empty input\n");
        assert_eq!(out.text, "    // FIXME: handle empty input\n");
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_canonical_line_untouched() {
        let input = "// TODO: already fine\n// FIXME: also fine\n";
        let out = rewrite(input);
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }

    #[test]
    fn test_is_idempotent() {
        let input = "//ToDo: mixed case\n// fixme   trailing\n";
        let once = rewrite(input);
        let twice = rewrite(&once.text);
        assert_eq!(once.text, twice.text);
        assert_eq!(twice.matches, 0);
    }

    #[test]
    fn test_doc_comments_left_alone() {
        let input = "/// todo is a word in prose\n//! todo here too\n";
        let out = rewrite(input);
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }

    #[test]
    fn test_trailing_comment_on_code_left_alone() {
        let input = "let x = 1; // todo revisit\n";
        let out = rewrite(input);
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }

    #[test]
    fn test_bare_todo_gets_no_colon() {
        let out = rewrite("// todo\n");
        assert_eq!(out.text, "// TODO\n");
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_non_todo_comment_untouched() {
        let input = "// this mentions nothing of note\n";
        let out = rewrite(input);
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }
}
