use anyhow::{Context, Result};
use regex::Regex;

use crate::core::engine::{FileRewriter, RewriteOutcome};

/// Pattern source for a line-style doc comment (`///` or `//!`). The `rest`
/// capture is everything after the comment marker.
pub const LINE_DOC_PATTERN: &str = r"^(?P<prefix>\s*(?://!|///))(?P<rest>.*)";

/// Pattern source for the opening of a block-style doc comment (`/**` or `/*!`),
/// matched against the left-trimmed line.
pub const BLOCK_OPEN_PATTERN: &str = r"^/\*(!|\*)";

/// Pattern source for the closing marker of a block comment.
pub const BLOCK_CLOSE_PATTERN: &str = r"\*/";

/// Pattern source for a fence marker: three or more backticks followed by an
/// optional language tag running to the end of the line.
pub const FENCE_PATTERN: &str = r"(?P<fence>`{3,})(?P<lang>[^`\n]*)";

/// The compiled patterns the fence scanner runs on.
///
/// These are deliberately bundled in a value that is passed into the scan
/// rather than living in process-wide statics, so a test (or a future
/// language profile) can substitute its own set.
#[derive(Debug)]
pub struct DocPatterns {
    pub line_doc: Regex,
    pub block_open: Regex,
    pub block_close: Regex,
    pub fence: Regex,
}

impl DocPatterns {
    /// Compiles the default pattern set for Rust source files.
    pub fn rust() -> Result<Self> {
        Ok(Self {
            line_doc: Regex::new(LINE_DOC_PATTERN).context("invalid line-doc pattern")?,
            block_open: Regex::new(BLOCK_OPEN_PATTERN).context("invalid block-open pattern")?,
            block_close: Regex::new(BLOCK_CLOSE_PATTERN).context("invalid block-close pattern")?,
            fence: Regex::new(FENCE_PATTERN).context("invalid fence pattern")?,
        })
    }
}

/// Which kind of doc comment an open fence started in. A line-doc fence
/// returns the scanner to plain text when it closes; a block-doc fence
/// returns it to the enclosing block comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceOrigin {
    LineDoc,
    BlockDoc,
}

/// Scanner position within a file.
///
/// `InFence` carries the fence's origin plus whether its lines are being
/// dropped (`deleting`). A fence that fails the language filter, or is
/// already disabled, still enters `InFence` with `deleting: false` so that
/// its interior and closing marker are passed through opaquely instead of
/// being rescanned for openers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Normal,
    InBlockComment,
    InFence { origin: FenceOrigin, deleting: bool },
}

/// Configuration for a fence sweep.
#[derive(Debug, Clone)]
pub struct FenceOptions {
    /// Remove fence markers and every enclosed line instead of disabling.
    pub delete: bool,
    /// When set, only fences whose language tag contains this language are
    /// touched; untagged fences are left alone too.
    pub only_language: Option<String>,
    /// Only consider fences opened (and closed) on line-doc comment lines.
    pub line_doc_only: bool,
    /// The tag token appended to mark a fence as not-for-execution.
    pub ignore_suffix: String,
}

impl Default for FenceOptions {
    fn default() -> Self {
        Self {
            delete: false,
            only_language: None,
            line_doc_only: false,
            ignore_suffix: "ignore".to_string(),
        }
    }
}

/// Disables or deletes fenced code blocks found inside documentation
/// comments.
///
/// This is a pure transform over the file text; the engine decides whether
/// the result is written back. One forward pass, line by line, driven by the
/// [`ScanState`] machine:
///
/// - a line-doc line containing a fence opener starts a fence (origin
///   `LineDoc`); inside a block doc comment any line with an opener starts
///   one (origin `BlockDoc`), unless `line_doc_only` is set,
/// - in delete mode the opening line, the enclosed lines, and the closing
///   line are all dropped; otherwise only the opening line is rewritten to
///   carry the ignore suffix and everything else passes through,
/// - any line containing a fence marker closes the fence; with
///   `line_doc_only` the closing line must itself be a line-doc line,
/// - an unterminated fence swallows the rest of the file (best effort, not
///   an error).
///
/// Returns the rewritten text and the number of distinct fences transformed.
/// A fence whose tag already carries the ignore suffix counts as disabled
/// and is never touched again, so disable mode is idempotent.
pub fn rewrite_doc_fences(
    input: &str,
    patterns: &DocPatterns,
    options: &FenceOptions,
) -> RewriteOutcome {
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut fences = 0usize;

    for line in input.split_inclusive('\n') {
        // Inside a fence only the closing marker matters.
        if let ScanState::InFence { origin, deleting } = state {
            let closes = patterns.fence.is_match(line)
                && (!options.line_doc_only || patterns.line_doc.is_match(line));
            if closes {
                state = match origin {
                    FenceOrigin::LineDoc => ScanState::Normal,
                    FenceOrigin::BlockDoc => ScanState::InBlockComment,
                };
            }
            if !deleting {
                out.push_str(line);
            }
            continue;
        }

        // A block doc comment may open here; the same line is still examined
        // for a fence below.
        if state == ScanState::Normal && patterns.block_open.is_match(line.trim_start()) {
            state = ScanState::InBlockComment;
        }

        // Find a fence opener in a qualifying doc-comment position.
        let line_doc_caps = patterns.line_doc.captures(line);
        let opener = if let Some(caps) = &line_doc_caps {
            let rest = caps.name("rest").map_or("", |m| m.as_str());
            patterns
                .fence
                .captures(rest)
                .map(|f| (f, FenceOrigin::LineDoc))
        } else if state == ScanState::InBlockComment && !options.line_doc_only {
            patterns
                .fence
                .captures(line)
                .map(|f| (f, FenceOrigin::BlockDoc))
        } else {
            None
        };

        if let Some((caps, origin)) = opener {
            let marker = &caps["fence"];
            let lang = caps["lang"].trim();

            let filtered_out = match &options.only_language {
                Some(target) => lang.is_empty() || !lang.contains(target.as_str()),
                None => false,
            };
            if filtered_out || already_disabled(lang, &options.ignore_suffix) {
                out.push_str(line);
                state = ScanState::InFence {
                    origin,
                    deleting: false,
                };
            } else if options.delete {
                fences += 1;
                state = ScanState::InFence {
                    origin,
                    deleting: true,
                };
                // Opening line dropped.
            } else {
                let tag = if lang.is_empty() {
                    options.ignore_suffix.clone()
                } else {
                    format!("{lang},{}", options.ignore_suffix)
                };
                out.push_str(&line.replacen(&caps[0], &format!("{marker}{tag}"), 1));
                fences += 1;
                state = ScanState::InFence {
                    origin,
                    deleting: false,
                };
            }
            continue;
        }

        // Block comment close, checked after fence handling so a fence on the
        // closing line's text is not missed.
        if state == ScanState::InBlockComment && patterns.block_close.is_match(line) {
            state = ScanState::Normal;
        }

        out.push_str(line);
    }

    RewriteOutcome {
        text: out,
        matches: fences,
    }
}

/// A language tag counts as disabled when any of its comma-separated tokens
/// equals the ignore suffix.
fn already_disabled(lang: &str, ignore_suffix: &str) -> bool {
    lang.split(',').any(|token| token.trim() == ignore_suffix)
}

/// The doc-fence sweep as a [`FileRewriter`], ready to be driven by the
/// engine.
pub struct FenceRewriter {
    patterns: DocPatterns,
    options: FenceOptions,
}

impl FenceRewriter {
    pub fn new(options: FenceOptions) -> Result<Self> {
        Ok(Self {
            patterns: DocPatterns::rust()?,
            options,
        })
    }

    pub fn with_patterns(patterns: DocPatterns, options: FenceOptions) -> Self {
        Self { patterns, options }
    }
}

impl FileRewriter for FenceRewriter {
    fn name(&self) -> &str {
        "doc-fences"
    }

    fn rewrite(&self, input: &str) -> RewriteOutcome {
        rewrite_doc_fences(input, &self.patterns, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, options: FenceOptions) -> RewriteOutcome {
        rewrite_doc_fences(input, &DocPatterns::rust().unwrap(), &options)
    }

    #[test]
    fn test_disable_line_doc_fence() {
        let input = "/// ```rust\n/// let x = 1;\n/// ```\n";
        let out = run(
            input,
            FenceOptions {
                line_doc_only: true,
                ..FenceOptions::default()
            },
        );
        assert_eq!(out.text, "/// ```rust,ignore\n/// let x = 1;\n/// ```\n");
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_delete_line_doc_fence() {
        let input = "/// ```rust\n/// let x = 1;\n/// ```\n";
        let out = run(
            input,
            FenceOptions {
                delete: true,
                line_doc_only: true,
                ..FenceOptions::default()
            },
        );
        assert_eq!(out.text, "");
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_fence_length_preserved() {
        let input = "//// ````rust\n/// code\n/// ````\n";
        let out = run(input, FenceOptions::default());
        assert_eq!(out.text, "//// ````rust,ignore\n/// code\n/// ````\n");
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_disable_is_idempotent() {
        let input = "//! ```rust\n//! let x = 1;\n//! ```\nfn main() {}\n";
        let once = run(input, FenceOptions::default());
        let twice = run(&once.text, FenceOptions::default());
        assert_eq!(once.text, twice.text);
        assert_eq!(twice.matches, 0);
    }

    #[test]
    fn test_already_disabled_tag_untouched() {
        let input = "/// ```rust,ignore\n/// let x = 1;\n/// ```\n";
        let out = run(input, FenceOptions::default());
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }

    #[test]
    fn test_language_filter_skips_other_languages() {
        let input = "/// ```python\n/// print(1)\n/// ```\n";
        let out = run(
            input,
            FenceOptions {
                only_language: Some("rust".to_string()),
                ..FenceOptions::default()
            },
        );
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }

    #[test]
    fn test_language_filter_skips_untagged_fences() {
        let input = "/// ```\n/// anything\n/// ```\n";
        let out = run(
            input,
            FenceOptions {
                only_language: Some("rust".to_string()),
                ..FenceOptions::default()
            },
        );
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }

    #[test]
    fn test_untagged_fence_disabled_without_filter() {
        let input = "/// ```\n/// code\n/// ```\n";
        let out = run(input, FenceOptions::default());
        assert_eq!(out.text, "/// ```ignore\n/// code\n/// ```\n");
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_plain_comment_fence_untouched() {
        let input = "// ```rust\n// let x = 1;\n// ```\nfn f() {}\n";
        let out = run(input, FenceOptions::default());
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }

    #[test]
    fn test_block_doc_fence_disabled() {
        let input = "/**\n * ```rust\n * let x = 1;\n * ```\n */\nfn f() {}\n";
        let out = run(input, FenceOptions::default());
        assert_eq!(
            out.text,
            "/**\n * ```rust,ignore\n * let x = 1;\n * ```\n */\nfn f() {}\n"
        );
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_block_doc_fence_deleted() {
        let input = "/*!\n * ```rust\n * let x = 1;\n * ```\n */\n";
        let out = run(
            input,
            FenceOptions {
                delete: true,
                ..FenceOptions::default()
            },
        );
        assert_eq!(out.text, "/*!\n */\n");
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_line_doc_only_ignores_block_fences() {
        let input = "/**\n * ```rust\n * let x = 1;\n * ```\n */\n";
        let out = run(
            input,
            FenceOptions {
                line_doc_only: true,
                ..FenceOptions::default()
            },
        );
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }

    #[test]
    fn test_unterminated_fence_deletes_remainder() {
        let input = "fn before() {}\n/// ```rust\n/// let x = 1;\nfn after() {}\n";
        let out = run(
            input,
            FenceOptions {
                delete: true,
                ..FenceOptions::default()
            },
        );
        assert_eq!(out.text, "fn before() {}\n");
        assert_eq!(out.matches, 1);
    }

    #[test]
    fn test_delete_counts_each_fence_once() {
        let input = "/// ```rust\n/// a\n/// ```\n/// text\n/// ```rust\n/// b\n/// ```\n";
        let out = run(
            input,
            FenceOptions {
                delete: true,
                ..FenceOptions::default()
            },
        );
        assert_eq!(out.text, "/// text\n");
        assert_eq!(out.matches, 2);
    }

    #[test]
    fn test_disable_preserves_enclosed_content() {
        let input = "/// ```rust\n///   let indented = 1;\n/// \t tab\n/// ```\n";
        let out = run(input, FenceOptions::default());
        assert_eq!(
            out.text,
            "/// ```rust,ignore\n///   let indented = 1;\n/// \t tab\n/// ```\n"
        );
    }

    #[test]
    fn test_fence_outside_comments_untouched() {
        let input = "let s = \"```rust\";\nlet t = \"```\";\n";
        let out = run(input, FenceOptions::default());
        assert_eq!(out.text, input);
        assert_eq!(out.matches, 0);
    }
}
