//! Prose line selection for markdown documents.
//!
//! Term extraction only looks at prose. Fence lines and everything inside a
//! fenced block are dropped, as are lines that start with a URL, a
//! horizontal rule or a heading marker.

use std::sync::LazyLock;

use regex::Regex;

/// Markdown parsing state for code block tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkdownState {
    Prose,
    FencedBlock {
        fence_char: char,
        opening_fence_len: usize,
    },
}

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://|mailto:|www\.)") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid URL scheme regex: {err}"),
    });

fn parse_fence(trimmed_line: &str) -> Option<(char, usize)> {
    let fence_char = match trimmed_line.as_bytes().first() {
        Some(b'`') => '`',
        Some(b'~') => '~',
        _ => return None,
    };

    let fence_len = trimmed_line
        .chars()
        .take_while(|&c| c == fence_char)
        .count();
    if fence_len >= 3 {
        Some((fence_char, fence_len))
    } else {
        None
    }
}

fn is_horizontal_rule(trimmed_line: &str) -> bool {
    if trimmed_line.starts_with("---") {
        return true;
    }
    let Some(marker) = trimmed_line.chars().next() else {
        return false;
    };
    if marker != '*' && marker != '_' {
        return false;
    }
    let mut count = 0;
    for c in trimmed_line.chars() {
        if c == marker {
            count += 1;
        } else if !c.is_whitespace() {
            return false;
        }
    }
    count >= 3
}

/// Whether a single line (outside any fenced block) carries prose.
#[must_use]
pub fn is_prose_line(line: &str) -> bool {
    let trimmed = line.trim();
    !(parse_fence(trimmed).is_some()
        || URL_SCHEME.is_match(trimmed)
        || is_horizontal_rule(trimmed)
        || trimmed.starts_with('#'))
}

/// Iterate over the prose lines of `content` as `(line_number, line)`.
///
/// Line numbers are 1-indexed and refer to the original document.
pub fn prose_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut state = MarkdownState::Prose;
    content
        .lines()
        .enumerate()
        .filter_map(move |(idx, line)| {
            let trimmed = line.trim_start();
            if let Some((fence_char, fence_len)) = parse_fence(trimmed) {
                match state {
                    MarkdownState::Prose => {
                        state = MarkdownState::FencedBlock {
                            fence_char,
                            opening_fence_len: fence_len,
                        };
                    }
                    MarkdownState::FencedBlock {
                        fence_char: open_fence_char,
                        opening_fence_len,
                    } => {
                        // Closing requires the same delimiter with sufficient length.
                        if fence_char == open_fence_char && fence_len >= opening_fence_len {
                            state = MarkdownState::Prose;
                        }
                    }
                }
                return None;
            }

            if state != MarkdownState::Prose || !is_prose_line(line) {
                return None;
            }
            Some((idx + 1, line))
        })
}

/// 1-indexed character column of byte offset `byte_offset` within `line`.
#[must_use]
pub fn column_of(line: &str, byte_offset: usize) -> usize {
    line.get(..byte_offset)
        .map_or(byte_offset, |prefix| prefix.chars().count())
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(content: &str) -> Vec<(usize, &str)> {
        prose_lines(content).collect()
    }

    #[test]
    fn test_skips_structural_lines() {
        let content = "# Title\nPlain text\n---\nhttps://example.com\n***\n## Sub\nMore text";
        assert_eq!(collect(content), vec![(2, "Plain text"), (7, "More text")]);
    }

    #[test]
    fn test_skips_fenced_block_contents() {
        let content = "before\n```bash\necho \"**not a term**\"\n```\nafter";
        assert_eq!(collect(content), vec![(1, "before"), (5, "after")]);
    }

    #[test]
    fn test_mismatched_fence_does_not_close_block() {
        let content = "```\n~~~\ninside\n```\noutside";
        assert_eq!(collect(content), vec![(5, "outside")]);
    }

    #[test]
    fn test_bold_line_is_prose() {
        assert!(is_prose_line("**CPR-nummer** is issued at birth"));
        assert!(!is_prose_line("  ***  "));
        assert!(!is_prose_line("___"));
    }

    #[test]
    fn test_column_counts_characters() {
        let line = "\u{e6}\u{f8} term";
        let offset = line.find("term").unwrap_or_default();
        assert_eq!(column_of(line, offset), 4);
    }
}
