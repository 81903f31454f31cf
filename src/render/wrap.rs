//! Greedy word wrapping for rendered blocks.
//!
//! Implements the classic greedy fill: text is chunked into alternating
//! whitespace and word runs, lines are packed left to right, whitespace
//! is dropped at wrap-induced line boundaries (but kept at the start of
//! the text), and words longer than a whole line are broken mid-word.
//! Widths count characters, not bytes.

use std::collections::VecDeque;

/// Wrap `text` into lines of at most `width` characters, prefixing the
/// first line with `initial_indent` and the rest with `subsequent_indent`.
/// Indent widths count against the line width. `None` disables breaking:
/// the text comes back as one indented line.
///
/// Whitespace-only input produces no lines at all, which lets callers
/// render blank source lines as empty output lines.
pub(crate) fn wrap(
    text: &str,
    width: Option<usize>,
    initial_indent: &str,
    subsequent_indent: &str,
) -> Vec<String> {
    let mut chunks = split_chunks(text);
    let mut lines: Vec<String> = Vec::new();

    while !chunks.is_empty() {
        let indent = if lines.is_empty() {
            initial_indent
        } else {
            subsequent_indent
        };
        let line_width = width.map(|w| w.saturating_sub(indent.chars().count()));

        // Whitespace carried over a line break is dropped; leading
        // whitespace of the text itself (first line) is kept.
        if !lines.is_empty()
            && chunks.front().is_some_and(|c| c.trim().is_empty())
        {
            chunks.pop_front();
        }

        let mut line: Vec<String> = Vec::new();
        let mut line_len = 0usize;
        while let Some(front) = chunks.front() {
            let chunk_len = front.chars().count();
            if let Some(w) = line_width
                && line_len + chunk_len > w
            {
                break;
            }
            line_len += chunk_len;
            if let Some(chunk) = chunks.pop_front() {
                line.push(chunk);
            }
        }

        // A chunk longer than a whole line gets broken mid-word, filling
        // whatever space the current line has left.
        if let Some(w) = line_width
            && chunks.front().is_some_and(|c| c.chars().count() > w)
        {
            let take = if w < 1 { 1 } else { w - line_len };
            if let Some(front) = chunks.front_mut() {
                let cut = front
                    .char_indices()
                    .nth(take)
                    .map(|(byte, _)| byte)
                    .unwrap_or(front.len());
                let head: String = front[..cut].to_string();
                *front = front[cut..].to_string();
                line.push(head);
            }
        }

        if line.last().is_some_and(|chunk| chunk.trim().is_empty()) {
            line.pop();
        }

        if !line.is_empty() {
            lines.push(format!("{indent}{}", line.concat()));
        }
    }

    lines
}

/// Normalize all whitespace to single spaces and wrap into a single
/// newline-joined string.
pub(crate) fn fill(text: &str, width: Option<usize>) -> String {
    let normalized: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    wrap(&normalized, width, "", "").join("\n")
}

/// Split into maximal runs of whitespace and non-whitespace.
fn split_chunks(text: &str) -> VecDeque<String> {
    let mut chunks = VecDeque::new();
    let mut current = String::new();
    let mut current_is_ws = false;
    for ch in text.chars() {
        let is_ws = ch.is_whitespace();
        if !current.is_empty() && is_ws != current_is_ws {
            chunks.push_back(std::mem::take(&mut current));
        }
        current_is_ws = is_ws;
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push_back(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_words_greedily_and_drops_break_whitespace() {
        assert_eq!(
            wrap("one two  three", Some(9), "- ", "  "),
            ["- one two", "  three"]
        );
    }

    #[test]
    fn keeps_leading_whitespace_on_the_first_line() {
        assert_eq!(wrap("  three four", Some(20), "  ", "  "), ["    three four"]);
    }

    #[test]
    fn breaks_words_longer_than_a_line() {
        assert_eq!(
            wrap("averyveryverylongword", Some(8), "- ", "  "),
            ["- averyv", "  eryver", "  ylongw", "  ord"]
        );
    }

    #[test]
    fn empty_and_blank_input_produce_no_lines() {
        assert_eq!(wrap("", Some(10), "- ", "  "), Vec::<String>::new());
        assert_eq!(wrap("   \t ", Some(10), "- ", "  "), Vec::<String>::new());
    }

    #[test]
    fn no_width_means_one_line() {
        assert_eq!(
            wrap("a few words that never break", None, "> ", "  "),
            ["> a few words that never break"]
        );
    }

    #[test]
    fn fill_normalizes_whitespace_before_wrapping() {
        assert_eq!(fill("one\ttwo\nthree", Some(20)), "one two three");
        assert_eq!(fill("", Some(20)), "");
    }

    #[test]
    fn widths_count_characters_not_bytes() {
        assert_eq!(
            wrap("héllo wörld", Some(6), "", ""),
            ["héllo", "wörld"]
        );
    }
}
