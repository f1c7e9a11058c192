//! Splitting long output into pages
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Line-count pagination for list-style output
//! - 1.0.0: UTF-8 safe, line-aware splitting under the message limit

use super::reply::Page;

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Split `text` into pages no longer than `limit` bytes
///
/// Splits on line boundaries where possible and falls back to character
/// boundaries for lines that are longer than `limit` on their own.
pub fn split_pages(text: &str, limit: usize) -> Vec<Page> {
    if text.len() <= limit {
        return vec![Page::new(text)];
    }

    let mut pages = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let needed = if current.is_empty() { line.len() } else { line.len() + 1 };
        if current.len() + needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.is_empty() {
            pages.push(Page::new(std::mem::take(&mut current)));
        }
        if line.len() <= limit {
            current.push_str(line);
        } else {
            let mut pieces = split_line(line, limit);
            // The tail of an overlong line can still share a page with what follows
            current = pieces.pop().unwrap_or_default();
            pages.extend(pieces.into_iter().map(Page::new));
        }
    }

    if !current.is_empty() {
        pages.push(Page::new(current));
    }
    pages
}

fn split_line(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in line.chars() {
        if current.len() + ch.len_utf8() > limit && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Group lines into pages of at most `per_page` lines, each under the message limit
pub fn paginate_lines<S: AsRef<str>>(lines: &[S], per_page: usize) -> Vec<Page> {
    let per_page = per_page.max(1);
    let mut pages = Vec::new();
    for chunk in lines.chunks(per_page) {
        let joined = chunk.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");
        pages.extend(split_pages(&joined, MESSAGE_LIMIT));
    }
    if pages.is_empty() {
        pages.push(Page::default());
    }
    pages
}

/// Truncate to the message limit, marking the cut with an ellipsis
pub fn truncate_for_message(text: &str) -> String {
    if text.len() <= MESSAGE_LIMIT {
        return text.to_string();
    }
    let mut end = MESSAGE_LIMIT - 3;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.content.as_str()).collect()
    }

    #[test]
    fn test_short_text_is_one_page() {
        assert_eq!(contents(&split_pages("hello", 100)), vec!["hello"]);
    }

    #[test]
    fn test_split_on_lines() {
        let pages = split_pages("line1\nline2\nline3", 12);
        assert_eq!(contents(&pages), vec!["line1\nline2", "line3"]);
    }

    #[test]
    fn test_long_line_split_by_chars() {
        let pages = split_pages(&"a".repeat(100), 30);
        assert_eq!(pages.len(), 4);
        assert!(pages.iter().all(|p| p.content.len() <= 30));
    }

    #[test]
    fn test_utf8_safety() {
        let text = "Hello 世界! ".repeat(500);
        for page in split_pages(&text, MESSAGE_LIMIT) {
            assert!(page.content.len() <= MESSAGE_LIMIT);
        }
    }

    #[test]
    fn test_paginate_lines_groups() {
        let lines: Vec<String> = (1..=7).map(|i| format!("item {i}")).collect();
        let pages = paginate_lines(&lines, 3);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].content, "item 7");
    }

    #[test]
    fn test_paginate_empty_yields_single_page() {
        let pages = paginate_lines::<&str>(&[], 10);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_truncate_for_message() {
        assert_eq!(truncate_for_message("short"), "short");
        let long = "é".repeat(MESSAGE_LIMIT);
        let cut = truncate_for_message(&long);
        assert!(cut.len() <= MESSAGE_LIMIT);
        assert!(cut.ends_with("..."));
    }
}
