//! Case-insensitive search over titles and notes, with highlight spans.
//!
//! Spans are byte offsets into the raw (unescaped) text. Escaping
//! happens only when rendering, in [`highlight`] and [`escape_html`].

use serde::Serialize;

use crate::task::TaskRecord;

/// Half-open byte range `[start, end)` of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

/// Matches inside one note; `index` follows display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteMatch {
    pub index: usize,
    pub spans: Vec<MatchSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit<'a> {
    pub task: &'a TaskRecord,
    pub title_matches: Vec<MatchSpan>,
    pub note_matches: Vec<NoteMatch>,
}

/// Tasks whose title or notes contain `query`, in input order.
///
/// A blank query matches every task without spans.
pub fn search<'a>(tasks: &'a [TaskRecord], query: &str) -> Vec<SearchHit<'a>> {
    let query = query.trim();
    if query.is_empty() {
        return tasks
            .iter()
            .map(|task| SearchHit {
                task,
                title_matches: Vec::new(),
                note_matches: Vec::new(),
            })
            .collect();
    }

    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    tasks
        .iter()
        .filter_map(|task| {
            let title_matches = find_matches(&task.title, &needle);
            let note_matches: Vec<NoteMatch> = task
                .note_texts()
                .into_iter()
                .enumerate()
                .filter_map(|(index, text)| {
                    let spans = find_matches(text, &needle);
                    (!spans.is_empty()).then_some(NoteMatch { index, spans })
                })
                .collect();

            (!title_matches.is_empty() || !note_matches.is_empty()).then_some(SearchHit {
                task,
                title_matches,
                note_matches,
            })
        })
        .collect()
}

/// Non-overlapping case-insensitive occurrences of a lowercased needle
fn find_matches(haystack: &str, needle: &[char]) -> Vec<MatchSpan> {
    let mut spans = Vec::new();
    if needle.is_empty() {
        return spans;
    }
    let mut resume_at = 0;
    for (start, _) in haystack.char_indices() {
        if start < resume_at {
            continue;
        }
        if let Some(len) = match_len_at(&haystack[start..], needle) {
            spans.push(MatchSpan {
                start,
                end: start + len,
            });
            resume_at = start + len;
        }
    }
    spans
}

/// Byte length of the prefix of `rest` that lowercases to `needle`
fn match_len_at(rest: &str, needle: &[char]) -> Option<usize> {
    let mut expected = needle.iter().peekable();
    for (offset, ch) in rest.char_indices() {
        for lower in ch.to_lowercase() {
            match expected.next() {
                Some(&want) if want == lower => {}
                _ => return None,
            }
        }
        if expected.peek().is_none() {
            return Some(offset + ch.len_utf8());
        }
    }
    None
}

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render `text` as escaped HTML with every span wrapped in `<mark>`
///
/// Spans must be sorted, non-overlapping and on char boundaries, as
/// produced by [`search`]; anything else is skipped.
pub fn highlight(text: &str, spans: &[MatchSpan]) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 13);
    let mut cursor = 0;
    for span in spans {
        let valid = span.start >= cursor
            && span.start < span.end
            && span.end <= text.len()
            && text.is_char_boundary(span.start)
            && text.is_char_boundary(span.end);
        if !valid {
            continue;
        }
        out.push_str(&escape_html(&text[cursor..span.start]));
        out.push_str("<mark>");
        out.push_str(&escape_html(&text[span.start..span.end]));
        out.push_str("</mark>");
        cursor = span.end;
    }
    out.push_str(&escape_html(&text[cursor..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Notes, TaskStatus};
    use chrono::{TimeZone, Utc};

    fn task(id: &str, title: &str, notes: Option<&str>) -> TaskRecord {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        TaskRecord {
            id: id.to_string(),
            title: title.to_string(),
            notes: notes.map(|text| Notes::Text(text.to_string())),
            status: TaskStatus::Todo,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn finds_buy_milk_regardless_of_case() {
        let tasks = vec![task("1", "Buy milk", None), task("2", "Call Bob", None)];
        for query in ["milk", "MILK", "Milk"] {
            let hits = search(&tasks, query);
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].task.id, "1");
            assert_eq!(hits[0].title_matches, vec![MatchSpan { start: 4, end: 8 }]);
        }
    }

    #[test]
    fn matches_notes_too() {
        let tasks = vec![
            task("1", "Groceries", Some("oat MILK and bread")),
            task("2", "Call Bob", Some("about the car")),
        ];
        let hits = search(&tasks, "milk");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].title_matches.is_empty());
        assert_eq!(
            hits[0].note_matches,
            vec![NoteMatch {
                index: 0,
                spans: vec![MatchSpan { start: 4, end: 8 }]
            }]
        );
    }

    #[test]
    fn blank_query_matches_everything() {
        let tasks = vec![task("1", "A", None), task("2", "B", None)];
        assert_eq!(search(&tasks, "   ").len(), 2);
    }

    #[test]
    fn repeated_matches_do_not_overlap() {
        let spans = find_matches("aaaa", &['a', 'a']);
        assert_eq!(
            spans,
            vec![MatchSpan { start: 0, end: 2 }, MatchSpan { start: 2, end: 4 }]
        );
    }

    #[test]
    fn spans_are_byte_offsets_for_non_ascii_text() {
        let tasks = vec![task("1", "Crème BRÛLÉE", None)];
        let hits = search(&tasks, "brûlée");
        assert_eq!(hits.len(), 1);
        let span = hits[0].title_matches[0];
        assert_eq!(&tasks[0].title[span.start..span.end], "BRÛLÉE");
    }

    #[test]
    fn highlight_escapes_surrounding_text() {
        let text = "<b>milk</b> & milk";
        let spans = find_matches(text, &['m', 'i', 'l', 'k']);
        assert_eq!(
            highlight(text, &spans),
            "&lt;b&gt;<mark>milk</mark>&lt;/b&gt; &amp; <mark>milk</mark>"
        );
    }

    #[test]
    fn highlight_skips_invalid_spans() {
        let spans = [MatchSpan { start: 3, end: 99 }];
        assert_eq!(highlight("a&b", &spans), "a&amp;b");
    }
}
