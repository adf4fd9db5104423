use crate::index::Span;
use serde::{Deserialize, Serialize};

/// A window of a document's text with matched terms marked. Highlight ranges
/// are byte offsets into `text`, ascending and non-overlapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    pub highlights: Vec<(usize, usize)>,
}

impl Snippet {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Wrap every highlight in `open`/`close`, e.g. `<em>` and `</em>`.
    pub fn render(&self, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + self.highlights.len() * (open.len() + close.len()));
        let mut cursor = 0;
        for &(start, end) in &self.highlights {
            let (Some(before), Some(hit)) = (self.text.get(cursor..start), self.text.get(start..end)) else {
                continue;
            };
            out.push_str(before);
            out.push_str(open);
            out.push_str(hit);
            out.push_str(close);
            cursor = end;
        }
        out.push_str(self.text.get(cursor..).unwrap_or_default());
        out
    }
}

/// Cut a `width`-character window out of `text`. The window is anchored on
/// the first valid span (40 characters of lead-in at the default width) or on
/// the start of the text when nothing matched there. Spans that fall outside
/// the text or off char boundaries are ignored.
pub fn extract(text: &str, spans: &[Span], width: usize) -> Snippet {
    let mut valid: Vec<(usize, usize)> = spans
        .iter()
        .map(|s| (s.start as usize, s.end as usize))
        .filter(|&(s, e)| s < e && text.get(s..e).is_some())
        .collect();
    valid.sort_unstable();
    valid.dedup();

    let anchor = valid.first().map_or(0, |&(s, _)| s);
    let (start, end) = window(text, anchor, width);

    let mut highlights = Vec::new();
    let mut last_end = 0;
    for (s, e) in valid {
        if s >= start && e <= end && s - start >= last_end {
            highlights.push((s - start, e - start));
            last_end = e - start;
        }
    }
    Snippet { text: text[start..end].to_string(), highlights }
}

fn window(text: &str, anchor: usize, width: usize) -> (usize, usize) {
    let total = text.chars().count();
    let anchor_char = text[..anchor].chars().count();
    let mut start_char = anchor_char.saturating_sub(width / 4);
    if start_char + width > total {
        start_char = total.saturating_sub(width);
    }
    let end_char = (start_char + width).min(total);
    (byte_at(text, start_char), byte_at(text, end_char))
}

fn byte_at(text: &str, char_idx: usize) -> usize {
    text.char_indices().nth(char_idx).map_or(text.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, word: &str) -> Span {
        let start = text.find(word).unwrap();
        Span { start: start as u32, end: (start + word.len()) as u32 }
    }

    #[test]
    fn short_text_is_returned_whole() {
        let text = "Construct a new element of type E.";
        let s = extract(text, &[span(text, "element")], 160);
        assert_eq!(s.text, text);
        assert_eq!(s.highlights, vec![(16, 23)]);
        assert_eq!(s.render("<em>", "</em>"), "Construct a new <em>element</em> of type E.");
    }

    #[test]
    fn window_is_centered_near_the_first_match() {
        let text = format!("{}needle{}", "x ".repeat(200), " y".repeat(200));
        let s = extract(&text, &[span(&text, "needle")], 160);
        assert_eq!(s.text.chars().count(), 160);
        assert_eq!(s.highlights.len(), 1);
        let (a, b) = s.highlights[0];
        assert_eq!(&s.text[a..b], "needle");
        assert_eq!(a, 40);
    }

    #[test]
    fn window_slides_back_at_end_of_text() {
        let text = format!("{}tail", "z ".repeat(100));
        let s = extract(&text, &[span(&text, "tail")], 50);
        assert_eq!(s.text.chars().count(), 50);
        assert!(s.text.ends_with("tail"));
    }

    #[test]
    fn no_match_takes_leading_text() {
        let text = "a".repeat(300);
        let s = extract(&text, &[], 160);
        assert_eq!(s.text.len(), 160);
        assert!(s.highlights.is_empty());
    }

    #[test]
    fn multibyte_text_stays_on_char_boundaries() {
        let text = format!("{}Lagrange{}", "é".repeat(100), "ü".repeat(100));
        let s = extract(&text, &[span(&text, "Lagrange")], 20);
        assert_eq!(s.text.chars().count(), 20);
        let (a, b) = s.highlights[0];
        assert_eq!(&s.text[a..b], "Lagrange");
    }

    #[test]
    fn out_of_range_spans_are_ignored() {
        let text = "short";
        let s = extract(text, &[Span { start: 10, end: 20 }, Span { start: 3, end: 2 }], 160);
        assert_eq!(s.text, "short");
        assert!(s.highlights.is_empty());
    }
}
