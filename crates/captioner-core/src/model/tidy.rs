//! Caption cleanup applied to every backend reply.
//!
//! Vision models wrap captions in labels, quotes and follow-up paragraphs, and
//! stop mid-sentence when they run out of tokens. The display wants one
//! plain sentence or paragraph.

/// Lead-in labels models like to prepend, matched case-insensitively.
const LABELS: [&str; 2] = ["image caption:", "caption:"];

/// Opening and closing quote pairs stripped when they wrap the whole caption.
const QUOTES: [(char, char); 3] = [('"', '"'), ('\u{201C}', '\u{201D}'), ('\'', '\'')];

/// Normalize raw model output into a single caption paragraph.
///
/// `truncated` means the model hit its token limit; the unfinished sentence at
/// the end is dropped if an earlier one is complete. Returns `None` when
/// nothing usable is left.
pub(crate) fn tidy_caption(raw: &str, truncated: bool) -> Option<String> {
    let text = strip_label(raw.trim());

    let paragraph = text
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .unwrap_or("");

    let collapsed = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut caption = strip_quotes(&collapsed).to_string();

    if truncated {
        match caption.rfind(|c| matches!(c, '.' | '!' | '?')) {
            Some(end) if end + 1 < caption.len() => {
                tracing::warn!(
                    dropped = &caption[end + 1..],
                    "Caption hit the token limit, dropping the unfinished sentence"
                );
                caption.truncate(end + 1);
            }
            Some(_) => {}
            None => tracing::warn!("Caption hit the token limit mid-sentence"),
        }
    }

    (!caption.is_empty()).then_some(caption)
}

fn strip_label(text: &str) -> &str {
    for label in LABELS {
        let matches = text
            .get(..label.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(label));
        if matches {
            return text[label.len()..].trim_start();
        }
    }
    text
}

fn strip_quotes(text: &str) -> &str {
    for (open, close) in QUOTES {
        if let Some(inner) = text.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            return inner.trim();
        }
    }
    text
}
