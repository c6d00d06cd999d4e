//! Line-oriented segmentation: headings open sections, blank lines split
//! paragraphs, fenced code blocks are skipped entirely.

use super::sentences::split_sentences;
use super::{Document, Paragraph, Section};
use regex::Regex;
use std::sync::OnceLock;

/// Strip common inline markdown before counting words.
///
/// Handles emphasis, inline code, links/images, and blockquote markers.
/// Not a full markdown parser; enough that formatting characters never
/// count as words or glue words together.
pub fn strip_inline_markdown(line: &str) -> String {
    static LINK: OnceLock<Regex> = OnceLock::new();
    static IMAGE: OnceLock<Regex> = OnceLock::new();
    static CODE: OnceLock<Regex> = OnceLock::new();
    static EMPHASIS: OnceLock<Regex> = OnceLock::new();

    let image = IMAGE
        .get_or_init(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("valid regex"));
    let link = LINK.get_or_init(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid regex"));
    let code = CODE.get_or_init(|| Regex::new(r"`([^`]*)`").expect("valid regex"));
    let emphasis = EMPHASIS
        .get_or_init(|| Regex::new(r"(\*{1,3}|_{1,3})([^*_]+)(\*{1,3}|_{1,3})").expect("valid regex"));

    let line = line.trim_start();
    let line = line.strip_prefix('>').map(str::trim_start).unwrap_or(line);

    let stripped = image.replace_all(line, "$1");
    let stripped = link.replace_all(&stripped, "$1");
    let stripped = code.replace_all(&stripped, "$1");
    let stripped = emphasis.replace_all(&stripped, "$2");
    stripped.to_string()
}

/// Parse an ATX heading line, returning (level, heading text)
fn parse_heading(line: &str) -> Option<(u8, String)> {
    let trimmed = line.trim_start();
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    // "#Foo" is not a heading; "# Foo" and bare "#" are
    if !rest.is_empty() && !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim();
    Some((hashes as u8, text.to_string()))
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Segment raw text into sections, paragraphs, and sentences.
///
/// Text before the first heading becomes an unlabeled preamble section;
/// a document without headings is one unlabeled section.
pub fn segment(name: String, text: &str) -> Document {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;
    let mut para_lines: Vec<String> = Vec::new();
    let mut para_start: u32 = 0;
    let mut in_fence = false;

    let flush_paragraph =
        |current: &mut Option<Section>, lines: &mut Vec<String>, start: u32| {
            if lines.is_empty() {
                return;
            }
            let joined = lines.join(" ");
            lines.clear();
            let sentences = split_sentences(&joined);
            if sentences.is_empty() {
                return;
            }
            let word_count = sentences.iter().map(|s| s.word_count).sum();
            let paragraph = Paragraph {
                line_start: start,
                word_count,
                sentences,
            };
            let section = current.get_or_insert_with(|| Section {
                heading: None,
                level: 0,
                line_start: start,
                paragraphs: Vec::new(),
            });
            section.paragraphs.push(paragraph);
        };

    for (i, line) in text.lines().enumerate() {
        let line_no = (i + 1) as u32;

        if is_fence(line) {
            flush_paragraph(&mut current, &mut para_lines, para_start);
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some((level, heading)) = parse_heading(line) {
            flush_paragraph(&mut current, &mut para_lines, para_start);
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section {
                heading: (!heading.is_empty()).then_some(heading),
                level,
                line_start: line_no,
                paragraphs: Vec::new(),
            });
            continue;
        }

        if line.trim().is_empty() {
            flush_paragraph(&mut current, &mut para_lines, para_start);
            continue;
        }

        if para_lines.is_empty() {
            para_start = line_no;
        }
        para_lines.push(strip_inline_markdown(line));
    }

    flush_paragraph(&mut current, &mut para_lines, para_start);
    if let Some(section) = current.take() {
        sections.push(section);
    }

    let word_count = sections.iter().map(|s| s.word_count()).sum();
    Document {
        name,
        word_count,
        sections,
    }
}

/// Convenience used by tests and steps: total words in a string after
/// markdown stripping.
pub fn count_words(text: &str) -> usize {
    strip_inline_markdown(text).split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_open_sections() {
        let doc = segment(
            "t".into(),
            "# Intro\n\nHello there.\n\n## Detail\n\nMore text here.\n".into(),
        );
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].heading.as_deref(), Some("Intro"));
        assert_eq!(doc.sections[0].level, 1);
        assert_eq!(doc.sections[1].heading.as_deref(), Some("Detail"));
        assert_eq!(doc.sections[1].level, 2);
    }

    #[test]
    fn test_preamble_before_first_heading() {
        let doc = segment("t".into(), "Opening words.\n\n# First\n\nBody.\n");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].heading, None);
        assert_eq!(doc.sections[0].level, 0);
        assert_eq!(doc.sections[0].paragraphs.len(), 1);
    }

    #[test]
    fn test_no_headings_is_one_unlabeled_section() {
        let doc = segment("t".into(), "Just prose.\n\nTwo paragraphs.\n");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].heading, None);
        assert_eq!(doc.sections[0].paragraphs.len(), 2);
    }

    #[test]
    fn test_fenced_code_is_skipped() {
        let doc = segment(
            "t".into(),
            "Before the code.\n\n```rust\nfn not_prose() {}\nlet x = 1;\n```\n\nAfter the code.\n",
        );
        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.word_count, 6);
    }

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        let doc = segment("t".into(), "Line one\ncontinues here.\n\nSecond paragraph.\n");
        let paras: Vec<_> = doc.paragraphs().collect();
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].word_count, 4);
        assert_eq!(paras[0].line_start, 1);
        assert_eq!(paras[1].line_start, 4);
    }

    #[test]
    fn test_inline_markdown_stripped() {
        assert_eq!(strip_inline_markdown("**bold** and _em_"), "bold and em");
        assert_eq!(strip_inline_markdown("see [the docs](http://x) now"), "see the docs now");
        assert_eq!(strip_inline_markdown("`code` word"), "code word");
        assert_eq!(strip_inline_markdown("> quoted text"), "quoted text");
        assert_eq!(count_words("**two** words"), 2);
    }

    #[test]
    fn test_hash_without_space_is_not_heading() {
        assert_eq!(parse_heading("#hashtag"), None);
        assert_eq!(parse_heading("# Real"), Some((1, "Real".to_string())));
        assert_eq!(parse_heading("### Deep ###"), Some((3, "Deep".to_string())));
        assert_eq!(parse_heading("####### seven"), None);
    }
}
