//! Converts post bodies from markdown to HTML and derives the text-based
//! fields of a post: its excerpt and its reading time.

use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// The number of characters an excerpt is pruned to.
pub const EXCERPT_LENGTH: usize = 140;

/// Average reading speed used by [`time_to_read`].
pub const WORDS_PER_MINUTE: usize = 265;

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Renders `markdown` to an HTML string.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options()));
    out
}

/// Extracts the visible text of `markdown`, with every run of whitespace
/// collapsed to a single space. Raw HTML is dropped.
pub fn plain_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Text(s) | Event::Code(s) => text.push_str(&s),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(tag) if is_block(&tag) => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Inline tags end mid-word; only block ends separate words.
fn is_block(tag: &Tag) -> bool {
    !matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link(..) | Tag::Image(..)
    )
}

/// Prunes `text` to at most `length` characters, cutting at a word boundary
/// and appending `…` when anything was removed. A single word longer than
/// `length` is cut mid-word.
pub fn excerpt(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_owned();
    }

    let mut out = String::with_capacity(length + 3);
    let mut count = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let needed = match count {
            0 => word_len,
            _ => count + 1 + word_len,
        };
        if needed > length {
            break;
        }
        if count > 0 {
            out.push(' ');
        }
        out.push_str(word);
        count = needed;
    }
    if out.is_empty() {
        out = text.chars().take(length).collect();
    }
    out.push('…');
    out
}

/// Estimates the reading time of `text` in whole minutes, never less than
/// one.
pub fn time_to_read(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    let minutes = (words + WORDS_PER_MINUTE / 2) / WORDS_PER_MINUTE;
    minutes.max(1) as u32
}
