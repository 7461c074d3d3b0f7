//! Markdown to display HTML.
//!
//! Message content comes from a model and is untrusted. Raw HTML is emitted
//! as escaped text and script URLs in links are neutralised, so the output
//! can be inserted into a page as-is.

use std::sync::OnceLock;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

const CODE_THEME: &str = "InspiredGitHub";

struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

fn highlighter() -> &'static Highlighter {
    static HIGHLIGHTER: OnceLock<Highlighter> = OnceLock::new();
    HIGHLIGHTER.get_or_init(|| Highlighter {
        syntaxes: SyntaxSet::load_defaults_newlines(),
        themes: ThemeSet::load_defaults(),
    })
}

/// Render Markdown `source` to safe HTML.
pub fn to_html(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(source, options);

    let mut events = Vec::new();
    // Kind and accumulated source of the code block being read
    let mut code: Option<(CodeBlockKind<'_>, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => code = Some((kind, String::new())),
            Event::End(TagEnd::CodeBlock) => {
                if let Some((kind, src)) = code.take() {
                    match highlight(language(&kind), &src) {
                        Some(highlighted) => events.push(Event::Html(CowStr::from(highlighted))),
                        None => {
                            events.push(Event::Start(Tag::CodeBlock(kind)));
                            events.push(Event::Text(CowStr::from(src)));
                            events.push(Event::End(TagEnd::CodeBlock));
                        }
                    }
                }
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, src)) = code.as_mut() {
                    src.push_str(&text);
                }
            }
            Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => events.push(Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            })),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => events.push(Event::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            })),
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme = url.trim_start().to_ascii_lowercase();
    let unsafe_scheme = ["javascript:", "vbscript:", "data:text/html"]
        .iter()
        .any(|prefix| scheme.starts_with(prefix));
    if unsafe_scheme {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

fn language<'k>(kind: &'k CodeBlockKind<'_>) -> &'k str {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or_default(),
        CodeBlockKind::Indented => "",
    }
}

/// Syntax-highlighted HTML for a code block, or `None` when the language is
/// unknown and the block should go through the plain renderer.
fn highlight(lang: &str, source: &str) -> Option<String> {
    if lang.is_empty() {
        return None;
    }
    let hl = highlighter();
    let syntax = hl.syntaxes.find_syntax_by_token(lang)?;
    let theme = hl.themes.themes.get(CODE_THEME)?;
    match highlighted_html_for_string(source, &hl.syntaxes, syntax, theme) {
        Ok(highlighted) => Some(highlighted),
        Err(e) => {
            tracing::debug!("Highlighting {} block failed: {}", lang, e);
            None
        }
    }
}
