//! Markdown rendering for bot replies.
//!
//! The controller treats rendering as an optional capability: it holds an
//! `Option<Box<dyn MarkdownRenderer>>` and falls back to literal text when
//! none was injected. [`CommonMarkRenderer`] is the `pulldown-cmark`
//! implementation used in the browser.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream, html};
use serde::Deserialize;

/// Renderer switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Render bot replies as Markdown at all.
    pub enabled: bool,
    /// Single line breaks become `<br />`.
    pub breaks: bool,
    /// GitHub-flavored Markdown: tables, strikethrough, task lists and
    /// autolinked bare `http(s)://` and `www.` URLs.
    pub gfm: bool,
    /// Give headings slug ids.
    pub header_ids: bool,
    /// Entity-encode email autolinks.
    pub mangle: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            breaks: true,
            gfm: true,
            header_ids: false,
            mangle: false,
        }
    }
}

/// Converts Markdown source into HTML.
pub trait MarkdownRenderer: fmt::Debug {
    /// Render `text` to an HTML fragment.
    fn render(&self, text: &str) -> String;
}

/// `pulldown-cmark` backed renderer.
#[derive(Debug, Clone)]
pub struct CommonMarkRenderer {
    options: MarkdownOptions,
}

impl CommonMarkRenderer {
    /// Create a renderer with the given switches. `enabled` is ignored here.
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// The renderer to inject into a controller, or `None` when Markdown is
    /// switched off.
    pub fn from_options(options: MarkdownOptions) -> Option<Box<dyn MarkdownRenderer>> {
        options
            .enabled
            .then(|| Box::new(Self::new(options)) as Box<dyn MarkdownRenderer>)
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.options.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, text: &str) -> String {
        let breaks = self.options.breaks;
        let parser = Parser::new_ext(text, self.parser_options());
        let mut events: Vec<Event<'_>> = TextMergeStream::new(parser)
            .map(|event| match event {
                Event::SoftBreak if breaks => Event::HardBreak,
                other => other,
            })
            .collect();

        if self.options.gfm {
            events = autolink_literals(events);
        }
        if self.options.header_ids {
            assign_heading_ids(&mut events);
        }
        if self.options.mangle {
            events = mangle_email_links(events);
        }

        let mut out = String::with_capacity(text.len() + text.len() / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut seen: HashMap<String, usize> = HashMap::new();

    for start in 0..events.len() {
        if !matches!(events[start], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }

        let mut title = String::new();
        for event in &events[start + 1..] {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => title.push_str(t),
                _ => {}
            }
        }

        let base = slugify(&title);
        let count = seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
            *id = Some(CowStr::from(slug));
        }
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            slug.push('-');
        }
    }
    slug
}

/// Turns bare URLs in text outside links and code blocks into links.
fn autolink_literals(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in events {
        match &event {
            Event::Start(Tag::Link { .. }) => link_depth += 1,
            Event::End(TagEnd::Link) => link_depth = link_depth.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if link_depth == 0 && !in_code_block => {
                let urls = find_url_literals(text);
                if !urls.is_empty() {
                    push_linked_text(&mut out, text, &urls);
                    continue;
                }
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

const URL_PREFIXES: [&str; 3] = ["https://", "http://", "www."];

fn find_url_literals(text: &str) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let Some((offset, prefix)) = URL_PREFIXES
            .iter()
            .filter_map(|p| rest.find(p).map(|i| (i, *p)))
            .min_by_key(|(i, _)| *i)
        else {
            break;
        };

        let start = pos + offset;
        let at_boundary = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let end = start + url_len(&text[start..]);
        let has_host = text
            .get(start + prefix.len()..end)
            .and_then(|host| host.chars().next())
            .is_some_and(char::is_alphanumeric);

        if at_boundary && has_host {
            found.push(start..end);
            pos = end;
        } else {
            // Prefixes are ASCII, so this stays on a char boundary.
            pos = start + 1;
        }
    }
    found
}

/// Length of the URL at the start of `s`, without trailing punctuation and
/// unbalanced closing parentheses.
fn url_len(s: &str) -> usize {
    let mut end = s
        .find(|c: char| c.is_whitespace() || c == '<')
        .unwrap_or(s.len());

    while let Some(last) = s[..end].chars().next_back() {
        let candidate = &s[..end];
        let trailing_punct = matches!(
            last,
            '?' | '!' | '.' | ',' | ':' | ';' | '*' | '_' | '~' | '\'' | '"'
        );
        let unbalanced =
            last == ')' && candidate.matches('(').count() < candidate.matches(')').count();
        if trailing_punct || unbalanced {
            end -= last.len_utf8();
        } else {
            break;
        }
    }
    end
}

fn push_linked_text<'a>(out: &mut Vec<Event<'a>>, text: &str, urls: &[Range<usize>]) {
    let mut cursor = 0;
    for range in urls {
        if cursor < range.start {
            out.push(Event::Text(CowStr::from(text[cursor..range.start].to_string())));
        }
        let url = &text[range.clone()];
        let dest = if url.starts_with("www.") {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(dest),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(CowStr::from(url.to_string())));
        out.push(Event::End(TagEnd::Link));
        cursor = range.end;
    }
    if cursor < text.len() {
        out.push(Event::Text(CowStr::from(text[cursor..].to_string())));
    }
}

fn mangle_email_links(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut in_email = false;

    for event in events {
        match event {
            Event::Start(Tag::Link {
                link_type: LinkType::Email,
                dest_url,
                ..
            }) => {
                in_email = true;
                let href = encode_entities(&format!("mailto:{dest_url}"));
                out.push(Event::InlineHtml(CowStr::from(format!("<a href=\"{href}\">"))));
            }
            Event::Text(text) if in_email => {
                out.push(Event::InlineHtml(CowStr::from(encode_entities(&text))));
            }
            Event::End(TagEnd::Link) if in_email => {
                in_email = false;
                out.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
            }
            other => out.push(other),
        }
    }
    out
}

fn encode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 6);
    for c in s.chars() {
        out.push_str("&#");
        out.push_str(&u32::from(c).to_string());
        out.push(';');
    }
    out
}
