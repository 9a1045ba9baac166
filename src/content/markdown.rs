//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::{Post, PostFormat};

const H1_CLASS: &str = "text-4xl font-bold tracking-tight text-gray-900 dark:text-white mt-8 mb-4";
const H2_CLASS: &str =
    "text-3xl font-semibold tracking-tight text-gray-900 dark:text-white mt-8 mb-4";
const H3_CLASS: &str =
    "text-2xl font-semibold tracking-tight text-gray-900 dark:text-white mt-6 mb-3";
const P_CLASS: &str = "text-lg leading-relaxed text-gray-700 dark:text-gray-300 mb-4";
const A_CLASS: &str = "text-blue-600 dark:text-blue-400 hover:underline";
const UL_CLASS: &str = "list-disc list-inside mb-4 text-gray-700 dark:text-gray-300 space-y-2";
const OL_CLASS: &str = "list-decimal list-inside mb-4 text-gray-700 dark:text-gray-300 space-y-2";
const CODE_CLASS: &str = "bg-gray-100 dark:bg-gray-800 rounded px-1.5 py-0.5 text-sm font-mono";
const PRE_CLASS: &str = "bg-gray-900 rounded-lg p-4 overflow-x-auto mb-4";

/// Markdown renderer with syntax highlighting and the site's prose styling
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create with a specific syntect theme
    pub fn with_theme(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    /// Render a post body; MDX import/export lines are dropped first
    pub fn render_post(&self, post: &Post) -> String {
        match post.format {
            PostFormat::Mdx => self.render(&strip_mdx_esm(&post.content)),
            PostFormat::Md => self.render(&post.content),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Front-matter is handled separately in FrontMatter::parse()
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a code block
        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();

        for event in parser {
            if code_block.is_some() {
                match event {
                    Event::Text(text) => code_block_content.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        let lang = code_block.take().flatten();
                        let highlighted = self.highlight_code(&code_block_content, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                        code_block_content.clear();
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                }
                Event::Start(Tag::Heading {
                    level, id, classes, ..
                }) => {
                    let mut class = heading_class(level).to_string();
                    for extra in classes {
                        if !class.is_empty() {
                            class.push(' ');
                        }
                        class.push_str(&extra);
                    }
                    let mut open = format!("<{}", level);
                    if let Some(id) = id {
                        open.push_str(&format!(r#" id="{}""#, html_escape(&id)));
                    }
                    if !class.is_empty() {
                        open.push_str(&format!(r#" class="{}""#, html_escape(&class)));
                    }
                    open.push('>');
                    events.push(Event::Html(CowStr::from(open)));
                }
                Event::End(TagEnd::Heading(level)) => {
                    events.push(Event::Html(CowStr::from(format!("</{}>\n", level))));
                }
                Event::Start(Tag::Paragraph) => {
                    events.push(Event::Html(CowStr::from(format!(
                        r#"<p class="{}">"#,
                        P_CLASS
                    ))));
                }
                Event::End(TagEnd::Paragraph) => {
                    events.push(Event::Html(CowStr::Borrowed("</p>\n")));
                }
                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) => {
                    let title = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, html_escape(&title))
                    };
                    events.push(Event::Html(CowStr::from(format!(
                        r#"<a href="{}"{} class="{}" target="_blank" rel="noopener noreferrer">"#,
                        html_escape(&dest_url),
                        title,
                        A_CLASS
                    ))));
                }
                Event::End(TagEnd::Link) => {
                    events.push(Event::Html(CowStr::Borrowed("</a>")));
                }
                Event::Start(Tag::List(None)) => {
                    events.push(Event::Html(CowStr::from(format!(
                        "<ul class=\"{}\">\n",
                        UL_CLASS
                    ))));
                }
                Event::Start(Tag::List(Some(start))) => {
                    let start = if start == 1 {
                        String::new()
                    } else {
                        format!(r#" start="{}""#, start)
                    };
                    events.push(Event::Html(CowStr::from(format!(
                        "<ol{} class=\"{}\">\n",
                        start, OL_CLASS
                    ))));
                }
                Event::End(TagEnd::List(ordered)) => {
                    let close = if ordered { "</ol>\n" } else { "</ul>\n" };
                    events.push(Event::Html(CowStr::Borrowed(close)));
                }
                Event::Code(code) => {
                    events.push(Event::Html(CowStr::from(format!(
                        r#"<code class="{}">{}</code>"#,
                        CODE_CLASS,
                        html_escape(&code)
                    ))));
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted =
            theme.and_then(|theme| highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok());

        match highlighted {
            // syntect emits `<pre style="...">`; add the site's classes to it
            Some(html) => html.replacen(
                "<pre ",
                &format!(r#"<pre class="{} language-{}" "#, PRE_CLASS, html_escape(lang)),
                1,
            ),
            None => format!(
                r#"<pre class="{}"><code class="language-{}">{}</code></pre>"#,
                PRE_CLASS,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_class(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => H1_CLASS,
        HeadingLevel::H2 => H2_CLASS,
        HeadingLevel::H3 => H3_CLASS,
        _ => "",
    }
}

/// Drop MDX `import`/`export` blocks, which have no meaning outside a JS bundler.
///
/// A block starts with `import ` or `export ` at column 0 at the start of the
/// document or right after a blank line, and runs up to the next blank line.
/// Prose that wraps onto such a word is kept, as are fenced code blocks.
fn strip_mdx_esm(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut fence: Option<&str> = None;
    let mut in_esm = false;
    let mut block_start = true;

    for line in body.split_inclusive('\n') {
        let blank = line.trim().is_empty();

        if in_esm {
            if blank {
                in_esm = false;
                block_start = true;
                out.push_str(line);
            }
            continue;
        }

        let trimmed = line.trim_start();
        match fence {
            Some(marker) => {
                out.push_str(line);
                if trimmed.starts_with(marker) {
                    fence = None;
                    block_start = true;
                }
                continue;
            }
            None => {
                if trimmed.starts_with("```") {
                    fence = Some("```");
                } else if trimmed.starts_with("~~~") {
                    fence = Some("~~~");
                } else if block_start && (line.starts_with("import ") || line.starts_with("export ")) {
                    in_esm = true;
                    continue;
                }
            }
        }

        out.push_str(line);
        block_start = blank;
    }

    out
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains(&format!(r#"<h1 class="{}">Hello World</h1>"#, H1_CLASS)));
        assert!(html.contains(&format!(r#"<p class="{}">This is a test.</p>"#, P_CLASS)));
    }

    #[test]
    fn test_render_deep_heading_unstyled() {
        let html = MarkdownRenderer::new().render("#### Small");
        assert!(html.contains("<h4>Small</h4>"));
    }

    #[test]
    fn test_render_heading_attributes() {
        let html = MarkdownRenderer::new().render("## Setup {#setup .wide}");
        assert!(html.contains(r#"<h2 id="setup" class=""#));
        assert!(html.contains(" wide\">Setup</h2>"));
    }

    #[test]
    fn test_render_links_open_in_new_tab() {
        let html = MarkdownRenderer::new().render("[docs](https://example.com/?a=1&b=2 \"Docs\")");
        assert!(html.contains(r#"href="https://example.com/?a=1&amp;b=2""#));
        assert!(html.contains(r#"title="Docs""#));
        assert!(html.contains(r#"target="_blank" rel="noopener noreferrer">docs</a>"#));
    }

    #[test]
    fn test_render_lists() {
        let html = MarkdownRenderer::new().render("- one\n- two\n\nbetween\n\n3. three\n4. four\n");
        assert!(html.contains(&format!("<ul class=\"{}\">", UL_CLASS)));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains(&format!("<ol start=\"3\" class=\"{}\">", OL_CLASS)));
        assert!(html.contains("</ol>"));
    }

    #[test]
    fn test_render_inline_code_escaped() {
        let html = MarkdownRenderer::new().render("Use `Vec<u8>` here.");
        assert!(html.contains(&format!(r#"<code class="{}">Vec&lt;u8&gt;</code>"#, CODE_CLASS)));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(PRE_CLASS));
        assert!(html.contains("language-rust"));
        assert!(html.contains("main"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_render_unknown_theme_still_highlights() {
        let html = MarkdownRenderer::with_theme("no-such-theme").render("```\nplain text\n```");
        assert!(html.contains("plain text"));
        assert!(html.contains("language-text"));
    }

    #[test]
    fn test_render_post_strips_mdx_imports() {
        let raw = "---\ntitle: Beats\n---\nimport Player from '../components/Player'\n\n# Beats\n\n```js\nimport x from 'y'\n```\n";
        let post = Post::from_source("beats".to_string(), PostFormat::Mdx, raw).unwrap();
        let html = MarkdownRenderer::new().render_post(&post);
        assert!(!html.contains("Player"));
        assert!(html.contains("Beats</h1>"));
        assert!(html.contains("import"));
    }

    #[test]
    fn test_strip_mdx_esm_keeps_markdown() {
        let body = "export const meta = {}\n\nSome text\nimportant line\n";
        assert_eq!(strip_mdx_esm(body), "\nSome text\nimportant line\n");
    }

    #[test]
    fn test_strip_mdx_esm_keeps_wrapped_prose() {
        let body = "We had to\nimport the data by hand.\n\nThen\nexport it again.\n";
        assert_eq!(strip_mdx_esm(body), body);
    }

    #[test]
    fn test_strip_mdx_esm_multiline_import() {
        let body = "import {\n  Player,\n  Waveform,\n} from '../components'\n\nListen below.\n";
        assert_eq!(strip_mdx_esm(body), "\nListen below.\n");
    }

    #[test]
    fn test_strip_mdx_esm_after_fence() {
        let body = "Intro\n\n```sh\nimport x\n```\nexport const a = 1\n\nOutro\n";
        assert_eq!(strip_mdx_esm(body), "Intro\n\n```sh\nimport x\n```\n\nOutro\n");
    }

    #[test]
    fn test_render_post_keeps_wrapped_import_prose() {
        let raw = "---\ntitle: Migration\n---\nWe had to\nimport the data by hand.\n";
        let post = Post::from_source("migration".to_string(), PostFormat::Mdx, raw).unwrap();
        let html = MarkdownRenderer::new().render_post(&post);
        assert!(html.contains("import the data by hand."));
    }
}
