//! Show a single post

use anyhow::Result;

use crate::content::MarkdownRenderer;
use crate::Folio;

/// Print a post's metadata and, unless `raw`, its rendered HTML body
pub fn run(folio: &Folio, slug: &str, raw: bool) -> Result<()> {
    print!("{}", render(folio, slug, raw)?);
    Ok(())
}

/// Build the output printed by [`run`]
pub fn render(folio: &Folio, slug: &str, raw: bool) -> Result<String> {
    let post = match folio.posts().get_post(slug)? {
        Some(post) => post,
        None => anyhow::bail!("Post not found: {}", slug),
    };

    let mut out = format!("Title:        {}\n", post.title);
    out.push_str(&format!("URL:          {}\n", post.path()));
    if !post.date.is_empty() {
        out.push_str(&format!("Date:         {}\n", post.display_date()));
    }
    if !post.description.is_empty() {
        out.push_str(&format!("Description:  {}\n", post.description));
    }
    if !post.tags.is_empty() {
        out.push_str(&format!("Tags:         {}\n", post.tags.join(", ")));
    }
    if let Some(cover) = &post.cover_image {
        out.push_str(&format!("Cover image:  {}\n", cover));
    }
    out.push_str(&format!("Reading time: {}\n", post.reading_time));
    out.push_str(&format!("Format:       {}\n\n", post.format.extension()));

    if raw {
        out.push_str(&post.content);
    } else {
        let renderer = MarkdownRenderer::with_theme(&folio.config.highlight.theme);
        out.push_str(&renderer.render_post(&post));
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }

    Ok(out)
}
