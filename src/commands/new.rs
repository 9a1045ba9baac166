//! Create a new blog post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::{validate_slug, PostFormat};
use crate::Folio;

/// Create a new post in the blog directory and return its path.
///
/// The slug defaults to the slugified title. The file carries the same
/// front-matter fields the CMS edits: title, date, description and tags.
pub fn create_post(
    folio: &Folio,
    title: &str,
    slug: Option<&str>,
    format: PostFormat,
) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => validate_slug(s)?.to_string(),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from title {:?}, pass --slug", title);
    }

    let blog_dir = folio.blog_dir();
    fs::create_dir_all(&blog_dir)?;

    // Either extension would resolve to the same post
    for existing in PostFormat::PRIORITY {
        let path = blog_dir.join(format!("{}.{}", slug, existing.extension()));
        if path.exists() {
            anyhow::bail!("Post already exists: {:?}", path);
        }
    }

    let now = chrono::Utc::now();
    let content = format!(
        "---\ntitle: {}\ndate: {}\ndescription: \"\"\ntags: []\n---\n",
        serde_json::to_string(title)?,
        now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    );

    let file_path = blog_dir.join(format!("{}.{}", slug, format.extension()));
    fs::write(&file_path, content)?;
    tracing::debug!("Wrote {:?}", file_path);

    Ok(file_path)
}

/// Run the new command
pub fn run(folio: &Folio, title: &str, slug: Option<&str>, mdx: bool) -> Result<()> {
    let format = if mdx { PostFormat::Mdx } else { PostFormat::Md };
    let path = create_post(folio, title, slug, format)?;
    println!("Created: {:?}", path);
    Ok(())
}
