//! List site content

use anyhow::Result;
use std::fmt::Write as _;

use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str, json: bool) -> Result<()> {
    print!("{}", render(folio, content_type, json)?);
    Ok(())
}

/// Build the listing printed by [`run`]
pub fn render(folio: &Folio, content_type: &str, json: bool) -> Result<String> {
    let repo = folio.posts();
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts = repo.list_posts()?;
            if json {
                out = serde_json::to_string_pretty(&posts)?;
                out.push('\n');
            } else {
                writeln!(out, "Posts ({}):", posts.len())?;
                for post in posts {
                    let date = if post.date.is_empty() {
                        "----------".to_string()
                    } else {
                        post.date.clone()
                    };
                    writeln!(
                        out,
                        "  {} - {} [{}] ({})",
                        date, post.title, post.slug, post.reading_time
                    )?;
                }
            }
        }
        "tag" | "tags" => {
            let tags = repo.tags()?;
            if json {
                let map: serde_json::Map<String, serde_json::Value> = tags
                    .into_iter()
                    .map(|(tag, count)| (tag, serde_json::Value::from(count)))
                    .collect();
                out = serde_json::to_string_pretty(&map)?;
                out.push('\n');
            } else {
                writeln!(out, "Tags ({}):", tags.len())?;
                for (tag, count) in tags {
                    writeln!(out, "  {} ({})", tag, count)?;
                }
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(out)
}
