//! Blog post model

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::FrontMatterError;
use super::{reading_time, FrontMatter};
use crate::helpers::{display_date, parse_date_string};

/// Source format of a post file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostFormat {
    Mdx,
    Md,
}

impl PostFormat {
    /// Lookup order when a slug could match more than one file
    pub const PRIORITY: [PostFormat; 2] = [PostFormat::Mdx, PostFormat::Md];

    /// File extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            PostFormat::Mdx => "mdx",
            PostFormat::Md => "md",
        }
    }

    /// Split a post file name into (slug, format); `None` for other files
    pub fn split_file_name(path: &Path) -> Option<(String, PostFormat)> {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("mdx") => PostFormat::Mdx,
            Some("md") => PostFormat::Md,
            _ => return None,
        };
        let slug = path.file_stem().and_then(|s| s.to_str())?;
        Some((slug.to_string(), format))
    }
}

/// A blog post.
///
/// Built fresh from its source file on every repository call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Slug (file name without extension)
    pub slug: String,

    /// Post title, the slug when the front-matter has none
    pub title: String,

    /// Publication date as written in the front-matter, empty if absent
    pub date: String,

    /// Short summary shown on the blog index
    pub description: String,

    /// Post tags
    pub tags: Vec<String>,

    /// Cover image path or URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    /// Reading time estimate, like "3 min read"
    pub reading_time: String,

    /// Markdown/MDX body without the front-matter
    pub content: String,

    /// Which kind of file the post came from
    pub format: PostFormat,

    /// Custom front-matter fields
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Post {
    /// Build a post from the raw text of its source file
    pub fn from_source(
        slug: String,
        format: PostFormat,
        raw: &str,
    ) -> Result<Self, FrontMatterError> {
        let (fm, body) = FrontMatter::parse(raw)?;
        let reading_time = reading_time::estimate(body).text();

        Ok(Self {
            title: fm.title.unwrap_or_else(|| slug.clone()),
            date: fm.date.unwrap_or_default(),
            description: fm.description.unwrap_or_default(),
            tags: fm.tags,
            cover_image: fm.cover_image,
            reading_time,
            content: body.to_string(),
            format,
            extra: fm.extra,
            slug,
        })
    }

    /// The publication date, if it parses
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_date_string(&self.date)
    }

    /// The publication date formatted for display, like "January 5, 2024"
    pub fn display_date(&self) -> String {
        display_date(&self.date)
    }

    /// Site-relative URL of the post
    pub fn path(&self) -> String {
        format!("/blog/{}", self.slug)
    }
}
