//! Content module - blog posts, front-matter and Markdown rendering

mod error;
mod frontmatter;
mod markdown;
mod post;
pub mod reading_time;
pub mod repository;
mod validate;

pub use error::{ContentError, ContentResult, FrontMatterError};
pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::{Post, PostFormat};
pub use reading_time::ReadingTime;
pub use repository::PostRepository;
pub use validate::validate_slug;
