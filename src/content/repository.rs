//! Post repository - loads blog posts from the content directory

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::{ContentError, ContentResult};
use super::validate::validate_slug;
use super::{Post, PostFormat};

/// Read-only access to the posts in one blog directory.
///
/// Holds nothing but the path: every call lists and reads the files again,
/// so results always reflect what is on disk.
#[derive(Debug, Clone)]
pub struct PostRepository {
    blog_dir: PathBuf,
}

impl PostRepository {
    /// Create a repository over `blog_dir` (usually `<content>/blog`)
    pub fn new<P: Into<PathBuf>>(blog_dir: P) -> Self {
        Self {
            blog_dir: blog_dir.into(),
        }
    }

    /// Load all posts, newest first.
    ///
    /// A missing directory yields an empty list. Posts whose date does not
    /// parse come after every dated post, in file-name order. When both
    /// `x.md` and `x.mdx` exist only `x.mdx` is listed.
    pub fn list_posts(&self) -> ContentResult<Vec<Post>> {
        if !self.blog_dir.exists() {
            tracing::debug!("Blog directory {:?} does not exist", self.blog_dir);
            return Ok(Vec::new());
        }

        let mut sources: IndexMap<String, (PathBuf, PostFormat)> = IndexMap::new();

        for entry in WalkDir::new(&self.blog_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| self.walk_error(e))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some((slug, format)) = PostFormat::split_file_name(path) else {
                continue;
            };

            if let Some((kept, kept_format)) = sources.get(&slug) {
                if *kept_format == PostFormat::Mdx {
                    tracing::debug!("Skipping {:?}, shadowed by {:?}", path, kept);
                    continue;
                }
                tracing::debug!("Skipping {:?}, shadowed by {:?}", kept, path);
            }
            sources.insert(slug, (path.to_path_buf(), format));
        }

        let mut posts: Vec<(Option<DateTime<Utc>>, Post)> = Vec::with_capacity(sources.len());
        for (slug, (path, format)) in sources {
            let post = load_post(&path, slug, format)?;
            posts.push((post.parsed_date(), post));
        }

        // Sort by date descending (newest first); the sort is stable and
        // `None` orders below every date
        posts.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(posts.into_iter().map(|(_, post)| post).collect())
    }

    /// Load one post by an untrusted slug.
    ///
    /// The slug is validated before any path is built from it. `.mdx` is
    /// preferred over `.md`. Returns `Ok(None)` when neither file exists.
    pub fn get_post(&self, slug: &str) -> ContentResult<Option<Post>> {
        let slug = validate_slug(slug)?;

        for format in PostFormat::PRIORITY {
            let path = self
                .blog_dir
                .join(format!("{}.{}", slug, format.extension()));

            match fs::read_to_string(&path) {
                Ok(raw) => {
                    return Post::from_source(slug.to_string(), format, &raw)
                        .map(Some)
                        .map_err(|e| ContentError::malformed(path, e));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(ContentError::read(path, e)),
            }
        }

        tracing::debug!("No post for slug {:?} in {:?}", slug, self.blog_dir);
        Ok(None)
    }

    /// All tags with the number of posts carrying them, most used first
    pub fn tags(&self) -> ContentResult<Vec<(String, usize)>> {
        let posts = self.list_posts()?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for post in &posts {
            for tag in &post.tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let mut tags: Vec<_> = counts.into_iter().collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(tags)
    }

    fn walk_error(&self, err: walkdir::Error) -> ContentError {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.blog_dir.clone());
        let source = err
            .into_io_error()
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
        ContentError::read(path, source)
    }
}

/// Load a single post from a file
fn load_post(path: &Path, slug: String, format: PostFormat) -> ContentResult<Post> {
    let raw = fs::read_to_string(path).map_err(|e| ContentError::read(path, e))?;
    Post::from_source(slug, format, &raw).map_err(|e| ContentError::malformed(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn post(title: &str, date: &str) -> String {
        format!("---\ntitle: {}\ndate: {}\n---\nBody of {}.\n", title, date, title)
    }

    fn slugs(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let repo = PostRepository::new(tmp.path().join("blog"));
        assert!(repo.list_posts().unwrap().is_empty());
        assert!(repo.tags().unwrap().is_empty());
    }

    #[test]
    fn test_list_sorted_newest_first() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", &post("A", "2024-01-01"));
        write(tmp.path(), "b.mdx", &post("B", "2024-06-01"));

        let posts = PostRepository::new(tmp.path()).list_posts().unwrap();
        assert_eq!(slugs(&posts), vec!["b", "a"]);
        assert_eq!(posts[0].format, PostFormat::Mdx);
        assert_eq!(posts[1].format, PostFormat::Md);
    }

    #[test]
    fn test_list_ignores_other_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "post.md", &post("Post", "2024-01-01"));
        write(tmp.path(), "notes.txt", "not a post");
        write(tmp.path(), "draft.markdown", &post("Draft", "2024-01-02"));
        fs::create_dir(tmp.path().join("images")).unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        write(&tmp.path().join("nested"), "deep.md", &post("Deep", "2024-01-03"));

        let posts = PostRepository::new(tmp.path()).list_posts().unwrap();
        assert_eq!(slugs(&posts), vec!["post"]);
    }

    #[test]
    fn test_list_applies_defaults() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "untitled.md", "No front matter at all.");

        let posts = PostRepository::new(tmp.path()).list_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "untitled");
        assert_eq!(posts[0].date, "");
        assert_eq!(posts[0].description, "");
        assert!(posts[0].tags.is_empty());
        assert!(posts[0].cover_image.is_none());
    }

    #[test]
    fn test_undated_posts_sort_last_in_file_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a-undated.md", "---\ntitle: A\n---\n");
        write(tmp.path(), "b-old.md", &post("B", "2020-05-01"));
        write(tmp.path(), "c-garbage.md", &post("C", "sometime soon"));
        write(tmp.path(), "d-new.md", &post("D", "2025-02-14"));

        let posts = PostRepository::new(tmp.path()).list_posts().unwrap();
        assert_eq!(
            slugs(&posts),
            vec!["d-new", "b-old", "a-undated", "c-garbage"]
        );
    }

    #[test]
    fn test_equal_dates_keep_file_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "x.md", &post("X", "2024-02-02"));
        write(tmp.path(), "y.md", &post("Y", "2024-02-02"));
        write(tmp.path(), "z.md", &post("Z", "2024-02-02"));

        let posts = PostRepository::new(tmp.path()).list_posts().unwrap();
        assert_eq!(slugs(&posts), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_list_dedupes_preferring_mdx() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "x.md", &post("From md", "2024-01-01"));
        write(tmp.path(), "x.mdx", &post("From mdx", "2024-01-01"));

        let posts = PostRepository::new(tmp.path()).list_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "From mdx");
    }

    #[test]
    fn test_list_tolerates_wrong_typed_values() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "good.md", &post("Good", "2024-01-01"));
        write(
            tmp.path(),
            "series.md",
            "---\ntitle: [Part, One]\ndate: 2024-03-01\ntags: {main: rust}\n---\nBody\n",
        );

        let posts = PostRepository::new(tmp.path()).list_posts().unwrap();
        assert_eq!(slugs(&posts), vec!["series", "good"]);
        assert_eq!(posts[0].title, "series");
        assert!(posts[0].tags.is_empty());
    }

    #[test]
    fn test_list_sorts_year_only_dates() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a-undated.md", "---\ntitle: A\n---\n");
        write(tmp.path(), "b-year.md", "---\ntitle: B\ndate: 2025\n---\n");
        write(tmp.path(), "c-month.md", &post("C", "2024-06"));
        write(tmp.path(), "d-day.md", &post("D", "2024-12-31"));

        let posts = PostRepository::new(tmp.path()).list_posts().unwrap();
        assert_eq!(slugs(&posts), vec!["b-year", "d-day", "c-month", "a-undated"]);
    }

    #[test]
    fn test_list_propagates_malformed_front_matter() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "good.md", &post("Good", "2024-01-01"));
        write(tmp.path(), "bad.md", "---\ntitle: [broken\n---\n");

        let err = PostRepository::new(tmp.path()).list_posts().unwrap_err();
        match err {
            ContentError::MalformedFrontMatter { path, .. } => {
                assert!(path.ends_with("bad.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_list_propagates_unreadable_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("binary.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = PostRepository::new(tmp.path()).list_posts().unwrap_err();
        assert!(matches!(err, ContentError::ContentRead { .. }));
    }

    #[test]
    fn test_get_post() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "hello.md", &post("Hello", "2024-01-01"));

        let repo = PostRepository::new(tmp.path());
        let found = repo.get_post("hello").unwrap().unwrap();
        assert_eq!(found.title, "Hello");
        assert_eq!(found.slug, "hello");
        assert_eq!(found.content, "Body of Hello.\n");
    }

    #[test]
    fn test_get_missing_post_is_none() {
        let tmp = TempDir::new().unwrap();
        let repo = PostRepository::new(tmp.path());
        assert!(repo.get_post("nonexistent").unwrap().is_none());

        let repo = PostRepository::new(tmp.path().join("no-such-dir"));
        assert!(repo.get_post("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_get_post_prefers_mdx() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "x.md", &post("From md", "2024-01-01"));
        write(tmp.path(), "x.mdx", &post("From mdx", "2024-01-01"));

        let found = PostRepository::new(tmp.path()).get_post("x").unwrap().unwrap();
        assert_eq!(found.title, "From mdx");
        assert_eq!(found.format, PostFormat::Mdx);
    }

    #[test]
    fn test_get_post_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        let blog = tmp.path().join("blog");
        fs::create_dir(&blog).unwrap();
        write(tmp.path(), "secret.md", &post("Secret", "2024-01-01"));

        let repo = PostRepository::new(&blog);
        for slug in ["../secret", "../../etc/passwd", "", "a/b", "secret.md"] {
            assert!(
                matches!(repo.get_post(slug), Err(ContentError::InvalidSlugFormat(_))),
                "{slug:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_get_post_malformed_front_matter() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "bad.mdx", "---\n: : :\n  - [\n---\n");

        let err = PostRepository::new(tmp.path()).get_post("bad").unwrap_err();
        assert!(matches!(err, ContentError::MalformedFrontMatter { .. }));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_tags_counted() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "---\ntags: [homelab, docker]\n---\n");
        write(tmp.path(), "b.md", "---\ntags: homelab\n---\n");
        write(tmp.path(), "c.md", "---\ntags: [music]\n---\n");

        let tags = PostRepository::new(tmp.path()).tags().unwrap();
        assert_eq!(
            tags,
            vec![
                ("homelab".to_string(), 2),
                ("docker".to_string(), 1),
                ("music".to_string(), 1),
            ]
        );
    }
}
