//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded in the binary; there is no theme directory.

use anyhow::Result;
use chrono::Datelike;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{Project, SiteConfig};
use crate::content::Post;
use crate::helpers::{date_xml, display_date, parse_date_string};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Autoescaping stays on: titles and descriptions come from content files
        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("post.html", include_str!("site/post.html")),
            ("project.html", include_str!("site/project.html")),
            ("error.html", include_str!("site/error.html")),
            // Partials
            ("partials/tags.html", include_str!("site/partials/tags.html")),
            (
                "partials/post_card.html",
                include_str!("site/partials/post_card.html"),
            ),
        ])?;

        tera.register_filter("long_date", long_date_filter);
        tera.register_filter("xml_date", xml_date_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Home page: hero, projects, latest posts, about and contact
    pub fn render_home(&self, config: &SiteConfig, posts: &[Post]) -> Result<String> {
        let mut context = site_context(config);
        context.insert("hero", &config.hero);
        context.insert("about", &config.about);
        context.insert("projects", &config.projects);
        context.insert("posts", &posts[..posts.len().min(config.recent_posts)]);
        self.render("home.html", &context)
    }

    /// Blog index listing every post
    pub fn render_blog(&self, config: &SiteConfig, posts: &[Post]) -> Result<String> {
        let mut context = site_context(config);
        context.insert("posts", posts);
        self.render("blog.html", &context)
    }

    /// A single post; `content_html` is the rendered body
    pub fn render_post(&self, config: &SiteConfig, post: &Post, content_html: &str) -> Result<String> {
        let mut context = site_context(config);
        context.insert("post", post);
        context.insert("content", content_html);
        self.render("post.html", &context)
    }

    /// A project detail page
    pub fn render_project(&self, config: &SiteConfig, project: &Project) -> Result<String> {
        let mut context = site_context(config);
        context.insert("project", project);
        self.render("project.html", &context)
    }

    /// Error page (404, 500)
    pub fn render_error(
        &self,
        config: &SiteConfig,
        status: u16,
        heading: &str,
        message: &str,
    ) -> Result<String> {
        let mut context = site_context(config);
        context.insert("status", &status);
        context.insert("heading", heading);
        context.insert("message", message);
        self.render("error.html", &context)
    }
}

/// Values every page needs
fn site_context(config: &SiteConfig) -> Context {
    let mut context = Context::new();
    context.insert("site", config);
    context.insert("year", &chrono::Utc::now().year());
    context
}

/// Tera filter: format a front-matter date string like "January 5, 2024"
fn long_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("long_date", "value", String, value);
    Ok(tera::Value::String(display_date(&s)))
}

/// Tera filter: machine-readable date for `<time datetime>`, empty when unparseable
fn xml_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("xml_date", "value", String, value);
    let formatted = parse_date_string(&s)
        .map(|d| date_xml(&d))
        .unwrap_or_default();
    Ok(tera::Value::String(formatted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostFormat;

    fn sample_post(slug: &str, title: &str, date: &str, tags: &[&str]) -> Post {
        let raw = format!(
            "---\ntitle: \"{}\"\ndate: {}\ndescription: About {}\ntags: [{}]\n---\nHello **world**.\n",
            title,
            date,
            slug,
            tags.join(", ")
        );
        Post::from_source(slug.to_string(), PostFormat::Md, &raw).unwrap()
    }

    #[test]
    fn test_render_blog_index() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let posts = vec![
            sample_post("new", "Newer", "2024-06-01", &["a", "b", "c", "d"]),
            sample_post("old", "Older", "2024-01-01", &[]),
        ];

        let html = renderer.render_blog(&config, &posts).unwrap();
        assert!(html.contains("Newer"));
        assert!(html.contains("Older"));
        assert!(html.contains("June 1, 2024"));
        assert!(html.contains("1 min read"));
        // Cards show at most three tags
        assert!(html.contains(">c</span>"));
        assert!(!html.contains(">d</span>"));
        assert!(html.find("Newer").unwrap() < html.find("Older").unwrap());
    }

    #[test]
    fn test_render_empty_blog_index() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_blog(&SiteConfig::default(), &[]).unwrap();
        assert!(html.contains("No blog posts yet"));
    }

    #[test]
    fn test_render_post_escapes_metadata() {
        let renderer = TemplateRenderer::new().unwrap();
        let post = sample_post("xss", "<script>alert(1)</script>", "2024-01-05", &["rust"]);

        let html = renderer
            .render_post(&SiteConfig::default(), &post, "<p>rendered body</p>")
            .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<p>rendered body</p>"));
        assert!(html.contains("January 5, 2024"));
        assert!(html.contains(r#"<time datetime="2024-01-05T00:00:00.000Z">"#));
    }

    #[test]
    fn test_render_home_limits_recent_posts() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut config = SiteConfig::default();
        config.recent_posts = 1;
        let posts = vec![
            sample_post("first", "First post", "2024-06-01", &[]),
            sample_post("second", "Second post", "2024-01-01", &[]),
        ];

        let html = renderer.render_home(&config, &posts).unwrap();
        assert!(html.contains("Featured Projects"));
        assert!(html.contains("Homelab Infrastructure"));
        assert!(html.contains("First post"));
        assert!(!html.contains("Second post"));
        assert!(html.contains("id=\"contact\""));
    }

    #[test]
    fn test_render_project() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let project = config.project("homelab").unwrap();

        let html = renderer.render_project(&config, project).unwrap();
        assert!(html.contains("Proxmox virtualization platform"));
        assert!(html.contains("Self-Hosted"));
    }

    #[test]
    fn test_render_error() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render_error(&SiteConfig::default(), 404, "Post Not Found", "Nothing here.")
            .unwrap();
        assert!(html.contains("404"));
        assert!(html.contains("Post Not Found"));
    }
}
