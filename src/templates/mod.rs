//! Built-in site templates using Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is off: the view
//! structs below are the escaping boundary, so every text field is escaped
//! when the view is built and rich text arrives as ready HTML.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::PostSummary;
use crate::detail::{DetailState, PostView};
use crate::helpers::{html_escape, listing_path, post_path, DateFormatter};
use crate::i18n::I18n;
use crate::listing::ListingSession;

/// Embedded stylesheet served at `/assets/style.css`
pub const STYLESHEET: &str = include_str!("site/style.css");

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
    translations: std::collections::HashMap<String, String>,
    dates: DateFormatter,
    placeholder: String,
    comments: Option<CommentsView>,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig, i18n: &I18n) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("loading.html", include_str!("site/loading.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/preview.html",
                include_str!("site/partials/preview.html"),
            ),
        ])?;

        let comments = config.comments.repo.as_ref().map(|repo| CommentsView {
            repo: html_escape(repo),
            issue_term: html_escape(&config.comments.issue_term),
            theme: html_escape(&config.comments.theme),
        });

        Ok(Self {
            tera,
            site: SiteData {
                title: html_escape(&config.title),
                description: html_escape(&config.description),
                language: html_escape(&config.language),
            },
            translations: i18n
                .get_all_translations()
                .into_iter()
                .map(|(k, v)| (k, html_escape(&v)))
                .collect(),
            dates: DateFormatter::from_config(config),
            placeholder: config.date_placeholder.clone(),
            comments,
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    fn base_context(&self, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("t", &self.translations);
        context.insert("preview", &preview);
        context
    }

    /// Render the listing page for the posts accumulated in `session`
    pub fn render_listing(&self, session: &ListingSession, preview: bool) -> Result<String> {
        let mut context = self.base_context(preview);
        context.insert("listing", &self.listing_view(session));
        self.render("index.html", &context)
    }

    /// Render a post route in any of its states
    pub fn render_detail(&self, state: &DetailState) -> Result<String> {
        match state {
            DetailState::Loading => self.render("loading.html", &self.base_context(false)),
            DetailState::NotFound => self.render_not_found(),
            DetailState::Ready(view) => {
                let mut context = self.base_context(view.preview);
                context.insert("post", &self.post_view(view));
                context.insert("comments", &self.comments);
                self.render("post.html", &context)
            }
        }
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.render("not_found.html", &self.base_context(false))
    }

    pub fn summary_view(&self, summary: &PostSummary) -> SummaryView {
        let date = summary.first_publication_date.as_deref();
        SummaryView {
            path: html_escape(&post_path(&summary.uid)),
            title: html_escape(&summary.data.title),
            subtitle: html_escape(&summary.data.subtitle),
            author: html_escape(&summary.data.author),
            date: html_escape(&self.dates.format_or_placeholder(date, &self.placeholder)),
            datetime: self.dates.datetime_attr(date),
        }
    }

    pub fn listing_view(&self, session: &ListingSession) -> ListingView {
        ListingView {
            posts: session
                .posts()
                .iter()
                .map(|s| self.summary_view(s))
                .collect(),
            load_more: session
                .can_load_more()
                .then(|| listing_path(session.pages_loaded() + 1)),
            error: session.last_error().map(html_escape),
        }
    }

    pub fn post_view(&self, view: &PostView) -> PostPageView {
        let post = &view.post;
        let first = post.first_publication_date.as_deref();

        PostPageView {
            title: html_escape(&post.data.title),
            subtitle: html_escape(&post.data.subtitle),
            author: html_escape(&post.data.author),
            banner: post.data.banner.url.as_deref().map(html_escape),
            banner_alt: html_escape(post.data.banner.alt.as_deref().unwrap_or("")),
            date: html_escape(&self.dates.format_or_placeholder(first, &self.placeholder)),
            datetime: self.dates.datetime_attr(first),
            edited: self.edit_note(post.last_publication_date.as_deref()),
            reading_minutes: view.reading_time.minutes,
            sections: post
                .data
                .content
                .iter()
                .map(|section| SectionView {
                    heading: section.heading.as_deref().map(html_escape),
                    html: section.body.as_html(),
                })
                .collect(),
            prev: NavLink::from_sibling(&view.navigation.prev_post),
            next: NavLink::from_sibling(&view.navigation.next_post),
        }
    }

    /// "* editado em 25 mar 2021, às 19:25"
    fn edit_note(&self, last_publication_date: Option<&str>) -> Option<String> {
        let date = self.dates.format(last_publication_date).ok()?;
        let time = self.dates.format_time(last_publication_date).ok()?;
        let t = |key: &str| self.translations.get(key).cloned().unwrap_or_default();
        Some(format!(
            "* {} {}, {} {}",
            t("edited_at"),
            html_escape(&date),
            t("at_time"),
            html_escape(&time)
        ))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentsView {
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub posts: Vec<SummaryView>,
    /// Link that loads one more page; absent once the cursor is null
    pub load_more: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub heading: Option<String>,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub title: String,
    pub path: String,
}

impl NavLink {
    fn from_sibling(sibling: &crate::content::SiblingRef) -> Option<Self> {
        match (&sibling.uid, &sibling.title) {
            (Some(uid), Some(title)) => Some(Self {
                title: html_escape(title),
                path: html_escape(&post_path(uid)),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageView {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Option<String>,
    pub banner_alt: String,
    pub date: String,
    pub datetime: Option<String>,
    pub edited: Option<String>,
    pub reading_minutes: usize,
    pub sections: Vec<SectionView>,
    pub prev: Option<NavLink>,
    pub next: Option<NavLink>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PostPage, SummaryData};
    use crate::detail::assemble;
    use crate::test_support::sample_store;

    fn renderer(config: &SiteConfig) -> TemplateRenderer {
        TemplateRenderer::new(config, &I18n::new(&config.language)).unwrap()
    }

    fn summary(uid: &str, date: Option<&str>, title: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: date.map(str::to_string),
            data: SummaryData {
                title: title.to_string(),
                subtitle: "Pensando em sincronização".to_string(),
                author: "Danilo Vieira".to_string(),
            },
        }
    }

    #[test]
    fn test_listing_with_more_pages() {
        let r = renderer(&SiteConfig::default());
        let session = ListingSession::new(PostPage {
            next_page: Some("http://x/page2".to_string()),
            results: vec![summary(
                "como-utilizar-hooks",
                Some("2021-03-15T19:25:28+0000"),
                "Como utilizar Hooks",
            )],
        });

        let html = r.render_listing(&session, false).unwrap();
        assert!(html.contains(r#"href="/post/como-utilizar-hooks""#));
        assert!(html.contains("Como utilizar Hooks"));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains(r#"href="/?pages=2""#));
        assert!(html.contains("Carregar mais posts"));
        assert!(!html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_listing_without_cursor_hides_load_more() {
        let r = renderer(&SiteConfig::default());
        let session = ListingSession::new(PostPage {
            next_page: None,
            results: vec![summary("a", None, "<script>x</script>")],
        });

        let html = r.render_listing(&session, true).unwrap();
        assert!(!html.contains("Carregar mais posts"));
        assert!(html.contains("—"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(html.contains("/api/exit-preview"));
    }

    #[tokio::test]
    async fn test_post_page() {
        let config = SiteConfig::default();
        let r = renderer(&config);
        let state = assemble(&sample_store(), &config, "second", None)
            .await
            .unwrap();

        let html = r.render_detail(&state).unwrap();
        assert!(html.contains("<title>Second | spacetraveling</title>"));
        assert!(html.contains("<p>Lorem ipsum dolor sit amet</p>"));
        assert!(html.contains("1 min"));
        assert!(html.contains(r#"href="/post/first""#));
        assert!(html.contains(r#"href="/post/third""#));
        assert!(html.contains("Post anterior"));
        assert!(html.contains("Próximo post"));
        assert!(!html.contains("utteranc.es"));
    }

    #[tokio::test]
    async fn test_post_page_edit_note_and_comments() {
        let mut config = SiteConfig::default();
        config.comments.repo = Some("owner/blog-comments".to_string());
        let r = renderer(&config);

        let mut doc = crate::test_support::post(
            "id-a",
            "first",
            Some("2021-03-25T10:00:00+0000"),
            "First",
        );
        doc.last_publication_date = Some("2021-03-25T19:25:28+0000".to_string());
        let store = crate::store::MemoryStore::new(vec![doc]);
        let state = assemble(&store, &config, "first", None).await.unwrap();

        let html = r.render_detail(&state).unwrap();
        assert!(html.contains("* editado em 25 mar 2021, às 19:25"));
        assert!(html.contains(r#"repo="owner/blog-comments""#));
        assert!(!html.contains(r#"class="prev""#));
        assert!(!html.contains(r#"class="next""#));
    }

    #[test]
    fn test_loading_and_not_found() {
        let r = renderer(&SiteConfig::default());
        let loading = r.render_detail(&DetailState::Loading).unwrap();
        assert!(loading.contains("Carregando..."));

        let missing = r.render_detail(&DetailState::NotFound).unwrap();
        assert!(missing.contains("Página não encontrada"));
    }
}
