//! Defines the [`RawPost`] and [`Post`] types. A [`RawPost`] is exactly what
//! the [`crate::parser`] loaded from a source file; a [`Post`] is a
//! [`RawPost`] whose canonical path has been derived by [`crate::slug`].
//! Neither type is mutated once built: every later stage of the pipeline
//! borrows posts and produces new values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::ops::Deref;
use std::path::PathBuf;
use url::Url;

/// A post as loaded from disk, before a path has been assigned. Optional
/// frontmatter fields stay optional here; defaults are applied by the
/// accessors and the pipeline stages that consume them.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPost {
    /// The file the post was loaded from. Used to annotate errors.
    pub source: PathBuf,

    /// The post title. Only optional when `slug` is set.
    pub title: Option<String>,

    /// An explicit override for the final path segment.
    pub slug: Option<String>,

    /// The publication date. Drives every ordering in the pipeline.
    pub date: NaiveDateTime,

    /// The date the post was last revised, if any.
    pub updated_date: Option<NaiveDateTime>,

    /// When `Some(true)`, the path is prefixed with `/YYYY/MM/DD`.
    pub include_date_in_url: Option<bool>,

    /// Only posts with `Some(true)` are listed, paginated, grouped into series
    /// or syndicated. Unpublished posts still get a path.
    pub published: Option<bool>,

    /// Tags in frontmatter order.
    pub tags: Vec<String>,

    /// The name of the series this post belongs to, if any.
    pub series: Option<String>,

    /// A hand-written summary. Preferred over `excerpt`.
    pub description: Option<String>,

    /// A summary derived from the body.
    pub excerpt: Option<String>,

    pub cover_image: Option<String>,

    pub github_url: Option<String>,

    /// The rendered HTML body.
    pub html: String,

    /// Estimated reading time in minutes.
    pub time_to_read: u32,
}

impl RawPost {
    /// Returns true only when the frontmatter explicitly says `published:
    /// true`.
    pub fn is_published(&self) -> bool {
        self.published == Some(true)
    }

    /// Returns the description, falling back to the excerpt.
    pub fn summary(&self) -> Option<&str> {
        self.description.as_deref().or(self.excerpt.as_deref())
    }

    /// Returns true if the post is part of the series `name`.
    pub fn in_series(&self, name: &str) -> bool {
        self.series.as_deref() == Some(name)
    }

    /// The date the post last changed: the updated date if there is one,
    /// otherwise the publication date.
    pub fn last_modified(&self) -> NaiveDateTime {
        self.updated_date.unwrap_or(self.date)
    }
}

/// A [`RawPost`] together with its derived path. Built only by
/// [`crate::slug::assign_paths`], so every [`Post`] holds a valid path.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    raw: RawPost,
    path: String,
}

impl Post {
    pub(crate) fn new(raw: RawPost, path: String) -> Post {
        Post { raw, path }
    }

    /// The site-relative path, e.g. `/2021/03/05/hello-world`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The absolute URL of the post: the site URL without its trailing slash
    /// followed by [`Post::path`].
    pub fn url(&self, site_url: &Url) -> String {
        absolute_url(site_url, &self.path)
    }

    /// The title to show in listings. Posts identified only by a slug fall
    /// back to their path.
    pub fn display_title(&self) -> &str {
        self.raw.title.as_deref().unwrap_or(&self.path)
    }

    pub fn into_raw(self) -> RawPost {
        self.raw
    }
}

impl Deref for Post {
    type Target = RawPost;

    fn deref(&self) -> &RawPost {
        &self.raw
    }
}

/// Joins a site-relative path onto the site URL by plain concatenation, so
/// `https://example.org/` and `/foo` give `https://example.org/foo`.
pub fn absolute_url(site_url: &Url, path: &str) -> String {
    format!("{}{}", site_url.as_str().trim_end_matches('/'), path)
}

/// Parses a frontmatter date. Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`
/// (with an optional fractional part) and RFC 3339 timestamps, which are
/// normalized to UTC. Returns `None` for anything else.
pub fn parse_date(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(date_time) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date_time);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(input) {
        return Some(date_time.naive_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}


#[cfg(test)]
mod test {
    use super::fixture::*;
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let midnight = NaiveDate::from_ymd_opt(2021, 3, 5)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        assert_eq!(Some(midnight), parse_date("2021-03-05"));
        assert_eq!(Some(midnight), parse_date(" 2021-03-05T00:00:00 "));
        assert_eq!(Some(midnight), parse_date("2021-03-05T01:00:00+01:00"));
        assert_eq!(Some(midnight), parse_date("2021-03-05T00:00:00.000Z"));
        assert_eq!(None, parse_date("March 5, 2021"));
        assert_eq!(None, parse_date("2021-02-30"));
    }

    #[test]
    fn test_summary_prefers_description() {
        let mut post = raw("a", "2021-01-01");
        assert_eq!(None, post.summary());
        post.excerpt = Some("excerpt".to_owned());
        assert_eq!(Some("excerpt"), post.summary());
        post.description = Some("description".to_owned());
        assert_eq!(Some("description"), post.summary());
    }

    #[test]
    fn test_published_requires_explicit_true() {
        let mut post = raw("a", "2021-01-01");
        assert!(post.is_published());
        post.published = None;
        assert!(!post.is_published());
        post.published = Some(false);
        assert!(!post.is_published());
    }

    #[test]
    fn test_url_strips_trailing_slash() -> Result<(), url::ParseError> {
        let post = post("hello", "2021-01-01");
        assert_eq!(
            "https://example.org/hello",
            post.url(&Url::parse("https://example.org/")?)
        );
        assert_eq!(
            "https://example.org/blog/hello",
            post.url(&Url::parse("https://example.org/blog/")?)
        );
        Ok(())
    }

    #[test]
    fn test_display_title_falls_back_to_path() {
        let mut raw = raw("a", "2021-01-01");
        raw.title = None;
        let post = Post::new(raw, "/explicit".to_owned());
        assert_eq!("/explicit", post.display_title());
    }
}
