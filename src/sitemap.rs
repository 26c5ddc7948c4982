//! Sitemap generation.
//!
//! Lists the site root, every published post and every index page for search
//! engine indexing:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/hello-world</loc>
//!     <lastmod>2021-03-05</lastmod>
//!   </url>
//! </urlset>
//! ```

use crate::ordering::Ordered;
use crate::paginate::Page;
use crate::post::absolute_url;
use std::fmt;
use url::Url;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Sitemap data structure.
#[derive(Debug, PartialEq)]
pub struct Sitemap {
    pub urls: Vec<UrlEntry>,
}

/// Single URL entry in the sitemap.
#[derive(Debug, PartialEq)]
pub struct UrlEntry {
    /// Full URL location.
    pub loc: String,

    /// Last modification date, `YYYY-MM-DD`.
    pub lastmod: Option<String>,
}

impl Sitemap {
    /// Collects the site root, the published posts of `ordered` and the
    /// index `pages`. Index pages and the root take the date of their newest
    /// post.
    pub fn new(ordered: &Ordered, pages: &[Page], site_url: &Url) -> Sitemap {
        let newest = ordered
            .published()
            .map(|p| p.last_modified())
            .max()
            .map(|d| d.format("%Y-%m-%d").to_string());

        let mut urls = vec![UrlEntry {
            loc: site_url.to_string(),
            lastmod: newest,
        }];
        urls.extend(ordered.published().map(|post| UrlEntry {
            loc: post.url(site_url),
            lastmod: Some(post.last_modified().format("%Y-%m-%d").to_string()),
        }));
        urls.extend(pages.iter().map(|page| UrlEntry {
            loc: absolute_url(site_url, &page.path),
            lastmod: page
                .posts
                .iter()
                .map(|p| p.last_modified())
                .max()
                .map(|d| d.format("%Y-%m-%d").to_string()),
        }));
        Sitemap { urls }
    }

    /// Generates the sitemap XML document.
    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Sitemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(f, r#"<urlset xmlns="{}">"#, SITEMAP_NS)?;
        for entry in &self.urls {
            writeln!(f, "  <url>")?;
            writeln!(f, "    <loc>{}</loc>", Escaped(&entry.loc))?;
            if let Some(lastmod) = &entry.lastmod {
                writeln!(f, "    <lastmod>{}</lastmod>", lastmod)?;
            }
            writeln!(f, "  </url>")?;
        }
        writeln!(f, "</urlset>")
    }
}

/// Writes its text with the five XML special characters escaped.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(i) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..i])?;
            f.write_str(match rest.as_bytes()[i] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&apos;",
            })?;
            rest = &rest[i + 1..];
        }
        f.write_str(rest)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::paginate::{paginate, DEFAULT_INDEX_PATH};
    use crate::post::fixture::post;
    use crate::post::{parse_date, Post};
    use std::num::NonZeroUsize;

    #[test]
    fn test_sitemap() {
        let mut updated = post("updated", "2021-01-01").into_raw();
        updated.updated_date = parse_date("2021-06-01");
        let mut draft = post("draft", "2021-09-09").into_raw();
        draft.published = None;

        let ordered = Ordered::new(vec![
            post("a&b", "2021-02-01"),
            Post::new(updated, "/updated".to_owned()),
            Post::new(draft, "/draft".to_owned()),
        ]);
        let pages = paginate(&ordered, NonZeroUsize::new(10).unwrap(), DEFAULT_INDEX_PATH);
        let site_url = Url::parse("https://example.org").unwrap();
        let sitemap = Sitemap::new(&ordered, &pages, &site_url);

        let locs: Vec<&str> = sitemap.urls.iter().map(|u| u.loc.as_str()).collect();
        assert_eq!(
            vec![
                "https://example.org/",
                "https://example.org/a&b",
                "https://example.org/updated",
                "https://example.org/blog",
            ],
            locs
        );
        assert_eq!(Some("2021-06-01"), sitemap.urls[0].lastmod.as_deref());
        assert_eq!(Some("2021-06-01"), sitemap.urls[2].lastmod.as_deref());
        assert_eq!(Some("2021-06-01"), sitemap.urls[3].lastmod.as_deref());

        let xml = sitemap.to_xml();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<loc>https://example.org/a&amp;b</loc>"));
        assert!(!xml.contains("draft"));
        assert_eq!(4, xml.matches("<url>").count());
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn test_escaped() {
        assert_eq!(
            "a&amp;b&lt;c&gt;&quot;d&apos;",
            Escaped("a&b<c>\"d'").to_string()
        );
        assert_eq!("plain", Escaped("plain").to_string());
    }
}
