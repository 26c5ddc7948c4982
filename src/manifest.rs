//! The route manifest: everything the rendering layer needs to turn the
//! derived site into pages, serialized as JSON. Each post carries its own
//! neighbours, series reading list and latest-posts list so a template never
//! has to query the collection.

use crate::ordering::Ordered;
use crate::paginate::Page;
use crate::post::Post;
use crate::series::all_series;
use chrono::NaiveDateTime;
use serde::Serialize;
use url::Url;

/// How many posts the latest-posts list under each post holds.
pub const RECENT_POSTS: usize = 4;

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub site: Site<'a>,
    pub posts: Vec<PostRoute<'a>>,
    pub pages: Vec<PageRoute<'a>>,
    pub feeds: Vec<FeedRoute<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Site<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub author: Option<&'a str>,
    pub url: &'a str,
}

/// A link to another post.
#[derive(Debug, PartialEq, Serialize)]
pub struct Link<'a> {
    pub path: &'a str,
    pub title: &'a str,
}

impl<'a> From<&'a Post> for Link<'a> {
    fn from(post: &'a Post) -> Link<'a> {
        Link {
            path: post.path(),
            title: post.display_title(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostRoute<'a> {
    pub path: &'a str,
    pub url: String,
    pub title: &'a str,
    pub date: NaiveDateTime,
    pub updated_date: Option<NaiveDateTime>,
    pub published: bool,
    pub tags: &'a [String],
    pub description: Option<&'a str>,
    pub cover_image: Option<&'a str>,
    pub github_url: Option<&'a str>,
    pub time_to_read: u32,
    pub html: &'a str,

    /// The next older post.
    pub previous: Option<Link<'a>>,

    /// The next newer post.
    pub next: Option<Link<'a>>,
    pub series: Option<SeriesRoute<'a>>,
    pub recent: Vec<Link<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SeriesRoute<'a> {
    pub name: &'a str,
    pub posts: Vec<SeriesEntry<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SeriesEntry<'a> {
    #[serde(flatten)]
    pub link: Link<'a>,

    /// True for the post whose page is being rendered.
    pub current: bool,
}

#[derive(Debug, Serialize)]
pub struct PageRoute<'a> {
    pub path: &'a str,
    pub number: usize,
    pub total: usize,
    pub posts: Vec<&'a str>,
    pub previous: Option<&'a str>,
    pub next: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct FeedRoute<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub output: &'a str,
    pub entries: usize,
}

/// Builds the manifest for a derived site.
pub fn manifest<'a>(
    site: Site<'a>,
    site_url: &Url,
    ordered: &'a Ordered,
    pages: &'a [Page<'a>],
    feeds: Vec<FeedRoute<'a>>,
) -> Manifest<'a> {
    let series = all_series(ordered.posts());

    let posts = ordered
        .iter()
        .map(|n| {
            let post = n.post;
            PostRoute {
                path: post.path(),
                url: post.url(site_url),
                title: post.display_title(),
                date: post.date,
                updated_date: post.updated_date,
                published: post.is_published(),
                tags: &post.tags,
                description: post.summary(),
                cover_image: post.cover_image.as_deref(),
                github_url: post.github_url.as_deref(),
                time_to_read: post.time_to_read,
                html: &post.html,
                previous: n.previous.map(Link::from),
                next: n.next.map(Link::from),
                series: post.series.as_deref().and_then(|name| {
                    let members = series.get(name)?;
                    Some(SeriesRoute {
                        name,
                        posts: members
                            .iter()
                            .map(|member| SeriesEntry {
                                link: Link::from(*member),
                                current: member.path() == post.path(),
                            })
                            .collect(),
                    })
                }),
                recent: ordered
                    .recent(post.path(), RECENT_POSTS)
                    .map(Link::from)
                    .collect(),
            }
        })
        .collect();

    let pages = pages
        .iter()
        .map(|page| PageRoute {
            path: &page.path,
            number: page.number,
            total: pages.len(),
            posts: page.posts.iter().map(|p| p.path()).collect(),
            previous: page.previous_page_path.as_deref(),
            next: page.next_page_path.as_deref(),
        })
        .collect();

    Manifest {
        site,
        posts,
        pages,
        feeds,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::paginate::{paginate, DEFAULT_INDEX_PATH};
    use crate::post::fixture::raw;
    use std::num::NonZeroUsize;

    fn ordered() -> Ordered {
        let mut posts = Vec::new();
        for (title, date, series) in [
            ("intro", "2021-01-01", Some("corda")),
            ("middle", "2021-01-02", None),
            ("flows", "2021-01-03", Some("corda")),
            ("latest", "2021-01-04", None),
        ] {
            let mut raw = raw(title, date);
            raw.series = series.map(str::to_owned);
            posts.push(Post::new(raw, format!("/{}", title)));
        }
        Ordered::new(posts)
    }

    #[test]
    fn test_manifest() {
        let ordered = ordered();
        let pages = paginate(&ordered, NonZeroUsize::new(3).unwrap(), DEFAULT_INDEX_PATH);
        let site_url = Url::parse("https://example.org").unwrap();
        let manifest = manifest(
            Site {
                title: "Example",
                description: "",
                author: None,
                url: site_url.as_str(),
            },
            &site_url,
            &ordered,
            &pages,
            Vec::new(),
        );

        let flows = manifest.posts.iter().find(|p| p.path == "/flows").unwrap();
        assert_eq!("https://example.org/flows", flows.url);
        assert_eq!(Some(Link { path: "/middle", title: "middle" }), flows.previous);
        assert_eq!(Some(Link { path: "/latest", title: "latest" }), flows.next);

        let series = flows.series.as_ref().unwrap();
        assert_eq!("corda", series.name);
        let entries: Vec<(&str, bool)> = series
            .posts
            .iter()
            .map(|e| (e.link.path, e.current))
            .collect();
        assert_eq!(vec![("/intro", false), ("/flows", true)], entries);

        let recent: Vec<&str> = flows.recent.iter().map(|l| l.path).collect();
        assert_eq!(vec!["/latest", "/middle", "/intro"], recent);

        let middle = manifest.posts.iter().find(|p| p.path == "/middle").unwrap();
        assert!(middle.series.is_none());

        assert_eq!(2, manifest.pages.len());
        assert_eq!(vec!["/latest", "/flows", "/middle"], manifest.pages[0].posts);
        assert_eq!(Some("/blog/2"), manifest.pages[0].next);
        assert_eq!(2, manifest.pages[1].total);
    }

    #[test]
    fn test_manifest_serializes() -> serde_json::Result<()> {
        let ordered = ordered();
        let site_url = Url::parse("https://example.org").unwrap();
        let manifest = manifest(
            Site {
                title: "Example",
                description: "",
                author: None,
                url: site_url.as_str(),
            },
            &site_url,
            &ordered,
            &[],
            Vec::new(),
        );
        let json = serde_json::to_value(&manifest)?;
        assert_eq!("/latest", json["posts"][0]["path"]);
        assert_eq!(serde_json::Value::Null, json["posts"][0]["next"]);
        assert_eq!("/flows", json["posts"][0]["previous"]["path"]);
        assert_eq!("/intro", json["posts"][1]["series"]["posts"][0]["path"]);
        assert_eq!(true, json["posts"][1]["series"]["posts"][1]["current"]);
        Ok(())
    }
}
