//! Support for creating RSS feeds from a list of posts. A site can publish
//! several feeds; each is described by a [`FeedDefinition`] and serialized
//! independently by [`serialize_feed`].

use crate::ordering::newest_first;
use crate::post::Post;
use chrono::{NaiveDateTime, TimeZone, Utc};
use rss::validation::Validate;
use rss::{CategoryBuilder, Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Write;
use url::Url;

/// The most entries a single feed will carry.
pub const MAX_FEED_ENTRIES: usize = 1000;

/// Describes one feed: where it is written and which posts it carries.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FeedDefinition {
    /// A unique name, e.g. `all` or `jvm`.
    pub name: String,

    /// The channel title. Defaults to the site title.
    #[serde(default)]
    pub title: Option<String>,

    /// The site-relative output path, e.g. `/rss/all.xml`.
    pub output: String,

    /// Only posts carrying at least one of these tags are included. An empty
    /// set includes every published post.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl FeedDefinition {
    /// The unfiltered feed every site gets when none are configured.
    pub fn all() -> FeedDefinition {
        FeedDefinition {
            name: "all".to_owned(),
            title: None,
            output: "/rss/all.xml".to_owned(),
            tags: BTreeSet::new(),
        }
    }

    /// Returns true if `post` passes this feed's tag filter.
    pub fn matches(&self, post: &Post) -> bool {
        self.tags.is_empty() || post.tags.iter().any(|tag| self.tags.contains(tag))
    }
}

/// One item of a serialized feed.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub date: NaiveDateTime,

    /// The post description, falling back to its excerpt.
    pub description: Option<String>,

    /// The absolute URL of the post.
    pub url: String,

    /// Always identical to `url`.
    pub guid: String,

    /// The rendered HTML of the post, carried as `content:encoded`.
    pub content_encoded: String,

    pub categories: Vec<String>,
}

impl FeedEntry {
    fn new(post: &Post, site_url: &Url) -> FeedEntry {
        let url = post.url(site_url);
        FeedEntry {
            title: post.display_title().to_owned(),
            date: post.date,
            description: post.summary().map(str::to_owned),
            guid: url.clone(),
            url,
            content_encoded: post.html.clone(),
            categories: post.tags.clone(),
        }
    }
}

/// Selects the published posts matching `definition`, newest first, capped at
/// [`MAX_FEED_ENTRIES`], and maps them to [`FeedEntry`]s.
pub fn serialize_feed(
    posts: &[Post],
    definition: &FeedDefinition,
    site_url: &Url,
) -> Vec<FeedEntry> {
    let mut selected: Vec<&Post> = posts
        .iter()
        .filter(|p| p.is_published() && definition.matches(p))
        .collect();
    selected.sort_by(|a, b| newest_first(a, b));
    selected
        .into_iter()
        .take(MAX_FEED_ENTRIES)
        .map(|p| FeedEntry::new(p, site_url))
        .collect()
}

/// Bundled channel-level configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub site_url: &'a Url,
}

/// Creates an RSS channel from some configuration ([`FeedConfig`]) and a list
/// of [`FeedEntry`]s, validates it and writes the result to a
/// [`std::io::Write`].
pub fn write_feed<W: Write>(config: &FeedConfig, entries: &[FeedEntry], w: W) -> Result<W> {
    let channel = feed(config, entries);
    channel
        .validate()
        .map_err(|e| Error::Validation(e.to_string()))?;
    Ok(channel.write_to(w)?)
}

/// Renders a feed to an in-memory XML document.
pub fn render_feed(config: &FeedConfig, entries: &[FeedEntry]) -> Result<Vec<u8>> {
    write_feed(config, entries, Vec::new())
}

fn feed(config: &FeedConfig, entries: &[FeedEntry]) -> Channel {
    ChannelBuilder::default()
        .title(config.title.to_owned())
        .link(config.site_url.to_string())
        .description(config.description.to_owned())
        .generator(Some(concat!("scriven ", env!("CARGO_PKG_VERSION")).to_owned()))
        // Taken from the entries, never the clock: output is reproducible.
        .last_build_date(entries.iter().map(|e| e.date).max().map(rfc2822))
        .items(entries.iter().map(item).collect::<Vec<Item>>())
        .build()
}

fn item(entry: &FeedEntry) -> Item {
    ItemBuilder::default()
        .title(Some(entry.title.clone()))
        .link(Some(entry.url.clone()))
        .guid(Some(
            GuidBuilder::default()
                .permalink(true)
                .value(entry.guid.clone())
                .build(),
        ))
        .description(entry.description.clone())
        .pub_date(Some(rfc2822(entry.date)))
        .content(Some(entry.content_encoded.clone()))
        .categories(
            entry
                .categories
                .iter()
                .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
                .collect::<Vec<_>>(),
        )
        .build()
}

// Post dates carry no timezone; they are published as UTC.
fn rfc2822(date: NaiveDateTime) -> String {
    Utc.from_utc_datetime(&date).to_rfc2822()
}

/// The result of a fallible feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the channel fails RSS validation.
    #[error("validating feed: {0}")]
    Validation(String),

    /// Returned when the channel can't be written as XML.
    #[error("writing feed: {0}")]
    Rss(#[from] rss::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::fixture::raw;

    fn tagged(title: &str, date: &str, tags: &[&str], published: bool) -> Post {
        let mut raw = raw(title, date);
        raw.tags = tags.iter().map(|t| t.to_string()).collect();
        raw.published = Some(published);
        raw.excerpt = Some(format!("about {}", title));
        Post::new(raw, format!("/{}", title))
    }

    fn posts() -> Vec<Post> {
        vec![
            tagged("spring-boot", "2021-01-03", &["java", "spring"], true),
            tagged("corda-flows", "2021-01-04", &["corda", "kotlin"], true),
            tagged("rust-intro", "2021-01-05", &["rust"], true),
            tagged("kotlin-draft", "2021-01-06", &["kotlin"], false),
            tagged("untagged", "2021-01-01", &[], true),
        ]
    }

    fn site_url() -> Url {
        Url::parse("https://example.org").unwrap()
    }

    fn jvm() -> FeedDefinition {
        FeedDefinition {
            name: "jvm".to_owned(),
            title: Some("JVM posts".to_owned()),
            output: "/rss/jvm.xml".to_owned(),
            tags: ["java", "spring", "kotlin"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }

    #[test]
    fn test_unfiltered_feed() {
        let entries = serialize_feed(&posts(), &FeedDefinition::all(), &site_url());
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            vec!["rust-intro", "corda-flows", "spring-boot", "untagged"],
            titles
        );
    }

    #[test]
    fn test_tag_filter_excludes_disjoint_posts() {
        let entries = serialize_feed(&posts(), &jvm(), &site_url());
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(vec!["corda-flows", "spring-boot"], titles);
    }

    #[test]
    fn test_entry_fields() {
        let mut posts = posts();
        let mut raw = posts.remove(0).into_raw();
        raw.description = Some("hand written".to_owned());
        posts.push(Post::new(raw, "/spring-boot".to_owned()));

        let entries = serialize_feed(&posts, &jvm(), &site_url());
        let spring = entries.iter().find(|e| e.title == "spring-boot").unwrap();
        assert_eq!("https://example.org/spring-boot", spring.url);
        assert_eq!(spring.url, spring.guid);
        assert_eq!(Some("hand written"), spring.description.as_deref());
        assert_eq!("<p>spring-boot</p>", spring.content_encoded);
        assert_eq!(vec!["java", "spring"], spring.categories);

        let corda = entries.iter().find(|e| e.title == "corda-flows").unwrap();
        assert_eq!(Some("about corda-flows"), corda.description.as_deref());
    }

    #[test]
    fn test_urls_are_unique() {
        let entries = serialize_feed(&posts(), &FeedDefinition::all(), &site_url());
        let urls: BTreeSet<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(entries.len(), urls.len());
    }

    #[test]
    fn test_feed_is_capped() {
        let posts: Vec<Post> = (0..MAX_FEED_ENTRIES + 5)
            .map(|i| tagged(&format!("post-{}", i), "2021-01-01", &[], true))
            .collect();
        let entries = serialize_feed(&posts, &FeedDefinition::all(), &site_url());
        assert_eq!(MAX_FEED_ENTRIES, entries.len());
    }

    #[test]
    fn test_render_feed() -> Result<()> {
        let site_url = site_url();
        let entries = serialize_feed(&posts(), &jvm(), &site_url);
        let xml = render_feed(
            &FeedConfig {
                title: "JVM posts",
                description: "Posts about the JVM",
                site_url: &site_url,
            },
            &entries,
        )?;
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("<title>JVM posts</title>"));
        assert!(xml.contains("<link>https://example.org/corda-flows</link>"));
        assert!(xml.contains(">https://example.org/corda-flows</guid>"));
        assert!(xml.contains("content:encoded"));
        assert!(xml.contains("<category>kotlin</category>"));
        assert!(xml.contains("4 Jan 2021 00:00:00 +0000"));
        assert!(!xml.contains("rust-intro"));
        Ok(())
    }

    #[test]
    fn test_render_empty_feed() -> Result<()> {
        let site_url = site_url();
        let xml = render_feed(
            &FeedConfig {
                title: "Nothing",
                description: "",
                site_url: &site_url,
            },
            &[],
        )?;
        assert!(String::from_utf8(xml).unwrap().contains("<channel>"));
        Ok(())
    }
}
