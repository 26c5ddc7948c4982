//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the site: parsing the posts ([`crate::parser`]),
//! deriving their paths ([`crate::slug`]), ordering ([`crate::ordering`]),
//! paginating ([`crate::paginate`]), serializing each feed
//! ([`crate::feed`]), the sitemap ([`crate::sitemap`]) and the route
//! manifest ([`crate::manifest`]).
//!
//! Every artifact is rendered in memory before anything is written, so a
//! build that fails to parse, derive or render leaves the output directory
//! untouched. Files are then written one at a time: an I/O error while
//! writing stops the build and reports the file, but whatever was written
//! before it stays on disk.

use crate::config::Config;
use crate::feed::{self, serialize_feed, FeedConfig};
use crate::manifest::{self, FeedRoute, Site};
use crate::ordering::Ordered;
use crate::paginate::paginate;
use crate::parser::{self, Parser};
use crate::post::RawPost;
use crate::sitemap::Sitemap;
use crate::slug::{self, assign_paths};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The manifest file name, relative to the output directory.
pub const MANIFEST_FILE: &str = "routes.json";

/// The sitemap file name, relative to the output directory.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// What a build produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    /// Every post, published or not.
    pub posts: usize,
    pub published: usize,
    pub pages: usize,

    /// Entry count per feed name, in configuration order.
    pub feeds: Vec<(String, usize)>,

    /// The files written, or that would be written by [`check_site`].
    pub files: Vec<PathBuf>,
}

/// A file to write: its absolute path and its contents.
struct Artifact {
    path: PathBuf,
    contents: Vec<u8>,
}

/// Builds the site from a [`Config`] object and writes every artifact to the
/// configured output directory.
pub fn build_site(config: &Config) -> Result<Summary> {
    let posts = Parser::new(&config.content_directory).parse_posts()?;
    let (summary, artifacts) = derive_site(config, posts)?;

    for (written, artifact) in artifacts.iter().enumerate() {
        if let Err(e) = write(&artifact.path, &artifact.contents) {
            if written > 0 {
                warn!(written, total = artifacts.len(), "output directory is incomplete");
            }
            return Err(e);
        }
    }
    info!(
        output = %config.output_directory.display(),
        files = artifacts.len(),
        "build complete"
    );
    Ok(summary)
}

/// Runs the whole pipeline like [`build_site`] but writes nothing.
pub fn check_site(config: &Config) -> Result<Summary> {
    let posts = Parser::new(&config.content_directory).parse_posts()?;
    let (summary, _) = derive_site(config, posts)?;
    Ok(summary)
}

/// The pure part of the build: everything between loading posts and writing
/// files.
fn derive_site(config: &Config, posts: Vec<RawPost>) -> Result<(Summary, Vec<Artifact>)> {
    let ordered = Ordered::new(assign_paths(posts)?);
    let pages = paginate(&ordered, config.page_size, &config.index_path);
    let published = ordered.published().count();
    info!(
        posts = ordered.len(),
        published,
        pages = pages.len(),
        "derived routes"
    );

    let mut artifacts = Vec::with_capacity(config.feeds.len() + 2);
    let mut feed_counts = Vec::with_capacity(config.feeds.len());
    let mut feed_routes = Vec::with_capacity(config.feeds.len());
    for definition in &config.feeds {
        let entries = serialize_feed(ordered.posts(), definition, &config.site_url);
        if entries.is_empty() {
            warn!(feed = %definition.name, "feed matches no published posts");
        }
        let title = definition.title.as_deref().unwrap_or(&config.title);
        let xml = feed::render_feed(
            &FeedConfig {
                title,
                description: &config.description,
                site_url: &config.site_url,
            },
            &entries,
        )
        .map_err(|e| Error::Feed {
            name: definition.name.clone(),
            source: e,
        })?;
        info!(feed = %definition.name, entries = entries.len(), "serialized feed");

        feed_counts.push((definition.name.clone(), entries.len()));
        feed_routes.push(FeedRoute {
            name: &definition.name,
            title,
            output: &definition.output,
            entries: entries.len(),
        });
        artifacts.push(Artifact {
            path: config.feed_file(definition),
            contents: xml,
        });
    }

    let sitemap = Sitemap::new(&ordered, &pages, &config.site_url);
    artifacts.push(Artifact {
        path: config.output_directory.join(SITEMAP_FILE),
        contents: sitemap.to_xml().into_bytes(),
    });

    let manifest = manifest::manifest(
        Site {
            title: &config.title,
            description: &config.description,
            author: config.author.as_deref(),
            url: config.site_url.as_str(),
        },
        &config.site_url,
        &ordered,
        &pages,
        feed_routes,
    );
    artifacts.push(Artifact {
        path: config.output_directory.join(MANIFEST_FILE),
        contents: serde_json::to_vec_pretty(&manifest)?,
    });

    let summary = Summary {
        posts: ordered.len(),
        published,
        pages: pages.len(),
        feeds: feed_counts,
        files: artifacts.iter().map(|a| a.path.clone()).collect(),
    };
    Ok((summary, artifacts))
}

fn write(path: &Path, contents: &[u8]) -> Result<()> {
    let io_error = |e| Error::Write {
        path: path.to_owned(),
        source: e,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_error)?;
    }
    fs::write(path, contents).map_err(io_error)
}

/// The result of a fallible build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can come from parsing, path
/// derivation, feed serialization, manifest serialization and writing the
/// output files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors during parsing.
    #[error(transparent)]
    Parse(#[from] parser::Error),

    /// Returned when a post's path can't be derived.
    #[error(transparent)]
    Slug(#[from] slug::Error),

    /// Returned for errors rendering a feed.
    #[error("feed `{name}`: {source}")]
    Feed { name: String, source: feed::Error },

    /// Returned when the route manifest can't be serialized.
    #[error("serializing route manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Returned for I/O problems while writing output files.
    #[error("writing `{}`: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::fixture::raw;
    use std::path::Path;
    use tempfile::TempDir;

    fn config() -> Config {
        Config::from_yaml(
            Path::new("/site"),
            "
title: Example
site_url: https://example.org
page_size: 2
feeds:
  - name: all
    output: /rss/all.xml
  - name: rust
    title: Rust posts
    output: /rss/rust.xml
    tags: [rust]
",
            Some(Path::new("/out")),
        )
        .unwrap()
    }

    #[test]
    fn test_derive_site() -> Result<()> {
        let mut rusty = raw("Rusty", "2021-01-03");
        rusty.tags = vec!["rust".to_owned()];
        let mut draft = raw("Draft", "2021-01-04");
        draft.published = None;
        let posts = vec![raw("One", "2021-01-01"), raw("Two", "2021-01-02"), rusty, draft];

        let (summary, artifacts) = derive_site(&config(), posts)?;
        assert_eq!(4, summary.posts);
        assert_eq!(3, summary.published);
        assert_eq!(2, summary.pages);
        assert_eq!(
            vec![("all".to_owned(), 3), ("rust".to_owned(), 1)],
            summary.feeds
        );

        let paths: Vec<&Path> = artifacts.iter().map(|a| a.path.as_path()).collect();
        assert_eq!(
            vec![
                Path::new("/out/rss/all.xml"),
                Path::new("/out/rss/rust.xml"),
                Path::new("/out/sitemap.xml"),
                Path::new("/out/routes.json"),
            ],
            paths
        );

        let rust_feed = String::from_utf8(artifacts[1].contents.clone()).unwrap();
        assert!(rust_feed.contains("<title>Rust posts</title>"));
        assert!(rust_feed.contains("https://example.org/rusty"));
        assert!(!rust_feed.contains("https://example.org/one"));
        Ok(())
    }

    #[test]
    fn test_derive_site_collision_aborts() {
        let mut explicit = raw("Another", "2021-01-02");
        explicit.slug = Some("one".to_owned());
        let result = derive_site(&config(), vec![raw("One", "2021-01-01"), explicit]);
        assert!(matches!(
            result,
            Err(Error::Slug(slug::Error::SlugCollision { .. }))
        ));
    }

    #[test]
    fn test_derive_site_no_posts() -> Result<()> {
        let (summary, artifacts) = derive_site(&config(), Vec::new())?;
        assert_eq!(0, summary.pages);
        assert_eq!(4, artifacts.len());
        Ok(())
    }

    #[test]
    fn test_write_errors_are_reported() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let content = dir.path().join("content/blog");
        fs::create_dir_all(&content)?;
        fs::write(
            content.join("hello.md"),
            "---\ntitle: Hello\ndate: 2021-01-01\npublished: true\n---\nhi\n",
        )?;
        // A regular file where the output directory should be.
        let output = dir.path().join("public");
        fs::write(&output, "not a directory")?;

        let config = Config::from_yaml(
            dir.path(),
            "title: Example\nsite_url: https://example.org\n",
            Some(&output),
        )?;
        match build_site(&config) {
            Err(Error::Write { path, .. }) => assert!(path.starts_with(&output)),
            other => panic!("wanted a write error; found {:?}", other),
        }
        Ok(())
    }
}
