//! Defines the [`Parser`] and [`Error`] types, which load [`RawPost`]s from
//! markdown source files on disk.

use crate::markdown;
use crate::post::{parse_date, RawPost};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`RawPost`] objects from a content directory.
pub struct Parser<'a> {
    /// The directory searched (recursively) for `.md` files.
    content_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser over `content_directory`.
    pub fn new(content_directory: &'a Path) -> Parser<'a> {
        Parser { content_directory }
    }

    /// Searches the content directory for post files (extension = `.md`) and
    /// returns one [`RawPost`] per file, ordered by file path. Each post file
    /// must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with `date`, `title` and/or `slug`, and any of the
    ///    optional fields
    /// 3. Terminal frontmatter fence (`---`) on its own line
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// published: true
    /// tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self) -> Result<Vec<RawPost>> {
        let mut posts = Vec::new();
        let walker =
            WalkDir::new(self.content_directory).sort_by(|a, b| a.file_name().cmp(b.file_name()));
        for result in walker {
            let entry = result?;
            if entry.file_type().is_file()
                && entry.path().extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
            {
                posts.push(self.parse_post(entry.path())?);
            }
        }
        info!(
            directory = %self.content_directory.display(),
            posts = posts.len(),
            "loaded posts"
        );
        Ok(posts)
    }

    /// Parses a single post file, annotating any error with its path.
    pub fn parse_post(&self, path: &Path) -> Result<RawPost> {
        let input = fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_owned(),
            source: e,
        })?;
        parse_str(path, &input).map_err(|e| Error::Annotated {
            path: path.to_owned(),
            source: Box::new(e),
        })
    }
}

/// Parses a post from its file contents. `source` is recorded on the post
/// and used only for error messages.
pub fn parse_str(source: &Path, input: &str) -> Result<RawPost> {
    let (frontmatter, body) = split_frontmatter(input)?;
    let frontmatter: Frontmatter = serde_yaml::from_str(frontmatter)?;

    let date = required_date(&frontmatter.date)?;
    let updated_date = match &frontmatter.updated_date {
        Some(updated) => Some(required_date(updated)?),
        None => None,
    };

    let text = markdown::plain_text(body);
    let excerpt = markdown::excerpt(&text, markdown::EXCERPT_LENGTH);
    debug!(source = %source.display(), "parsed post");

    Ok(RawPost {
        source: source.to_owned(),
        title: frontmatter.title,
        slug: frontmatter.slug,
        date,
        updated_date,
        include_date_in_url: frontmatter.include_date_in_url,
        published: frontmatter.published,
        tags: frontmatter.tags.unwrap_or_default(),
        series: frontmatter.series,
        description: frontmatter.description,
        excerpt: match excerpt.is_empty() {
            true => None,
            false => Some(excerpt),
        },
        cover_image: frontmatter.cover_image,
        github_url: frontmatter.github_url,
        html: markdown::to_html(body),
        time_to_read: markdown::time_to_read(&text),
    })
}

fn required_date(input: &str) -> Result<NaiveDateTime> {
    parse_date(input).ok_or_else(|| Error::InvalidDate(input.to_owned()))
}

/// Splits a source file into its YAML frontmatter and its markdown body.
fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    const FENCE: &str = "---";
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let rest = match input.strip_prefix(FENCE) {
        Some(rest) => rest,
        None => return Err(Error::FrontmatterMissingStartFence),
    };

    // The closing fence must start a line; `---` inside a YAML value doesn't
    // count.
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if offset > 0 && line.trim_end() == FENCE {
            let body = &rest[offset + line.len()..];
            return Ok((&rest[..offset], body));
        }
        offset += line.len();
    }
    Err(Error::FrontmatterMissingEndFence)
}

#[derive(Deserialize)]
struct Frontmatter {
    title: Option<String>,
    slug: Option<String>,
    date: String,
    updated_date: Option<String>,
    include_date_in_url: Option<bool>,
    published: Option<bool>,
    tags: Option<Vec<String>>,
    series: Option<String>,
    description: Option<String>,
    cover_image: Option<String>,
    github_url: Option<String>,
}

/// Represents the result of a [`RawPost`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`RawPost`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("post must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when a `date` or `updated_date` isn't a recognized date.
    #[error("invalid date `{0}`")]
    InvalidDate(String),

    /// Returned when a source file can't be read.
    #[error("reading `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Returned for errors walking the content directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with the path of the post it came from.
    #[error("parsing post `{}`: {source}", .path.display())]
    Annotated { path: PathBuf, source: Box<Error> },
}
