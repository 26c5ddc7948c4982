//! Derives the canonical path of every post. A path is the post's base name
//! (its explicit `slug`, or its slugified title) prefixed with `/`, and with
//! `/YYYY/MM/DD` in front when the post asks for its date in the URL.

use crate::post::{Post, RawPost};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Computes the path for a single post. This is a pure function of the
/// post's frontmatter, so calling it twice gives the same string.
pub fn derive_slug(post: &RawPost) -> Result<String> {
    let base_name = base_name(post)?;
    if base_name.is_empty() {
        return Err(Error::EmptySlug {
            file: post.source.clone(),
        });
    }

    let mut path = String::with_capacity(base_name.len() + 12);
    if post.include_date_in_url == Some(true) {
        path.push_str(&post.date.format("/%Y/%m/%d").to_string());
    }
    path.push('/');
    path.push_str(&base_name);
    Ok(path)
}

/// Returns the final path segment: the explicit slug verbatim, else the
/// slugified title. An explicit slug is never rewritten, so one that isn't
/// already a valid segment is an error.
pub fn base_name(post: &RawPost) -> Result<Cow<'_, str>> {
    match (&post.slug, &post.title) {
        (Some(slug), _) if slug.chars().all(is_slug_char) => Ok(Cow::Borrowed(slug.as_str())),
        (Some(slug), _) => Err(Error::InvalidSlug {
            file: post.source.clone(),
            slug: slug.clone(),
        }),
        (None, Some(title)) => Ok(Cow::Owned(slugify_title(title))),
        (None, None) => Err(Error::InvalidFrontmatter {
            file: post.source.clone(),
        }),
    }
}

/// Replaces each run of whitespace with a single `-`, drops everything
/// outside `[A-Za-z0-9-_]` and lowercases what is left.
pub fn slugify_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            slug.push(c.to_ascii_lowercase());
        }
    }
    slug
}

/// Lowercase RFC 3986 unreserved characters.
fn is_slug_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~')
}

/// Derives the path for every post, in input order. Fails on the first post
/// without a title or slug, and when two posts resolve to the same path.
pub fn assign_paths(posts: Vec<RawPost>) -> Result<Vec<Post>> {
    let mut seen: HashMap<String, PathBuf> = HashMap::with_capacity(posts.len());
    let mut out = Vec::with_capacity(posts.len());

    for raw in posts {
        let path = derive_slug(&raw)?;
        if let Some(first) = seen.get(&path) {
            return Err(Error::SlugCollision {
                path,
                first: first.clone(),
                second: raw.source.clone(),
            });
        }
        debug!(path = %path, source = %raw.source.display(), "assigned path");
        seen.insert(path.clone(), raw.source.clone());
        out.push(Post::new(raw, path));
    }

    Ok(out)
}

/// The result of a fallible path derivation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a post whose path can't be derived.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post has neither a `title` nor a `slug`.
    #[error("invalid frontmatter in `{}`: a post needs a `title` or a `slug`", .file.display())]
    InvalidFrontmatter { file: PathBuf },

    /// Returned when an explicit slug holds anything but lowercase letters,
    /// digits, `-`, `_`, `.` or `~`.
    #[error(
        "post `{}` has slug `{}`; slugs may only use `a-z`, `0-9`, `-`, `_`, `.` and `~`",
        .file.display(),
        .slug
    )]
    InvalidSlug { file: PathBuf, slug: String },

    /// Returned when a title slugifies to nothing (e.g. `"!!!"`) or the
    /// explicit slug is empty.
    #[error("post `{}` has an empty slug", .file.display())]
    EmptySlug { file: PathBuf },

    /// Returned when two posts resolve to the same path. Building both would
    /// silently overwrite one page with the other.
    #[error(
        "posts `{}` and `{}` both resolve to `{}`",
        .first.display(),
        .second.display(),
        .path
    )]
    SlugCollision {
        path: String,
        first: PathBuf,
        second: PathBuf,
    },
}
