//! Splits the published posts into fixed-size index pages. The first page
//! lives at the index base path (e.g. `/blog`); page `n` for `n > 1` lives at
//! `{base}/{n}`.

use crate::ordering::Ordered;
use crate::post::Post;
use std::num::NonZeroUsize;
use tracing::debug;

/// The default index base path.
pub const DEFAULT_INDEX_PATH: &str = "/blog";

/// One index page.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<'a> {
    /// The site-relative path of the page.
    pub path: String,

    /// The 1-based page number.
    pub number: usize,

    /// The posts on this page, newest first.
    pub posts: Vec<&'a Post>,

    /// The path of the page holding newer posts, if any.
    pub previous_page_path: Option<String>,

    /// The path of the page holding older posts, if any.
    pub next_page_path: Option<String>,
}

/// Paginates the published posts of `ordered`, `page_size` per page. No
/// published posts means no pages at all, rather than one empty page.
pub fn paginate<'a>(
    ordered: &'a Ordered,
    page_size: NonZeroUsize,
    base_path: &str,
) -> Vec<Page<'a>> {
    let published: Vec<&Post> = ordered.published().collect();
    let page_size = page_size.get();
    let total_pages = match published.len() % page_size {
        0 => published.len() / page_size,
        _ => published.len() / page_size + 1,
    };

    published
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| {
            let page = Page {
                path: page_path(base_path, i),
                number: i + 1,
                posts: chunk.to_vec(),
                previous_page_path: match i {
                    0 => None,
                    _ => Some(page_path(base_path, i - 1)),
                },
                next_page_path: match i < total_pages - 1 {
                    false => None,
                    true => Some(page_path(base_path, i + 1)),
                },
            };
            debug!(path = %page.path, posts = page.posts.len(), "paginated");
            page
        })
        .collect()
}

/// Returns the path of the 0-based page `index` under `base_path`.
pub fn page_path(base_path: &str, index: usize) -> String {
    match index {
        0 => base_path.to_owned(),
        _ => format!("{}/{}", base_path.trim_end_matches('/'), index + 1),
    }
}
