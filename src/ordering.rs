//! Orders posts by date and answers previous/next questions about them.
//! Adjacency is never stored on the posts themselves: [`Ordered`] owns one
//! sorted, immutable vector and [`Neighbors`] borrows from it.

use crate::post::Post;
use std::cmp::Ordering;

/// Posts sorted newest first. See [`newest_first`] for the exact order.
#[derive(Clone, Debug, Default)]
pub struct Ordered {
    posts: Vec<Post>,
}

/// A post together with the posts on either side of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbors<'a> {
    pub post: &'a Post,

    /// The next older post, or `None` for the oldest post.
    pub previous: Option<&'a Post>,

    /// The next newer post, or `None` for the newest post.
    pub next: Option<&'a Post>,
}

impl Ordered {
    /// Sorts `posts` newest first. Published and unpublished posts are
    /// ordered together, so drafts reachable by path still link to their
    /// neighbours.
    pub fn new(mut posts: Vec<Post>) -> Ordered {
        posts.sort_by(newest_first);
        Ordered { posts }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Returns the post at `index` and its neighbours: `previous` is
    /// `posts[index + 1]` and `next` is `posts[index - 1]`.
    pub fn neighbors(&self, index: usize) -> Option<Neighbors<'_>> {
        let post = self.posts.get(index)?;
        Some(Neighbors {
            post,
            previous: self.posts.get(index + 1),
            next: match index {
                0 => None,
                _ => self.posts.get(index - 1),
            },
        })
    }

    /// Iterates every post in order together with its neighbours.
    pub fn iter(&self) -> impl Iterator<Item = Neighbors<'_>> + '_ {
        (0..self.posts.len()).filter_map(move |i| self.neighbors(i))
    }

    /// Iterates the published posts, newest first.
    pub fn published(&self) -> impl Iterator<Item = &Post> + '_ {
        self.posts.iter().filter(|p| p.is_published())
    }

    /// Returns up to `limit` of the newest published posts, skipping the
    /// post at `except`. Used for the "latest posts" list under each post.
    pub fn recent<'a>(
        &'a self,
        except: &'a str,
        limit: usize,
    ) -> impl Iterator<Item = &'a Post> + 'a {
        self.published().filter(move |p| p.path() != except).take(limit)
    }
}

/// Orders by date descending. Posts on the same date are ordered by title,
/// then by path, so the result never depends on load order.
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.display_title().cmp(b.display_title()))
        .then_with(|| a.path().cmp(b.path()))
}

/// Orders by date ascending, with the same tie-break as [`newest_first`].
pub fn oldest_first(a: &Post, b: &Post) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.display_title().cmp(b.display_title()))
        .then_with(|| a.path().cmp(b.path()))
}
