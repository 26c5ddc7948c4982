//! Groups posts into named series. A series reads start to end, so unlike
//! every other listing it is ordered oldest first.

use crate::ordering::oldest_first;
use crate::post::Post;
use std::collections::BTreeMap;

/// Returns the published posts of the series `name`, oldest first. `None`
/// means the post isn't part of any series and yields nothing.
pub fn group_series<'a>(posts: &'a [Post], name: Option<&str>) -> Vec<&'a Post> {
    let name = match name {
        Some(name) => name,
        None => return Vec::new(),
    };
    let mut series: Vec<&Post> = posts
        .iter()
        .filter(|p| p.is_published() && p.in_series(name))
        .collect();
    series.sort_by(|a, b| oldest_first(a, b));
    series
}

/// Groups every series found in `posts` at once, keyed by series name. Only
/// series with at least one published post appear.
pub fn all_series(posts: &[Post]) -> BTreeMap<&str, Vec<&Post>> {
    let mut groups: BTreeMap<&str, Vec<&Post>> = BTreeMap::new();
    for post in posts.iter().filter(|p| p.is_published()) {
        if let Some(name) = post.series.as_deref() {
            groups.entry(name).or_default().push(post);
        }
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| oldest_first(a, b));
    }
    groups
}
