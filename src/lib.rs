//! The library code for the `scriven` blog builder. The architecture can be
//! generally broken down into two distinct steps:
//!
//! 1. Loading posts from markdown source files on disk ([`crate::parser`])
//! 2. Deriving everything the rendering layer needs from them and writing it
//!    to disk ([`crate::build`])
//!
//! Of the two, the second step is the more involved. It is a one-way
//! pipeline of pure functions over an immutable snapshot of the posts:
//!
//! 1. Every post gets exactly one path ([`crate::slug`])
//! 2. Posts are ordered newest first and linked to their neighbours
//!    ([`crate::ordering`])
//! 3. The ordered posts feed, independently, the index pages
//!    ([`crate::paginate`]), series reading lists ([`crate::series`]), the
//!    RSS feeds ([`crate::feed`]) and the sitemap ([`crate::sitemap`])
//!
//! Finally the results are bundled into a JSON route manifest
//! ([`crate::manifest`]) that templates render from.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod manifest;
pub mod markdown;
pub mod ordering;
pub mod paginate;
pub mod parser;
pub mod post;
pub mod series;
pub mod sitemap;
pub mod slug;
