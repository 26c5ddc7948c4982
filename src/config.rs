//! Loads the project configuration from a `scriven.yaml` file. The project
//! file is searched for in the given directory and then in each of its
//! ancestors, so commands work from anywhere inside a project.

use crate::feed::FeedDefinition;
use crate::paginate::DEFAULT_INDEX_PATH;
use serde::Deserialize;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "scriven.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    title: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    author: Option<String>,

    site_url: Url,

    #[serde(default = "default_content_directory")]
    content_directory: PathBuf,

    #[serde(default)]
    page_size: PageSize,

    #[serde(default = "default_index_path")]
    index_path: String,

    #[serde(default = "default_feeds")]
    feeds: Vec<FeedDefinition>,
}

fn default_content_directory() -> PathBuf {
    PathBuf::from("content/blog")
}

fn default_index_path() -> String {
    DEFAULT_INDEX_PATH.to_owned()
}

fn default_feeds() -> Vec<FeedDefinition> {
    vec![FeedDefinition::all()]
}

/// The resolved configuration for a build. Relative paths in the project
/// file have been resolved against the project directory.
#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,
    pub description: String,
    pub author: Option<String>,

    /// The absolute base URL of the site, e.g. `https://example.org`.
    pub site_url: Url,

    /// The directory posts are loaded from.
    pub content_directory: PathBuf,

    /// The directory artifacts are written to.
    pub output_directory: PathBuf,

    /// The number of posts per index page.
    pub page_size: NonZeroUsize,

    /// The path of the first index page.
    pub index_path: String,

    pub feeds: Vec<FeedDefinition>,
}

impl Config {
    /// Searches `dir` and its ancestors for [`PROJECT_FILE`] and loads the
    /// first one found. A relative `dir` is resolved against the current
    /// directory first. `output_directory` defaults to `public` inside the
    /// project directory.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let start = absolute(dir)?;
        let mut current = Some(start.as_path());
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, output_directory);
            }
            current = dir.parent();
        }
        Err(Error::NotFound(dir.to_owned()))
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_owned(),
            source: e,
        })?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        Config::from_yaml(project_root, &contents, output_directory)
    }

    /// Parses project file `contents` as though it lived in `project_root`.
    pub fn from_yaml(
        project_root: &Path,
        contents: &str,
        output_directory: Option<&Path>,
    ) -> Result<Config> {
        let project: Project = serde_yaml::from_str(contents)?;

        let page_size = NonZeroUsize::new(project.page_size.0).ok_or(Error::ZeroPageSize)?;
        validate_index_path(&project.index_path)?;
        validate_feeds(&project.feeds)?;
        if project.site_url.cannot_be_a_base() {
            return Err(Error::InvalidSiteUrl(project.site_url));
        }

        Ok(Config {
            title: project.title,
            description: project.description,
            author: project.author,
            site_url: project.site_url,
            content_directory: project_root.join(project.content_directory),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join("public"),
            },
            page_size,
            index_path: project.index_path,
            feeds: project.feeds,
        })
    }

    /// The file a feed is written to: its site-relative output path inside
    /// the output directory.
    pub fn feed_file(&self, feed: &FeedDefinition) -> PathBuf {
        self.output_directory.join(feed.output.trim_start_matches('/'))
    }
}

// `Path::parent` on a relative path runs out at `""`, never reaching the real
// ancestors.
fn absolute(dir: &Path) -> Result<PathBuf> {
    let joined = match dir.is_absolute() {
        true => dir.to_owned(),
        false => std::env::current_dir()
            .map_err(|e| Error::Io {
                path: dir.to_owned(),
                source: e,
            })?
            .join(dir),
    };
    Ok(joined.components().collect())
}

fn validate_index_path(index_path: &str) -> Result<()> {
    match index_path.starts_with('/') && !index_path.contains(char::is_whitespace) {
        true => Ok(()),
        false => Err(Error::InvalidIndexPath(index_path.to_owned())),
    }
}

fn validate_feeds(feeds: &[FeedDefinition]) -> Result<()> {
    let mut names = HashSet::new();
    let mut outputs = HashSet::new();
    for feed in feeds {
        let output = &feed.output;
        if !output.starts_with('/')
            || !output.ends_with(".xml")
            || output.split('/').any(|segment| segment == "..")
        {
            return Err(Error::InvalidFeedOutput {
                name: feed.name.clone(),
                output: output.clone(),
            });
        }
        if !names.insert(feed.name.as_str()) {
            return Err(Error::DuplicateFeed(feed.name.clone()));
        }
        if !outputs.insert(output.as_str()) {
            return Err(Error::DuplicateFeed(output.clone()));
        }
    }
    Ok(())
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no project file exists in the directory or any ancestor.
    #[error("could not find `{}` in `{}` or any parent directory", PROJECT_FILE, .0.display())]
    NotFound(PathBuf),

    /// Returned when the project file can't be read.
    #[error("reading `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Returned when the project file isn't valid YAML for a project.
    #[error("parsing project file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("`page_size` must be greater than zero")]
    ZeroPageSize,

    #[error("`index_path` must be a site-relative path like `/blog`; found `{0}`")]
    InvalidIndexPath(String),

    #[error("`site_url` must be an absolute base URL; found `{0}`")]
    InvalidSiteUrl(Url),

    /// Returned when a feed's output isn't a site-relative `.xml` path.
    #[error("feed `{name}`: output must be a site-relative `.xml` path; found `{output}`")]
    InvalidFeedOutput { name: String, output: String },

    /// Returned when two feeds share a name or an output path.
    #[error("feed `{0}` is defined more than once")]
    DuplicateFeed(String),
}
