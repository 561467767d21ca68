//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI and encapsulates its
//! own state and rendering logic.

mod browse_blogs;
mod create_blog;

use std::fmt;

pub(crate) use browse_blogs::BrowseBlogsScreen;
pub(crate) use create_blog::CreateBlogScreen;

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    CreateBlog,
    BrowseBlogs,
}

impl ScreenId {
    pub(crate) const ALL: [ScreenId; 2] = [ScreenId::CreateBlog, ScreenId::BrowseBlogs];
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateBlog => write!(f, "Create Blog"),
            Self::BrowseBlogs => write!(f, "Browse Blogs"),
        }
    }
}
