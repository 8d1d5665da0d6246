//! # Agentlint Indexer
//!
//! Turns a directory of agent, skill and command definitions into a [`ComponentIndex`].
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (.gitignore aware)
//!     │      └─> (kind, relative_path, contents)
//!     │
//!     ├──> Component (canonical name + frontmatter)
//!     │
//!     └──> Component Index
//!            └─> kind -> name -> Component
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use agentlint_indexer::{ComponentIndex, FileScanner};
//!
//! fn main() -> agentlint_indexer::Result<()> {
//!     let files = FileScanner::new(".claude").scan()?;
//!     let index = ComponentIndex::from_discovered(files);
//!     println!("Indexed {} components", index.len());
//!     Ok(())
//! }
//! ```

mod component;
mod error;
mod frontmatter;
mod index;
mod scanner;

pub use component::{canonical_name, classify, Component, DiscoveredFile};
pub use error::{IndexerError, Result};
pub use frontmatter::{
    parse_frontmatter, split_frontmatter, string_field, string_list, Frontmatter, FrontmatterBlock,
};
pub use index::ComponentIndex;
pub use scanner::FileScanner;
