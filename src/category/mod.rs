//! Category identifiers for the two classification taxonomies.
//!
//! - [`LibraryType`]: what kind of library a package builds into (build targets)
//! - [`ProjectType`]: what kind of application a dev server is launching
//!
//! Both are closed enums declared through [`define_category!`](crate::define_category)
//! and share the [`Category`] trait, so one classifier engine serves both.

#[macro_use]
pub mod id_enum_macro;

pub mod library;
pub mod project;

pub use library::LibraryType;
pub use project::ProjectType;

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A classifiable kind of project.
pub trait Category:
    Copy + Eq + Hash + Ord + Debug + Display + Send + Sync + 'static
{
    /// Stable identifier, used for serialization and deterministic tie-breaks
    fn id(&self) -> &'static str;

    /// Every variant, in declaration order
    fn all() -> &'static [Self];
}
