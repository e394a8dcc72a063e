//! Indexing of obfuscated programs and the authority over their mappings.
//!
//! [`JarIndex::index_jar`][index::JarIndex::index_jar] visits all classes of a
//! [`ClassProvider`][duke::parsed::ClassProvider] twice: once for the declarations and once for the method bodies.
//! The resulting index knows the class hierarchy, the references between entries and the bridge methods, and so its
//! [`IndexEntryResolver`][resolver::IndexEntryResolver] can tell which methods need to share a name.
//!
//! An [`EntryRemapper`][remapper::EntryRemapper] holds the mappings (see the `quill` crate) and checks every new name
//! against the index before storing it.

pub mod config;
pub mod logging;
pub mod progress;

pub mod index;
pub mod resolver;
pub mod tree_builder;

pub mod validator;
pub mod remapper;
pub mod checker;
