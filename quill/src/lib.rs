//! Crate for storing, reading and writing mappings, as well as translating entries with them.
//!
//! Mappings are kept in an [`EntryTree`][tree::EntryTree], mirroring how classes contain their members. Reading and
//! writing supports the enigma format, as a single file ([`enigma_file`]), as a directory with one file per class
//! ([`enigma_dir`]), and as a zip file with the same layout ([`enigma_zip`]). The same tree can also be read from and
//! written to the tiny v2 format ([`tiny_v2`]).
//!
//! Knowledge about the class hierarchy comes in through an [`EntryResolver`][resolver::EntryResolver]; this crate only
//! has the [`VoidEntryResolver`][resolver::VoidEntryResolver] that knows nothing.

mod lines;

pub mod mapping;
pub mod tree;

pub mod resolver;
pub mod translator;
pub mod validation;

pub mod save;
pub mod enigma_file;
pub mod enigma_dir;
pub mod enigma_zip;
pub mod tiny_v2;

pub mod operations;
