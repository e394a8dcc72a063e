//! The model of a compiled program as seen by the indexer and the mappings: names of classes, fields, methods and
//! local variables ([`entry`]), their access flags ([`access`]), descriptors ([`descriptor`]) and generic signatures
//! ([`signature`]), as well as the already parsed form of a class handed out by a [`parsed::ClassProvider`].

pub mod access;
pub mod descriptor;
pub mod entry;
pub mod names;
pub mod parsed;
pub mod signature;
