//! Finding mappings that don't fit the index, for example after the program was rebuilt.

use std::fmt::{Display, Formatter};
use indexmap::IndexMap;
use log::{info, warn};
use duke::entry::Entry;
use quill::mapping::EntryMapping;
use quill::resolver::{EntryResolver, ResolutionStrategy};
use quill::tree::EntryTree;
use crate::index::JarIndex;
use crate::progress::ProgressListener;

/// Why a mapping was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
	/// The class owning the entry isn't indexed at all.
	MissingOwner,
	/// The method a local variable belongs to is dropped.
	MissingMethod,
	/// The index doesn't have the entry.
	NotIndexed,
	/// The entry is indexed, but the mapping belongs to the declaration it resolves to.
	NotRoot(Vec<Entry>),
}

impl Display for DropReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			DropReason::MissingOwner => f.write_str("its class is missing"),
			DropReason::MissingMethod => f.write_str("its method is dropped"),
			DropReason::NotIndexed => f.write_str("it isn't in the index"),
			DropReason::NotRoot(roots) => {
				f.write_str("it resolves to")?;
				for root in roots {
					write!(f, " {root}")?;
				}
				Ok(())
			},
		}
	}
}

/// The mappings a [`MappingsChecker`] found to be broken.
///
/// Errors are mappings that can't be right for structural reasons, warnings are mappings that just don't match the
/// indexed program.
#[derive(Debug, Clone, Default)]
pub struct Dropped {
	pub errors: IndexMap<Entry, DropReason>,
	pub warnings: IndexMap<Entry, DropReason>,
}

impl Dropped {
	pub fn is_empty(&self) -> bool {
		self.errors.is_empty() && self.warnings.is_empty()
	}

	/// All dropped entries, errors first.
	pub fn entries(&self) -> impl Iterator<Item=&Entry> {
		self.errors.keys().chain(self.warnings.keys())
	}

	fn contains(&self, entry: &Entry) -> bool {
		self.errors.contains_key(entry) || self.warnings.contains_key(entry)
	}

	/// Removes the dropped mappings from the tree.
	pub fn apply(&self, mappings: &mut EntryTree<EntryMapping>) {
		for entry in self.entries() {
			mappings.remove(entry);
		}
	}
}

#[derive(Debug, Clone)]
pub struct MappingsChecker<'a> {
	index: &'a JarIndex,
	mappings: &'a EntryTree<EntryMapping>,
}

impl<'a> MappingsChecker<'a> {
	pub fn new(index: &'a JarIndex, mappings: &'a EntryTree<EntryMapping>) -> MappingsChecker<'a> {
		MappingsChecker { index, mappings }
	}

	/// Finds the mappings to drop. This doesn't change the mappings, see [`Dropped::apply`].
	///
	/// Parents come before their children, so that a dropped method takes its local variables with it.
	pub fn drop_broken_mappings(&self, mut progress: impl ProgressListener) -> Dropped {
		let entries: Vec<&Entry> = self.mappings.all_entries().collect();
		progress.init(entries.len(), "checking for broken mappings");

		let mut dropped = Dropped::default();
		for (n, entry) in entries.into_iter().enumerate() {
			progress.step(n + 1, &entry.to_string());

			match self.check(entry, &dropped) {
				Some(reason @ (DropReason::MissingOwner | DropReason::MissingMethod)) => {
					warn!("dropping mapping of {entry}: {reason}");
					dropped.errors.insert(entry.clone(), reason);
				},
				Some(reason) => {
					warn!("dropping mapping of {entry}: {reason}");
					dropped.warnings.insert(entry.clone(), reason);
				},
				None => {},
			}
		}

		if !dropped.is_empty() {
			info!("dropped {} broken and {} mismatched mappings", dropped.errors.len(), dropped.warnings.len());
		}
		dropped
	}

	fn check(&self, entry: &Entry, dropped: &Dropped) -> Option<DropReason> {
		let entry_index = self.index.entry_index();

		if let Entry::LocalVariable(local) = entry {
			let method = Entry::Method(local.parent.clone());
			if dropped.contains(&method) || !entry_index.has_method(&local.parent) {
				return Some(DropReason::MissingMethod);
			}
		}

		if !matches!(entry, Entry::Class(_)) && !entry_index.has_class(entry.containing_class()) {
			return Some(DropReason::MissingOwner);
		}

		if !entry_index.has_entry(entry) {
			return Some(DropReason::NotIndexed);
		}

		let resolved = self.index.entry_resolver().resolve_entry(entry, ResolutionStrategy::ResolveRoot);
		if resolved.is_empty() {
			return Some(DropReason::NotIndexed);
		}

		// a method that isn't the root declaration stays for the mappings of its local variables
		let keeps_children = matches!(entry, Entry::Method(_)) && !self.mappings.children(entry).is_empty();
		if !resolved.contains(entry) && !keeps_children {
			return Some(DropReason::NotRoot(resolved));
		}

		None
	}
}
