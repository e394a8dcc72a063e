use indexmap::IndexSet;
use duke::entry::Entry;
use crate::tree::EntryTree;

/// The change of a tree since the last call to [`DeltaTrackingTree::take_delta`].
#[derive(Debug, Clone)]
pub struct MappingDelta<V> {
	/// The tree as it was when the previous delta was taken.
	pub base_mappings: EntryTree<V>,
	pub additions: EntryTree<()>,
	pub deletions: EntryTree<()>,
}

impl<V> MappingDelta<V> {
	pub fn new(base_mappings: EntryTree<V>) -> MappingDelta<V> {
		MappingDelta {
			base_mappings,
			additions: EntryTree::new(),
			deletions: EntryTree::new(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.additions.is_empty() && self.deletions.is_empty()
	}

	/// The top level entries (usually top level classes) touched by this delta, each listed once.
	pub fn changed_roots(&self) -> IndexSet<&Entry> {
		self.additions.root_entries()
			.chain(self.deletions.root_entries())
			.collect()
	}
}

/// Wraps an [`EntryTree`], recording every entry that is inserted or removed.
///
/// An insert with a value records the entry both as addition and as deletion, as the old value (if any) is replaced.
/// Removing the value only records a deletion, and forgets about an earlier addition.
#[derive(Debug, Clone)]
pub struct DeltaTrackingTree<V> {
	delegate: EntryTree<V>,
	base: EntryTree<V>,
	additions: EntryTree<()>,
	deletions: EntryTree<()>,
}

impl<V: Clone> Default for DeltaTrackingTree<V> {
	fn default() -> Self {
		DeltaTrackingTree::new(EntryTree::new())
	}
}

impl<V: Clone> DeltaTrackingTree<V> {
	pub fn new(delegate: EntryTree<V>) -> DeltaTrackingTree<V> {
		DeltaTrackingTree {
			base: delegate.clone(),
			delegate,
			additions: EntryTree::new(),
			deletions: EntryTree::new(),
		}
	}

	pub fn insert(&mut self, entry: Entry, value: Option<V>) -> Option<V>
	where
		V: PartialEq,
	{
		if self.delegate.get(&entry) == value.as_ref() {
			return self.delegate.get(&entry).cloned();
		}

		match value {
			Some(_) => self.track_addition(&entry),
			None => self.track_deletion(&entry),
		}
		self.delegate.insert(entry, value)
	}

	pub fn remove(&mut self, entry: &Entry) -> Option<V> {
		let old = self.delegate.remove(entry);
		if old.is_some() {
			self.track_deletion(entry);
		}
		old
	}

	fn track_addition(&mut self, entry: &Entry) {
		self.deletions.insert(entry.clone(), Some(()));
		self.additions.insert(entry.clone(), Some(()));
	}

	fn track_deletion(&mut self, entry: &Entry) {
		self.additions.remove(entry);
		self.deletions.insert(entry.clone(), Some(()));
	}

	/// Returns everything changed since the last call, and starts tracking anew.
	pub fn take_delta(&mut self) -> MappingDelta<V> {
		let base = std::mem::replace(&mut self.base, self.delegate.clone());
		MappingDelta {
			base_mappings: base,
			additions: std::mem::take(&mut self.additions),
			deletions: std::mem::take(&mut self.deletions),
		}
	}

	pub fn is_dirty(&self) -> bool {
		!self.additions.is_empty() || !self.deletions.is_empty()
	}

	pub fn tree(&self) -> &EntryTree<V> {
		&self.delegate
	}

	pub fn into_tree(self) -> EntryTree<V> {
		self.delegate
	}

	pub fn get(&self, entry: &Entry) -> Option<&V> {
		self.delegate.get(entry)
	}
}
