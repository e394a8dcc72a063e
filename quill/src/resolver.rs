use indexmap::IndexSet;
use duke::entry::{Entry, MethodEntry};

/// How far [`EntryResolver::resolve_entry`] walks up the class hierarchy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResolutionStrategy {
	/// Stop at the nearest class declaring the entry.
	ResolveClosest,
	/// Walk up to the topmost declarations.
	ResolveRoot,
}

/// Knows which declaration an entry actually refers to, and which entries have to be named alike.
///
/// Resolution never fails: entries the resolver knows nothing about resolve to themselves.
pub trait EntryResolver {
	/// Resolves the entry to its declarations. There might be more than one, for example if a method is declared
	/// in both a superclass and an interface.
	fn resolve_entry(&self, entry: &Entry, strategy: ResolutionStrategy) -> Vec<Entry>;

	fn resolve_first_entry(&self, entry: &Entry, strategy: ResolutionStrategy) -> Entry {
		self.resolve_entry(entry, strategy)
			.into_iter()
			.next()
			.unwrap_or_else(|| entry.clone())
	}

	/// All methods representing the same method as the given one, and so must share its name.
	fn resolve_equivalent_methods(&self, method: &MethodEntry) -> IndexSet<MethodEntry>;

	/// All entries that must share the name of the given one.
	///
	/// For methods this is [`EntryResolver::resolve_equivalent_methods`], for local variables it's the local
	/// variable in each of the equivalent methods. Everything else only has itself.
	fn resolve_equivalent_entries(&self, entry: &Entry) -> IndexSet<Entry> {
		match entry {
			Entry::Method(method) => self.resolve_equivalent_methods(method)
				.into_iter()
				.map(Entry::Method)
				.collect(),
			Entry::LocalVariable(local) => self.resolve_equivalent_methods(&local.parent)
				.into_iter()
				.map(|method| Entry::LocalVariable(local.with_parent(method)))
				.collect(),
			entry => IndexSet::from([entry.clone()]),
		}
	}
}

impl<T: EntryResolver + ?Sized> EntryResolver for &T {
	fn resolve_entry(&self, entry: &Entry, strategy: ResolutionStrategy) -> Vec<Entry> {
		(**self).resolve_entry(entry, strategy)
	}

	fn resolve_equivalent_methods(&self, method: &MethodEntry) -> IndexSet<MethodEntry> {
		(**self).resolve_equivalent_methods(method)
	}
}

/// A resolver without any knowledge of the class hierarchy: every entry is its own declaration.
#[derive(Debug, Copy, Clone, Default)]
pub struct VoidEntryResolver;

impl EntryResolver for VoidEntryResolver {
	fn resolve_entry(&self, entry: &Entry, _strategy: ResolutionStrategy) -> Vec<Entry> {
		vec![entry.clone()]
	}

	fn resolve_equivalent_methods(&self, method: &MethodEntry) -> IndexSet<MethodEntry> {
		IndexSet::from([method.clone()])
	}
}

#[cfg(test)]
mod testing {
	use indexmap::IndexSet;
	use pretty_assertions::assert_eq;
	use duke::entry::{ClassEntry, Entry, LocalVariableEntry, MethodEntry};
	use crate::resolver::{EntryResolver, ResolutionStrategy, VoidEntryResolver};

	#[test]
	fn void_resolver_resolves_to_itself() {
		let method = MethodEntry::new(ClassEntry::new("a"), "b", "()V");
		let local = Entry::LocalVariable(LocalVariableEntry::new(method.clone(), 0, "x", true));

		assert_eq!(VoidEntryResolver.resolve_first_entry(&local, ResolutionStrategy::ResolveRoot), local);
		assert_eq!(VoidEntryResolver.resolve_equivalent_methods(&method), IndexSet::from([method]));
		assert_eq!(VoidEntryResolver.resolve_equivalent_entries(&local), IndexSet::from([local]));
	}
}
