//! The authority over the mappings of a program: every change to the names goes through an [`EntryRemapper`].

use std::cell::OnceCell;
use anyhow::Result;
use log::{debug, warn};
use duke::entry::Entry;
use quill::mapping::EntryMapping;
use quill::operations::invert;
use quill::resolver::{EntryResolver, ResolutionStrategy, VoidEntryResolver};
use quill::translator::{MappingTranslator, Translatable, Translator};
use quill::tree::{DeltaTrackingTree, EntryTree, MappingDelta};
use quill::validation::{ValidationContext, ValidationError};
use crate::checker::{Dropped, MappingsChecker};
use crate::index::JarIndex;
use crate::progress::ProgressListener;
use crate::resolver::IndexEntryResolver;
use crate::validator::MappingValidator;

/// Holds the mappings keyed by obfuscated entries, and checks every change against the index.
///
/// The tree keyed by deobfuscated entries is derived from the obfuscated one when it's first asked for after a
/// change.
#[derive(Debug)]
pub struct EntryRemapper<'a> {
	index: &'a JarIndex,
	mappings: DeltaTrackingTree<EntryMapping>,
	inverse: OnceCell<EntryTree<EntryMapping>>,
}

impl<'a> EntryRemapper<'a> {
	pub fn empty(index: &'a JarIndex) -> EntryRemapper<'a> {
		EntryRemapper::mapped(index, EntryTree::new())
	}

	pub fn mapped(index: &'a JarIndex, mappings: EntryTree<EntryMapping>) -> EntryRemapper<'a> {
		EntryRemapper {
			index,
			mappings: DeltaTrackingTree::new(mappings),
			inverse: OnceCell::new(),
		}
	}

	pub fn index(&self) -> &'a JarIndex {
		self.index
	}

	fn resolver(&self) -> IndexEntryResolver<'a> {
		self.index.entry_resolver()
	}

	/// Validates the mapping for the entry, and stores it if the context has no errors afterwards.
	///
	/// Giving a new name resolves the entry to its topmost declarations, while only changing documentation or access
	/// resolves to the closest declaration. A mapping equal to [`EntryMapping::DEFAULT`] removes the stored one.
	pub fn put_mapping(&mut self, context: &mut ValidationContext, entry: &Entry, mapping: EntryMapping) {
		let Some(resolved) = self.check_put_mapping(context, entry, &mapping) else {
			return;
		};

		let value = if mapping.is_default() { None } else { Some(mapping) };
		for resolved_entry in resolved {
			debug!("mapping {resolved_entry} to {}", value.as_ref().map_or_else(|| "nothing".to_owned(), EntryMapping::to_string));
			self.mappings.insert(resolved_entry, value.clone());
		}
		self.inverse = OnceCell::new();
	}

	/// Runs the same checks as [`EntryRemapper::put_mapping`] without storing anything.
	pub fn validate_put_mapping(&self, context: &mut ValidationContext, entry: &Entry, mapping: &EntryMapping) {
		self.check_put_mapping(context, entry, mapping);
	}

	/// Returns the entries to store the mapping for, or `None` if the context has errors.
	fn check_put_mapping(&self, context: &mut ValidationContext, entry: &Entry, mapping: &EntryMapping) -> Option<Vec<Entry>> {
		let old_mapping = self.get_deobf_mapping(entry);
		let renaming = old_mapping.target_name != mapping.target_name;

		let strategy = if renaming { ResolutionStrategy::ResolveRoot } else { ResolutionStrategy::ResolveClosest };
		let resolved = self.resolver().resolve_entry(entry, strategy);

		if renaming {
			if let Some(name) = &mapping.target_name {
				let validator = MappingValidator::new(self.index, self.mappings.tree());
				for resolved_entry in &resolved {
					validator.validate_rename(context, resolved_entry, name);
				}
			}
		}

		context.can_proceed().then_some(resolved)
	}

	/// Stores the mapping for the entry, or removes the stored one when given `None`.
	///
	/// Fails with the first validation error, leaving the mappings untouched. Storing a mapping that is already
	/// stored changes nothing. Returns the validation warnings.
	pub fn map_from_obf(&mut self, entry: &Entry, mapping: Option<EntryMapping>) -> Result<Vec<ValidationError>> {
		let mut context = ValidationContext::new();
		self.put_mapping(&mut context, entry, mapping.unwrap_or_default());

		let warnings = context.into_result()?;
		for warning in &warnings {
			warn!("mapping {entry}: {warning}");
		}
		Ok(warnings)
	}

	/// The mapping stored for exactly this entry, or the default mapping.
	pub fn get_deobf_mapping(&self, entry: &Entry) -> EntryMapping {
		self.mappings.get(entry).cloned().unwrap_or_default()
	}

	pub fn deobfuscator(&self) -> MappingTranslator<'_, IndexEntryResolver<'a>> {
		MappingTranslator::new(self.mappings.tree(), self.resolver())
	}

	/// Renames the entries in something using the current mappings.
	pub fn deobfuscate<T: Translatable>(&self, translatable: &T) -> T {
		translatable.translate(&self.deobfuscator())
	}

	/// All entries having a mapping.
	pub fn obf_entries(&self) -> impl Iterator<Item=&Entry> {
		self.mappings.tree().all_entries()
	}

	/// The entries in the mappings directly below the given one.
	pub fn obf_children(&self, entry: &Entry) -> Vec<&Entry> {
		self.mappings.tree().children(entry)
	}

	pub fn obf_to_deobf(&self) -> &EntryTree<EntryMapping> {
		self.mappings.tree()
	}

	/// The mappings keyed by deobfuscated entries, each mapping back to the obfuscated name.
	pub fn deobf_to_obf(&self) -> &EntryTree<EntryMapping> {
		self.inverse.get_or_init(|| {
			debug!("rebuilding the deobfuscated mappings");
			invert(self.mappings.tree())
		})
	}

	/// Everything changed since the last call.
	pub fn take_mapping_delta(&mut self) -> MappingDelta<EntryMapping> {
		self.mappings.take_delta()
	}

	pub fn is_dirty(&self) -> bool {
		self.mappings.is_dirty()
	}

	/// Removes the mappings of entries the index doesn't know of (anymore), and returns what was removed.
	pub fn drop_broken_mappings(&mut self, progress: impl ProgressListener) -> Dropped {
		let dropped = MappingsChecker::new(self.index, self.mappings.tree()).drop_broken_mappings(progress);

		for entry in dropped.entries() {
			self.mappings.remove(entry);
		}
		if !dropped.is_empty() {
			self.inverse = OnceCell::new();
		}

		dropped
	}

	pub fn into_mappings(self) -> EntryTree<EntryMapping> {
		self.mappings.into_tree()
	}
}

/// Translates in both directions, using the mappings of an [`EntryRemapper`].
#[derive(Debug, Clone, Copy)]
pub struct BidirectionalMapper<'r, 'a> {
	remapper: &'r EntryRemapper<'a>,
}

impl<'r, 'a> BidirectionalMapper<'r, 'a> {
	pub fn new(remapper: &'r EntryRemapper<'a>) -> BidirectionalMapper<'r, 'a> {
		BidirectionalMapper { remapper }
	}

	pub fn deobfuscate<T: Translatable>(&self, translatable: &T) -> T {
		self.remapper.deobfuscate(translatable)
	}

	/// Gives deobfuscated entries their obfuscated names back.
	pub fn obfuscate<T: Translatable>(&self, translatable: &T) -> T {
		translatable.translate(&self.obfuscator())
	}

	/// The deobfuscated tree is keyed by the names the entries have, so no resolving is needed.
	pub fn obfuscator(&self) -> impl Translator + 'r {
		MappingTranslator::new(self.remapper.deobf_to_obf(), VoidEntryResolver)
	}

	/// The mapping of a deobfuscated entry, as stored for its obfuscated entry.
	pub fn get_mapping_of_deobf(&self, deobf_entry: &Entry) -> EntryMapping {
		let obf_entry = self.obfuscate(deobf_entry);
		self.remapper.get_deobf_mapping(&obf_entry)
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use duke::entry::{ClassEntry, Entry, FieldEntry, MethodEntry};
	use duke::parsed::{MemoryClassProvider, ParsedClass, ParsedField, ParsedMethod};
	use quill::mapping::EntryMapping;
	use crate::config::IndexingConfig;
	use crate::index::JarIndex;
	use crate::progress::NoProgress;
	use crate::remapper::{BidirectionalMapper, EntryRemapper};

	fn index() -> anyhow::Result<JarIndex> {
		let provider = MemoryClassProvider::new()
			.with(ParsedClass::new(0x0001u16, "a", Some("java/lang/Object"), &[])
				.with_field(ParsedField::new(0x0002u16, "a", "Ljava/lang/String;"))
				.with_method(ParsedMethod::new(0x0001u16, "a", "()Ljava/lang/String;")));
		JarIndex::index_jar(&provider, &IndexingConfig::default(), NoProgress)
	}

	#[test]
	fn rename_and_back() -> anyhow::Result<()> {
		let index = index()?;
		let mut remapper = EntryRemapper::empty(&index);

		let class = Entry::Class(ClassEntry::new("a"));
		let field = Entry::Field(FieldEntry::new(ClassEntry::new("a"), "a", "Ljava/lang/String;"));
		remapper.map_from_obf(&class, Some(EntryMapping::new("com/example/Foo")))?;
		remapper.map_from_obf(&field, Some(EntryMapping::new("name")))?;

		let mapper = BidirectionalMapper::new(&remapper);
		let deobf_field = mapper.deobfuscate(&field);
		assert_eq!(deobf_field.to_string(), "com/example/Foo#name:Ljava/lang/String;");
		assert_eq!(mapper.obfuscate(&deobf_field), field);
		assert_eq!(mapper.get_mapping_of_deobf(&deobf_field), EntryMapping::new("name"));

		// the inverse follows later changes
		remapper.map_from_obf(&class, Some(EntryMapping::new("com/example/Bar")))?;
		let mapper = BidirectionalMapper::new(&remapper);
		assert_eq!(mapper.obfuscate(&Entry::Class(ClassEntry::new("com/example/Bar"))), class);
		Ok(())
	}

	#[test]
	fn rejected_names_change_nothing() -> anyhow::Result<()> {
		let index = index()?;
		let mut remapper = EntryRemapper::empty(&index);
		let method = Entry::Method(MethodEntry::new(ClassEntry::new("a"), "a", "()Ljava/lang/String;"));

		assert!(remapper.map_from_obf(&method, Some(EntryMapping::new("1st"))).is_err());
		assert!(remapper.map_from_obf(&Entry::Class(ClassEntry::new("a")), Some(EntryMapping::new("NoPackage"))).is_err());
		assert!(!remapper.is_dirty());
		assert_eq!(remapper.obf_entries().count(), 0);
		Ok(())
	}

	#[test]
	fn same_mapping_twice_is_no_change() -> anyhow::Result<()> {
		let index = index()?;
		let mut remapper = EntryRemapper::empty(&index);
		let method = Entry::Method(MethodEntry::new(ClassEntry::new("a"), "a", "()Ljava/lang/String;"));

		remapper.map_from_obf(&method, Some(EntryMapping::new("getName")))?;
		let first = remapper.take_mapping_delta();
		assert!(!first.is_empty());

		remapper.map_from_obf(&method, Some(EntryMapping::new("getName")))?;
		assert!(!remapper.is_dirty());
		assert!(remapper.take_mapping_delta().is_empty());

		// a default mapping removes the stored one
		remapper.map_from_obf(&method, None)?;
		assert_eq!(remapper.get_deobf_mapping(&method), EntryMapping::DEFAULT);
		assert_eq!(remapper.obf_children(&Entry::Class(ClassEntry::new("a"))), Vec::<&Entry>::new());
		Ok(())
	}
}
