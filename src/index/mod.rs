//! The index of a whole program: what is declared where, who inherits from whom, and what refers to what.
//!
//! A [`JarIndex`] is built once with [`JarIndex::index_jar`] and never changed afterwards. Renaming its contents
//! gives a new index, see [`JarIndex::remapped`].

pub mod entry;
pub mod inheritance;
pub mod reference;
pub mod bridge;
pub mod package_visibility;

use anyhow::{bail, Result};
use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use duke::access::AccessFlags;
use duke::entry::{ClassEntry, Entry, FieldEntry, MethodEntry};
use duke::parsed::{ClassProvider, ParsedClass};
use quill::translator::{Translatable, Translator};
use crate::config::IndexingConfig;
use crate::index::bridge::BridgeMethodIndex;
use crate::index::entry::{ClassDefinition, EntryIndex};
use crate::index::inheritance::InheritanceIndex;
use crate::index::package_visibility::PackageVisibilityIndex;
use crate::index::reference::{scan_method, ReferenceIndex, ReferenceRecord};
use crate::progress::ProgressListener;
use crate::resolver::IndexEntryResolver;

/// All indices of a program, together with an [`IndexEntryResolver`] working on them.
#[derive(Debug, Clone, Default)]
pub struct JarIndex {
	entry_index: EntryIndex,
	inheritance_index: InheritanceIndex,
	reference_index: ReferenceIndex,
	bridge_method_index: BridgeMethodIndex,
	package_visibility_index: PackageVisibilityIndex,

	children_by_class: IndexMap<ClassEntry, Vec<Entry>>,
	method_implementations: IndexMap<String, Vec<MethodEntry>>,
	indexed_classes: IndexSet<String>,
}

/// What the first pass learns from a single class.
struct Declarations {
	class: ClassEntry,
	definition: ClassDefinition,
	fields: Vec<(FieldEntry, AccessFlags)>,
	methods: Vec<(MethodEntry, AccessFlags)>,
}

impl Declarations {
	fn of(class: &ParsedClass) -> Result<Declarations> {
		if class.interfaces.contains(&class.name) {
			bail!("class {} implements itself", class.name);
		}

		let entry = class.entry();
		Ok(Declarations {
			fields: class.fields.iter().map(|field| (field.entry(&entry), field.access)).collect(),
			methods: class.methods.iter().map(|method| (method.entry(&entry), method.access)).collect(),
			definition: ClassDefinition::of(class),
			class: entry,
		})
	}
}

/// Applies `f` to every item, on multiple threads if `parallel` is set. The results keep the order of the items.
fn map_classes<T, R>(parallel: bool, items: &[T], f: impl Fn(&T) -> R + Sync + Send) -> Vec<R>
where
	T: Sync,
	R: Send,
{
	if parallel {
		items.par_iter().map(f).collect()
	} else {
		items.iter().map(f).collect()
	}
}

impl JarIndex {
	/// Builds the index of all classes the provider knows, except for platform classes.
	///
	/// The first pass looks at declarations only, the second one at method bodies. Each pass collects its findings
	/// per class (possibly in parallel), and then merges them in the order of [`ClassProvider::class_names`].
	pub fn index_jar(provider: &impl ClassProvider, config: &IndexingConfig, mut progress: impl ProgressListener) -> Result<JarIndex> {
		progress.init(4, "indexing jar");

		progress.step(1, "reading classes");
		let names: Vec<String> = provider.class_names().into_iter()
			.filter(|name| {
				let jre = config.is_jre(name);
				if jre {
					trace!("skipping platform class {name}");
				}
				!jre
			})
			.collect();

		let classes: Vec<ParsedClass> = map_classes(config.parallel, &names, |name| provider.get(name))
			.into_iter()
			.zip(&names)
			.filter_map(|(class, name)| {
				if class.is_none() {
					warn!("class {name} is listed, but the provider doesn't have it");
				}
				class
			})
			.collect();

		let mut index = JarIndex::default();

		progress.step(2, "indexing declarations");
		let declarations = map_classes(config.parallel, &classes, Declarations::of)
			.into_iter()
			.collect::<Result<Vec<_>>>()?;
		for declarations in declarations {
			index.index_declarations(declarations, config);
		}
		debug!("indexed {} classes, {} fields and {} methods",
			index.indexed_classes.len(), index.entry_index.fields().count(), index.entry_index.methods().count());

		progress.step(3, "indexing references");
		let references = map_classes(config.parallel, &classes, |class| {
			let entry = class.entry();
			class.methods.iter()
				.map(|method| (method.entry(&entry), scan_method(method)))
				.collect::<Vec<_>>()
		});
		for (caller, records) in references.into_iter().flatten() {
			index.index_references(&caller, records);
		}

		index.bridge_method_index = BridgeMethodIndex::find_bridge_methods(&index.entry_index, &index.inheritance_index, &index.reference_index);

		progress.step(4, "processing index");
		index.process_index();

		info!("finished indexing {} classes", index.indexed_classes.len());
		Ok(index)
	}

	fn index_declarations(&mut self, declarations: Declarations, config: &IndexingConfig) {
		let Declarations { class, definition, fields, methods } = declarations;

		self.indexed_classes.insert(class.full_name());
		self.inheritance_index.index_class(
			&class,
			definition.super_class.as_ref(),
			&definition.interfaces,
			|parent| config.is_jre(&parent.full_name()),
		);

		if !definition.access.is_synthetic() {
			if let Some(outer) = class.outer() {
				self.children_by_class.entry(outer.clone()).or_default().push(Entry::Class(class.clone()));
			}
		}
		self.entry_index.index_class(class.clone(), definition);

		for (field, access) in fields {
			self.reference_index.index_field(&field);
			if !access.is_synthetic() {
				self.children_by_class.entry(class.clone()).or_default().push(Entry::Field(field.clone()));
			}
			self.entry_index.index_field(field, access);
		}

		for (method, access) in methods {
			self.reference_index.index_method(&method);
			if !access.is_synthetic() && method.name != "<clinit>" {
				self.children_by_class.entry(class.clone()).or_default().push(Entry::Method(method.clone()));
			}
			if !method.is_constructor() {
				self.method_implementations.entry(class.full_name()).or_default().push(method.clone());
			}
			self.entry_index.index_method(method, access);
		}
	}

	fn index_references(&mut self, caller: &MethodEntry, records: Vec<ReferenceRecord>) {
		for record in records {
			self.reference_index.index_record(caller, record);
		}
	}

	fn process_index(&mut self) {
		let resolver = IndexEntryResolver::new(&self.entry_index, &self.inheritance_index, &self.bridge_method_index);
		self.reference_index.process_index(&resolver);

		self.bridge_method_index.process_index();

		self.package_visibility_index = PackageVisibilityIndex::build(&self.entry_index, &self.inheritance_index, &self.reference_index);
	}

	pub fn entry_index(&self) -> &EntryIndex {
		&self.entry_index
	}

	pub fn inheritance_index(&self) -> &InheritanceIndex {
		&self.inheritance_index
	}

	pub fn reference_index(&self) -> &ReferenceIndex {
		&self.reference_index
	}

	pub fn bridge_method_index(&self) -> &BridgeMethodIndex {
		&self.bridge_method_index
	}

	pub fn package_visibility_index(&self) -> &PackageVisibilityIndex {
		&self.package_visibility_index
	}

	pub fn entry_resolver(&self) -> IndexEntryResolver<'_> {
		IndexEntryResolver::new(&self.entry_index, &self.inheritance_index, &self.bridge_method_index)
	}

	/// The non-synthetic members and inner classes of a class. Static initializers are left out.
	pub fn get_children_of_class(&self, class: &ClassEntry) -> &[Entry] {
		self.children_by_class.get(class).map_or(&[], Vec::as_slice)
	}

	/// The methods declared in the class with the given full name, without constructors.
	pub fn get_method_implementations(&self, class_name: &str) -> &[MethodEntry] {
		self.method_implementations.get(class_name).map_or(&[], Vec::as_slice)
	}

	/// Returns whether a class of the given full name was indexed.
	pub fn is_indexed(&self, class_name: &str) -> bool {
		self.indexed_classes.contains(class_name)
	}

	pub fn indexed_classes(&self) -> impl Iterator<Item=&str> {
		self.indexed_classes.iter().map(String::as_str)
	}

	/// Gives a new index with all entries in it translated.
	pub fn remapped(&self, translator: &(impl Translator + ?Sized)) -> JarIndex {
		JarIndex {
			entry_index: self.entry_index.remapped(translator),
			inheritance_index: self.inheritance_index.remapped(translator),
			reference_index: self.reference_index.remapped(translator),
			bridge_method_index: self.bridge_method_index.remapped(translator),
			package_visibility_index: self.package_visibility_index.remapped(translator),
			children_by_class: self.children_by_class.iter()
				.map(|(class, children)| (class.translate(translator), children.translate(translator)))
				.collect(),
			method_implementations: self.method_implementations.iter()
				.map(|(class_name, methods)| (translator.translate_class_name(class_name), methods.translate(translator)))
				.collect(),
			indexed_classes: self.indexed_classes.iter()
				.map(|class_name| translator.translate_class_name(class_name))
				.collect(),
		}
	}
}
