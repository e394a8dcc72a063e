use serde::{Deserialize, Serialize};
use duke::entry::ClassEntry;
use crate::mapping::EntryMapping;
use crate::resolver::VoidEntryResolver;
use crate::translator::{MappingTranslator, Translator};
use crate::tree::EntryTree;

/// The extension of enigma mapping files inside directories and zip files.
pub(crate) const MAPPING_EXTENSION: &str = "mapping";

/// Which name of a top level class its mappings file is named after.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingFileNameFormat {
	#[default]
	ByDeobf,
	ByObf,
}

impl MappingFileNameFormat {
	/// The path of the mappings file of a top level class, relative to the root of a directory or zip file.
	pub fn file_name(self, class: &ClassEntry, mappings: &EntryTree<EntryMapping>) -> String {
		let name = match self {
			MappingFileNameFormat::ByObf => class.full_name(),
			MappingFileNameFormat::ByDeobf => MappingTranslator::new(mappings, VoidEntryResolver)
				.translate_class(class)
				.full_name(),
		};
		format!("{name}.{MAPPING_EXTENSION}")
	}
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingSaveParameters {
	pub file_name_format: MappingFileNameFormat,
}

impl MappingSaveParameters {
	pub fn new(file_name_format: MappingFileNameFormat) -> MappingSaveParameters {
		MappingSaveParameters { file_name_format }
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use duke::entry::{ClassEntry, Entry};
	use crate::mapping::EntryMapping;
	use crate::save::MappingFileNameFormat;
	use crate::tree::EntryTree;

	#[test]
	fn file_names() {
		let mappings: EntryTree<_> = [(Entry::Class(ClassEntry::new("a")), EntryMapping::new("com/example/Foo"))]
			.into_iter()
			.collect();

		let a = ClassEntry::new("a");
		assert_eq!(MappingFileNameFormat::ByObf.file_name(&a, &mappings), "a.mapping");
		assert_eq!(MappingFileNameFormat::ByDeobf.file_name(&a, &mappings), "com/example/Foo.mapping");
		assert_eq!(MappingFileNameFormat::ByDeobf.file_name(&ClassEntry::new("b"), &mappings), "b.mapping");
	}
}
