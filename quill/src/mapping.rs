use std::fmt::{Display, Formatter};
pub use duke::access::AccessModifier;

/// What the mappings say about a single entry: a new name, documentation and an access override.
///
/// An absent mapping (`None` in a tree) means nothing was recorded, while [`EntryMapping::DEFAULT`] is an explicit
/// mapping that changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EntryMapping {
	pub target_name: Option<String>,
	pub access_modifier: AccessModifier,
	pub javadoc: Option<String>,
}

impl EntryMapping {
	pub const DEFAULT: EntryMapping = EntryMapping {
		target_name: None,
		access_modifier: AccessModifier::Unchanged,
		javadoc: None,
	};

	pub fn new(target_name: impl Into<String>) -> EntryMapping {
		EntryMapping {
			target_name: Some(target_name.into()),
			..EntryMapping::DEFAULT
		}
	}

	pub fn with_name(&self, target_name: impl Into<String>) -> EntryMapping {
		EntryMapping {
			target_name: Some(target_name.into()),
			..self.clone()
		}
	}

	pub fn without_name(&self) -> EntryMapping {
		EntryMapping {
			target_name: None,
			..self.clone()
		}
	}

	pub fn with_docs(&self, javadoc: Option<String>) -> EntryMapping {
		EntryMapping {
			javadoc,
			..self.clone()
		}
	}

	pub fn with_modifier(&self, access_modifier: AccessModifier) -> EntryMapping {
		EntryMapping {
			access_modifier,
			..self.clone()
		}
	}

	pub fn is_default(&self) -> bool {
		*self == EntryMapping::DEFAULT
	}
}

impl Display for EntryMapping {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.target_name.as_deref().unwrap_or("-"))?;
		if self.access_modifier != AccessModifier::Unchanged {
			write!(f, " {}", self.access_modifier.as_str())?;
		}
		if self.javadoc.is_some() {
			f.write_str(" (documented)")?;
		}
		Ok(())
	}
}
