use std::fmt::{Debug, Formatter};
use anyhow::{bail, Result};

/// The access flags of a class, field or method, as stored in the class file.
///
/// The same bit can mean different things depending on what the flags are attached to: `0x0040` is
/// `volatile` on a field and `bridge` on a method. This wrapper doesn't know what it's attached to,
/// so both accessors report the same bit.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Default)]
pub struct AccessFlags(u16);

/// The four access levels of the JVM, ordered from the least to the most visible.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum AccessLevel {
	Private = 1,
	Package = 2,
	Protected = 3,
	Public = 4,
}

impl AccessFlags {
	pub const PUBLIC: u16 = 0x0001;
	pub const PRIVATE: u16 = 0x0002;
	pub const PROTECTED: u16 = 0x0004;
	pub const STATIC: u16 = 0x0008;
	pub const FINAL: u16 = 0x0010;
	pub const SYNCHRONIZED: u16 = 0x0020;
	pub const BRIDGE: u16 = 0x0040;
	pub const VARARGS: u16 = 0x0080;
	pub const NATIVE: u16 = 0x0100;
	pub const INTERFACE: u16 = 0x0200;
	pub const ABSTRACT: u16 = 0x0400;
	pub const SYNTHETIC: u16 = 0x1000;
	pub const ANNOTATION: u16 = 0x2000;
	pub const ENUM: u16 = 0x4000;

	const VISIBILITY_MASK: u16 = Self::PUBLIC | Self::PRIVATE | Self::PROTECTED;

	pub const fn new(flags: u16) -> AccessFlags {
		AccessFlags(flags)
	}

	pub const fn flags(self) -> u16 {
		self.0
	}

	const fn has(self, flag: u16) -> bool {
		self.0 & flag != 0
	}

	pub const fn is_public(self) -> bool { self.has(Self::PUBLIC) }
	pub const fn is_private(self) -> bool { self.has(Self::PRIVATE) }
	pub const fn is_protected(self) -> bool { self.has(Self::PROTECTED) }
	pub const fn is_package_private(self) -> bool { self.0 & Self::VISIBILITY_MASK == 0 }
	pub const fn is_static(self) -> bool { self.has(Self::STATIC) }
	pub const fn is_final(self) -> bool { self.has(Self::FINAL) }
	pub const fn is_bridge(self) -> bool { self.has(Self::BRIDGE) }
	pub const fn is_interface(self) -> bool { self.has(Self::INTERFACE) }
	pub const fn is_abstract(self) -> bool { self.has(Self::ABSTRACT) }
	pub const fn is_synthetic(self) -> bool { self.has(Self::SYNTHETIC) }
	pub const fn is_enum(self) -> bool { self.has(Self::ENUM) }

	/// Returns how visible something with these flags is.
	///
	/// ```
	/// use duke::access::{AccessFlags, AccessLevel};
	///
	/// assert_eq!(AccessFlags::new(AccessFlags::PROTECTED | AccessFlags::STATIC).level(), AccessLevel::Protected);
	/// assert_eq!(AccessFlags::new(AccessFlags::FINAL).level(), AccessLevel::Package);
	/// assert!(AccessLevel::Private < AccessLevel::Public);
	/// ```
	pub const fn level(self) -> AccessLevel {
		if self.is_public() {
			AccessLevel::Public
		} else if self.is_protected() {
			AccessLevel::Protected
		} else if self.is_private() {
			AccessLevel::Private
		} else {
			AccessLevel::Package
		}
	}

	/// Replaces the visibility bits with the ones for the given level, keeping every other flag.
	pub const fn with_level(self, level: AccessLevel) -> AccessFlags {
		let visibility = match level {
			AccessLevel::Private => Self::PRIVATE,
			AccessLevel::Package => 0,
			AccessLevel::Protected => Self::PROTECTED,
			AccessLevel::Public => Self::PUBLIC,
		};
		AccessFlags((self.0 & !Self::VISIBILITY_MASK) | visibility)
	}

	/// Applies an access override from the mappings.
	pub const fn with_modifier(self, modifier: AccessModifier) -> AccessFlags {
		match modifier {
			AccessModifier::Unchanged => self,
			AccessModifier::Public => self.with_level(AccessLevel::Public),
			AccessModifier::Protected => self.with_level(AccessLevel::Protected),
			AccessModifier::Private => self.with_level(AccessLevel::Private),
		}
	}
}

/// An override of the visibility of a class or member, written as `ACC:PUBLIC` and so on in mappings.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum AccessModifier {
	#[default]
	Unchanged,
	Public,
	Protected,
	Private,
}

impl AccessModifier {
	const PREFIX: &'static str = "ACC:";

	/// Returns whether `s` looks like a modifier, so starts with `ACC:`.
	pub fn is_modifier(s: &str) -> bool {
		s.starts_with(Self::PREFIX)
	}

	/// Parses `ACC:PUBLIC`, `ACC:PROTECTED`, `ACC:PRIVATE` or `ACC:UNCHANGED`.
	pub fn parse(s: &str) -> Result<AccessModifier> {
		match s.strip_prefix(Self::PREFIX) {
			Some("UNCHANGED") => Ok(AccessModifier::Unchanged),
			Some("PUBLIC") => Ok(AccessModifier::Public),
			Some("PROTECTED") => Ok(AccessModifier::Protected),
			Some("PRIVATE") => Ok(AccessModifier::Private),
			_ => bail!("unknown access modifier {s:?}, expected one of `ACC:PUBLIC`, `ACC:PROTECTED`, `ACC:PRIVATE`"),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			AccessModifier::Unchanged => "ACC:UNCHANGED",
			AccessModifier::Public => "ACC:PUBLIC",
			AccessModifier::Protected => "ACC:PROTECTED",
			AccessModifier::Private => "ACC:PRIVATE",
		}
	}
}

impl Debug for AccessFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("AccessFlags { ")?;
		if self.is_public()       { f.write_str("public ")?; }
		if self.is_private()      { f.write_str("private ")?; }
		if self.is_protected()    { f.write_str("protected ")?; }
		if self.is_static()       { f.write_str("static ")?; }
		if self.is_final()        { f.write_str("final ")?; }
		if self.is_bridge()       { f.write_str("bridge ")?; }
		if self.is_interface()    { f.write_str("interface ")?; }
		if self.is_abstract()     { f.write_str("abstract ")?; }
		if self.is_synthetic()    { f.write_str("synthetic ")?; }
		if self.is_enum()         { f.write_str("enum ")?; }
		f.write_str("}")
	}
}

impl From<u16> for AccessFlags {
	fn from(value: u16) -> Self {
		AccessFlags(value)
	}
}

impl From<AccessFlags> for u16 {
	fn from(value: AccessFlags) -> Self {
		value.0
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::access::{AccessFlags, AccessLevel, AccessModifier};

	#[test]
	fn levels() {
		assert_eq!(AccessFlags::new(0x0001).level(), AccessLevel::Public);
		assert_eq!(AccessFlags::new(0x0002).level(), AccessLevel::Private);
		assert_eq!(AccessFlags::new(0x0004).level(), AccessLevel::Protected);
		assert_eq!(AccessFlags::new(0x1008).level(), AccessLevel::Package);

		let mut levels = vec![AccessLevel::Public, AccessLevel::Private, AccessLevel::Protected, AccessLevel::Package];
		levels.sort();
		assert_eq!(levels, vec![AccessLevel::Private, AccessLevel::Package, AccessLevel::Protected, AccessLevel::Public]);
	}

	#[test]
	fn with_level_keeps_other_flags() {
		let flags = AccessFlags::new(AccessFlags::PRIVATE | AccessFlags::STATIC | AccessFlags::SYNTHETIC);
		let flags = flags.with_level(AccessLevel::Public);

		assert!(flags.is_public());
		assert!(!flags.is_private());
		assert!(flags.is_static());
		assert!(flags.is_synthetic());
		assert_eq!(format!("{flags:?}"), "AccessFlags { public static synthetic }");
	}

	#[test]
	fn modifiers() -> anyhow::Result<()> {
		let flags = AccessFlags::new(AccessFlags::PUBLIC | AccessFlags::FINAL);

		assert_eq!(flags.with_modifier(AccessModifier::Unchanged), flags);
		assert_eq!(flags.with_modifier(AccessModifier::Private).level(), AccessLevel::Private);
		assert!(flags.with_modifier(AccessModifier::Private).is_final());

		assert_eq!(AccessModifier::parse("ACC:PROTECTED")?, AccessModifier::Protected);
		assert_eq!(AccessModifier::parse(AccessModifier::Public.as_str())?, AccessModifier::Public);
		assert!(AccessModifier::parse("ACC:FRIENDLY").is_err());
		assert!(AccessModifier::parse("PUBLIC").is_err());
		Ok(())
	}
}
