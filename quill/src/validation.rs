//! Checking names given to entries.
//!
//! Problems are collected in a [`ValidationContext`] rather than returned one at a time, so that a rename can report
//! everything wrong with it at once.

use anyhow::{anyhow, Result};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("the name must not be empty")]
	EmptyName,
	#[error("illegal character {character:?} at position {index} in {name:?}")]
	IllegalIdentifier {
		name: String,
		/// Counted from one, like a user would count.
		index: usize,
		character: char,
	},
	#[error("{0:?} is a reserved word")]
	ReservedWord(String),
	#[error("class {0:?} is not in a package")]
	MissingPackage(String),
	#[error("the name {name:?} is already used in {parent}")]
	NonUniqueName {
		name: String,
		parent: String,
	},
}

#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
	errors: Vec<ValidationError>,
	warnings: Vec<ValidationError>,
}

impl ValidationContext {
	pub fn new() -> ValidationContext {
		ValidationContext::default()
	}

	pub fn raise(&mut self, error: ValidationError) {
		self.errors.push(error);
	}

	pub fn warn(&mut self, warning: ValidationError) {
		self.warnings.push(warning);
	}

	/// Returns `false` as soon as a single error was raised. Warnings don't count.
	pub fn can_proceed(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn errors(&self) -> &[ValidationError] {
		&self.errors
	}

	pub fn warnings(&self) -> &[ValidationError] {
		&self.warnings
	}

	/// Turns the first error into an [`anyhow::Error`], or returns the warnings if there wasn't any.
	pub fn into_result(self) -> Result<Vec<ValidationError>> {
		match self.errors.first() {
			Some(first) => {
				let count = self.errors.len();
				let error = anyhow!(first.clone());
				if count > 1 {
					Err(error.context(format!("{count} problems found, the first one is: {first}")))
				} else {
					Err(error)
				}
			},
			None => Ok(self.warnings),
		}
	}
}

const RESERVED_WORDS: [&str; 54] = [
	"abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const", "continue",
	"default", "do", "double", "else", "enum", "extends", "false", "final", "finally", "float", "for", "goto",
	"if", "implements", "import", "instanceof", "int", "interface", "long", "native", "new", "null", "package",
	"private", "protected", "public", "return", "short", "static", "strictfp", "super", "switch",
	"synchronized", "this", "throw", "throws", "transient", "true", "try", "void", "volatile", "while", "_",
];

/// Validates a class name. Top level classes are given with their package, like `com/example/Foo`, and must have
/// one. Inner classes are given by their inner name only.
pub fn validate_class_name(context: &mut ValidationContext, name: &str, is_inner: bool) {
	if is_inner {
		validate_identifier(context, name);
		return;
	}

	if name.is_empty() {
		context.raise(ValidationError::EmptyName);
		return;
	}

	for part in name.split('/') {
		validate_identifier(context, part);
	}

	if !name.contains('/') {
		context.raise(ValidationError::MissingPackage(name.to_owned()));
	}
}

/// Validates the name of a field, method or local variable, or a single part of a class name.
pub fn validate_identifier(context: &mut ValidationContext, name: &str) {
	if name.trim().is_empty() {
		context.raise(ValidationError::EmptyName);
		return;
	}

	if RESERVED_WORDS.contains(&name) {
		context.raise(ValidationError::ReservedWord(name.to_owned()));
		return;
	}

	for (index, character) in name.chars().enumerate() {
		let legal = if index == 0 {
			is_identifier_start(character)
		} else {
			is_identifier_part(character)
		};

		if !legal {
			context.raise(ValidationError::IllegalIdentifier {
				name: name.to_owned(),
				index: index + 1,
				character,
			});
			return;
		}
	}
}

fn is_identifier_start(c: char) -> bool {
	c.is_alphabetic() || c == '$' || c == '_'
}

fn is_identifier_part(c: char) -> bool {
	c.is_alphanumeric() || c == '$' || c == '_'
}
