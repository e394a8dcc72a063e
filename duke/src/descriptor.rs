use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::Chars;
use anyhow::{anyhow, bail, Context, Result};

/// Represents a type.
///
/// In case of an array, use the [`Type::Array`] variant.
///
/// ```
/// use duke::descriptor::{ArrayType, Type};
///
/// // the type of a java `int`
/// let int_type = Type::I;
///
/// // the type of a java `int[][]`
/// let int_array_type = Type::Array(2, ArrayType::I);
///
/// assert_ne!(int_type, int_array_type);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Type {
	/// A `byte`. In rust, this is a `i8`.
	B,
	/// A `char`.
	C,
	/// A `double`. In rust, this is a `f64`.
	D,
	/// A `float`. In rust, this is a `f32`.
	F,
	/// An `int`. In rust, this is a `i32`.
	I,
	/// A `long`. In rust, this is a `i64`.
	J,
	/// A `short`. In rust, this is a `i16`.
	S,
	/// A `boolean`. In rust, this is a `bool`.
	Z,
	/// An instance of the class with the given internal name.
	Object(String),
	/// An array type, represented by the dimension and the inner [`ArrayType`].
	Array(u8, ArrayType),
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ArrayType {
	B,
	C,
	D,
	F,
	I,
	J,
	S,
	Z,
	Object(String),
}

impl Type {
	/// The number of local variable slots a value of this type takes up.
	pub fn size(&self) -> usize {
		match self {
			Type::D | Type::J => 2,
			_ => 1,
		}
	}

	/// The class this type mentions, looking through arrays.
	pub fn class_name(&self) -> Option<&str> {
		match self {
			Type::Object(name) | Type::Array(_, ArrayType::Object(name)) => Some(name),
			_ => None,
		}
	}
}

// The grammar for descriptors is:
//   FieldDescriptor:
//     FieldType
//
//   MethodDescriptor:
//     "(" FieldType* ")" ReturnDescriptor
//
//   ReturnDescriptor:
//     FieldType | "V"
//
//   FieldType:
//     "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" |
//     "L" ClassName ";" |
//     "[" FieldType
fn read_field_type(chars: &mut Peekable<Chars>) -> Result<Type> {
	let mut array_dimension: u8 = 0;
	while chars.next_if_eq(&'[').is_some() {
		array_dimension = array_dimension.checked_add(1)
			.context("array dimension of descriptor doesn't fit into a byte")?;
	}

	let char = chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of descriptor"))?;
	let array_type = match char {
		'B' => ArrayType::B,
		'C' => ArrayType::C,
		'D' => ArrayType::D,
		'F' => ArrayType::F,
		'I' => ArrayType::I,
		'J' => ArrayType::J,
		'S' => ArrayType::S,
		'Z' => ArrayType::Z,
		'L' => {
			let mut s = String::new();

			let mut char = chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of descriptor"))?;
			while char != ';' {
				s.push(char);

				char = chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of descriptor"))?;
			}

			if s.is_empty() {
				bail!("empty class name in descriptor");
			}

			ArrayType::Object(s)
		},
		x => bail!("unexpected char {x:?} in descriptor"),
	};

	Ok(if array_dimension == 0 {
		match array_type {
			ArrayType::B => Type::B,
			ArrayType::C => Type::C,
			ArrayType::D => Type::D,
			ArrayType::F => Type::F,
			ArrayType::I => Type::I,
			ArrayType::J => Type::J,
			ArrayType::S => Type::S,
			ArrayType::Z => Type::Z,
			ArrayType::Object(name) => Type::Object(name),
		}
	} else {
		Type::Array(array_dimension, array_type)
	})
}

fn write_field_type(t: &Type, s: &mut String) {
	fn write_array_type(t: &ArrayType, s: &mut String) {
		match t {
			ArrayType::B => s.push('B'),
			ArrayType::C => s.push('C'),
			ArrayType::D => s.push('D'),
			ArrayType::F => s.push('F'),
			ArrayType::I => s.push('I'),
			ArrayType::J => s.push('J'),
			ArrayType::S => s.push('S'),
			ArrayType::Z => s.push('Z'),
			ArrayType::Object(class_name) => {
				s.push('L');
				s.push_str(class_name);
				s.push(';');
			},
		}
	}

	match t {
		Type::B => s.push('B'),
		Type::C => s.push('C'),
		Type::D => s.push('D'),
		Type::F => s.push('F'),
		Type::I => s.push('I'),
		Type::J => s.push('J'),
		Type::S => s.push('S'),
		Type::Z => s.push('Z'),
		Type::Object(class_name) => {
			s.push('L');
			s.push_str(class_name);
			s.push(';');
		},
		Type::Array(dimension, array_type) => {
			for _ in 0..*dimension {
				s.push('[');
			}
			write_array_type(array_type, s);
		},
	}
}

/// Replaces every `L...;` class name in a descriptor using `f`.
///
/// This works on field and method descriptors alike, since a class name is always terminated by a `;`
/// and nothing else in a descriptor starts with an `L`.
fn map_class_names(descriptor: &str, mut f: impl FnMut(&str) -> String) -> String {
	let mut result = String::with_capacity(descriptor.len());
	let mut chars = descriptor.chars();

	while let Some(char) = chars.next() {
		result.push(char);
		if char == 'L' {
			let name: String = chars.by_ref().take_while(|&c| c != ';').collect();
			result.push_str(&f(&name));
			result.push(';');
		}
	}

	result
}

/// The descriptor of a field, like `Ljava/lang/String;` or `[I`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldDescriptor(String);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParsedFieldDescriptor(pub Type);

impl FieldDescriptor {
	/// Creates a field descriptor without checking it. Use [`FieldDescriptor::parse`] to check it.
	pub fn new(s: impl Into<String>) -> FieldDescriptor {
		FieldDescriptor(s.into())
	}

	pub fn from_class(class_name: &str) -> FieldDescriptor {
		FieldDescriptor(format!("L{class_name};"))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Attempts to parse a field descriptor.
	///
	/// ```
	/// use duke::descriptor::{ArrayType, FieldDescriptor, ParsedFieldDescriptor, Type};
	///
	/// let desc = FieldDescriptor::new("[[Ljava/lang/String;");
	/// assert_eq!(desc.parse().unwrap(), ParsedFieldDescriptor(Type::Array(2, ArrayType::Object("java/lang/String".to_owned()))));
	///
	/// assert!(FieldDescriptor::new("V").parse().is_err());
	/// assert!(FieldDescriptor::new("II").parse().is_err());
	/// ```
	pub fn parse(&self) -> Result<ParsedFieldDescriptor> {
		let mut chars = self.0.chars().peekable();

		let desc = read_field_type(&mut chars)
			.with_context(|| anyhow!("failed to read field descriptor {self:?}"))?;

		if chars.peek().is_some() {
			bail!("expected end of field descriptor {self:?}, got {:?} remaining", chars.collect::<String>());
		}

		Ok(ParsedFieldDescriptor(desc))
	}

	/// Replaces every class name mentioned in this descriptor.
	pub fn map_class_names(&self, f: impl FnMut(&str) -> String) -> FieldDescriptor {
		FieldDescriptor(map_class_names(&self.0, f))
	}
}

impl ParsedFieldDescriptor {
	pub fn write(&self) -> FieldDescriptor {
		let mut s = String::new();
		write_field_type(&self.0, &mut s);
		FieldDescriptor(s)
	}
}

/// The descriptor of a method, like `(ILjava/lang/Object;)V`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MethodDescriptor(String);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParsedMethodDescriptor {
	pub parameter_descriptors: Vec<Type>,
	/// The return type, [`None`] for `void`.
	pub return_descriptor: Option<Type>,
}

impl MethodDescriptor {
	/// Creates a method descriptor without checking it. Use [`MethodDescriptor::parse`] to check it.
	pub fn new(s: impl Into<String>) -> MethodDescriptor {
		MethodDescriptor(s.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The part between the parentheses. Two methods with the same arguments can't coexist in java source.
	pub fn arguments(&self) -> &str {
		self.0.strip_prefix('(')
			.and_then(|rest| rest.split_once(')'))
			.map_or(self.0.as_str(), |(arguments, _)| arguments)
	}

	/// Attempts to parse a method descriptor.
	///
	/// ```
	/// use duke::descriptor::{MethodDescriptor, Type};
	///
	/// let desc = MethodDescriptor::new("(IJLjava/lang/Object;)V").parse().unwrap();
	/// assert_eq!(desc.parameter_descriptors, vec![Type::I, Type::J, Type::Object("java/lang/Object".to_owned())]);
	/// assert_eq!(desc.return_descriptor, None);
	/// ```
	pub fn parse(&self) -> Result<ParsedMethodDescriptor> {
		let mut chars = self.0.chars().peekable();

		if chars.next_if_eq(&'(').is_none() {
			bail!("method descriptor {self:?} doesn't start with '('");
		}

		let mut parameter_descriptors = Vec::new();
		loop {
			if chars.next_if_eq(&')').is_some() {
				break;
			}

			let descriptor = read_field_type(&mut chars)
				.with_context(|| anyhow!("failed to read parameter descriptor of {self:?}"))?;
			parameter_descriptors.push(descriptor);
		}

		let return_descriptor = if chars.next_if_eq(&'V').is_some() {
			None
		} else {
			let descriptor = read_field_type(&mut chars)
				.with_context(|| anyhow!("failed to read return descriptor of {self:?}"))?;

			Some(descriptor)
		};

		if chars.peek().is_some() {
			bail!("expected end of method descriptor {self:?}, got {:?} remaining", chars.collect::<String>());
		}

		Ok(ParsedMethodDescriptor {
			parameter_descriptors,
			return_descriptor,
		})
	}

	/// Returns the size of all arguments, not counting any implicit `this`.
	/// Doubles and longs count two instead of one.
	pub fn arguments_size(&self) -> Result<usize> {
		Ok(self.parse()?.parameter_descriptors.iter().map(Type::size).sum())
	}

	/// Replaces every class name mentioned in this descriptor.
	pub fn map_class_names(&self, f: impl FnMut(&str) -> String) -> MethodDescriptor {
		MethodDescriptor(map_class_names(&self.0, f))
	}
}

impl ParsedMethodDescriptor {
	pub fn write(&self) -> MethodDescriptor {
		let mut s = String::new();
		s.push('(');
		for parameter_descriptor in &self.parameter_descriptors {
			write_field_type(parameter_descriptor, &mut s);
		}
		s.push(')');
		if let Some(return_descriptor) = &self.return_descriptor {
			write_field_type(return_descriptor, &mut s);
		} else {
			s.push('V');
		}
		MethodDescriptor(s)
	}
}

impl Display for FieldDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl Display for MethodDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for FieldDescriptor {
	fn from(value: &str) -> Self {
		FieldDescriptor::new(value)
	}
}

impl From<&str> for MethodDescriptor {
	fn from(value: &str) -> Self {
		MethodDescriptor::new(value)
	}
}
