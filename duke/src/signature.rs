//! Generic signatures, as stored in the `Signature` attribute of classes, fields and methods.
//!
//! The only thing done with them here is renaming the classes they mention, which needs a real parser:
//! a type parameter named `LIST` or a type variable `TLIST;` must not be mistaken for a class name.

use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::Chars;
use anyhow::{anyhow, bail, Context, Result};

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Signature(String);

impl Signature {
	pub fn new(s: impl Into<String>) -> Signature {
		Signature(s.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Replaces every class mentioned in this signature using `f`, which gets internal names like `a/b/C$D`.
	///
	/// Inner classes written with the `.` suffix syntax are passed to `f` with their full name, and only their
	/// simple name is written back.
	///
	/// ```
	/// use duke::signature::Signature;
	///
	/// let signature = Signature::new("<LIST:La;>(TLIST;Ljava/util/List<+La;>;)La<TLIST;>.b;");
	/// let mapped = signature.map_class_names(|name| match name {
	///     "a" => "com/example/Foo".to_owned(),
	///     "a$b" => "com/example/Foo$Bar".to_owned(),
	///     x => x.to_owned(),
	/// }).unwrap();
	///
	/// assert_eq!(mapped.as_str(), "<LIST:Lcom/example/Foo;>(TLIST;Ljava/util/List<+Lcom/example/Foo;>;)Lcom/example/Foo<TLIST;>.Bar;");
	/// ```
	pub fn map_class_names(&self, f: impl FnMut(&str) -> String) -> Result<Signature> {
		let mut remapper = Remapper {
			chars: self.0.chars().peekable(),
			out: String::with_capacity(self.0.len()),
			f,
		};

		remapper.signature()
			.with_context(|| anyhow!("failed to remap signature {:?}", self.0))?;

		Ok(Signature(remapper.out))
	}
}

impl Display for Signature {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

struct Remapper<'a, F> {
	chars: Peekable<Chars<'a>>,
	out: String,
	f: F,
}

impl<F: FnMut(&str) -> String> Remapper<'_, F> {
	fn next(&mut self) -> Result<char> {
		self.chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of signature"))
	}

	fn peek(&mut self) -> Result<char> {
		self.chars.peek().copied().ok_or_else(|| anyhow!("unexpected abrupt ending of signature"))
	}

	fn expect(&mut self, expected: char) -> Result<()> {
		let char = self.next()?;
		if char != expected {
			bail!("expected {expected:?}, got {char:?}");
		}
		self.out.push(char);
		Ok(())
	}

	/// Reads until (excluding) one of the given chars.
	fn identifier(&mut self, terminators: &[char]) -> Result<String> {
		let mut s = String::new();
		while !terminators.contains(&self.peek()?) {
			s.push(self.next()?);
		}
		Ok(s)
	}

	fn signature(&mut self) -> Result<()> {
		if self.chars.peek() == Some(&'<') {
			self.type_parameters()?;
		}

		if self.chars.peek() == Some(&'(') {
			self.expect('(')?;
			while self.peek()? != ')' {
				self.java_type()?;
			}
			self.expect(')')?;

			if self.peek()? == 'V' {
				self.expect('V')?;
			} else {
				self.java_type()?;
			}

			while self.chars.peek() == Some(&'^') {
				self.expect('^')?;
				self.reference_type()?;
			}
		} else {
			// a field signature is a single reference type, a class signature is a list of them
			while self.chars.peek().is_some() {
				self.reference_type()?;
			}
		}

		if let Some(rest) = self.chars.peek() {
			bail!("unexpected trailing {rest:?}");
		}
		Ok(())
	}

	fn type_parameters(&mut self) -> Result<()> {
		self.expect('<')?;
		while self.peek()? != '>' {
			let name = self.identifier(&[':'])?;
			self.out.push_str(&name);

			while self.chars.peek() == Some(&':') {
				self.expect(':')?;
				if matches!(self.peek()?, 'L' | 'T' | '[') {
					self.reference_type()?;
				}
			}
		}
		self.expect('>')
	}

	fn java_type(&mut self) -> Result<()> {
		match self.peek()? {
			c @ ('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') => self.expect(c),
			_ => self.reference_type(),
		}
	}

	fn reference_type(&mut self) -> Result<()> {
		match self.peek()? {
			'L' => self.class_type(),
			'T' => {
				self.expect('T')?;
				let name = self.identifier(&[';'])?;
				self.out.push_str(&name);
				self.expect(';')
			},
			'[' => {
				self.expect('[')?;
				self.java_type()
			},
			c => bail!("unexpected {c:?} at the start of a reference type"),
		}
	}

	fn class_type(&mut self) -> Result<()> {
		self.expect('L')?;

		let mut full_name = self.identifier(&['<', '.', ';'])?;
		let mapped = (self.f)(&full_name);
		self.out.push_str(&mapped);

		if self.peek()? == '<' {
			self.type_arguments()?;
		}

		while self.peek()? == '.' {
			self.expect('.')?;
			let inner = self.identifier(&['<', '.', ';'])?;
			full_name.push('$');
			full_name.push_str(&inner);

			let mapped = (self.f)(&full_name);
			let mapped_inner = mapped.rsplit_once('$').map_or(mapped.as_str(), |(_, inner)| inner);
			self.out.push_str(mapped_inner);

			if self.peek()? == '<' {
				self.type_arguments()?;
			}
		}

		self.expect(';')
	}

	fn type_arguments(&mut self) -> Result<()> {
		self.expect('<')?;
		while self.peek()? != '>' {
			match self.peek()? {
				'*' => self.expect('*')?,
				c @ ('+' | '-') => {
					self.expect(c)?;
					self.reference_type()?;
				},
				_ => self.reference_type()?,
			}
		}
		self.expect('>')
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::signature::Signature;

	#[test]
	fn class_signature() -> anyhow::Result<()> {
		let signature = Signature::new("<T:Ljava/lang/Object;U::Ljava/lang/Comparable<TU;>;>La<TT;>;Lb;");
		let mapped = signature.map_class_names(|name| name.replace('a', "x").replace('b', "y"))?;
		assert_eq!(mapped.as_str(), "<T:Ljxvx/lxng/Oyject;U::Ljxvx/lxng/Compxrxyle<TU;>;>Lx<TT;>;Ly;");
		Ok(())
	}

	#[test]
	fn field_signature_with_wildcards() -> anyhow::Result<()> {
		let signature = Signature::new("Ljava/util/Map<*[La;-TK;>;");
		let mapped = signature.map_class_names(|name| if name == "a" { "b".to_owned() } else { name.to_owned() })?;
		assert_eq!(mapped.as_str(), "Ljava/util/Map<*[Lb;-TK;>;");
		Ok(())
	}

	#[test]
	fn broken_signatures() {
		assert!(Signature::new("La").map_class_names(str::to_owned).is_err());
		assert!(Signature::new("(La;").map_class_names(str::to_owned).is_err());
		assert!(Signature::new("Q").map_class_names(str::to_owned).is_err());
	}
}
