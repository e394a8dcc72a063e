//! Checks for the names the JVM accepts, see JVMS 4.2.

/// Checks that `s` is an unqualified name: non-empty and not containing any of `.`, `;`, `[` or `/`.
pub fn is_valid_unqualified_name(s: &str) -> bool {
	!s.is_empty() && !s.contains(['.', ';', '[', '/'])
}

/// Checks a field name, which is an unqualified name.
pub fn is_valid_field_name(s: &str) -> bool {
	is_valid_unqualified_name(s)
}

/// Checks a method name: an unqualified name that doesn't contain `<` or `>`, unless it's `<init>` or `<clinit>`.
pub fn is_valid_method_name(s: &str) -> bool {
	s == "<init>" || s == "<clinit>" || (is_valid_unqualified_name(s) && !s.contains(['<', '>']))
}

/// Checks a class name that isn't an array: `/` separated non-empty unqualified names.
pub fn is_valid_obj_class_name(s: &str) -> bool {
	!s.is_empty() && s.split('/').all(is_valid_unqualified_name)
}

/// Checks an array class name, which is an array field descriptor like `[[I` or `[Ljava/lang/Object;`.
pub fn is_valid_arr_class_name(s: &str) -> bool {
	let element = s.trim_start_matches('[');
	let dimension = s.len() - element.len();

	(1..=255).contains(&dimension) && match element {
		"B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" => true,
		_ => element.strip_prefix('L')
			.and_then(|x| x.strip_suffix(';'))
			.is_some_and(is_valid_obj_class_name),
	}
}

/// Checks a class name, which is either an array class name or an object class name.
pub fn is_valid_class_name(s: &str) -> bool {
	if s.starts_with('[') {
		is_valid_arr_class_name(s)
	} else {
		is_valid_obj_class_name(s)
	}
}
