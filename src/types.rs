// Type tags for the expression language. Checked once at parse time.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Null,
    Number,
    String,
    Boolean,
    Object,
    Array,
    Value,                   // top type: anything a feature property can hold
}

impl Type {
    pub fn name(self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Number => "number",
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Object => "object",
            Type::Array => "array",
            Type::Value => "value",
        }
    }

    /// Primitive tags a `value`-typed child can be narrowed to with a runtime assertion.
    pub fn is_assertable(self) -> bool {
        matches!(self, Type::Number | Type::String | Type::Boolean)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the mismatch message when `found` cannot stand where `expected` is required.
pub fn check_subtype(expected: Type, found: Type) -> Option<String> {
    if expected == Type::Value || expected == found {
        return None;
    }
    Some(format!("Expected {expected} but found {found} instead."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_accepts_everything() {
        for t in [Type::Null, Type::Number, Type::String, Type::Boolean, Type::Object, Type::Array, Type::Value] {
            assert_eq!(check_subtype(Type::Value, t), None);
        }
    }

    #[test]
    fn mismatch_message_names_both_types() {
        assert_eq!(
            check_subtype(Type::String, Type::Number).as_deref(),
            Some("Expected string but found number instead."),
        );
        assert_eq!(check_subtype(Type::Number, Type::Number), None);
    }
}
