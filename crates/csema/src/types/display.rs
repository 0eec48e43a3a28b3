//! Human-readable rendering of types
//!
//! Types read left to right, cdecl style: `static pointer to array of
//! unsigned char`. The storage class is printed once, in front.

use std::fmt;

use super::kinds::Sign;
use super::node::{Type, TypeNode};

impl Type {
    fn write_shape(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.node() {
            TypeNode::Abstract { sign, .. } => {
                write_sign(f, *sign)?;
                f.write_str("abstract")
            }
            TypeNode::Undeclared => f.write_str("undeclared"),
            TypeNode::Basic { kind, sign, .. } => {
                write_sign(f, *sign)?;
                write!(f, "{kind}")
            }
            TypeNode::Pointer(t) => {
                f.write_str("pointer to ")?;
                t.write_shape(f)
            }
            TypeNode::Array(t) => {
                f.write_str("array of ")?;
                t.write_shape(f)
            }
            TypeNode::Function(t) => {
                f.write_str("function returning ")?;
                t.write_shape(f)
            }
            // Members are not printed: they may lead back to this aggregate
            TypeNode::Aggregate { tag, body, .. } => match (body.name(), body.get()) {
                (Some(name), _) => write!(f, "{tag} {name}"),
                (None, Some(_)) => write!(f, "{tag} <anonymous>"),
                (None, None) => write!(f, "{tag}"),
            },
            TypeNode::Identifier { token, of } => write!(f, "{token}: {of}"),
            TypeNode::Label => f.write_str("label"),
        }
    }
}

fn write_sign(f: &mut fmt::Formatter<'_>, sign: Sign) -> fmt::Result {
    match sign.keyword() {
        Some(kw) => write!(f, "{kw} "),
        None => Ok(()),
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_identifier() {
            if let Some(kw) = self.storage_class().keyword() {
                write!(f, "{kw} ")?;
            }
        }
        self.write_shape(f)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;
    use crate::types::{BasicKind, StorageClass};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_rendering() {
        let t = Type::basic(BasicKind::Char, Sign::Unsigned, StorageClass::Static);
        assert_eq!(t.to_string(), "static unsigned char");
        assert_eq!(Type::from(BasicKind::LongDouble).to_string(), "long double");
        assert_eq!(Type::undeclared().to_string(), "undeclared");
    }

    #[test]
    fn test_derived_rendering() {
        let t = Type::pointer_to(Type::array_of(Type::basic(
            BasicKind::Int,
            Sign::None,
            StorageClass::Extern,
        )));
        assert_eq!(t.to_string(), "extern pointer to array of int");
        assert_eq!(
            Type::implicit_function().to_string(),
            "extern function returning int"
        );
    }

    #[test]
    fn test_identifier_rendering() {
        let id = Type::identifier(Token::synthetic("count"));
        id.set_abstract(&Type::basic(BasicKind::Long, Sign::Unsigned, StorageClass::Register));
        assert_eq!(id.to_string(), "count: register unsigned long");
        assert_eq!(format!("{id:?}"), "Type(count: register unsigned long)");
    }

    #[test]
    fn test_aggregate_rendering() {
        let s = Type::struct_tag();
        assert_eq!(s.to_string(), "struct <anonymous>");
        s.set_tag_name("point");
        assert_eq!(s.to_string(), "struct point");
        assert_eq!(Type::pointer_to(s).to_string(), "pointer to struct point");
    }
}
