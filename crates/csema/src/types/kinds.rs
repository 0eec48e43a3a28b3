//! Scalar attributes of C types: base kinds, signedness, storage classes

use std::fmt;

/// Arithmetic and void base types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    LongDouble,
    LongLong,
}

impl BasicKind {
    /// C keyword spelling
    pub fn as_str(self) -> &'static str {
        match self {
            BasicKind::Void => "void",
            BasicKind::Char => "char",
            BasicKind::Short => "short",
            BasicKind::Int => "int",
            BasicKind::Long => "long",
            BasicKind::Float => "float",
            BasicKind::Double => "double",
            BasicKind::LongDouble => "long double",
            BasicKind::LongLong => "long long",
        }
    }

    /// Whether `signed`/`unsigned` may be applied to this kind
    pub fn accepts_sign(self) -> bool {
        matches!(
            self,
            BasicKind::Char | BasicKind::Short | BasicKind::Int | BasicKind::Long | BasicKind::LongLong
        )
    }

    /// Kind obtained by writing both specifiers in one declaration
    /// (`long int`, `long long`, `long double`)
    pub fn combine(self, other: BasicKind) -> Option<BasicKind> {
        use BasicKind::*;
        match (self, other) {
            (Short, Int) | (Int, Short) => Some(Short),
            (Long, Int) | (Int, Long) => Some(Long),
            (Long, Long) => Some(LongLong),
            (LongLong, Int) | (Int, LongLong) => Some(LongLong),
            (Long, Double) | (Double, Long) => Some(LongDouble),
            _ => None,
        }
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signedness specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sign {
    /// Neither `signed` nor `unsigned` was written
    #[default]
    None,
    Signed,
    Unsigned,
}

impl Sign {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Sign::None => None,
            Sign::Signed => Some("signed"),
            Sign::Unsigned => Some("unsigned"),
        }
    }

    /// Fold two sign specifiers of one declaration; `None` on conflict
    pub fn combine(self, other: Sign) -> Option<Sign> {
        match (self, other) {
            (Sign::None, s) | (s, Sign::None) => Some(s),
            _ => None,
        }
    }

    /// Signedness as it affects type identity. Plain `char` is a distinct
    /// type, every other integer kind is signed by default.
    pub(crate) fn effective(self, kind: BasicKind) -> Sign {
        match (self, kind) {
            (Sign::None, BasicKind::Char) => Sign::None,
            (Sign::None, k) if k.accepts_sign() => Sign::Signed,
            (s, _) => s,
        }
    }
}

/// Storage class of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageClass {
    /// No storage class was written; at file scope this is a definition
    #[default]
    Unspecified,
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

impl StorageClass {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            StorageClass::Unspecified => None,
            StorageClass::Typedef => Some("typedef"),
            StorageClass::Extern => Some("extern"),
            StorageClass::Static => Some("static"),
            StorageClass::Auto => Some("auto"),
            StorageClass::Register => Some("register"),
        }
    }

    /// Fold two storage-class specifiers written in one declaration.
    /// C allows at most one.
    pub fn combine_specifier(self, other: StorageClass) -> Option<StorageClass> {
        match (self, other) {
            (StorageClass::Unspecified, s) | (s, StorageClass::Unspecified) => Some(s),
            _ => None,
        }
    }

    /// Storage class of an entity declared first with `self` and again
    /// with `later`. `function` selects the rules for function designators,
    /// where an unspecified declaration keeps an earlier `static`.
    pub fn merge_declarations(self, later: StorageClass, function: bool) -> Option<StorageClass> {
        use StorageClass::*;
        match (self, later) {
            (Auto | Register, _) | (_, Auto | Register) => None,
            (a, b) if a == b => Some(a),
            (Extern, Unspecified) | (Unspecified, Extern) => Some(Unspecified),
            (Static, Unspecified | Extern) if function => Some(Static),
            _ => None,
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword().unwrap_or("default"))
    }
}

/// Which tag namespace keyword introduced an aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Struct,
    Union,
    Enum,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TagKind::Struct => "struct",
            TagKind::Union => "union",
            TagKind::Enum => "enum",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_combinations() {
        assert_eq!(BasicKind::Long.combine(BasicKind::Long), Some(BasicKind::LongLong));
        assert_eq!(BasicKind::Int.combine(BasicKind::Short), Some(BasicKind::Short));
        assert_eq!(BasicKind::Double.combine(BasicKind::Long), Some(BasicKind::LongDouble));
        assert_eq!(BasicKind::Int.combine(BasicKind::Int), None);
        assert_eq!(BasicKind::Char.combine(BasicKind::Float), None);
    }

    #[test]
    fn test_sign_combination() {
        assert_eq!(Sign::None.combine(Sign::Unsigned), Some(Sign::Unsigned));
        assert_eq!(Sign::Signed.combine(Sign::Unsigned), None);
        assert_eq!(Sign::Unsigned.combine(Sign::Unsigned), None);
        assert_eq!(Sign::None.effective(BasicKind::Int), Sign::Signed);
        assert_eq!(Sign::None.effective(BasicKind::Char), Sign::None);
    }

    #[test]
    fn test_storage_declaration_merge() {
        use StorageClass::*;
        assert_eq!(Extern.merge_declarations(Unspecified, false), Some(Unspecified));
        assert_eq!(Unspecified.merge_declarations(Extern, false), Some(Unspecified));
        assert_eq!(Static.merge_declarations(Extern, false), None);
        assert_eq!(Static.merge_declarations(Unspecified, false), None);
        assert_eq!(Static.merge_declarations(Unspecified, true), Some(Static));
        assert_eq!(Typedef.merge_declarations(Typedef, false), Some(Typedef));
        assert_eq!(Auto.merge_declarations(Auto, false), None);
    }

    #[test]
    fn test_storage_specifier_fold() {
        use StorageClass::*;
        assert_eq!(Unspecified.combine_specifier(Static), Some(Static));
        assert_eq!(Extern.combine_specifier(Static), None);
        assert_eq!(Static.to_string(), "static");
        assert_eq!(Unspecified.to_string(), "default");
    }
}
