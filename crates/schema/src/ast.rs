//! The schema IR: an ordered unit of records, each an ordered list of
//! typed fields.

/// The storable type kinds. `Named` references another record by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Char,
    Short,
    Int,
    Long,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Named(std::string::String),
}

impl TypeKind {
    /// Whether `signed` / `unsigned` may qualify this kind.
    pub fn accepts_sign(&self) -> bool {
        matches!(
            self,
            TypeKind::Char | TypeKind::Short | TypeKind::Int | TypeKind::Long
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Signedness {
    #[default]
    Unspecified,
    Signed,
    Unsigned,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Attribute {
    #[default]
    Scalar,
    Array,
    Pointer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub kind: TypeKind,
    pub sign: Signedness,
    pub attr: Attribute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unit {
    pub records: Vec<Record>,
}
