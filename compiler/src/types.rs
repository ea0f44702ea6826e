use std::fmt;

use serde::Serialize;

/// Name of a declared type: `[A-Z][A-Za-z0-9_]*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeIdentifier {
    pub id: String,
}

impl TypeIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        TypeIdentifier { id: id.into() }
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Field, package and import segment name: `[A-Za-z_][A-Za-z0-9_]*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier {
    pub id: String,
}

impl Identifier {
    pub fn new(id: impl Into<String>) -> Self {
        Identifier { id: id.into() }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Int8,
    Int16,
    Int32,
    String,
    Boolean,
    Float,
    #[serde(rename = "GUID")]
    Guid,
    DateTime,
    CustomType(TypeIdentifier),
    List(Box<FieldType>),
    Map(Box<FieldType>, Box<FieldType>),
}

impl FieldType {
    pub fn list(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }

    pub fn map(key: FieldType, value: FieldType) -> Self {
        FieldType::Map(Box::new(key), Box::new(value))
    }

    pub fn custom(id: impl Into<String>) -> Self {
        FieldType::CustomType(TypeIdentifier::new(id))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int8 => f.write_str("Int8"),
            FieldType::Int16 => f.write_str("Int16"),
            FieldType::Int32 => f.write_str("Int32"),
            FieldType::String => f.write_str("String"),
            FieldType::Boolean => f.write_str("Boolean"),
            FieldType::Float => f.write_str("Float"),
            FieldType::Guid => f.write_str("GUID"),
            FieldType::DateTime => f.write_str("DateTime"),
            FieldType::CustomType(id) => write!(f, "{}", id),
            FieldType::List(item) => write!(f, "List<{}>", item),
            FieldType::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub id:         Identifier,
    pub field_type: FieldType,
    pub tag:        i32,
}

impl Field {
    pub fn new(id: impl Into<String>, field_type: FieldType, tag: i32) -> Self {
        Field { id: Identifier::new(id), field_type, tag }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Data {
    pub id:     TypeIdentifier,
    pub fields: Vec<Field>,
}

/// One case of a [`Choice`]. A case without a body is a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub id:   TypeIdentifier,
    pub body: Option<Vec<Field>>,
    pub tag:  i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id:      TypeIdentifier,
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumerationItem {
    pub id:  String,
    pub tag: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enumeration {
    pub id:      TypeIdentifier,
    pub options: Vec<EnumerationItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub text:          String,
    pub request_type:  TypeIdentifier,
    pub response_type: Option<TypeIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Construct {
    DataObject(Data),
    ChoiceObject(Choice),
    Enumeration(Enumeration),
    TopicObject(Topic),
}

impl Construct {
    /// The type this construct declares. Topics declare none.
    pub fn type_identifier(&self) -> Option<&TypeIdentifier> {
        match self {
            Construct::DataObject(data) => Some(&data.id),
            Construct::ChoiceObject(choice) => Some(&choice.id),
            Construct::Enumeration(enumeration) => Some(&enumeration.id),
            Construct::TopicObject(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    pub package_identifier: Package,
    pub imports:            Vec<Import>,
    pub constructs:         Vec<Construct>,
}

/// A parsed source file together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileItem {
    pub name: String,
    pub path: String,
    pub file: File,
}

/// A file that failed to parse. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileParseFailure {
    pub name:    String,
    pub path:    String,
    pub line:    usize,
    pub column:  usize,
    pub message: String,
}

impl fmt::Display for FileParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at line {}, column {}: {}", self.name, self.path, self.line, self.column, self.message)
    }
}

/// A file that parsed but failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidFileItem {
    pub name:  String,
    pub path:  String,
    pub error: String,
}

impl fmt::Display for InvalidFileItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.path, self.error)
    }
}
