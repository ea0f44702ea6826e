use crate::{
    combinator::{
        choice, delimited2, delimited3, delimited4, delimited5, delimited6, one_or_more, optional,
        p_char, p_string, repeat_until, separated_by, zero_or_more, Parser,
    },
    lexer::{delimiters, p_identifier, p_int, p_name, p_quoted_string, p_type_identifier},
    state::{ParserError, State, Success},
    types::{
        Choice, ChoiceOption, Construct, Data, Enumeration, EnumerationItem, Field, FieldType, File, Import, Package,
        Topic,
    },
    utils::first_line,
};

/// `List`/`Map` may nest this many levels deep.
pub const MAX_TYPE_NESTING: usize = 2;

pub use crate::state::NESTING_ERROR;

const PRIMITIVE_TYPES: [(&str, FieldType); 8] = [
    ("Int8", FieldType::Int8),
    ("Int16", FieldType::Int16),
    ("Int32", FieldType::Int32),
    ("String", FieldType::String),
    ("Boolean", FieldType::Boolean),
    ("Float", FieldType::Float),
    ("GUID", FieldType::Guid),
    ("DateTime", FieldType::DateTime),
];

fn p_primitive_type() -> Parser<FieldType> {
    choice(
        PRIMITIVE_TYPES
            .iter()
            .map(|(keyword, ty)| p_string(keyword).to(ty.clone()))
            .collect(),
    )
    .label("primitive-type")
}

/// `tag = <int>`
pub fn p_tag() -> Parser<i32> {
    delimited3(&delimiters(), p_string("tag"), p_char('='), p_int()).map(|(_, _, tag)| tag)
}

fn p_key_value_pair(level: usize) -> Parser<(FieldType, FieldType)> {
    delimited3(&delimiters(), p_primitive_type(), p_char(','), p_field_type(level + 1))
        .map(|(key, _, value)| (key, value))
}

/// Matches `opener` and then fails with the nesting error at its start.
fn p_too_deep(opener: &str) -> Parser<FieldType> {
    let opener = p_string(opener);
    Parser::new(move |start| {
        opener.run(start)?;
        Err(ParserError::too_deeply_nested(&start))
    })
}

pub fn p_map(level: usize) -> Parser<FieldType> {
    if level >= MAX_TYPE_NESTING {
        return p_too_deep("Map<");
    }
    delimited3(&delimiters(), p_string("Map<"), p_key_value_pair(level), p_string(">"))
        .map(|(_, (key, value), _)| FieldType::map(key, value))
}

pub fn p_list(level: usize) -> Parser<FieldType> {
    if level >= MAX_TYPE_NESTING {
        return p_too_deep("List<");
    }
    delimited3(&delimiters(), p_string("List<"), p_field_type(level + 1), p_string(">"))
        .map(|(_, item, _)| FieldType::list(item))
}

/// A user type name. Custom types take no parameters, so a name followed by
/// `<` is rejected at its start; a broken `List<...>` is never read back as a
/// type called `List`.
fn p_custom_type() -> Parser<FieldType> {
    let name = p_type_identifier();
    let opens = delimiters().andr(p_char('<'));
    Parser::new(move |start| {
        let Success { value, state } = name.run(start)?;
        match opens.run(state) {
            Ok(_) => Err(ParserError::syntax("custom-type", &start)),
            Err(_) => Ok(Success::new(FieldType::CustomType(value), state)),
        }
    })
}

/// A field type at nesting `level`; callers start at 0.
pub fn p_field_type(level: usize) -> Parser<FieldType> {
    p_primitive_type()
        .or(p_list(level))
        .or(p_map(level))
        .or(p_custom_type())
        .label("field-type")
}

/// `name : Type , tag = 1 ;`
pub fn p_field() -> Parser<Field> {
    delimited6(
        &delimiters(),
        p_identifier(),
        p_char(':'),
        p_field_type(0),
        p_char(','),
        p_tag(),
        p_char(';'),
    )
    .map(|(id, _, field_type, _, tag, _)| Field { id, field_type, tag })
    .label("field-definition")
}

/// `{ field* }`
pub fn p_list_of_fields() -> Parser<Vec<Field>> {
    delimited2(&delimiters(), p_char('{'), repeat_until(p_field().andl(delimiters()), p_char('}')))
        .map(|(_, fields)| fields)
}

pub fn p_data() -> Parser<Data> {
    let header = delimited2(&delimiters(), p_string("data"), p_type_identifier());
    delimited2(&delimiters(), header, p_list_of_fields())
        .map(|((_, id), fields)| Data { id, fields })
        .label("data-definition")
}

/// The optional `{ field* }` of an option. A body that opens but breaks is
/// an error, not a missing body.
fn p_option_body() -> Parser<Option<Vec<Field>>> {
    let fields = p_list_of_fields();
    Parser::new(move |state| match fields.run(state) {
        Ok(Success { value, state }) => Ok(Success::new(Some(value), state)),
        Err(err) if err.is_past(&state) => Err(err),
        Err(_) => Ok(Success::new(None, state)),
    })
}

/// `option Name { field* }? , tag = 1 ;`
pub fn p_option() -> Parser<ChoiceOption> {
    delimited6(
        &delimiters(),
        p_string("option"),
        p_type_identifier(),
        p_option_body(),
        p_char(','),
        p_tag(),
        p_char(';'),
    )
    .map(|(_, id, body, _, tag, _)| ChoiceOption { id, body, tag })
    .label("option-definition")
}

fn p_choice_body() -> Parser<Vec<ChoiceOption>> {
    delimited2(&delimiters(), p_char('{'), repeat_until(p_option().andl(delimiters()), p_char('}')))
        .map(|(_, options)| options)
}

pub fn p_choice() -> Parser<Choice> {
    let header = delimited2(&delimiters(), p_string("choice"), p_type_identifier()).map(|(_, id)| id);
    delimited2(&delimiters(), header, p_choice_body())
        .map(|(id, options)| Choice { id, options })
        .label("choice-definition")
}

/// `NAME = 1` with an optional trailing `;` or `,`.
pub fn p_enumeration_item() -> Parser<EnumerationItem> {
    let terminal = optional(p_char(';').or(p_char(',')));
    delimiters()
        .andr(delimited4(&delimiters(), p_name().label("enum-item"), p_char('='), p_int(), terminal))
        .map(|(id, _, tag, _)| EnumerationItem { id, tag })
}

pub fn p_enumeration() -> Parser<Enumeration> {
    delimited5(
        &delimiters(),
        p_string("enum"),
        p_type_identifier(),
        p_char('{'),
        one_or_more(p_enumeration_item()),
        p_char('}'),
    )
    .map(|(_, id, _, options, _)| Enumeration { id, options })
    .label("enumeration-definition")
}

/// `topic "text" , request = Type (, response = Type)?`
pub fn p_topic() -> Parser<Topic> {
    let request = delimited4(&delimiters(), p_char(','), p_string("request"), p_char('='), p_type_identifier())
        .map(|(_, _, _, id)| id);
    let response = delimited4(&delimiters(), p_char(','), p_string("response"), p_char('='), p_type_identifier())
        .map(|(_, _, _, id)| id);
    delimited4(&delimiters(), p_string("topic"), p_quoted_string(), request, optional(response))
        .map(|(_, text, request_type, response_type)| Topic { text, request_type, response_type })
        .label("topic-definition")
}

/// `a.b.c` flattened to its text.
fn p_dotted_path() -> Parser<String> {
    separated_by(p_identifier(), p_char('.')).map(|segments| {
        segments
            .iter()
            .map(|segment| segment.id.as_str())
            .collect::<Vec<_>>()
            .join(".")
    })
}

pub fn p_package() -> Parser<Package> {
    delimiters()
        .andr(p_string("package"))
        .andr(delimiters())
        .andr(p_dotted_path())
        .andl(delimiters())
        .map(|path| Package { path })
        .label("package")
}

pub fn p_import() -> Parser<Import> {
    delimited2(&delimiters(), p_string("import"), p_dotted_path())
        .map(|(_, text)| Import { text })
        .label("import")
}

pub fn p_imports() -> Parser<Vec<Import>> {
    zero_or_more(delimiters().andr(p_import()).andl(delimiters()))
}

pub fn p_construct() -> Parser<Construct> {
    let construct = choice(vec![
        p_data().map(Construct::DataObject),
        p_enumeration().map(Construct::Enumeration),
        p_choice().map(Construct::ChoiceObject),
        p_topic().map(Construct::TopicObject),
    ]);
    delimiters().andr(construct).andl(delimiters())
}

pub fn p_constructs() -> Parser<Vec<Construct>> {
    zero_or_more(p_construct())
}

/// A whole file. This does not check that the input was fully consumed;
/// use [`parse_file`] for that.
pub fn p_file() -> Parser<File> {
    delimited3(&delimiters(), p_package(), p_imports(), p_constructs())
        .map(|(package_identifier, imports, constructs)| File { package_identifier, imports, constructs })
}

/// Why a file could not be parsed. Positions are 0-based, as in [`State`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    /// The grammar itself failed.
    Parser(ParserError),
    /// A prefix parsed but text remains that no construct even starts to
    /// match.
    Unparsed { line: usize, col: usize, remainder: String },
}

/// Parses `text` as one IDL file, requiring the entire input to be consumed.
///
/// When text remains, the construct that stopped the file is parsed again so
/// that an error inside it is reported where it happened.
pub fn parse_file(text: &str) -> Result<File, FileError> {
    let Success { value, state } = p_file().run(State::new(text)).map_err(FileError::Parser)?;
    if state.at_end() {
        return Ok(value);
    }
    if let Err(err) = p_construct().run(state) {
        if err.is_past(&state) {
            return Err(FileError::Parser(err));
        }
    }
    Err(FileError::Unparsed {
        line:      state.line,
        col:       state.col,
        remainder: first_line(state.remaining()).to_string(),
    })
}
