use std::{
    collections::{HashMap, HashSet},
    fmt,
    hash::Hash,
};

use thiserror::Error;

use crate::{
    types::{Construct, Field, File, FileItem, Identifier, InvalidFileItem, TypeIdentifier},
    utils::quote,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("The type(s) {} are defined more than once", quote_all(.ids))]
    DuplicateTypeIdentifiers { ids: Vec<TypeIdentifier> },

    #[error("The field(s) {} are used more than once in {}", quote_all(.ids), quote(.owner))]
    DuplicateFieldIdentifiers { owner: String, ids: Vec<Identifier> },

    #[error("The tag(s) {} are used more than once in {}", join(.tags), quote(.owner))]
    DuplicateTags { owner: String, tags: Vec<i32> },

    #[error("The option(s) {} are declared more than once in {}", quote_all(.ids), quote(.owner))]
    DuplicateOptionIdentifiers { owner: String, ids: Vec<TypeIdentifier> },

    #[error("The item(s) {} are declared more than once in {}", quote_all(.ids), quote(.owner))]
    DuplicateEnumerationItems { owner: String, ids: Vec<String> },

    #[error("The tag {tag} in {} must not be negative", quote(.owner))]
    NegativeTag { owner: String, tag: i32 },
}

/// All validation issues of one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name} ({path}): {}", join(.issues))]
pub struct FileValidationError {
    pub name:   String,
    pub path:   String,
    pub issues: Vec<ValidationIssue>,
}

/// A type declared by more than one file of the same package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDuplicate {
    pub package: String,
    pub id:      TypeIdentifier,
    pub paths:   Vec<String>,
}

impl fmt::Display for ProjectDuplicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The type {} in package {} is defined in {}",
            quote(&self.id.id),
            quote(&self.package),
            quote_all(&self.paths)
        )
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn quote_all<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| quote(&item.to_string())).collect::<Vec<_>>().join(", ")
}

/// Values occurring more than once, each reported once, in order of first
/// occurrence.
pub fn find_duplicates<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut order = Vec::new();
    for item in items {
        let count = counts.entry(item.clone()).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }
    order.into_iter().filter(|item| counts[item] > 1).collect()
}

fn check_fields(owner: &str, fields: &[Field], issues: &mut Vec<ValidationIssue>) {
    let ids = find_duplicates(fields.iter().map(|field| field.id.clone()));
    if !ids.is_empty() {
        issues.push(ValidationIssue::DuplicateFieldIdentifiers { owner: owner.to_string(), ids });
    }
    check_tags(owner, fields.iter().map(|field| field.tag), issues);
}

fn check_tags<I>(owner: &str, tags: I, issues: &mut Vec<ValidationIssue>)
where
    I: IntoIterator<Item = i32>,
{
    let tags: Vec<i32> = tags.into_iter().collect();
    for &tag in tags.iter().filter(|tag| **tag < 0) {
        issues.push(ValidationIssue::NegativeTag { owner: owner.to_string(), tag });
    }
    let duplicates = find_duplicates(tags);
    if !duplicates.is_empty() {
        issues.push(ValidationIssue::DuplicateTags { owner: owner.to_string(), tags: duplicates });
    }
}

/// Checks one file and returns every issue found. An empty result means the
/// file is valid.
pub fn verify_file(file: &File) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    // 1) Type identifiers are unique within the file
    let ids = find_duplicates(file.constructs.iter().filter_map(Construct::type_identifier).cloned());
    if !ids.is_empty() {
        issues.push(ValidationIssue::DuplicateTypeIdentifiers { ids });
    }

    // 2) Field ids and tags are unique within each body
    for construct in &file.constructs {
        match construct {
            Construct::DataObject(data) => check_fields(&data.id.id, &data.fields, &mut issues),
            Construct::ChoiceObject(choice) => {
                let owner = choice.id.id.as_str();
                let ids = find_duplicates(choice.options.iter().map(|option| option.id.clone()));
                if !ids.is_empty() {
                    issues.push(ValidationIssue::DuplicateOptionIdentifiers { owner: owner.to_string(), ids });
                }
                check_tags(owner, choice.options.iter().map(|option| option.tag), &mut issues);
                for option in &choice.options {
                    if let Some(body) = &option.body {
                        check_fields(&format!("{}.{}", owner, option.id), body, &mut issues);
                    }
                }
            }
            Construct::Enumeration(enumeration) => {
                let owner = enumeration.id.id.as_str();
                let ids = find_duplicates(enumeration.options.iter().map(|item| item.id.clone()));
                if !ids.is_empty() {
                    issues.push(ValidationIssue::DuplicateEnumerationItems { owner: owner.to_string(), ids });
                }
                check_tags(owner, enumeration.options.iter().map(|item| item.tag), &mut issues);
            }
            Construct::TopicObject(_) => {}
        }
    }

    issues
}

/// Returns the item unchanged when it is valid.
pub fn validate(item: FileItem) -> Result<FileItem, FileValidationError> {
    let issues = verify_file(&item.file);
    if issues.is_empty() {
        Ok(item)
    } else {
        Err(FileValidationError { name: item.name, path: item.path, issues })
    }
}

/// Splits per-file validation outcomes. Any failure makes the whole batch
/// fail with every invalid file listed.
pub fn validate_all<I>(results: I) -> Result<Vec<FileItem>, Vec<InvalidFileItem>>
where
    I: IntoIterator<Item = Result<FileItem, FileValidationError>>,
{
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for result in results {
        match result {
            Ok(item) => valid.push(item),
            Err(err) => invalid.push(InvalidFileItem {
                name:  err.name.clone(),
                path:  err.path.clone(),
                error: join(&err.issues),
            }),
        }
    }
    if invalid.is_empty() {
        Ok(valid)
    } else {
        Err(invalid)
    }
}

/// Cross-file check: a type may be declared only once per package.
pub fn check_project_uniqueness(items: &[FileItem]) -> Result<(), Vec<ProjectDuplicate>> {
    let mut declared: HashMap<(String, TypeIdentifier), Vec<String>> = HashMap::new();
    let mut order = Vec::new();
    for item in items {
        let package = &item.file.package_identifier.path;
        let mut seen_here = HashSet::new();
        for id in item.file.constructs.iter().filter_map(Construct::type_identifier) {
            // in-file duplicates are reported by `verify_file`
            if !seen_here.insert(id) {
                continue;
            }
            let key = (package.clone(), id.clone());
            let paths = declared.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                Vec::new()
            });
            paths.push(item.path.clone());
        }
    }

    let duplicates: Vec<ProjectDuplicate> = order
        .into_iter()
        .filter_map(|key| {
            let paths = declared.remove(&key)?;
            (paths.len() > 1).then(|| ProjectDuplicate { package: key.0, id: key.1, paths })
        })
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(duplicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Choice, ChoiceOption, Data, Enumeration, EnumerationItem, FieldType, Package, Topic};

    fn file(constructs: Vec<Construct>) -> File {
        File {
            package_identifier: Package { path: "a.b".into() },
            imports: vec![],
            constructs,
        }
    }

    fn data(id: &str, fields: Vec<Field>) -> Construct {
        Construct::DataObject(Data { id: TypeIdentifier::new(id), fields })
    }

    fn item(path: &str, constructs: Vec<Construct>) -> FileItem {
        FileItem { name: path.rsplit('/').next().unwrap_or(path).into(), path: path.into(), file: file(constructs) }
    }

    #[test]
    fn test_find_duplicates_keeps_first_occurrence_order() {
        assert_eq!(find_duplicates(vec![3, 1, 3, 2, 1, 3]), vec![3, 1]);
        assert!(find_duplicates(Vec::<i32>::new()).is_empty());
    }

    #[test]
    fn test_duplicate_type_identifiers() {
        let topic = Construct::TopicObject(Topic {
            text:          "x".into(),
            request_type:  TypeIdentifier::new("X"),
            response_type: None,
        });
        let f = file(vec![data("X", vec![]), topic, data("X", vec![]), data("Y", vec![])]);
        assert_eq!(
            verify_file(&f),
            vec![ValidationIssue::DuplicateTypeIdentifiers { ids: vec![TypeIdentifier::new("X")] }]
        );
    }

    #[test]
    fn test_duplicates_across_construct_kinds() {
        let enumeration = Construct::Enumeration(Enumeration {
            id:      TypeIdentifier::new("X"),
            options: vec![EnumerationItem { id: "A".into(), tag: 0 }],
        });
        let f = file(vec![data("X", vec![]), enumeration]);
        assert_eq!(verify_file(&f).len(), 1);
    }

    #[test]
    fn test_valid_file_passes_unchanged() {
        let valid = item(
            "api/user.idl",
            vec![data("User", vec![Field::new("id", FieldType::Guid, 1), Field::new("name", FieldType::String, 2)])],
        );
        assert_eq!(validate(valid.clone()), Ok(valid));
    }

    #[test]
    fn test_duplicate_fields_and_tags() {
        let f = file(vec![data(
            "User",
            vec![
                Field::new("id", FieldType::Guid, 1),
                Field::new("id", FieldType::String, 1),
                Field::new("age", FieldType::Int8, -2),
            ],
        )]);
        assert_eq!(
            verify_file(&f),
            vec![
                ValidationIssue::DuplicateFieldIdentifiers { owner: "User".into(), ids: vec![Identifier::new("id")] },
                ValidationIssue::NegativeTag { owner: "User".into(), tag: -2 },
                ValidationIssue::DuplicateTags { owner: "User".into(), tags: vec![1] },
            ]
        );
    }

    #[test]
    fn test_choice_checks() {
        let choice = Construct::ChoiceObject(Choice {
            id:      TypeIdentifier::new("Event"),
            options: vec![
                ChoiceOption {
                    id:   TypeIdentifier::new("Joined"),
                    body: Some(vec![Field::new("a", FieldType::Int8, 1), Field::new("b", FieldType::Int8, 1)]),
                    tag:  1,
                },
                ChoiceOption { id: TypeIdentifier::new("Joined"), body: None, tag: 1 },
            ],
        });
        let issues = verify_file(&file(vec![choice]));
        assert_eq!(
            issues,
            vec![
                ValidationIssue::DuplicateOptionIdentifiers {
                    owner: "Event".into(),
                    ids:   vec![TypeIdentifier::new("Joined")],
                },
                ValidationIssue::DuplicateTags { owner: "Event".into(), tags: vec![1] },
                ValidationIssue::DuplicateTags { owner: "Event.Joined".into(), tags: vec![1] },
            ]
        );
    }

    #[test]
    fn test_validate_reports_file() {
        let bad = item("api/dup.idl", vec![data("X", vec![]), data("X", vec![])]);
        let err = validate(bad).unwrap_err();
        assert_eq!(err.name, "dup.idl");
        assert_eq!(err.path, "api/dup.idl");
        assert_eq!(err.to_string(), "dup.idl (api/dup.idl): The type(s) \"X\" are defined more than once");
    }

    #[test]
    fn test_validate_all_batches_failures() {
        let good = item("good.idl", vec![data("A", vec![])]);
        let bad = item("bad.idl", vec![data("B", vec![]), data("B", vec![])]);
        let results = vec![validate(good.clone()), validate(bad)];
        let invalid = validate_all(results).unwrap_err();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].path, "bad.idl");

        assert_eq!(validate_all(vec![validate(good.clone())]), Ok(vec![good]));
    }

    #[test]
    fn test_project_uniqueness() {
        let one = item("one.idl", vec![data("A", vec![]), data("B", vec![])]);
        let two = item("two.idl", vec![data("A", vec![])]);
        assert_eq!(
            check_project_uniqueness(&[one.clone(), two]),
            Err(vec![ProjectDuplicate {
                package: "a.b".into(),
                id:      TypeIdentifier::new("A"),
                paths:   vec!["one.idl".into(), "two.idl".into()],
            }])
        );

        let mut other = item("other.idl", vec![data("A", vec![])]);
        other.file.package_identifier.path = "c.d".into();
        assert_eq!(check_project_uniqueness(&[one, other]), Ok(()));
    }
}
