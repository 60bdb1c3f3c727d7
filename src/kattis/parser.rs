//! Typed view of a Kattis `problem.yaml` and of per-group `test_group.yaml` files.
//!
//! Several fields of the format accept more than one shape (a string, a list, or a map keyed by
//! locale). Those are decoded by visitors that dispatch on the shape of the YAML node, so every
//! accepted shape ends up as an explicit enum variant.

use crate::errors::{ImportError, Result};
use indexmap::IndexMap;
use serde::de::{
    self, value::MapAccessDeserializer, DeserializeOwned, Deserializer, MapAccess, SeqAccess,
    Visitor,
};
use serde::Deserialize;
use std::fmt;

/// A YAML scalar of any type, kept as its text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scalar(pub String);

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a scalar")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Scalar, E> {
        Ok(Scalar(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Scalar, E> {
        Ok(Scalar(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Scalar, E> {
        Ok(Scalar(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Scalar, E> {
        Ok(Scalar(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Scalar, E> {
        Ok(Scalar(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Scalar, E> {
        Ok(Scalar(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Scalar, E> {
        Ok(Scalar::default())
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Scalar, E> {
        Ok(Scalar::default())
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// Free text given as a string, a list of strings, or a map from locale to string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextField {
    Scalar(String),
    List(Vec<String>),
    LocaleMap(IndexMap<String, String>),
}

impl Default for TextField {
    fn default() -> Self {
        TextField::Scalar(String::new())
    }
}

struct TextFieldVisitor;

impl<'de> Visitor<'de> for TextFieldVisitor {
    type Value = TextField;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, a sequence of strings or a map from locale to string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<TextField, E> {
        Ok(TextField::Scalar(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<TextField, E> {
        Ok(TextField::Scalar(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<TextField, E> {
        Ok(TextField::Scalar(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<TextField, E> {
        Ok(TextField::Scalar(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<TextField, E> {
        Ok(TextField::Scalar(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<TextField, E> {
        Ok(TextField::Scalar(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<TextField, E> {
        Ok(TextField::default())
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<TextField, E> {
        Ok(TextField::default())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<TextField, A::Error> {
        let mut list = Vec::new();
        while let Some(Scalar(item)) = seq.next_element()? {
            list.push(item);
        }
        Ok(TextField::List(list))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<TextField, A::Error> {
        let mut locales = IndexMap::new();
        while let Some((locale, Scalar(text))) = map.next_entry::<String, Scalar>()? {
            locales.insert(locale, text);
        }
        Ok(TextField::LocaleMap(locales))
    }
}

impl<'de> Deserialize<'de> for TextField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TextFieldVisitor)
    }
}

impl TextField {
    /// The value to show when no particular locale is asked for: the scalar, the first list
    /// entry, or the English entry of a locale map, falling back to its first entry.
    pub fn preferred(&self) -> Option<&str> {
        let preferred = match self {
            TextField::Scalar(text) => Some(text.as_str()),
            TextField::List(list) => list.first().map(String::as_str),
            TextField::LocaleMap(locales) => locales
                .get("en")
                .or_else(|| locales.values().next())
                .map(String::as_str),
        };
        preferred.filter(|text| !text.is_empty())
    }

    /// The entry of a locale map for `locale`.
    pub fn localized(&self, locale: &str) -> Option<&str> {
        match self {
            TextField::LocaleMap(locales) => locales
                .get(locale)
                .map(String::as_str)
                .filter(|text| !text.is_empty()),
            _ => None,
        }
    }

    /// Individual words: a scalar is split on whitespace, a list or map contributes its entries.
    pub fn values(&self) -> Vec<&str> {
        match self {
            TextField::Scalar(text) => text.split_whitespace().collect(),
            TextField::List(list) => list.iter().map(String::as_str).collect(),
            TextField::LocaleMap(locales) => locales.values().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.values()
            .into_iter()
            .any(|value| value.eq_ignore_ascii_case(word))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: Option<String>,
}

impl Person {
    /// Parses the short form `Full Name <email>`.
    fn parse(text: &str) -> Self {
        match text.trim().strip_suffix('>').and_then(|rest| rest.rsplit_once('<')) {
            Some((name, email)) => Person {
                name: name.trim().to_string(),
                email: Some(email.trim().to_string()),
            },
            None => Person {
                name: text.trim().to_string(),
                email: None,
            },
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct PersonFields {
    name: String,
    email: Option<String>,
}

struct PersonVisitor;

impl<'de> Visitor<'de> for PersonVisitor {
    type Value = Person;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a name or a mapping with a name")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Person, E> {
        Ok(Person::parse(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<Person, A::Error> {
        let fields = PersonFields::deserialize(MapAccessDeserializer::new(map))?;
        Ok(Person {
            name: fields.name,
            email: fields.email,
        })
    }
}

impl<'de> Deserialize<'de> for Person {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(PersonVisitor)
    }
}

/// One person or a sequence of them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonList(pub Vec<Person>);

struct PersonListVisitor;

impl<'de> Visitor<'de> for PersonListVisitor {
    type Value = PersonList;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a person or a sequence of persons")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<PersonList, E> {
        Ok(PersonList(vec![Person::parse(v)]))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<PersonList, E> {
        Ok(PersonList::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<PersonList, A::Error> {
        PersonVisitor.visit_map(map).map(|person| PersonList(vec![person]))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<PersonList, A::Error> {
        let mut people = Vec::new();
        while let Some(person) = seq.next_element()? {
            people.push(person);
        }
        Ok(PersonList(people))
    }
}

impl<'de> Deserialize<'de> for PersonList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(PersonListVisitor)
    }
}

impl PersonList {
    fn first_name(&self) -> Option<&str> {
        self.0
            .first()
            .map(|person| person.name.as_str())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credits {
    pub authors: PersonList,
    pub contributors: PersonList,
    pub testers: PersonList,
    pub packagers: PersonList,
}

struct CreditsVisitor;

impl<'de> Visitor<'de> for CreditsVisitor {
    type Value = Credits;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an author or a mapping of credits")
    }

    // A bare string credits the authors
    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Credits, E> {
        Ok(Credits {
            authors: PersonList(vec![Person::parse(v)]),
            ..Default::default()
        })
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Credits, E> {
        Ok(Credits::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<Credits, A::Error> {
        CreditsFields::deserialize(MapAccessDeserializer::new(map)).map(|fields| Credits {
            authors: fields.authors,
            contributors: fields.contributors,
            testers: fields.testers,
            packagers: fields.packagers,
        })
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct CreditsFields {
    authors: PersonList,
    contributors: PersonList,
    testers: PersonList,
    packagers: PersonList,
}

impl<'de> Deserialize<'de> for Credits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(CreditsVisitor)
    }
}

impl Credits {
    /// First credited person, looking at authors, then contributors, packagers and testers.
    pub fn first_author(&self) -> Option<&str> {
        self.authors
            .first_name()
            .or_else(|| self.contributors.first_name())
            .or_else(|| self.packagers.first_name())
            .or_else(|| self.testers.first_name())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Seconds.
    pub time_limit: Option<f64>,
    /// MiB.
    pub memory: Option<u64>,
    /// MiB.
    #[serde(alias = "output_limit")]
    pub output: Option<u64>,
    pub validation_passes: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Specification {
    pub problem_format_version: Scalar,
    pub name: TextField,
    pub uuid: Scalar,
    #[serde(rename = "type")]
    pub kind: TextField,
    /// Superseded by `credits`.
    pub author: Scalar,
    pub credits: Credits,
    pub source: TextField,
    pub license: Scalar,
    pub rights_owner: Scalar,
    pub limits: Limits,
    pub keywords: TextField,
    pub languages: TextField,
    /// Legacy `default`, `custom`, `custom interactive` or `custom score`.
    pub validation: Scalar,
    pub validator_flags: Scalar,
}

impl Specification {
    pub fn is_interactive(&self) -> bool {
        self.kind.contains("interactive")
            || self.validation.0.split_whitespace().any(|word| word == "interactive")
    }

    pub fn is_multi_pass(&self) -> bool {
        self.kind.contains("multi-pass")
    }

    pub fn is_submit_answer(&self) -> bool {
        self.kind.contains("submit-answer")
    }

    pub fn author(&self) -> &str {
        self.credits
            .first_author()
            .unwrap_or_else(|| self.author.0.trim())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GroupScoring {
    pub mode: Scalar,
    #[serde(alias = "aggregation")]
    pub aggregate: Scalar,
}

/// Contents of `test_group.yaml` (or the legacy `testdata.yaml`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TestGroupConfig {
    pub full_feedback: bool,
    pub scoring: GroupScoring,
    pub grader_flags: Scalar,
}

impl TestGroupConfig {
    /// Whether the group score is the minimum over its tests.
    pub fn takes_minimum(&self) -> bool {
        self.scoring.mode.0 == "min"
            || self.scoring.aggregate.0 == "min"
            || self.grader_flags.0.split_whitespace().any(|flag| flag == "min")
    }
}

fn parse_yaml<T: Default + DeserializeOwned>(text: &str, manifest: &'static str) -> Result<T> {
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(text).map_err(|error| ImportError::ManifestInvalid {
        manifest,
        message: error.to_string(),
    })
}

pub fn parse_problem_yaml(text: &str) -> Result<Specification> {
    parse_yaml(text, "problem.yaml")
}

pub fn parse_test_group(text: &str) -> Result<TestGroupConfig> {
    parse_yaml(text, "test_group.yaml")
}
