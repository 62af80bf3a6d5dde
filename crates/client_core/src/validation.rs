//! Declarative field rules for the band edit form.
//!
//! Every field owns an ordered list of rules; the first rule a value breaks
//! supplies that field's message. Fields are checked independently, so one
//! invalid field never hides another's error.

use std::{collections::BTreeMap, fmt};

use chrono::{Datelike, Local};
use shared::{
    domain::{Band, Genre},
    protocol::UpdateBandRequest,
};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const EARLIEST_FORMED_YEAR: i32 = 1900;

pub fn current_year() -> i32 {
    Local::now().year()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Genre,
    Description,
    FormedYear,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Name,
        Field::Genre,
        Field::Description,
        Field::FormedYear,
    ];

    /// Request body key for the field.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Genre => "genre",
            Field::Description => "description",
            Field::FormedYear => "formed_year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Band Name",
            Field::Genre => "Genre",
            Field::Description => "Description",
            Field::FormedYear => "Formation Year",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw text of every editable field, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandFormValues {
    pub name: String,
    pub genre: String,
    pub description: String,
    pub formed_year: String,
}

impl BandFormValues {
    pub fn from_band(band: &Band) -> Self {
        Self {
            name: band.name.clone(),
            genre: band.genre.as_str().to_string(),
            description: band.description.clone(),
            formed_year: band.formed_year.to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Genre => &self.genre,
            Field::Description => &self.description,
            Field::FormedYear => &self.formed_year,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Genre => &mut self.genre,
            Field::Description => &mut self.description,
            Field::FormedYear => &mut self.formed_year,
        };
        *slot = value.into();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    MinChars(usize),
    MaxChars(usize),
    OneOf(Vec<String>),
    Number,
    Integer,
    AtLeast(i32),
    AtMost(i32),
}

impl Rule {
    /// Only `Required` rejects an empty value; the remaining rules pass it
    /// through so that a missing value yields a single message.
    pub fn accepts(&self, value: &str) -> bool {
        if value.is_empty() {
            return !matches!(self, Rule::Required);
        }

        match self {
            Rule::Required => true,
            Rule::MinChars(min) => value.chars().count() >= *min,
            Rule::MaxChars(max) => value.chars().count() <= *max,
            Rule::OneOf(allowed) => allowed.iter().any(|candidate| candidate == value),
            Rule::Number => parse_number(value).is_some(),
            Rule::Integer => parse_number(value).map_or(true, |n| n.fract() == 0.0),
            Rule::AtLeast(min) => parse_number(value).map_or(true, |n| n >= f64::from(*min)),
            Rule::AtMost(max) => parse_number(value).map_or(true, |n| n <= f64::from(*max)),
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Coerces form text to a whole year, the way it is sent to the api.
pub fn parse_whole_number(value: &str) -> Option<i32> {
    let number = parse_number(value)?;
    if number.fract() != 0.0 || number < i32::MIN as f64 || number > i32::MAX as f64 {
        return None;
    }
    Some(number as i32)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleCheck {
    pub rule: Rule,
    pub message: String,
}

impl RuleCheck {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSchema {
    fields: Vec<(Field, Vec<RuleCheck>)>,
}

impl ValidationSchema {
    pub fn new(fields: Vec<(Field, Vec<RuleCheck>)>) -> Self {
        Self { fields }
    }

    pub fn band(current_year: i32) -> Self {
        let genres = Genre::ALL
            .iter()
            .map(|genre| genre.as_str().to_string())
            .collect::<Vec<_>>();
        let genre_message = format!("Genre must be one of: {}", genres.join(", "));

        Self::new(vec![
            (
                Field::Name,
                vec![
                    RuleCheck::new(Rule::Required, "Band name is required"),
                    RuleCheck::new(
                        Rule::MinChars(NAME_MIN_CHARS),
                        format!("Band name must be at least {NAME_MIN_CHARS} characters"),
                    ),
                    RuleCheck::new(
                        Rule::MaxChars(NAME_MAX_CHARS),
                        format!("Band name must be less than {NAME_MAX_CHARS} characters"),
                    ),
                ],
            ),
            (
                Field::Genre,
                vec![
                    RuleCheck::new(Rule::Required, "Genre is required"),
                    RuleCheck::new(Rule::OneOf(genres), genre_message),
                ],
            ),
            (
                Field::Description,
                vec![
                    RuleCheck::new(Rule::Required, "Description is required"),
                    RuleCheck::new(
                        Rule::MinChars(DESCRIPTION_MIN_CHARS),
                        format!("Description must be at least {DESCRIPTION_MIN_CHARS} characters"),
                    ),
                    RuleCheck::new(
                        Rule::MaxChars(DESCRIPTION_MAX_CHARS),
                        format!("Description must be less than {DESCRIPTION_MAX_CHARS} characters"),
                    ),
                ],
            ),
            (
                Field::FormedYear,
                vec![
                    RuleCheck::new(Rule::Required, "Formation year is required"),
                    RuleCheck::new(Rule::Number, "Year must be a number"),
                    RuleCheck::new(Rule::Integer, "Year must be a whole number"),
                    RuleCheck::new(
                        Rule::AtLeast(EARLIEST_FORMED_YEAR),
                        format!("Year must be after {EARLIEST_FORMED_YEAR}"),
                    ),
                    RuleCheck::new(Rule::AtMost(current_year), "Year cannot be in the future"),
                ],
            ),
        ])
    }

    pub fn validate_field(&self, field: Field, value: &str) -> Option<&str> {
        self.fields
            .iter()
            .filter(|(candidate, _)| *candidate == field)
            .flat_map(|(_, checks)| checks)
            .find(|check| !check.rule.accepts(value))
            .map(|check| check.message.as_str())
    }

    pub fn validate(&self, values: &BandFormValues) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        for field in Field::ALL {
            if let Some(message) = self.validate_field(field, values.get(field)) {
                errors.insert(field, message);
            }
        }
        errors
    }

    /// Validates and converts the form into the update body.
    pub fn check(&self, values: &BandFormValues) -> Result<UpdateBandRequest, ValidationErrors> {
        let mut errors = self.validate(values);
        if !errors.is_empty() {
            return Err(errors);
        }

        let genre = values.genre.parse::<Genre>();
        let formed_year = parse_whole_number(&values.formed_year);
        match (genre, formed_year) {
            (Ok(genre), Some(formed_year)) => Ok(UpdateBandRequest {
                name: values.name.clone(),
                genre,
                description: values.description.clone(),
                formed_year,
            }),
            (genre, formed_year) => {
                if let Err(err) = genre {
                    errors.insert(Field::Genre, err.to_string());
                }
                if formed_year.is_none() {
                    errors.insert(Field::FormedYear, "Year must be a whole number");
                }
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
