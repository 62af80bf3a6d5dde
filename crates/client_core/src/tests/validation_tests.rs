use super::*;
use shared::domain::Genre;

const YEAR: i32 = 2026;

fn schema() -> ValidationSchema {
    ValidationSchema::band(YEAR)
}

fn valid_values() -> BandFormValues {
    BandFormValues {
        name: "The Reds".to_string(),
        genre: "Rock".to_string(),
        description: "A rock band from 1990".to_string(),
        formed_year: "1990".to_string(),
    }
}

#[test]
fn formed_year_bounds_are_inclusive() {
    let schema = schema();
    let year_error = |year: String| schema.validate_field(Field::FormedYear, &year).map(str::to_string);

    assert_eq!(year_error("1899".into()).as_deref(), Some("Year must be after 1900"));
    assert_eq!(year_error("1900".into()), None);
    assert_eq!(year_error(YEAR.to_string()), None);
    assert_eq!(
        year_error((YEAR + 1).to_string()).as_deref(),
        Some("Year cannot be in the future")
    );
}

#[test]
fn year_rules_take_calendar_years() {
    assert!(Rule::AtLeast(EARLIEST_FORMED_YEAR).accepts("1900.0"));
    assert!(!Rule::AtLeast(EARLIEST_FORMED_YEAR).accepts("1899"));
    assert!(Rule::AtMost(YEAR).accepts(&YEAR.to_string()));
    assert!(!Rule::AtMost(YEAR).accepts(&(YEAR + 1).to_string()));
}

#[test]
fn formed_year_must_be_a_whole_number() {
    let schema = schema();
    assert_eq!(
        schema.validate_field(Field::FormedYear, "1990.5"),
        Some("Year must be a whole number")
    );
    assert_eq!(
        schema.validate_field(Field::FormedYear, "nineteen ninety"),
        Some("Year must be a number")
    );
    assert_eq!(
        schema.validate_field(Field::FormedYear, "inf"),
        Some("Year must be a number")
    );
    assert_eq!(schema.validate_field(Field::FormedYear, " 1990 "), None);
    assert_eq!(schema.validate_field(Field::FormedYear, "1990.0"), None);
    assert_eq!(
        schema.validate_field(Field::FormedYear, ""),
        Some("Formation year is required")
    );
}

#[test]
fn name_length_boundaries() {
    let schema = schema();
    assert_eq!(
        schema.validate_field(Field::Name, &"a".repeat(1)),
        Some("Band name must be at least 2 characters")
    );
    assert_eq!(schema.validate_field(Field::Name, &"a".repeat(2)), None);
    assert_eq!(schema.validate_field(Field::Name, &"a".repeat(100)), None);
    assert_eq!(
        schema.validate_field(Field::Name, &"a".repeat(101)),
        Some("Band name must be less than 100 characters")
    );
    assert_eq!(
        schema.validate_field(Field::Name, ""),
        Some("Band name is required")
    );
}

#[test]
fn description_length_boundaries() {
    let schema = schema();
    assert_eq!(
        schema.validate_field(Field::Description, &"d".repeat(9)),
        Some("Description must be at least 10 characters")
    );
    assert_eq!(schema.validate_field(Field::Description, &"d".repeat(10)), None);
    assert_eq!(schema.validate_field(Field::Description, &"d".repeat(500)), None);
    assert_eq!(
        schema.validate_field(Field::Description, &"d".repeat(501)),
        Some("Description must be less than 500 characters")
    );
}

#[test]
fn lengths_count_characters_not_bytes() {
    let schema = schema();
    // two characters, six bytes
    assert_eq!(schema.validate_field(Field::Name, "日本"), None);
    assert!(schema
        .validate_field(Field::Name, &"é".repeat(100))
        .is_none());
}

#[test]
fn genre_must_be_one_of_the_fixed_values() {
    let schema = schema();
    for genre in Genre::ALL {
        assert_eq!(schema.validate_field(Field::Genre, genre.as_str()), None);
    }
    for rejected in ["Metal", "rock", "HipHop", "Rock "] {
        let message = schema
            .validate_field(Field::Genre, rejected)
            .expect("rejected genre");
        assert!(message.starts_with("Genre must be one of"), "{message}");
    }
    assert_eq!(
        schema.validate_field(Field::Genre, ""),
        Some("Genre is required")
    );
}

#[test]
fn first_failing_rule_wins_and_fields_are_independent() {
    let values = BandFormValues {
        name: String::new(),
        genre: "Polka".to_string(),
        description: "short".to_string(),
        formed_year: "1850.5".to_string(),
    };
    let errors = schema().validate(&values);

    assert_eq!(errors.len(), 4);
    assert_eq!(errors.get(Field::Name), Some("Band name is required"));
    assert_eq!(
        errors.get(Field::Description),
        Some("Description must be at least 10 characters")
    );
    // Integer precedes AtLeast in the year rules
    assert_eq!(
        errors.get(Field::FormedYear),
        Some("Year must be a whole number")
    );
}

#[test]
fn check_builds_the_update_body_with_integer_year() {
    let mut values = valid_values();
    values.genre = "Hip Hop".to_string();
    values.formed_year = "1990.0".to_string();

    let request = schema().check(&values).expect("valid");
    assert_eq!(request.genre, Genre::HipHop);
    assert_eq!(request.formed_year, 1990);
    assert_eq!(request.name, "The Reds");
}

#[test]
fn check_returns_only_offending_fields() {
    let mut values = valid_values();
    values.description = "12345".to_string();

    let errors = schema().check(&values).expect_err("invalid");
    assert_eq!(errors.len(), 1);
    assert!(errors.contains(Field::Description));
}

#[test]
fn form_values_mirror_the_fetched_band() {
    let band = shared::domain::Band {
        id: "7".into(),
        name: "Static".to_string(),
        genre: Genre::Electronic,
        description: "Modular synth duo".to_string(),
        formed_year: 2004,
        musicians: Vec::new(),
    };
    let values = BandFormValues::from_band(&band);
    assert_eq!(values.get(Field::Genre), "Electronic");
    assert_eq!(values.get(Field::FormedYear), "2004");
    assert!(schema().validate(&values).is_empty());
}

#[test]
fn parse_whole_number_rejects_fractions_and_overflow() {
    assert_eq!(parse_whole_number("2001"), Some(2001));
    assert_eq!(parse_whole_number("2001.25"), None);
    assert_eq!(parse_whole_number("1e12"), None);
    assert_eq!(parse_whole_number(""), None);
}
