// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Client-side guard rules for the editable record fields.
//!
//! Every rule is synchronous and cheap; forms re-run them on each change.

use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::models::fields::FieldName;
use crate::models::tags::Tags;

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 255;
pub const DESCRIPTION_MAX_LENGTH: usize = 250;
pub const TAGS_MAX_LENGTH: usize = 8000;
pub const TAG_MIN_LENGTH: usize = 2;

/// Reasons a field value is rejected. The `Display` form is the helper text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} must be at least {min} characters.")]
    TooShort { field: FieldName, min: usize },
    #[error("{field} must be no longer than {max} characters.")]
    TooLong { field: FieldName, max: usize },
    #[error("{field} must include at least one non-whitespace character.")]
    Blank { field: FieldName },
    #[error("Tags must be no longer than {max} characters in total.")]
    TagsTooLong { max: usize },
    #[error("Each tag must be at least {min} characters.")]
    TagTooShort { min: usize },
}

/// Suffix appended to a common name when it is written to many records.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NameSuffix {
    #[default]
    None,
    IndexNumber,
    IndexLetter,
    Created,
}

impl NameSuffix {
    pub const ALL: [NameSuffix; 4] = [
        NameSuffix::None,
        NameSuffix::IndexNumber,
        NameSuffix::IndexLetter,
        NameSuffix::Created,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "No suffix",
            Self::IndexNumber => "Index number",
            Self::IndexLetter => "Index letter",
            Self::Created => "Creation date",
        }
    }

    /// Characters held back from the name budget for this suffix.
    pub fn reserved_length(&self) -> usize {
        match self {
            Self::None => 0,
            Self::IndexNumber | Self::IndexLetter => 2,
            Self::Created => 19,
        }
    }

    /// Longest common name that still leaves room for the suffix.
    pub fn max_name_length(&self) -> usize {
        NAME_MAX_LENGTH - self.reserved_length()
    }

    /// Render the final name for the `index`-th record (0-based).
    ///
    /// Index suffixes outgrow their reserved budget past the 9th (or 26th)
    /// record; the base is then shortened so the result stays within
    /// [`NAME_MAX_LENGTH`].
    pub fn apply(&self, base: &str, index: usize, created: OffsetDateTime) -> String {
        let suffix = match self {
            Self::None => return base.to_string(),
            Self::IndexNumber => format!(".{}", index + 1),
            Self::IndexLetter => format!(".{}", index_letters(index)),
            Self::Created => {
                let stamp = created
                    .format(format_description!(
                        "[year]-[month]-[day]_[hour][minute][second]"
                    ))
                    .unwrap_or_default();
                format!("_{stamp}")
            }
        };
        let room = NAME_MAX_LENGTH.saturating_sub(suffix.chars().count());
        let base: String = base.chars().take(room).collect();
        format!("{base}{suffix}")
    }
}

/// Spreadsheet-style column letters: 0 → A, 25 → Z, 26 → AA.
fn index_letters(mut index: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Validate a name. Empty input only counts once the field was touched.
pub fn validate_name(value: &str, touched: bool, suffix: NameSuffix) -> Option<FieldError> {
    let len = value.chars().count();
    let max = suffix.max_name_length();

    if len == 0 && !touched {
        return None;
    }
    if len > max {
        return Some(FieldError::TooLong {
            field: FieldName::Name,
            max,
        });
    }
    if len < NAME_MIN_LENGTH {
        return Some(FieldError::TooShort {
            field: FieldName::Name,
            min: NAME_MIN_LENGTH,
        });
    }
    if value.trim().is_empty() {
        return Some(FieldError::Blank {
            field: FieldName::Name,
        });
    }
    None
}

pub fn validate_description(value: &str) -> Option<FieldError> {
    (value.chars().count() > DESCRIPTION_MAX_LENGTH).then_some(FieldError::TooLong {
        field: FieldName::Description,
        max: DESCRIPTION_MAX_LENGTH,
    })
}

pub fn validate_tags(tags: &Tags) -> Option<FieldError> {
    if tags.joined_len() > TAGS_MAX_LENGTH {
        return Some(FieldError::TagsTooLong {
            max: TAGS_MAX_LENGTH,
        });
    }
    tags.items()
        .iter()
        .any(|t| t.chars().count() < TAG_MIN_LENGTH)
        .then_some(FieldError::TagTooShort {
            min: TAG_MIN_LENGTH,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: Option<FieldError>) -> Option<String> {
        err.map(|e| e.to_string())
    }

    #[test]
    fn empty_name_is_only_an_error_after_touch() {
        assert_eq!(validate_name("", false, NameSuffix::None), None);
        assert_eq!(
            message(validate_name("", true, NameSuffix::None)).as_deref(),
            Some("Name must be at least 2 characters.")
        );
    }

    #[test]
    fn single_character_name_is_too_short() {
        assert_eq!(
            message(validate_name("a", false, NameSuffix::None)).as_deref(),
            Some("Name must be at least 2 characters.")
        );
    }

    #[test]
    fn long_name_is_rejected() {
        assert_eq!(validate_name(&"a".repeat(255), true, NameSuffix::None), None);
        assert_eq!(
            message(validate_name(&"a".repeat(256), true, NameSuffix::None)).as_deref(),
            Some("Name must be no longer than 255 characters.")
        );
    }

    #[test]
    fn whitespace_name_is_blank() {
        assert_eq!(
            message(validate_name("   ", true, NameSuffix::None)).as_deref(),
            Some("Name must include at least one non-whitespace character.")
        );
    }

    #[test]
    fn suffix_reduces_name_budget() {
        let cases = [
            (NameSuffix::None, 255),
            (NameSuffix::IndexNumber, 253),
            (NameSuffix::IndexLetter, 253),
            (NameSuffix::Created, 236),
        ];
        for (suffix, max) in cases {
            assert_eq!(suffix.max_name_length(), max);
            assert_eq!(validate_name(&"n".repeat(max), true, suffix), None);
            assert_eq!(
                message(validate_name(&"n".repeat(max + 1), true, suffix)),
                Some(format!("Name must be no longer than {max} characters."))
            );
        }
    }

    #[test]
    fn description_limit() {
        assert_eq!(validate_description(&"d".repeat(250)), None);
        assert_eq!(
            message(validate_description(&"d".repeat(251))).as_deref(),
            Some("Description must be no longer than 250 characters.")
        );
    }

    #[test]
    fn tags_total_length_limit() {
        let tags = Tags::new((0..900).map(|i| format!("tag{i:05}")).collect());
        assert!(tags.joined_len() > TAGS_MAX_LENGTH);
        assert_eq!(
            message(validate_tags(&tags)).as_deref(),
            Some("Tags must be no longer than 8000 characters in total.")
        );
    }

    #[test]
    fn tags_must_each_be_two_characters() {
        assert_eq!(validate_tags(&Tags::new(vec!["ok".into()])), None);
        assert_eq!(
            validate_tags(&Tags::new(vec!["ok".into(), "x".into()])),
            Some(FieldError::TagTooShort { min: 2 })
        );
    }

    #[test]
    fn suffixes_render_per_record() {
        let created = time::macros::datetime!(2025-03-04 05:06:07 UTC);
        assert_eq!(NameSuffix::None.apply("Box", 3, created), "Box");
        assert_eq!(NameSuffix::IndexNumber.apply("Box", 0, created), "Box.1");
        assert_eq!(NameSuffix::IndexLetter.apply("Box", 1, created), "Box.B");
        assert_eq!(NameSuffix::IndexLetter.apply("Box", 26, created), "Box.AA");
        assert_eq!(
            NameSuffix::Created.apply("Box", 0, created),
            "Box_2025-03-04_050607"
        );
    }

    #[test]
    fn long_index_suffixes_shorten_the_base() {
        let created = time::macros::datetime!(2025-03-04 05:06:07 UTC);
        let base = "n".repeat(NameSuffix::IndexNumber.max_name_length());

        let ninth = NameSuffix::IndexNumber.apply(&base, 8, created);
        assert_eq!(ninth, format!("{base}.9"));

        let tenth = NameSuffix::IndexNumber.apply(&base, 9, created);
        assert_eq!(tenth.chars().count(), NAME_MAX_LENGTH);
        assert!(tenth.ends_with("nn.10"));
        assert_eq!(validate_name(&tenth, true, NameSuffix::None), None);

        let letters = NameSuffix::IndexLetter.apply(&base, 26, created);
        assert_eq!(letters.chars().count(), NAME_MAX_LENGTH);
        assert!(letters.ends_with(".AA"));

        // Short names are never trimmed.
        assert_eq!(NameSuffix::IndexNumber.apply("Box", 99, created), "Box.100");
    }
}
