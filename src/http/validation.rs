use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::types::ObjectId;
use crate::http::{Error, Result};

/// A single constraint on one field of a JSON payload.
///
/// Every rule except `Required` treats a missing or `null` field as satisfied, so optional
/// fields are expressed by simply leaving `Required` out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Text,
    /// A string that decodes as an [`ObjectId`].
    Identifier,
    /// A string whose length in characters, after trimming whitespace, is within `min..=max`.
    TrimmedLength { min: usize, max: usize },
}

pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub reason: &'static str,
}

pub const TWEET_CREATE: &[FieldRules] = &[
    FieldRules {
        field: "userId",
        rules: &[Rule::Required, Rule::Identifier],
    },
    FieldRules {
        field: "content",
        rules: &[
            Rule::Required,
            Rule::Text,
            Rule::TrimmedLength { min: 1, max: 140 },
        ],
    },
];

pub const USER_CREATE: &[FieldRules] = &[
    FieldRules {
        field: "name",
        rules: &[
            Rule::Required,
            Rule::Text,
            Rule::TrimmedLength {
                min: 1,
                max: usize::MAX,
            },
        ],
    },
    FieldRules {
        field: "avatarUrl",
        rules: &[Rule::Text],
    },
];

// Same as `USER_CREATE` minus `Required`: only the fields a client sends are checked.
pub const USER_UPDATE: &[FieldRules] = &[
    FieldRules {
        field: "name",
        rules: &[
            Rule::Text,
            Rule::TrimmedLength {
                min: 1,
                max: usize::MAX,
            },
        ],
    },
    FieldRules {
        field: "avatarUrl",
        rules: &[Rule::Text],
    },
];

pub const FOLLOW_CREATE: &[FieldRules] = &[
    FieldRules {
        field: "userId",
        rules: &[Rule::Required, Rule::Identifier],
    },
    FieldRules {
        field: "followId",
        rules: &[Rule::Required, Rule::Identifier],
    },
];

impl Rule {
    fn check(self, value: Option<&Value>) -> Result<(), &'static str> {
        let value = match value {
            None | Some(Value::Null) if self == Rule::Required => return Err("is required"),
            None | Some(Value::Null) => return Ok(()),
            Some(value) => value,
        };

        match self {
            Rule::Required => Ok(()),
            Rule::Text => value.as_str().map(drop).ok_or("must be a string"),
            Rule::Identifier => match value.as_str() {
                Some(s) if s.parse::<ObjectId>().is_ok() => Ok(()),
                _ => Err("must be a 24 character hexadecimal identifier"),
            },
            Rule::TrimmedLength { min, max } => {
                let Some(s) = value.as_str() else {
                    return Err("must be a string");
                };
                // Characters, not bytes: a haiku in kana is well under the limit.
                let len = s.trim().chars().count();
                if len < min {
                    Err("is too short")
                } else if len > max {
                    Err("is too long")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Check `payload` against every field in `rules`.
///
/// Each field stops at its first failing rule, but all fields are always checked so the
/// logged violations describe everything that was wrong with the request.
pub fn validate(payload: &Value, rules: &[FieldRules]) -> Result<()> {
    let Some(object) = payload.as_object() else {
        return Err(Error::validation_failed("body", "must be a JSON object"));
    };

    let violations: Vec<Violation> = rules
        .iter()
        .filter_map(|field_rules| {
            let value = object.get(field_rules.field);
            field_rules
                .rules
                .iter()
                .find_map(|rule| rule.check(value).err())
                .map(|reason| Violation {
                    field: field_rules.field,
                    reason,
                })
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::ValidationFailed(violations))
    }
}

/// Validate `payload` and then deserialize it into the typed request.
pub fn decode<T: DeserializeOwned>(payload: Value, rules: &[FieldRules]) -> Result<T> {
    validate(&payload, rules)?;

    // The rules above should already guarantee this succeeds; anything left over
    // (like a non-string `avatarUrl` slipping past an incomplete rule table) is still the
    // client's fault, not ours.
    serde_json::from_value(payload).map_err(|e| {
        log::debug!("validated payload failed to deserialize: {}", e);
        Error::validation_failed("body", "does not match the resource")
    })
}
