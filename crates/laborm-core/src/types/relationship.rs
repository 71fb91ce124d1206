use std::fmt;

use serde::{Deserialize, Serialize};

use super::token::Token;

/// How a relation column links its model to another one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relationship {
    /// To-many reverse side (`posts Post[]`). Materializes nothing.
    Array { target_model: Token },
    /// To-one owning side (`author Author @relation(authorId, id)`).
    /// Materializes a relation table linking `local_field` on the owner to
    /// `remote_field` on the target.
    Field {
        target_model: Token,
        local_field: Token,
        remote_field: Token,
    },
}

impl Relationship {
    pub fn target_model(&self) -> &Token {
        match self {
            Self::Array { target_model } | Self::Field { target_model, .. } => target_model,
        }
    }

    /// Returns true if this relation points at `model` (case-insensitive).
    pub fn targets(&self, model: &str) -> bool {
        self.target_model().text_eq_ignore_case(model)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    pub fn is_field(&self) -> bool {
        matches!(self, Self::Field { .. })
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Array { .. } => "array",
            Self::Field { .. } => "field",
        }
    }

    /// Compares two descriptors by shape: variant, target model and field
    /// names. Source positions are ignored, names compare case-insensitively.
    pub fn same_shape(&self, other: &Relationship) -> bool {
        self.shape_difference(other).is_none()
    }

    /// Describes the first difference between two descriptors, if any.
    pub fn shape_difference(&self, other: &Relationship) -> Option<String> {
        if self.variant_name() != other.variant_name() {
            return Some(format!(
                "{} relation became {} relation",
                self.variant_name(),
                other.variant_name()
            ));
        }
        let (a, b) = (self.target_model(), other.target_model());
        if !a.text_eq_ignore_case(&b.text) {
            return Some(format!("target changed from {} to {}", a.text, b.text));
        }
        if let (
            Self::Field {
                local_field: la,
                remote_field: ra,
                ..
            },
            Self::Field {
                local_field: lb,
                remote_field: rb,
                ..
            },
        ) = (self, other)
        {
            if !la.text_eq_ignore_case(&lb.text) {
                return Some(format!(
                    "local field changed from {} to {}",
                    la.text, lb.text
                ));
            }
            if !ra.text_eq_ignore_case(&rb.text) {
                return Some(format!(
                    "remote field changed from {} to {}",
                    ra.text, rb.text
                ));
            }
        }
        None
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array { target_model } => write!(f, "{}[]", target_model.text),
            Self::Field {
                target_model,
                local_field,
                remote_field,
            } => write!(
                f,
                "{} @relation({}, {})",
                target_model.text, local_field.text, remote_field.text
            ),
        }
    }
}
