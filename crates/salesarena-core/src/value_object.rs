//! Immutable, structurally compared value objects.

use std::fmt::Debug;

use serde::Serialize;

use crate::result::DomainResult;

/// The data carried by a [`ValueObject`], along with its validation rules.
pub trait Props: Clone + PartialEq + Debug + Serialize {
    /// Canonicalizes raw input (trimming, case folding) before validation.
    #[must_use]
    fn normalize(self) -> Self {
        self
    }

    /// Checks every rule for these props.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` carrying the first failing rule's message.
    fn validate(&self) -> DomainResult<()>;
}

/// A frozen, validated `Props` record.
///
/// The only way to obtain one is [`ValueObject::create`], so every instance
/// in existence has passed its rules. Equality compares props, never identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ValueObject<P: Props> {
    props: P,
}

impl<P: Props> ValueObject<P> {
    /// Normalizes and validates `props`, freezing them on success.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if any rule fails.
    pub fn create(props: P) -> DomainResult<Self> {
        let props = props.normalize();
        props.validate()?;
        Ok(Self { props })
    }

    /// Read-only access to the frozen props.
    #[must_use]
    pub fn props(&self) -> &P {
        &self.props
    }

    /// Structural comparison against another value object.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.props == other.props
    }

    /// Returns a new value object with `change` applied to a copy of the
    /// props. The rules run again; `self` is never modified.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the changed props break a rule.
    pub fn copy_with(&self, change: impl FnOnce(&mut P)) -> DomainResult<Self> {
        let mut draft = self.props.clone();
        change(&mut draft);
        Self::create(draft)
    }
}

/// Declarative validation helpers.
pub mod rules {
    use crate::error::DomainError;
    use crate::result::DomainResult;

    /// Evaluates `(holds, message)` pairs in order. The first pair whose
    /// condition does not hold produces the error; later rules are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` with the first failing message.
    pub fn first_failure<'a>(
        rules: impl IntoIterator<Item = (bool, &'a str)>,
    ) -> DomainResult<()> {
        rules
            .into_iter()
            .find(|(holds, _)| !holds)
            .map_or(Ok(()), |(_, message)| {
                Err(DomainError::validation(message))
            })
    }

    /// Number of Unicode scalar values in `value`, the unit length rules are
    /// phrased in.
    #[must_use]
    pub fn char_len(value: &str) -> usize {
        value.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::rules::{char_len, first_failure};
    use super::*;
    use crate::error::DomainError;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct NicknameProps {
        value: String,
    }

    impl Props for NicknameProps {
        fn normalize(self) -> Self {
            Self {
                value: self.value.trim().to_owned(),
            }
        }

        fn validate(&self) -> DomainResult<()> {
            first_failure([
                (!self.value.is_empty(), "nickname is required"),
                (char_len(&self.value) >= 3, "nickname too short"),
                (char_len(&self.value) <= 12, "nickname too long"),
            ])
        }
    }

    fn nickname(value: &str) -> DomainResult<ValueObject<NicknameProps>> {
        ValueObject::create(NicknameProps {
            value: value.to_owned(),
        })
    }

    #[test]
    fn test_create_normalizes_before_validating() {
        let vo = nickname("  closer  ").unwrap();
        assert_eq!(vo.props().value, "closer");
    }

    #[test]
    fn test_first_failing_rule_wins() {
        // Empty input fails both the "required" and "too short" rules.
        assert_eq!(
            nickname("   "),
            Err(DomainError::validation("nickname is required"))
        );
        assert_eq!(nickname("ab"), Err(DomainError::validation("nickname too short")));
    }

    #[test]
    fn test_equality_is_structural() {
        let a = nickname("closer").unwrap();
        let b = nickname(" closer").unwrap();
        let c = nickname("hunter").unwrap();

        assert!(a.equals(&b));
        assert_eq!(a, b);
        assert!(!a.equals(&c));
    }

    #[test]
    fn test_copy_with_returns_new_instance_and_keeps_original() {
        let original = nickname("closer").unwrap();

        let renamed = original
            .copy_with(|p| p.value = "rainmaker".to_owned())
            .unwrap();

        assert_eq!(original.props().value, "closer");
        assert_eq!(renamed.props().value, "rainmaker");
    }

    #[test]
    fn test_copy_with_reruns_rules() {
        let original = nickname("closer").unwrap();

        let result = original.copy_with(|p| p.value = "x".repeat(20));

        assert_eq!(result, Err(DomainError::validation("nickname too long")));
    }

    #[test]
    fn test_char_len_counts_scalars_not_bytes() {
        assert_eq!(char_len("Åsa"), 3);
    }
}
