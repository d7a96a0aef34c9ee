//! Three-state patch fields for partial updates.
//!
//! A JSON patch must distinguish "key absent" (leave the field alone) from
//! "key present with null" (clear the field) from "key present with a value"
//! (replace it). [`Patch`] models that tri-state; fields declare
//! `#[serde(default)]` so absent keys deserialize to [`Patch::Unset`].

use serde::{Deserialize, Deserializer};

/// Tri-state wrapper for one optional patch field.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Key absent from the payload; keep the current value.
    Unset,
    /// Key present as explicit `null`; clear the field.
    Null,
    /// Key present with a value; replace the field.
    Value(T),
}

// Manual impl: the derive would demand `T: Default`, which patchable field
// types like status enums do not have.
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> Patch<T> {
    /// True if the key was absent from the payload.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// True if the key was present, whether as null or a value.
    pub fn is_set(&self) -> bool {
        !self.is_unset()
    }

    /// Merge this patch over the current value of the field.
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Unset => current,
            Self::Null => None,
            Self::Value(v) => Some(v),
        }
    }

    /// View the carried value, if any.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Self::Value(v),
            None => Self::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        title: Patch<String>,
        #[serde(default)]
        count: Patch<u32>,
    }

    #[test]
    fn absent_key_is_unset() {
        let p: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(p.title, Patch::Unset);
        assert_eq!(p.count, Patch::Unset);
    }

    #[test]
    fn explicit_null_is_null() {
        let p: Payload = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert_eq!(p.title, Patch::Null);
        assert_eq!(p.count, Patch::Unset);
    }

    #[test]
    fn present_value_is_value() {
        let p: Payload = serde_json::from_str(r#"{"title": "Plan", "count": 3}"#).unwrap();
        assert_eq!(p.title, Patch::Value("Plan".to_string()));
        assert_eq!(p.count, Patch::Value(3));
    }

    #[test]
    fn resolve_merges_over_current() {
        assert_eq!(Patch::<u32>::Unset.resolve(Some(1)), Some(1));
        assert_eq!(Patch::<u32>::Null.resolve(Some(1)), None);
        assert_eq!(Patch::Value(2u32).resolve(Some(1)), Some(2));
        assert_eq!(Patch::<u32>::Unset.resolve(None), None);
    }
}
