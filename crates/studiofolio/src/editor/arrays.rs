//! Add/remove/move edits on a form's dynamic sub-lists.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FieldErrors, Result};

/// One edit to a list field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayEdit<T> {
    /// Add an item at the end.
    Append(T),
    /// Add an item before `index` (`index == len` appends).
    Insert(usize, T),
    /// Remove the item at `index`.
    Remove(usize),
    /// Move the item at `from` so it ends up at `to`.
    Move {
        /// Current index.
        from: usize,
        /// Target index.
        to: usize,
    },
}

impl<T> ArrayEdit<T> {
    /// Convert the carried item, if any.
    ///
    /// # Errors
    ///
    /// Propagates the conversion error.
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<ArrayEdit<U>> {
        Ok(match self {
            Self::Append(item) => ArrayEdit::Append(f(item)?),
            Self::Insert(index, item) => ArrayEdit::Insert(index, f(item)?),
            Self::Remove(index) => ArrayEdit::Remove(index),
            Self::Move { from, to } => ArrayEdit::Move { from, to },
        })
    }
}

/// Apply [`ArrayEdit`]s to a list field.
pub trait FieldArray<T> {
    /// Apply one edit. `field` names the list in error messages.
    ///
    /// # Errors
    ///
    /// Returns a field-level validation error if an index is out of range.
    fn apply_edit(&mut self, field: &str, edit: ArrayEdit<T>) -> Result<()>;
}

impl<T> FieldArray<T> for Vec<T> {
    fn apply_edit(&mut self, field: &str, edit: ArrayEdit<T>) -> Result<()> {
        let len = self.len();
        match edit {
            ArrayEdit::Append(item) => self.push(item),
            ArrayEdit::Insert(index, item) => {
                if index > len {
                    return out_of_range(field, index);
                }
                self.insert(index, item);
            }
            ArrayEdit::Remove(index) => {
                if index >= len {
                    return out_of_range(field, index);
                }
                self.remove(index);
            }
            ArrayEdit::Move { from, to } => {
                if from >= len {
                    return out_of_range(field, from);
                }
                if to >= len {
                    return out_of_range(field, to);
                }
                let item = self.remove(from);
                self.insert(to, item);
            }
        }
        Ok(())
    }
}

fn out_of_range(field: &str, index: usize) -> Result<()> {
    let mut errors = FieldErrors::new();
    errors.add(format!("{field}[{index}]"), "no such entry");
    errors.into_result()
}

/// Decode a raw item for a list field.
///
/// # Errors
///
/// Returns a field-level validation error if the item has the wrong shape.
pub fn decode_item<T: DeserializeOwned>(field: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        let mut errors = FieldErrors::new();
        errors.add(field, format!("invalid entry: {e}"));
        errors.into()
    })
}

/// Decode the item carried by an edit and apply it to `list`.
///
/// # Errors
///
/// Returns a field-level validation error on a bad item or index.
pub fn apply_raw<T: DeserializeOwned>(
    list: &mut Vec<T>,
    field: &str,
    edit: ArrayEdit<Value>,
) -> Result<()> {
    let edit = edit.try_map(|value| decode_item(field, value))?;
    list.apply_edit(field, edit)
}

/// Error for a list field name the form doesn't have.
///
/// # Errors
///
/// Always returns a field-level validation error.
pub fn unknown_field(field: &str) -> Result<()> {
    let mut errors = FieldErrors::new();
    errors.add(field, "is not a list field of this form");
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::FaqEntry;

    fn letters() -> Vec<String> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    #[test]
    fn test_append_and_insert() {
        let mut list = letters();
        list.apply_edit("x", ArrayEdit::Append("d".to_string())).unwrap();
        list.apply_edit("x", ArrayEdit::Insert(0, "z".to_string()))
            .unwrap();
        assert_eq!(list, vec!["z", "a", "b", "c", "d"]);
    }

    #[test]
    fn test_insert_at_end() {
        let mut list = letters();
        list.apply_edit("x", ArrayEdit::Insert(3, "d".to_string()))
            .unwrap();
        assert_eq!(list.last().map(String::as_str), Some("d"));
    }

    #[test]
    fn test_remove() {
        let mut list = letters();
        list.apply_edit("x", ArrayEdit::Remove(1)).unwrap();
        assert_eq!(list, vec!["a", "c"]);
    }

    #[test]
    fn test_move() {
        let mut list = letters();
        list.apply_edit("x", ArrayEdit::Move { from: 0, to: 2 })
            .unwrap();
        assert_eq!(list, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_out_of_range_is_field_error() {
        let mut list = letters();
        let err = list.apply_edit("benefits", ArrayEdit::Remove(5)).unwrap_err();
        assert!(err.field_errors().unwrap().has("benefits[5]"));
        assert_eq!(list.len(), 3);

        assert!(list
            .apply_edit("benefits", ArrayEdit::Move { from: 1, to: 3 })
            .is_err());
    }

    #[test]
    fn test_apply_raw_decodes_items() {
        let mut faq: Vec<FaqEntry> = Vec::new();
        apply_raw(
            &mut faq,
            "faq",
            ArrayEdit::Append(json!({"question": "Why?", "answer": "Because."})),
        )
        .unwrap();
        assert_eq!(faq[0].answer, "Because.");

        let err = apply_raw(&mut faq, "faq", ArrayEdit::Append(json!(5))).unwrap_err();
        assert!(err.field_errors().unwrap().has("faq"));
    }

    #[test]
    fn test_unknown_field() {
        assert!(unknown_field("colors").is_err());
    }
}
