//! Per-instance presence bookkeeping for partially populated request structs.
//!
//! A [`FieldState`] travels alongside a struct's data fields and records which
//! JSON keys must be sent even when they hold a zero value, and which keys must
//! be sent as an explicit `null`. The encoder in `spotinst-util` reads it when
//! the struct is serialized.

use indexmap::IndexSet;

/// Two ordered name-sets describing how zero and absent fields are encoded.
///
/// Names are the JSON keys of the owning struct. A name may end up in both
/// sets; the encoder treats `null_fields` as authoritative in that case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    force_send_fields: IndexSet<String>,
    null_fields: IndexSet<String>,
}

impl FieldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from explicit name lists.
    pub fn from_lists<F, N>(force_send_fields: F, null_fields: N) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            force_send_fields: force_send_fields.into_iter().map(Into::into).collect(),
            null_fields: null_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Emit `name` even when it holds its zero value.
    pub fn force_send(&mut self, name: impl Into<String>) {
        self.force_send_fields.insert(name.into());
    }

    /// Emit `name` as a literal JSON `null`.
    pub fn set_null(&mut self, name: impl Into<String>) {
        self.null_fields.insert(name.into());
    }

    /// Returns `true` when the name was present.
    pub fn clear_force_send(&mut self, name: &str) -> bool {
        self.force_send_fields.shift_remove(name)
    }

    /// Returns `true` when the name was present.
    pub fn clear_null(&mut self, name: &str) -> bool {
        self.null_fields.shift_remove(name)
    }

    /// Consuming variant of [`FieldState::force_send`].
    pub fn with_force_send(mut self, name: impl Into<String>) -> Self {
        self.force_send(name);
        self
    }

    /// Consuming variant of [`FieldState::set_null`].
    pub fn with_null(mut self, name: impl Into<String>) -> Self {
        self.set_null(name);
        self
    }

    pub fn is_forced(&self, name: &str) -> bool {
        self.force_send_fields.contains(name)
    }

    pub fn is_null(&self, name: &str) -> bool {
        self.null_fields.contains(name)
    }

    pub fn force_send_fields(&self) -> impl Iterator<Item = &str> {
        self.force_send_fields.iter().map(String::as_str)
    }

    pub fn null_fields(&self) -> impl Iterator<Item = &str> {
        self.null_fields.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.force_send_fields.is_empty() && self.null_fields.is_empty()
    }

    /// Store an optional value into `slot` and keep `null_fields` in sync.
    ///
    /// `None` records `name` as an explicit null; `Some` removes it again. The
    /// force-send set is left untouched either way. Typed setters on request
    /// structs delegate here:
    ///
    /// ```rust
    /// use spotinst_types::FieldState;
    ///
    /// let mut state = FieldState::new();
    /// let mut name: Option<String> = Some("web".into());
    ///
    /// state.assign("name", &mut name, None);
    /// assert!(state.is_null("name"));
    ///
    /// state.assign("name", &mut name, Some("api".into()));
    /// assert!(!state.is_null("name"));
    /// assert_eq!(name.as_deref(), Some("api"));
    /// ```
    pub fn assign<T>(&mut self, name: &str, slot: &mut Option<T>, value: Option<T>) {
        if value.is_none() {
            self.set_null(name);
        } else {
            self.clear_null(name);
        }
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_never_touches_force_send_fields() {
        let mut state = FieldState::new().with_force_send("capacity");
        let mut capacity: Option<i64> = None;

        state.assign("capacity", &mut capacity, None);
        assert!(state.is_null("capacity"));
        assert!(state.is_forced("capacity"));

        state.assign("capacity", &mut capacity, Some(3));
        assert!(!state.is_null("capacity"));
        assert!(state.is_forced("capacity"));
        assert_eq!(capacity, Some(3));
    }

    #[test]
    fn from_lists_preserves_insertion_order() {
        let state = FieldState::from_lists(["b", "a"], ["z"]);
        assert_eq!(state.force_send_fields().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(state.null_fields().collect::<Vec<_>>(), vec!["z"]);
        assert!(!state.is_empty());
    }
}
