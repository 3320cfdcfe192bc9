use std::ops::{Index, IndexMut};

use crate::error::SqlCommandError;
use crate::types::DbValue;

use super::Parameter;

/// Ordered, name-addressable collection of parameters.
///
/// Insertion order is kept, but drivers match parameters by name. Lookups expect exactly one
/// parameter per name: a missing name and a name shared by several parameters are both errors,
/// so callers must keep names unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList {
    items: Vec<Parameter>,
}

impl ParameterList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append a parameter. Duplicate names are not rejected here; they surface on lookup.
    pub fn add(&mut self, parameter: Parameter) {
        self.items.push(parameter);
    }

    /// Builder-style `add`.
    #[must_use]
    pub fn with(mut self, parameter: Parameter) -> Self {
        self.add(parameter);
        self
    }

    fn position(&self, name: &str) -> Result<usize, SqlCommandError> {
        let mut matches = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, p)| p.name == name)
            .map(|(idx, _)| idx);
        match (matches.next(), matches.count()) {
            (Some(idx), 0) => Ok(idx),
            (Some(_), extra) => Err(SqlCommandError::AmbiguousParameter {
                name: name.to_owned(),
                matches: extra + 1,
            }),
            (None, _) => Err(SqlCommandError::ParameterNotFound {
                name: name.to_owned(),
            }),
        }
    }

    /// Look a parameter up by name.
    ///
    /// # Errors
    /// `ParameterNotFound` if no parameter has this name, `AmbiguousParameter` if several do.
    pub fn get(&self, name: &str) -> Result<&Parameter, SqlCommandError> {
        let idx = self.position(name)?;
        Ok(&self.items[idx])
    }

    /// Mutable lookup by name with the same single-match rule as [`ParameterList::get`].
    ///
    /// # Errors
    /// `ParameterNotFound` or `AmbiguousParameter`.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Parameter, SqlCommandError> {
        let idx = self.position(name)?;
        Ok(&mut self.items[idx])
    }

    /// Current value of the named parameter.
    ///
    /// # Errors
    /// `ParameterNotFound` or `AmbiguousParameter`.
    pub fn value(&self, name: &str) -> Result<&DbValue, SqlCommandError> {
        self.get(name).map(|p| &p.value)
    }

    /// Overwrite the value of the named parameter.
    ///
    /// # Errors
    /// `ParameterNotFound` or `AmbiguousParameter`.
    pub fn set_value(&mut self, name: &str, value: DbValue) -> Result<(), SqlCommandError> {
        self.get_mut(name)?.value = value;
        Ok(())
    }

    /// Remove and return the named parameter.
    ///
    /// # Errors
    /// `ParameterNotFound` or `AmbiguousParameter`.
    pub fn remove(&mut self, name: &str) -> Result<Parameter, SqlCommandError> {
        let idx = self.position(name)?;
        Ok(self.items.remove(idx))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|p| p.name == name)
    }

    /// Positional access.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&Parameter> {
        self.items.get(index)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Parameter> {
        self.items.iter_mut()
    }

    /// Parameter names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|p| p.name.clone()).collect()
    }

    /// Parameters the server writes back (Out, InOut, ReturnValue).
    pub fn iter_out(&self) -> impl Iterator<Item = &Parameter> {
        self.items.iter().filter(|p| p.is_output())
    }
}

impl Index<usize> for ParameterList {
    type Output = Parameter;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl IndexMut<usize> for ParameterList {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.items[index]
    }
}

impl FromIterator<Parameter> for ParameterList {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<Parameter> for ParameterList {
    fn extend<I: IntoIterator<Item = Parameter>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl IntoIterator for ParameterList {
    type Item = Parameter;
    type IntoIter = std::vec::IntoIter<Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SemanticType;

    #[test]
    fn get_after_add_returns_parameter_unchanged() {
        let p = Parameter::input("@Id", 7i32).with_size(4);
        let mut list = ParameterList::new();
        list.add(Parameter::input("@Other", "x"));
        list.add(p.clone());
        assert_eq!(list.get("@Id").unwrap(), &p);
        assert_eq!(list.count(), 2);
        assert_eq!(list[1], p);
    }

    #[test]
    fn remove_then_get_is_not_found() {
        let mut list = ParameterList::new().with(Parameter::input("@Id", 1i64));
        let removed = list.remove("@Id").unwrap();
        assert_eq!(removed.name, "@Id");
        let err = list.get("@Id").unwrap_err();
        assert!(matches!(err, SqlCommandError::ParameterNotFound { ref name } if name == "@Id"));
        assert!(list.is_empty());
    }

    #[test]
    fn duplicate_names_fail_lookup() {
        let list = ParameterList::new()
            .with(Parameter::input("@Id", 1i32))
            .with(Parameter::input("@Id", 2i32));
        let err = list.get("@Id").unwrap_err();
        assert!(matches!(err, SqlCommandError::AmbiguousParameter { matches: 2, .. }));
        assert!(err.is_binding_error());
    }

    #[test]
    fn set_value_and_iter_out() {
        let mut list = ParameterList::new()
            .with(Parameter::input("@In", 1i32))
            .with(Parameter::output("@Out", SemanticType::Int32));
        list.set_value("@Out", DbValue::I32(9)).unwrap();
        let outs: Vec<_> = list.iter_out().map(|p| p.name.as_str()).collect();
        assert_eq!(outs, vec!["@Out"]);
        assert_eq!(list.value("@Out").unwrap(), &DbValue::I32(9));
        assert_eq!(list.names(), vec!["@In".to_string(), "@Out".to_string()]);
    }
}
