//! Instances and the key bindings that identify them.

use super::names::ClassName;
use super::schema::ClassSchema;
use super::value::CimValue;
use std::fmt;

/// A (name, value) pair on an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: CimValue,
}

impl Property {
    pub fn new(name: impl Into<String>, value: CimValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Key bindings
// ─────────────────────────────────────────────────────────────────────────────

/// One key property and its typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub name: String,
    pub value: CimValue,
}

impl KeyBinding {
    pub fn new(name: impl Into<String>, value: CimValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// The full key of an instance, sorted case-insensitively by key name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyBindings(Vec<KeyBinding>);

impl KeyBindings {
    pub fn new(mut bindings: Vec<KeyBinding>) -> Self {
        bindings.sort_by_key(|b| b.name.to_ascii_lowercase());
        Self(bindings)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyBinding> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CimValue> {
        self.0
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .map(|b| &b.value)
    }
}

impl<'a> IntoIterator for &'a KeyBindings {
    type Item = &'a KeyBinding;
    type IntoIter = std::slice::Iter<'a, KeyBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for KeyBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={:?}", b.name, b.value)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Instance
// ─────────────────────────────────────────────────────────────────────────────

/// A concrete object of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub class_name: ClassName,
    pub properties: Vec<Property>,
}

impl Instance {
    pub fn new(class_name: impl Into<ClassName>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: Vec::new(),
        }
    }

    /// Builder: append a property. Later values for the same name win.
    pub fn with_property(mut self, name: impl Into<String>, value: CimValue) -> Self {
        self.set(name, value);
        self
    }

    /// Set a property, replacing any existing value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: CimValue) {
        let name = name.into();
        match self
            .properties
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.value = value,
            None => self.properties.push(Property::new(name, value)),
        }
    }

    /// Case-insensitive property lookup.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn value(&self, name: &str) -> Option<&CimValue> {
        self.property(name).map(|p| &p.value)
    }

    /// Extract this instance's key according to `class`.
    ///
    /// Key properties the instance does not set are bound to `Null`.
    pub fn key_bindings(&self, class: &ClassSchema) -> KeyBindings {
        KeyBindings::new(
            class
                .key_properties()
                .into_iter()
                .map(|p| {
                    let value = self.value(&p.name).cloned().unwrap_or_default();
                    KeyBinding::new(p.name.clone(), value)
                })
                .collect(),
        )
    }

    /// `true` when every binding in `keys` equals the instance's value.
    pub fn matches(&self, keys: &KeyBindings) -> bool {
        !keys.is_empty()
            && keys
                .iter()
                .all(|b| self.value(&b.name).is_some_and(|v| *v == b.value))
    }
}
