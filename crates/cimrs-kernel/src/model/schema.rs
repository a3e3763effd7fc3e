//! Class schema: qualifiers, property descriptors and the class itself.

use super::names::ClassName;
use super::value::{CimType, CimValue};

/// Name of the qualifier that marks a property as part of the instance key.
pub const KEY_QUALIFIER: &str = "Key";

// ─────────────────────────────────────────────────────────────────────────────
// Qualifier
// ─────────────────────────────────────────────────────────────────────────────

/// Schema-level metadata attached to a class or a property.
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    pub name: String,
    pub value: CimValue,
}

impl Qualifier {
    pub fn new(name: impl Into<String>, value: CimValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

fn find_qualifier<'a>(qualifiers: &'a [Qualifier], name: &str) -> Option<&'a Qualifier> {
    qualifiers.iter().find(|q| q.name.eq_ignore_ascii_case(name))
}

// ─────────────────────────────────────────────────────────────────────────────
// PropertyDescriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Declaration of a single property within a [`ClassSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub cim_type: CimType,
    pub is_array: bool,
    pub qualifiers: Vec<Qualifier>,
    /// Value an instance gets when it does not set the property.
    pub default: CimValue,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, cim_type: CimType) -> Self {
        Self {
            name: name.into(),
            cim_type,
            is_array: false,
            qualifiers: Vec::new(),
            default: CimValue::Null,
        }
    }

    /// Builder: declare the property as an array of `cim_type`.
    pub fn with_array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub fn with_default(mut self, default: CimValue) -> Self {
        self.default = default;
        self
    }

    pub fn qualifier(&self, name: &str) -> Option<&Qualifier> {
        find_qualifier(&self.qualifiers, name)
    }

    /// `true` when the property carries `Key(true)`.
    pub fn is_key(&self) -> bool {
        self.qualifier(KEY_QUALIFIER)
            .and_then(|q| q.value.as_bool())
            .unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ClassSchema
// ─────────────────────────────────────────────────────────────────────────────

/// A class definition as returned by the repository.
///
/// `properties` holds the full propagated property set (own and inherited)
/// in declaration order, superclass properties first.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSchema {
    pub name: ClassName,
    pub superclass: Option<ClassName>,
    pub properties: Vec<PropertyDescriptor>,
    pub qualifiers: Vec<Qualifier>,
}

impl ClassSchema {
    pub fn new(name: impl Into<ClassName>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            properties: Vec::new(),
            qualifiers: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<ClassName>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// Case-insensitive property lookup.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn qualifier(&self, name: &str) -> Option<&Qualifier> {
        find_qualifier(&self.qualifiers, name)
    }

    /// Key properties sorted case-insensitively by name.
    ///
    /// This is the order in which key values appear in an instance URI.
    pub fn key_properties(&self) -> Vec<&PropertyDescriptor> {
        let mut keys: Vec<&PropertyDescriptor> =
            self.properties.iter().filter(|p| p.is_key()).collect();
        keys.sort_by_key(|p| p.name.to_ascii_lowercase());
        keys
    }

    /// Copy of this schema with every class and property qualifier removed.
    pub fn without_qualifiers(&self) -> Self {
        Self {
            name: self.name.clone(),
            superclass: self.superclass.clone(),
            properties: self
                .properties
                .iter()
                .map(|p| PropertyDescriptor {
                    qualifiers: Vec::new(),
                    ..p.clone()
                })
                .collect(),
            qualifiers: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, ty: CimType) -> PropertyDescriptor {
        PropertyDescriptor::new(name, ty).with_qualifier(Qualifier::new("key", CimValue::Boolean(true)))
    }

    #[test]
    fn key_qualifier_is_matched_ignoring_case() {
        assert!(key("theKey", CimType::Uint32).is_key());
        let not_key = PropertyDescriptor::new("Name", CimType::String)
            .with_qualifier(Qualifier::new("Key", CimValue::Boolean(false)));
        assert!(!not_key.is_key());
    }

    #[test]
    fn key_properties_are_sorted_case_insensitively() {
        let class = ClassSchema::new("ACME_Pair")
            .with_property(key("zeta", CimType::String))
            .with_property(PropertyDescriptor::new("Payload", CimType::String))
            .with_property(key("Alpha", CimType::Uint16));

        let names: Vec<&str> = class.key_properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "zeta"]);
    }

    #[test]
    fn without_qualifiers_strips_class_and_property_metadata() {
        let class = ClassSchema::new("ACME_Pair")
            .with_qualifier(Qualifier::new("Description", CimValue::from("pair")))
            .with_property(key("Id", CimType::Uint8));

        let bare = class.without_qualifiers();
        assert!(bare.qualifiers.is_empty());
        assert!(bare.properties[0].qualifiers.is_empty());
        assert_eq!(bare.properties.len(), 1);
        // The original is untouched.
        assert!(class.properties[0].is_key());
    }
}
