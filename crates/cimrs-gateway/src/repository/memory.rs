//! In-memory [`Repository`] implementation.

use cimrs_kernel::model::{
    ClassName, ClassSchema, Instance, KeyBindings, Namespace, PropertyDescriptor,
};
use cimrs_kernel::{Repository, RepositoryError};
use std::collections::HashMap;

/// Classes and instances of one namespace, in definition order.
#[derive(Debug)]
struct NamespaceStore {
    name: Namespace,
    classes: Vec<ClassEntry>,
    /// Lowercased class name → index into `classes`.
    index: HashMap<String, usize>,
}

#[derive(Debug)]
struct ClassEntry {
    /// Declaration as given: own properties only.
    declared: ClassSchema,
    instances: Vec<Instance>,
}

impl NamespaceStore {
    fn entry(&self, class: &ClassName) -> Option<&ClassEntry> {
        self.index
            .get(&class.as_str().to_ascii_lowercase())
            .map(|&i| &self.classes[i])
    }

    /// Merge the declared properties of `class` and all its ancestors,
    /// ancestors first. A redeclared property replaces the inherited one in
    /// place.
    fn propagated(&self, class: &ClassName) -> Option<ClassSchema> {
        let mut chain = Vec::new();
        let mut cursor = Some(class.clone());
        while let Some(name) = cursor {
            let entry = self.entry(&name)?;
            // Superclass cycles are rejected on insert; this guards corrupt state.
            if chain.len() > self.classes.len() {
                return None;
            }
            cursor = entry.declared.superclass.clone();
            chain.push(&entry.declared);
        }

        let own = chain.first()?;
        let mut properties: Vec<PropertyDescriptor> = Vec::new();
        for declared in chain.iter().rev() {
            for property in &declared.properties {
                match properties
                    .iter_mut()
                    .find(|p| p.name.eq_ignore_ascii_case(&property.name))
                {
                    Some(inherited) => *inherited = property.clone(),
                    None => properties.push(property.clone()),
                }
            }
        }

        Some(ClassSchema {
            name: own.name.clone(),
            superclass: own.superclass.clone(),
            properties,
            qualifiers: own.qualifiers.clone(),
        })
    }
}

/// [`Repository`] backed by in-process maps.
///
/// Populate it with [`add_class`](Self::add_class) and
/// [`add_instance`](Self::add_instance) (or from a fixture document), then
/// share it read-only behind an `Arc`. Namespace and class lookups are
/// case-insensitive; the stored spelling is what lookups return.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    /// Lowercased namespace name → store.
    namespaces: HashMap<String, NamespaceStore>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty namespace. Existing namespaces are left untouched.
    pub fn add_namespace(&mut self, namespace: impl Into<Namespace>) {
        let namespace = namespace.into();
        self.namespaces
            .entry(namespace.as_str().to_ascii_lowercase())
            .or_insert_with(|| NamespaceStore {
                name: namespace,
                classes: Vec::new(),
                index: HashMap::new(),
            });
    }

    pub fn namespaces(&self) -> Vec<&Namespace> {
        let mut names: Vec<&Namespace> = self.namespaces.values().map(|s| &s.name).collect();
        names.sort();
        names
    }

    /// Define a class. `class.properties` holds only the properties the
    /// class itself declares; inherited ones come from the superclass, which
    /// must already be defined.
    pub fn add_class(
        &mut self,
        namespace: &Namespace,
        class: ClassSchema,
    ) -> Result<(), RepositoryError> {
        self.add_namespace(namespace.clone());
        let store = self.store_mut(namespace)?;

        let key = class.name.as_str().to_ascii_lowercase();
        if store.index.contains_key(&key) {
            return Err(RepositoryError::Failed(format!(
                "class '{}' is already defined in '{}'",
                class.name, namespace
            )));
        }
        if let Some(superclass) = &class.superclass {
            if store.entry(superclass).is_none() {
                return Err(RepositoryError::InvalidClass {
                    namespace: namespace.to_string(),
                    class: superclass.to_string(),
                });
            }
        }

        tracing::debug!(namespace = %namespace, class = %class.name, "class defined");
        store.index.insert(key, store.classes.len());
        store.classes.push(ClassEntry {
            declared: class,
            instances: Vec::new(),
        });
        Ok(())
    }

    /// Add an instance of an already defined class.
    ///
    /// Properties the instance does not set take the declared default (or
    /// `Null`). Every key property must end up with a scalar value, and an
    /// instance whose key equals an existing one is rejected.
    pub fn add_instance(
        &mut self,
        namespace: &Namespace,
        instance: Instance,
    ) -> Result<(), RepositoryError> {
        let schema = self.get_class_schema(namespace, &instance.class_name)?;

        let mut complete = Instance::new(schema.name.clone());
        for property in &schema.properties {
            let value = instance
                .value(&property.name)
                .cloned()
                .unwrap_or_else(|| property.default.clone());
            complete.set(property.name.clone(), value);
        }
        if let Some(unknown) = instance
            .properties
            .iter()
            .find(|p| schema.property(&p.name).is_none())
        {
            return Err(RepositoryError::Failed(format!(
                "class '{}' has no property '{}'",
                schema.name, unknown.name
            )));
        }

        let keys = complete.key_bindings(&schema);
        if let Some(bad) = keys.iter().find(|k| k.value.is_null() || k.value.is_array()) {
            return Err(RepositoryError::Failed(format!(
                "instance of '{}' needs a scalar value for key '{}'",
                schema.name, bad.name
            )));
        }
        let store = self.store_mut(namespace)?;
        let index = store
            .index
            .get(&schema.name.as_str().to_ascii_lowercase())
            .copied()
            .ok_or_else(|| invalid_class(namespace, &schema.name))?;
        let entry = &mut store.classes[index];
        if !keys.is_empty() && entry.instances.iter().any(|i| i.matches(&keys)) {
            return Err(RepositoryError::Failed(format!(
                "duplicate instance of '{}' with key {keys}",
                schema.name
            )));
        }
        entry.instances.push(complete);
        Ok(())
    }

    fn store(&self, namespace: &Namespace) -> Result<&NamespaceStore, RepositoryError> {
        self.namespaces
            .get(&namespace.as_str().to_ascii_lowercase())
            .ok_or_else(|| RepositoryError::InvalidNamespace(namespace.to_string()))
    }

    fn store_mut(&mut self, namespace: &Namespace) -> Result<&mut NamespaceStore, RepositoryError> {
        self.namespaces
            .get_mut(&namespace.as_str().to_ascii_lowercase())
            .ok_or_else(|| RepositoryError::InvalidNamespace(namespace.to_string()))
    }

    fn class_entry(
        &self,
        namespace: &Namespace,
        class: &ClassName,
    ) -> Result<&ClassEntry, RepositoryError> {
        self.store(namespace)?
            .entry(class)
            .ok_or_else(|| invalid_class(namespace, class))
    }
}

fn invalid_class(namespace: &Namespace, class: &ClassName) -> RepositoryError {
    RepositoryError::InvalidClass {
        namespace: namespace.to_string(),
        class: class.to_string(),
    }
}

impl Repository for InMemoryRepository {
    fn get_class_schema(
        &self,
        namespace: &Namespace,
        class: &ClassName,
    ) -> Result<ClassSchema, RepositoryError> {
        self.store(namespace)?
            .propagated(class)
            .ok_or_else(|| invalid_class(namespace, class))
    }

    fn list_instances(
        &self,
        namespace: &Namespace,
        class: &ClassName,
    ) -> Result<Vec<Instance>, RepositoryError> {
        Ok(self.class_entry(namespace, class)?.instances.clone())
    }

    fn get_instance(
        &self,
        namespace: &Namespace,
        class: &ClassName,
        keys: &KeyBindings,
    ) -> Result<Instance, RepositoryError> {
        self.class_entry(namespace, class)?
            .instances
            .iter()
            .find(|i| i.matches(keys))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                class: class.to_string(),
                key: keys.to_string(),
            })
    }

    fn list_subclass_names(
        &self,
        namespace: &Namespace,
        class: &ClassName,
    ) -> Result<Vec<ClassName>, RepositoryError> {
        let store = self.store(namespace)?;
        if store.entry(class).is_none() {
            return Err(invalid_class(namespace, class));
        }
        Ok(store
            .classes
            .iter()
            .filter(|e| {
                e.declared
                    .superclass
                    .as_ref()
                    .is_some_and(|s| s.eq_ignore_case(class))
            })
            .map(|e| e.declared.name.clone())
            .collect())
    }
}
