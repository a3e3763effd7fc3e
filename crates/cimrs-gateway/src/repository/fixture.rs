//! Seeding an [`InMemoryRepository`] from a JSON or YAML fixture document.
//!
//! ```yaml
//! namespaces:
//!   test/TestProvider:
//!     classes:
//!       - name: ACME_Widget
//!         superclass: null
//!         qualifiers:
//!           - { name: Description, type: string, value: "A widget" }
//!         properties:
//!           - name: Id
//!             type: uint32
//!             qualifiers: [{ name: Key, type: boolean, value: true }]
//!           - { name: Tags, type: string, array: true }
//!     instances:
//!       - class: ACME_Widget
//!         properties: { Id: 1, Tags: ["a", "b"] }
//! ```
//!
//! Classes are declared with their own properties only and must follow
//! their superclass. Values are decoded with the type mapper, so integer
//! widths are checked when the fixture is loaded.

use super::InMemoryRepository;
use crate::types::{self, TypeError};
use cimrs_kernel::config::{self, ConfigError, Format};
use cimrs_kernel::model::{
    CimType, ClassSchema, Instance, Namespace, PropertyDescriptor, Qualifier,
};
use cimrs_kernel::{KernelError, KernelResult, Repository};
use error_stack::{Report, ResultExt};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FixtureDocument {
    namespaces: BTreeMap<String, NamespaceFixture>,
}

#[derive(Debug, Deserialize)]
struct NamespaceFixture {
    #[serde(default)]
    classes: Vec<ClassFixture>,
    #[serde(default)]
    instances: Vec<InstanceFixture>,
}

#[derive(Debug, Deserialize)]
struct ClassFixture {
    name: String,
    #[serde(default)]
    superclass: Option<String>,
    #[serde(default)]
    qualifiers: Vec<QualifierFixture>,
    #[serde(default)]
    properties: Vec<PropertyFixture>,
}

#[derive(Debug, Deserialize)]
struct QualifierFixture {
    name: String,
    #[serde(rename = "type")]
    cim_type: CimType,
    #[serde(default)]
    array: bool,
    value: Value,
}

#[derive(Debug, Deserialize)]
struct PropertyFixture {
    name: String,
    #[serde(rename = "type")]
    cim_type: CimType,
    #[serde(default)]
    array: bool,
    #[serde(default)]
    qualifiers: Vec<QualifierFixture>,
    #[serde(default)]
    default: Value,
}

#[derive(Debug, Deserialize)]
struct InstanceFixture {
    class: String,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

/// Load a fixture file. The format is taken from the extension; TOML is
/// rejected because it cannot express `null`.
pub fn load_fixture(path: impl AsRef<Path>) -> KernelResult<InMemoryRepository> {
    let path = path.as_ref();
    let context = || format!("loading fixture {}", path.display());

    let (content, format) = config::read_source(path)
        .map_err(KernelError::from)
        .map_err(Report::new)
        .attach_with(context)?;

    let document: Value = match format {
        Format::Json => serde_json::from_str(&content).map_err(KernelError::from),
        Format::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| KernelError::Internal(format!("invalid YAML: {e}"))),
        other => Err(KernelError::Config(ConfigError::UnsupportedFormat(format!(
            "{other:?} fixtures are not supported"
        )))),
    }
    .map_err(Report::new)
    .attach_with(context)?;

    from_document(&document).attach_with(context)
}

/// Build a repository from an already parsed fixture document.
pub fn from_document(document: &Value) -> KernelResult<InMemoryRepository> {
    let fixture: FixtureDocument = serde_json::from_value(document.clone())
        .map_err(KernelError::from)
        .map_err(Report::new)?;

    let mut repo = InMemoryRepository::new();
    for (name, ns_fixture) in fixture.namespaces {
        let namespace = Namespace::new(name);
        repo.add_namespace(namespace.clone());

        for class in ns_fixture.classes {
            let class_name = class.name.clone();
            let schema = class_schema(class)
                .map_err(Report::new)
                .attach_with(|| format!("class {class_name}"))?;
            repo.add_class(&namespace, schema)
                .map_err(KernelError::from)
                .map_err(Report::new)
                .attach_with(|| format!("class {class_name} in {namespace}"))?;
        }

        for (position, instance) in ns_fixture.instances.into_iter().enumerate() {
            let label = || format!("instance #{position} of {} in {namespace}", instance.class);
            let built = build_instance(&repo, &namespace, &instance).attach_with(label)?;
            repo.add_instance(&namespace, built)
                .map_err(KernelError::from)
                .map_err(Report::new)
                .attach_with(label)?;
        }
    }

    tracing::info!(namespaces = repo.namespaces().len(), "fixture loaded");
    Ok(repo)
}

fn type_error(err: TypeError, what: &str) -> KernelError {
    KernelError::Internal(format!("{what}: {err}"))
}

fn qualifiers(list: Vec<QualifierFixture>) -> Result<Vec<Qualifier>, KernelError> {
    list.into_iter()
        .map(|q| {
            let value = types::from_json(q.cim_type, q.array, &q.value)
                .map_err(|e| type_error(e, &format!("qualifier {}", q.name)))?;
            Ok(Qualifier::new(q.name, value))
        })
        .collect()
}

fn class_schema(class: ClassFixture) -> Result<ClassSchema, KernelError> {
    let mut schema = ClassSchema::new(class.name);
    if let Some(superclass) = class.superclass {
        schema = schema.with_superclass(superclass);
    }
    schema.qualifiers = qualifiers(class.qualifiers)?;

    for p in class.properties {
        let default = types::from_json(p.cim_type, p.array, &p.default)
            .map_err(|e| type_error(e, &format!("default of {}", p.name)))?;
        let mut descriptor = PropertyDescriptor::new(p.name, p.cim_type).with_default(default);
        descriptor.is_array = p.array;
        descriptor.qualifiers = qualifiers(p.qualifiers)?;
        schema = schema.with_property(descriptor);
    }
    Ok(schema)
}

fn build_instance(
    repo: &InMemoryRepository,
    namespace: &Namespace,
    fixture: &InstanceFixture,
) -> KernelResult<Instance> {
    let schema = repo
        .get_class_schema(namespace, &fixture.class.as_str().into())
        .map_err(KernelError::from)
        .map_err(Report::new)?;

    let mut instance = Instance::new(schema.name.clone());
    for (name, raw) in &fixture.properties {
        let descriptor = schema.property(name).ok_or_else(|| {
            Report::new(KernelError::Internal(format!(
                "class {} has no property {name}",
                schema.name
            )))
        })?;
        let value = types::from_json(descriptor.cim_type, descriptor.is_array, raw)
            .map_err(|e| type_error(e, &format!("property {name}")))
            .map_err(Report::new)?;
        instance.set(descriptor.name.clone(), value);
    }
    Ok(instance)
}
