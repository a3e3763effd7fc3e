//! Resource resolver: fetches what a [`ResourceAddress`] names from the
//! repository.

use crate::address::{
    AddressError, ItemRange, RANGE_UNIT, RequestKind, RequestOptions, ResourceAddress,
};
use crate::error::{GatewayError, GatewayResult};
use crate::types;
use cimrs_kernel::Repository;
use cimrs_kernel::model::{ClassName, ClassSchema, Instance, KeyBinding, KeyBindings, Namespace};
use tracing::debug;

/// Repository data for one request, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Class schema, and whether qualifiers were requested.
    Class(ClassSchema, bool),
    /// Schema of the requested class plus its instances. The range is set
    /// for ranged reads and describes the members kept.
    Collection(ClassSchema, Vec<Instance>, Option<ContentRange>),
    Instance(ClassSchema, Instance),
}

/// The part of a collection served for a ranged read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// Inclusive indices of the members served; `None` when the range
    /// starts past the end.
    pub served: Option<(usize, usize)>,
    /// Size of the whole collection.
    pub total: usize,
}

impl ContentRange {
    /// `items 0-24/180`, or `items */180` for an empty window.
    pub fn header_value(&self) -> String {
        match self.served {
            Some((first, last)) => format!("{RANGE_UNIT} {first}-{last}/{}", self.total),
            None => format!("{RANGE_UNIT} */{}", self.total),
        }
    }
}

/// Fetch the resource named by `address`.
pub fn resolve(
    repo: &dyn Repository,
    address: &ResourceAddress,
    options: &RequestOptions,
) -> GatewayResult<Resolved> {
    let ns = &address.namespace;
    let class = &address.class_name;
    let schema = repo.get_class_schema(ns, class)?;

    match address.kind {
        RequestKind::Class => {
            let schema = if options.include_qualifiers {
                schema
            } else {
                schema.without_qualifiers()
            };
            Ok(Resolved::Class(schema, options.include_qualifiers))
        }
        RequestKind::Collection => {
            let mut instances = repo.list_instances(ns, class)?;
            if options.deep_inheritance {
                let mut visited = vec![schema.name.clone()];
                collect_subclass_instances(repo, ns, class, &mut visited, &mut instances)?;
            }
            debug!(namespace = %ns, class = %class, count = instances.len(), "collection resolved");
            match options.range {
                Some(range) => {
                    let (page, content_range) = select_range(instances, range);
                    Ok(Resolved::Collection(schema, page, Some(content_range)))
                }
                None => Ok(Resolved::Collection(schema, instances, None)),
            }
        }
        RequestKind::Instance => {
            let literals = address.key.as_deref().unwrap_or_default();
            let keys = bind_keys(&schema, literals)?;
            let instance = repo.get_instance(ns, class, &keys)?;
            Ok(Resolved::Instance(schema, instance))
        }
    }
}

/// Depth-first walk over the subclass tree below `class`.
fn collect_subclass_instances(
    repo: &dyn Repository,
    ns: &Namespace,
    class: &ClassName,
    visited: &mut Vec<ClassName>,
    out: &mut Vec<Instance>,
) -> GatewayResult<()> {
    for subclass in repo.list_subclass_names(ns, class)? {
        if visited.iter().any(|v| v.eq_ignore_case(&subclass)) {
            continue;
        }
        visited.push(subclass.clone());
        out.extend(repo.list_instances(ns, &subclass)?);
        collect_subclass_instances(repo, ns, &subclass, visited, out)?;
    }
    Ok(())
}

/// Keep the members of `instances` that fall inside `range`.
pub fn select_range(
    mut instances: Vec<Instance>,
    range: ItemRange,
) -> (Vec<Instance>, ContentRange) {
    let total = instances.len();
    if range.first >= total {
        return (Vec::new(), ContentRange { served: None, total });
    }
    let last = range.last.map_or(total - 1, |last| last.min(total - 1));
    instances.truncate(last + 1);
    instances.drain(..range.first);
    (
        instances,
        ContentRange {
            served: Some((range.first, last)),
            total,
        },
    )
}

/// Pair URI key literals with the class's key properties (sorted by name,
/// case-insensitively) and type them.
pub fn bind_keys(schema: &ClassSchema, literals: &[String]) -> GatewayResult<KeyBindings> {
    let key_properties = schema.key_properties();
    if key_properties.is_empty() {
        return Err(invalid_key(format!("class {} has no key properties", schema.name)));
    }
    if key_properties.len() != literals.len() {
        return Err(invalid_key(format!(
            "class {} has {} key properties, got {} value(s)",
            schema.name,
            key_properties.len(),
            literals.len()
        )));
    }

    key_properties
        .into_iter()
        .zip(literals)
        .map(|(property, literal)| {
            if property.is_array {
                return Err(invalid_key(format!("key {} is an array", property.name)));
            }
            let value = types::parse_key_literal(property.cim_type, literal)
                .map_err(|e| invalid_key(format!("{}: {e}", property.name)))?;
            Ok(KeyBinding::new(property.name.clone(), value))
        })
        .collect::<GatewayResult<Vec<_>>>()
        .map(KeyBindings::new)
}

fn invalid_key(message: String) -> GatewayError {
    GatewayError::Address(AddressError::InvalidKey(message))
}
