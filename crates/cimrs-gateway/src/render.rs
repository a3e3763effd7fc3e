//! Representation builder.
//!
//! Shapes resolved repository data into the JSON documents the gateway
//! serves. Every leaf value goes through [`types::to_json`].

use crate::address::{RequestOptions, instance_path, key_ref};
use crate::error::GatewayResult;
use crate::resolver::Resolved;
use crate::types;
use cimrs_kernel::model::{ClassSchema, Instance, Namespace, Qualifier};
use serde_json::{Map, Value};

/// Link member carried by every collection element.
pub const REF_MEMBER: &str = "$ref";

/// Where collection members that are not of the requested class link to.
#[derive(Debug, Clone, Copy)]
pub struct LinkBase<'a> {
    pub root: &'a str,
    pub namespace: &'a Namespace,
}

/// Build the JSON document for a resolved resource.
pub fn render(
    resolved: &Resolved,
    options: &RequestOptions,
    base: LinkBase<'_>,
) -> GatewayResult<Value> {
    match resolved {
        Resolved::Class(schema, include_qualifiers) => Ok(class(schema, *include_qualifiers)),
        Resolved::Collection(schema, instances, _) => collection(schema, instances, base),
        Resolved::Instance(_, inst) => Ok(instance(inst, options)),
    }
}

/// `{"name", "superclass", "properties": {..}, "qualifiers": {..}}`
///
/// `superclass` is left out for root classes; qualifier maps only appear
/// when requested.
pub fn class(schema: &ClassSchema, include_qualifiers: bool) -> Value {
    let mut doc = Map::new();
    doc.insert("name".into(), Value::String(schema.name.to_string()));
    if let Some(superclass) = &schema.superclass {
        doc.insert("superclass".into(), Value::String(superclass.to_string()));
    }

    let mut properties = Map::new();
    for property in &schema.properties {
        let mut descriptor = Map::new();
        descriptor.insert(
            "type".into(),
            Value::String(types::type_name(property.cim_type).to_string()),
        );
        if property.is_array {
            descriptor.insert("array".into(), Value::Bool(true));
        }
        if include_qualifiers {
            descriptor.insert("qualifiers".into(), qualifiers(&property.qualifiers));
        }
        properties.insert(property.name.clone(), Value::Object(descriptor));
    }
    doc.insert("properties".into(), Value::Object(properties));

    if include_qualifiers {
        doc.insert("qualifiers".into(), qualifiers(&schema.qualifiers));
    }
    Value::Object(doc)
}

fn qualifiers(list: &[Qualifier]) -> Value {
    Value::Object(
        list.iter()
            .map(|q| (q.name.clone(), types::to_json(&q.value)))
            .collect(),
    )
}

/// Flat object with one member per (selected) property.
pub fn instance(inst: &Instance, options: &RequestOptions) -> Value {
    Value::Object(
        inst.properties
            .iter()
            .filter(|p| options.selects(&p.name))
            .map(|p| (p.name.clone(), types::to_json(&p.value)))
            .collect(),
    )
}

/// Array of instance summaries: the key properties plus `$ref`.
///
/// `$ref` is the bare key reference, relative to the collection URI. Members
/// of a subclass (`DeepInheritance`) link to their own class instead, with
/// an absolute instance path.
pub fn collection(
    schema: &ClassSchema,
    instances: &[Instance],
    base: LinkBase<'_>,
) -> GatewayResult<Value> {
    let key_properties = schema.key_properties();
    let mut items = Vec::with_capacity(instances.len());

    for inst in instances {
        let mut summary = Map::new();
        let mut literals = Vec::with_capacity(key_properties.len());
        for property in &key_properties {
            let value = inst.value(&property.name).cloned().unwrap_or_default();
            literals.push(types::key_literal(&value)?);
            summary.insert(property.name.clone(), types::to_json(&value));
        }
        let key = key_ref(&literals);
        let link = if inst.class_name.eq_ignore_case(&schema.name) {
            key
        } else {
            instance_path(base.root, base.namespace, &inst.class_name, &key)
        };
        summary.insert(REF_MEMBER.into(), Value::String(link));
        items.push(Value::Object(summary));
    }
    Ok(Value::Array(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use cimrs_kernel::model::{CimType, CimValue, PropertyDescriptor};
    use serde_json::json;

    fn schema() -> ClassSchema {
        ClassSchema::new("ACME_Widget")
            .with_superclass("ACME_Base")
            .with_qualifier(Qualifier::new("Version", CimValue::from("2.1")))
            .with_property(
                PropertyDescriptor::new("theKey", CimType::Uint32)
                    .with_qualifier(Qualifier::new("Key", CimValue::Boolean(true))),
            )
            .with_property(PropertyDescriptor::new("Name", CimType::String))
            .with_property(PropertyDescriptor::new("Levels", CimType::Sint8).with_array())
    }

    fn base(namespace: &Namespace) -> LinkBase<'_> {
        LinkBase {
            root: "cimrs",
            namespace,
        }
    }

    fn widget(key: u32) -> Instance {
        Instance::new("ACME_Widget")
            .with_property("theKey", CimValue::Uint32(key))
            .with_property("Name", CimValue::Null)
            .with_property("Levels", CimValue::Array(vec![CimValue::Sint8(-1)]))
    }

    #[test]
    fn class_with_qualifiers() {
        let doc = class(&schema(), true);
        assert_eq!(doc["name"], "ACME_Widget");
        assert_eq!(doc["superclass"], "ACME_Base");
        assert_eq!(doc["qualifiers"], json!({"Version": "2.1"}));
        assert_eq!(
            doc["properties"]["theKey"],
            json!({"type": "uint32", "qualifiers": {"Key": true}})
        );
        assert_eq!(doc["properties"]["Levels"]["array"], true);
        assert_eq!(doc["properties"].as_object().unwrap().len(), 3);
    }

    #[test]
    fn class_without_qualifiers_and_superclass() {
        let root = ClassSchema::new("ACME_Base")
            .with_property(PropertyDescriptor::new("Name", CimType::String));
        let doc = class(&root, false);
        assert!(doc.get("superclass").is_none());
        assert!(doc.get("qualifiers").is_none());
        assert_eq!(doc["properties"]["Name"], json!({"type": "string"}));
    }

    #[test]
    fn instance_is_flat_and_keeps_nulls() {
        let doc = instance(&widget(7), &RequestOptions::default());
        assert_eq!(doc, json!({"theKey": 7, "Name": null, "Levels": [-1]}));
        assert!(doc.get(REF_MEMBER).is_none());
    }

    #[test]
    fn instance_honours_property_list() {
        let options = RequestOptions {
            properties: Some(vec!["THEKEY".into()]),
            ..Default::default()
        };
        assert_eq!(instance(&widget(7), &options), json!({"theKey": 7}));
    }

    #[test]
    fn collection_members_link_to_instances() {
        let ns = Namespace::new("root/acme");
        let doc = collection(&schema(), &[widget(1), widget(4_000_000_000)], base(&ns)).unwrap();
        assert_eq!(
            doc,
            json!([
                {"theKey": 1, "$ref": "1"},
                {"theKey": 4_000_000_000u32, "$ref": "4000000000"}
            ])
        );
    }

    #[test]
    fn collection_encodes_string_keys() {
        let schema = ClassSchema::new("ACME_Named").with_property(
            PropertyDescriptor::new("Name", CimType::String)
                .with_qualifier(Qualifier::new("Key", CimValue::Boolean(true))),
        );
        let inst = Instance::new("ACME_Named").with_property("Name", CimValue::from("a/b c+d"));
        let ns = Namespace::new("root/acme");
        let doc = collection(&schema, &[inst], base(&ns)).unwrap();
        assert_eq!(doc[0]["$ref"], "a%2Fb%20c%2Bd");
        assert_eq!(doc[0]["Name"], "a/b c+d");
    }

    #[test]
    fn null_key_cannot_be_linked() {
        let inst = Instance::new("ACME_Widget").with_property("theKey", CimValue::Null);
        let ns = Namespace::new("root/acme");
        assert!(matches!(
            collection(&schema(), &[inst], base(&ns)),
            Err(GatewayError::Type(_))
        ));
    }

    #[test]
    fn render_dispatches_on_resolved_kind() {
        let ns = Namespace::new("root/acme");
        let resolved = Resolved::Collection(schema(), vec![], None);
        assert_eq!(
            render(&resolved, &RequestOptions::default(), base(&ns)).unwrap(),
            json!([])
        );

        let resolved = Resolved::Instance(schema(), widget(2));
        assert_eq!(
            render(&resolved, &RequestOptions::default(), base(&ns)).unwrap()["theKey"],
            2
        );
    }

    #[test]
    fn subclass_members_link_to_their_own_class() {
        let ns = Namespace::new("root/acme");
        let mut derived = widget(9);
        derived.class_name = "ACME_Gadget".into();

        let doc = collection(&schema(), &[widget(1), derived], base(&ns)).unwrap();
        assert_eq!(doc[0]["$ref"], "1");
        assert_eq!(doc[1]["$ref"], "/cimrs/root%2Facme/ACME_Gadget/9");
        assert_eq!(doc[1]["theKey"], 9);
    }
}
