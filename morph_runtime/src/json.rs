//! JSON rendering of dynamic objects.
//!
//! A convenience layer over the public surface only: it iterates the
//! factory's interned identifiers and reads each property through
//! [`DynObject::get`], so it sees exactly what any other caller would,
//! prototype fallback included. It is not part of the core and has no
//! privileged access.
//!
//! Cells with no JSON analogue (callables, opaque host values) render as a
//! `"<type>"` placeholder string; unassigned holes render as `null`.

use serde_json::{Map, Number};

use crate::factory::ObjectFactory;
use crate::object::DynObject;
use crate::value::Value;

/// Render an object's readable properties as a JSON value.
///
/// Properties inherited through the prototype chain are included, since the
/// walk goes through `get`. Keys appear in identifier issue order.
pub fn to_json(object: &DynObject, factory: &ObjectFactory) -> serde_json::Value {
    let mut map = Map::new();
    for (id, name) in factory.interned() {
        if let Ok(value) = object.get(id) {
            map.insert(name.to_string(), value_to_json(&value));
        }
    }
    serde_json::Value::Object(map)
}

/// Render an object as a JSON string.
pub fn to_json_string(object: &DynObject, factory: &ObjectFactory) -> String {
    to_json(object, factory).to_string()
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Empty => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        // Non-finite floats have no JSON representation.
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect())
        }
        Value::Map(entries) => {
            let mut map = Map::new();
            for (k, v) in entries {
                map.insert(k.clone(), value_to_json(v));
            }
            serde_json::Value::Object(map)
        }
        Value::Method(_) | Value::Opaque(_) => {
            serde_json::Value::String(format!("<{}>", value.type_name()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Args, Method};
    use rustc_hash::FxHashMap;

    #[test]
    fn test_scalars_and_containers() {
        let factory = ObjectFactory::new();
        let obj = factory.create_object();

        obj.set(&factory, factory.intern("n"), 3i64);
        obj.set(&factory, factory.intern("f"), 1.5f64);
        obj.set(&factory, factory.intern("ok"), true);
        obj.set(&factory, factory.intern("s"), "hi \"there\"");
        obj.set(
            &factory,
            factory.intern("xs"),
            vec![Value::Int(1), Value::Str("two".into())],
        );

        let json = to_json(&obj, &factory);
        assert_eq!(json["n"], 3);
        assert_eq!(json["f"], 1.5);
        assert_eq!(json["ok"], true);
        assert_eq!(json["s"], "hi \"there\"");
        assert_eq!(json["xs"][1], "two");
    }

    #[test]
    fn test_nested_map() {
        let factory = ObjectFactory::new();
        let obj = factory.create_object();

        let mut inner = FxHashMap::default();
        inner.insert("k".to_string(), Value::Int(1));
        obj.set(&factory, factory.intern("m"), inner);

        let json = to_json(&obj, &factory);
        assert_eq!(json["m"]["k"], 1);
    }

    #[test]
    fn test_unrepresentable_cells() {
        let factory = ObjectFactory::new();
        let obj = factory.create_object();

        obj.set(
            &factory,
            factory.intern("m"),
            Method::new(|_, _, _: Args| Value::Empty),
        );
        obj.set(&factory, factory.intern("h"), Value::opaque(42u32));
        obj.set(&factory, factory.intern("nan"), f64::NAN);

        let json = to_json(&obj, &factory);
        assert_eq!(json["m"], "<method>");
        assert_eq!(json["h"], "<opaque>");
        assert_eq!(json["nan"], serde_json::Value::Null);
    }

    #[test]
    fn test_only_resolvable_identifiers_appear() {
        let factory = ObjectFactory::new();
        let here = factory.intern("here");
        let _elsewhere = factory.intern("elsewhere");

        let obj = factory.create_object();
        obj.set(&factory, here, 1i64);

        let json = to_json(&obj, &factory);
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("here"));
    }

    #[test]
    fn test_prototype_properties_included() {
        let factory = ObjectFactory::new();
        let kind = factory.intern("kind");
        let name = factory.intern("name");

        let proto = factory.create_object();
        proto.set(&factory, kind, "base");
        let obj = factory.create_object();
        obj.set_prototype(Some(proto));
        obj.set(&factory, name, "leaf");

        let json = to_json(&obj, &factory);
        assert_eq!(json["kind"], "base");
        assert_eq!(json["name"], "leaf");
    }

    #[test]
    fn test_string_rendering() {
        let factory = ObjectFactory::new();
        let obj = factory.create_object();
        obj.set(&factory, factory.intern("a"), 1i64);

        assert_eq!(to_json_string(&obj, &factory), r#"{"a":1}"#);
    }
}
