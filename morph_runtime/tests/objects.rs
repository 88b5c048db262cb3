//! End-to-end scenarios across interner, shapes, objects, and dispatch.

use morph_runtime::{AccessError, Args, Identifier, Method, ObjectFactory, Value};

#[test]
fn interning_is_dense_and_stable() {
    let factory = ObjectFactory::new();

    assert_eq!(factory.intern("a").raw(), 0);
    assert_eq!(factory.intern("b").raw(), 1);
    assert_eq!(factory.intern("a").raw(), 0);

    assert_eq!(factory.lookup(Identifier::from_raw(1)).as_deref(), Some("b"));
    assert!(factory.lookup(Identifier::from_raw(2)).is_none());
}

#[test]
fn typed_access_round_trip() {
    let factory = ObjectFactory::new();
    let x = factory.intern("x");
    let obj = factory.create_object();

    obj.set(&factory, x, 7i32);
    assert_eq!(obj.get_as::<i32>(x).unwrap(), 7);
    assert_eq!(
        obj.get_as::<String>(x),
        Err(AccessError::TypeMismatch {
            key: x,
            expected: "string",
            found: "int",
        })
    );
}

#[test]
fn counter_method_one_million_calls() {
    let factory = ObjectFactory::new();
    let counter = factory.intern("counter");
    let inc = factory.intern("inc");

    let obj = factory.create_object();
    obj.set(&factory, counter, 0i64);
    obj.set(
        &factory,
        inc,
        Method::new(move |this, factory, _args| {
            let next = this.get_as::<i64>(counter).unwrap_or(0) + 1;
            this.set(factory, counter, next);
            Value::Int(next)
        }),
    );

    const N: i64 = 1_000_000;
    for expected in 1..=N {
        let returned = obj
            .call_as::<i64>(&factory, inc, Args::new())
            .expect("inc must stay callable");
        assert_eq!(returned, expected);
    }
    assert_eq!(obj.get_as::<i64>(counter).unwrap(), N);
}

#[test]
fn insertion_order_decides_shape_identity() {
    let factory = ObjectFactory::new();
    let p = factory.intern("p");
    let q = factory.intern("q");
    let r = factory.intern("r");

    let a = factory.create_object();
    let b = factory.create_object();
    for obj in [&a, &b] {
        obj.set(&factory, p, 0i64);
        obj.set(&factory, q, 0i64);
        obj.set(&factory, r, 0i64);
    }
    assert_eq!(a.shape_id(), b.shape_id());

    let c = factory.create_object();
    c.set(&factory, p, 0i64);
    c.set(&factory, r, 0i64);
    c.set(&factory, q, 0i64);
    assert_ne!(c.shape_id(), a.shape_id());
}

#[test]
fn prototype_shadowing() {
    let factory = ObjectFactory::new();
    let name = factory.intern("name");

    let parent = factory.create_object();
    parent.set(&factory, name, "P");

    let child = factory.create_object();
    child.set_prototype(Some(parent.clone()));
    assert_eq!(child.get_as::<String>(name).unwrap(), "P");

    child.set(&factory, name, "C");
    assert_eq!(child.get_as::<String>(name).unwrap(), "C");
    assert_eq!(parent.get_as::<String>(name).unwrap(), "P");
}

#[test]
fn methods_compose_with_prototypes() {
    let factory = ObjectFactory::new();
    let scale = factory.intern("scale");
    let value = factory.intern("value");
    let scaled = factory.intern("scaled");

    // Behaviour on the prototype, data on the instance.
    let proto = factory.create_object();
    proto.set(&factory, scale, 10i64);
    proto.set(
        &factory,
        scaled,
        Method::new(move |this, _factory, _args| {
            let v = this.get_as::<i64>(value).unwrap_or(0);
            let s = this.get_as::<i64>(scale).unwrap_or(1);
            Value::Int(v * s)
        }),
    );

    let obj = factory.create_object();
    obj.set_prototype(Some(proto));
    obj.set(&factory, value, 4i64);

    assert_eq!(obj.call_as::<i64>(&factory, scaled, Args::new()).unwrap(), 40);
}

#[test]
fn opaque_host_values_survive_round_trip() {
    #[derive(Debug, PartialEq)]
    struct Session {
        id: u64,
    }

    let factory = ObjectFactory::new();
    let session = factory.intern("session");
    let obj = factory.create_object();

    obj.set(&factory, session, Value::opaque(Session { id: 77 }));
    let cell = obj.get(session).unwrap();
    assert_eq!(cell.downcast_opaque::<Session>().unwrap().id, 77);
    assert!(cell.downcast_opaque::<String>().is_none());
}

#[cfg(feature = "json")]
#[test]
fn json_rendering_reads_public_surface() {
    let factory = ObjectFactory::new();
    let name = factory.intern("name");
    let hp = factory.intern("hp");

    let proto = factory.create_object();
    proto.set(&factory, hp, 9i64);

    let obj = factory.create_object();
    obj.set_prototype(Some(proto));
    obj.set(&factory, name, "cirno");

    let json = morph_runtime::json::to_json(&obj, &factory);
    assert_eq!(json["name"], "cirno");
    assert_eq!(json["hp"], 9);
}
