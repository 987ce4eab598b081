use std::fmt;
use std::sync::Arc;

use haqn::{Container, Factory, HaqnError, Injectable, Injected, Kind, interface};

type DynError = dyn std::error::Error + Send + Sync;

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}

pub trait InjectFooer: Send + Sync {
    fn foo(&self) -> String;
}

pub trait InjectBazer: Send + Sync {
    fn baz(&self) -> String;
}

#[derive(Default, Injectable)]
pub struct InjectFoo {
    #[inject]
    pub baz: Injected<dyn InjectBazer>,
}

impl InjectFooer for InjectFoo {
    fn foo(&self) -> String {
        "Foo..".into()
    }
}

#[derive(Default, Injectable)]
pub struct InjectBaz;

impl InjectBazer for InjectBaz {
    fn baz(&self) -> String {
        "Baz..".into()
    }
}

#[derive(Default, Injectable)]
pub struct InjectOk {
    #[inject]
    pub err: Injected<DynError>,
}

#[derive(Default, Injectable)]
pub struct InjectRecursiveOk {
    #[inject]
    pub err: Injected<DynError>,
    #[inject]
    pub foo: Injected<dyn InjectFooer>,
    #[inject]
    pub not_injectable_non_interface: String,
    #[inject]
    hidden: Injected<DynError>,
    pub unmarked: Injected<DynError>,
    #[inject = "named"]
    pub other_tag: Injected<DynError>,
}

#[derive(Default, Injectable)]
pub struct Holder {
    #[inject]
    pub foo: Injected<InjectFoo>,
}

haqn::implement!(DynError => Message);
haqn::implement!(dyn InjectFooer => InjectFoo);
haqn::implement!(dyn InjectBazer => InjectBaz);

fn bound_container() -> Container {
    let mut container = Container::new();
    container
        .bind(
            &interface::<DynError>(),
            Arc::new(Message("my_message".into())),
        )
        .unwrap();
    container
        .bind(&interface::<dyn InjectFooer>(), Arc::new(InjectFoo::default()))
        .unwrap();
    container
        .bind(&interface::<dyn InjectBazer>(), Arc::new(InjectBaz))
        .unwrap();
    container
}

#[test]
fn inject_rejects_non_struct_targets() {
    let container = Container::new();

    let err = container.inject(&Message("my_message".into())).unwrap_err();
    assert_eq!(err.to_string(), "injecting to struct is not supported");

    let err = container.inject(&interface::<DynError>()).unwrap_err();
    assert_eq!(
        err,
        HaqnError::InvalidTargetType {
            kind: Kind::Interface
        }
    );

    let err = container.inject(&42i32).unwrap_err();
    assert_eq!(err.to_string(), "injecting to struct is not supported");
}

#[test]
fn inject_fails_when_dependency_is_not_bound() {
    let container = Container::new();
    let target = InjectOk::default();

    let err = container.inject(&target).unwrap_err();
    assert_eq!(err.to_string(), "dyn Error + Send + Sync is not bound yet");
    assert!(!target.err.is_set());
}

#[test]
fn inject_ok() {
    let container = bound_container();
    let target = InjectOk::default();

    container.inject(&target).unwrap();
    assert_eq!(target.err.get().unwrap().to_string(), "my_message");
}

#[test]
fn inject_recursive_ok() {
    let container = bound_container();
    let target = InjectRecursiveOk::default();

    container.inject(&target).unwrap();

    assert_eq!(target.err.get().unwrap().to_string(), "my_message");
    let foo = target.foo.get().unwrap();
    assert_eq!(foo.foo(), "Foo..");

    let bound: Arc<dyn InjectFooer> = container.make().unwrap();
    assert!(std::ptr::eq(
        Arc::as_ptr(&foo) as *const (),
        Arc::as_ptr(&bound) as *const ()
    ));
}

#[test]
fn inject_populates_nested_dependencies_depth_first() {
    let mut container = bound_container();
    let foo = Arc::new(InjectFoo::default());
    container
        .bind(&interface::<dyn InjectFooer>(), foo.clone())
        .unwrap();

    container.inject(&InjectRecursiveOk::default()).unwrap();

    let baz = foo.baz.get().expect("nested field populated");
    assert_eq!(baz.baz(), "Baz..");
}

#[test]
fn inject_leaves_private_unmarked_and_plain_fields_alone() {
    let container = bound_container();
    let target = InjectRecursiveOk::default();

    container.inject(&target).unwrap();

    assert!(target.not_injectable_non_interface.is_empty());
    assert!(!target.hidden.is_set());
    assert!(!target.unmarked.is_set());
    assert!(!target.other_tag.is_set());
}

#[test]
fn inject_struct_typed_field() {
    let mut container = bound_container();
    let foo = Arc::new(InjectFoo::default());
    container.bind(&InjectFoo::default(), foo.clone()).unwrap();

    let holder = Holder::default();
    container.inject(&holder).unwrap();

    let injected = holder.foo.get().unwrap();
    assert!(Arc::ptr_eq(&injected, &foo));
    assert_eq!(injected.baz.get().unwrap().baz(), "Baz..");
}

#[test]
fn inject_through_shared_pointer() {
    let container = bound_container();
    let target = Arc::new(InjectOk::default());

    container.inject(&target).unwrap();
    assert!(target.err.is_set());
}

#[test]
fn inject_keeps_fields_assigned_before_a_failure() {
    let mut container = Container::new();
    container
        .bind(
            &interface::<DynError>(),
            Arc::new(Message("my_message".into())),
        )
        .unwrap();

    let target = InjectRecursiveOk::default();
    let err = container.inject(&target).unwrap_err();

    assert_eq!(err.to_string(), "dyn InjectFooer is not bound yet");
    assert!(target.err.is_set());
    assert!(!target.foo.is_set());
}

#[test]
fn inject_factory_results() {
    let mut container = Container::new();
    container
        .bind(
            &interface::<DynError>(),
            Factory::new(|| -> Arc<DynError> { Arc::new(Message("fresh".into())) }),
        )
        .unwrap();

    let first = InjectOk::default();
    let second = InjectOk::default();
    container.inject(&first).unwrap();
    container.inject(&second).unwrap();

    let (first, second) = (first.err.get().unwrap(), second.err.get().unwrap());
    assert_eq!(first.to_string(), "fresh");
    assert!(!std::ptr::eq(
        Arc::as_ptr(&first) as *const (),
        Arc::as_ptr(&second) as *const ()
    ));
}

pub trait Unlisted: Send + Sync {
    fn id(&self) -> u8;
}

struct Eight;

impl Unlisted for Eight {
    fn id(&self) -> u8 {
        8
    }
}

#[derive(Default, Injectable)]
pub struct NeedsUnlisted {
    #[inject]
    pub dep: Injected<dyn Unlisted>,
}

#[test]
fn inject_resolves_fields_of_never_registered_interfaces() {
    let mut container = Container::new();
    let target = NeedsUnlisted::default();

    let err = container.inject(&target).unwrap_err();
    assert_eq!(err.to_string(), "dyn Unlisted is not bound yet");
    assert!(!target.dep.is_set());

    container
        .bind(
            &interface::<dyn Unlisted>(),
            Factory::new(|| -> Arc<dyn Unlisted> { Arc::new(Eight) }),
        )
        .unwrap();
    container.inject(&target).unwrap();
    assert_eq!(target.dep.get().unwrap().id(), 8);
}
