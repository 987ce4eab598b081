use std::fmt;
use std::sync::Arc;

use haqn::{Container, Factory, HaqnError, Injectable, Injected, args, interface};

type DynError = dyn std::error::Error + Send + Sync;

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}

pub trait Cache: Send + Sync {
    fn name(&self) -> &str;
}

#[derive(Default, Injectable)]
pub struct MemoryCache {
    label: String,
}

impl Cache for MemoryCache {
    fn name(&self) -> &str {
        &self.label
    }
}

#[derive(Default, Injectable)]
pub struct Settings {
    pub verbose: bool,
}

haqn::implement!(DynError => Message);
haqn::implement!(dyn Cache => MemoryCache);

fn message(text: &str) -> Arc<Message> {
    Arc::new(Message(text.to_string()))
}

#[test]
fn derived_and_linked_types_are_registered() {
    let container = Container::new();
    assert!(container.types().is_struct::<MemoryCache>());
    assert!(container.types().is_struct::<Settings>());
    assert!(container.types().implements::<DynError, Message>());
    assert!(container.types().implements::<dyn Cache, MemoryCache>());
}

#[test]
fn auto_register_can_be_disabled() {
    let container = Container::builder().auto_register(false).build();
    assert_eq!(container.types().struct_count(), 0);
    assert_eq!(
        container.resolve(&Settings::default(), args![]).unwrap_err(),
        HaqnError::InvalidArgument
    );
}

#[test]
fn unbound_descriptors_are_reported_by_name() {
    let container = Container::new();

    let err = container.resolve(&interface::<dyn Cache>(), args![]).unwrap_err();
    assert_eq!(err.to_string(), "dyn Cache is not bound yet");

    let err = container.resolve(&Settings::default(), args![]).unwrap_err();
    assert_eq!(err.to_string(), "Settings is not bound yet");
}

#[test]
fn non_descriptors_are_rejected() {
    let mut container = Container::new();

    assert_eq!(
        container.bind(&42u32, message("x")).unwrap_err(),
        HaqnError::InvalidArguments
    );
    assert_eq!(
        container.resolve(&message("x"), args![]).unwrap_err(),
        HaqnError::InvalidArgument
    );
}

#[test]
fn instance_round_trip_is_reference_equal() {
    let mut container = Container::new();
    let cache = Arc::new(MemoryCache {
        label: "memory".into(),
    });
    container
        .bind(&interface::<dyn Cache>(), cache.clone())
        .unwrap();

    let resolved: Arc<dyn Cache> = container.make().unwrap();
    assert_eq!(resolved.name(), "memory");
    assert!(std::ptr::eq(
        Arc::as_ptr(&resolved) as *const (),
        Arc::as_ptr(&cache) as *const ()
    ));
}

#[test]
fn factory_round_trip() {
    let mut container = Container::new();
    container
        .bind(
            &interface::<DynError>(),
            Factory::new(|message: String| -> Arc<DynError> { Arc::new(Message(message)) }),
        )
        .unwrap();

    let resolved = container
        .resolve(&interface::<DynError>(), args!["my_message".to_string()])
        .unwrap();
    assert_eq!(
        resolved.get::<DynError>().unwrap().to_string(),
        "my_message"
    );

    let err = container
        .resolve(&interface::<DynError>(), args![])
        .unwrap_err();
    assert_eq!(
        err,
        HaqnError::InsufficientArguments {
            expected: 1,
            actual: 0
        }
    );
}

#[test]
fn factory_with_mismatched_argument_type_fails() {
    let mut container = Container::new();
    container
        .bind(
            &interface::<DynError>(),
            Factory::new(|message: String| -> Arc<DynError> { Arc::new(Message(message)) }),
        )
        .unwrap();

    let err = container
        .resolve(&interface::<DynError>(), args![7u64])
        .unwrap_err();
    assert_eq!(err.to_string(), "argument 0 expects String. Got u64");
}

#[test]
fn second_binding_replaces_the_first() {
    let mut container = Container::new();
    container
        .bind(&interface::<DynError>(), message("first"))
        .unwrap();
    container
        .bind(
            &interface::<DynError>(),
            Factory::new(|| -> Arc<DynError> { Arc::new(Message("second".into())) }),
        )
        .unwrap();

    let err: Arc<DynError> = container.make().unwrap();
    assert_eq!(err.to_string(), "second");
}

#[test]
fn struct_binding_rules() {
    let mut container = Container::new();

    let err = container
        .bind(&Settings::default(), Arc::new(MemoryCache::default()))
        .unwrap_err();
    assert_eq!(err.to_string(), "expects Settings. Got MemoryCache");

    let err = container
        .bind(&Settings::default(), message("not a struct"))
        .unwrap_err();
    assert_eq!(err.to_string(), "expects Settings. Got Message");

    let err = container
        .bind(&Settings::default(), Factory::new(|| Arc::new(Settings::default())))
        .unwrap_err();
    assert_eq!(err, HaqnError::InvalidStruct);

    let settings = Arc::new(Settings { verbose: true });
    container
        .bind(&Settings::default(), settings.clone())
        .unwrap();

    let by_value: Arc<Settings> = container.make().unwrap();
    let by_pointer = container
        .resolve(&Arc::new(Settings::default()), args![])
        .unwrap()
        .get::<Settings>()
        .unwrap();
    assert!(by_value.verbose);
    assert!(Arc::ptr_eq(&by_value, &settings));
    assert!(Arc::ptr_eq(&by_pointer, &settings));
}

#[test]
fn interface_instance_must_implement_the_interface() {
    let mut container = Container::new();
    let err = container
        .bind(&interface::<dyn Cache>(), message("nope"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Message is not an instance of dyn Cache");
    assert!(!container.is_bound(&interface::<dyn Cache>()));
}

#[derive(Default, Injectable)]
pub struct Unused {
    #[inject]
    pub cache: Injected<dyn Cache>,
}

#[test]
fn introspection() {
    let mut container = Container::new();
    assert!(container.is_empty());

    container
        .bind(&interface::<dyn Cache>(), Arc::new(MemoryCache::default()))
        .unwrap();
    assert_eq!(container.len(), 1);
    assert!(container.is_bound(&interface::<dyn Cache>()));
    assert!(!container.is_bound(&Unused::default()));
    assert!(format!("{container:?}").contains("bindings: 1"));
}

pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct Fixed(u64);

impl Clock for Fixed {
    fn now(&self) -> u64 {
        self.0
    }
}

haqn::interface!(dyn Clock);

#[test]
fn factory_only_interfaces_can_be_declared_up_front() {
    let mut container = Container::new();
    assert!(container.types().is_interface::<dyn Clock>());

    container
        .bind(
            &interface::<dyn Clock>(),
            Factory::new(|at: u64| -> Arc<dyn Clock> { Arc::new(Fixed(at)) }),
        )
        .unwrap();

    let clock = container.make_with::<dyn Clock>(args![1_700_000_000u64]).unwrap();
    assert_eq!(clock.now(), 1_700_000_000);
}

mod unregistered_clock {
use super::*;

pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct Frozen;

impl Clock for Frozen {
    fn now(&self) -> u64 {
        42
    }
}

#[test]
fn interface_markers_work_without_registration() {
    let mut container = Container::builder().auto_register(false).build();

    let err = container
        .resolve(&interface::<dyn Clock>(), args![])
        .unwrap_err();
    assert_eq!(err.to_string(), "dyn Clock is not bound yet");

    let err = container
        .bind(&interface::<dyn Clock>(), Arc::new(Frozen))
        .unwrap_err();
    assert_eq!(err.to_string(), "Frozen is not an instance of dyn Clock");

    container
        .bind(
            &interface::<dyn Clock>(),
            Factory::new(|| -> Arc<dyn Clock> { Arc::new(Frozen) }),
        )
        .unwrap();
    let clock: Arc<dyn Clock> = container.make().unwrap();
    assert_eq!(clock.now(), 42);
}
}
