//! Factories: callable concretes resolved by invocation.
//!
//! A [`Factory`] wraps a closure or function together with what the
//! container needs to call it without knowing its signature: the declared
//! parameter types (their count is the expected argument count) and a
//! type-erased call that takes positional [`Arg`]s and returns zero or more
//! values.
//!
//! # Examples
//! ```
//! use haqn_container::factory::{Arg, Factory};
//!
//! let greet = Factory::new(|name: String, times: usize| name.repeat(times));
//! assert_eq!(greet.arity(), 2);
//!
//! let values = greet.call(vec![Arg::new(String::from("ab")), Arg::new(2usize)]).unwrap();
//! assert_eq!(values[0].downcast_ref::<String>().map(String::as_str), Some("abab"));
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use haqn_support::rendering::shorten_type_name;

use crate::container::Resolved;
use crate::error::{HaqnError, Result};

/// One caller-supplied factory argument.
pub struct Arg {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Arg {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Fully qualified name of the wrapped value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Unwraps the argument for parameter `index`, which expects a `T`.
    fn take<T: Any>(self, index: usize) -> Result<T> {
        let actual = self.type_name;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| HaqnError::ArgumentTypeMismatch {
                index,
                expected: shorten_type_name(type_name::<T>()),
                actual: shorten_type_name(actual),
            })
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arg({})", self.type_name)
    }
}

/// Builds a `Vec<Arg>` from a list of values.
///
/// ```
/// use haqn_container::args;
///
/// let args = args!["my_message".to_string(), 3u8];
/// assert_eq!(args.len(), 2);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::factory::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::factory::Arg::new($value)),+]
    };
}

/// Pulls the next positional argument for a parameter of type `T`.
fn next_arg<T: Any>(
    args: &mut impl Iterator<Item = Arg>,
    index: usize,
    expected: usize,
) -> Result<T> {
    match args.next() {
        Some(arg) => arg.take(index),
        None => Err(HaqnError::InsufficientArguments {
            expected,
            actual: index,
        }),
    }
}

/// A function-like value the container can call with erased arguments.
///
/// Implemented for every `Fn` of up to eight parameters whose parameter
/// types are `Any + Send + Sync`. `Params` is the parameter tuple and only
/// serves to keep the impls apart.
pub trait Callable<Params>: Send + Sync + 'static {
    type Output;

    /// Declared parameter types, in order.
    fn param_types() -> Vec<&'static str>;

    /// Calls the function, assigning `args` to parameters by position.
    fn call_with(&self, args: Vec<Arg>) -> Result<Self::Output>;
}

macro_rules! impl_callable {
    ($($param:ident $value:ident),*) => {
        impl<Func, Out, $($param,)*> Callable<($($param,)*)> for Func
        where
            Func: Fn($($param),*) -> Out + Send + Sync + 'static,
            $($param: Any + Send + Sync,)*
        {
            type Output = Out;

            fn param_types() -> Vec<&'static str> {
                vec![$(type_name::<$param>()),*]
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn call_with(&self, args: Vec<Arg>) -> Result<Out> {
                let expected = <Self as Callable<($($param,)*)>>::param_types().len();
                let mut args = args.into_iter();
                let mut index = 0usize;
                $(
                    let $value: $param = next_arg(&mut args, index, expected)?;
                    index += 1;
                )*
                Ok((self)($($value),*))
            }
        }
    };
}

impl_callable!();
impl_callable!(A1 a1);
impl_callable!(A1 a1, A2 a2);
impl_callable!(A1 a1, A2 a2, A3 a3);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

/// Return values of a multi-value factory, see [`Factory::returning`].
pub trait Returns {
    fn into_values(self) -> Vec<Resolved>;
}

impl Returns for () {
    fn into_values(self) -> Vec<Resolved> {
        Vec::new()
    }
}

macro_rules! impl_returns {
    ($($ty:ident $value:ident),+) => {
        impl<$($ty: Any + Send + Sync,)+> Returns for ($($ty,)+) {
            fn into_values(self) -> Vec<Resolved> {
                let ($($value,)+) = self;
                vec![$(Resolved::new($value)),+]
            }
        }
    };
}

impl_returns!(R1 r1);
impl_returns!(R1 r1, R2 r2);
impl_returns!(R1 r1, R2 r2, R3 r3);
impl_returns!(R1 r1, R2 r2, R3 r3, R4 r4);

type CallFn = Arc<dyn Fn(Vec<Arg>) -> Result<Vec<Resolved>> + Send + Sync>;

/// A factory binding: a callable plus its declared parameter types.
#[derive(Clone)]
pub struct Factory {
    params: Vec<&'static str>,
    call: CallFn,
}

impl Factory {
    /// Wraps a function returning a single value.
    ///
    /// A function returning `()` is treated as returning no values at all.
    pub fn new<Params, F>(f: F) -> Self
    where
        Params: 'static,
        F: Callable<Params>,
        F::Output: Any + Send + Sync,
    {
        let call: CallFn = Arc::new(move |args: Vec<Arg>| {
            let output = f.call_with(args)?;
            if TypeId::of::<F::Output>() == TypeId::of::<()>() {
                return Ok(Vec::new());
            }
            Ok(vec![Resolved::new(output)])
        });

        Self {
            params: F::param_types(),
            call,
        }
    }

    /// Wraps a function returning a tuple; every element is one return
    /// value and resolution uses the first.
    pub fn returning<Params, F>(f: F) -> Self
    where
        Params: 'static,
        F: Callable<Params>,
        F::Output: Returns + 'static,
    {
        let call: CallFn = Arc::new(move |args: Vec<Arg>| Ok(f.call_with(args)?.into_values()));

        Self {
            params: F::param_types(),
            call,
        }
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared parameter type names.
    pub fn param_types(&self) -> &[&'static str] {
        &self.params
    }

    /// Calls the factory, returning all of its values.
    ///
    /// # Errors
    /// - [`HaqnError::InsufficientArguments`] unless `args.len()` equals
    ///   [`arity`](Self::arity)
    /// - [`HaqnError::ArgumentTypeMismatch`] when an argument has the wrong
    ///   type
    pub fn call(&self, args: Vec<Arg>) -> Result<Vec<Resolved>> {
        if args.len() != self.arity() {
            return Err(HaqnError::InsufficientArguments {
                expected: self.arity(),
                actual: args.len(),
            });
        }
        (self.call)(args)
    }

    /// Calls the factory and keeps its first value.
    ///
    /// # Errors
    /// Everything [`call`](Self::call) returns, plus
    /// [`HaqnError::NonValuesReturned`] when the factory returned nothing.
    pub fn invoke(&self, args: Vec<Arg>) -> Result<Resolved> {
        self.call(args)?
            .into_iter()
            .next()
            .ok_or(HaqnError::NonValuesReturned)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| shorten_type_name(p)).collect();
        write!(f, "Factory(fn({}))", params.join(", "))
    }
}
