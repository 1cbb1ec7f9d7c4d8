use super::{ScalarKind, TypeDescriptor};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Static description of a type, built without runtime reflection.
///
/// Implemented here for primitives and standard containers; records get it
/// from `#[derive(Describe)]`.
///
/// Self-referential records are not supported: describing them recurses
/// without bound.
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

macro_rules! describe_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Scalar(ScalarKind::$kind)
                }
            }
        )*
    };
}

describe_scalar! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    isize => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    usize => Uint64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
    char => Text,
    String => Text,
    SystemTime => Timestamp,
    Duration => Duration,
}

impl Describe for &str {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Scalar(ScalarKind::Text)
    }
}

// proto3 fields are implicitly optional, and pointers are transparent.
macro_rules! describe_transparent {
    ($($wrapper:ident),* $(,)?) => {
        $(
            impl<T: Describe> Describe for $wrapper<T> {
                fn describe() -> TypeDescriptor {
                    T::describe()
                }
            }
        )*
    };
}

describe_transparent!(Option, Box, Arc, Rc);

macro_rules! describe_sequence {
    ($($collection:ident),* $(,)?) => {
        $(
            impl<T: Describe> Describe for $collection<T> {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::sequence(T::describe())
                }
            }
        )*
    };
}

describe_sequence!(Vec, VecDeque, BTreeSet, HashSet);

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

impl<K: Describe, V: Describe> Describe for HashMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map(K::describe(), V::describe())
    }
}
