//! Request-scoped context passed to every handler invocation.
//!
//! Keys come from a closed set ([`ContextKey`]) and values are typed
//! ([`ContextValue`]), so lookups cannot silently miss on a typo or return a
//! value of an unexpected type.

use crate::security::User;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextKey {
    RequestId,
    User,
    TraceId,
    Locale,
    ClientAddress,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Text(String),
    Integer(i64),
    Flag(bool),
    User(User),
}

impl ContextValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContextValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<ContextKey, ContextValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ContextKey) -> Option<&ContextValue> {
        self.values.get(&key)
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn set(&mut self, key: ContextKey, value: ContextValue) -> Option<ContextValue> {
        self.values.insert(key, value)
    }

    pub fn remove(&mut self, key: ContextKey) -> Option<ContextValue> {
        self.values.remove(&key)
    }

    pub fn contains(&self, key: ContextKey) -> bool {
        self.values.contains_key(&key)
    }

    /// The authenticated caller, if authentication identified one.
    pub fn user(&self) -> Option<&User> {
        match self.values.get(&ContextKey::User) {
            Some(ContextValue::User(user)) => Some(user),
            _ => None,
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.get(ContextKey::RequestId).and_then(ContextValue::as_text)
    }
}
