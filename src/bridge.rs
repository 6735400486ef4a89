//! Exception bridge: typed errors from native-reported identifiers.
//!
//! The native side names the error type it wants raised by a symbolic
//! identifier. The bridge keeps a registry of identifier -> factory and
//! builds the matching [`Error`]. Identifiers nobody registered resolve to
//! [`Error::NativeExecution`] carrying the original message.
//!
//! ```
//! use native_handle::{Error, ExceptionBridge};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("{0}")]
//! struct QuotaExceeded(String);
//!
//! impl From<String> for QuotaExceeded {
//!     fn from(message: String) -> Self {
//!         Self(message)
//!     }
//! }
//!
//! let bridge = ExceptionBridge::new();
//! bridge.register::<QuotaExceeded>("app.QuotaExceeded");
//!
//! let err = bridge.throw_new("app/QuotaExceeded", "boom");
//! assert_eq!(err.downcast_ref::<QuotaExceeded>().unwrap().0, "boom");
//!
//! let err = bridge.throw_new("app.Unknown", "boom");
//! assert!(matches!(err, Error::NativeExecution(ref m) if m == "boom"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::Error;
use crate::ffi::ErrorClass;

/// Builds an error from the native-reported message.
pub type ErrorFactory = Arc<dyn Fn(String) -> Error + Send + Sync>;

static GLOBAL: Lazy<ExceptionBridge> = Lazy::new(ExceptionBridge::new);

/// Registry mapping symbolic error identifiers to error factories.
pub struct ExceptionBridge {
    factories: RwLock<HashMap<String, ErrorFactory>>,
}

impl ExceptionBridge {
    /// Create a bridge with the built-in identifiers registered.
    pub fn new() -> Self {
        let bridge = Self::empty();
        for class in ErrorClass::BUILTIN {
            let name = class.as_str().to_string();
            bridge.register_with(&name, builtin_factory(&class));
        }
        bridge
    }

    /// Create a bridge with nothing registered.
    pub fn empty() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide bridge.
    pub fn global() -> &'static ExceptionBridge {
        &GLOBAL
    }

    /// Register `T` under `class`, constructed from the message alone.
    pub fn register<T>(&self, class: &str)
    where
        T: From<String> + std::error::Error + Send + Sync + 'static,
    {
        let name = normalize(class);
        let stored = name.clone();
        self.register_with(&name, move |message: String| Error::Thrown {
            class: stored.clone(),
            error: Box::new(T::from(message)),
        });
    }

    /// Register an arbitrary factory under `class`, replacing any previous one.
    pub fn register_with<F>(&self, class: &str, factory: F)
    where
        F: Fn(String) -> Error + Send + Sync + 'static,
    {
        self.factories
            .write()
            .insert(normalize(class), Arc::new(factory));
    }

    /// Remove the factory for `class`. Returns whether one was registered.
    pub fn unregister(&self, class: &str) -> bool {
        self.factories.write().remove(&normalize(class)).is_some()
    }

    /// Check if `class` resolves to a factory.
    pub fn is_registered(&self, class: &str) -> bool {
        self.factories.read().contains_key(&normalize(class))
    }

    /// Build the error the native side asked for.
    ///
    /// Never fails: unresolvable identifiers yield
    /// [`Error::NativeExecution`] with `message`.
    pub fn throw_new(&self, class: &str, message: impl Into<String>) -> Error {
        let message = message.into();
        // Clone out so the factory runs without holding the lock.
        let factory = self.factories.read().get(&normalize(class)).cloned();

        match factory {
            Some(factory) => factory(message),
            None => {
                tracing::debug!(
                    class,
                    "unresolved native error class, raising NativeExecutionError"
                );
                Error::NativeExecution(message)
            }
        }
    }
}

impl Default for ExceptionBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExceptionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("ExceptionBridge")
            .field("classes", &names)
            .finish()
    }
}

/// Path-style (`a/b/C`) and dotted (`a.b.C`) identifiers are the same class.
fn normalize(class: &str) -> String {
    class.trim().replace('/', ".")
}

fn builtin_factory(class: &ErrorClass) -> fn(String) -> Error {
    match class {
        ErrorClass::NullPointer => Error::NullPointer,
        ErrorClass::IllegalArgument => Error::IllegalArgument,
        ErrorClass::IllegalState => Error::IllegalState,
        ErrorClass::UnsupportedOperation => Error::UnsupportedOperation,
        ErrorClass::NoSuchMethod => Error::NoSuchMethod,
        ErrorClass::NoSuchField => Error::NoSuchField,
        ErrorClass::Exception => Error::Exception,
        ErrorClass::NativeExecution => Error::NativeExecution,
        ErrorClass::Runtime | ErrorClass::Any(_) => Error::Runtime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct Custom(String);

    impl From<String> for Custom {
        fn from(message: String) -> Self {
            Self(message)
        }
    }

    #[test]
    fn test_builtins_registered() {
        let bridge = ExceptionBridge::new();
        for class in ErrorClass::BUILTIN {
            assert!(bridge.is_registered(class.as_str()), "{class} missing");
        }
        assert!(!ExceptionBridge::empty().is_registered("RuntimeError"));
    }

    #[test]
    fn test_registered_type_round_trip() {
        let bridge = ExceptionBridge::empty();
        bridge.register::<Custom>("tests.Custom");

        let err = bridge.throw_new("tests.Custom", "boom");
        assert_eq!(err.class_name(), "tests.Custom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.downcast_ref::<Custom>().map(|c| c.0.as_str()), Some("boom"));
    }

    #[test]
    fn test_unresolved_falls_back() {
        let bridge = ExceptionBridge::new();
        let err = bridge.throw_new("tests.Missing", "boom");
        assert!(err.is_native_execution());
        assert_eq!(err.to_string(), "boom");
        assert!(err.downcast_ref::<Custom>().is_none());
    }

    #[test]
    fn test_separator_normalization() {
        let bridge = ExceptionBridge::empty();
        bridge.register::<Custom>("a/b/Custom");
        assert!(bridge.is_registered("a.b.Custom"));
        assert_eq!(bridge.throw_new("a.b.Custom", "m").class_name(), "a.b.Custom");
    }

    #[test]
    fn test_unregister() {
        let bridge = ExceptionBridge::empty();
        bridge.register::<Custom>("tests.Custom");
        assert!(bridge.unregister("tests.Custom"));
        assert!(!bridge.unregister("tests.Custom"));
        assert!(bridge.throw_new("tests.Custom", "m").is_native_execution());
    }

    #[test]
    fn test_custom_factory() {
        let bridge = ExceptionBridge::empty();
        bridge.register_with("tests.Prefixed", |m| Error::Runtime(format!("native: {m}")));
        assert_eq!(bridge.throw_new("tests.Prefixed", "x").to_string(), "native: x");
    }
}
