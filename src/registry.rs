use crate::convert::{ConverterRegistry, NumberConverter};
use crate::error::CalcError;
use crate::functions::{validate_function_name, HostFunction};
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Host functions and converters shared by every calculator built from it.
///
/// Registration and evaluation may run on different threads. Builders copy the
/// current contents when they build, so later changes only affect later builds.
pub struct Registry {
    functions: RwLock<HashMap<String, HostFunction>>,
    converters: RwLock<ConverterRegistry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            functions: RwLock::new(HashMap::new()),
            converters: RwLock::new(ConverterRegistry::default()),
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for the common case of sharing one registry between builders.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a function callable by `name` from any expression.
    pub fn register_function<F>(&self, name: &str, function: F) -> Result<(), CalcError>
    where
        F: Fn(&CalculationOptions, &[BigDecimal]) -> Result<BigDecimal, CalcError>
            + Send
            + Sync
            + 'static,
    {
        validate_function_name(name)?;
        debug!("Registering function '{}'", name);
        self.functions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::new(function));
        Ok(())
    }

    pub fn remove_function(&self, name: &str) -> bool {
        self.functions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn register_converter<T, C>(&self, converter: C)
    where
        T: 'static,
        C: NumberConverter<T> + 'static,
    {
        debug!("Registering converter for {}", std::any::type_name::<T>());
        self.converters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register::<T, C>(converter);
    }

    pub fn remove_converter<T: 'static>(&self) -> bool {
        self.converters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove::<T>()
    }

    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub(crate) fn functions_snapshot(&self) -> HashMap<String, HostFunction> {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn converters_snapshot(&self) -> ConverterRegistry {
        self.converters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_register_and_remove_function() {
        let registry = Registry::new();
        registry
            .register_function("negate", |_, args| {
                Ok(args.first().cloned().map(|v| -v).unwrap_or_default())
            })
            .unwrap();
        assert_eq!(registry.function_names(), vec!["negate".to_string()]);

        let snapshot = registry.functions_snapshot();
        let options = CalculationOptions::new("");
        let result = snapshot["negate"](&options, &[BigDecimal::from(2)]).unwrap();
        assert_eq!(result, BigDecimal::from(-2));

        assert!(registry.remove_function("negate"));
        assert!(!registry.remove_function("negate"));
        assert!(registry.function_names().is_empty());
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let registry = Registry::new();
        let error = registry
            .register_function("bad name", |_, _| Ok(BigDecimal::from(0)))
            .unwrap_err();
        assert!(matches!(error, CalcError::InvalidFunctionName(_)));
    }

    #[test]
    fn test_concurrent_registration_and_reads() {
        let registry = Registry::shared();
        let handles: Vec<_> = ["alpha", "beta", "gamma", "delta"]
            .into_iter()
            .map(|name| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .register_function(name, |_, _| Ok(BigDecimal::from(1)))
                        .unwrap();
                    registry.functions_snapshot().len()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap() >= 1);
        }
        assert_eq!(registry.function_names().len(), 4);
    }

    #[test]
    fn test_converter_snapshot() {
        let registry = Registry::new();
        assert!(registry.converters_snapshot().contains::<f64>());
        assert!(registry.remove_converter::<f64>());
        assert!(!registry.converters_snapshot().contains::<f64>());
    }
}
