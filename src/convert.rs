//! Mapping between host number types and [`BigDecimal`].
//!
//! Every supported type has one [`NumberConverter`], looked up by [`TypeId`] in a
//! [`ConverterRegistry`]. The native numeric types are registered by default.

use crate::decimal::{plain_string, to_f64, truncate};
use crate::error::CalcError;
use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

pub trait NumberConverter<T>: Send + Sync {
    fn to_decimal(&self, value: &T) -> Result<BigDecimal, CalcError>;

    fn from_decimal(&self, value: &BigDecimal) -> Result<T, CalcError>;
}

/// Converter built from a pair of plain functions.
pub struct FnConverter<T> {
    to_decimal: fn(&T) -> Result<BigDecimal, CalcError>,
    from_decimal: fn(&BigDecimal) -> Result<T, CalcError>,
}

impl<T> FnConverter<T> {
    pub fn new(
        to_decimal: fn(&T) -> Result<BigDecimal, CalcError>,
        from_decimal: fn(&BigDecimal) -> Result<T, CalcError>,
    ) -> Self {
        Self {
            to_decimal,
            from_decimal,
        }
    }
}

impl<T> NumberConverter<T> for FnConverter<T> {
    fn to_decimal(&self, value: &T) -> Result<BigDecimal, CalcError> {
        (self.to_decimal)(value)
    }

    fn from_decimal(&self, value: &BigDecimal) -> Result<T, CalcError> {
        (self.from_decimal)(value)
    }
}

struct NativeConverter;

impl NumberConverter<BigDecimal> for NativeConverter {
    fn to_decimal(&self, value: &BigDecimal) -> Result<BigDecimal, CalcError> {
        Ok(value.clone())
    }

    fn from_decimal(&self, value: &BigDecimal) -> Result<BigDecimal, CalcError> {
        Ok(value.clone())
    }
}

impl NumberConverter<f64> for NativeConverter {
    fn to_decimal(&self, value: &f64) -> Result<BigDecimal, CalcError> {
        float_to_decimal(*value)
    }

    fn from_decimal(&self, value: &BigDecimal) -> Result<f64, CalcError> {
        to_f64(value)
    }
}

impl NumberConverter<f32> for NativeConverter {
    fn to_decimal(&self, value: &f32) -> Result<BigDecimal, CalcError> {
        if !value.is_finite() {
            return Err(CalcError::Conversion(format!("{} is not a finite number", value)));
        }
        BigDecimal::from_str(&value.to_string()).map_err(|e| CalcError::Conversion(e.to_string()))
    }

    fn from_decimal(&self, value: &BigDecimal) -> Result<f32, CalcError> {
        plain_string(value)
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| out_of_range::<f32>(value))
    }
}

macro_rules! integer_converters {
    ($($int:ty),*) => {
        $(
            impl NumberConverter<$int> for NativeConverter {
                fn to_decimal(&self, value: &$int) -> Result<BigDecimal, CalcError> {
                    Ok(BigDecimal::from(*value))
                }

                /// Truncates toward zero.
                fn from_decimal(&self, value: &BigDecimal) -> Result<$int, CalcError> {
                    truncate(value)?
                        .to_i64()
                        .and_then(|v| <$int>::try_from(v).ok())
                        .ok_or_else(|| out_of_range::<$int>(value))
                }
            }
        )*
    };
}

integer_converters!(i64, i32, i16);

fn out_of_range<T>(value: &BigDecimal) -> CalcError {
    CalcError::Conversion(format!(
        "{} cannot be represented as {}",
        plain_string(value),
        type_name::<T>()
    ))
}

pub fn float_to_decimal(value: f64) -> Result<BigDecimal, CalcError> {
    if !value.is_finite() {
        return Err(CalcError::Conversion(format!("{} is not a finite number", value)));
    }
    BigDecimal::from_str(&value.to_string()).map_err(|e| CalcError::Conversion(e.to_string()))
}

/// Converters keyed by the type they handle.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register::<BigDecimal, _>(NativeConverter);
        registry.register::<f64, _>(NativeConverter);
        registry.register::<f32, _>(NativeConverter);
        registry.register::<i64, _>(NativeConverter);
        registry.register::<i32, _>(NativeConverter);
        registry.register::<i16, _>(NativeConverter);
        registry
    }
}

impl ConverterRegistry {
    /// A registry without even the native converters.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Registers `converter` for `T`, replacing any previous one.
    pub fn register<T, C>(&mut self, converter: C)
    where
        T: 'static,
        C: NumberConverter<T> + 'static,
    {
        let converter: Arc<dyn NumberConverter<T>> = Arc::new(converter);
        self.converters.insert(TypeId::of::<T>(), Arc::new(converter));
    }

    pub fn remove<T: 'static>(&mut self) -> bool {
        self.converters.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.converters.contains_key(&TypeId::of::<T>())
    }

    pub fn get<T: 'static>(&self) -> Option<Arc<dyn NumberConverter<T>>> {
        self.converters
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Arc<dyn NumberConverter<T>>>()
            .cloned()
    }

    pub fn to_decimal<T: 'static>(&self, value: &T) -> Result<BigDecimal, CalcError> {
        self.get::<T>()
            .ok_or(CalcError::MissingConverter(type_name::<T>()))?
            .to_decimal(value)
    }

    pub fn from_decimal<T: 'static>(&self, value: &BigDecimal) -> Result<T, CalcError> {
        self.get::<T>()
            .ok_or(CalcError::MissingConverter(type_name::<T>()))?
            .from_decimal(value)
    }

    /// Copies every converter of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &ConverterRegistry) {
        for (type_id, converter) in &other.converters {
            self.converters.insert(*type_id, Arc::clone(converter));
        }
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}
