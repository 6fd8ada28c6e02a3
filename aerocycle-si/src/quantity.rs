//! The `Quantity` trait and the macro that stamps out quantity newtypes.

use core::ops::{Add, Div, Mul, Neg, Sub};

use thiserror_no_std::Error;

/// Errors produced when parsing a quantity from text such as `"200 ms"`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The numeric part could not be parsed
    #[error("Invalid number in {quantity} value")]
    InvalidNumber {
        /// Name of the quantity being parsed
        quantity: &'static str,
    },

    /// No unit followed the number
    #[error("Missing unit in {quantity} value")]
    MissingUnit {
        /// Name of the quantity being parsed
        quantity: &'static str,
    },

    /// The unit is not one of the quantity's supported units
    #[error("Unsupported unit for {quantity}")]
    UnknownUnit {
        /// Name of the quantity being parsed
        quantity: &'static str,
    },
}

/// A physical dimension stored as an `f64` in its base unit.
///
/// Generic signal-processing code (smoothers, controllers) works on the base
/// value and converts back with [`Quantity::from_base`], so the arithmetic is
/// identical for every dimension.
pub trait Quantity:
    Copy
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    /// Human-readable name of the dimension, used in error messages
    const NAME: &'static str;

    /// Symbol of the base unit
    const BASE_UNIT: &'static str;

    /// Supported unit symbols with their factor to the base unit
    const UNITS: &'static [(&'static str, f64)];

    /// Creates a value from a number expressed in the base unit
    fn from_base(value: f64) -> Self;

    /// Returns the value expressed in the base unit
    fn base(self) -> f64;

    /// Zero in this dimension
    fn zero() -> Self {
        Self::from_base(0.0)
    }

    /// Absolute value
    fn magnitude(self) -> Self {
        Self::from_base(libm::fabs(self.base()))
    }

    /// Whether the underlying number is neither NaN nor infinite
    fn is_finite_value(self) -> bool {
        self.base().is_finite()
    }

    /// Converts the value to one of the supported units
    fn in_unit(self, unit: &str) -> Option<f64> {
        Self::UNITS
            .iter()
            .find(|(symbol, _)| *symbol == unit)
            .map(|(_, factor)| self.base() / factor)
    }

    /// Wraps the value into the half-open interval `[lo, hi)`
    fn wrapped(self, lo: Self, hi: Self) -> Self {
        Self::from_base(floored_mod(self.base(), lo.base(), hi.base()))
    }
}

impl Quantity for f64 {
    const NAME: &'static str = "scalar";
    const BASE_UNIT: &'static str = "";
    const UNITS: &'static [(&'static str, f64)] = &[("", 1.0)];

    fn from_base(value: f64) -> Self {
        value
    }

    fn base(self) -> f64 {
        self
    }
}

/// Floored modulo of `x` into `[lo, hi)`.
///
/// Unlike `%`, the result always lands inside the interval, also for
/// negative inputs: `floored_mod(-10.0, 0.0, 360.0) == 350.0`.
pub fn floored_mod(x: f64, lo: f64, hi: f64) -> f64 {
    let width = hi - lo;
    if width <= 0.0 {
        return lo;
    }

    let wrapped = x - width * libm::floor((x - lo) / width);
    // Rounding can land exactly on `hi` for inputs just below `lo`
    if wrapped >= hi {
        lo
    } else {
        wrapped
    }
}

/// Parses `"<number> <unit>"` (whitespace optional) into a quantity.
pub(crate) fn parse_quantity<Q: Quantity>(text: &str) -> Result<Q, ParseError> {
    let text = text.trim();
    let split = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .map(|(index, _)| index)
        .unwrap_or(text.len());

    let (number, unit) = text.split_at(split);
    let number: f64 = number
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidNumber { quantity: Q::NAME })?;
    let unit = unit.trim();

    if unit.is_empty() && !Q::BASE_UNIT.is_empty() {
        return Err(ParseError::MissingUnit { quantity: Q::NAME });
    }

    Q::UNITS
        .iter()
        .find(|(symbol, _)| *symbol == unit)
        .map(|(_, factor)| Q::from_base(number * factor))
        .ok_or(ParseError::UnknownUnit { quantity: Q::NAME })
}

/// Defines a quantity newtype with factory functions, accessors, arithmetic,
/// `Display`, `FromStr` and optional serde support.
macro_rules! quantity {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal, base = $base:literal,
        units { $($symbol:literal => $factor:expr),+ $(,)? }
        conversions { $($from:ident / $to:ident => $conv:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
        pub struct $name(f64);

        impl $name {
            $(
                #[doc = concat!("Creates a ", $label, " from a value in `", stringify!($to), "`")]
                pub const fn $from(value: f64) -> Self {
                    Self(value * $conv)
                }

                #[doc = concat!("Returns the ", $label, " in `", stringify!($to), "`")]
                pub const fn $to(self) -> f64 {
                    self.0 / $conv
                }
            )+
        }

        impl $crate::quantity::Quantity for $name {
            const NAME: &'static str = $label;
            const BASE_UNIT: &'static str = $base;
            const UNITS: &'static [(&'static str, f64)] = &[$(($symbol, $factor)),+];

            fn from_base(value: f64) -> Self {
                Self(value)
            }

            fn base(self) -> f64 {
                self.0
            }
        }

        impl core::ops::Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl core::ops::Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl core::ops::Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl core::ops::Mul<f64> for $name {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl core::ops::Mul<$name> for f64 {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self * rhs.0)
            }
        }

        impl core::ops::Div<f64> for $name {
            type Output = Self;
            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl core::ops::Div for $name {
            type Output = f64;
            fn div(self, rhs: Self) -> f64 {
                self.0 / rhs.0
            }
        }

        impl core::ops::AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl core::ops::SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{} {}", self.0, $base)
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::quantity::ParseError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                $crate::quantity::parse_quantity(text)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct Visitor;

                impl<'de> serde::de::Visitor<'de> for Visitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                        write!(f, "a {} with unit, e.g. \"1 {}\"", $label, $base)
                    }

                    fn visit_str<E: serde::de::Error>(self, text: &str) -> Result<$name, E> {
                        text.parse().map_err(E::custom)
                    }
                }

                deserializer.deserialize_str(Visitor)
            }
        }
    };
}
