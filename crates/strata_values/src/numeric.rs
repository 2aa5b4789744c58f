//! Exact rationals and numeric operations with promotion.
//!
//! Mixed operands promote along integer → rational → real. Integer and
//! rational arithmetic is checked and reports overflow instead of wrapping.

use std::cmp::Ordering;
use std::fmt;

use strata_types::{Error, ErrorKind, Result, Type};

use crate::value::Value;

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

fn overflow() -> Error {
    Error::new(ErrorKind::Overflow)
}

/// An exact fraction in lowest terms with a positive denominator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

impl Rational {
    /// Creates a normalized fraction.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DivisionByZero`] for a zero denominator, or
    /// [`ErrorKind::Overflow`] if the normalized form does not fit.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self> {
        Self::normalize(i128::from(numerator), i128::from(denominator))
    }

    /// Products of two `i64` parts always fit in `i128`, so arithmetic is
    /// done wide and narrowed once here.
    fn normalize(numerator: i128, denominator: i128) -> Result<Self> {
        if denominator == 0 {
            return Err(Error::new(ErrorKind::DivisionByZero));
        }
        let divisor = gcd(numerator, denominator).max(1);
        let sign = if denominator < 0 { -1 } else { 1 };
        let (numerator, denominator) = (sign * numerator / divisor, sign * denominator / divisor);
        Ok(Self {
            numerator: i64::try_from(numerator).map_err(|_| overflow())?,
            denominator: i64::try_from(denominator).map_err(|_| overflow())?,
        })
    }

    /// The rational equal to an integer.
    #[must_use]
    pub fn from_integer(n: i64) -> Self {
        Self {
            numerator: n,
            denominator: 1,
        }
    }

    /// Returns the numerator.
    #[must_use]
    pub fn numerator(self) -> i64 {
        self.numerator
    }

    /// Returns the (always positive) denominator.
    #[must_use]
    pub fn denominator(self) -> i64 {
        self.denominator
    }

    /// Converts to the nearest real.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_real(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Rounds toward negative infinity.
    #[must_use]
    pub fn floor(self) -> i64 {
        self.numerator.div_euclid(self.denominator)
    }

    /// Rounds to the nearest integer, ties away from zero.
    #[must_use]
    pub fn round(self) -> i64 {
        let (n, d) = self.wide();
        let magnitude = (2 * n.abs() + d).div_euclid(2 * d);
        let rounded = if n < 0 { -magnitude } else { magnitude };
        // Never larger in magnitude than the numerator.
        i64::try_from(rounded).unwrap_or(self.numerator)
    }

    fn wide(self) -> (i128, i128) {
        (i128::from(self.numerator), i128::from(self.denominator))
    }

    fn add(self, other: Self) -> Result<Self> {
        let ((an, ad), (bn, bd)) = (self.wide(), other.wide());
        Self::normalize(an * bd + bn * ad, ad * bd)
    }

    fn negate(self) -> Result<Self> {
        let (n, d) = self.wide();
        Self::normalize(-n, d)
    }

    fn multiply(self, other: Self) -> Result<Self> {
        let ((an, ad), (bn, bd)) = (self.wide(), other.wide());
        Self::normalize(an * bn, ad * bd)
    }

    fn divide(self, other: Self) -> Result<Self> {
        let ((an, ad), (bn, bd)) = (self.wide(), other.wide());
        Self::normalize(an * bd, ad * bn)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = i128::from(self.numerator) * i128::from(other.denominator);
        let rhs = i128::from(other.numerator) * i128::from(self.denominator);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}r{}", self.numerator, self.denominator)
    }
}

/// A numeric operand after promotion to a common representation.
enum Promoted {
    Integers(i64, i64),
    Rationals(Rational, Rational),
    Reals(f64, f64),
}

fn as_rational(value: &Value) -> Option<Rational> {
    match value {
        Value::Integer(n) => Some(Rational::from_integer(*n)),
        Value::Rational(r) => Some(*r),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_real(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(n) => Some(*n as f64),
        Value::Rational(r) => Some(r.to_real()),
        Value::Real(x) => Some(*x),
        _ => None,
    }
}

fn not_numeric(value: &Value) -> Error {
    Error::type_mismatch(Type::number(), value.ty())
}

fn promote(left: &Value, right: &Value) -> Result<Promoted> {
    for operand in [left, right] {
        if !operand.ty().is_numeric() {
            return Err(not_numeric(operand));
        }
    }
    Ok(match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Promoted::Integers(*a, *b),
        (Value::Real(_), _) | (_, Value::Real(_)) => Promoted::Reals(
            as_real(left).ok_or_else(|| not_numeric(left))?,
            as_real(right).ok_or_else(|| not_numeric(right))?,
        ),
        _ => Promoted::Rationals(
            as_rational(left).ok_or_else(|| not_numeric(left))?,
            as_rational(right).ok_or_else(|| not_numeric(right))?,
        ),
    })
}

impl Value {
    /// Adds two numbers.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch for non-numeric operands, or
    /// [`ErrorKind::Overflow`].
    pub fn add(&self, other: &Value) -> Result<Value> {
        Ok(match promote(self, other)? {
            Promoted::Integers(a, b) => Value::Integer(a.checked_add(b).ok_or_else(overflow)?),
            Promoted::Rationals(a, b) => Value::Rational(a.add(b)?),
            Promoted::Reals(a, b) => Value::Real(a + b),
        })
    }

    /// Subtracts `other` from this number.
    ///
    /// # Errors
    ///
    /// See [`Value::add`].
    pub fn subtract(&self, other: &Value) -> Result<Value> {
        Ok(match promote(self, other)? {
            Promoted::Integers(a, b) => Value::Integer(a.checked_sub(b).ok_or_else(overflow)?),
            Promoted::Rationals(a, b) => Value::Rational(a.add(b.negate()?)?),
            Promoted::Reals(a, b) => Value::Real(a - b),
        })
    }

    /// Multiplies two numbers.
    ///
    /// # Errors
    ///
    /// See [`Value::add`].
    pub fn multiply(&self, other: &Value) -> Result<Value> {
        Ok(match promote(self, other)? {
            Promoted::Integers(a, b) => Value::Integer(a.checked_mul(b).ok_or_else(overflow)?),
            Promoted::Rationals(a, b) => Value::Rational(a.multiply(b)?),
            Promoted::Reals(a, b) => Value::Real(a * b),
        })
    }

    /// Divides this number by `other`.
    ///
    /// Two integers divide into a real, so `5 / 2` is `2.5`. Use
    /// [`Rational::new`] for an exact quotient.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DivisionByZero`] for a zero divisor, otherwise
    /// see [`Value::add`].
    pub fn divide(&self, other: &Value) -> Result<Value> {
        Ok(match promote(self, other)? {
            Promoted::Integers(_, 0) => return Err(Error::new(ErrorKind::DivisionByZero)),
            #[allow(clippy::cast_precision_loss)]
            Promoted::Integers(a, b) => Value::Real(a as f64 / b as f64),
            Promoted::Rationals(a, b) => Value::Rational(a.divide(b)?),
            Promoted::Reals(_, b) if b == 0.0 => {
                return Err(Error::new(ErrorKind::DivisionByZero));
            }
            Promoted::Reals(a, b) => Value::Real(a / b),
        })
    }

    /// Negates a number.
    ///
    /// # Errors
    ///
    /// See [`Value::add`].
    pub fn negate(&self) -> Result<Value> {
        match self {
            Value::Integer(n) => Ok(Value::Integer(n.checked_neg().ok_or_else(overflow)?)),
            Value::Rational(r) => Ok(Value::Rational(r.negate()?)),
            Value::Real(x) => Ok(Value::Real(-x)),
            other => Err(not_numeric(other)),
        }
    }

    /// Rounds toward negative infinity.
    ///
    /// Integers and rationals give integers, reals stay real.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch for non-numeric values.
    pub fn floor(&self) -> Result<Value> {
        match self {
            Value::Integer(n) => Ok(Value::Integer(*n)),
            Value::Rational(r) => Ok(Value::Integer(r.floor())),
            Value::Real(x) => Ok(Value::Real(x.floor())),
            other => Err(not_numeric(other)),
        }
    }

    /// Rounds to the nearest whole number, ties away from zero.
    ///
    /// Integers and rationals give integers, reals stay real.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch for non-numeric values.
    pub fn round(&self) -> Result<Value> {
        match self {
            Value::Integer(n) => Ok(Value::Integer(*n)),
            Value::Rational(r) => Ok(Value::Integer(r.round())),
            Value::Real(x) => Ok(Value::Real(x.round())),
            other => Err(not_numeric(other)),
        }
    }

    /// Compares two numbers across representations.
    ///
    /// Returns `None` for non-numeric operands or a NaN.
    #[must_use]
    pub fn numeric_cmp(&self, other: &Value) -> Option<Ordering> {
        match promote(self, other).ok()? {
            Promoted::Integers(a, b) => Some(a.cmp(&b)),
            Promoted::Rationals(a, b) => Some(a.cmp(&b)),
            Promoted::Reals(a, b) => a.partial_cmp(&b),
        }
    }
}
