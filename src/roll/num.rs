use crate::common::*;
use serde::Serialize;
use std::fmt;

/// A script number. Integer arithmetic that would overflow falls back to
/// floating point instead of wrapping.
#[derive(Debug, Copy, Clone, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(Int),
    Float(Float),
}

impl Number {
    pub const ZERO: Self = Self::Int(0);

    pub fn as_float(self) -> Float {
        match self {
            Self::Int(x) => x as Float,
            Self::Float(x) => x,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Self::Int(x) => x == 0,
            Self::Float(x) => x == 0.0,
        }
    }

    /// The integer value, if this number is integral and in range.
    pub fn to_int(self) -> Option<Int> {
        match self {
            Self::Int(x) => Some(x),
            Self::Float(x) if x.fract() == 0.0 && x >= Int::MIN as Float && x < Int::MAX as Float => {
                Some(x as Int)
            }
            Self::Float(_) => None,
        }
    }

    pub fn floor(self) -> Self {
        self.map_float(Float::floor)
    }

    pub fn ceil(self) -> Self {
        self.map_float(Float::ceil)
    }

    pub fn round(self) -> Self {
        self.map_float(Float::round)
    }

    pub fn abs(self) -> Self {
        match self {
            Self::Int(x) => x.checked_abs().map_or(Self::Float((x as Float).abs()), Self::Int),
            Self::Float(x) => Self::Float(x.abs()),
        }
    }

    // Rounding a float yields an int when the result fits
    fn map_float(self, f: impl FnOnce(Float) -> Float) -> Self {
        match self {
            Self::Int(_) => self,
            Self::Float(x) => {
                let y = f(x);
                Self::Float(y).to_int().map_or(Self::Float(y), Self::Int)
            }
        }
    }

    /// True division. Exact integer quotients stay integers. `None` when
    /// dividing by zero.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        Some(match (self, rhs) {
            (Self::Int(x), Self::Int(y)) => match (x.checked_rem(y), x.checked_div(y)) {
                (Some(0), Some(q)) => Self::Int(q),
                _ => Self::Float(x as Float / y as Float),
            },
            (x, y) => Self::Float(x.as_float() / y.as_float()),
        })
    }

    /// Division rounded towards negative infinity.
    pub fn checked_floor_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        Some(match (self, rhs) {
            (Self::Int(x), Self::Int(y)) => match x.checked_div(y) {
                Some(q) if x % y != 0 && ((x < 0) != (y < 0)) => Self::Int(q - 1),
                Some(q) => Self::Int(q),
                None => Self::Float((x as Float / y as Float).floor()),
            },
            (x, y) => Self::Float((x.as_float() / y.as_float()).floor()),
        })
    }

    /// Remainder taking the sign of the divisor.
    pub fn checked_rem(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        Some(match (self, rhs) {
            (Self::Int(x), Self::Int(y)) => {
                let r = x.checked_rem(y).unwrap_or(0);
                if r != 0 && ((r < 0) != (y < 0)) {
                    Self::Int(r + y)
                } else {
                    Self::Int(r)
                }
            }
            (x, y) => {
                let (x, y) = (x.as_float(), y.as_float());
                let r = x % y;
                if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
                    Self::Float(r + y)
                } else {
                    Self::Float(r)
                }
            }
        })
    }
}

impl std::ops::Neg for Number {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Self::Int(x) => x.checked_neg().map_or(Self::Float(-(x as Float)), Self::Int),
            Self::Float(x) => Self::Float(-x),
        }
    }
}

macro_rules! num_impl_bin_op {
    ($Name:ident, $fn_name:ident, $checked:ident) => {
        impl std::ops::$Name for Number {
            type Output = Self;

            fn $fn_name(self, rhs: Self) -> Self::Output {
                use std::ops::$Name;
                match (self, rhs) {
                    (Self::Int(x), Self::Int(y)) => x
                        .$checked(y)
                        .map_or_else(|| Self::Float((x as Float).$fn_name(y as Float)), Self::Int),
                    (x, y) => Self::Float(x.as_float().$fn_name(y.as_float())),
                }
            }
        }
    };
}

num_impl_bin_op!(Add, add, checked_add);
num_impl_bin_op!(Sub, sub, checked_sub);
num_impl_bin_op!(Mul, mul, checked_mul);

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x == y,
            (x, y) => x.as_float().eq(&y.as_float()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x.partial_cmp(y),
            (x, y) => x.as_float().partial_cmp(&y.as_float()),
        }
    }
}

impl From<Int> for Number {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<Float> for Number {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            Self::Float(x) => fmt::Debug::fmt(x, f),
        }
    }
}
