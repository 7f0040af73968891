//! The unit variable algebra
//!
//! Implements [`mensura_algebra::Algebra`] for [`UnitInfo`] operands over a
//! frozen dictionary. "Constant" below means an operand whose exponents are
//! all zero; constants fold into offsets under `+`/`-`, which is how affine
//! units like `degC` are written (`K + 273.15`).

use crate::dict::UnitDictionary;
use crate::error::Error;
use crate::unit::{round_scaled_exponent, UnitInfo};
use mensura_algebra::{suggest, Algebra};

pub(crate) struct UnitAlgebra<'a> {
    dict: &'a UnitDictionary,
}

impl<'a> UnitAlgebra<'a> {
    pub(crate) fn new(dict: &'a UnitDictionary) -> Self {
        Self { dict }
    }

    fn multiply(&self, x: UnitInfo, y: UnitInfo, invert: bool) -> crate::Result<UnitInfo> {
        // An offset-bearing operand may only meet a constant here.
        if (x.offset() != 0.0 && !y.is_constant()) || (y.offset() != 0.0 && !x.is_constant()) {
            return Err(Error::OffsetMisuse);
        }
        let sign = if invert { -1i32 } else { 1i32 };
        let exponents = combine_exponents(x.exponents(), y.exponents(), sign)?;
        let factor = if invert {
            x.factor() / y.factor()
        } else {
            x.factor() * y.factor()
        };
        Ok(UnitInfo::new(exponents, factor, x.offset() + y.offset()))
    }

    fn add(&self, x: UnitInfo, y: UnitInfo, sign: f64) -> crate::Result<UnitInfo> {
        match (x.is_constant(), y.is_constant()) {
            (true, true) => Ok(UnitInfo::constant(
                x.factor() + sign * y.factor(),
                x.exponents().len(),
            )),
            // The constant side folds into the offset of the other.
            (false, true) => {
                let offset = x.offset() + sign * (y.factor() + y.offset());
                Ok(x.with_offset(offset))
            }
            (true, false) => {
                let offset = x.factor() + x.offset() + sign * y.offset();
                Ok(UnitInfo::new(
                    y.exponents().into(),
                    sign * y.factor(),
                    offset,
                ))
            }
            (false, false) => {
                if x.offset() != 0.0 && y.offset() != 0.0 {
                    return Err(Error::OffsetMisuse);
                }
                if !x.commensurable(&y) {
                    return Err(Error::Incommensurable);
                }
                let factor = x.factor() + sign * y.factor();
                // A vanished factor is the zero unit; it carries no offset.
                let offset = if factor == 0.0 {
                    0.0
                } else {
                    x.offset() + sign * y.offset()
                };
                Ok(UnitInfo::new(x.exponents().into(), factor, offset))
            }
        }
    }

    fn power(&self, base: UnitInfo, exponent: UnitInfo) -> crate::Result<UnitInfo> {
        if !exponent.is_constant() {
            return Err(Error::DimensionedExponent);
        }
        if base.offset() != 0.0 {
            return Err(Error::OffsetPower);
        }
        let power = exponent.factor();
        let exponents = base.pow_exponents(power)?;
        Ok(UnitInfo::new(exponents, base.factor().powf(power), 0.0))
    }
}

impl Algebra for UnitAlgebra<'_> {
    type Var = UnitInfo;

    fn number(&self, value: f64) -> mensura_algebra::Result<UnitInfo> {
        Ok(UnitInfo::constant(value, self.dict.width()))
    }

    fn variable(&self, name: &str) -> Option<UnitInfo> {
        self.dict.get(name).cloned()
    }

    fn similar_names(&self, name: &str) -> Vec<String> {
        suggest::closest(name, self.dict.names(), suggest::MAX_SUGGESTIONS)
    }

    fn apply_unary(&self, op: char, operand: UnitInfo) -> mensura_algebra::Result<UnitInfo> {
        match op {
            '+' => Ok(operand),
            // Negation flips the offset too: `-x` stands for `-value*f - o`.
            '-' => Ok(operand.negated()),
            _ => Err(mensura_algebra::Error::Variable(format!(
                "unsupported unary operator '{op}'"
            ))),
        }
    }

    fn apply_binary(
        &self,
        op: char,
        lhs: UnitInfo,
        rhs: UnitInfo,
    ) -> mensura_algebra::Result<UnitInfo> {
        let result = match op {
            '^' => self.power(lhs, rhs),
            '*' => self.multiply(lhs, rhs, false),
            '/' => self.multiply(lhs, rhs, true),
            '+' => self.add(lhs, rhs, 1.0),
            '-' => self.add(lhs, rhs, -1.0),
            _ => {
                return Err(mensura_algebra::Error::Variable(format!(
                    "unsupported binary operator '{op}'"
                )))
            }
        };
        result.map_err(Error::into_variable)
    }

    fn apply_function(
        &self,
        name: &str,
        args: &mut Vec<UnitInfo>,
    ) -> mensura_algebra::Result<UnitInfo> {
        match name {
            "pow" => {
                let exponent = args.pop().ok_or(mensura_algebra::Error::NoVariables)?;
                let base = args.pop().ok_or(mensura_algebra::Error::NoVariables)?;
                self.power(base, exponent).map_err(Error::into_variable)
            }
            _ => Err(mensura_algebra::Error::Variable(format!(
                "unknown function '{name}'"
            ))),
        }
    }
}

/// Lane-wise exponent sum (or difference), with range checking.
fn combine_exponents(a: &[i16], b: &[i16], sign: i32) -> crate::Result<Box<[i16]>> {
    a.iter()
        .zip(b.iter())
        .map(|(&ea, &eb)| {
            let combined = i32::from(ea) + sign * i32::from(eb);
            round_scaled_exponent(f64::from(combined))
        })
        .collect()
}
