//! Canonical unit representation
//!
//! A [`UnitInfo`] is a vector of base-unit exponents plus the linear map
//! `y = x * factor + offset` onto the base-unit combination. Exponents are
//! stored as small signed integers scaled by `10^3`, giving three decimal
//! digits of fractional-exponent precision (`m^(4/3)` is `1333`), and the
//! vector is padded to a lane multiple so comparisons run in fixed-width
//! chunks.

use crate::error::{Error, Result};

/// `10^P` with `P = 3` fractional exponent digits.
pub const EXPONENT_SCALE: i32 = 1_000;

/// Summed absolute exponent difference below which two vectors are equal;
/// 10 here is 0.01 in true exponents, so `m^1.333` matches `m^(4/3)` while
/// `m^1.3` does not.
pub const COMMENSURABILITY_TOLERANCE: i32 = 10;

const LANES: usize = 8;

/// An immutable resolved unit: exponent vector, factor and offset.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitInfo {
    exponents: Box<[i16]>,
    factor: f64,
    offset: f64,
}

impl UnitInfo {
    pub(crate) fn new(exponents: Box<[i16]>, factor: f64, offset: f64) -> Self {
        Self {
            exponents,
            factor,
            offset,
        }
    }

    /// A dimensionless constant.
    pub(crate) fn constant(value: f64, width: usize) -> Self {
        Self {
            exponents: vec![0; width].into_boxed_slice(),
            factor: value,
            offset: 0.0,
        }
    }

    /// The base unit at `ordinal`: a single `1 * 10^3` exponent, factor 1.
    pub(crate) fn base(width: usize, ordinal: usize) -> Self {
        let mut exponents = vec![0i16; width];
        exponents[ordinal] = EXPONENT_SCALE as i16;
        Self {
            exponents: exponents.into_boxed_slice(),
            factor: 1.0,
            offset: 0.0,
        }
    }

    /// Exponent vector width for `dims` base units, rounded up to a lane
    /// multiple; trailing positions stay zero.
    pub(crate) fn padded_width(dims: usize) -> usize {
        dims.div_ceil(LANES).max(1) * LANES
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Scaled exponents, one lane per base unit (plus zero padding).
    pub fn exponents(&self) -> &[i16] {
        &self.exponents
    }

    /// `true` when every exponent is zero.
    pub fn is_constant(&self) -> bool {
        self.exponents.iter().all(|&e| e == 0)
    }

    pub(crate) fn scaled(&self, by: f64) -> Self {
        Self {
            exponents: self.exponents.clone(),
            factor: self.factor * by,
            offset: self.offset,
        }
    }

    pub(crate) fn negated(&self) -> Self {
        Self {
            exponents: self.exponents.clone(),
            factor: -self.factor,
            offset: -self.offset,
        }
    }

    pub(crate) fn with_offset(&self, offset: f64) -> Self {
        Self {
            exponents: self.exponents.clone(),
            factor: self.factor,
            offset,
        }
    }

    /// Whether the exponent vectors agree within the tolerance. Units from
    /// resolvers with different base-unit sets never match.
    pub fn commensurable(&self, other: &UnitInfo) -> bool {
        self.exponents.len() == other.exponents.len()
            && exponent_distance(&self.exponents, &other.exponents)
                <= COMMENSURABILITY_TOLERANCE
    }

    /// The linear map converting a value in `self` to a value in `other`.
    pub fn conversion_to(&self, other: &UnitInfo) -> Result<Conversion> {
        if !self.commensurable(other) {
            return Err(Error::Incommensurable);
        }
        Ok(Conversion {
            factor: self.factor / other.factor,
            offset: (self.offset - other.offset) / other.factor,
        })
    }

    /// Exponents scaled by `power`, rounded half away from zero at the
    /// stored precision.
    pub(crate) fn pow_exponents(&self, power: f64) -> Result<Box<[i16]>> {
        self.exponents
            .iter()
            .map(|&e| round_scaled_exponent(f64::from(e) * power))
            .collect()
    }
}

/// A resolved conversion `y = x * factor + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub factor: f64,
    pub offset: f64,
}

impl Conversion {
    pub const IDENTITY: Conversion = Conversion {
        factor: 1.0,
        offset: 0.0,
    };

    pub fn apply(&self, value: f64) -> f64 {
        value * self.factor + self.offset
    }
}

pub(crate) fn round_scaled_exponent(value: f64) -> Result<i16> {
    // f64::round is round-half-away-from-zero.
    let rounded = value.round();
    if rounded < f64::from(i16::MIN) || rounded > f64::from(i16::MAX) {
        return Err(Error::ExponentOverflow);
    }
    Ok(rounded as i16)
}

/// Summed absolute lane difference, accumulated a lane chunk at a time.
fn exponent_distance(a: &[i16], b: &[i16]) -> i32 {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len() % LANES, 0);
    let mut total = 0i32;
    for (ca, cb) in a.chunks_exact(LANES).zip(b.chunks_exact(LANES)) {
        let mut lane_sum = 0i32;
        for k in 0..LANES {
            lane_sum += (i32::from(ca[k]) - i32::from(cb[k])).abs();
        }
        total += lane_sum;
    }
    total
}
