#![forbid(unsafe_code)]

//! Unit-of-measure engine
//!
//! Parses textual unit expressions (`kg*m/s^2`, `degF`, `1.25 * m^(4/3)`,
//! `pow(m,2)/s`) into a canonical form — a vector of base-unit exponents
//! plus a linear conversion `y = x * factor + offset` — and answers
//! conversion queries between any two such units.
//!
//! The normal entry point is the cache-backed [`unit`] function (or
//! [`UnitSystem::unit`] on an explicit instance):
//!
//! ```
//! let inches = mensura_units::unit("in").unwrap();
//! let millimetres = mensura_units::unit("mm").unwrap();
//! let conversion = inches.conversion_to(Some(&millimetres)).unwrap();
//! assert!((conversion.apply(1.0) - 25.4).abs() < 1e-9);
//! ```
//!
//! Resolution is intentionally not tuned for per-sample loops: resolve once,
//! keep the [`Conversion`], and apply it to your samples.

mod algebra;
mod cache;
mod config;
mod dict;
mod error;
mod quantity;
mod resolver;
mod system;
mod unit;

pub use cache::ResolvedUnit;
pub use config::UnitsConfig;
pub use dict::UnitDictionary;
pub use error::{Error, Result};
pub use quantity::Measurement;
pub use resolver::UnitResolver;
pub use system::{configure, convert, unit, Unit, UnitSystem};
pub use unit::{Conversion, UnitInfo, COMMENSURABILITY_TOLERANCE, EXPONENT_SCALE};
