//! Unit expression resolver
//!
//! A [`UnitResolver`] bundles the shunting-yard engine (with the unit
//! operator table registered) and the frozen dictionary built from one
//! configuration. Instances are immutable after construction and freely
//! shared across threads; evaluation scratch lives in a thread-local and is
//! reset between calls.

use crate::algebra::UnitAlgebra;
use crate::config::UnitsConfig;
use crate::dict::UnitDictionary;
use crate::error::{Error, Result};
use crate::unit::UnitInfo;
use mensura_algebra::{Arity, Engine, Scratch};
use std::cell::RefCell;

thread_local! {
    static SCRATCH: RefCell<Scratch<UnitInfo>> = RefCell::new(Scratch::new());
}

#[derive(Debug)]
pub struct UnitResolver {
    engine: Engine,
    dict: UnitDictionary,
}

impl UnitResolver {
    /// Build a resolver from a configuration. Fails on malformed
    /// configuration or on a seed expression that does not resolve.
    pub fn new(config: &UnitsConfig) -> Result<Self> {
        config.validate()?;
        let mut engine = Engine::new();
        register_operators(&mut engine)
            .map_err(|e| Error::InvalidConfig(format!("operator registration: {e}")))?;
        let dict = UnitDictionary::build(config, &engine)?;
        Ok(Self { engine, dict })
    }

    /// Resolve an expression to its canonical unit, without caching.
    pub fn resolve(&self, expr: &str) -> Result<UnitInfo> {
        let algebra = UnitAlgebra::new(&self.dict);
        SCRATCH
            .with(|scratch| {
                let mut scratch = scratch.borrow_mut();
                self.engine.resolve_with(&algebra, expr, &mut scratch)
            })
            .map_err(|source| Error::Resolve {
                expr: expr.to_string(),
                source,
            })
    }

    pub fn dictionary(&self) -> &UnitDictionary {
        &self.dict
    }
}

fn register_operators(engine: &mut Engine) -> mensura_algebra::Result<()> {
    engine.add_unary('+')?;
    engine.add_unary('-')?;
    engine.add_binary('^', 4, true)?;
    engine.add_binary('*', 3, false)?;
    engine.add_binary('/', 3, false)?;
    engine.add_binary('+', 2, false)?;
    engine.add_binary('-', 2, false)?;
    engine.add_function("pow", Arity::Exact(2))?;
    Ok(())
}
