//! Unit dictionary construction
//!
//! The dictionary maps unit spellings to their canonical [`UnitInfo`]. It is
//! built in three waves — base units, then seed entries in declaration
//! order, then the prefix-expanded spellings of each entry — and is frozen
//! afterwards. Seed expressions are resolved against the dictionary under
//! construction, so an entry may reference base units and any entry declared
//! before it, but never a later one.

use crate::algebra::UnitAlgebra;
use crate::config::UnitsConfig;
use crate::error::{Error, Result};
use crate::unit::UnitInfo;
use mensura_algebra::Engine;
use std::collections::{HashMap, HashSet};

/// Frozen name -> [`UnitInfo`] table.
#[derive(Debug)]
pub struct UnitDictionary {
    entries: HashMap<String, UnitInfo>,
    base_names: Box<[String]>,
    width: usize,
}

impl UnitDictionary {
    pub fn get(&self, name: &str) -> Option<&UnitInfo> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured base units, in exponent-vector order.
    pub fn base_units(&self) -> &[String] {
        &self.base_names
    }

    /// Padded exponent-vector width shared by every entry.
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn build(config: &UnitsConfig, engine: &Engine) -> Result<Self> {
        let dims = config.base_units.len();
        let width = UnitInfo::padded_width(dims);
        let mut dict = UnitDictionary {
            entries: HashMap::new(),
            base_names: Vec::new().into_boxed_slice(),
            width,
        };

        let mut base_names = Vec::with_capacity(dims);
        for (ordinal, raw) in config.base_units.iter().enumerate() {
            let name = strip_spaces(raw);
            if name.is_empty() {
                return Err(Error::InvalidConfig("empty base unit name".into()));
            }
            if dict
                .entries
                .insert(name.clone(), UnitInfo::base(width, ordinal))
                .is_some()
            {
                return Err(Error::InvalidConfig(format!(
                    "duplicate base unit '{name}'"
                )));
            }
            base_names.push(name);
        }
        let base_set: HashSet<&str> = base_names.iter().map(String::as_str).collect();

        for (names, expr) in &config.units {
            let expr = expr.as_str().ok_or_else(|| {
                Error::InvalidConfig(format!("unit entry '{names}' must map to an expression string"))
            })?;
            let info = engine
                .resolve(&UnitAlgebra::new(&dict), expr)
                .map_err(|e| Error::InvalidConfig(format!("unit entry '{names}': {expr}: {e}")))?;

            for spec in parse_name_list(names)? {
                if !base_set.contains(spec.name.as_str()) {
                    dict.entries.insert(spec.name.clone(), info.clone());
                }
                for family in &spec.families {
                    let prefixes = config.prefixes.get(family).ok_or_else(|| {
                        Error::InvalidConfig(format!(
                            "unknown prefix family '{family}' on unit '{}'",
                            spec.name
                        ))
                    })?;
                    for (prefix, prefix_factor) in prefixes {
                        let spelled = format!("{prefix}{}", spec.name);
                        let scaled = info.scaled(*prefix_factor);
                        if dict.entries.contains_key(&spelled) {
                            // Ambiguous spellings keep their original binding;
                            // the prefixed variant moves to the bracketed form
                            // (`min` the minute vs `[m]in`, milli-inch).
                            dict.entries
                                .insert(format!("[{prefix}]{}", spec.name), scaled);
                        } else {
                            dict.entries.insert(spelled, scaled);
                        }
                    }
                }
            }
        }

        dict.base_names = base_names.into_boxed_slice();
        Ok(dict)
    }
}

struct NameSpec {
    families: Vec<String>,
    name: String,
}

/// Parse a `"[si]g, [siLong]gram"` style name list. Family tags bind only to
/// the name that immediately follows them.
fn parse_name_list(list: &str) -> Result<Vec<NameSpec>> {
    let bytes = list.as_bytes();
    let mut specs = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let mut families = Vec::new();
        if bytes[i] == b'[' {
            let close = list[i..]
                .find(']')
                .map(|offset| i + offset)
                .ok_or_else(|| {
                    Error::InvalidConfig(format!("unterminated prefix family tag in '{list}'"))
                })?;
            for family in list[i + 1..close].split(',') {
                let family = family.trim_matches(' ');
                if !family.is_empty() {
                    families.push(family.to_string());
                }
            }
            i = close + 1;
        }

        let end = list[i..]
            .find(',')
            .map(|offset| i + offset)
            .unwrap_or(bytes.len());
        let name = strip_spaces(&list[i..end]);
        if name.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "empty unit name in entry '{list}'"
            )));
        }
        specs.push(NameSpec { families, name });
        i = end + 1;
    }

    if specs.is_empty() {
        return Err(Error::InvalidConfig("empty unit name list".into()));
    }
    Ok(specs)
}

fn strip_spaces(raw: &str) -> String {
    raw.chars().filter(|c| *c != ' ').collect()
}
