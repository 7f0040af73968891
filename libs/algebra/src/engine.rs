//! Shunting-yard expression engine
//!
//! Tokenises a character expression strictly left-to-right and applies
//! operators by precedence and associativity against an explicit operator
//! stack. Operand creation and operator semantics are delegated to the
//! [`Algebra`] implementation supplied per call, so the engine itself holds
//! only the registered operator tables and is freely shared across threads.

use crate::error::{Error, Result};
use crate::operator::{
    Arity, BinaryOp, OpEntry, MAX_BINARY_PRECEDENCE, RESERVED_TOKENS,
};
use crate::scratch::Scratch;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

/// The capability set a variable domain supplies to the engine.
///
/// Implementations are consulted for every operand and every operator
/// application. Domain failures are reported as [`Error::Variable`] with a
/// human-readable message.
pub trait Algebra {
    type Var: Clone;

    /// Create a variable from a numeric literal.
    fn number(&self, value: f64) -> Result<Self::Var>;

    /// Look up a named variable; `None` produces an unknown-name diagnostic.
    fn variable(&self, name: &str) -> Option<Self::Var>;

    /// Candidate names for the "did you mean" list of an unknown-name error.
    fn similar_names(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn apply_unary(&self, op: char, operand: Self::Var) -> Result<Self::Var>;

    fn apply_binary(&self, op: char, lhs: Self::Var, rhs: Self::Var) -> Result<Self::Var>;

    /// Apply a registered function. Arguments arrive in left-to-right order
    /// and may be drained from the buffer.
    fn apply_function(&self, name: &str, args: &mut Vec<Self::Var>) -> Result<Self::Var>;
}

/// Shunting-yard engine over registered operator tables.
///
/// Registration is only legal before the first resolution; afterwards the
/// tables are frozen and every method is safe to call concurrently.
#[derive(Debug)]
pub struct Engine {
    unary: [bool; 256],
    binary: [Option<BinaryOp>; 256],
    functions: HashMap<String, Arity>,
    sealed: AtomicBool,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            unary: [false; 256],
            binary: [None; 256],
            functions: HashMap::new(),
            sealed: AtomicBool::new(false),
        }
    }

    /// Register a single-byte prefix operator (precedence 254, right-assoc).
    pub fn add_unary(&mut self, token: char) -> Result<()> {
        let byte = self.operator_byte(token)?;
        self.unary[byte as usize] = true;
        Ok(())
    }

    /// Register a single-byte infix operator with precedence `0..=253`.
    pub fn add_binary(&mut self, token: char, precedence: u8, right_associative: bool) -> Result<()> {
        if precedence > MAX_BINARY_PRECEDENCE {
            return Err(Error::InvalidOperator {
                token: token.to_string(),
                message: "binary precedence must be 253 or less",
            });
        }
        let byte = self.operator_byte(token)?;
        self.binary[byte as usize] = Some(BinaryOp {
            precedence,
            right_associative,
        });
        Ok(())
    }

    /// Register a named function.
    pub fn add_function(&mut self, name: &str, arity: Arity) -> Result<()> {
        if self.sealed.load(Ordering::Acquire) {
            return Err(Error::Sealed);
        }
        let name = name.trim_matches(' ');
        if name.is_empty() {
            return Err(Error::InvalidOperator {
                token: String::new(),
                message: "function name must be non-empty",
            });
        }
        self.functions.insert(name.to_string(), arity);
        Ok(())
    }

    fn operator_byte(&self, token: char) -> Result<u8> {
        if self.sealed.load(Ordering::Acquire) {
            return Err(Error::Sealed);
        }
        if !token.is_ascii() {
            return Err(Error::InvalidOperator {
                token: token.to_string(),
                message: "operator tokens must be single-byte",
            });
        }
        let byte = token as u8;
        if RESERVED_TOKENS.contains(&byte) {
            return Err(Error::InvalidOperator {
                token: token.to_string(),
                message: "token is reserved by the tokeniser",
            });
        }
        Ok(byte)
    }

    fn is_operator_byte(&self, byte: u8) -> bool {
        self.unary[byte as usize] || self.binary[byte as usize].is_some()
    }

    fn is_seek_byte(&self, byte: u8) -> bool {
        RESERVED_TOKENS.contains(&byte) || self.is_operator_byte(byte)
    }

    /// Index of the next seek byte at or after `from`.
    fn seek(&self, bytes: &[u8], from: usize) -> usize {
        let mut i = from;
        while i < bytes.len() && !self.is_seek_byte(bytes[i]) {
            i += 1;
        }
        i
    }

    /// Resolve an expression with freshly allocated scratch.
    pub fn resolve<A: Algebra>(&self, algebra: &A, expr: &str) -> Result<A::Var> {
        let mut scratch = Scratch::new();
        self.resolve_with(algebra, expr, &mut scratch)
    }

    /// Resolve an expression reusing caller-held scratch stacks.
    ///
    /// The scratch is cleared on entry (so a panicked earlier call cannot
    /// leak state into this one) and reset on exit, success or failure.
    pub fn resolve_with<A: Algebra>(
        &self,
        algebra: &A,
        expr: &str,
        scratch: &mut Scratch<A::Var>,
    ) -> Result<A::Var> {
        self.sealed.store(true, Ordering::Release);
        scratch.clear();
        let result = self.run(algebra, expr, scratch);
        scratch.reset();
        result
    }

    fn run<A: Algebra>(
        &self,
        algebra: &A,
        expr: &str,
        scratch: &mut Scratch<A::Var>,
    ) -> Result<A::Var> {
        let bytes = expr.as_bytes();
        let mut i = 0usize;
        // Last non-space byte consumed; decides prefix vs infix positions.
        let mut prev: Option<u8> = None;

        while i < bytes.len() {
            let b = bytes[i];
            if b == b' ' {
                i += 1;
                continue;
            }
            match b {
                b'(' => {
                    scratch.operators.push((OpEntry::Group, i));
                    prev = Some(b);
                    i += 1;
                }
                b')' | b',' => {
                    if prev == Some(b',') || (b == b',' && prev == Some(b'(')) {
                        return Err(Error::Syntax {
                            pos: i,
                            message: "Unexpected comma",
                        });
                    }
                    loop {
                        match scratch.operators.pop() {
                            None => {
                                return Err(Error::Syntax {
                                    pos: i,
                                    message: "No matching left parenthesis or comma",
                                })
                            }
                            Some((OpEntry::Group, _)) => break,
                            Some((op, pos)) => self.apply(algebra, expr, scratch, op, pos)?,
                        }
                    }
                    if b == b',' {
                        // A comma separates function arguments by re-opening
                        // the group it just closed.
                        scratch.operators.push((OpEntry::Group, i));
                    }
                    prev = Some(b);
                    i += 1;
                }
                _ => {
                    let prefix_position = match prev {
                        None => true,
                        Some(p) => p == b'(' || p == b',' || self.is_operator_byte(p),
                    };
                    if prefix_position && self.unary[b as usize] {
                        scratch.operators.push((OpEntry::Unary(b), i));
                        prev = Some(b);
                        i += 1;
                    } else if let Some(incoming) =
                        self.binary[b as usize].filter(|_| !prefix_position)
                    {
                        while let Some(&(top, _)) = scratch.operators.last() {
                            if matches!(top, OpEntry::Group) {
                                break;
                            }
                            let top_precedence = top.precedence();
                            let pops = top_precedence > incoming.precedence
                                || (top_precedence == incoming.precedence
                                    && !incoming.right_associative);
                            if !pops {
                                break;
                            }
                            let (op, pos) = match scratch.operators.pop() {
                                Some(entry) => entry,
                                None => break,
                            };
                            self.apply(algebra, expr, scratch, op, pos)?;
                        }
                        scratch.operators.push((OpEntry::Binary(b, incoming), i));
                        prev = Some(b);
                        i += 1;
                    } else {
                        i = self.read_operand(algebra, expr, scratch, i)?;
                        prev = bytes.get(i.wrapping_sub(1)).copied();
                    }
                }
            }
        }

        loop {
            match scratch.operators.pop() {
                None => break,
                Some((OpEntry::Group, pos)) => {
                    return Err(Error::Syntax {
                        pos,
                        message: "Missing right parenthesis",
                    })
                }
                Some((op, pos)) => self.apply(algebra, expr, scratch, op, pos)?,
            }
        }

        match scratch.operands.len() {
            0 => Err(Error::NoVariables),
            1 => Ok(scratch.operands.pop().ok_or(Error::NoVariables)?),
            _ => Err(Error::VariablesRemain),
        }
    }

    /// Read one operand or function name starting at `i`; returns the index
    /// one past its end.
    fn read_operand<A: Algebra>(
        &self,
        algebra: &A,
        expr: &str,
        scratch: &mut Scratch<A::Var>,
        i: usize,
    ) -> Result<usize> {
        let bytes = expr.as_bytes();
        let mut end = self.seek(bytes, i);
        if end == i {
            // The cursor sits on an operator byte in a position it cannot
            // occupy (e.g. the second `*` of `2 ** 3`). Take it, plus the
            // span behind it, as the offending token.
            end = self.seek(bytes, i + 1);
        } else if end < bytes.len() && self.is_operator_byte(bytes[end]) {
            // Signed-exponent peek: `1e+7` must stay one numeric literal.
            let widened = self.seek(bytes, end + 1);
            if f64::from_str(&expr[i..widened]).is_ok() {
                end = widened;
            }
        }

        let token = &expr[i..end];
        if let Ok(value) = f64::from_str(token) {
            let var = algebra.number(value)?;
            scratch.operands.push(var);
        } else if let Some(&arity) = self.functions.get(token) {
            scratch.operators.push((
                OpEntry::Function {
                    name_len: token.len(),
                    arity,
                },
                i,
            ));
        } else if let Some(var) = algebra.variable(token) {
            scratch.operands.push(var);
        } else if token.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return Err(Error::NumberParse {
                token: token.to_string(),
                pos: i,
            });
        } else {
            return Err(Error::UnknownName {
                token: token.to_string(),
                pos: i,
                suggestions: algebra.similar_names(token),
            });
        }
        Ok(end)
    }

    fn apply<A: Algebra>(
        &self,
        algebra: &A,
        expr: &str,
        scratch: &mut Scratch<A::Var>,
        op: OpEntry,
        pos: usize,
    ) -> Result<()> {
        match op {
            // Group markers are consumed by the paren/comma loops.
            OpEntry::Group => Ok(()),
            OpEntry::Unary(token) => {
                let operand = scratch.operands.pop().ok_or_else(|| Error::MissingOperand {
                    op: (token as char).to_string(),
                    pos,
                    index: 1,
                })?;
                let out = algebra.apply_unary(token as char, operand)?;
                scratch.operands.push(out);
                Ok(())
            }
            OpEntry::Binary(token, _) => {
                if scratch.operands.len() < 2 {
                    return Err(Error::MissingOperand {
                        op: (token as char).to_string(),
                        pos,
                        index: scratch.operands.len() + 1,
                    });
                }
                let rhs = scratch.operands.pop().ok_or(Error::NoVariables)?;
                let lhs = scratch.operands.pop().ok_or(Error::NoVariables)?;
                let out = algebra.apply_binary(token as char, lhs, rhs)?;
                scratch.operands.push(out);
                Ok(())
            }
            OpEntry::Function { name_len, arity } => {
                let name = &expr[pos..pos + name_len];
                let count = self.count_arguments(expr, pos, name_len)?;
                if !arity.accepts(count) {
                    return Err(Error::ArityMismatch {
                        name: name.to_string(),
                        pos,
                        expected: arity,
                        got: count,
                    });
                }
                if scratch.operands.len() < count {
                    return Err(Error::MissingOperand {
                        op: name.to_string(),
                        pos,
                        index: scratch.operands.len() + 1,
                    });
                }
                let split = scratch.operands.len() - count;
                scratch.args.clear();
                scratch.args.extend(scratch.operands.drain(split..));
                let out = algebra.apply_function(name, &mut scratch.args)?;
                scratch.operands.push(out);
                Ok(())
            }
        }
    }

    /// Count the comma-separated arguments of the call whose name starts at
    /// `pos`, by re-scanning its parenthesised span and tracking nesting.
    fn count_arguments(&self, expr: &str, pos: usize, name_len: usize) -> Result<usize> {
        let bytes = expr.as_bytes();
        let mut j = pos + name_len;
        while j < bytes.len() && bytes[j] == b' ' {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'(' {
            return Err(Error::Syntax {
                pos,
                message: "Missing argument list for function call",
            });
        }
        let mut depth = 1usize;
        let mut commas = 0usize;
        let mut has_content = false;
        j += 1;
        while j < bytes.len() {
            match bytes[j] {
                b'(' => {
                    depth += 1;
                    has_content = true;
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(if has_content { commas + 1 } else { 0 });
                    }
                    has_content = true;
                }
                b',' => {
                    if depth == 1 {
                        commas += 1;
                    }
                    has_content = true;
                }
                b' ' => {}
                _ => has_content = true,
            }
            j += 1;
        }
        Err(Error::Syntax {
            pos,
            message: "Missing right parenthesis",
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
