//! Two-pass code generation.
//!
//! Pass one walks the parsed lines to size every statement and bind labels,
//! imports and equates. Equates that mention later symbols are retried once all
//! labels are known. Pass two walks the same lines again, emitting bytes into the
//! text and data images and recording a relocation for every field whose value is
//! not yet an absolute number.
//!
//! Both passes advance the location counters identically: a statement that fails
//! in pass two still occupies the space pass one gave it.

use std::collections::HashMap;

use tracing::debug;

use super::ENTRY_LABEL;
use super::error::AsmError;
use super::expr::{Base, EvalError, Expr, Value};
use super::lex::tokenize;
use super::parse::{Directive, Index, Line, Operand, Reg, Statement, parse_line};
use crate::common::Diagnostic;
use crate::common::constants::{INSTRUCTION_SIZE, WORD_SIZE, align_up};
use crate::common::endian::word_to_bytes;
use crate::isa::encode::{Operands, encode, fits_signed};
use crate::isa::opcodes::{self, Format, Op, OpcodeInfo};
use crate::object::object_file::{FIRST_SYMBOL_NUMBER, RELATIVE_ABSOLUTE};
use crate::object::{
    LabelRecord, ObjectFile, RelativeTo, RelocationKind, RelocationRecord, Segment, SymbolRecord,
};

/// A successful assembly.
#[derive(Clone, Debug)]
pub struct Assembly {
    /// The object file.
    pub object: ObjectFile,
    /// Warnings; they never block output.
    pub warnings: Vec<Diagnostic>,
}

/// Assembles one source file.
///
/// # Arguments
///
/// * `source` - Source text.
/// * `file` - File name used in diagnostics.
///
/// # Returns
///
/// The object file and warnings, or every error found.
pub fn assemble(source: &str, file: &str) -> Result<Assembly, AsmError> {
    let mut asm = Assembler::new(file);
    let lines = asm.parse(source);
    asm.pass_one(&lines);
    asm.resolve_equates();
    asm.check_exports();
    asm.number_symbols();
    asm.pass_two(&lines);
    asm.finish()
}

/// Bytes a mnemonic occupies; `set` expands to `sethi` + `setlo`.
fn instruction_size(mnemonic: &str) -> u32 {
    if mnemonic == "set" {
        2 * INSTRUCTION_SIZE
    } else {
        INSTRUCTION_SIZE
    }
}

fn is_known(mnemonic: &str) -> bool {
    mnemonic == "set" || opcodes::is_mnemonic(mnemonic)
}

/// Whether a value fits 32 bits read either as signed or unsigned.
const fn fits_word(value: i64) -> bool {
    value >= i32::MIN as i64 && value <= u32::MAX as i64
}

struct Assembler<'a> {
    file: &'a str,
    symbols: HashMap<String, Value>,
    labels: Vec<String>,
    imports: Vec<String>,
    exports: Vec<(String, u32)>,
    numbers: HashMap<String, u32>,
    pending: Vec<(String, Expr, u32)>,
    skips: HashMap<u32, u32>,
    segment: Segment,
    counters: [u32; 3],
    text: Vec<u8>,
    data: Vec<u8>,
    relocations: Vec<RelocationRecord>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl<'a> Assembler<'a> {
    fn new(file: &'a str) -> Self {
        Self {
            file,
            symbols: HashMap::new(),
            labels: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            numbers: HashMap::new(),
            pending: Vec::new(),
            skips: HashMap::new(),
            segment: Segment::Text,
            counters: [0; 3],
            text: Vec::new(),
            data: Vec::new(),
            relocations: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, line: u32, message: impl Into<String>) {
        self.errors
            .push(Diagnostic::at_line(self.file, line, message));
    }

    fn warn(&mut self, line: u32, message: impl Into<String>) {
        self.warnings
            .push(Diagnostic::at_line(self.file, line, message));
    }

    fn counter(&self) -> u32 {
        self.counters[self.segment as usize - 1]
    }

    fn here(&self) -> Value {
        Value {
            base: Base::Segment(self.segment),
            offset: i64::from(self.counter()),
        }
    }

    fn advance(&mut self, bytes: u32) {
        let slot = &mut self.counters[self.segment as usize - 1];
        *slot = slot.wrapping_add(bytes);
    }

    fn reset_location(&mut self) {
        self.segment = Segment::Text;
        self.counters = [0; 3];
    }

    fn parse(&mut self, source: &str) -> Vec<Line> {
        let mut lines = Vec::new();
        for (number, tokens) in tokenize(source) {
            match tokens {
                Ok(tokens) => match parse_line(number, &tokens) {
                    Ok(line) => lines.push(line),
                    Err(msg) => self.error(number, msg),
                },
                Err(err) => self.error(number, err.to_string()),
            }
        }
        lines
    }

    fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        expr.eval(&|name: &str| self.symbols.get(name).cloned())
    }

    // ---- pass one ----

    fn pass_one(&mut self, lines: &[Line]) {
        self.reset_location();
        for line in lines {
            let n = line.number;
            if let Some(label) = &line.label {
                self.define(label, self.here(), n);
                self.labels.push(label.clone());
            }
            match &line.statement {
                None => {}
                Some(Statement::Directive(d)) => self.size_directive(d, n),
                Some(Statement::Equate(name, expr)) => match self.eval(expr) {
                    Ok(value) => self.define(name, value, n),
                    Err(EvalError::Undefined(_)) => {
                        self.pending.push((name.clone(), expr.clone(), n));
                    }
                    Err(err) => self.error(n, err.to_string()),
                },
                Some(Statement::Instruction(m, _)) => {
                    if !is_known(m) {
                        self.error(n, format!("unknown instruction '{m}'"));
                        continue;
                    }
                    self.check_placement(n, "instruction");
                    self.advance(instruction_size(m));
                }
            }
        }
    }

    fn define(&mut self, name: &str, value: Value, line: u32) {
        if self.symbols.contains_key(name) {
            self.error(line, format!("'{name}' is already defined"));
            return;
        }
        self.symbols.insert(name.to_string(), value);
    }

    /// Instructions and `.word` need an aligned spot outside `.bss`.
    fn check_placement(&mut self, line: u32, what: &str) {
        if self.segment == Segment::Bss {
            self.error(line, format!("{what} not allowed in .bss"));
        } else if self.counter() % WORD_SIZE != 0 {
            self.error(line, format!("{what} is not word aligned; use .align"));
        }
    }

    fn size_directive(&mut self, d: &Directive, line: u32) {
        match d {
            Directive::Text => self.segment = Segment::Text,
            Directive::Data => self.segment = Segment::Data,
            Directive::Bss => self.segment = Segment::Bss,
            Directive::Export(names) => {
                self.exports
                    .extend(names.iter().map(|name| (name.clone(), line)));
            }
            Directive::Import(names) => {
                for name in names {
                    let value = Value {
                        base: Base::Import(name.clone()),
                        offset: 0,
                    };
                    if !self.symbols.contains_key(name) {
                        self.imports.push(name.clone());
                    }
                    self.define(name, value, line);
                }
            }
            Directive::Word(_) => {
                self.check_placement(line, ".word");
                self.advance(WORD_SIZE);
            }
            Directive::Byte(_) => {
                self.check_data(line, ".byte");
                self.advance(1);
            }
            Directive::Ascii(bytes) => {
                self.check_data(line, ".ascii");
                self.advance(bytes.len() as u32);
            }
            Directive::Skip(expr) => match self.eval(expr) {
                Ok(v) if v.is_absolute() && (0..=i64::from(u32::MAX)).contains(&v.offset) => {
                    let n = v.offset as u32;
                    self.skips.insert(line, n);
                    self.advance(n);
                }
                Ok(_) => self.error(line, ".skip needs a non-negative absolute count"),
                Err(err) => self.error(line, format!(".skip: {err}")),
            },
            Directive::Align => {
                let aligned = align_up(self.counter(), WORD_SIZE);
                let pad = aligned - self.counter();
                self.advance(pad);
            }
        }
    }

    fn check_data(&mut self, line: u32, what: &str) {
        if self.segment == Segment::Bss {
            self.error(line, format!("{what} not allowed in .bss"));
        }
    }

    /// Retries equates that referred forward until nothing more resolves.
    fn resolve_equates(&mut self) {
        loop {
            let mut progress = false;
            let pending = std::mem::take(&mut self.pending);
            for (name, expr, line) in pending {
                match self.eval(&expr) {
                    Ok(value) => {
                        self.define(&name, value, line);
                        progress = true;
                    }
                    Err(EvalError::Undefined(_)) => self.pending.push((name, expr, line)),
                    Err(err) => self.error(line, err.to_string()),
                }
            }
            if !progress {
                break;
            }
        }
        for (name, expr, line) in std::mem::take(&mut self.pending) {
            let missing = expr
                .symbols()
                .into_iter()
                .find(|s| !self.symbols.contains_key(*s))
                .unwrap_or(&name)
                .to_string();
            self.error(
                line,
                format!("cannot evaluate '{name}': '{missing}' is undefined or circular"),
            );
        }
    }

    fn check_exports(&mut self) {
        let exports = std::mem::take(&mut self.exports);
        let mut kept: Vec<(String, u32)> = Vec::new();
        for (name, line) in exports {
            if kept.iter().any(|(k, _)| *k == name) {
                continue;
            }
            match self.symbols.get(&name) {
                None => self.error(line, format!("exported symbol '{name}' is not defined")),
                Some(Value {
                    base: Base::Import(import),
                    ..
                }) if *import == name => {
                    self.error(line, format!("'{name}' is both imported and exported"));
                }
                Some(_) => kept.push((name, line)),
            }
        }
        self.exports = kept;
    }

    fn number_symbols(&mut self) {
        let names = self
            .imports
            .iter()
            .chain(self.exports.iter().map(|(name, _)| name));
        for (i, name) in names.enumerate() {
            self.numbers
                .insert(name.clone(), FIRST_SYMBOL_NUMBER + i as u32);
        }
    }

    // ---- pass two ----

    fn pass_two(&mut self, lines: &[Line]) {
        self.reset_location();
        for line in lines {
            let n = line.number;
            match &line.statement {
                None | Some(Statement::Equate(..)) => {}
                Some(Statement::Directive(d)) => self.emit_directive(d, n),
                Some(Statement::Instruction(m, ops)) => {
                    if !is_known(m) {
                        continue;
                    }
                    let size = instruction_size(m);
                    let words = match self.instruction(m, ops, n) {
                        Ok(words) => words,
                        Err(msg) => {
                            self.error(n, msg);
                            vec![0; (size / INSTRUCTION_SIZE) as usize]
                        }
                    };
                    for word in words {
                        self.emit(&word_to_bytes(word));
                    }
                }
            }
        }
    }

    fn emit(&mut self, bytes: &[u8]) {
        match self.segment {
            Segment::Text => self.text.extend_from_slice(bytes),
            Segment::Data => self.data.extend_from_slice(bytes),
            Segment::Bss => {}
        }
        self.advance(bytes.len() as u32);
    }

    fn emit_zeros(&mut self, count: u32) {
        match self.segment {
            Segment::Text => self.text.resize(self.text.len() + count as usize, 0),
            Segment::Data => self.data.resize(self.data.len() + count as usize, 0),
            Segment::Bss => {}
        }
        self.advance(count);
    }

    fn emit_directive(&mut self, d: &Directive, line: u32) {
        match d {
            Directive::Text => self.segment = Segment::Text,
            Directive::Data => self.segment = Segment::Data,
            Directive::Bss => self.segment = Segment::Bss,
            Directive::Export(_) | Directive::Import(_) => {}
            Directive::Word(expr) => {
                let bits = self.value_field(expr, RelocationKind::Word, line);
                if !fits_word(bits) {
                    self.warn(line, format!("value {bits} truncated to 32 bits"));
                }
                self.emit(&word_to_bytes(bits as u32));
            }
            Directive::Byte(expr) => {
                let bits = self.value_field(expr, RelocationKind::Byte, line);
                if !(-128..=255).contains(&bits) {
                    self.warn(line, format!("value {bits} truncated to 8 bits"));
                }
                self.emit(&[bits as u8]);
            }
            Directive::Ascii(bytes) => self.emit(bytes),
            Directive::Skip(_) => {
                let n = self.skips.get(&line).copied().unwrap_or(0);
                self.emit_zeros(n);
            }
            Directive::Align => {
                let pad = align_up(self.counter(), WORD_SIZE) - self.counter();
                self.emit_zeros(pad);
            }
        }
    }

    /// Evaluates a data field; errors are reported and leave the field zero.
    fn value_field(&mut self, expr: &Expr, kind: RelocationKind, line: u32) -> i64 {
        let result = self
            .eval(expr)
            .map_err(|e| e.to_string())
            .and_then(|v| self.fixup(&v, kind, 0, line));
        result.unwrap_or_else(|msg| {
            self.error(line, msg);
            0
        })
    }

    fn relocation(&mut self, kind: RelocationKind, at: u32, relative_to: u32, addend: i64, line: u32) {
        if self.segment == Segment::Bss {
            return;
        }
        self.relocations.push(RelocationRecord {
            kind,
            location: self.counter() + at,
            segment: self.segment,
            offset: addend as u32,
            relative_to,
            source_line: line,
        });
    }

    /// Field bits for a value: the number itself when absolute, otherwise zero plus
    /// a relocation that the linker fills in.
    ///
    /// # Arguments
    ///
    /// * `at` - Byte offset of the field's relocation location from the statement start.
    fn fixup(&mut self, value: &Value, kind: RelocationKind, at: u32, line: u32) -> Result<i64, String> {
        let relative_to = match &value.base {
            Base::Absolute => return Ok(value.offset),
            Base::Segment(seg) => seg.number(),
            Base::Import(name) => *self
                .numbers
                .get(name)
                .ok_or_else(|| format!("import '{name}' has no symbol record"))?,
        };
        self.relocation(kind, at, relative_to, value.offset, line);
        Ok(0)
    }

    fn form(m: &str, format: Format) -> Result<&'static OpcodeInfo, String> {
        opcodes::find(m, format).ok_or_else(|| format!("invalid operands for '{m}'"))
    }

    fn imm16(&mut self, expr: &Expr, line: u32) -> Result<i32, String> {
        let value = self.eval(expr).map_err(|e| e.to_string())?;
        // the immediate is the low half of the big-endian instruction word
        let bits = self.fixup(&value, RelocationKind::Half, 2, line)?;
        if value.is_absolute() && !fits_signed(bits, 16) {
            return Err(format!("immediate {bits} does not fit in 16 bits"));
        }
        Ok(bits as i32)
    }

    /// A PC-relative displacement to `expr` from the current instruction.
    fn displacement(
        &mut self,
        expr: &Expr,
        kind: RelocationKind,
        bits: u32,
        line: u32,
    ) -> Result<i32, String> {
        let target = self.eval(expr).map_err(|e| e.to_string())?;
        let here = self.here();
        if target.base == here.base {
            let d = target.offset - here.offset;
            if !fits_signed(d, bits) {
                return Err(format!("target is {d} bytes away; does not fit in {bits} bits"));
            }
            return Ok(d as i32);
        }
        if target.is_absolute() {
            self.relocation(kind, 0, RELATIVE_ABSOLUTE, target.offset, line);
            return Ok(0);
        }
        self.fixup(&target, kind, 0, line)?;
        Ok(0)
    }

    fn memory_form(&mut self, m: &str, rc: u8, ra: u8, index: &Index, line: u32) -> Result<u32, String> {
        let (format, rb, imm) = match index {
            Index::Reg(rb) => (Format::D, *rb, 0),
            Index::None => (Format::E, 0, 0),
            Index::Expr(e) => (Format::E, 0, self.imm16(e, line)?),
        };
        let info = Self::form(m, format)?;
        Ok(encode(info, Operands {
            rc: rc as usize,
            ra: ra as usize,
            rb: rb as usize,
            imm,
        }))
    }

    fn instruction(&mut self, m: &str, ops: &[Operand], line: u32) -> Result<Vec<u32>, String> {
        use Operand::{Expr as E, Mem, PostInc, PreDec, Sum};
        use Reg::{Float, Int};
        let r = |n: &u8| *n as usize;

        if m == "set" {
            let [E(expr), Operand::Reg(Int(rc))] = ops else {
                return Err("usage: set expr, rc".to_string());
            };
            let value = self.eval(expr).map_err(|e| e.to_string())?;
            let bits = self.fixup(&value, RelocationKind::SetHi, 0, line)?;
            self.fixup(&value, RelocationKind::SetLo, INSTRUCTION_SIZE, line)?;
            if !fits_word(bits) {
                self.warn(line, format!("value {bits} truncated to 32 bits"));
            }
            let ops_hi = Operands {
                rc: r(rc),
                imm: (bits >> 16) as i32,
                ..Operands::default()
            };
            let ops_lo = Operands {
                rc: r(rc),
                imm: bits as i32,
                ..Operands::default()
            };
            return Ok(vec![
                encode(Self::form("sethi", Format::G)?, ops_hi),
                encode(Self::form("setlo", Format::G)?, ops_lo),
            ]);
        }

        let op = opcodes::all()
            .iter()
            .find(|info| info.mnemonic == m)
            .map(|info| info.op)
            .ok_or_else(|| format!("unknown instruction '{m}'"))?;

        let c = |rc: usize, ra: usize| Operands {
            rc,
            ra,
            ..Operands::default()
        };
        let word = match (op, ops) {
            (_, []) => encode(Self::form(m, Format::A)?, Operands::default()),
            (Op::Ldptbr | Op::Ldptlr, [Operand::Reg(Int(rc))]) => {
                encode(Self::form(m, Format::B)?, c(r(rc), 0))
            }
            (Op::Push | Op::Pop, [Operand::Reg(Int(rc))]) => {
                encode(Self::form(m, Format::C)?, c(r(rc), 15))
            }
            (Op::Push, [Operand::Reg(Int(rc)), PreDec(ra)])
            | (Op::Pop, [PostInc(ra), Operand::Reg(Int(rc))])
            | (Op::Tset, [Mem(ra, Index::None), Operand::Reg(Int(rc))])
            | (Op::Readu | Op::Writeu, [Operand::Reg(Int(ra)), Operand::Reg(Int(rc))])
            | (Op::Itof, [Operand::Reg(Int(ra)), Operand::Reg(Float(rc))])
            | (Op::Ftoi, [Operand::Reg(Float(ra)), Operand::Reg(Int(rc))])
            | (
                Op::Fcmp | Op::Fsqrt | Op::Fneg | Op::Fabs | Op::Fmov,
                [Operand::Reg(Float(ra)), Operand::Reg(Float(rc))],
            ) => encode(Self::form(m, Format::C)?, c(r(rc), r(ra))),
            (
                Op::Fpu(_),
                [
                    Operand::Reg(Float(ra)),
                    Operand::Reg(Float(rb)),
                    Operand::Reg(Float(rc)),
                ],
            )
            | (
                Op::Alu(_),
                [
                    Operand::Reg(Int(ra)),
                    Operand::Reg(Int(rb)),
                    Operand::Reg(Int(rc)),
                ],
            ) => encode(Self::form(m, Format::D)?, Operands {
                rc: r(rc),
                ra: r(ra),
                rb: r(rb),
                imm: 0,
            }),
            (Op::Alu(_), [Operand::Reg(Int(ra)), E(expr), Operand::Reg(Int(rc))]) => {
                let imm = self.imm16(expr, line)?;
                encode(Self::form(m, Format::E)?, Operands {
                    rc: r(rc),
                    ra: r(ra),
                    rb: 0,
                    imm,
                })
            }
            (
                Op::Load | Op::Loadb | Op::Loadv | Op::Loadbv,
                [Mem(ra, index), Operand::Reg(Int(rc))],
            )
            | (Op::Fload, [Mem(ra, index), Operand::Reg(Float(rc))])
            | (
                Op::Store | Op::Storeb | Op::Storev | Op::Storebv,
                [Operand::Reg(Int(rc)), Mem(ra, index)],
            )
            | (Op::Fstore, [Operand::Reg(Float(rc)), Mem(ra, index)]) => {
                self.memory_form(m, *rc, *ra, index, line)?
            }
            (Op::Call | Op::Jmp | Op::Branch(_), [Sum(ra, Index::Reg(rb))]) => {
                encode(Self::form(m, Format::D)?, Operands {
                    rc: 0,
                    ra: r(ra),
                    rb: r(rb),
                    imm: 0,
                })
            }
            (Op::Call | Op::Jmp | Op::Branch(_), [E(expr)]) => {
                let imm = self.displacement(expr, RelocationKind::PcRelative24, 24, line)?;
                encode(Self::form(m, Format::F)?, Operands {
                    imm,
                    ..Operands::default()
                })
            }
            (Op::Sethi | Op::Setlo, [E(expr), Operand::Reg(Int(rc))]) => {
                let value = self.eval(expr).map_err(|e| e.to_string())?;
                let (kind, shift) = if op == Op::Sethi {
                    (RelocationKind::SetHi, 16)
                } else {
                    (RelocationKind::SetLo, 0)
                };
                let bits = self.fixup(&value, kind, 0, line)?;
                encode(Self::form(m, Format::G)?, Operands {
                    rc: r(rc),
                    imm: (bits >> shift) as i32,
                    ..Operands::default()
                })
            }
            (Op::Ldaddr, [E(expr), Operand::Reg(Int(rc))]) => {
                let imm = self.displacement(expr, RelocationKind::PcRelative16, 16, line)?;
                encode(Self::form(m, Format::G)?, Operands {
                    rc: r(rc),
                    imm,
                    ..Operands::default()
                })
            }
            (Op::Syscall, [E(expr)]) => {
                let imm = self.imm16(expr, line)?;
                encode(Self::form(m, Format::G)?, Operands {
                    imm,
                    ..Operands::default()
                })
            }
            (Op::Syscall, [Operand::Reg(Int(rc))]) => {
                encode(Self::form(m, Format::G)?, c(r(rc), 0))
            }
            (Op::Syscall, [Sum(rc, Index::Expr(expr))]) => {
                let imm = self.imm16(expr, line)?;
                encode(Self::form(m, Format::G)?, Operands {
                    rc: r(rc),
                    imm,
                    ..Operands::default()
                })
            }
            _ => return Err(format!("invalid operands for '{m}'")),
        };
        Ok(vec![word])
    }

    fn finish(self) -> Result<Assembly, AsmError> {
        if !self.errors.is_empty() {
            return Err(AsmError {
                errors: self.errors,
                warnings: self.warnings,
            });
        }

        let has_entry = matches!(
            self.symbols.get(ENTRY_LABEL),
            Some(Value {
                base: Base::Segment(Segment::Text),
                ..
            })
        );

        let mut symbols: Vec<SymbolRecord> = self
            .imports
            .iter()
            .map(|name| SymbolRecord {
                number: self.numbers[name],
                value: 0,
                relative_to: RelativeTo::Imported,
                name: name.clone(),
            })
            .collect();
        for (name, _) in &self.exports {
            let value = &self.symbols[name];
            let relative_to = match &value.base {
                Base::Absolute => RelativeTo::Absolute,
                Base::Segment(seg) => RelativeTo::Segment(*seg),
                Base::Import(import) => RelativeTo::Symbol(self.numbers[import]),
            };
            symbols.push(SymbolRecord {
                number: self.numbers[name],
                value: value.offset as u32,
                relative_to,
                name: name.clone(),
            });
        }

        let labels = self
            .labels
            .iter()
            .filter_map(|name| match self.symbols.get(name) {
                Some(Value {
                    base: Base::Segment(seg),
                    offset,
                }) => Some(LabelRecord {
                    relative_to: seg.number(),
                    value: *offset as u32,
                    name: name.clone(),
                }),
                _ => None,
            })
            .collect();

        debug!(
            file = self.file,
            text = self.text.len(),
            data = self.data.len(),
            bss = self.counters[2],
            relocations = self.relocations.len(),
            "assembled"
        );

        Ok(Assembly {
            object: ObjectFile {
                has_entry,
                text: self.text,
                data: self.data,
                bss_size: self.counters[2],
                symbols,
                relocations: self.relocations,
                labels,
            },
            warnings: self.warnings,
        })
    }
}
