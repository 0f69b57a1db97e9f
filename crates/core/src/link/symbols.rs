//! Global symbol table.
//!
//! Each input file contributes its symbol records. Exports are keyed by name
//! across all files, imports bind to the unique export of the same name, and
//! values are resolved by a fixed point over the relative-to chains: every pass
//! resolves whatever it can from what earlier passes resolved, and the loop stops
//! when a full pass changes nothing.

use std::collections::HashMap;

use tracing::debug;

use crate::common::Diagnostic;
use crate::object::object_file::RELATIVE_ABSOLUTE;
use crate::object::{RelativeTo, Segment, SymbolRecord};

/// Final addresses of one file's three segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmentBases {
    /// Address of the file's text.
    pub text: u32,
    /// Address of the file's data.
    pub data: u32,
    /// Address of the file's bss.
    pub bss: u32,
}

impl SegmentBases {
    /// The base address of a segment.
    pub const fn of(&self, seg: Segment) -> u32 {
        match seg {
            Segment::Text => self.text,
            Segment::Data => self.data,
            Segment::Bss => self.bss,
        }
    }
}

#[derive(Debug)]
struct FileSymbols {
    name: String,
    bases: SegmentBases,
    records: Vec<SymbolRecord>,
    by_number: HashMap<u32, usize>,
}

/// Symbols of every input file, resolved to absolute addresses.
#[derive(Debug, Default)]
pub struct SymbolTable {
    files: Vec<FileSymbols>,
    exports: HashMap<String, (usize, u32)>,
    values: HashMap<(usize, u32), u32>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one file's records.
    ///
    /// # Returns
    ///
    /// The file index used by `value_of`.
    pub fn add_file(&mut self, name: &str, bases: SegmentBases, records: &[SymbolRecord]) -> usize {
        let by_number = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.number, i))
            .collect();
        self.files.push(FileSymbols {
            name: name.to_string(),
            bases,
            records: records.to_vec(),
            by_number,
        });
        self.files.len() - 1
    }

    /// Merges exports, binds imports and resolves every record.
    ///
    /// # Returns
    ///
    /// Every duplicate export, missing export and unresolved symbol, each once.
    pub fn resolve(&mut self) -> Result<(), Vec<Diagnostic>> {
        let mut errors = Vec::new();

        for (f, file) in self.files.iter().enumerate() {
            for record in &file.records {
                if record.relative_to == RelativeTo::Imported {
                    continue;
                }
                if let Some((other, _)) = self.exports.get(&record.name) {
                    errors.push(Diagnostic::in_file(
                        &file.name,
                        format!(
                            "'{}' is also exported by {}",
                            record.name, self.files[*other].name
                        ),
                    ));
                    continue;
                }
                self.exports.insert(record.name.clone(), (f, record.number));
            }
        }

        let mut bindings: HashMap<(usize, u32), (usize, u32)> = HashMap::new();
        for (f, file) in self.files.iter().enumerate() {
            for record in &file.records {
                if record.relative_to != RelativeTo::Imported {
                    continue;
                }
                match self.exports.get(&record.name) {
                    Some(target) => {
                        bindings.insert((f, record.number), *target);
                    }
                    None => errors.push(Diagnostic::in_file(
                        &file.name,
                        format!("'{}' is imported but no file exports it", record.name),
                    )),
                }
            }
        }

        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for (f, file) in self.files.iter().enumerate() {
                for record in &file.records {
                    let key = (f, record.number);
                    if self.values.contains_key(&key) {
                        continue;
                    }
                    let value = match record.relative_to {
                        RelativeTo::Absolute => Some(record.value),
                        RelativeTo::Segment(seg) => {
                            Some(file.bases.of(seg).wrapping_add(record.value))
                        }
                        RelativeTo::Symbol(n) => self
                            .values
                            .get(&(f, n))
                            .map(|base| base.wrapping_add(record.value)),
                        RelativeTo::Imported => bindings
                            .get(&key)
                            .and_then(|target| self.values.get(target))
                            .copied(),
                    };
                    if let Some(value) = value {
                        self.values.insert(key, value);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        debug!(passes, symbols = self.values.len(), "symbol resolution");

        for (f, file) in self.files.iter().enumerate() {
            for record in &file.records {
                let bound = record.relative_to != RelativeTo::Imported
                    || bindings.contains_key(&(f, record.number));
                if bound && !self.values.contains_key(&(f, record.number)) {
                    errors.push(Diagnostic::in_file(
                        &file.name,
                        format!("symbol '{}' could not be resolved", record.name),
                    ));
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// The absolute value behind a relative-to word of file `file`.
    ///
    /// 0 is absolute zero, 1..3 are the file's segment bases and anything else is
    /// one of the file's records.
    pub fn value_of(&self, file: usize, relative_to: u32) -> Option<u32> {
        if relative_to == RELATIVE_ABSOLUTE {
            return Some(0);
        }
        if let Some(seg) = Segment::from_number(relative_to) {
            return self.files.get(file).map(|f| f.bases.of(seg));
        }
        self.values.get(&(file, relative_to)).copied()
    }

    /// The resolved value of an exported name.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        let key = self.exports.get(name)?;
        self.values.get(key).copied()
    }

    /// Whether file `file` has a record numbered `number`.
    pub fn has_record(&self, file: usize, number: u32) -> bool {
        self.files
            .get(file)
            .is_some_and(|f| f.by_number.contains_key(&number))
    }
}
