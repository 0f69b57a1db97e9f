//! BLITZ Linker.
//!
//! Combines relocatable object files into one executable. It performs:
//! 1. **Layout:** The file with the entry point goes first. Text starts at 0, data at
//!    the next page boundary after all text, bss at the next page after all data.
//! 2. **Symbol Resolution:** A global table binds imports to exports and resolves
//!    relative-to chains to absolute addresses.
//! 3. **Patching:** Each relocation writes its final value into a zeroed field.
//! 4. **Labels:** Every file's label table is rebased into the executable's.
//!
//! Layout and symbol problems are collected and reported together; a relocation
//! that lands on non-zero bits stops the link at once.

/// Relocation patching.
pub mod relocate;

/// Global symbol table.
pub mod symbols;

use thiserror::Error;
use tracing::debug;

use self::relocate::{PatchError, patch};
use self::symbols::{SegmentBases, SymbolTable};
use crate::common::Diagnostic;
use crate::common::constants::{PAGE_SIZE, WORD_SIZE, align_up};
use crate::object::{Executable, ExecutableLabel, ObjectFile, Segment};

/// One object file to link.
#[derive(Clone, Debug)]
pub struct LinkInput {
    /// File name for diagnostics.
    pub name: String,
    /// Decoded object.
    pub object: ObjectFile,
}

/// A successful link.
#[derive(Clone, Debug)]
pub struct LinkOutput {
    /// The executable image.
    pub executable: Executable,
    /// Warnings; they never block output.
    pub warnings: Vec<Diagnostic>,
}

/// Errors that stop the linker.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Layout or symbol errors, each reported once.
    #[error("link failed with {} error(s)", .0.len())]
    Failed(Vec<Diagnostic>),

    /// A relocation could not be applied.
    #[error("{file}, line {line}: {source}")]
    Relocation {
        /// Object file holding the relocation.
        file: String,
        /// Source line recorded by the assembler.
        line: u32,
        /// What went wrong.
        #[source]
        source: PatchError,
    },
}

/// Linker state.
#[derive(Debug)]
pub struct Linker {
    inputs: Vec<LinkInput>,
    bases: Vec<SegmentBases>,
    symbols: SymbolTable,
    text: Vec<u8>,
    data: Vec<u8>,
    data_addr: u32,
    bss_addr: u32,
    bss_size: u32,
    warnings: Vec<Diagnostic>,
}

impl Linker {
    /// Creates a linker over the given inputs, entry file first.
    ///
    /// # Returns
    ///
    /// An error unless exactly one input defines the entry point.
    pub fn new(mut inputs: Vec<LinkInput>) -> Result<Self, LinkError> {
        let entries: Vec<usize> = inputs
            .iter()
            .enumerate()
            .filter(|(_, input)| input.object.has_entry)
            .map(|(i, _)| i)
            .collect();
        match entries.as_slice() {
            [only] => {
                let entry = inputs.remove(*only);
                inputs.insert(0, entry);
            }
            [] => {
                return Err(LinkError::Failed(vec![Diagnostic::in_file(
                    "link",
                    "no input defines the entry point (_entry)",
                )]));
            }
            many => {
                return Err(LinkError::Failed(
                    many.iter()
                        .map(|i| Diagnostic::in_file(&inputs[*i].name, "entry point defined here too"))
                        .collect(),
                ));
            }
        }
        Ok(Self {
            inputs,
            bases: Vec::new(),
            symbols: SymbolTable::new(),
            text: Vec::new(),
            data: Vec::new(),
            data_addr: 0,
            bss_addr: 0,
            bss_size: 0,
            warnings: Vec::new(),
        })
    }

    /// Assigns every file's segment addresses and concatenates the images.
    pub fn layout(&mut self) {
        let mut bases = vec![SegmentBases::default(); self.inputs.len()];

        for (input, base) in self.inputs.iter().zip(bases.iter_mut()) {
            self.text
                .resize(align_up(self.text.len() as u32, WORD_SIZE) as usize, 0);
            base.text = self.text.len() as u32;
            self.text.extend_from_slice(&input.object.text);
        }

        self.data_addr = align_up(self.text.len() as u32, PAGE_SIZE);
        for (input, base) in self.inputs.iter().zip(bases.iter_mut()) {
            self.data
                .resize(align_up(self.data.len() as u32, WORD_SIZE) as usize, 0);
            base.data = self.data_addr + self.data.len() as u32;
            self.data.extend_from_slice(&input.object.data);
        }

        self.bss_addr = align_up(self.data_addr + self.data.len() as u32, PAGE_SIZE);
        let mut bss_end = self.bss_addr;
        for (input, base) in self.inputs.iter().zip(bases.iter_mut()) {
            bss_end = align_up(bss_end, WORD_SIZE);
            base.bss = bss_end;
            bss_end += input.object.bss_size;
        }
        self.bss_size = bss_end - self.bss_addr;
        self.bases = bases;

        debug!(
            text = self.text.len(),
            data_addr = format_args!("{:#x}", self.data_addr),
            bss_addr = format_args!("{:#x}", self.bss_addr),
            "layout"
        );
    }

    /// Builds and resolves the global symbol table.
    pub fn resolve(&mut self) -> Result<(), LinkError> {
        for (input, bases) in self.inputs.iter().zip(&self.bases) {
            self.symbols
                .add_file(&input.name, *bases, &input.object.symbols);
        }
        self.symbols.resolve().map_err(LinkError::Failed)
    }

    /// Applies every relocation of every file.
    pub fn patch(&mut self) -> Result<(), LinkError> {
        let mut errors = Vec::new();
        for (f, input) in self.inputs.iter().enumerate() {
            let bases = self.bases[f];
            for reloc in &input.object.relocations {
                let Some(target) = self.symbols.value_of(f, reloc.relative_to) else {
                    if !self.symbols.has_record(f, reloc.relative_to) {
                        errors.push(Diagnostic::at_line(
                            &input.name,
                            reloc.source_line,
                            format!("relocation refers to unknown symbol {}", reloc.relative_to),
                        ));
                    }
                    continue;
                };
                let (image, start, own_len) = match reloc.segment {
                    Segment::Text => (&mut self.text, 0, input.object.text.len()),
                    Segment::Data => (&mut self.data, self.data_addr, input.object.data.len()),
                    Segment::Bss => {
                        errors.push(Diagnostic::at_line(
                            &input.name,
                            reloc.source_line,
                            "relocation inside .bss",
                        ));
                        continue;
                    }
                };
                let end = u64::from(reloc.location) + u64::from(reloc.kind.width());
                if end > own_len as u64 {
                    errors.push(Diagnostic::at_line(
                        &input.name,
                        reloc.source_line,
                        format!(
                            "relocation location {:#x} lies outside the file's {} bytes of segment",
                            reloc.location, own_len
                        ),
                    ));
                    continue;
                }
                let value = target.wrapping_add(reloc.offset);
                let address = bases.of(reloc.segment).wrapping_add(reloc.location);
                let Some(index) = address.checked_sub(start) else {
                    errors.push(Diagnostic::at_line(
                        &input.name,
                        reloc.source_line,
                        format!("relocation address {address:#010x} lies below its segment"),
                    ));
                    continue;
                };
                let index = index as usize;
                let warning = patch(image, index, address, reloc.kind, value).map_err(|source| {
                    LinkError::Relocation {
                        file: input.name.clone(),
                        line: reloc.source_line,
                        source,
                    }
                })?;
                if let Some(message) = warning {
                    self.warnings
                        .push(Diagnostic::at_line(&input.name, reloc.source_line, message));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LinkError::Failed(errors))
        }
    }

    /// Produces the executable.
    pub fn finish(self) -> LinkOutput {
        let mut labels = Vec::new();
        for (input, bases) in self.inputs.iter().zip(&self.bases) {
            for label in &input.object.labels {
                if let Some(seg) = Segment::from_number(label.relative_to) {
                    labels.push(ExecutableLabel {
                        name: label.name.clone(),
                        value: bases.of(seg).wrapping_add(label.value),
                    });
                }
            }
        }
        LinkOutput {
            executable: Executable {
                text_addr: 0,
                data_addr: self.data_addr,
                bss_addr: self.bss_addr,
                text: self.text,
                data: self.data,
                bss_size: self.bss_size,
                labels,
            },
            warnings: self.warnings,
        }
    }
}

/// Links object files into an executable.
///
/// # Arguments
///
/// * `inputs` - Object files in command-line order; exactly one must have an entry point.
pub fn link(inputs: Vec<LinkInput>) -> Result<LinkOutput, LinkError> {
    let mut linker = Linker::new(inputs)?;
    linker.layout();
    linker.resolve()?;
    linker.patch()?;
    Ok(linker.finish())
}
