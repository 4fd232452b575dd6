//! Symbol tables for one compilation.
//!
//! Declarations of a function are collected into a [`FrameBuilder`] first; only once every
//! declaration has been seen is it turned into a [`Frame`], which is the only thing statement
//! compilation can look variables up in. Offsets therefore always describe the final push order.
use crate::ast::Type;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;

/// Size in bytes of every stack slot and of the element a pointer steps over.
pub const WORD_SIZE: i32 = 4;

/// Procedure signatures, filled in one parameter at a time as the declarations are visited.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcedureTable {
    signatures: BTreeMap<String, Vec<Type>>,
}

impl ProcedureTable {
    /// Opens an (empty) signature for `name`. Returns `false` if the name was already declared,
    /// in which case its old signature is dropped.
    pub fn declare(&mut self, name: &str) -> bool {
        self.signatures.insert(name.to_string(), Vec::new()).is_none()
    }
    pub fn push_parameter(&mut self, name: &str, ty: Type) {
        self.signatures.entry(name.to_string()).or_default().push(ty);
    }
    pub fn signature(&self, name: &str) -> Option<&[Type]> {
        self.signatures.get(name).map(Vec::as_slice)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Type])> {
        self.signatures
            .iter()
            .map(|(name, signature)| (name.as_str(), signature.as_slice()))
    }
}

#[derive(Debug, Default)]
pub struct FrameBuilder {
    variables: BTreeMap<String, Type>,
    order: Vec<String>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    /// Gives `name` the next stack slot. Returns `false` if the name was already declared; the
    /// first declaration keeps its type but the new slot is still taken.
    pub fn declare(&mut self, name: &str, ty: Type) -> bool {
        self.order.push(name.to_string());
        if self.variables.contains_key(name) {
            false
        } else {
            self.variables.insert(name.to_string(), ty);
            true
        }
    }
    pub fn finalize(self) -> Frame {
        let offsets = OffsetTable::from_order(&self.order);
        Frame {
            variables: self.variables,
            order: self.order,
            offsets,
        }
    }
}

/// A function's variables once all of its declarations have been visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    variables: BTreeMap<String, Type>,
    order: Vec<String>,
    offsets: OffsetTable,
}

impl Frame {
    pub fn type_of(&self, name: &str) -> Option<Type> {
        self.variables.get(name).copied()
    }
    pub fn offset_of(&self, name: &str) -> Option<i32> {
        self.offsets.get(name)
    }
    /// Words pushed for this frame, one per declaration (redeclarations included).
    pub fn slot_count(&self) -> usize {
        self.order.len()
    }
    pub fn declaration_order(&self) -> &[String] {
        &self.order
    }
    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }
}

/// Offsets from the frame pointer, `-4 * slot`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetTable {
    offsets: BTreeMap<String, i32>,
}

impl OffsetTable {
    /// A redeclared name ends up with the offset of its last slot.
    fn from_order(order: &[String]) -> Self {
        let mut offsets = BTreeMap::new();
        for (slot, name) in order.iter().enumerate() {
            offsets.insert(name.clone(), -WORD_SIZE * slot as i32);
        }
        Self { offsets }
    }
    pub fn get(&self, name: &str) -> Option<i32> {
        self.offsets.get(name).copied()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    procedures: ProcedureTable,
    frames: BTreeMap<String, Frame>,
}

impl SymbolTable {
    pub fn procedures(&self) -> &ProcedureTable {
        &self.procedures
    }
    pub fn procedures_mut(&mut self) -> &mut ProcedureTable {
        &mut self.procedures
    }
    pub fn frame(&self, function: &str) -> Option<&Frame> {
        self.frames.get(function)
    }
    pub fn insert_frame(&mut self, function: &str, frame: Frame) {
        self.frames.insert(function.to_string(), frame);
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, signature) in self.procedures.iter() {
            writeln!(f, "{name}({})", signature.iter().join(", "))?;
            let frame = match self.frames.get(name) {
                Some(frame) => frame,
                None => continue,
            };
            for variable in frame.order.iter().unique() {
                let ty = frame.variables[variable];
                let offset = frame.offsets.offsets[variable];
                writeln!(f, "  {variable}: {ty} @ {offset}")?;
            }
        }
        Ok(())
    }
}
