// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Register catalog: the single validated description of every register the
//! adapter reads.
//!
//! A [`RegisterSpec`] maps one snapshot key to a register word and a decode
//! rule; a [`BatchSpec`] is a contiguous same-bank range read in one request.
//! [`RegisterCatalog::new`] computes the batches and proves the table
//! consistent at construction, so the poll engine never has to re-check
//! addresses at runtime.
//!
//! Aliasing (several keys reading the same word) is permitted and used by
//! the device map (a register can feed both a numeric sensor and a switch
//! state). The only rejected aliases are numeric specs that disagree on
//! scale, since one raw word cannot decode to two different magnitudes.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::CatalogError;

/// Upper bound on registers per range read. Kept small so one failed request
/// degrades at most this many keys.
pub const MAX_BATCH_LEN: u16 = 8;

// =============================================================================
// Bank
// =============================================================================

/// Modbus register bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bank {
    /// Holding registers (FC 03, read/write).
    Holding,
    /// Input registers (FC 04, read-only).
    Input,
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Holding => write!(f, "holding"),
            Self::Input => write!(f, "input"),
        }
    }
}

// =============================================================================
// Decode & Value
// =============================================================================

/// Decode rule turning a raw 16-bit word into a typed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decode {
    /// `raw * scale`. A scale of 1.0 is integer passthrough.
    Numeric {
        /// Multiplier applied to the raw word.
        scale: f64,
    },
    /// `raw > 0`.
    Bool,
    /// Raw value looked up in a label table; unmapped values pass through
    /// as the raw integer (firmware may report undocumented codes).
    Enum(&'static [(u16, &'static str)]),
}

impl Decode {
    /// Integer passthrough shorthand.
    pub const RAW: Decode = Decode::Numeric { scale: 1.0 };

    /// Tenths encoding shorthand (e.g. temperature in 0.1 degree steps).
    pub const TENTHS: Decode = Decode::Numeric { scale: 0.1 };

    /// Returns `true` for the boolean decode rule.
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }
}

/// A decoded register value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Scaled numeric reading.
    Number(f64),
    /// Boolean flag.
    Bool(bool),
    /// Enumerated state label.
    Label(&'static str),
}

impl Value {
    /// Returns the numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the label payload, if any.
    pub fn as_label(&self) -> Option<&'static str> {
        match self {
            Self::Label(l) => Some(l),
            _ => None,
        }
    }

    /// Truthiness used by binary-style consumers: a number is truthy when
    /// non-zero, a label is always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0,
            Self::Bool(b) => *b,
            Self::Label(_) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Label(l) => write!(f, "{}", l),
        }
    }
}

// =============================================================================
// RegisterSpec
// =============================================================================

/// One row of the catalog: a snapshot key, the register word feeding it, and
/// the decode rule applied to the raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegisterSpec {
    /// Snapshot field name. Unique across the catalog.
    pub key: &'static str,
    /// Register address.
    pub address: u16,
    /// Register bank.
    pub bank: Bank,
    /// Decode rule.
    pub decode: Decode,
}

impl RegisterSpec {
    /// Numeric register with a scale multiplier.
    pub const fn numeric(key: &'static str, address: u16, bank: Bank, scale: f64) -> Self {
        Self {
            key,
            address,
            bank,
            decode: Decode::Numeric { scale },
        }
    }

    /// Integer passthrough register.
    pub const fn raw(key: &'static str, address: u16, bank: Bank) -> Self {
        Self {
            key,
            address,
            bank,
            decode: Decode::RAW,
        }
    }

    /// Boolean register (`raw > 0`).
    pub const fn flag(key: &'static str, address: u16, bank: Bank) -> Self {
        Self {
            key,
            address,
            bank,
            decode: Decode::Bool,
        }
    }

    /// Enumerated register with a label table.
    pub const fn labelled(
        key: &'static str,
        address: u16,
        bank: Bank,
        map: &'static [(u16, &'static str)],
    ) -> Self {
        Self {
            key,
            address,
            bank,
            decode: Decode::Enum(map),
        }
    }

    /// Decodes a raw register word according to this spec's rule.
    pub fn decode(&self, raw: u16) -> Value {
        match self.decode {
            Decode::Numeric { scale } => Value::Number(f64::from(raw) * scale),
            Decode::Bool => Value::Bool(raw > 0),
            Decode::Enum(map) => map
                .iter()
                .find(|(code, _)| *code == raw)
                .map(|(_, label)| Value::Label(label))
                .unwrap_or(Value::Number(f64::from(raw))),
        }
    }

    /// The absence marker recorded when this spec's batch fails: `false` for
    /// boolean specs, undefined (`None`) for everything else.
    pub fn absent(&self) -> Option<Value> {
        if self.decode.is_bool() {
            Some(Value::Bool(false))
        } else {
            None
        }
    }
}

// =============================================================================
// BatchSpec
// =============================================================================

/// A contiguous range of same-bank registers read in one request.
///
/// `slots[i]` holds the indices (into the catalog's spec table) of every
/// spec whose address equals `start + i`; an empty slot is a reserved or
/// uninteresting register inside the range.
#[derive(Debug, Clone)]
pub struct BatchSpec {
    /// Register bank of the whole range.
    pub bank: Bank,
    /// First register address.
    pub start: u16,
    /// Number of registers in the range (1..=MAX_BATCH_LEN).
    pub count: u16,
    /// Per-offset spec indices.
    pub slots: Vec<Vec<usize>>,
}

impl BatchSpec {
    /// Returns `true` if the batch covers `address`.
    pub fn covers(&self, address: u16) -> bool {
        address >= self.start && u32::from(address) < u32::from(self.start) + u32::from(self.count)
    }
}

// =============================================================================
// RegisterCatalog
// =============================================================================

/// The validated register table plus its computed batch plan.
#[derive(Debug, Clone)]
pub struct RegisterCatalog {
    specs: Vec<RegisterSpec>,
    batches: Vec<BatchSpec>,
}

impl RegisterCatalog {
    /// Builds a catalog, grouping specs into batches and validating the
    /// whole table.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Empty`] for an empty spec list
    /// - [`CatalogError::DuplicateKey`] if two specs share a key
    /// - [`CatalogError::AmbiguousAlias`] if numeric aliases disagree on scale
    /// - [`CatalogError::BatchTooLarge`] / [`CatalogError::SlotMismatch`] if
    ///   the computed batch plan is inconsistent (internal invariants)
    pub fn new(specs: Vec<RegisterSpec>) -> Result<Self, CatalogError> {
        if specs.is_empty() {
            return Err(CatalogError::Empty);
        }

        Self::check_keys(&specs)?;
        Self::check_aliases(&specs)?;

        let batches = Self::plan_batches(&specs);
        let catalog = Self { specs, batches };
        catalog.check_batches()?;
        Ok(catalog)
    }

    fn check_keys(specs: &[RegisterSpec]) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for spec in specs {
            if !seen.insert(spec.key) {
                return Err(CatalogError::DuplicateKey { key: spec.key });
            }
        }
        Ok(())
    }

    fn check_aliases(specs: &[RegisterSpec]) -> Result<(), CatalogError> {
        let mut numeric_scales: BTreeMap<(Bank, u16), f64> = BTreeMap::new();
        for spec in specs {
            if let Decode::Numeric { scale } = spec.decode {
                match numeric_scales.entry((spec.bank, spec.address)) {
                    std::collections::btree_map::Entry::Vacant(e) => {
                        e.insert(scale);
                    }
                    std::collections::btree_map::Entry::Occupied(e) => {
                        if e.get().to_bits() != scale.to_bits() {
                            return Err(CatalogError::AmbiguousAlias {
                                bank: spec.bank,
                                address: spec.address,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Greedy grouping: walk each bank's sorted addresses and open a new
    /// batch whenever the next address no longer fits inside the current
    /// MAX_BATCH_LEN window.
    fn plan_batches(specs: &[RegisterSpec]) -> Vec<BatchSpec> {
        let mut by_address: BTreeMap<(Bank, u16), Vec<usize>> = BTreeMap::new();
        for (idx, spec) in specs.iter().enumerate() {
            by_address.entry((spec.bank, spec.address)).or_default().push(idx);
        }

        let mut batches: Vec<BatchSpec> = Vec::new();
        let mut current: Option<BatchSpec> = None;

        for (&(bank, address), indices) in &by_address {
            let fits = current.as_ref().is_some_and(|b| {
                b.bank == bank
                    && u32::from(address) < u32::from(b.start) + u32::from(MAX_BATCH_LEN)
            });

            if !fits {
                if let Some(done) = current.take() {
                    batches.push(done);
                }
                current = Some(BatchSpec {
                    bank,
                    start: address,
                    count: 0,
                    slots: Vec::new(),
                });
            }

            let batch = current.as_mut().expect("batch opened above");
            let offset = (address - batch.start) as usize;
            while batch.slots.len() <= offset {
                batch.slots.push(Vec::new());
            }
            batch.slots[offset] = indices.clone();
            batch.count = (offset + 1) as u16;
        }

        if let Some(done) = current.take() {
            batches.push(done);
        }

        batches
    }

    fn check_batches(&self) -> Result<(), CatalogError> {
        for batch in &self.batches {
            if batch.count > MAX_BATCH_LEN {
                return Err(CatalogError::BatchTooLarge {
                    bank: batch.bank,
                    start: batch.start,
                    count: batch.count,
                    max: MAX_BATCH_LEN,
                });
            }
            for (offset, slot) in batch.slots.iter().enumerate() {
                for &idx in slot {
                    let spec = &self.specs[idx];
                    if spec.bank != batch.bank
                        || u32::from(spec.address) != u32::from(batch.start) + offset as u32
                    {
                        return Err(CatalogError::SlotMismatch {
                            key: spec.key,
                            address: spec.address,
                            start: batch.start,
                            offset,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// All specs, in declaration order.
    pub fn specs(&self) -> &[RegisterSpec] {
        &self.specs
    }

    /// The computed batch plan, in read order.
    pub fn batches(&self) -> &[BatchSpec] {
        &self.batches
    }

    /// Looks up a spec by snapshot key.
    pub fn spec(&self, key: &str) -> Option<&RegisterSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Number of specs in the catalog.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if the catalog holds no specs.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterates the specs referenced by one batch.
    pub fn batch_specs<'a>(
        &'a self,
        batch: &'a BatchSpec,
    ) -> impl Iterator<Item = &'a RegisterSpec> + 'a {
        batch.slots.iter().flatten().map(move |&idx| &self.specs[idx])
    }
}

// =============================================================================
// Tests
// =============================================================================
