//! Breadth-first flattening of IP-XACT register trees into `node` maps.

use std::collections::VecDeque;

use ipxact_xml::Element;
use tracing::{debug, trace};

use crate::attrs::{AttributeExtractor, AttributeMapping, KEY_ID};
use crate::node::OutputNode;
use crate::RegMapError;

/// Number of trailing characters removed from the id of a split register.
pub const SPLIT_SUFFIX_LEN: usize = 4;

/// Counters collected while flattening one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    /// Register elements visited.
    pub registers: usize,
    /// Registers handled as one half of an MSB/LSB pair.
    pub split_registers: usize,
    /// Output nodes emitted below the root.
    pub nodes: usize,
}

/// Sticky MSB/LSB markers carried from one register to the next.
///
/// A register whose name carries neither marker leaves both flags as they
/// were, so an unfinished pair also captures the registers that follow it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitState {
    pub msb: bool,
    pub lsb: bool,
}

impl SplitState {
    fn observe(&mut self, name: &str) {
        if name.contains("MSB") {
            self.msb = true;
        } else if name.contains("LSB") {
            self.lsb = true;
        }
    }

    /// Either half of a pair has been seen.
    pub fn is_split(&self) -> bool {
        self.msb || self.lsb
    }

    /// Both halves of a pair have been seen.
    pub fn is_complete(&self) -> bool {
        self.msb && self.lsb
    }

    /// Id forced onto the fields of the current half.
    fn half_label(&self) -> Option<&'static str> {
        if self.msb && !self.lsb {
            Some("MSB")
        } else if self.lsb {
            Some("LSB")
        } else {
            None
        }
    }

    fn reset_if_complete(&mut self) {
        if self.is_complete() {
            *self = SplitState::default();
        }
    }
}

enum SourceNode<'a> {
    Register(&'a Element),
    Container(&'a Element),
}

impl<'a> SourceNode<'a> {
    fn classify(element: &'a Element, namespace: &str) -> Self {
        if element.is(namespace, "register") {
            SourceNode::Register(element)
        } else {
            SourceNode::Container(element)
        }
    }
}

/// Walks a source document and builds the flattened output tree.
#[derive(Debug)]
pub struct TreeFlattener<'ns> {
    extractor: AttributeExtractor<'ns>,
    state: SplitState,
    root: OutputNode,
    last_parent: Option<usize>,
    stats: FlattenStats,
}

impl<'ns> TreeFlattener<'ns> {
    /// Create a flattener matching register elements in `namespace`.
    pub fn new(namespace: &'ns str) -> Self {
        TreeFlattener {
            extractor: AttributeExtractor::new(namespace),
            state: SplitState::default(),
            root: OutputNode::default(),
            last_parent: None,
            stats: FlattenStats::default(),
        }
    }

    pub fn state(&self) -> SplitState {
        self.state
    }

    pub fn stats(&self) -> FlattenStats {
        self.stats
    }

    /// Flatten every register reachable from `document` into this
    /// flattener's output root.
    pub fn flatten(&mut self, document: &Element) -> Result<(), RegMapError> {
        let namespace = self.extractor.namespace();
        let mut queue = VecDeque::from([document]);
        while let Some(current) = queue.pop_front() {
            match SourceNode::classify(current, namespace) {
                SourceNode::Register(register) => self.visit_register(register)?,
                SourceNode::Container(container) => {
                    trace!(
                        tag = container.name(),
                        children = container.children().len(),
                        "expand"
                    );
                    queue.extend(container.children());
                }
            }
        }
        debug!(
            registers = self.stats.registers,
            split = self.stats.split_registers,
            nodes = self.stats.nodes,
            "flatten complete"
        );
        Ok(())
    }

    /// Consume the flattener and return the output root with its counters.
    pub fn finish(self) -> (OutputNode, FlattenStats) {
        (self.root, self.stats)
    }

    fn visit_register(&mut self, register: &Element) -> Result<(), RegMapError> {
        let index = self.stats.registers;
        self.stats.registers += 1;

        let name = register
            .find(self.extractor.namespace(), "name")
            .and_then(Element::text)
            .ok_or(RegMapError::MalformedRegister { index })?;
        self.state.observe(name);

        let fields: Vec<&Element> = register
            .find_all(self.extractor.namespace(), "field")
            .collect();
        trace!(name, fields = fields.len(), state = ?self.state, "register");

        match fields.as_slice() {
            [field] if !self.state.is_split() => self.emit_single(register, field)?,
            _ => self.emit_grouped(register, &fields)?,
        }

        self.state.reset_if_complete();
        Ok(())
    }

    fn emit_single(&mut self, register: &Element, field: &Element) -> Result<(), RegMapError> {
        let register_attrs = self.extractor.extract(register, None)?;
        let mut merged = self.extractor.extract(field, Some(&register_attrs))?;
        if let Some(id) = register_attrs.get(KEY_ID) {
            merged.insert(KEY_ID, id);
        }
        debug!(attrs = %merged, "emit register");
        self.root.push(OutputNode::new(merged));
        self.stats.nodes += 1;
        Ok(())
    }

    fn emit_grouped(&mut self, register: &Element, fields: &[&Element]) -> Result<(), RegMapError> {
        let split = self.state.is_split();
        let mut register_attrs = self.extractor.extract(register, None)?;
        if split {
            self.stats.split_registers += 1;
            if let Some(id) = register_attrs.get(KEY_ID) {
                let stripped = strip_split_suffix(id);
                register_attrs.insert(KEY_ID, stripped);
            }
        }

        let parent = match self.last_parent {
            Some(parent) if self.state.is_complete() => parent,
            _ => {
                debug!(attrs = %register_attrs, "emit parent");
                self.stats.nodes += 1;
                self.root.push(OutputNode::new(register_attrs.clone()))
            }
        };
        self.last_parent = Some(parent);

        let half = self.state.half_label();
        for field in fields {
            let seed: Option<&AttributeMapping> = split.then_some(&register_attrs);
            let mut attrs = self.extractor.extract(field, seed)?;
            if let Some(label) = half {
                attrs.insert(KEY_ID, label);
            }
            debug!(parent, attrs = %attrs, "emit field");
            self.root.child_mut(parent).push(OutputNode::new(attrs));
            self.stats.nodes += 1;
        }
        Ok(())
    }
}

/// Drop the trailing `_MSB`/`_LSB` style suffix by position.
fn strip_split_suffix(id: &str) -> String {
    let keep = id.chars().count().saturating_sub(SPLIT_SUFFIX_LEN);
    id.chars().take(keep).collect()
}

/// Flatten `document` with a fresh flattener.
pub fn flatten(
    document: &Element,
    namespace: &str,
) -> Result<(OutputNode, FlattenStats), RegMapError> {
    let mut flattener = TreeFlattener::new(namespace);
    flattener.flatten(document)?;
    Ok(flattener.finish())
}
