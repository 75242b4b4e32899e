//! Module graph: the immutable topology of a pulse network.
//!
//! Names are resolved to [`ModuleId`]s once while parsing. Every edge also carries
//! the slot of its source in the target's input list, so conjunction memory is a
//! plain `(module, slot)` lookup at simulation time.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::error::GraphParseError;

/// Name of the module the button is wired to
pub const BROADCASTER: &str = "broadcaster";

/// Index of a module inside its [`ModuleGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Position of the module in the graph arena
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Behaviour of a module when it receives a pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// Forwards every pulse unchanged
    Broadcast,
    /// `%` module: toggles on low, ignores high
    FlipFlop,
    /// `&` module: NAND over the last pulse from each input
    Conjunction,
    /// Destination that is never declared; counts pulses only
    Sink,
}

impl ModuleKind {
    fn prefix(self) -> &'static str {
        match self {
            ModuleKind::FlipFlop => "%",
            ModuleKind::Conjunction => "&",
            ModuleKind::Broadcast | ModuleKind::Sink => "",
        }
    }
}

/// Outgoing connection of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Receiving module
    pub target: ModuleId,
    /// Position of the sending module in `target`'s inputs
    pub slot: usize,
}

/// A named node of the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    kind: ModuleKind,
    destinations: Vec<Edge>,
    inputs: Vec<ModuleId>,
}

impl Module {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// Outgoing edges in declaration order
    pub fn destinations(&self) -> &[Edge] {
        &self.destinations
    }

    /// Distinct upstream modules, in the order their edges were declared
    pub fn inputs(&self) -> &[ModuleId] {
        &self.inputs
    }
}

/// Parsed network: arena of modules plus a name index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGraph {
    modules: Vec<Module>,
    index: HashMap<String, ModuleId>,
    declared: usize,
    entry: Option<ModuleId>,
}

impl ModuleGraph {
    /// Look up a module by name
    pub fn id(&self, name: &str) -> Option<ModuleId> {
        self.index.get(name).copied()
    }

    /// The module behind `id`, or `None` for an id this graph never issued
    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.index())
    }

    /// # Panics
    ///
    /// Panics if `id` was issued by a different, smaller graph. The
    /// accessors below (`name`, `kind`, `destinations`, `inputs`) share this
    /// contract; use [`ModuleGraph::get`] for ids of unknown origin.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    pub fn name(&self, id: ModuleId) -> &str {
        self.module(id).name()
    }

    pub fn kind(&self, id: ModuleId) -> ModuleKind {
        self.module(id).kind()
    }

    pub fn destinations(&self, id: ModuleId) -> &[Edge] {
        self.module(id).destinations()
    }

    pub fn inputs(&self, id: ModuleId) -> &[ModuleId] {
        self.module(id).inputs()
    }

    /// The `broadcaster` module, if the network declares or references one
    pub fn entry(&self) -> Option<ModuleId> {
        self.entry
    }

    /// Number of modules, sinks included
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Module)> + '_ {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, module)| (ModuleId::from_index(i), module))
    }

    pub fn count_of(&self, kind: ModuleKind) -> usize {
        self.modules.iter().filter(|m| m.kind == kind).count()
    }
}

/// One `name -> a, b` line before names are resolved
struct Declaration<'s> {
    line: usize,
    kind: ModuleKind,
    name: &'s str,
    destinations: Vec<&'s str>,
}

fn parse_declaration(line_no: usize, line: &str) -> Result<Option<Declaration<'_>>, GraphParseError> {
    let Some((head, tail)) = line.split_once("->") else {
        if !line.trim().is_empty() {
            debug!(line = line_no, content = line.trim(), "skipping line without `->`");
        }
        return Ok(None);
    };

    let head = head.trim();
    let (kind, name) = if let Some(name) = head.strip_prefix('%') {
        (ModuleKind::FlipFlop, name.trim())
    } else if let Some(name) = head.strip_prefix('&') {
        (ModuleKind::Conjunction, name.trim())
    } else {
        (ModuleKind::Broadcast, head)
    };

    if name.is_empty() {
        return Err(GraphParseError::EmptyName { line: line_no });
    }

    let destinations = tail
        .split(',')
        .map(str::trim)
        .filter(|dest| !dest.is_empty())
        .collect();

    Ok(Some(Declaration {
        line: line_no,
        kind,
        name,
        destinations,
    }))
}

impl FromStr for ModuleGraph {
    type Err = GraphParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let declarations = input
            .lines()
            .enumerate()
            .map(|(i, line)| parse_declaration(i + 1, line))
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>, _>>()?;

        // Declared modules take the first ids, in declaration order.
        let mut index: HashMap<String, ModuleId> = HashMap::new();
        let mut modules: Vec<Module> = Vec::new();
        for decl in &declarations {
            match index.entry(decl.name.to_string()) {
                Entry::Occupied(_) => {
                    return Err(GraphParseError::DuplicateModule {
                        line: decl.line,
                        name: decl.name.to_string(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(ModuleId::from_index(modules.len()));
                    modules.push(Module {
                        name: decl.name.to_string(),
                        kind: decl.kind,
                        destinations: Vec::with_capacity(decl.destinations.len()),
                        inputs: Vec::new(),
                    });
                }
            }
        }
        let declared = modules.len();

        for (source, decl) in declarations.iter().enumerate() {
            let source = ModuleId::from_index(source);
            for &dest in &decl.destinations {
                let target = *index.entry(dest.to_string()).or_insert_with(|| {
                    modules.push(Module {
                        name: dest.to_string(),
                        kind: ModuleKind::Sink,
                        destinations: Vec::new(),
                        inputs: Vec::new(),
                    });
                    ModuleId::from_index(modules.len() - 1)
                });

                let inputs = &mut modules[target.index()].inputs;
                let slot = match inputs.iter().position(|&id| id == source) {
                    Some(slot) => slot,
                    None => {
                        inputs.push(source);
                        inputs.len() - 1
                    }
                };
                modules[source.index()]
                    .destinations
                    .push(Edge { target, slot });
            }
        }

        let entry = index.get(BROADCASTER).copied();
        debug!(
            declared,
            sinks = modules.len() - declared,
            has_broadcaster = entry.is_some(),
            "parsed module graph"
        );

        Ok(ModuleGraph {
            modules,
            index,
            declared,
            entry,
        })
    }
}

impl fmt::Display for ModuleGraph {
    /// Writes the declared modules back in the input syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for module in &self.modules[..self.declared] {
            write!(f, "{}{} ->", module.kind.prefix(), module.name)?;
            for (i, edge) in module.destinations.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(f, "{}{}", sep, self.name(edge.target))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
