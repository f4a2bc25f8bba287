// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Coupled (composite) models and their flattening.
//!
//! A [`Coupled`] model groups named components (atomic models or other
//! coupled models) and wires their ports together:
//!
//! - external input couplings: own input port -> child input port
//! - internal couplings: child output port -> child input port
//! - external output couplings: child output port -> own output port
//!
//! Before simulation the hierarchy is flattened into leaf models addressed
//! by dotted paths (`transport.router`) and direct leaf-to-leaf routes.
//! Leaves are sorted by path, which is the tie-break order of the kernel.

use super::model::{Model, PortName};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

const PATH_SEPARATOR: char = '.';

/// A child of a coupled model.
pub enum Component {
    Atomic(Box<dyn Model>),
    Coupled(Coupled),
}

impl Component {
    fn has_input(&self, port: &str) -> bool {
        match self {
            Component::Atomic(model) => model.input_ports().iter().any(|p| *p == port),
            Component::Coupled(coupled) => coupled.input_ports.iter().any(|p| p == port),
        }
    }

    fn has_output(&self, port: &str) -> bool {
        match self {
            Component::Atomic(model) => model.output_ports().iter().any(|p| *p == port),
            Component::Coupled(coupled) => coupled.output_ports.iter().any(|p| p == port),
        }
    }
}

/// One end of a coupling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortRef {
    /// A port of the coupled model itself.
    Parent(String),
    /// A port of a named child.
    Child { component: String, port: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupling {
    pub from: PortRef,
    pub to: PortRef,
}

/// Composite model.
pub struct Coupled {
    name: String,
    input_ports: Vec<String>,
    output_ports: Vec<String>,
    components: BTreeMap<String, Component>,
    couplings: Vec<Coupling>,
}

impl Coupled {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            components: BTreeMap::new(),
            couplings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_ports(&self) -> &[String] {
        &self.input_ports
    }

    pub fn output_ports(&self) -> &[String] {
        &self.output_ports
    }

    pub fn couplings(&self) -> &[Coupling] {
        &self.couplings
    }

    pub fn add_input_port(&mut self, port: &str) {
        if !self.input_ports.iter().any(|p| p == port) {
            self.input_ports.push(port.to_string());
        }
    }

    pub fn add_output_port(&mut self, port: &str) {
        if !self.output_ports.iter().any(|p| p == port) {
            self.output_ports.push(port.to_string());
        }
    }

    /// Add an atomic child.
    pub fn add_model(&mut self, name: &str, model: impl Model) -> Result<()> {
        self.add_component(name, Component::Atomic(Box::new(model)))
    }

    pub fn add_boxed(&mut self, name: &str, model: Box<dyn Model>) -> Result<()> {
        self.add_component(name, Component::Atomic(model))
    }

    /// Add a coupled child under its own name.
    pub fn add_coupled(&mut self, child: Coupled) -> Result<()> {
        let name = child.name.clone();
        self.add_component(&name, Component::Coupled(child))
    }

    fn add_component(&mut self, name: &str, component: Component) -> Result<()> {
        if name.is_empty() || name.contains(PATH_SEPARATOR) {
            return Err(Error::InvalidConfig(format!(
                "component name '{}' must be non-empty and contain no '{}'",
                name, PATH_SEPARATOR
            )));
        }
        if self.components.contains_key(name) {
            return Err(Error::DuplicateComponent(format!("{}.{}", self.name, name)));
        }
        self.components.insert(name.to_string(), component);
        Ok(())
    }

    /// External input coupling: own `port` -> `child.child_port`.
    pub fn connect_input(&mut self, port: &str, child: &str, child_port: &str) -> Result<()> {
        self.check_own_input(port)?;
        self.check_child_input(child, child_port)?;
        self.couplings.push(Coupling {
            from: PortRef::Parent(port.to_string()),
            to: child_ref(child, child_port),
        });
        Ok(())
    }

    /// Internal coupling: `from.from_port` -> `to.to_port`.
    pub fn connect(&mut self, from: &str, from_port: &str, to: &str, to_port: &str) -> Result<()> {
        self.check_child_output(from, from_port)?;
        self.check_child_input(to, to_port)?;
        self.couplings.push(Coupling {
            from: child_ref(from, from_port),
            to: child_ref(to, to_port),
        });
        Ok(())
    }

    /// External output coupling: `child.child_port` -> own `port`.
    pub fn connect_output(&mut self, child: &str, child_port: &str, port: &str) -> Result<()> {
        self.check_child_output(child, child_port)?;
        self.check_own_output(port)?;
        self.couplings.push(Coupling {
            from: child_ref(child, child_port),
            to: PortRef::Parent(port.to_string()),
        });
        Ok(())
    }

    fn component(&self, name: &str) -> Result<&Component> {
        self.components
            .get(name)
            .ok_or_else(|| Error::UnknownComponent(format!("{}.{}", self.name, name)))
    }

    fn check_child_input(&self, child: &str, port: &str) -> Result<()> {
        if self.component(child)?.has_input(port) {
            Ok(())
        } else {
            Err(unknown_port(child, port))
        }
    }

    fn check_child_output(&self, child: &str, port: &str) -> Result<()> {
        if self.component(child)?.has_output(port) {
            Ok(())
        } else {
            Err(unknown_port(child, port))
        }
    }

    fn check_own_input(&self, port: &str) -> Result<()> {
        if self.input_ports.iter().any(|p| p == port) {
            Ok(())
        } else {
            Err(unknown_port(&self.name, port))
        }
    }

    fn check_own_output(&self, port: &str) -> Result<()> {
        if self.output_ports.iter().any(|p| p == port) {
            Ok(())
        } else {
            Err(unknown_port(&self.name, port))
        }
    }
}

fn child_ref(component: &str, port: &str) -> PortRef {
    PortRef::Child {
        component: component.to_string(),
        port: port.to_string(),
    }
}

fn unknown_port(component: &str, port: &str) -> Error {
    Error::UnknownPort {
        component: component.to_string(),
        port: port.to_string(),
    }
}

// ============================================================================
// Flattening
// ============================================================================

/// A leaf model with its hierarchical path.
pub(crate) struct Leaf {
    pub path: String,
    pub model: Box<dyn Model>,
}

/// Where an event ends up after following couplings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Destination {
    Leaf { index: usize, port: PortName },
    /// Output port of the root model.
    External(String),
}

pub(crate) struct Flattened {
    pub leaves: Vec<Leaf>,
    /// (source leaf, output port) -> destinations.
    pub routes: BTreeMap<(usize, PortName), Vec<Destination>>,
    /// Root input port -> destinations.
    pub root_inputs: BTreeMap<String, Vec<Destination>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Dir {
    In,
    Out,
}

type Node = (String, Dir, String);

fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, child)
    }
}

fn collect(
    coupled: Coupled,
    path: &str,
    leaves: &mut Vec<Leaf>,
    edges: &mut BTreeMap<Node, Vec<Node>>,
) {
    for coupling in &coupled.couplings {
        let from = match &coupling.from {
            PortRef::Parent(p) => (path.to_string(), Dir::In, p.clone()),
            PortRef::Child { component, port } => (join(path, component), Dir::Out, port.clone()),
        };
        let to = match &coupling.to {
            PortRef::Parent(p) => (path.to_string(), Dir::Out, p.clone()),
            PortRef::Child { component, port } => (join(path, component), Dir::In, port.clone()),
        };
        edges.entry(from).or_default().push(to);
    }

    for (name, component) in coupled.components {
        let child_path = join(path, &name);
        match component {
            Component::Atomic(model) => leaves.push(Leaf {
                path: child_path,
                model,
            }),
            Component::Coupled(inner) => collect(inner, &child_path, leaves, edges),
        }
    }
}

/// Follow couplings from `start` until reaching leaf inputs or root outputs.
fn resolve(
    start: Node,
    edges: &BTreeMap<Node, Vec<Node>>,
    leaf_index: &BTreeMap<String, usize>,
    leaves: &[Leaf],
) -> Vec<Destination> {
    let mut found = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        let Some(next) = edges.get(&node) else {
            continue;
        };
        for target in next {
            if !visited.insert(target.clone()) {
                continue;
            }
            let (path, dir, port) = target;
            match (dir, leaf_index.get(path)) {
                (Dir::In, Some(&index)) => {
                    let declared = leaves[index]
                        .model
                        .input_ports()
                        .iter()
                        .find(|p| **p == port.as_str());
                    if let Some(&port) = declared {
                        found.insert(Destination::Leaf { index, port });
                    }
                }
                (Dir::Out, _) if path.is_empty() => {
                    found.insert(Destination::External(port.clone()));
                }
                _ => stack.push(target.clone()),
            }
        }
    }

    found.into_iter().collect()
}

/// Reject loops made only of instantaneous leaves.
fn check_zero_delay_cycles(flat: &Flattened) -> Result<()> {
    let n = flat.leaves.len();
    let instantaneous: Vec<bool> = flat
        .leaves
        .iter()
        .map(|leaf| leaf.model.is_instantaneous())
        .collect();

    let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    for ((source, _), dests) in &flat.routes {
        if !instantaneous[*source] {
            continue;
        }
        for dest in dests {
            if let Destination::Leaf { index, .. } = dest {
                if instantaneous[*index] {
                    adjacency[*source].insert(*index);
                }
            }
        }
    }

    // 0 = unvisited, 1 = on stack, 2 = done
    let mut color = vec![0u8; n];
    let mut path: Vec<usize> = Vec::new();

    fn visit(
        node: usize,
        adjacency: &[BTreeSet<usize>],
        color: &mut [u8],
        path: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        color[node] = 1;
        path.push(node);
        for &next in &adjacency[node] {
            if color[next] == 1 {
                let start = path.iter().position(|&p| p == next).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            if color[next] == 0 {
                if let Some(cycle) = visit(next, adjacency, color, path) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        color[node] = 2;
        None
    }

    for node in 0..n {
        if color[node] == 0 {
            if let Some(cycle) = visit(node, &adjacency, &mut color, &mut path) {
                let names = cycle
                    .into_iter()
                    .map(|i| flat.leaves[i].path.clone())
                    .collect();
                return Err(Error::ZeroDelayCycle(names));
            }
        }
    }
    Ok(())
}

/// Flatten `root` into sorted leaves and leaf-to-leaf routes.
pub(crate) fn flatten(root: Coupled) -> Result<Flattened> {
    let root_inputs_declared = root.input_ports.clone();

    let mut leaves = Vec::new();
    let mut edges = BTreeMap::new();
    collect(root, "", &mut leaves, &mut edges);
    leaves.sort_by(|a, b| a.path.cmp(&b.path));

    let leaf_index: BTreeMap<String, usize> = leaves
        .iter()
        .enumerate()
        .map(|(i, leaf)| (leaf.path.clone(), i))
        .collect();

    let mut routes = BTreeMap::new();
    for (index, leaf) in leaves.iter().enumerate() {
        for &port in leaf.model.output_ports() {
            let start = (leaf.path.clone(), Dir::Out, port.to_string());
            let dests = resolve(start, &edges, &leaf_index, &leaves);
            if !dests.is_empty() {
                routes.insert((index, port), dests);
            }
        }
    }

    let mut root_inputs = BTreeMap::new();
    for port in root_inputs_declared {
        let start = (String::new(), Dir::In, port.clone());
        let dests = resolve(start, &edges, &leaf_index, &leaves);
        root_inputs.insert(port, dests);
    }

    let flat = Flattened {
        leaves,
        routes,
        root_inputs,
    };
    check_zero_delay_cycles(&flat)?;
    Ok(flat)
}
