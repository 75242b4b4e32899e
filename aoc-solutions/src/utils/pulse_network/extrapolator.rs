//! Press-count extrapolation for networks built from binary counters.
//!
//! The supported layout: each broadcaster destination heads a chain of
//! flip-flops acting as a binary counter, least significant bit first. Bits set
//! to `1` feed the chain's hub conjunction; the hub feeds back into the head and
//! every `0` bit, resetting the counter when it reaches its period. Each hub
//! drives an inverter, and the inverters meet in the feeder conjunction, the
//! only upstream of the terminal. The terminal first sees `Low` on the press
//! where every counter wraps together: the LCM of the periods.

use std::mem;

use tracing::debug;

use super::error::NetworkError;
use super::graph::{ModuleGraph, ModuleId, ModuleKind};
use super::memory::Level;
use super::scheduler::Scheduler;

/// Longest chain whose period fits in a `u64`
const MAX_CHAIN_BITS: usize = 63;

/// One binary counter hanging off the broadcaster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterBranch {
    /// First flip-flop, the least significant bit
    pub head: ModuleId,
    /// Flip-flops from least to most significant bit
    pub chain: Vec<ModuleId>,
    /// Bit value per chain position; `true` when the flip-flop feeds the hub
    pub bits: Vec<bool>,
    pub hub: ModuleId,
    /// Single-input conjunction between hub and feeder
    pub inverter: ModuleId,
    /// Presses between two wraps of this counter
    pub period: u64,
}

/// The verified counter layout in front of a terminal module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterTopology {
    /// Conjunction whose low pulse reaches the terminal
    pub feeder: ModuleId,
    pub branches: Vec<CounterBranch>,
}

impl CounterTopology {
    /// LCM of all branch periods
    pub fn presses(&self) -> Result<u64, NetworkError> {
        self.branches.iter().try_fold(1u64, |acc, branch| {
            lcm(acc, branch.period)
                .ok_or_else(|| NetworkError::unsupported("combined period overflows u64"))
        })
    }
}

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple, `None` on overflow
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

fn sorted(mut ids: Vec<ModuleId>) -> Vec<ModuleId> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Verify that `terminal` sits behind a set of binary counters and decode them.
pub fn analyze(graph: &ModuleGraph, terminal: &str) -> Result<CounterTopology, NetworkError> {
    let terminal_id = graph
        .id(terminal)
        .ok_or_else(|| NetworkError::UnknownModule(terminal.to_string()))?;

    let feeder = match graph.inputs(terminal_id) {
        [feeder] => *feeder,
        inputs => {
            return Err(NetworkError::unsupported(format!(
                "`{terminal}` has {} upstream modules, expected exactly one",
                inputs.len()
            )));
        }
    };
    if graph.kind(feeder) != ModuleKind::Conjunction {
        return Err(NetworkError::unsupported(format!(
            "`{}` feeding `{terminal}` is not a conjunction",
            graph.name(feeder)
        )));
    }
    if graph
        .destinations(feeder)
        .iter()
        .any(|edge| graph.kind(edge.target) != ModuleKind::Sink)
    {
        return Err(NetworkError::unsupported(format!(
            "`{}` feeds back into the network",
            graph.name(feeder)
        )));
    }

    let entry = graph
        .entry()
        .ok_or_else(|| NetworkError::unsupported("network has no broadcaster"))?;
    let heads = graph.destinations(entry);
    let feeder_inputs = graph.inputs(feeder);
    if heads.len() != feeder_inputs.len() {
        return Err(NetworkError::unsupported(format!(
            "broadcaster starts {} chains but `{}` has {} inputs",
            heads.len(),
            graph.name(feeder),
            feeder_inputs.len()
        )));
    }

    let mut claimed = vec![false; feeder_inputs.len()];
    let branches = heads
        .iter()
        .map(|edge| {
            let branch = decode_branch(graph, entry, edge.target, feeder)?;
            let slot = feeder_inputs
                .iter()
                .position(|&id| id == branch.inverter)
                .ok_or_else(|| {
                    NetworkError::unsupported(format!(
                        "`{}` does not feed `{}`",
                        graph.name(branch.inverter),
                        graph.name(feeder)
                    ))
                })?;
            if mem::replace(&mut claimed[slot], true) {
                return Err(NetworkError::unsupported(format!(
                    "two chains share `{}`",
                    graph.name(branch.inverter)
                )));
            }
            debug!(
                head = graph.name(branch.head),
                hub = graph.name(branch.hub),
                bits = branch.chain.len(),
                period = branch.period,
                "decoded counter branch"
            );
            Ok(branch)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CounterTopology { feeder, branches })
}

/// Walk the flip-flop chain starting at `head` and check its hub wiring.
fn decode_branch(
    graph: &ModuleGraph,
    entry: ModuleId,
    head: ModuleId,
    feeder: ModuleId,
) -> Result<CounterBranch, NetworkError> {
    let name = |id: ModuleId| graph.name(id).to_string();

    if graph.kind(head) != ModuleKind::FlipFlop {
        return Err(NetworkError::unsupported(format!(
            "broadcaster destination `{}` is not a flip-flop",
            name(head)
        )));
    }

    let mut chain: Vec<ModuleId> = Vec::new();
    let mut bits: Vec<bool> = Vec::new();
    let mut hub: Option<ModuleId> = None;
    let mut current = Some(head);

    while let Some(flip_flop) = current {
        if chain.contains(&flip_flop) {
            return Err(NetworkError::unsupported(format!(
                "flip-flop chain from `{}` loops back to `{}`",
                name(head),
                name(flip_flop)
            )));
        }
        if chain.len() == MAX_CHAIN_BITS {
            return Err(NetworkError::unsupported(format!(
                "flip-flop chain from `{}` is longer than {MAX_CHAIN_BITS} bits",
                name(head)
            )));
        }

        let mut next: Option<ModuleId> = None;
        let mut feeds_hub = false;
        for edge in graph.destinations(flip_flop) {
            match graph.kind(edge.target) {
                ModuleKind::FlipFlop => {
                    if next.replace(edge.target).is_some_and(|prev| prev != edge.target) {
                        return Err(NetworkError::unsupported(format!(
                            "`{}` drives more than one flip-flop",
                            name(flip_flop)
                        )));
                    }
                }
                ModuleKind::Conjunction => {
                    if hub.replace(edge.target).is_some_and(|prev| prev != edge.target) {
                        return Err(NetworkError::unsupported(format!(
                            "chain from `{}` feeds more than one conjunction",
                            name(head)
                        )));
                    }
                    feeds_hub = true;
                }
                ModuleKind::Broadcast | ModuleKind::Sink => {
                    return Err(NetworkError::unsupported(format!(
                        "`{}` feeds `{}` outside the counter",
                        name(flip_flop),
                        name(edge.target)
                    )));
                }
            }
        }

        chain.push(flip_flop);
        bits.push(feeds_hub);
        current = next;
    }

    let hub = hub.ok_or_else(|| {
        NetworkError::unsupported(format!("chain from `{}` never reaches a conjunction", name(head)))
    })?;

    // Bit 0 must be set: the head is what the hub resets on wrap.
    let period = bits
        .iter()
        .rev()
        .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit));
    if period & 1 == 0 {
        return Err(NetworkError::unsupported(format!(
            "head `{}` does not feed hub `{}`",
            name(head),
            name(hub)
        )));
    }

    for (position, &flip_flop) in chain.iter().enumerate() {
        let upstream = if position == 0 { entry } else { chain[position - 1] };
        if let Some(&stray) = graph
            .inputs(flip_flop)
            .iter()
            .find(|&&id| id != upstream && id != hub)
        {
            return Err(NetworkError::unsupported(format!(
                "`{}` receives pulses from `{}` outside its counter",
                name(flip_flop),
                name(stray)
            )));
        }
    }

    let ones = sorted(
        chain
            .iter()
            .zip(&bits)
            .filter(|&(_, &bit)| bit)
            .map(|(&id, _)| id)
            .collect(),
    );
    if sorted(graph.inputs(hub).to_vec()) != ones {
        return Err(NetworkError::unsupported(format!(
            "inputs of hub `{}` are not exactly the set bits of its chain",
            name(hub)
        )));
    }

    let resets = sorted(
        chain
            .iter()
            .zip(&bits)
            .filter(|&(&id, &bit)| id == head || !bit)
            .map(|(&id, _)| id)
            .collect(),
    );
    let (flip_flops, others): (Vec<ModuleId>, Vec<ModuleId>) = graph
        .destinations(hub)
        .iter()
        .map(|edge| edge.target)
        .partition(|&id| graph.kind(id) == ModuleKind::FlipFlop);
    if sorted(flip_flops) != resets {
        return Err(NetworkError::unsupported(format!(
            "hub `{}` does not reset exactly the head and clear bits",
            name(hub)
        )));
    }

    let inverter = match sorted(others).as_slice() {
        [inverter] => *inverter,
        _ => {
            return Err(NetworkError::unsupported(format!(
                "hub `{}` must drive exactly one inverter",
                name(hub)
            )));
        }
    };
    let is_inverter = graph.kind(inverter) == ModuleKind::Conjunction
        && graph.inputs(inverter) == [hub]
        && graph
            .destinations(inverter)
            .iter()
            .all(|edge| edge.target == feeder);
    if !is_inverter || inverter == feeder {
        return Err(NetworkError::unsupported(format!(
            "hub `{}` does not reach `{}` through an inverter",
            name(hub),
            name(feeder)
        )));
    }

    Ok(CounterBranch {
        head,
        chain,
        bits,
        hub,
        inverter,
        period,
    })
}

/// Presses until `terminal` first receives a `Low` pulse, without simulating them
pub fn presses_until_low(graph: &ModuleGraph, terminal: &str) -> Result<u64, NetworkError> {
    let topology = analyze(graph, terminal)?;
    let presses = topology.presses()?;
    debug!(
        terminal,
        branches = topology.branches.len(),
        presses,
        "extrapolated presses from counter periods"
    );
    Ok(presses)
}

/// Press until `terminal` receives a `Low` pulse, giving up after `max_presses`
pub fn simulate_until_low(
    graph: &ModuleGraph,
    terminal: &str,
    max_presses: u64,
) -> Result<u64, NetworkError> {
    let target = graph
        .id(terminal)
        .ok_or_else(|| NetworkError::UnknownModule(terminal.to_string()))?;

    let mut scheduler = Scheduler::new(graph);
    for press in 1..=max_presses {
        let mut reached = false;
        scheduler.press_observed(Level::Low, |pulse| {
            reached |= pulse.target == target && pulse.level == Level::Low;
        })?;
        if reached {
            return Ok(press);
        }
    }

    Err(NetworkError::PressLimitReached {
        terminal: terminal.to_string(),
        limit: max_presses,
    })
}
