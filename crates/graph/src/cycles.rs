use crate::types::{NodeId, RefGraph};
use agentlint_protocol::{Diagnostic, LintReport, Provenance, Severity};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A closed walk through the reference graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// Members rotated so the smallest id comes first, with that id repeated at the end
    pub path: Vec<NodeId>,
    /// `kind:name -> ... -> kind:name`, identical for every rotation of the same cycle
    pub canonical: String,
}

impl Cycle {
    /// Build from the open walk `members` (no closing repeat).
    pub fn from_members(mut members: Vec<NodeId>) -> Self {
        if let Some(start) = members
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(idx, _)| idx)
        {
            members.rotate_left(start);
        }
        if let Some(first) = members.first().cloned() {
            members.push(first);
        }
        let canonical = members
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        Self {
            path: members,
            canonical,
        }
    }

    /// Distinct components on the cycle.
    pub fn members(&self) -> &[NodeId] {
        match self.path.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    pub fn is_self_loop(&self) -> bool {
        self.len() == 1
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    OnStack,
    Finished,
}

/// Depth-first cycle search with three-color marking.
pub struct CycleDetector<'g> {
    graph: &'g RefGraph,
}

impl<'g> CycleDetector<'g> {
    pub fn new(graph: &'g RefGraph) -> Self {
        Self { graph }
    }

    /// Every distinct cycle closed by a back edge, in discovery order.
    ///
    /// Each node's outgoing edges are walked once, so the search is linear in nodes + edges.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let mut color = vec![Color::Unvisited; self.graph.graph.node_count()];
        let mut seen: HashSet<String> = HashSet::new();
        let mut cycles = Vec::new();

        for (start, _) in self.graph.nodes() {
            if color[start.index()] != Color::Unvisited {
                continue;
            }

            // (node, successors, next successor to visit); doubles as the current path
            let mut frames: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
            color[start.index()] = Color::OnStack;
            frames.push((start, self.graph.successors(start), 0));

            while let Some(frame) = frames.last_mut() {
                if frame.2 >= frame.1.len() {
                    color[frame.0.index()] = Color::Finished;
                    frames.pop();
                    continue;
                }
                let next = frame.1[frame.2];
                frame.2 += 1;

                match color[next.index()] {
                    Color::Unvisited => {
                        color[next.index()] = Color::OnStack;
                        frames.push((next, self.graph.successors(next), 0));
                    }
                    Color::OnStack => {
                        let Some(pos) = frames.iter().rposition(|f| f.0 == next) else {
                            continue;
                        };
                        let members: Vec<NodeId> = frames[pos..]
                            .iter()
                            .filter_map(|f| self.graph.node(f.0).cloned())
                            .collect();
                        let cycle = Cycle::from_members(members);
                        if seen.insert(cycle.canonical.clone()) {
                            log::debug!("Found cycle {cycle}");
                            cycles.push(cycle);
                        }
                    }
                    Color::Finished => {}
                }
            }
        }

        cycles
    }
}

/// Attach one error per (cycle, member) to the member's result.
///
/// Runs after every per-component check; returns how many diagnostics were attached.
pub fn report_cycles(cycles: &[Cycle], report: &mut LintReport) -> usize {
    let mut attached: HashSet<(&str, &NodeId)> = HashSet::new();
    let mut count = 0;

    for cycle in cycles {
        for member in cycle.members() {
            if !attached.insert((cycle.canonical.as_str(), member)) {
                continue;
            }
            let Some(path) = report
                .find(member.kind, &member.name)
                .map(|result| result.path.clone())
            else {
                continue;
            };
            let message = if cycle.is_self_loop() {
                format!("{member} references itself: {cycle}")
            } else {
                format!("circular reference: {cycle}")
            };
            let diagnostic = Diagnostic::new(
                path,
                "delegation-cycle",
                Severity::Error,
                Provenance::Documented,
                message,
            );
            if report.attach(member.kind, &member.name, diagnostic) {
                count += 1;
            }
        }
    }

    count
}
