//! # Agentlint Graph
//!
//! Reference analysis over an indexed set of agents, skills and commands.
//!
//! ## Features
//!
//! - **Reference extraction** - independent recognizers per surface form (`Task(x)`, `Skill: x`, ...)
//! - **Cross-reference validation** - missing targets, unused `allowed-tools`, undocumented flags
//! - **Cycle detection** - three-color DFS over the shared `kind:name` node space
//! - **Chain tracing** - command -> agents -> skills trees
//! - **Orphan detection** - skills nothing points at
//!
//! ## Architecture
//!
//! ```text
//! ComponentIndex
//!     │
//!     ├──> ReferenceExtractor (regex recognizers, code fences skipped)
//!     │      └─ Reference { target, name, pattern, line }
//!     │
//!     ├──> CrossReferenceValidator ──> Diagnostic per component
//!     │
//!     └──> GraphBuilder ──> RefGraph (petgraph, skills are leaves)
//!                              ├─ CycleDetector ──> report_cycles (batch pass)
//!                              ├─ ChainTracer ──> ChainLink tree
//!                              └─ find_orphan_skills ──> info diagnostics
//! ```
//!
//! Nothing in this crate returns an error: every problem becomes a diagnostic.

mod builder;
mod builtins;
mod chain;
mod cycles;
mod extract;
mod graph;
mod lint;
mod orphans;
mod types;
mod validate;

pub use builder::GraphBuilder;
pub use builtins::Builtins;
pub use chain::{render_chain, ChainLink, ChainTracer};
pub use cycles::{report_cycles, Cycle, CycleDetector};
pub use extract::{is_placeholder, is_reference_name, visible_lines, ReferenceExtractor, SourceLine};
pub use lint::{CheckOptions, LintOutcome, Linter};
pub use orphans::{find_orphan_skills, orphan_diagnostics};
pub use types::{EdgeKind, NodeId, Pattern, RefGraph, Reference};
pub use validate::{contains_word, parse_allowed_tools, CrossReferenceValidator};
