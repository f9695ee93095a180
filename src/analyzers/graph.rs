//! Module dependency graph.
//!
//! Import targets are resolved against the repository's own files by path
//! suffix: `app.models` finds `src/app/models.py`, `./util` finds
//! `lib/util.js`, a Go package path finds the first file in that directory.
//! Anything that resolves to no file is counted as an external import.
//! Cycles are the strongly connected components (Tarjan) with more than one
//! module.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::core::{AnalysisContext, Analyzer as AnalyzerTrait, Language, Result};
use crate::metrics::clamp_score;

/// Average fan-out that carries no penalty.
const COMFORTABLE_FAN_OUT: f64 = 5.0;
/// Points lost per dependency cycle.
const CYCLE_PENALTY: f64 = 10.0;
const MAX_CYCLE_PENALTY: f64 = 50.0;

/// Dependency analyzer.
#[derive(Default)]
pub struct Analyzer;

impl Analyzer {
    pub fn new() -> Self {
        Self
    }
}

impl AnalyzerTrait for Analyzer {
    type Output = DependencyReport;

    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn description(&self) -> &'static str {
        "Build the module import graph and detect dependency cycles"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Self::Output> {
        let paths: Vec<&str> = ctx.files.iter().map(|f| f.facts.path.as_str()).collect();
        let index = SuffixIndex::build(&paths);

        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = paths.iter().map(|p| graph.add_node(p.to_string())).collect();

        let mut internal = 0;
        let mut external = 0;
        for (from, file) in ctx.files.iter().enumerate() {
            for import in &file.facts.imports {
                match index.resolve(import) {
                    Some(to) if to == from => internal += 1,
                    Some(to) => {
                        internal += 1;
                        graph.update_edge(nodes[from], nodes[to], ());
                    }
                    None => external += 1,
                }
            }
        }

        let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut members: Vec<String> = scc.iter().map(|&n| graph[n].clone()).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();

        let fan_outs: Vec<usize> = nodes
            .iter()
            .map(|&n| graph.edges_directed(n, Direction::Outgoing).count())
            .collect();
        let average_fan_out = if nodes.is_empty() {
            0.0
        } else {
            graph.edge_count() as f64 / nodes.len() as f64
        };
        let max_fan_out = fan_outs.iter().copied().max().unwrap_or(0);

        let fan_factor = if average_fan_out <= COMFORTABLE_FAN_OUT {
            1.0
        } else {
            COMFORTABLE_FAN_OUT / average_fan_out
        };
        let cycle_penalty = (CYCLE_PENALTY * cycles.len() as f64).min(MAX_CYCLE_PENALTY);

        Ok(DependencyReport {
            score: clamp_score(100.0 * fan_factor - cycle_penalty),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            average_fan_out,
            max_fan_out,
            internal_imports: internal,
            external_imports: external,
            cycles,
        })
    }
}

/// Module keys of every file, by every trailing run of path segments.
struct SuffixIndex {
    modules: HashMap<String, usize>,
    directories: HashMap<String, usize>,
}

impl SuffixIndex {
    fn build(paths: &[&str]) -> Self {
        let mut modules = HashMap::new();
        let mut directories = HashMap::new();
        for (i, path) in paths.iter().enumerate() {
            let stem = strip_extension(path);
            let segments: Vec<&str> = stem.split('/').collect();
            // First file in path order wins an ambiguous suffix.
            for start in 0..segments.len() {
                modules.entry(segments[start..].join("/")).or_insert(i);
            }
            for start in 0..segments.len().saturating_sub(1) {
                directories
                    .entry(segments[start..segments.len() - 1].join("/"))
                    .or_insert(i);
            }
        }
        Self {
            modules,
            directories,
        }
    }

    fn lookup(&self, key: &str) -> Option<usize> {
        self.modules
            .get(key)
            .or_else(|| self.directories.get(key))
            .copied()
    }

    fn resolve(&self, import: &str) -> Option<usize> {
        let key = normalize_import(import)?;
        if let Some(found) = self.lookup(&key) {
            return Some(found);
        }
        // Host-qualified package paths are rooted at the module, not the host.
        if key.split('/').next().is_some_and(|host| host.contains('.')) {
            let mut rest = key.as_str();
            while let Some((_, tail)) = rest.split_once('/') {
                if let Some(found) = self.lookup(tail) {
                    return Some(found);
                }
                rest = tail;
            }
        }
        None
    }
}

fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Turn an import target into a slash-separated module key.
fn normalize_import(import: &str) -> Option<String> {
    let mut target = import
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '<' | '>'));
    if target.contains("://") {
        return None;
    }
    target = target.trim_start_matches("@/").trim_start_matches('~');

    let slashed = if target.contains('/') || target.contains('\\') {
        let mut path = target.replace('\\', "/");
        while let Some(rest) = path
            .strip_prefix("./")
            .or_else(|| path.strip_prefix("../"))
            .map(str::to_string)
        {
            path = rest;
        }
        strip_extension(&path).to_string()
    } else {
        // Dotted module paths: `a.b.c`, `.models`, `Foo::Bar`.
        let dotted = target.trim_start_matches('.');
        let known_extension = dotted
            .rsplit_once('.')
            .is_some_and(|(_, ext)| Language::from_extension(ext).is_some());
        if known_extension {
            strip_extension(dotted).to_string()
        } else {
            dotted.replace("::", "/").replace('.', "/")
        }
    };
    let key = slashed.trim_matches('/').to_string();
    (!key.is_empty()).then_some(key)
}

/// Repository dependency graph summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyReport {
    /// 0-100, lower with heavy fan-out and cycles.
    pub score: f64,
    pub nodes: usize,
    pub edges: usize,
    pub average_fan_out: f64,
    pub max_fan_out: usize,
    /// Imports resolved to a file of the repository.
    pub internal_imports: usize,
    /// Imports of libraries outside the repository.
    pub external_imports: usize,
    /// Modules of each dependency cycle, sorted.
    pub cycles: Vec<Vec<String>>,
}
