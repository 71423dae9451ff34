//! The implicit widening hierarchy of the elementary types.
//!
//! Widening is a fixed directed graph (`SINT -> INT -> DINT -> LINT`,
//! `USINT -> UINT -> UDINT -> ULINT`, `REAL -> LREAL`). The reflexive and
//! transitive closure is computed once so that assignability checks are
//! a bit lookup.
use fixedbitset::FixedBitSet;
use log::trace;
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::Dfs,
};
use plctype_dsl::common::ElementaryTypeName;

/// Direct (single step) widening conversions.
static WIDENING_EDGES: [(ElementaryTypeName, ElementaryTypeName); 7] = [
    (ElementaryTypeName::SINT, ElementaryTypeName::INT),
    (ElementaryTypeName::INT, ElementaryTypeName::DINT),
    (ElementaryTypeName::DINT, ElementaryTypeName::LINT),
    (ElementaryTypeName::USINT, ElementaryTypeName::UINT),
    (ElementaryTypeName::UINT, ElementaryTypeName::UDINT),
    (ElementaryTypeName::UDINT, ElementaryTypeName::ULINT),
    (ElementaryTypeName::REAL, ElementaryTypeName::LREAL),
];

/// Position of the elementary type in `ElementaryTypeName::ALL`.
pub(crate) fn ordinal(name: ElementaryTypeName) -> usize {
    name as usize
}

#[derive(Debug)]
pub(crate) struct WideningLattice {
    /// Row `i` holds every type that the `i`th elementary type widens to,
    /// including itself.
    closure: Vec<FixedBitSet>,
}

impl WideningLattice {
    pub(crate) fn new() -> Self {
        let count = ElementaryTypeName::ALL.len();

        let mut graph: DiGraph<ElementaryTypeName, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = ElementaryTypeName::ALL
            .iter()
            .map(|name| graph.add_node(*name))
            .collect();
        for (from, to) in WIDENING_EDGES.iter() {
            graph.add_edge(nodes[ordinal(*from)], nodes[ordinal(*to)], ());
        }

        let closure = nodes
            .iter()
            .map(|start| {
                let mut reachable = FixedBitSet::with_capacity(count);
                let mut dfs = Dfs::new(&graph, *start);
                while let Some(node) = dfs.next(&graph) {
                    reachable.insert(ordinal(graph[node]));
                }
                trace!(
                    "{} widens to {} types",
                    graph[*start],
                    reachable.count_ones(..)
                );
                reachable
            })
            .collect();

        Self { closure }
    }

    /// Returns true if a value of type `from` implicitly converts to `to`.
    pub(crate) fn widens_to(&self, from: ElementaryTypeName, to: ElementaryTypeName) -> bool {
        self.closure[ordinal(from)].contains(ordinal(to))
    }
}
