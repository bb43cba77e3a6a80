//! Inheritance Graph Ordering
//!
//! Orders classes group by group: groups in ascending tag order, and within
//! a group a topological order of the base -> derived relation. Classes with
//! no ordering constraint between them keep their declaration order.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use indexmap::IndexMap;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

use crate::class::Class;
use crate::error::{Result, SchemaError};

/// Reorder `classes` into grouped topological order.
///
/// Only bases inside a class's own group constrain its position.
pub fn toposort_classes_by_group(mut classes: IndexMap<String, Class>) -> Result<IndexMap<String, Class>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, cls) in &classes {
        groups.entry(cls.group.clone()).or_default().push(name.clone());
    }

    let mut ordered = IndexMap::with_capacity(classes.len());
    for (group, members) in &groups {
        let order = InheritanceGraph::build(members, &classes).toposort(group)?;
        debug!(group = %group, classes = order.len(), "ordered group");
        for name in order {
            if let Some(cls) = classes.swap_remove(&name) {
                ordered.insert(name, cls);
            }
        }
    }
    Ok(ordered)
}

/// Base -> derived edges among the classes of one group
pub struct InheritanceGraph<'a> {
    /// Node indices follow declaration order
    graph: DiGraph<&'a str, ()>,
}

impl<'a> InheritanceGraph<'a> {
    pub fn build(members: &'a [String], classes: &IndexMap<String, Class>) -> Self {
        let mut graph = DiGraph::with_capacity(members.len(), members.len());
        let node_indices: HashMap<&str, NodeIndex> = members
            .iter()
            .map(|name| (name.as_str(), graph.add_node(name.as_str())))
            .collect();

        for name in members {
            let Some(cls) = classes.get(name) else {
                continue;
            };
            let derived_idx = node_indices[name.as_str()];
            for base in &cls.bases {
                if let Some(&base_idx) = node_indices.get(base.as_str()) {
                    graph.add_edge(base_idx, derived_idx, ());
                }
            }
        }

        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Kahn's algorithm, releasing ready classes in declaration order
    pub fn toposort(&self, group: &str) -> Result<Vec<String>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(self.graph[idx].to_string());
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                in_degree[next.index()] -= 1;
                if in_degree[next.index()] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() < self.graph.node_count() {
            return Err(SchemaError::InheritanceCycle {
                group: group.to_string(),
                members: self.cycle_members(),
            });
        }
        Ok(order)
    }

    /// Classes on a cycle, in declaration order
    fn cycle_members(&self) -> Vec<String> {
        let mut members: Vec<NodeIndex> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .flatten()
            .collect();
        members.sort();
        members.into_iter().map(|idx| self.graph[idx].to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(specs: &[(&str, &str, &[&str])]) -> IndexMap<String, Class> {
        specs
            .iter()
            .map(|(name, group, bases)| {
                let mut cls = Class::new(*name);
                cls.group = group.to_string();
                cls.bases = bases.iter().map(|b| b.to_string()).collect();
                (name.to_string(), cls)
            })
            .collect()
    }

    fn names(classes: &IndexMap<String, Class>) -> Vec<&str> {
        classes.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_base_before_derived() {
        let input = classes(&[
            ("CallExpr", "", &["Expr"]),
            ("Expr", "", &["Element"]),
            ("Element", "", &[]),
        ]);
        let sorted = toposort_classes_by_group(input).unwrap();
        assert_eq!(names(&sorted), vec!["Element", "Expr", "CallExpr"]);
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let input = classes(&[
            ("Element", "", &[]),
            ("Zeta", "", &["Element"]),
            ("Alpha", "", &["Element"]),
            ("Mid", "", &["Zeta", "Alpha"]),
        ]);
        let sorted = toposort_classes_by_group(input).unwrap();
        assert_eq!(names(&sorted), vec!["Element", "Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_groups_in_lexicographic_order() {
        let input = classes(&[
            ("Stmt", "stmt", &[]),
            ("Element", "", &[]),
            ("Expr", "expr", &[]),
            ("IfStmt", "stmt", &["Stmt"]),
            ("File", "", &["Element"]),
        ]);
        let sorted = toposort_classes_by_group(input).unwrap();
        assert_eq!(names(&sorted), vec!["Element", "File", "Expr", "Stmt", "IfStmt"]);
        let groups: Vec<&str> = sorted.values().map(|c| c.group.as_str()).collect();
        let mut expected = groups.clone();
        expected.sort();
        assert_eq!(groups, expected);
    }

    #[test]
    fn test_cross_group_bases_do_not_constrain() {
        let input = classes(&[
            ("Expr", "expr", &["Element"]),
            ("Element", "", &[]),
        ]);
        let sorted = toposort_classes_by_group(input).unwrap();
        assert_eq!(names(&sorted), vec!["Element", "Expr"]);
    }

    #[test]
    fn test_cycle_reported() {
        let input = classes(&[
            ("Element", "", &[]),
            ("A", "", &["B"]),
            ("B", "", &["A"]),
            ("C", "", &["A"]),
        ]);
        let err = toposort_classes_by_group(input).unwrap_err();
        match err {
            SchemaError::InheritanceCycle { group, members } => {
                assert_eq!(group, "");
                assert_eq!(members, vec!["A", "B"]);
            }
            other => panic!("Expected InheritanceCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_inheritance_reported() {
        let input = classes(&[("Element", "g", &["Element"])]);
        let err = toposort_classes_by_group(input).unwrap_err();
        assert!(matches!(err, SchemaError::InheritanceCycle { ref members, .. } if members == &["Element"]));
    }

    #[test]
    fn test_graph_counts() {
        let members: Vec<String> = ["Element", "Expr", "Other"].iter().map(|s| s.to_string()).collect();
        let input = classes(&[
            ("Element", "", &[]),
            ("Expr", "", &["Element"]),
            ("Other", "", &["Outside"]),
        ]);
        let graph = InheritanceGraph::build(&members, &input);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
    }
}
