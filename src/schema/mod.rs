//! Dataset schema - the entities and fields a dataset actually exposes,
//! and the link structure used to join them.
//!
//! The schema arrives as a JSON descriptor from the metadata store. It is
//! a different artifact from the data dictionary and the two can drift;
//! resolution checks the dictionary, compilation checks this schema, and
//! the two failure surfaces stay distinct.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{NodeIndex, UnGraph};
use serde::Deserialize;

use crate::model::FieldReference;

/// Errors raised while loading or traversing a dataset schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid dataset descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Failed to parse dataset descriptor: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("No join path from {from} to {to}")]
    NoPathFound { from: String, to: String },
}

/// One entity (table) in the dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub fields: Vec<String>,
    /// Links to other entities, declared on either side.
    #[serde(default)]
    pub links: Vec<LinkDef>,
}

/// A declared join relationship between two entities.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkDef {
    /// The entity on the other side of the link.
    pub to: String,
    /// Column on the declaring entity.
    pub from_column: String,
    /// Column on the target entity.
    pub to_column: String,
}

/// The set of known entities and fields for one dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSchema {
    /// Physical database the entity tables live in.
    pub database: String,
    /// The record-keyed entity every extract is scoped to.
    pub base_entity: String,
    pub entities: Vec<EntityDef>,
}

impl DatasetSchema {
    /// Parse and validate a JSON descriptor.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: DatasetSchema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let names: HashSet<&str> = self.entities.iter().map(|e| e.name.as_str()).collect();

        if names.len() != self.entities.len() {
            return Err(SchemaError::InvalidDescriptor(
                "duplicate entity names".into(),
            ));
        }
        if !names.contains(self.base_entity.as_str()) {
            return Err(SchemaError::InvalidDescriptor(format!(
                "base entity {:?} is not among the declared entities",
                self.base_entity
            )));
        }
        for entity in &self.entities {
            for link in &entity.links {
                if !names.contains(link.to.as_str()) {
                    return Err(SchemaError::InvalidDescriptor(format!(
                        "entity {:?} links to unknown entity {:?}",
                        entity.name, link.to
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Whether the dataset exposes this exact `(entity, name)` column.
    pub fn contains_field(&self, field: &FieldReference) -> bool {
        self.entity(&field.entity)
            .map(|e| e.fields.iter().any(|f| f == &field.name))
            .unwrap_or(false)
    }
}

// =============================================================================
// Entity join graph
// =============================================================================

/// A single step in a join path.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinStep {
    /// The source entity.
    pub from: String,
    /// The target entity.
    pub to: String,
    /// Join column pairs, oriented (from_column, to_column).
    pub on: Vec<(String, String)>,
}

/// An ordered join path between two entities.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinPath {
    pub steps: Vec<JoinStep>,
}

/// Link columns stored on a graph edge, oriented by the declaring side.
#[derive(Debug, Clone)]
struct LinkEdge {
    from: String,
    columns: Vec<(String, String)>,
}

/// The dataset's entities as an undirected join graph.
///
/// Built once per compilation from a [`DatasetSchema`]; path finding is
/// BFS, so multi-hop joins through intermediate entities come out as the
/// shortest chain of steps.
#[derive(Debug)]
pub struct EntityGraph {
    graph: UnGraph<String, LinkEdge>,
    entity_index: HashMap<String, NodeIndex>,
}

impl EntityGraph {
    pub fn new(schema: &DatasetSchema) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut entity_index = HashMap::new();

        for entity in &schema.entities {
            let idx = graph.add_node(entity.name.clone());
            entity_index.insert(entity.name.clone(), idx);
        }

        for entity in &schema.entities {
            let from_idx = entity_index[&entity.name];
            for link in &entity.links {
                let to_idx = entity_index[&link.to];
                // One edge per entity pair. Further links declared by the
                // same entity extend the join to a composite key; a
                // declaration from the other side is redundant.
                if let Some(edge_idx) = graph.find_edge(from_idx, to_idx) {
                    let edge: &mut LinkEdge = &mut graph[edge_idx];
                    if edge.from == entity.name {
                        edge.columns
                            .push((link.from_column.clone(), link.to_column.clone()));
                    }
                    continue;
                }
                graph.add_edge(
                    from_idx,
                    to_idx,
                    LinkEdge {
                        from: entity.name.clone(),
                        columns: vec![(link.from_column.clone(), link.to_column.clone())],
                    },
                );
            }
        }

        Self {
            graph,
            entity_index,
        }
    }

    /// Find the shortest join path between two entities.
    ///
    /// Uses BFS over the link edges; reconstructs the path from a parent
    /// map once the target is reached.
    pub fn find_path(&self, from: &str, to: &str) -> Result<JoinPath, SchemaError> {
        let from_idx = *self
            .entity_index
            .get(from)
            .ok_or_else(|| SchemaError::UnknownEntity(from.to_string()))?;
        let to_idx = *self
            .entity_index
            .get(to)
            .ok_or_else(|| SchemaError::UnknownEntity(to.to_string()))?;

        if from_idx == to_idx {
            return Ok(JoinPath::default());
        }

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        queue.push_back(from_idx);
        visited.insert(from_idx);

        while let Some(current) = queue.pop_front() {
            if current == to_idx {
                return self.reconstruct_path(from_idx, to_idx, &parent);
            }

            for neighbor in self.graph.neighbors(current) {
                if visited.insert(neighbor) {
                    parent.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }

        Err(SchemaError::NoPathFound {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Walk backward through the BFS parent map, emitting one step per
    /// edge with the join columns oriented in walk direction.
    fn reconstruct_path(
        &self,
        from_idx: NodeIndex,
        to_idx: NodeIndex,
        parent: &HashMap<NodeIndex, NodeIndex>,
    ) -> Result<JoinPath, SchemaError> {
        let mut steps = Vec::new();
        let mut current = to_idx;

        while current != from_idx {
            let prev = *parent.get(&current).ok_or_else(|| SchemaError::NoPathFound {
                from: self.graph[from_idx].clone(),
                to: self.graph[to_idx].clone(),
            })?;

            let edge_idx = self
                .graph
                .find_edge(prev, current)
                .ok_or_else(|| SchemaError::NoPathFound {
                    from: self.graph[from_idx].clone(),
                    to: self.graph[to_idx].clone(),
                })?;
            let edge = &self.graph[edge_idx];

            let step_from = self.graph[prev].clone();
            let step_to = self.graph[current].clone();

            // Edge columns are oriented by the declaring entity; flip
            // them when walking the other way.
            let on = if edge.from == step_from {
                edge.columns.clone()
            } else {
                edge.columns
                    .iter()
                    .map(|(a, b)| (b.clone(), a.clone()))
                    .collect()
            };

            steps.push(JoinStep {
                from: step_from,
                to: step_to,
                on,
            });

            current = prev;
        }

        steps.reverse();
        Ok(JoinPath { steps })
    }
}
