use neo4rs::{query, Row};
use serde::{Deserialize, Serialize};

use super::{ProjectionInfo, ProjectionName, DEFAULT_PROJECTION};
use crate::store::{StoreClient, StoreConfig, StoreError};

const PROJECTION_EXISTS: &str = "CALL gds.graph.exists($graph_name) YIELD exists RETURN exists";

const PROJECTION_DROP: &str = "CALL gds.graph.drop($graph_name) YIELD graphName RETURN graphName";

const PROJECTION_CREATE: &str = "
    CALL gds.graph.project($graph_name,
        { Location: { properties: ['name'] } },
        { TRIP: { type: 'TRIP', orientation: 'NATURAL',
                  properties: { distance: { property: 'distance', defaultValue: 1.0 } } } })
    YIELD graphName, nodeCount, relationshipCount";

const NODE_ID_LOOKUP: &str = "MATCH (n:Location) WHERE n.name = $zone RETURN id(n) AS node_id";

const PAGE_RANK_STREAM: &str = "
    CALL gds.pageRank.stream($graph, {
        maxIterations: $iterations,
        dampingFactor: 0.85,
        relationshipWeightProperty: $weight
    })
    YIELD nodeId, score
    RETURN gds.util.nodeProperty($graph, nodeId, 'name', 'Location') AS name, score
    ORDER BY score DESC";

const DIJKSTRA_STREAM: &str = "
    UNWIND $destination_ids AS target
    CALL gds.shortestPath.dijkstra.stream($graph, {
        sourceNode: $origin_id,
        targetNode: target,
        relationshipWeightProperty: $weight
    })
    YIELD nodeIds, totalCost
    RETURN [nodeId IN nodeIds | { name: gds.util.asNode(nodeId).name, id: nodeId }] AS path_nodes,
           totalCost AS total_distance";

/// one entry of a PageRank result; `name` is the Location zone id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLocation {
    pub name: i64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub name: i64,
    pub id: i64,
}

/// a single origin→destination path with its total weighted cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub path: Vec<PathNode>,
    pub total_distance: f64,
}

/// Issues graph-analytics calls against an already-populated store. Every
/// call drops and recreates the fixed-name projection, so no state survives
/// between calls; concurrent calls sharing a projection name must serialize.
pub struct AnalyticsClient {
    store: StoreClient,
}

impl AnalyticsClient {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// connects and verifies connectivity eagerly.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        StoreClient::connect(config).map(Self::new)
    }

    /// drops any projection of this name, then creates a fresh one over all
    /// Location nodes and TRIP edges. a creation call that yields no result
    /// row is a hard failure.
    pub fn ensure_projection(&self, name: &ProjectionName) -> Result<ProjectionInfo, StoreError> {
        let exists = match self
            .store
            .fetch_one(query(PROJECTION_EXISTS).param("graph_name", name.as_str()))?
        {
            Some(row) => row
                .get::<bool>("exists")
                .map_err(|e| StoreError::DeserializeError(e.to_string()))?,
            None => false,
        };

        if exists {
            self.store
                .run(query(PROJECTION_DROP).param("graph_name", name.as_str()))?;
        } else {
            log::info!("Graph '{name}' does not exist, proceeding with graph creation.");
        }

        let row = self
            .store
            .fetch_one(query(PROJECTION_CREATE).param("graph_name", name.as_str()))?
            .ok_or_else(|| StoreError::ProjectionFailed(name.as_str().to_string()))?;

        let info = ProjectionInfo {
            graph: row
                .get::<String>("graphName")
                .map_err(|e| StoreError::DeserializeError(e.to_string()))?,
            nodes: row
                .get::<i64>("nodeCount")
                .map_err(|e| StoreError::DeserializeError(e.to_string()))?,
            relationships: row
                .get::<i64>("relationshipCount")
                .map_err(|e| StoreError::DeserializeError(e.to_string()))?,
        };
        log::info!(
            "Projection '{}' rebuilt: {} nodes, {} relationships",
            info.graph,
            info.nodes,
            info.relationships
        );
        Ok(info)
    }

    /// internal store id for a Location zone; `None` when the zone is not
    /// present in the graph.
    pub fn node_id(&self, zone: i64) -> Result<Option<i64>, StoreError> {
        match self
            .store
            .fetch_one(query(NODE_ID_LOOKUP).param("zone", zone))?
        {
            Some(row) => row
                .get::<i64>("node_id")
                .map(Some)
                .map_err(|e| StoreError::DeserializeError(e.to_string())),
            None => Ok(None),
        }
    }

    /// weighted PageRank over the rebuilt projection (damping 0.85). only
    /// the highest- and lowest-scoring rows of the descending ranking are
    /// surfaced; an empty stream yields an empty vector.
    pub fn page_rank(
        &self,
        iterations: u32,
        weight_property: &str,
    ) -> Result<Vec<RankedLocation>, StoreError> {
        let name = ProjectionName::new(DEFAULT_PROJECTION)?;
        self.ensure_projection(&name)?;

        let rows = self.store.fetch_all(
            query(PAGE_RANK_STREAM)
                .param("graph", name.as_str())
                .param("iterations", iterations as i64)
                .param("weight", weight_property),
        )?;
        if rows.is_empty() {
            log::info!("No PageRank results available.");
            return Ok(Vec::new());
        }

        let ranked = rows
            .iter()
            .map(|row| {
                Ok(RankedLocation {
                    name: integer_value(row, "name")?,
                    score: row
                        .get::<f64>("score")
                        .map_err(|e| StoreError::DeserializeError(e.to_string()))?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        // the ranking is already ordered by descending score; a single-row
        // result surfaces the same entry twice
        let first = ranked[0].clone();
        let last = ranked[ranked.len() - 1].clone();
        Ok(vec![first, last])
    }

    /// one Dijkstra computation per resolvable destination over the rebuilt
    /// projection, weighted by trip distance. destinations that do not
    /// resolve to a node are omitted from the target set entirely; an
    /// unresolvable origin yields an empty result.
    pub fn shortest_paths(
        &self,
        origin: i64,
        destinations: &[i64],
    ) -> Result<Vec<PathResult>, StoreError> {
        let name = ProjectionName::new(DEFAULT_PROJECTION)?;
        self.ensure_projection(&name)?;

        let origin_id = match self.node_id(origin)? {
            Some(id) => id,
            None => {
                log::info!("Origin zone '{origin}' not found.");
                return Ok(Vec::new());
            }
        };

        // absence of a lookup row is the only drop condition; a store id of
        // zero is a valid target
        let mut destination_ids = Vec::with_capacity(destinations.len());
        for zone in destinations {
            match self.node_id(*zone)? {
                Some(id) => destination_ids.push(id),
                None => log::info!("Destination zone '{zone}' not found, skipping."),
            }
        }
        if destination_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.store.fetch_all(
            query(DIJKSTRA_STREAM)
                .param("graph", name.as_str())
                .param("origin_id", origin_id)
                .param("destination_ids", destination_ids)
                .param("weight", "distance"),
        )?;

        rows.iter()
            .map(|row| {
                Ok(PathResult {
                    path: row
                        .get::<Vec<PathNode>>("path_nodes")
                        .map_err(|e| StoreError::DeserializeError(e.to_string()))?,
                    total_distance: row
                        .get::<f64>("total_distance")
                        .map_err(|e| StoreError::DeserializeError(e.to_string()))?,
                })
            })
            .collect()
    }
}

/// GDS surfaces projected node properties as floats in some procedures and
/// as integers in others; accept either shape.
fn integer_value(row: &Row, column: &str) -> Result<i64, StoreError> {
    if let Ok(value) = row.get::<i64>(column) {
        return Ok(value);
    }
    row.get::<f64>(column)
        .map(|v| v as i64)
        .map_err(|e| StoreError::DeserializeError(e.to_string()))
}
