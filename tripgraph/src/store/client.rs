use neo4rs::{ConfigBuilder, Graph, Query, Row};
use tokio::runtime::Runtime;

use super::{StoreConfig, StoreError};

/// Blocking facade over the bolt driver. The pipeline is synchronous end to
/// end, so the client owns a current-thread runtime and drives each statement
/// to completion before returning. The underlying connection pool is released
/// when the client is dropped.
pub struct StoreClient {
    graph: Graph,
    runtime: Runtime,
}

impl StoreClient {
    /// opens a connection pool against the configured store and eagerly
    /// verifies connectivity with a trivial query, so that callers fail fast
    /// while the store is still starting up.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                StoreError::TokioError(format!("failure creating async rust tokio runtime: {e}"))
            })?;

        let bolt_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.username)
            .password(&config.password)
            .build()
            .map_err(|e| StoreError::ConnectionError(format!("invalid bolt config: {e}")))?;

        let graph = runtime
            .block_on(Graph::connect(bolt_config))
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        let client = Self { graph, runtime };
        client.verify_connectivity()?;
        Ok(client)
    }

    pub fn verify_connectivity(&self) -> Result<(), StoreError> {
        self.fetch_one(neo4rs::query("RETURN 1 AS ok")).map(|_| ())
    }

    /// executes a statement, discarding any result rows.
    pub fn run(&self, query: Query) -> Result<(), StoreError> {
        self.runtime
            .block_on(self.graph.run(query))
            .map_err(|e| StoreError::QueryError(e.to_string()))
    }

    /// executes a statement and collects every result row.
    pub fn fetch_all(&self, query: Query) -> Result<Vec<Row>, StoreError> {
        self.runtime
            .block_on(async {
                let mut stream = self.graph.execute(query).await?;
                let mut rows = Vec::new();
                while let Some(row) = stream.next().await? {
                    rows.push(row);
                }
                Ok(rows)
            })
            .map_err(|e: neo4rs::Error| StoreError::QueryError(e.to_string()))
    }

    /// executes a statement and returns its first row, if any.
    pub fn fetch_one(&self, query: Query) -> Result<Option<Row>, StoreError> {
        self.runtime
            .block_on(async {
                let mut stream = self.graph.execute(query).await?;
                stream.next().await
            })
            .map_err(|e| StoreError::QueryError(e.to_string()))
    }

    /// convenience for single-value aggregate queries such as counts.
    pub fn fetch_scalar(&self, query: Query, column: &str) -> Result<Option<i64>, StoreError> {
        match self.fetch_one(query)? {
            Some(row) => row
                .get::<i64>(column)
                .map(Some)
                .map_err(|e| StoreError::DeserializeError(e.to_string())),
            None => Ok(None),
        }
    }
}
