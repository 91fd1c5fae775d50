use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsClient;
use crate::ingest::{run_with_retry, RetryPolicy, TripLoadError, TripLoader};
use crate::store::StoreConfig;

/// Command line tool for loading taxi trip data into a graph store and
/// running analytics against the resulting location graph
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct TripApp {
    #[command(subcommand)]
    pub op: TripOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum TripOperation {
    /// filter a TLC trip parquet file and bulk-load it as Location nodes
    /// and TRIP relationships
    Load {
        /// parquet file containing yellow-cab trip records
        input_file: String,

        /// TOML file with a [store] table overriding the connection defaults
        #[arg(short, long)]
        config_file: Option<String>,

        /// number of attempts while the store starts up
        #[arg(long, default_value_t = 10)]
        attempts: u32,

        /// seconds to sleep between attempts
        #[arg(long, default_value_t = 10)]
        retry_interval: u64,
    },

    /// run weighted PageRank over the trip graph, reporting the highest-
    /// and lowest-ranked zones
    Pagerank {
        /// maximum PageRank iterations
        #[arg(short, long, default_value_t = 20)]
        iterations: u32,

        /// relationship property used as edge weight
        #[arg(short, long, default_value = "distance")]
        weight_property: String,

        /// TOML file with a [store] table overriding the connection defaults
        #[arg(short, long)]
        config_file: Option<String>,
    },

    /// weighted shortest paths from an origin zone to one or more
    /// destination zones
    Route {
        /// origin zone id
        origin: i64,

        /// destination zone ids
        #[arg(required = true)]
        destinations: Vec<i64>,

        /// TOML file with a [store] table overriding the connection defaults
        #[arg(short, long)]
        config_file: Option<String>,
    },
}

impl TripOperation {
    pub fn run(&self) -> Result<(), TripLoadError> {
        match self {
            TripOperation::Load {
                input_file,
                config_file,
                attempts,
                retry_interval,
            } => {
                let config = StoreConfig::load(config_file.as_deref().map(Path::new))?;
                let policy = RetryPolicy {
                    attempts: *attempts,
                    interval: Duration::from_secs(*retry_interval),
                };
                let cancelled = AtomicBool::new(false);
                // the store may still be starting up; connection and load
                // failures are retried alike until the budget is spent
                run_with_retry(&policy, &cancelled, || {
                    let loader = TripLoader::connect(&config)?;
                    loader.load(Path::new(input_file))
                })
            }
            TripOperation::Pagerank {
                iterations,
                weight_property,
                config_file,
            } => {
                let config = StoreConfig::load(config_file.as_deref().map(Path::new))?;
                let client = AnalyticsClient::connect(&config)?;
                let ranked = client.page_rank(*iterations, weight_property)?;
                print_json(&ranked)
            }
            TripOperation::Route {
                origin,
                destinations,
                config_file,
            } => {
                let config = StoreConfig::load(config_file.as_deref().map(Path::new))?;
                let client = AnalyticsClient::connect(&config)?;
                let paths = client.shortest_paths(*origin, destinations)?;
                print_json(&paths)
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), TripLoadError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| TripLoadError::SerializationError(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}
