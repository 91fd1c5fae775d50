use std::fs::File;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use kdam::tqdm;
use neo4rs::query;

use super::parquet_source::TRIP_COLUMNS;
use super::{read_trip_file, TripFilter, TripLoadError, TripRecord};
use crate::store::{StoreClient, StoreConfig};

const CREATE_LOCATION_CONSTRAINT: &str =
    "CREATE CONSTRAINT IF NOT EXISTS FOR (l:Location) REQUIRE l.name IS UNIQUE";

const MERGE_PICKUP_LOCATIONS: &str = "
    LOAD CSV WITH HEADERS FROM 'file:///' + $file_name AS row
    WITH DISTINCT toInteger(row.PULocationID) AS id
    MERGE (l:Location {name: id})";

const MERGE_DROPOFF_LOCATIONS: &str = "
    LOAD CSV WITH HEADERS FROM 'file:///' + $file_name AS row
    WITH DISTINCT toInteger(row.DOLocationID) AS id
    MERGE (l:Location {name: id})";

const MERGE_TRIP_RELATIONSHIPS: &str = "
    LOAD CSV WITH HEADERS FROM 'file:///' + $file_name AS row
    MATCH (pickup:Location {name: toInteger(row.PULocationID)})
    MATCH (dropoff:Location {name: toInteger(row.DOLocationID)})
    MERGE (pickup)-[trip:TRIP {
        distance: toFloat(row.trip_distance),
        fare: toFloat(row.fare_amount),
        pickup_dt: datetime(row.tpep_pickup_datetime),
        dropoff_dt: datetime(row.tpep_dropoff_datetime)
    }]->(dropoff)";

const COUNT_LOCATIONS: &str = "MATCH (n:Location) RETURN count(n) AS count";
const COUNT_TRIPS: &str = "MATCH ()-[r:TRIP]->() RETURN count(r) AS count";

/// Drives a trip parquet file through filtering, CSV staging and the bulk
/// load statements that materialize Location nodes and TRIP relationships.
pub struct TripLoader {
    client: StoreClient,
    import_directory: PathBuf,
}

impl TripLoader {
    pub fn new(client: StoreClient, import_directory: PathBuf) -> Self {
        Self {
            client,
            import_directory,
        }
    }

    pub fn connect(config: &StoreConfig) -> Result<Self, TripLoadError> {
        let client = StoreClient::connect(config)?;
        Ok(Self::new(client, config.import_directory.clone()))
    }

    /// runs the full pipeline for one input file. each stage is a hard
    /// precondition for the next; the first failure propagates.
    pub fn load(&self, file_path: &Path) -> Result<(), TripLoadError> {
        log::info!(
            "Starting data loading process for file: {}",
            file_path.display()
        );
        let csv_filename =
            stage_csv_file(file_path, &self.import_directory, &TripFilter::bronx())?;

        log::info!("Creating uniqueness constraint on :Location(name)");
        self.client.run(query(CREATE_LOCATION_CONSTRAINT))?;

        log::info!("Merging pickup location nodes");
        self.client
            .run(query(MERGE_PICKUP_LOCATIONS).param("file_name", csv_filename.as_str()))?;

        log::info!("Merging dropoff location nodes");
        self.client
            .run(query(MERGE_DROPOFF_LOCATIONS).param("file_name", csv_filename.as_str()))?;

        log::info!("Merging TRIP relationships");
        self.client
            .run(query(MERGE_TRIP_RELATIONSHIPS).param("file_name", csv_filename.as_str()))?;

        // post-load sanity check: logged, not asserted
        let node_count = self
            .client
            .fetch_scalar(query(COUNT_LOCATIONS), "count")?
            .unwrap_or(0);
        let edge_count = self
            .client
            .fetch_scalar(query(COUNT_TRIPS), "count")?
            .unwrap_or(0);
        log::info!("Number of Location nodes: {node_count}");
        log::info!("Number of TRIP relationships: {edge_count}");
        log::info!("Data loading completed");
        Ok(())
    }
}

/// reads, filters and stages one trip file as a CSV in the store's import
/// directory. returns the CSV filename (not path) that the bulk-load
/// statements reference via `file:///`.
pub fn stage_csv_file(
    input_file: &Path,
    import_directory: &Path,
    filter: &TripFilter,
) -> Result<String, TripLoadError> {
    let records = read_trip_file(input_file)?;
    let total = records.len();
    let filtered = filter.apply(records);
    let distinct_zones = filtered
        .iter()
        .flat_map(|t| [t.pickup_zone, t.dropoff_zone])
        .unique()
        .count();
    log::info!(
        "After filtering: {}/{} rows across {} distinct zones",
        filtered.len(),
        total,
        distinct_zones
    );

    let filename = csv_filename(input_file)?;
    let save_loc = import_directory.join(&filename);
    log::info!("Saving CSV to: {}", save_loc.display());
    write_csv(&filtered, &save_loc)?;
    Ok(filename)
}

/// `<input basename>.csv`, matching what the store's loader reads by name.
pub fn csv_filename(input_file: &Path) -> Result<String, TripLoadError> {
    let stem = input_file
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            TripLoadError::InvalidUserInput(format!(
                "input path '{}' has no usable file name",
                input_file.display()
            ))
        })?;
    Ok(format!("{stem}.csv"))
}

fn write_csv(records: &[TripRecord], filepath: &Path) -> Result<(), TripLoadError> {
    let file = File::create(filepath).map_err(|e| TripLoadError::WriteError {
        path: filepath.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);
    if records.is_empty() {
        // serde only emits the header alongside the first row
        writer.write_record(TRIP_COLUMNS).map_err(|e| {
            TripLoadError::CsvWriteError(format!("Failed to write to {}: {e}", filepath.display()))
        })?;
    }
    for record in tqdm!(records.iter(), total = records.len(), desc = "staging trips") {
        writer.serialize(record).map_err(|e| {
            TripLoadError::CsvWriteError(format!("Failed to write to {}: {e}", filepath.display()))
        })?;
    }
    eprintln!();
    writer.flush().map_err(|e| {
        TripLoadError::CsvWriteError(format!("Failed to flush {}: {e}", filepath.display()))
    })?;
    Ok(())
}
