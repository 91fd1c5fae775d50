use clap::Parser;
use tripgraph::{app::TripApp, ingest::TripLoadError};

fn main() -> Result<(), TripLoadError> {
    env_logger::init();
    let args = TripApp::parse();
    args.op.run()
}
