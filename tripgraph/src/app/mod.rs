mod trip_app;

pub use trip_app::{TripApp, TripOperation};
