// Core infrastructure modules
pub mod database;              // Data store interface and query types
pub mod sqlite_database;       // SQLite implementation of the data store
pub mod storage;               // Object storage for uploaded media
pub mod viewer;                // Viewer context
pub mod middleware;            // Viewer context middleware and extractor

pub use database::{DataStore, PlaylistOrder, PlaylistQuery, VideoFilter, VideoOrder, VideoQuery};
pub use sqlite_database::SqliteStore;
pub use storage::{LocalObjectStorage, ObjectStorage};
pub use viewer::ViewerContext;
