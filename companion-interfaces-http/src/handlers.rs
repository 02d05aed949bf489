pub mod event_handlers;
pub mod ingest_handlers;
pub mod ops_handlers;
pub mod participation_handlers;
pub mod session_handlers;
