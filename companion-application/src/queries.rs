pub mod event_queries;
pub mod status_queries;
