// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod gtfs_decoder;
pub mod http_feed_source;
pub mod taskade_repository;
