pub mod chunk_writer;
pub mod cleanup;
pub mod error;
pub mod finalizer;
pub mod metadata_stripper;
pub mod upload_service;
