//! Local persistence adapters.

mod state_repository;

pub use state_repository::FileStateRepository;
