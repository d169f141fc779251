//! Repository Implementations
//!
//! Domain層のRepositoryトレイトの実装

pub mod in_memory_session_repository;
