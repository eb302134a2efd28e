//! Result Cache Adapters
//!
//! - **InMemoryResultCache** - Shared map (testing/single process)
//! - **FileResultCache** - JSON files on disk, survives restarts

mod file_result_cache;
mod in_memory_result_cache;

pub use file_result_cache::FileResultCache;
pub use in_memory_result_cache::InMemoryResultCache;
