//! # 快照存储
//!
//! 保存和读取工作流的最近状态快照

pub mod storage;

pub use storage::{JsonFileStore, MemoryStore, SnapshotStore};
