//! # 分诊管理模块
//!
//! 提供配置管理、日志初始化和工作流指标等运维功能

pub mod config;
pub mod logging;
pub mod monitoring;

pub use config::{ConfigManager, LoggingConfig, MonitoringConfig, StorageConfig, TriageConfig, WorkflowConfig};
pub use monitoring::WorkflowMonitor;
