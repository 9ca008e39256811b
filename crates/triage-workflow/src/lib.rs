//! # 分诊工作流模块
//!
//! 提供单进程的患者收治与分诊调度功能，包括：
//! - 患者登记簿：记录所有收治过的患者，只追加不删除
//! - 分诊队列：急诊优先的两级候诊队列
//! - 治疗记录：按派遣顺序保存，支持撤销最近一次派遣
//! - 工作流控制器：保证三者之间的一致性，并提供统计与快照

pub mod engine;
pub mod history;
pub mod registry;
pub mod snapshot;
pub mod triage_queue;

// 重新导出主要类型
pub use engine::{TriageWorkflow, WorkflowStats};
pub use history::TreatmentHistory;
pub use registry::PatientRegistry;
pub use snapshot::WorkflowSnapshot;
pub use triage_queue::{QueueEntry, TieBreakPolicy, TriageQueue};
