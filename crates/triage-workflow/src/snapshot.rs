//! 工作流状态快照
//!
//! 供持久化和展示使用的纯数据视图

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use triage_core::{Patient, PatientId};

/// 工作流快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    /// 快照时间
    pub taken_at: DateTime<Utc>,
    /// 登记簿（收治顺序）
    pub patients: Vec<Patient>,
    /// 候诊队列（队首在前）
    pub waiting: Vec<PatientId>,
    /// 治疗记录（派遣顺序，最早在前）
    pub treated: Vec<PatientId>,
}

impl WorkflowSnapshot {
    /// 空快照
    pub fn empty() -> Self {
        Self {
            taken_at: Utc::now(),
            patients: Vec::new(),
            waiting: Vec::new(),
            treated: Vec::new(),
        }
    }
}
