//! 工作流控制器
//!
//! 独占登记簿、分诊队列和治疗记录，对外提供收治、派遣、撤销、搜索和统计。
//! 所有操作同步执行到底，不会交错；多线程环境下须把整个控制器放进同一个临界区。

use crate::{
    history::TreatmentHistory,
    registry::PatientRegistry,
    snapshot::WorkflowSnapshot,
    triage_queue::{QueueEntry, TieBreakPolicy, TriageQueue},
};
use serde::{Deserialize, Serialize};
use triage_core::{Patient, PatientId, Result, TriageError};

/// 分诊工作流
#[derive(Debug, Clone)]
pub struct TriageWorkflow {
    registry: PatientRegistry,
    queue: TriageQueue,
    history: TreatmentHistory,
}

/// 工作流统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStats {
    /// 累计收治人数
    pub total_patients: usize,
    /// 当前已治疗人数（扣除撤销）
    pub treated_count: usize,
    /// 累计急诊人数
    pub emergency_count: usize,
    /// 当前候诊人数
    pub waiting_count: usize,
}

impl TriageWorkflow {
    /// 创建新的工作流
    pub fn new(policy: TieBreakPolicy) -> Self {
        Self {
            registry: PatientRegistry::new(),
            queue: TriageQueue::new(policy),
            history: TreatmentHistory::new(),
        }
    }

    pub fn policy(&self) -> TieBreakPolicy {
        self.queue.policy()
    }

    /// 收治患者：同时写入登记簿和分诊队列
    pub fn admit(&mut self, patient: Patient) -> PatientId {
        let priority = patient.priority();
        let id = self.registry.admit(patient);
        self.queue.enqueue(QueueEntry::new(id, priority));

        tracing::info!(
            patient_id = %id,
            priority = %priority,
            waiting = self.queue.len(),
            "Admitted patient"
        );
        id
    }

    /// 派遣下一位患者就诊
    ///
    /// 队列为空时返回 [`TriageError::EmptyQueue`]，状态不变。
    pub fn dispatch_next(&mut self) -> Result<PatientId> {
        let entry = match self.queue.dequeue_next() {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Dispatch requested with no patients waiting");
                return Err(e);
            }
        };
        self.history.record_treatment(entry.patient_id);

        tracing::info!(
            patient_id = %entry.patient_id,
            priority = %entry.priority,
            treated = self.history.len(),
            "Dispatched patient for treatment"
        );
        Ok(entry.patient_id)
    }

    /// 撤销最近一次派遣，患者按收治时的规则重新入队
    ///
    /// 没有可撤销的治疗时返回 [`TriageError::EmptyHistory`]，状态不变。
    pub fn undo_last(&mut self) -> Result<PatientId> {
        let patient_id = match self.history.undo_last() {
            Ok(patient_id) => patient_id,
            Err(e) => {
                tracing::warn!("Undo requested with no treatments recorded");
                return Err(e);
            }
        };
        let priority = self
            .registry
            .get(patient_id)
            .map(Patient::priority)
            .ok_or_else(|| TriageError::NotFound(format!("Patient {} not found", patient_id)))?;
        self.queue.enqueue(QueueEntry::new(patient_id, priority));

        tracing::info!(
            patient_id = %patient_id,
            priority = %priority,
            waiting = self.queue.len(),
            "Undid last treatment"
        );
        Ok(patient_id)
    }

    /// 获取患者
    pub fn patient(&self, id: PatientId) -> Option<&Patient> {
        self.registry.get(id)
    }

    /// 全部患者（收治顺序）
    pub fn all_patients(&self) -> &[Patient] {
        self.registry.all()
    }

    /// 按姓名或病症搜索
    pub fn search(&self, query: &str) -> Vec<(PatientId, &Patient)> {
        let results = self.registry.search(query);
        tracing::debug!(query, matches = results.len(), "Searched registry");
        results
    }

    /// 候诊队列（队首在前）
    pub fn waiting(&self) -> Vec<(PatientId, &Patient)> {
        self.queue
            .iter()
            .filter_map(|entry| self.lookup(entry.patient_id))
            .collect()
    }

    /// 治疗记录（最近的在前）
    pub fn treated_most_recent_first(&self) -> Vec<(PatientId, &Patient)> {
        self.history
            .list_most_recent_first()
            .into_iter()
            .filter_map(|id| self.lookup(id))
            .collect()
    }

    /// 统计信息
    pub fn stats(&self) -> WorkflowStats {
        WorkflowStats {
            total_patients: self.registry.len(),
            treated_count: self.history.len(),
            emergency_count: self.registry.emergency_count(),
            waiting_count: self.queue.len(),
        }
    }

    pub fn registry(&self) -> &PatientRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &TriageQueue {
        &self.queue
    }

    pub fn history(&self) -> &TreatmentHistory {
        &self.history
    }

    /// 生成快照
    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            taken_at: chrono::Utc::now(),
            patients: self.registry.all().to_vec(),
            waiting: self.queue.iter().map(|entry| entry.patient_id).collect(),
            treated: self.history.dispatch_order().to_vec(),
        }
    }

    /// 从快照恢复
    ///
    /// 每位患者必须恰好出现在候诊队列或治疗记录之一中，且队列保持急诊在前。
    pub fn from_snapshot(policy: TieBreakPolicy, snapshot: WorkflowSnapshot) -> Result<Self> {
        let total = snapshot.patients.len();
        let mut seen = vec![false; total];

        for &id in snapshot.waiting.iter().chain(snapshot.treated.iter()) {
            let slot = seen.get_mut(id.index()).ok_or_else(|| {
                TriageError::InvalidSnapshot(format!("Snapshot references unknown patient {}", id))
            })?;
            if *slot {
                return Err(TriageError::InvalidSnapshot(format!(
                    "Patient {} appears more than once",
                    id
                )));
            }
            *slot = true;
        }

        if let Some(index) = seen.iter().position(|flag| !flag) {
            return Err(TriageError::InvalidSnapshot(format!(
                "Patient {} is neither waiting nor treated",
                PatientId(index)
            )));
        }

        let entries = snapshot
            .waiting
            .iter()
            .map(|&id| QueueEntry::new(id, snapshot.patients[id.index()].priority()))
            .collect();
        let queue = TriageQueue::from_ordered(policy, entries)?;

        let mut registry = PatientRegistry::new();
        for patient in snapshot.patients {
            registry.admit(patient);
        }

        tracing::info!(
            patients = registry.len(),
            waiting = queue.len(),
            treated = snapshot.treated.len(),
            "Restored workflow from snapshot"
        );

        Ok(Self {
            registry,
            queue,
            history: TreatmentHistory::from_dispatch_order(snapshot.treated),
        })
    }

    fn lookup(&self, id: PatientId) -> Option<(PatientId, &Patient)> {
        self.registry.get(id).map(|patient| (id, patient))
    }
}

impl Default for TriageWorkflow {
    fn default() -> Self {
        Self::new(TieBreakPolicy::default())
    }
}
