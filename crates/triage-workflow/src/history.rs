//! 治疗记录
//!
//! 按派遣顺序保存已就诊的患者，只能从最近一端撤销

use triage_core::{PatientId, Result, TriageError};

/// 治疗记录栈
#[derive(Debug, Default, Clone)]
pub struct TreatmentHistory {
    treated: Vec<PatientId>,
}

impl TreatmentHistory {
    pub fn new() -> Self {
        Self { treated: Vec::new() }
    }

    /// 按派遣顺序（最早在前）重建
    pub fn from_dispatch_order(treated: Vec<PatientId>) -> Self {
        Self { treated }
    }

    /// 记录一次治疗
    pub fn record_treatment(&mut self, patient_id: PatientId) {
        self.treated.push(patient_id);
    }

    /// 撤销最近一次治疗
    pub fn undo_last(&mut self) -> Result<PatientId> {
        self.treated.pop().ok_or(TriageError::EmptyHistory)
    }

    /// 最近一次治疗
    pub fn last(&self) -> Option<PatientId> {
        self.treated.last().copied()
    }

    /// 最近的在前
    pub fn list_most_recent_first(&self) -> Vec<PatientId> {
        self.treated.iter().rev().copied().collect()
    }

    /// 派遣顺序（最早在前）
    pub fn dispatch_order(&self) -> &[PatientId] {
        &self.treated
    }

    pub fn len(&self) -> usize {
        self.treated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.treated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_list_most_recent_first() {
        let mut history = TreatmentHistory::new();
        history.record_treatment(PatientId(3));
        history.record_treatment(PatientId(1));
        history.record_treatment(PatientId(2));

        assert_eq!(
            history.list_most_recent_first(),
            vec![PatientId(2), PatientId(1), PatientId(3)]
        );
        assert_eq!(history.dispatch_order(), &[PatientId(3), PatientId(1), PatientId(2)]);
        assert_eq!(history.last(), Some(PatientId(2)));
    }

    #[test]
    fn test_undo_last_pops_most_recent() {
        let mut history = TreatmentHistory::new();
        history.record_treatment(PatientId(0));
        history.record_treatment(PatientId(1));

        assert_eq!(history.undo_last().unwrap(), PatientId(1));
        assert_eq!(history.undo_last().unwrap(), PatientId(0));
        assert!(matches!(history.undo_last(), Err(TriageError::EmptyHistory)));
        assert!(history.is_empty());
    }
}
