//! 患者登记簿
//!
//! 按收治顺序保存所有患者，只追加，从不删除

use triage_core::utils::contains_ignore_case;
use triage_core::{Patient, PatientId, PriorityTier};

/// 患者登记簿
#[derive(Debug, Default, Clone)]
pub struct PatientRegistry {
    patients: Vec<Patient>,
}

impl PatientRegistry {
    /// 创建空的登记簿
    pub fn new() -> Self {
        Self { patients: Vec::new() }
    }

    /// 登记患者，返回其在登记簿中的位置
    pub fn admit(&mut self, patient: Patient) -> PatientId {
        let id = PatientId(self.patients.len());
        self.patients.push(patient);
        id
    }

    /// 按收治顺序返回全部患者
    pub fn all(&self) -> &[Patient] {
        &self.patients
    }

    pub fn get(&self, id: PatientId) -> Option<&Patient> {
        self.patients.get(id.index())
    }

    /// 带标识遍历
    pub fn entries(&self) -> impl Iterator<Item = (PatientId, &Patient)> {
        self.patients
            .iter()
            .enumerate()
            .map(|(index, patient)| (PatientId(index), patient))
    }

    /// 按姓名或病症搜索（大小写不敏感，保持原有顺序）
    pub fn search(&self, query: &str) -> Vec<(PatientId, &Patient)> {
        self.entries()
            .filter(|(_, patient)| {
                contains_ignore_case(patient.name(), query)
                    || contains_ignore_case(patient.disease(), query)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// 历史累计急诊人数，派遣与撤销都不会使其减少
    pub fn emergency_count(&self) -> usize {
        self.patients
            .iter()
            .filter(|patient| patient.priority() == PriorityTier::Emergency)
            .count()
    }
}
