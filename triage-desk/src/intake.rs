//! 收治表单
//!
//! 核心不做输入校验，这里在进入工作流之前完成

use triage_core::utils::is_blank;
use triage_core::{Department, Patient, PriorityTier, Result, TriageError};

/// 原始表单字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionForm {
    pub name: String,
    pub age: String,
    pub disease: String,
    pub department: String,
    pub priority: String,
}

impl AdmissionForm {
    /// 校验并生成患者
    pub fn into_patient(self) -> Result<Patient> {
        if is_blank(&self.name) || is_blank(&self.age) || is_blank(&self.disease) {
            return Err(TriageError::Validation("Please fill all fields!".to_string()));
        }

        let department: Department = self.department.parse()?;
        let priority: PriorityTier = self.priority.parse()?;

        Ok(Patient::new(
            self.name.trim(),
            self.age.trim(),
            self.disease.trim(),
            department,
            priority,
        ))
    }
}
