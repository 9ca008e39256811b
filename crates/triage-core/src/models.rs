//! 核心数据模型定义

use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 患者标识
///
/// 即患者在登记簿中的位置。字段完全相同的两位患者仍然是两个不同的实体。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub usize);

impl PatientId {
    /// 登记簿中的下标
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 分诊优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    Emergency, // 急诊
    Routine,   // 普通
}

impl PriorityTier {
    pub fn is_emergency(self) -> bool {
        matches!(self, PriorityTier::Emergency)
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityTier::Emergency => write!(f, "Emergency"),
            PriorityTier::Routine => write!(f, "Routine"),
        }
    }
}

impl FromStr for PriorityTier {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emergency" | "e" => Ok(PriorityTier::Emergency),
            "routine" | "r" => Ok(PriorityTier::Routine),
            other => Err(TriageError::Validation(format!(
                "Unknown priority tier: {}",
                other
            ))),
        }
    }
}

/// 科室（固定选项）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    General,     // 全科
    Cardiology,  // 心内科
    Neurology,   // 神经科
    Orthopedics, // 骨科
    Pediatrics,  // 儿科
    Dermatology, // 皮肤科
}

impl Department {
    /// 全部可选科室
    pub const ALL: [Department; 6] = [
        Department::General,
        Department::Cardiology,
        Department::Neurology,
        Department::Orthopedics,
        Department::Pediatrics,
        Department::Dermatology,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::General => "General",
            Department::Cardiology => "Cardiology",
            Department::Neurology => "Neurology",
            Department::Orthopedics => "Orthopedics",
            Department::Pediatrics => "Pediatrics",
            Department::Dermatology => "Dermatology",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Department::ALL
            .iter()
            .copied()
            .find(|dept| dept.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TriageError::Validation(format!("Unknown department: {}", wanted)))
    }
}

/// 患者
///
/// 创建后不可变，核心只改变它在各个结构中的归属。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    name: String,
    age: String, // 按原样保存，不做解析
    disease: String,
    department: Department,
    priority: PriorityTier,
}

impl Patient {
    pub fn new(
        name: impl Into<String>,
        age: impl Into<String>,
        disease: impl Into<String>,
        department: Department,
        priority: PriorityTier,
    ) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            disease: disease.into(),
            department,
            priority,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> &str {
        &self.age
    }

    pub fn disease(&self) -> &str {
        &self.disease
    }

    pub fn department(&self) -> Department {
        self.department
    }

    pub fn priority(&self) -> PriorityTier {
        self.priority
    }

    pub fn is_emergency(&self) -> bool {
        self.priority.is_emergency()
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Age: {}, {} ({}, {})",
            self.name, self.age, self.disease, self.department, self.priority
        )
    }
}
