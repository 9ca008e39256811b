//! 分诊工作台
//!
//! 把命令翻译成工作流操作，并负责快照保存和指标更新

use crate::commands::{Command, HELP};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{error, info};
use triage_admin::{TriageConfig, WorkflowMonitor};
use triage_core::{Patient, PatientId, TriageError};
use triage_storage::SnapshotStore;
use triage_workflow::TriageWorkflow;

/// 命令的执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message(String),
    Quit,
}

/// 分诊工作台
pub struct Desk {
    workflow: TriageWorkflow,
    monitor: Option<WorkflowMonitor>,
    store: Option<Arc<dyn SnapshotStore>>,
    autosave: bool,
}

impl Desk {
    /// 打开工作台，存在快照时从快照恢复
    pub async fn open(config: &TriageConfig, store: Option<Arc<dyn SnapshotStore>>) -> Result<Self> {
        let policy = config.workflow.tie_break;

        let snapshot = match &store {
            Some(store) => store.load().await.context("Failed to load snapshot")?,
            None => None,
        };
        let workflow = match snapshot {
            Some(snapshot) => TriageWorkflow::from_snapshot(policy, snapshot)
                .context("Failed to restore snapshot")?,
            None => TriageWorkflow::new(policy),
        };

        let monitor = if config.monitoring.enabled {
            Some(WorkflowMonitor::new()?)
        } else {
            None
        };

        let desk = Self {
            workflow,
            monitor,
            store,
            autosave: config.storage.autosave,
        };
        desk.observe();

        info!(policy = %policy, patients = desk.workflow.stats().total_patients, "Triage desk ready");
        Ok(desk)
    }

    pub fn workflow(&self) -> &TriageWorkflow {
        &self.workflow
    }

    /// 执行一条命令
    pub async fn handle(&mut self, command: Command) -> Result<Reply> {
        let message = match command {
            Command::Admit(form) => match form.into_patient() {
                Ok(patient) => {
                    let summary = format!("Admitted {} ({})", patient.name(), patient.priority());
                    self.workflow.admit(patient);
                    self.after_change().await;
                    summary
                }
                Err(e) => user_message(&e),
            },
            Command::Treat => match self.workflow.dispatch_next() {
                Ok(id) => {
                    if let Some(monitor) = &self.monitor {
                        monitor.record_dispatch();
                    }
                    self.after_change().await;
                    format!("{} treated successfully!", self.name_of(id))
                }
                Err(TriageError::EmptyQueue) => {
                    self.record_rejected();
                    "No patients waiting!".to_string()
                }
                Err(e) => return Err(e.into()),
            },
            Command::Undo => match self.workflow.undo_last() {
                Ok(id) => {
                    if let Some(monitor) = &self.monitor {
                        monitor.record_undo();
                    }
                    self.after_change().await;
                    format!("Undid treatment of {}, back in the queue", self.name_of(id))
                }
                Err(TriageError::EmptyHistory) => {
                    self.record_rejected();
                    "No treatments to undo!".to_string()
                }
                Err(e) => return Err(e.into()),
            },
            Command::Patients => {
                render_patients(&self.workflow.all_patients().iter().collect::<Vec<_>>(), "No patients registered.")
            }
            Command::Search(query) => {
                let found: Vec<&Patient> = self
                    .workflow
                    .search(&query)
                    .into_iter()
                    .map(|(_, patient)| patient)
                    .collect();
                render_patients(&found, "No matching patients.")
            }
            Command::Queue => render_queue(&self.workflow.waiting()),
            Command::History => render_history(&self.workflow.treated_most_recent_first()),
            Command::Stats => {
                let stats = self.workflow.stats();
                format!(
                    "Total Patients: {}\nTreated: {}\nEmergency Cases: {}\nWaiting: {}",
                    stats.total_patients, stats.treated_count, stats.emergency_count, stats.waiting_count
                )
            }
            Command::Metrics => match &self.monitor {
                Some(monitor) => monitor.get_prometheus_metrics()?,
                None => "Metrics are disabled.".to_string(),
            },
            Command::Help => HELP.to_string(),
            Command::Quit => {
                self.shutdown().await?;
                return Ok(Reply::Quit);
            }
        };

        Ok(Reply::Message(message))
    }

    /// 保存最终快照
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store
                .save(&self.workflow.snapshot())
                .await
                .context("Failed to save snapshot on shutdown")?;
            info!("Saved final snapshot");
        }
        Ok(())
    }

    async fn after_change(&self) {
        self.observe();

        if !self.autosave {
            return;
        }
        if let Some(store) = &self.store {
            // 保存失败不影响内存中的状态
            if let Err(e) = store.save(&self.workflow.snapshot()).await {
                error!("Failed to autosave snapshot: {}", e);
            }
        }
    }

    fn observe(&self) {
        if let Some(monitor) = &self.monitor {
            monitor.observe(&self.workflow.stats());
        }
    }

    fn record_rejected(&self) {
        if let Some(monitor) = &self.monitor {
            monitor.record_rejected();
        }
    }

    fn name_of(&self, id: PatientId) -> String {
        self.workflow
            .patient(id)
            .map(|patient| patient.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }
}

pub fn user_message(e: &TriageError) -> String {
    match e {
        TriageError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn render_patients(patients: &[&Patient], empty: &str) -> String {
    if patients.is_empty() {
        return empty.to_string();
    }
    let mut out = String::new();
    for (index, patient) in patients.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, patient);
    }
    out.trim_end().to_string()
}

fn render_queue(waiting: &[(PatientId, &Patient)]) -> String {
    if waiting.is_empty() {
        return "No patients waiting.".to_string();
    }
    let mut out = String::new();
    for (position, (_, patient)) in waiting.iter().enumerate() {
        let marker = if patient.is_emergency() { "[E]" } else { "[R]" };
        let _ = writeln!(out, "{}. {} {} ({})", position + 1, marker, patient.name(), patient.department());
    }
    out.trim_end().to_string()
}

fn render_history(treated: &[(PatientId, &Patient)]) -> String {
    if treated.is_empty() {
        return "No treatments recorded.".to_string();
    }
    treated
        .iter()
        .map(|(_, patient)| format!("{} ({}) - {}", patient.name(), patient.department(), patient.priority()))
        .collect::<Vec<_>>()
        .join("\n")
}
