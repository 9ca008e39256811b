//! 工作流监控
//!
//! 把工作流统计导出为 Prometheus 指标

use anyhow::Result;
use prometheus::{IntCounter, IntGauge, Opts, Registry};
use triage_workflow::WorkflowStats;

/// 工作流指标收集器
#[derive(Debug, Clone)]
pub struct WorkflowMonitor {
    /// Prometheus指标注册表
    registry: Registry,
    /// 累计收治人数
    patients_total: IntGauge,
    /// 当前已治疗人数
    patients_treated: IntGauge,
    /// 累计急诊人数
    emergency_cases_total: IntGauge,
    /// 当前候诊人数
    patients_waiting: IntGauge,
    /// 派遣次数
    dispatches_total: IntCounter,
    /// 撤销次数
    undos_total: IntCounter,
    /// 因队列或记录为空而被拒绝的操作
    rejected_operations_total: IntCounter,
}

impl WorkflowMonitor {
    /// 创建并注册全部指标
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let patients_total = IntGauge::with_opts(Opts::new(
            "triage_patients_total",
            "Patients admitted since start",
        ))?;
        let patients_treated = IntGauge::with_opts(Opts::new(
            "triage_patients_treated",
            "Patients currently recorded as treated",
        ))?;
        let emergency_cases_total = IntGauge::with_opts(Opts::new(
            "triage_emergency_cases_total",
            "Emergency patients admitted since start",
        ))?;
        let patients_waiting = IntGauge::with_opts(Opts::new(
            "triage_patients_waiting",
            "Patients currently waiting in the triage queue",
        ))?;
        let dispatches_total = IntCounter::with_opts(Opts::new(
            "triage_dispatches_total",
            "Successful dispatches",
        ))?;
        let undos_total = IntCounter::with_opts(Opts::new(
            "triage_undos_total",
            "Successful undos",
        ))?;
        let rejected_operations_total = IntCounter::with_opts(Opts::new(
            "triage_rejected_operations_total",
            "Dispatch or undo requests rejected on an empty structure",
        ))?;

        registry.register(Box::new(patients_total.clone()))?;
        registry.register(Box::new(patients_treated.clone()))?;
        registry.register(Box::new(emergency_cases_total.clone()))?;
        registry.register(Box::new(patients_waiting.clone()))?;
        registry.register(Box::new(dispatches_total.clone()))?;
        registry.register(Box::new(undos_total.clone()))?;
        registry.register(Box::new(rejected_operations_total.clone()))?;

        Ok(Self {
            registry,
            patients_total,
            patients_treated,
            emergency_cases_total,
            patients_waiting,
            dispatches_total,
            undos_total,
            rejected_operations_total,
        })
    }

    /// 用最新统计更新仪表
    pub fn observe(&self, stats: &WorkflowStats) {
        self.patients_total.set(stats.total_patients as i64);
        self.patients_treated.set(stats.treated_count as i64);
        self.emergency_cases_total.set(stats.emergency_count as i64);
        self.patients_waiting.set(stats.waiting_count as i64);
    }

    pub fn record_dispatch(&self) {
        self.dispatches_total.inc();
    }

    pub fn record_undo(&self) {
        self.undos_total.inc();
    }

    pub fn record_rejected(&self) {
        self.rejected_operations_total.inc();
    }

    /// 获取Prometheus指标文本
    pub fn get_prometheus_metrics(&self) -> Result<String> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_reflect_stats() {
        let monitor = WorkflowMonitor::new().unwrap();
        monitor.observe(&WorkflowStats {
            total_patients: 3,
            treated_count: 1,
            emergency_count: 2,
            waiting_count: 2,
        });
        monitor.record_dispatch();
        monitor.record_dispatch();
        monitor.record_undo();
        monitor.record_rejected();

        let text = monitor.get_prometheus_metrics().unwrap();
        assert!(text.contains("triage_patients_total 3"));
        assert!(text.contains("triage_patients_treated 1"));
        assert!(text.contains("triage_emergency_cases_total 2"));
        assert!(text.contains("triage_patients_waiting 2"));
        assert!(text.contains("triage_dispatches_total 2"));
        assert!(text.contains("triage_undos_total 1"));
        assert!(text.contains("triage_rejected_operations_total 1"));
    }

    #[test]
    fn test_monitors_are_independent() {
        let first = WorkflowMonitor::new().unwrap();
        let second = WorkflowMonitor::new().unwrap();
        first.record_undo();

        assert!(second.get_prometheus_metrics().unwrap().contains("triage_undos_total 0"));
    }
}
