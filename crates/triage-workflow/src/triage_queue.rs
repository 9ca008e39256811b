//! 分诊队列
//!
//! 两级候诊队列：所有急诊患者排在所有普通患者之前，普通患者按到达顺序排队。
//! 急诊患者之间的顺序由 [`TieBreakPolicy`] 决定。

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use triage_core::{PatientId, PriorityTier, Result, TriageError};

/// 急诊层内的排序策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakPolicy {
    /// 急诊患者插到队首：最后到达的急诊患者最先就诊
    #[default]
    Lifo,
    /// 急诊患者排在已在等候的急诊患者之后：两级各自先到先服务
    Fifo,
}

impl fmt::Display for TieBreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreakPolicy::Lifo => write!(f, "lifo"),
            TieBreakPolicy::Fifo => write!(f, "fifo"),
        }
    }
}

impl FromStr for TieBreakPolicy {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lifo" | "literal" => Ok(TieBreakPolicy::Lifo),
            "fifo" | "tiered" => Ok(TieBreakPolicy::Fifo),
            other => Err(TriageError::Config(format!(
                "Unknown tie-break policy: {} (expected lifo or fifo)",
                other
            ))),
        }
    }
}

/// 队列条目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub patient_id: PatientId,
    pub priority: PriorityTier,
}

impl QueueEntry {
    pub fn new(patient_id: PatientId, priority: PriorityTier) -> Self {
        Self { patient_id, priority }
    }
}

/// 分诊队列
#[derive(Debug, Clone)]
pub struct TriageQueue {
    entries: VecDeque<QueueEntry>,
    policy: TieBreakPolicy,
    // 队首连续的急诊条目数
    waiting_emergencies: usize,
}

impl TriageQueue {
    /// 创建空队列
    pub fn new(policy: TieBreakPolicy) -> Self {
        Self {
            entries: VecDeque::new(),
            policy,
            waiting_emergencies: 0,
        }
    }

    /// 按既定顺序重建队列（队首在前）
    ///
    /// 若有普通患者排在急诊患者之前则拒绝。
    pub fn from_ordered(policy: TieBreakPolicy, entries: Vec<QueueEntry>) -> Result<Self> {
        let waiting_emergencies = entries
            .iter()
            .take_while(|entry| entry.priority.is_emergency())
            .count();

        if entries[waiting_emergencies..]
            .iter()
            .any(|entry| entry.priority.is_emergency())
        {
            return Err(TriageError::InvalidSnapshot(
                "Routine patient queued ahead of an emergency patient".to_string(),
            ));
        }

        Ok(Self {
            entries: entries.into(),
            policy,
            waiting_emergencies,
        })
    }

    pub fn policy(&self) -> TieBreakPolicy {
        self.policy
    }

    /// 入队
    pub fn enqueue(&mut self, entry: QueueEntry) {
        match entry.priority {
            PriorityTier::Routine => self.entries.push_back(entry),
            PriorityTier::Emergency => {
                match self.policy {
                    TieBreakPolicy::Lifo => self.entries.push_front(entry),
                    TieBreakPolicy::Fifo => self.entries.insert(self.waiting_emergencies, entry),
                }
                self.waiting_emergencies += 1;
            }
        }
    }

    /// 取出队首患者
    pub fn dequeue_next(&mut self) -> Result<QueueEntry> {
        let entry = self.entries.pop_front().ok_or(TriageError::EmptyQueue)?;
        if entry.priority.is_emergency() {
            self.waiting_emergencies -= 1;
        }
        Ok(entry)
    }

    pub fn peek(&self) -> Option<&QueueEntry> {
        self.entries.front()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 当前等候的急诊人数
    pub fn waiting_emergencies(&self) -> usize {
        self.waiting_emergencies
    }

    /// 从队首到队尾遍历
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    /// 队列的只读快照（队首在前）
    pub fn snapshot(&self) -> Vec<QueueEntry> {
        self.entries.iter().copied().collect()
    }
}

impl Default for TriageQueue {
    fn default() -> Self {
        Self::new(TieBreakPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emergency(id: usize) -> QueueEntry {
        QueueEntry::new(PatientId(id), PriorityTier::Emergency)
    }

    fn routine(id: usize) -> QueueEntry {
        QueueEntry::new(PatientId(id), PriorityTier::Routine)
    }

    fn drain(queue: &mut TriageQueue) -> Vec<usize> {
        let mut order = Vec::new();
        while let Ok(entry) = queue.dequeue_next() {
            order.push(entry.patient_id.index());
        }
        order
    }

    #[test]
    fn test_lifo_within_emergency_tier() {
        // P1(R), P2(E), P3(R), P4(E) -> P4, P2, P1, P3
        let mut queue = TriageQueue::new(TieBreakPolicy::Lifo);
        queue.enqueue(routine(1));
        queue.enqueue(emergency(2));
        queue.enqueue(routine(3));
        queue.enqueue(emergency(4));

        assert_eq!(drain(&mut queue), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_fifo_within_emergency_tier() {
        // P1(R), P2(E), P3(R), P4(E) -> P2, P4, P1, P3
        let mut queue = TriageQueue::new(TieBreakPolicy::Fifo);
        queue.enqueue(routine(1));
        queue.enqueue(emergency(2));
        queue.enqueue(routine(3));
        queue.enqueue(emergency(4));

        assert_eq!(drain(&mut queue), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_dequeue_empty_queue() {
        let mut queue = TriageQueue::default();
        assert!(queue.is_empty());
        assert!(matches!(queue.dequeue_next(), Err(TriageError::EmptyQueue)));
        assert!(queue.is_empty());
        assert_eq!(queue.waiting_emergencies(), 0);
    }

    #[test]
    fn test_emergency_count_tracks_dequeues() {
        let mut queue = TriageQueue::new(TieBreakPolicy::Fifo);
        queue.enqueue(emergency(0));
        queue.enqueue(emergency(1));
        queue.enqueue(routine(2));
        assert_eq!(queue.waiting_emergencies(), 2);

        queue.dequeue_next().unwrap();
        assert_eq!(queue.waiting_emergencies(), 1);

        // 新的急诊患者仍排在剩余急诊患者之后、普通患者之前
        queue.enqueue(emergency(3));
        let order: Vec<usize> = queue.iter().map(|e| e.patient_id.index()).collect();
        assert_eq!(order, vec![1, 3, 2]);
    }

    #[test]
    fn test_from_ordered_rejects_routine_before_emergency() {
        let result = TriageQueue::from_ordered(TieBreakPolicy::Lifo, vec![routine(0), emergency(1)]);
        assert!(matches!(result, Err(TriageError::InvalidSnapshot(_))));

        let queue = TriageQueue::from_ordered(
            TieBreakPolicy::Fifo,
            vec![emergency(2), emergency(0), routine(1)],
        )
        .unwrap();
        assert_eq!(queue.waiting_emergencies(), 2);
        assert_eq!(queue.peek().unwrap().patient_id, PatientId(2));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("FIFO".parse::<TieBreakPolicy>().unwrap(), TieBreakPolicy::Fifo);
        assert_eq!("literal".parse::<TieBreakPolicy>().unwrap(), TieBreakPolicy::Lifo);
        assert!("random".parse::<TieBreakPolicy>().is_err());
        assert_eq!(TieBreakPolicy::default(), TieBreakPolicy::Lifo);
    }
}
