//! Simulated request latency.
//!
//! The store has no network behind it, but callers are written against an
//! API that behaves like one. Each write operation sleeps for a configured
//! delay before touching storage. Dropping the returned future cancels the
//! operation before anything is written.

use std::time::Duration;

use tracing::trace;

use crate::config::LatencyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Register,
    DeleteUser,
    CreateTask,
    UpdateTask,
    SubmitTask,
    SendMessage,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::DeleteUser => "delete_user",
            Self::CreateTask => "create_task",
            Self::UpdateTask => "update_task",
            Self::SubmitTask => "submit_task",
            Self::SendMessage => "send_message",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedLatency {
    config: LatencyConfig,
}

impl SimulatedLatency {
    pub fn new(config: LatencyConfig) -> Self {
        Self { config }
    }

    /// No delays at all.
    pub fn disabled() -> Self {
        Self {
            config: LatencyConfig::zero(),
        }
    }

    pub fn delay_for(&self, op: Operation) -> Duration {
        let ms = match op {
            Operation::Login => self.config.login_ms,
            Operation::Register => self.config.register_ms,
            Operation::DeleteUser => self.config.delete_user_ms,
            Operation::CreateTask => self.config.create_task_ms,
            Operation::UpdateTask => self.config.update_task_ms,
            Operation::SubmitTask => self.config.submit_task_ms,
            Operation::SendMessage => self.config.send_message_ms,
        };
        Duration::from_millis(ms)
    }

    pub async fn wait(&self, op: Operation) {
        let delay = self.delay_for(op);
        if delay.is_zero() {
            return;
        }
        trace!(operation = op.as_str(), delay_ms = delay.as_millis() as u64, "Simulating latency");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_timings() {
        let latency = SimulatedLatency::new(LatencyConfig::default());
        assert_eq!(latency.delay_for(Operation::Login), Duration::from_millis(500));
        assert_eq!(latency.delay_for(Operation::DeleteUser), Duration::from_millis(300));
        assert_eq!(latency.delay_for(Operation::SubmitTask), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_sleeps_for_configured_delay() {
        let latency = SimulatedLatency::new(LatencyConfig::default());
        let started = tokio::time::Instant::now();
        latency.wait(Operation::CreateTask).await;
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn disabled_latency_returns_immediately() {
        let latency = SimulatedLatency::disabled();
        tokio::time::timeout(Duration::from_millis(50), latency.wait(Operation::Login))
            .await
            .expect("should not sleep");
    }
}
