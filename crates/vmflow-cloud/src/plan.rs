//! Ordered steps of a provisioning run and their outcome

use crate::error::CloudError;
use crate::model::ResourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use vmflow_config::{CleanupPolicy, RunOptions};

/// One step of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "kind", rename_all = "snake_case")]
pub enum Step {
    ListVirtualMachines,
    EnsureResourceGroup,
    Create(ResourceKind),
    Delete(ResourceKind),
}

/// Kind of change a step makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    Delete,
    Read,
}

impl Step {
    pub fn action_type(&self) -> ActionType {
        match self {
            Step::ListVirtualMachines => ActionType::Read,
            Step::EnsureResourceGroup | Step::Create(_) => ActionType::Create,
            Step::Delete(_) => ActionType::Delete,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::ListVirtualMachines => write!(f, "list virtual machines"),
            Step::EnsureResourceGroup => write!(f, "ensure resource group"),
            Step::Create(kind) => write!(f, "create {}", kind),
            Step::Delete(kind) => write!(f, "delete {}", kind),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::Read => write!(f, "read"),
        }
    }
}

/// Steps a run performs, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    /// List, create, list again, then delete according to the cleanup policy.
    ///
    /// Deletions always run in the reverse of creation order.
    pub fn for_run(options: &RunOptions) -> Self {
        let created: Vec<ResourceKind> = ResourceKind::CREATION_ORDER
            .into_iter()
            .filter(|kind| *kind != ResourceKind::StorageAccount || options.storage.is_some())
            .collect();

        let mut steps = vec![Step::ListVirtualMachines];
        if options.create_resource_group {
            steps.push(Step::EnsureResourceGroup);
        }
        steps.extend(created.iter().copied().map(Step::Create));
        steps.push(Step::ListVirtualMachines);
        steps.extend(
            created
                .iter()
                .rev()
                .copied()
                .filter(|kind| match options.cleanup {
                    CleanupPolicy::All => true,
                    CleanupPolicy::VmOnly => *kind == ResourceKind::VirtualMachine,
                    CleanupPolicy::None => false,
                })
                .map(Step::Delete),
        );

        Self { steps }
    }

    pub fn creations(&self) -> Vec<ResourceKind> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                Step::Create(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn deletions(&self) -> Vec<ResourceKind> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                Step::Delete(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        let count = |t: ActionType| self.steps.iter().filter(|s| s.action_type() == t).count();
        PlanSummary {
            create: count(ActionType::Create),
            delete: count(ActionType::Delete),
            read: count(ActionType::Read),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub delete: usize,
    pub read: usize,
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to create, {} to delete, {} listing(s)",
            self.create, self.delete, self.read
        )
    }
}

/// A step that finished
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: Step,
    pub message: String,
}

/// The step that stopped a run
#[derive(Debug)]
pub struct StepFailure {
    pub step: Step,
    pub error: CloudError,
}

/// Outcome of a run
#[derive(Debug, Default)]
pub struct RunReport {
    pub completed: Vec<StepRecord>,
    pub failure: Option<StepFailure>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn add_success(&mut self, step: Step, message: String) {
        self.completed.push(StepRecord { step, message });
    }

    pub fn set_failure(&mut self, step: Step, error: CloudError) {
        self.failure = Some(StepFailure { step, error });
    }

    /// Steps that completed, without their messages
    pub fn completed_steps(&self) -> Vec<Step> {
        self.completed.iter().map(|r| r.step).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmflow_config::Settings;

    fn options(yaml: &str) -> RunOptions {
        Settings::from_yaml(yaml).unwrap().resolve().unwrap()
    }

    #[test]
    fn test_default_plan() {
        let plan = Plan::for_run(&options(""));
        assert_eq!(
            plan.steps,
            vec![
                Step::ListVirtualMachines,
                Step::Create(ResourceKind::VirtualNetwork),
                Step::Create(ResourceKind::PublicIpAddress),
                Step::Create(ResourceKind::NetworkInterface),
                Step::Create(ResourceKind::VirtualMachine),
                Step::ListVirtualMachines,
                Step::Delete(ResourceKind::VirtualMachine),
                Step::Delete(ResourceKind::NetworkInterface),
                Step::Delete(ResourceKind::PublicIpAddress),
                Step::Delete(ResourceKind::VirtualNetwork),
            ]
        );
    }

    #[test]
    fn test_deletions_reverse_creations() {
        let plan = Plan::for_run(&options("storage:\n  enabled: true\n"));
        let mut reversed = plan.creations();
        reversed.reverse();
        assert_eq!(plan.deletions(), reversed);
        assert_eq!(plan.creations()[0], ResourceKind::StorageAccount);
        assert_eq!(plan.deletions().last(), Some(&ResourceKind::StorageAccount));
    }

    #[test]
    fn test_vm_only_cleanup() {
        let plan = Plan::for_run(&options("cleanup: vm-only\n"));
        assert_eq!(plan.deletions(), vec![ResourceKind::VirtualMachine]);
    }

    #[test]
    fn test_no_cleanup() {
        let plan = Plan::for_run(&options("cleanup: none\n"));
        assert!(plan.deletions().is_empty());
        assert_eq!(plan.steps.last(), Some(&Step::ListVirtualMachines));
    }

    #[test]
    fn test_resource_group_step_comes_first() {
        let plan = Plan::for_run(&options("create_resource_group: true\n"));
        assert_eq!(plan.steps[1], Step::EnsureResourceGroup);
    }

    #[test]
    fn test_summary() {
        let summary = Plan::for_run(&options("")).summary();
        assert_eq!(
            summary,
            PlanSummary {
                create: 4,
                delete: 4,
                read: 2
            }
        );
        assert_eq!(summary.to_string(), "4 to create, 4 to delete, 2 listing(s)");
    }

    #[test]
    fn test_step_display() {
        assert_eq!(
            Step::Create(ResourceKind::PublicIpAddress).to_string(),
            "create public IP address"
        );
        assert_eq!(Step::ListVirtualMachines.to_string(), "list virtual machines");
    }
}
