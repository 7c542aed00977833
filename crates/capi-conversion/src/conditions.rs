//! Conditions communicate the observed state of a resource through its
//! status. They are plain data as far as conversion is concerned and must
//! survive every conversion verbatim.
use serde::{Deserialize, Serialize};

/// Status of a [`Condition`], one of `True`, `False` or `Unknown`.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize, strum::Display,
)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// How severe a condition with status `False` is.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize, strum::Display,
)]
pub enum ConditionSeverity {
    Error,
    Warning,
    Info,
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "")]
    None,
}

/// The observed state of one aspect of a resource.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// The condition type, for example `ContainerProvisioned`.
    #[serde(rename = "type")]
    pub type_: String,

    pub status: ConditionStatus,

    #[serde(default, skip_serializing_if = "is_none_severity")]
    pub severity: ConditionSeverity,

    /// RFC 3339 timestamp of the last status change, kept as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// A CamelCase identifier for the last transition, see for example
    /// [`docker::WAITING_FOR_BOOTSTRAP_DATA_REASON`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn is_none_severity(severity: &ConditionSeverity) -> bool {
    *severity == ConditionSeverity::None
}

impl Condition {
    /// Returns a condition with status `True`. `True` conditions carry no
    /// severity, reason or message.
    pub fn true_condition(type_: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            status: ConditionStatus::True,
            ..Self::default()
        }
    }

    /// Returns a condition with status `False`.
    pub fn false_condition(
        type_: impl Into<String>,
        reason: impl Into<String>,
        severity: ConditionSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status: ConditionStatus::False,
            severity,
            reason: Some(reason.into()),
            message: Some(message.into()),
            last_transition_time: None,
        }
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// Returns the condition of `type_`, if present.
pub fn get<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|condition| condition.type_ == type_)
}

/// Adds `condition` to `conditions`, replacing an existing condition of the
/// same type. The existing transition time is kept if the status didn't
/// change.
pub fn set(conditions: &mut Vec<Condition>, mut condition: Condition) {
    match conditions
        .iter_mut()
        .find(|existing| existing.type_ == condition.type_)
    {
        Some(existing) => {
            if existing.status == condition.status {
                condition.last_transition_time = existing.last_transition_time.take();
            }
            *existing = condition;
        }
        None => conditions.push(condition),
    }
}

/// Conditions and condition reasons of the Docker infrastructure provider.
pub mod docker {
    /// Status of the provisioning of the container backing a DockerMachine.
    pub const CONTAINER_PROVISIONED_CONDITION: &str = "ContainerProvisioned";

    /// (Severity=Info) The DockerMachine waits for the cluster infrastructure
    /// to be ready.
    pub const WAITING_FOR_CLUSTER_INFRASTRUCTURE_REASON: &str = "WaitingForClusterInfrastructure";

    /// (Severity=Info) The DockerMachine waits for the bootstrap data to be
    /// ready.
    pub const WAITING_FOR_BOOTSTRAP_DATA_REASON: &str = "WaitingForBootstrapData";

    /// (Severity=Warning) Provisioning the container failed. The controller
    /// retries automatically.
    pub const CONTAINER_PROVISIONING_FAILED_REASON: &str = "ContainerProvisioningFailed";

    /// Status of the bootstrap process of a DockerMachine. Only set after
    /// [`CONTAINER_PROVISIONED_CONDITION`] is `True`.
    pub const BOOTSTRAP_EXEC_SUCCEEDED_CONDITION: &str = "BootstrapExecSucceeded";

    /// (Severity=Info) The bootstrap script is being executed.
    pub const BOOTSTRAPPING_REASON: &str = "Bootstrapping";

    /// (Severity=Warning) Executing the bootstrap script failed. The
    /// controller retries automatically.
    pub const BOOTSTRAP_FAILED_REASON: &str = "BootstrapFailed";

    /// Availability of the container implementing the cluster load balancer
    /// of a DockerCluster.
    pub const LOAD_BALANCER_AVAILABLE_CONDITION: &str = "LoadBalancerAvailable";

    /// (Severity=Warning) Provisioning the load balancer container failed.
    pub const LOAD_BALANCER_PROVISIONING_FAILED_REASON: &str = "LoadBalancerProvisioningFailed";
}
