pub mod planner;
pub mod simulator;

pub use planner::{deployment_count, plan_deployment, DeploymentInput, DeploymentOutput, Frequency};
pub use simulator::{deploy, DeploymentSchedule, DeploymentScheduleEntry};
