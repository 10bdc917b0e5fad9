//! Cross-subsystem integration flows.

pub mod alias_flows;
pub mod batch_flows;
pub mod contract_flows;
pub mod replay_flows;
