//! Health probe types

use serde::Serialize;

/// Overall status of a health probe
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(self) -> bool {
        self == HealthStatus::Healthy
    }
}

/// Health of a single provider, produced per health-check call
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProviderHealth {
    pub name: String,
    pub healthy: bool,
}

impl ProviderHealth {
    pub fn new(name: impl Into<String>, healthy: bool) -> Self {
        Self {
            name: name.into(),
            healthy,
        }
    }
}

/// Folded health of every configured provider
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AggregateHealth {
    pub status: HealthStatus,
    pub entities: Vec<ProviderHealth>,
}

impl AggregateHealth {
    /// Fold entities into an aggregate; healthy only if every entity is
    pub fn from_entities(entities: Vec<ProviderHealth>) -> Self {
        let status = if entities.iter().all(|e| e.healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        Self { status, entities }
    }
}
