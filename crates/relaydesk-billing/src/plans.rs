// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plan catalog built from `[[billing.plans]]`.

use std::collections::BTreeMap;
use std::str::FromStr;

use relaydesk_config::model::BillingConfig;
use relaydesk_core::RelaydeskError;
use relaydesk_core::types::BillingInterval;
use serde::Serialize;

/// Name of the implicit free tier; tenants without an active subscription are on it.
pub const FREE_PLAN: &str = "starter";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub name: String,
    pub amount: i64,
    pub currency: String,
    pub interval: BillingInterval,
}

#[derive(Debug, Clone, Default)]
pub struct PlanCatalog {
    plans: BTreeMap<String, Plan>,
}

impl PlanCatalog {
    pub fn from_config(config: &BillingConfig) -> Result<Self, RelaydeskError> {
        let mut plans = BTreeMap::new();
        for plan in &config.plans {
            let interval = BillingInterval::from_str(&plan.interval).map_err(|_| {
                RelaydeskError::Config(format!(
                    "plan `{}` has unknown interval `{}`",
                    plan.name, plan.interval
                ))
            })?;
            plans.insert(
                plan.name.clone(),
                Plan {
                    name: plan.name.clone(),
                    amount: plan.amount,
                    currency: config.currency.clone(),
                    interval,
                },
            );
        }
        Ok(Self { plans })
    }

    pub fn get(&self, name: &str) -> Result<&Plan, RelaydeskError> {
        self.plans
            .get(name)
            .ok_or_else(|| RelaydeskError::not_found("plan", name))
    }

    /// Paid plans, sorted by name.
    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.values()
    }
}
