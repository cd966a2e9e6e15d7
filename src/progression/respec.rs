//! Bulk refunds of allocated perks

use crate::core::config::RespecCosts;
use crate::core::types::School;
use crate::progression::ledger::ProgressionLedger;
use crate::progression::oracles::AffordabilityOracle;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RespecRefusal {
    #[error("respec costs {cost}, which the actor cannot afford")]
    CannotAfford { cost: u32 },
}

/// What a respec did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RespecSummary {
    /// Points returned per school, only schools that had allocations
    pub refunded: Vec<(School, u32)>,
    /// Node ids that were deallocated
    pub removed: Vec<String>,
    /// Host currency charged through the affordability oracle
    pub cost: u32,
}

impl RespecSummary {
    pub fn total_refunded(&self) -> u32 {
        self.refunded.iter().map(|(_, points)| points).sum()
    }
}

/// Resets allocations in one school or all of them, for a price
#[derive(Debug, Clone, Copy, Default)]
pub struct RespecService {
    costs: RespecCosts,
}

impl RespecService {
    pub fn new(costs: RespecCosts) -> Self {
        Self { costs }
    }

    pub fn costs(&self) -> RespecCosts {
        self.costs
    }

    /// Deallocate every node in `school`
    ///
    /// Prerequisite links are ignored: the whole school goes at once.
    pub fn respec_school(
        &self,
        ledger: &mut ProgressionLedger,
        school: School,
        oracle: &mut dyn AffordabilityOracle,
    ) -> Result<RespecSummary, RespecRefusal> {
        self.run(ledger, &[school], self.costs.per_school, oracle)
    }

    /// Deallocate every node in every school
    pub fn respec_all(
        &self,
        ledger: &mut ProgressionLedger,
        oracle: &mut dyn AffordabilityOracle,
    ) -> Result<RespecSummary, RespecRefusal> {
        self.run(ledger, &School::ALL, self.costs.all_schools, oracle)
    }

    fn run(
        &self,
        ledger: &mut ProgressionLedger,
        schools: &[School],
        cost: u32,
        oracle: &mut dyn AffordabilityOracle,
    ) -> Result<RespecSummary, RespecRefusal> {
        let actor = ledger.actor();
        if !oracle.can_afford(actor, cost) {
            tracing::debug!("Actor {} cannot afford respec (cost {})", actor, cost);
            return Err(RespecRefusal::CannotAfford { cost });
        }

        let mut summary = RespecSummary {
            cost,
            ..RespecSummary::default()
        };

        for &school in schools {
            let removed = ledger.clear_school(school);
            if removed.is_empty() {
                continue;
            }
            let points = removed.iter().map(|a| a.points_invested).sum();
            summary.refunded.push((school, points));
            summary.removed.extend(removed.into_iter().map(|a| a.node_id));
        }

        ledger.mark_dirty();
        oracle.charge(actor, cost);

        tracing::debug!(
            "Actor {} respecced {} schools: {} nodes removed, {} points refunded, charged {}",
            actor,
            schools.len(),
            summary.removed.len(),
            summary.total_refunded(),
            cost
        );

        Ok(summary)
    }
}
