//! Host-provided checks the engine consults but does not own

use crate::core::types::ActorId;

/// Answers whether an actor satisfies a node's external requirement token
pub trait ExternalUnlockOracle {
    fn is_satisfied(&self, actor: ActorId, token: &str) -> bool;
}

impl<F> ExternalUnlockOracle for F
where
    F: Fn(ActorId, &str) -> bool,
{
    fn is_satisfied(&self, actor: ActorId, token: &str) -> bool {
        self(actor, token)
    }
}

/// Oracle for hosts without external requirements: every token passes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalRequirements;

impl ExternalUnlockOracle for NoExternalRequirements {
    fn is_satisfied(&self, _actor: ActorId, _token: &str) -> bool {
        true
    }
}

/// Gates and pays for respecs in host currency
pub trait AffordabilityOracle {
    fn can_afford(&self, actor: ActorId, cost: u32) -> bool;

    /// Deduct `cost` after a respec went through
    fn charge(&mut self, _actor: ActorId, _cost: u32) {}
}

impl<F> AffordabilityOracle for F
where
    F: Fn(ActorId, u32) -> bool,
{
    fn can_afford(&self, actor: ActorId, cost: u32) -> bool {
        self(actor, cost)
    }
}

/// Simple balance-backed affordability, mostly useful for tools and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wallet {
    pub balance: u32,
}

impl Wallet {
    pub fn new(balance: u32) -> Self {
        Self { balance }
    }
}

impl AffordabilityOracle for Wallet {
    fn can_afford(&self, _actor: ActorId, cost: u32) -> bool {
        self.balance >= cost
    }

    fn charge(&mut self, _actor: ActorId, cost: u32) {
        self.balance = self.balance.saturating_sub(cost);
    }
}
