//! Authorization rules for payment operations.
//!
//! Every payment operation asks the guard before touching storage or the
//! processor. Each check returns an `AuthorizationResult` and logs it.

use crate::domain::foundation::{Actor, AuthorizationResult, UserId};

use super::{LeaseSummary, Payment};

/// Stateless decision point for payment ownership rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    pub fn new() -> Self {
        Self
    }

    /// A tenant may open an intent only against their own lease.
    pub fn can_initiate_intent(
        &self,
        tenant_id: &UserId,
        lease: &LeaseSummary,
    ) -> AuthorizationResult {
        let result = if lease.tenant_id() == tenant_id {
            AuthorizationResult::granted(
                "initiate_intent",
                "Lease",
                lease.id.to_string(),
                tenant_id.as_str(),
            )
        } else {
            AuthorizationResult::denied(
                "initiate_intent",
                "Lease",
                lease.id.to_string(),
                tenant_id.as_str(),
                "Only the lease's tenant can pay against this lease",
            )
        };
        result.log();
        result
    }

    /// A landlord may record a manual payment only on a lease they own.
    pub fn can_record_manual(
        &self,
        landlord_id: &UserId,
        lease: &LeaseSummary,
    ) -> AuthorizationResult {
        let result = if &lease.landlord_id == landlord_id {
            AuthorizationResult::granted(
                "record_manual",
                "Lease",
                lease.id.to_string(),
                landlord_id.as_str(),
            )
        } else {
            AuthorizationResult::denied(
                "record_manual",
                "Lease",
                lease.id.to_string(),
                landlord_id.as_str(),
                "Only the owning landlord can record payments for this lease",
            )
        };
        result.log();
        result
    }

    /// The payment's tenant, the owning landlord, and admins may read a payment.
    pub fn can_read(
        &self,
        actor: &Actor,
        payment: &Payment,
        lease: &LeaseSummary,
    ) -> AuthorizationResult {
        let allowed = actor.is_admin()
            || actor.user_id == payment.tenant_id
            || actor.user_id == lease.landlord_id;

        let result = if allowed {
            AuthorizationResult::granted(
                "read",
                "Payment",
                payment.id.to_string(),
                actor.user_id.as_str(),
            )
        } else {
            AuthorizationResult::denied(
                "read",
                "Payment",
                payment.id.to_string(),
                actor.user_id.as_str(),
                "You do not have access to this payment",
            )
        };
        result.log();
        result
    }

    /// The lease's tenant, the owning landlord, and admins may list its payments.
    pub fn can_list_for_lease(&self, actor: &Actor, lease: &LeaseSummary) -> AuthorizationResult {
        let allowed = actor.is_admin()
            || &actor.user_id == lease.tenant_id()
            || actor.user_id == lease.landlord_id;

        let result = if allowed {
            AuthorizationResult::granted(
                "list",
                "Lease",
                lease.id.to_string(),
                actor.user_id.as_str(),
            )
        } else {
            AuthorizationResult::denied(
                "list",
                "Lease",
                lease.id.to_string(),
                actor.user_id.as_str(),
                "You do not have access to this lease's payments",
            )
        };
        result.log();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{LeaseId, PaymentId, PropertyId, Timestamp};
    use crate::domain::payment::{compute_fee, PaymentAmount, PaymentDraft, TenantSummary};

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn lease() -> LeaseSummary {
        LeaseSummary {
            id: LeaseId::new(),
            tenant: TenantSummary {
                id: user("tenant-a"),
                name: "Tenant A".to_string(),
                email: "a@example.com".to_string(),
            },
            property_id: PropertyId::new(),
            landlord_id: user("landlord-1"),
            monthly_rent: "1200".parse().unwrap(),
            status: "active".to_string(),
        }
    }

    fn payment_for(lease: &LeaseSummary) -> Payment {
        let amount = PaymentAmount::new("1200".parse().unwrap()).unwrap();
        let draft = PaymentDraft::for_lease(PaymentId::new(), lease, amount, "usd");
        let fee = compute_fee(&amount, 250).unwrap();
        Payment::pending_intent(draft, "pi_1", Timestamp::now(), fee)
    }

    // ══════════════════════════════════════════════════════════════
    // can_initiate_intent
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn lease_tenant_can_initiate_intent() {
        let guard = AuthorizationGuard::new();
        assert!(guard.can_initiate_intent(&user("tenant-a"), &lease()).is_granted());
    }

    #[test]
    fn other_tenant_cannot_initiate_intent() {
        let guard = AuthorizationGuard::new();
        let result = guard.can_initiate_intent(&user("tenant-b"), &lease());
        assert!(result.is_denied());
        assert!(result.denial_reason.is_some());
    }

    #[test]
    fn landlord_cannot_initiate_intent_for_tenant() {
        let guard = AuthorizationGuard::new();
        assert!(guard.can_initiate_intent(&user("landlord-1"), &lease()).is_denied());
    }

    // ══════════════════════════════════════════════════════════════
    // can_record_manual
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn owning_landlord_can_record_manual() {
        let guard = AuthorizationGuard::new();
        assert!(guard.can_record_manual(&user("landlord-1"), &lease()).is_granted());
    }

    #[test]
    fn other_landlord_cannot_record_manual() {
        let guard = AuthorizationGuard::new();
        assert!(guard.can_record_manual(&user("landlord-2"), &lease()).is_denied());
    }

    // ══════════════════════════════════════════════════════════════
    // can_read / can_list_for_lease
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn payment_tenant_landlord_and_admin_can_read() {
        let guard = AuthorizationGuard::new();
        let lease = lease();
        let payment = payment_for(&lease);

        assert!(guard.can_read(&Actor::tenant(user("tenant-a")), &payment, &lease).is_granted());
        assert!(guard.can_read(&Actor::landlord(user("landlord-1")), &payment, &lease).is_granted());
        assert!(guard.can_read(&Actor::admin(user("ops-1")), &payment, &lease).is_granted());
    }

    #[test]
    fn other_tenant_cannot_read() {
        let guard = AuthorizationGuard::new();
        let lease = lease();
        let payment = payment_for(&lease);

        let result = guard.can_read(&Actor::tenant(user("tenant-b")), &payment, &lease);
        assert!(result.is_denied());
    }

    #[test]
    fn other_landlord_cannot_list_lease_payments() {
        let guard = AuthorizationGuard::new();
        let lease = lease();

        assert!(guard.can_list_for_lease(&Actor::landlord(user("landlord-2")), &lease).is_denied());
        assert!(guard.can_list_for_lease(&Actor::tenant(user("tenant-a")), &lease).is_granted());
        assert!(guard.can_list_for_lease(&Actor::admin(user("ops-1")), &lease).is_granted());
    }
}
