/// Role policy
///
/// Pure allow/deny decisions over a decoded [`Principal`]. Every function is
/// total: a principal without a recognized role is denied everything.

use super::jwt::Principal;
use super::role::Role;

/// True iff the principal is an administrator
pub fn is_admin(principal: &Principal) -> bool {
    principal.role == Some(Role::Admin)
}

/// Decides whether a principal may act on a resource owned by a customer
///
/// Allowed for administrators, and for customers acting on their own
/// resources. Employees are denied even when the ids match.
pub fn can_access_customer_resource(principal: &Principal, resource_owner_id: i64) -> bool {
    match principal.role {
        Some(Role::Admin) => true,
        Some(Role::Customer) => principal.user_id == resource_owner_id,
        Some(Role::Employee) | None => false,
    }
}
