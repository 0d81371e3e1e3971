//! Router provisioning: point-to-point address allocation and CPE script
//! rendering. Everything here is pure; persistence lives in
//! `db::router_provisions`.

mod allocator;
mod script;

pub use allocator::{assign_point_to_point_block, AllocationError, RouterAssignment};
#[cfg(test)]
pub use allocator::CAPACITY;
pub use script::{build_device_script, ScriptParams};

use crate::models::Customer;

pub const DEFAULT_WAN_INTERFACE: &str = "ether1";
pub const DEFAULT_LAN_INTERFACE: &str = "ether2";

/// Identity used when the customer did not pick one
pub fn default_router_identity(product: &str, customer_id: i64) -> String {
    format!("{}-CPE-{}", product, customer_id)
}

/// Assignment plus rendered script, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub assignment: RouterAssignment,
    pub script: String,
}

/// Compute the provision for a customer from its router settings
pub fn plan_for_customer(customer: &Customer, product: &str) -> Result<ProvisionPlan, AllocationError> {
    let assignment = assign_point_to_point_block(customer.id)?;

    let identity = match customer.router_identity.as_deref() {
        Some(identity) if !identity.is_empty() => identity.to_string(),
        _ => default_router_identity(product, customer.id),
    };
    let wan = non_empty_or(&customer.wan_interface, DEFAULT_WAN_INTERFACE);
    let lan = non_empty_or(&customer.lan_interface, DEFAULT_LAN_INTERFACE);

    let script = build_device_script(&ScriptParams {
        product,
        customer_name: &customer.name,
        router_identity: &identity,
        wan_interface: wan,
        lan_interface: lan,
        gateway_ip: &assignment.gateway_ip,
        customer_ip: &assignment.customer_ip,
    });

    Ok(ProvisionPlan { assignment, script })
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}
