use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Point-to-point links packed into each third-octet bucket.
pub const LINKS_PER_BUCKET: i64 = 120;

/// Third octet used by customer 0.
pub const FIRST_THIRD_OCTET: i64 = 10;

/// Number of customer ids the 10.20.0.0/16 scheme can address.
/// Ids at or above this value would push the third octet past 255.
pub const CAPACITY: i64 = LINKS_PER_BUCKET * (256 - FIRST_THIRD_OCTET);

const FIRST_OCTET: u8 = 10;
const SECOND_OCTET: u8 = 20;

/// Network assignment for a customer's point-to-point uplink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterAssignment {
    pub subnet_cidr: String,
    pub gateway_ip: String,
    pub customer_ip: String,
}

/// Reasons a customer id cannot be mapped to a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    InvalidCustomerId(i64),
    CapacityExceeded { customer_id: i64, capacity: i64 },
}

impl std::fmt::Display for AllocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationError::InvalidCustomerId(id) => {
                write!(f, "invalid customer id: {}", id)
            }
            AllocationError::CapacityExceeded { customer_id, capacity } => write!(
                f,
                "customer id {} exceeds router address capacity ({} links)",
                customer_id, capacity
            ),
        }
    }
}

impl std::error::Error for AllocationError {}

/// Derive the point-to-point block for a customer.
///
/// Host pairs are packed at stride 2 in the fourth octet, 120 per bucket,
/// then roll over into the next third octet starting at 10.20.10.x.
pub fn assign_point_to_point_block(customer_id: i64) -> Result<RouterAssignment, AllocationError> {
    if customer_id < 0 {
        return Err(AllocationError::InvalidCustomerId(customer_id));
    }
    if customer_id >= CAPACITY {
        return Err(AllocationError::CapacityExceeded {
            customer_id,
            capacity: CAPACITY,
        });
    }

    // Both casts are in range: third <= 255, base <= 238.
    let third = (FIRST_THIRD_OCTET + customer_id / LINKS_PER_BUCKET) as u8;
    let base = ((customer_id % LINKS_PER_BUCKET) * 2) as u8;

    let network = Ipv4Addr::new(FIRST_OCTET, SECOND_OCTET, third, base);
    let gateway = Ipv4Addr::new(FIRST_OCTET, SECOND_OCTET, third, base + 1);
    let customer = Ipv4Addr::new(FIRST_OCTET, SECOND_OCTET, third, base + 2);

    Ok(RouterAssignment {
        subnet_cidr: format!("{}/30", network),
        gateway_ip: gateway.to_string(),
        customer_ip: customer.to_string(),
    })
}
