#![allow(dead_code)]

use canopy::{FieldValue, LeafSchema, LeafValue};

/// The ten-entry distribution list used across the integration tests.
pub const ADDRESSES: [&str; 10] = [
    "0x1111111111111111111111111111111111111111",
    "0x2222222222222222222222222222222222222222",
    "0x3222222222222222222222222222222222222222",
    "0x4222222222222222222222222222222222222222",
    "0x5222222222222222222222222222222222222222",
    "0x6222222222222222222222222222222222222222",
    "0x11ed089a9715adb1e294a73f4e8c40a7a455b6d3",
    "0x8222222222222222222222222222222222222222",
    "0x9222222222222222222222222222222222222222",
    "0x0222222222222222222222222222222222222222",
];

pub fn schema() -> LeafSchema {
    LeafSchema::parse(&["address", "uint256"]).unwrap()
}

pub fn values() -> Vec<LeafValue> {
    ADDRESSES
        .iter()
        .enumerate()
        .map(|(i, addr)| {
            vec![
                FieldValue::address(addr).unwrap(),
                FieldValue::uint(((i + 1) % 10) as u64),
            ]
        })
        .collect()
}
