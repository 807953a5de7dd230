/// File to contain the per-event types that flow through the proxy
use std::net::Ipv4Addr;
use vnh_packets::{EthernetFrame, MacAddr};

/// SwitchContext:
///
/// Where a frame entered the fabric. Replies go back out of `in_port` on the same switch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SwitchContext {
    pub switch_id: u64,
    pub in_port: u32,
}

/// PacketIn:
///
/// One frame delivered by a switch to the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketIn {
    pub context: SwitchContext,
    pub frame: EthernetFrame,
}

impl PacketIn {
    pub fn new(switch_id: u64, in_port: u32, frame: EthernetFrame) -> Self {
        PacketIn {
            context: SwitchContext { switch_id, in_port },
            frame,
        }
    }
}

/// The fields of an ARP request that a reply needs. Lives only as long as the event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArpRequest {
    pub sender_ip: Ipv4Addr,
    pub sender_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

/// What the surrounding controller pipeline should do with the event after us.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Continue,
    Stop,
}
