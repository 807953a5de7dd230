use crate::types::ArpRequest;
use vnh_packets::{ArpFrame, ArpOp, EthernetFrame, MacAddr};

/// Appended after the ARP body of every reply. It carries no meaning; it keeps replies
/// byte-identical to the ones the controller has always sent.
pub const REPLY_FILLER: [u8; 1] = [0x01];

/// Builds ARP replies for requests whose target IP has a virtual MAC. Holds no state, so one
/// instance serves every worker.
#[derive(Default)]
pub struct ReplySynthesizer {}

impl ReplySynthesizer {
    pub fn new() -> Self {
        ReplySynthesizer {}
    }

    ///
    /// The reply that claims `virtual_mac` owns the requested IP, addressed back to whoever
    /// asked:
    ///
    /// Ethernet: dst = request sender MAC, src = virtual MAC, type = ARP
    /// ARP: Ethernet/IPv4, op = REPLY
    ///     sender = (virtual MAC, requested IP)
    ///     target = (request sender MAC, request sender IP)
    ///
    pub fn synthesize(&self, request: &ArpRequest, virtual_mac: MacAddr) -> EthernetFrame {
        let mut arp_frame = ArpFrame::ethernet_ipv4();
        arp_frame.set_opcode(ArpOp::Reply as u16);
        arp_frame.set_sender_hardware_addr(virtual_mac);
        arp_frame.set_sender_protocol_addr(request.target_ip);
        arp_frame.set_target_hardware_addr(request.sender_mac);
        arp_frame.set_target_protocol_addr(request.sender_ip);
        arp_frame.set_trailer(&REPLY_FILLER);

        let mut frame = arp_frame.frame();
        frame.set_dest_mac(request.sender_mac);
        frame.set_src_mac(virtual_mac);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;
    use std::net::Ipv4Addr;
    use vnh_packets::{ArpHardwareType, ARP_ETHER_TYPE, IPV4_ETHER_TYPE};

    fn build_reply(request: &ArpRequest, virtual_mac: MacAddr) -> EthernetFrame {
        ReplySynthesizer::new().synthesize(request, virtual_mac)
    }

    fn scenario_request() -> ArpRequest {
        ArpRequest {
            sender_ip: Ipv4Addr::new(10, 0, 0, 9),
            sender_mac: MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            target_ip: Ipv4Addr::new(10, 0, 0, 5),
        }
    }

    #[test]
    fn reply_headers() {
        let virtual_mac = MacAddr::from_u64(170).unwrap();
        let reply = build_reply(&scenario_request(), virtual_mac);

        assert_eq!(reply.dest_mac(), scenario_request().sender_mac);
        assert_eq!(reply.src_mac(), virtual_mac);
        assert_eq!(reply.ether_type(), ARP_ETHER_TYPE);

        let arp_frame = ArpFrame::try_from(reply).unwrap();
        assert_eq!(arp_frame.hardware_type(), ArpHardwareType::Ethernet as u16);
        assert_eq!(arp_frame.protocol_type(), IPV4_ETHER_TYPE);
        assert_eq!(arp_frame.hardware_addr_len(), 6);
        assert_eq!(arp_frame.protocol_addr_len(), 4);
        assert_eq!(arp_frame.opcode(), ArpOp::Reply as u16);
        assert_eq!(arp_frame.sender_mac_addr(), Some(virtual_mac));
        assert_eq!(arp_frame.sender_ipv4_addr(), Some(Ipv4Addr::new(10, 0, 0, 5)));
    }

    #[test]
    fn reply_returns_to_origin() {
        let requests = vec![
            scenario_request(),
            ArpRequest {
                sender_ip: Ipv4Addr::new(192, 168, 1, 254),
                sender_mac: MacAddr::new([0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54]),
                target_ip: Ipv4Addr::new(2, 0, 0, 129),
            },
            ArpRequest {
                sender_ip: Ipv4Addr::new(0, 0, 0, 0),
                sender_mac: MacAddr::new([0x02, 0, 0, 0, 0, 1]),
                target_ip: Ipv4Addr::new(172, 16, 0, 1),
            },
        ];

        for request in requests {
            let arp_frame =
                ArpFrame::try_from(build_reply(&request, MacAddr::new([0x0a; 6]))).unwrap();
            assert_eq!(arp_frame.target_ipv4_addr(), Some(request.sender_ip));
            assert_eq!(arp_frame.target_mac_addr(), Some(request.sender_mac));
            assert_eq!(arp_frame.sender_ipv4_addr(), Some(request.target_ip));
        }
    }

    #[test]
    fn reply_bytes() {
        let reply = build_reply(&scenario_request(), MacAddr::from_u64(170).unwrap());

        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            // Ethernet
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55,
            0x00, 0x00, 0x00, 0x00, 0x00, 0xaa,
            0x08, 0x06,
            // ARP
            0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x02,
            0x00, 0x00, 0x00, 0x00, 0x00, 0xaa, 10, 0, 0, 5,
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 10, 0, 0, 9,
            // Filler
            0x01,
        ];
        assert_eq!(reply.as_bytes(), expected.as_slice());
    }
}
