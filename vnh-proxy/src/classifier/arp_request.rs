use crate::classifier::Classifier;
use crate::types::ArpRequest;
use std::convert::TryFrom;
use vnh_packets::{
    ArpFrame, ArpHardwareType, ArpOp, EthernetFrame, ARP_ETHER_TYPE, ETHERNET_ADDR_LEN,
    IPV4_ADDR_LEN, IPV4_ETHER_TYPE,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArpClass {
    Request(ArpRequest),
    NotApplicable,
}

/// Picks Ethernet/IPv4 ARP requests out of the packet-in stream.
///
/// Anything else, including replies, other hardware or protocol types and payloads that do not
/// decode, is `NotApplicable`.
#[derive(Default)]
pub struct ArpRequestClassifier {}

impl ArpRequestClassifier {
    pub fn new() -> Self {
        ArpRequestClassifier {}
    }
}

impl Classifier for ArpRequestClassifier {
    type Packet = EthernetFrame;
    type Class = ArpClass;

    fn classify(&self, packet: &Self::Packet) -> Self::Class {
        // Cheap check before copying the frame into an ArpFrame
        if packet.ether_type() != ARP_ETHER_TYPE {
            return ArpClass::NotApplicable;
        }

        let arp_frame = match ArpFrame::try_from(packet.clone()) {
            Ok(arp_frame) => arp_frame,
            Err(_) => return ArpClass::NotApplicable,
        };

        if arp_frame.hardware_type() != ArpHardwareType::Ethernet as u16
            || arp_frame.protocol_type() != IPV4_ETHER_TYPE
            || arp_frame.hardware_addr_len() != ETHERNET_ADDR_LEN
            || arp_frame.protocol_addr_len() != IPV4_ADDR_LEN
            || arp_frame.opcode() != ArpOp::Request as u16
        {
            return ArpClass::NotApplicable;
        }

        match (
            arp_frame.sender_ipv4_addr(),
            arp_frame.sender_mac_addr(),
            arp_frame.target_ipv4_addr(),
        ) {
            (Some(sender_ip), Some(sender_mac), Some(target_ip)) => ArpClass::Request(ArpRequest {
                sender_ip,
                sender_mac,
                target_ip,
            }),
            _ => ArpClass::NotApplicable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::packet_generators::{arp_frame_with_opcode, arp_request_frame, ipv4_frame};
    use std::net::Ipv4Addr;
    use vnh_packets::MacAddr;

    const SENDER_MAC: MacAddr = MacAddr {
        bytes: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
    };

    #[test]
    fn extracts_request_fields() {
        let frame = arp_request_frame(
            SENDER_MAC,
            Ipv4Addr::new(10, 0, 0, 9),
            Ipv4Addr::new(10, 0, 0, 5),
        );

        assert_eq!(
            ArpRequestClassifier::new().classify(&frame),
            ArpClass::Request(ArpRequest {
                sender_ip: Ipv4Addr::new(10, 0, 0, 9),
                sender_mac: SENDER_MAC,
                target_ip: Ipv4Addr::new(10, 0, 0, 5),
            })
        );
    }

    #[test]
    fn rejects_non_arp_ether_types() {
        let classifier = ArpRequestClassifier::new();
        assert_eq!(classifier.classify(&ipv4_frame(SENDER_MAC)), ArpClass::NotApplicable);

        for ether_type in &[0x0000, 0x86DD, 0x8100, 0x8035, 0xffff] {
            let mut frame = arp_request_frame(
                SENDER_MAC,
                Ipv4Addr::new(10, 0, 0, 9),
                Ipv4Addr::new(10, 0, 0, 5),
            );
            frame.set_ether_type(*ether_type);
            assert_eq!(classifier.classify(&frame), ArpClass::NotApplicable);
        }
    }

    #[test]
    fn rejects_non_request_opcodes() {
        let classifier = ArpRequestClassifier::new();
        for opcode in &[0, ArpOp::Reply as u16, 3, 4, 0xffff] {
            let frame = arp_frame_with_opcode(
                *opcode,
                SENDER_MAC,
                Ipv4Addr::new(10, 0, 0, 9),
                Ipv4Addr::new(10, 0, 0, 5),
            );
            assert_eq!(classifier.classify(&frame), ArpClass::NotApplicable);
        }
    }

    #[test]
    fn rejects_truncated_payload() {
        let mut frame = arp_request_frame(
            SENDER_MAC,
            Ipv4Addr::new(10, 0, 0, 9),
            Ipv4Addr::new(10, 0, 0, 5),
        );
        let payload = frame.payload()[..20].to_vec();
        frame.set_payload(&payload);
        assert_eq!(
            ArpRequestClassifier::new().classify(&frame),
            ArpClass::NotApplicable
        );
    }

    #[test]
    fn rejects_non_ipv4_protocol() {
        let mut arp_frame = ArpFrame::try_from(arp_request_frame(
            SENDER_MAC,
            Ipv4Addr::new(10, 0, 0, 9),
            Ipv4Addr::new(10, 0, 0, 5),
        ))
        .unwrap();
        arp_frame.set_protocol_type(0x86DD);
        assert_eq!(
            ArpRequestClassifier::new().classify(&arp_frame.frame()),
            ArpClass::NotApplicable
        );
    }

    #[test]
    fn accepts_minimum_size_padding() {
        let frame = arp_request_frame(
            SENDER_MAC,
            Ipv4Addr::new(10, 0, 0, 9),
            Ipv4Addr::new(10, 0, 0, 5),
        );
        // Generated requests are padded to the 60 byte Ethernet minimum
        assert_eq!(frame.as_bytes().len(), 60);
        match ArpRequestClassifier::new().classify(&frame) {
            ArpClass::Request(_) => {}
            ArpClass::NotApplicable => panic!("padded request should classify"),
        }
    }
}
