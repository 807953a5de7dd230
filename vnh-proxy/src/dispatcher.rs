use crate::classifier::{ArpClass, ArpRequestClassifier, Classifier};
use crate::injector::PacketInjector;
use crate::mapping::AddressMapper;
use crate::processor::ReplySynthesizer;
use crate::types::{Command, PacketIn};
use tracing::{info, trace, trace_span, warn};

/// How far a single packet-in got through the proxy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Not an Ethernet/IPv4 ARP request.
    NotApplicable,
    /// A request for an IP that has no virtual MAC.
    NoMapping,
    /// A reply was handed to the injector.
    Replied,
    /// A reply was built but the switch write failed.
    InjectFailed,
}

///
/// Entry point for packet-in events.
///
/// Each event runs classify, map, synthesize, inject in order and stops at the first step that
/// has nothing to do. The dispatcher keeps no state between events, so one instance can be
/// shared by any number of worker threads.
///
pub struct EventDispatcher<M, I> {
    classifier: ArpRequestClassifier,
    synthesizer: ReplySynthesizer,
    mapper: M,
    injector: I,
}

impl<M: AddressMapper, I: PacketInjector> EventDispatcher<M, I> {
    pub fn new(mapper: M, injector: I) -> Self {
        EventDispatcher {
            classifier: ArpRequestClassifier::new(),
            synthesizer: ReplySynthesizer::new(),
            mapper,
            injector,
        }
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    /// Handles one event and tells the controller to keep going. Other listeners still see ARP
    /// traffic we answered, so this never returns `Command::Stop`.
    pub fn dispatch(&self, event: &PacketIn) -> Command {
        self.handle(event);
        Command::Continue
    }

    /// Same as `dispatch`, but reports what happened instead of a pipeline command.
    pub fn handle(&self, event: &PacketIn) -> Outcome {
        let context = event.context;
        let span = trace_span!("packet_in", switch = context.switch_id, port = context.in_port);
        let _enter = span.enter();

        let request = match self.classifier.classify(&event.frame) {
            ArpClass::Request(request) => request,
            ArpClass::NotApplicable => {
                trace!(ether_type = event.frame.ether_type(), "not an ARP request");
                return Outcome::NotApplicable;
            }
        };

        info!(
            "Received ARP request from {} ({}) at {:#x} port {} for target {}",
            request.sender_mac, request.sender_ip, context.switch_id, context.in_port, request.target_ip
        );

        let virtual_mac = match self.mapper.resolve(request.target_ip) {
            Some(virtual_mac) => virtual_mac,
            None => {
                info!("No mapping for {}", request.target_ip);
                return Outcome::NoMapping;
            }
        };
        info!("Mapping done {} --> {}", request.target_ip, virtual_mac);

        let reply = self.synthesizer.synthesize(&request, virtual_mac);

        match self.injector.inject(&reply, context.switch_id, context.in_port) {
            Ok(()) => {
                info!(
                    "Sent ARP reply to {:#x} at port {}",
                    context.switch_id, context.in_port
                );
                Outcome::Replied
            }
            Err(err) => {
                warn!("Dropping ARP reply for {}: {}", request.sender_ip, err);
                Outcome::InjectFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InjectError;
    use crate::injector::PacketOut;
    use crate::mapping::MappingTable;
    use crate::types::ArpRequest;
    use crate::utils::test::packet_collectors::RecordingInjector;
    use crate::utils::test::packet_generators::{arp_frame_with_opcode, arp_request_frame, ipv4_frame};
    use std::convert::TryFrom;
    use std::net::Ipv4Addr;
    use vnh_packets::{ArpFrame, ArpOp, MacAddr};

    const SENDER_MAC: MacAddr = MacAddr {
        bytes: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
    };

    fn dispatcher() -> EventDispatcher<MappingTable, RecordingInjector> {
        EventDispatcher::new(
            MappingTable::parse("10.0.0.5\t170\n"),
            RecordingInjector::new(),
        )
    }

    fn request_for(target_ip: Ipv4Addr) -> PacketIn {
        PacketIn::new(
            0x5,
            3,
            arp_request_frame(SENDER_MAC, Ipv4Addr::new(10, 0, 0, 9), target_ip),
        )
    }

    #[test]
    fn mapped_request_is_answered_on_ingress_port() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.dispatch(&request_for(Ipv4Addr::new(10, 0, 0, 5))),
            Command::Continue
        );

        let sent = dispatcher.injector().packet_outs();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].switch_id, 0x5);
        assert_eq!(sent[0].out_port(), Some(3));

        let frame = sent[0].frame().unwrap();
        assert_eq!(frame.dest_mac(), SENDER_MAC);
        assert_eq!(frame.src_mac(), MacAddr::new([0, 0, 0, 0, 0, 0xaa]));
        let arp_frame = ArpFrame::try_from(frame).unwrap();
        assert_eq!(arp_frame.opcode(), ArpOp::Reply as u16);
        assert_eq!(arp_frame.sender_ipv4_addr(), Some(Ipv4Addr::new(10, 0, 0, 5)));
        assert_eq!(arp_frame.target_ipv4_addr(), Some(Ipv4Addr::new(10, 0, 0, 9)));
    }

    #[test]
    fn injected_frame_is_the_synthesized_reply() {
        let dispatcher = dispatcher();
        dispatcher.dispatch(&request_for(Ipv4Addr::new(10, 0, 0, 5)));

        let request = ArpRequest {
            sender_ip: Ipv4Addr::new(10, 0, 0, 9),
            sender_mac: SENDER_MAC,
            target_ip: Ipv4Addr::new(10, 0, 0, 5),
        };
        let expected =
            ReplySynthesizer::new().synthesize(&request, MacAddr::new([0, 0, 0, 0, 0, 0xaa]));
        let sent = dispatcher.injector().packet_outs();
        assert_eq!(sent[0].data, expected.as_bytes());
        assert_eq!(sent[0].data.len(), 43);
    }

    #[test]
    fn unmapped_request_is_not_injected() {
        let dispatcher = dispatcher();
        let event = request_for(Ipv4Addr::new(10, 0, 0, 6));
        assert_eq!(dispatcher.handle(&event), Outcome::NoMapping);
        assert_eq!(dispatcher.dispatch(&event), Command::Continue);
        assert!(dispatcher.injector().packet_outs().is_empty());
    }

    #[test]
    fn other_traffic_falls_through() {
        let dispatcher = dispatcher();
        let ipv4 = PacketIn::new(0x5, 3, ipv4_frame(SENDER_MAC));
        let reply = PacketIn::new(
            0x5,
            3,
            arp_frame_with_opcode(
                ArpOp::Reply as u16,
                SENDER_MAC,
                Ipv4Addr::new(10, 0, 0, 9),
                Ipv4Addr::new(10, 0, 0, 5),
            ),
        );

        assert_eq!(dispatcher.handle(&ipv4), Outcome::NotApplicable);
        assert_eq!(dispatcher.handle(&reply), Outcome::NotApplicable);
        assert_eq!(dispatcher.dispatch(&ipv4), Command::Continue);
        assert!(dispatcher.injector().packet_outs().is_empty());
    }

    #[test]
    fn injection_failure_still_continues() {
        let failing = |packet_out: PacketOut| -> Result<(), InjectError> {
            Err(InjectError::Rejected {
                switch_id: packet_out.switch_id,
                reason: "connection reset".to_string(),
            })
        };
        let dispatcher = EventDispatcher::new(MappingTable::parse("10.0.0.5\t170\n"), failing);
        let event = request_for(Ipv4Addr::new(10, 0, 0, 5));

        assert_eq!(dispatcher.handle(&event), Outcome::InjectFailed);
        assert_eq!(dispatcher.dispatch(&event), Command::Continue);
    }

    #[test]
    fn dispatcher_is_reentrant() {
        let dispatcher = dispatcher();
        for _ in 0..3 {
            assert_eq!(
                dispatcher.handle(&request_for(Ipv4Addr::new(10, 0, 0, 5))),
                Outcome::Replied
            );
        }
        let sent = dispatcher.injector().packet_outs();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|packet_out| packet_out == &sent[0]));
    }
}
