use std::net::Ipv4Addr;
use vnh_packets::{ArpFrame, ArpOp, EthernetFrame, MacAddr, IPV4_ETHER_TYPE};

/// Smallest Ethernet frame on the wire, without the FCS.
pub const MIN_FRAME_LEN: usize = 60;

/// A broadcast Ethernet/IPv4 ARP frame with the given opcode, zero padded to the Ethernet minimum
/// the way a host NIC would send it.
pub fn arp_frame_with_opcode(
    opcode: u16,
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
) -> EthernetFrame {
    let mut arp_frame = ArpFrame::ethernet_ipv4();
    arp_frame.set_opcode(opcode);
    arp_frame.set_sender_hardware_addr(sender_mac);
    arp_frame.set_sender_protocol_addr(sender_ip);
    arp_frame.set_target_hardware_addr(MacAddr::default());
    arp_frame.set_target_protocol_addr(target_ip);

    let pad_len = MIN_FRAME_LEN - arp_frame.frame_ref().as_bytes().len();
    arp_frame.set_trailer(&vec![0; pad_len]);

    let mut frame = arp_frame.frame();
    frame.set_dest_mac(MacAddr::BROADCAST);
    frame.set_src_mac(sender_mac);
    frame
}

/// "Who has `target_ip`? Tell `sender_ip`."
pub fn arp_request_frame(
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
) -> EthernetFrame {
    arp_frame_with_opcode(ArpOp::Request as u16, sender_mac, sender_ip, target_ip)
}

/// A minimal IPv4 frame. Only the ether type matters to the proxy.
pub fn ipv4_frame(src_mac: MacAddr) -> EthernetFrame {
    let mut header = vec![0u8; 20];
    header[0] = 0x45;
    header[3] = 20;

    let mut frame = EthernetFrame::empty();
    frame.set_payload(&header);
    frame.set_ether_type(IPV4_ETHER_TYPE);
    frame.set_src_mac(src_mac);
    frame.set_dest_mac(MacAddr::new([0x02, 0, 0, 0, 0, 1]));
    frame
}
