use crate::{EthernetFrame, MacAddr, ARP_ETHER_TYPE, IPV4_ETHER_TYPE};
use std::convert::TryFrom;
use std::net::Ipv4Addr;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArpOp {
    Request = 1,
    Reply = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArpHardwareType {
    Ethernet = 1,
}

pub const ETHERNET_ADDR_LEN: u8 = 6;
pub const IPV4_ADDR_LEN: u8 = 4;

const HARDWARE_TYPE_RANGE: (usize, usize) = (0, 2);
const PROTOCOL_TYPE_RANGE: (usize, usize) = (2, 4);
const HARDWARE_ADDR_LEN_RANGE: (usize, usize) = (4, 5);
const PROTOCOL_ADDR_LEN_RANGE: (usize, usize) = (5, 6);
const OPCODE_RANGE: (usize, usize) = (6, 8);

const FIXED_HEADER_LEN: usize = 8;

///
/// EthernetFrame wrapper with getters/setters for the packet structure described in RFC 826
/// https://tools.ietf.org/html/rfc826
///
/// Bytes after the address fields (Ethernet minimum-size padding, or a trailer written with
/// `set_trailer`) are carried along untouched.
///
#[derive(Clone, Debug)]
pub struct ArpFrame {
    frame: EthernetFrame,
}

impl ArpFrame {
    ///
    /// Constructs a new packet with an ARP ether type and a payload big enough for all ARP
    /// fields, given some hardware/protocol address lengths.
    ///
    pub fn new(hardware_addr_len: u8, protocol_addr_len: u8) -> Self {
        let payload_len = body_len(hardware_addr_len, protocol_addr_len);
        let frame = EthernetFrame::encap_arp(&vec![0; payload_len]);

        let mut arp_frame = ArpFrame { frame };
        arp_frame.set_hardware_addr_len(hardware_addr_len);
        arp_frame.set_protocol_addr_len(protocol_addr_len);
        arp_frame
    }

    /// An Ethernet/IPv4 frame with the type and length fields already filled in.
    pub fn ethernet_ipv4() -> Self {
        let mut arp_frame = ArpFrame::new(ETHERNET_ADDR_LEN, IPV4_ADDR_LEN);
        arp_frame.set_hardware_type(ArpHardwareType::Ethernet as u16);
        arp_frame.set_protocol_type(IPV4_ETHER_TYPE);
        arp_frame
    }

    pub fn hardware_type(&self) -> u16 {
        let (start, end) = HARDWARE_TYPE_RANGE;
        be_u16(self.arp_data(start, end))
    }

    pub fn protocol_type(&self) -> u16 {
        let (start, end) = PROTOCOL_TYPE_RANGE;
        be_u16(self.arp_data(start, end))
    }

    pub fn hardware_addr_len(&self) -> u8 {
        let (start, end) = HARDWARE_ADDR_LEN_RANGE;
        self.arp_data(start, end)[0]
    }

    pub fn protocol_addr_len(&self) -> u8 {
        let (start, end) = PROTOCOL_ADDR_LEN_RANGE;
        self.arp_data(start, end)[0]
    }

    pub fn opcode(&self) -> u16 {
        let (start, end) = OPCODE_RANGE;
        be_u16(self.arp_data(start, end))
    }

    pub fn sender_hardware_addr(&self) -> &[u8] {
        let (start, end) = self.sender_hardware_addr_range();
        self.arp_data(start, end)
    }

    pub fn sender_protocol_addr(&self) -> &[u8] {
        let (start, end) = self.sender_protocol_addr_range();
        self.arp_data(start, end)
    }

    pub fn target_hardware_addr(&self) -> &[u8] {
        let (start, end) = self.target_hardware_addr_range();
        self.arp_data(start, end)
    }

    pub fn target_protocol_addr(&self) -> &[u8] {
        let (start, end) = self.target_protocol_addr_range();
        self.arp_data(start, end)
    }

    /// `None` unless the hardware address length is 6.
    pub fn sender_mac_addr(&self) -> Option<MacAddr> {
        mac_from_slice(self.sender_hardware_addr())
    }

    /// `None` unless the protocol address length is 4.
    pub fn sender_ipv4_addr(&self) -> Option<Ipv4Addr> {
        ipv4_from_slice(self.sender_protocol_addr())
    }

    pub fn target_mac_addr(&self) -> Option<MacAddr> {
        mac_from_slice(self.target_hardware_addr())
    }

    pub fn target_ipv4_addr(&self) -> Option<Ipv4Addr> {
        ipv4_from_slice(self.target_protocol_addr())
    }

    /// Everything in the Ethernet payload after the ARP address fields.
    pub fn trailer(&self) -> &[u8] {
        let start = self.frame.payload_offset + self.body_len();
        &self.frame.data[start..]
    }

    pub fn set_hardware_type(&mut self, htype: u16) {
        let (start, end) = HARDWARE_TYPE_RANGE;
        self.set_arp_data(&htype.to_be_bytes(), start, end);
    }

    pub fn set_protocol_type(&mut self, ptype: u16) {
        let (start, end) = PROTOCOL_TYPE_RANGE;
        self.set_arp_data(&ptype.to_be_bytes(), start, end);
    }

    pub fn set_hardware_addr_len(&mut self, len: u8) {
        let (start, end) = HARDWARE_ADDR_LEN_RANGE;
        self.set_arp_data(&[len], start, end);
    }

    pub fn set_protocol_addr_len(&mut self, len: u8) {
        let (start, end) = PROTOCOL_ADDR_LEN_RANGE;
        self.set_arp_data(&[len], start, end);
    }

    pub fn set_opcode(&mut self, code: u16) {
        let (start, end) = OPCODE_RANGE;
        self.set_arp_data(&code.to_be_bytes(), start, end);
    }

    // The address setters assume the length fields match the address type being written,
    // which `ethernet_ipv4` guarantees.
    pub fn set_sender_hardware_addr(&mut self, addr: MacAddr) {
        let (start, end) = self.sender_hardware_addr_range();
        self.set_arp_data(&addr.bytes, start, end);
    }

    pub fn set_sender_protocol_addr(&mut self, addr: Ipv4Addr) {
        let (start, end) = self.sender_protocol_addr_range();
        self.set_arp_data(&addr.octets(), start, end);
    }

    pub fn set_target_hardware_addr(&mut self, addr: MacAddr) {
        let (start, end) = self.target_hardware_addr_range();
        self.set_arp_data(&addr.bytes, start, end);
    }

    pub fn set_target_protocol_addr(&mut self, addr: Ipv4Addr) {
        let (start, end) = self.target_protocol_addr_range();
        self.set_arp_data(&addr.octets(), start, end);
    }

    /// Replaces whatever follows the ARP address fields with `trailer`.
    pub fn set_trailer(&mut self, trailer: &[u8]) {
        let end = self.frame.payload_offset + self.body_len();
        self.frame.data.truncate(end);
        self.frame.data.extend_from_slice(trailer);
    }

    pub fn frame_ref(&self) -> &EthernetFrame {
        &self.frame
    }

    // Move ownership of the frame back to the caller
    pub fn frame(self) -> EthernetFrame {
        self.frame
    }

    fn body_len(&self) -> usize {
        body_len(self.hardware_addr_len(), self.protocol_addr_len())
    }

    // Returns the bytes in the ethernet frame between start and end, exclusive
    fn arp_data(&self, start: usize, end: usize) -> &[u8] {
        let frame_offset_start = self.frame.payload_offset + start;
        let frame_offset_end = self.frame.payload_offset + end;
        &self.frame.data[frame_offset_start..frame_offset_end]
    }

    fn set_arp_data(&mut self, bytes: &[u8], start: usize, end: usize) {
        let frame_offset_start = self.frame.payload_offset + start;
        let frame_offset_end = self.frame.payload_offset + end;
        self.frame.data[frame_offset_start..frame_offset_end].copy_from_slice(bytes);
    }

    fn sender_hardware_addr_range(&self) -> (usize, usize) {
        let hlen = self.hardware_addr_len() as usize;

        let start = FIXED_HEADER_LEN;
        let end = start + hlen;
        (start, end)
    }

    fn sender_protocol_addr_range(&self) -> (usize, usize) {
        let hlen = self.hardware_addr_len() as usize;
        let plen = self.protocol_addr_len() as usize;

        let start = FIXED_HEADER_LEN + hlen;
        let end = start + plen;
        (start, end)
    }

    fn target_hardware_addr_range(&self) -> (usize, usize) {
        let hlen = self.hardware_addr_len() as usize;
        let plen = self.protocol_addr_len() as usize;

        let start = FIXED_HEADER_LEN + hlen + plen;
        let end = start + hlen;
        (start, end)
    }

    fn target_protocol_addr_range(&self) -> (usize, usize) {
        let hlen = self.hardware_addr_len() as usize;
        let plen = self.protocol_addr_len() as usize;

        let start = FIXED_HEADER_LEN + (2 * hlen) + plen;
        let end = start + plen;
        (start, end)
    }
}

impl TryFrom<EthernetFrame> for ArpFrame {
    type Error = &'static str;

    ///
    /// Decorates the given EthernetFrame with ArpFrame getters/setters.
    /// Validates
    /// - The frame has an ARP ether type
    /// - The frame payload is large enough for the hardware/protocol address lengths
    ///
    fn try_from(frame: EthernetFrame) -> Result<Self, Self::Error> {
        if frame.ether_type() != ARP_ETHER_TYPE {
            return Err("Frame does not have ARP ether type.");
        };

        let arp_frame = ArpFrame { frame };
        let payload_len = arp_frame.frame.payload().len();

        if payload_len < FIXED_HEADER_LEN {
            return Err("Frame payload is too small");
        }

        if payload_len < arp_frame.body_len() {
            return Err("Frame payload doesn't match address length fields");
        }

        Ok(arp_frame)
    }
}

fn body_len(hardware_addr_len: u8, protocol_addr_len: u8) -> usize {
    FIXED_HEADER_LEN + (2 * hardware_addr_len as usize) + (2 * protocol_addr_len as usize)
}

fn be_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

fn mac_from_slice(bytes: &[u8]) -> Option<MacAddr> {
    if bytes.len() != ETHERNET_ADDR_LEN as usize {
        return None;
    }
    let mut mac = [0u8; 6];
    mac.copy_from_slice(bytes);
    Some(MacAddr::new(mac))
}

fn ipv4_from_slice(bytes: &[u8]) -> Option<Ipv4Addr> {
    if bytes.len() != IPV4_ADDR_LEN as usize {
        return None;
    }
    Some(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]))
}
