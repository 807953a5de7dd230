//! Line framing for the host adapter.
//!
//! A controller-side shim feeds packet-ins to the proxy one per line and reads packet-outs back
//! the same way:
//!
//! ```text
//! <switch id> <port> <frame as hex>
//! ```
//!
//! On input the port is the ingress port. On output it is the port the reply must leave by.
//! Switch ids may be written in decimal, as `0x`-prefixed hex, or as an OpenFlow datapath id
//! (`00:00:00:00:00:00:00:01`).
use crate::error::CodecError;
use crate::injector::PacketOut;
use crate::types::PacketIn;
use vnh_packets::EthernetFrame;

pub fn decode_packet_in(line: &str) -> Result<PacketIn, CodecError> {
    let mut fields = line.split_whitespace();
    let switch_id = parse_switch_id(fields.next().ok_or(CodecError::MissingField("switch id"))?)?;
    let in_port = parse_port(fields.next().ok_or(CodecError::MissingField("port"))?)?;
    let frame_hex = fields.next().ok_or(CodecError::MissingField("frame"))?;

    let frame = EthernetFrame::from_buffer(hex::decode(frame_hex)?, 0)
        .map_err(CodecError::InvalidFrame)?;
    Ok(PacketIn::new(switch_id, in_port, frame))
}

/// The line names the port of the packet-out's output action. A packet-out without one has
/// nowhere to go and is refused.
pub fn encode_packet_out(packet_out: &PacketOut) -> Result<String, CodecError> {
    let out_port = packet_out
        .out_port()
        .ok_or(CodecError::NoOutputPort(packet_out.switch_id))?;
    Ok(format!(
        "{:#x} {} {}",
        packet_out.switch_id,
        out_port,
        hex::encode(&packet_out.data)
    ))
}

pub fn parse_switch_id(field: &str) -> Result<u64, CodecError> {
    let invalid = || CodecError::InvalidSwitchId(field.to_string());

    if field.contains(':') {
        let octets = field.split(':').collect::<Vec<&str>>();
        if octets.len() != 8 || octets.iter().any(|octet| octet.len() != 2) {
            return Err(invalid());
        }
        return octets.iter().try_fold(0u64, |dpid, octet| {
            u8::from_str_radix(octet, 16)
                .map(|byte| (dpid << 8) | u64::from(byte))
                .map_err(|_| invalid())
        });
    }

    if let Some(hex_digits) = field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        return u64::from_str_radix(hex_digits, 16).map_err(|_| invalid());
    }

    field.parse::<u64>().map_err(|_| invalid())
}

fn parse_port(field: &str) -> Result<u32, CodecError> {
    field
        .parse::<u32>()
        .map_err(|_| CodecError::InvalidPort(field.to_string()))
}
