//! The switch-facing output path.
//!
//! A reply leaves the controller as a packet-out carrying the whole frame and a single output
//! action. Nothing is buffered on the switch and the packet-out does not claim to come from any
//! port, since the controller originated it.
use crate::error::InjectError;
use vnh_packets::EthernetFrame;

mod channel;
pub use self::channel::*;

/// OpenFlow 1.3 `OFPP_ANY`: no particular ingress port.
pub const OFPP_ANY: u32 = 0xffff_ffff;

/// OpenFlow 1.3 `OFP_NO_BUFFER`: the packet-out carries the full frame.
pub const OFP_NO_BUFFER: u32 = 0xffff_ffff;

/// OpenFlow 1.3 `OFPCML_NO_BUFFER`: send the whole packet, do not truncate.
pub const OFPCML_NO_BUFFER: u16 = 0xffff;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Output { port: u32, max_len: u16 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketOut {
    pub switch_id: u64,
    pub buffer_id: u32,
    pub in_port: u32,
    pub actions: Vec<Action>,
    pub data: Vec<u8>,
}

impl PacketOut {
    /// A packet-out that emits `frame` on `out_port` of `switch_id` and nowhere else.
    pub fn output_to(switch_id: u64, out_port: u32, frame: &EthernetFrame) -> Self {
        PacketOut {
            switch_id,
            buffer_id: OFP_NO_BUFFER,
            in_port: OFPP_ANY,
            actions: vec![Action::Output {
                port: out_port,
                max_len: OFPCML_NO_BUFFER,
            }],
            data: frame.as_bytes().to_vec(),
        }
    }

    /// The carried bytes as an Ethernet frame.
    pub fn frame(&self) -> Result<EthernetFrame, &'static str> {
        EthernetFrame::from_buffer(self.data.clone(), 0)
    }

    /// Port of the first output action.
    pub fn out_port(&self) -> Option<u32> {
        self.actions.iter().find_map(|action| match action {
            Action::Output { port, .. } => Some(*port),
        })
    }
}

///
/// Hands packet-outs to a switch's write path.
///
/// Implementors only provide `send`. Failures are reported once and never retried; ARP
/// requesters retry on their own.
///
/// Any `Fn(PacketOut) -> Result<(), InjectError>` closure is an injector, which is the easiest
/// way to adapt a controller's own write call.
///
pub trait PacketInjector: Send + Sync {
    fn send(&self, packet_out: PacketOut) -> Result<(), InjectError>;

    fn inject(&self, frame: &EthernetFrame, switch_id: u64, out_port: u32) -> Result<(), InjectError> {
        self.send(PacketOut::output_to(switch_id, out_port, frame))
    }
}

impl<F> PacketInjector for F
where
    F: Fn(PacketOut) -> Result<(), InjectError> + Send + Sync,
{
    fn send(&self, packet_out: PacketOut) -> Result<(), InjectError> {
        self(packet_out)
    }
}
