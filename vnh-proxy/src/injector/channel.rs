use crate::error::InjectError;
use crate::injector::{PacketInjector, PacketOut};
use crossbeam::channel::Sender;

/// Injector that pushes packet-outs onto a crossbeam channel read by the switch connection.
///
/// Sending never blocks on an unbounded channel; the only failure is the reader going away.
#[derive(Clone)]
pub struct ChannelInjector {
    sender: Sender<PacketOut>,
}

impl ChannelInjector {
    pub fn new(sender: Sender<PacketOut>) -> Self {
        ChannelInjector { sender }
    }
}

impl PacketInjector for ChannelInjector {
    fn send(&self, packet_out: PacketOut) -> Result<(), InjectError> {
        self.sender.send(packet_out).map_err(|err| {
            let packet_out = err.into_inner();
            InjectError::Disconnected {
                switch_id: packet_out.switch_id,
                out_port: packet_out.out_port().unwrap_or_default(),
            }
        })
    }
}
