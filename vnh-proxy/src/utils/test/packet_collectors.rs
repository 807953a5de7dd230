use crate::error::InjectError;
use crate::injector::{PacketInjector, PacketOut};
use std::sync::Mutex;

/// Injector that keeps every packet-out it is handed, in order, for later inspection.
#[derive(Default)]
pub struct RecordingInjector {
    sent: Mutex<Vec<PacketOut>>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        RecordingInjector::default()
    }

    /// A copy of everything sent so far.
    pub fn packet_outs(&self) -> Vec<PacketOut> {
        self.sent.lock().unwrap().clone()
    }
}

impl PacketInjector for RecordingInjector {
    fn send(&self, packet_out: PacketOut) -> Result<(), InjectError> {
        self.sent.lock().unwrap().push(packet_out);
        Ok(())
    }
}
