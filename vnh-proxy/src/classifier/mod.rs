//! # What are they for?
//!
//! Classifiers look at a packet by reference and sort it into a class without modifying it. The
//! dispatcher matches on the class to decide whether the rest of the proxy has any work to do.
mod arp_request;
pub use self::arp_request::*;

/// Determines the kind of packet we have. `Classifier::Class` is then consumed by the caller to
/// send it down the appropriate path.
pub trait Classifier {
    type Packet: Send + Clone;
    type Class: Sized;

    fn classify(&self, packet: &Self::Packet) -> Self::Class;
}
