/// Classifiers sort frames by reference. The proxy's only classifier picks Ethernet/IPv4 ARP
/// requests out of the packet-in stream and extracts the fields a reply needs.
pub mod classifier;

/// Reply synthesis. The synthesizer builds the ARP reply that names a virtual MAC as the owner
/// of the requested IP and addresses it back to the requester.
pub mod processor;

/// The virtual next-hop table and the ways to read it: straight from disk on every lookup, from
/// an in-memory copy that tracks the file, or from a table held in memory.
pub mod mapping;

/// Packet-outs and the injectors that hand them to a switch.
pub mod injector;

/// The per packet-in entry point that ties classification, mapping, reply synthesis and
/// injection together.
pub mod dispatcher;

/// Startup parameters and the command line that produces them.
pub mod config;

/// Line framing used by the binary to talk to a controller-side shim.
pub mod codec;

pub mod error;

mod types;
pub use self::types::*;

/// Utility module
pub mod utils;
