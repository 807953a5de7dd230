mod arp_reply;
pub use self::arp_reply::*;
