use std::fmt;

pub type PacketData = Vec<u8>;

pub const IPV4_ETHER_TYPE: u16 = 0x0800;
pub const ARP_ETHER_TYPE: u16 = 0x0806;

/// Largest value representable by a 48-bit hardware address.
pub const MAC_ADDR_MAX: u64 = 0xffff_ffff_ffff;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr { bytes: [0xff; 6] };

    pub fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    /// Builds an address from the low 48 bits of `value`, most significant byte first.
    /// Returns `None` if any of the upper 16 bits are set.
    pub fn from_u64(value: u64) -> Option<MacAddr> {
        if value > MAC_ADDR_MAX {
            return None;
        }
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&value.to_be_bytes()[2..]);
        Some(MacAddr { bytes })
    }

    pub fn is_zero(&self) -> bool {
        self.bytes == [0; 6]
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr::new(bytes)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}
