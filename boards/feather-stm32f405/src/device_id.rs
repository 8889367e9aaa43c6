//! Identity derived from the STM32F405 unique device ID
//!
//! The factory-programmed 96-bit UID is stable across reboots and unique to
//! each chip, so it seeds both the Ethernet MAC address and the network
//! stack's random seed.

/// Raw 12-byte (96-bit) unique device ID
pub fn uid() -> &'static [u8; 12] {
    embassy_stm32::uid::uid()
}

/// Locally administered unicast MAC address built from the UID
///
/// The first octet is fixed to `0x02`; the remaining five fold the UID.
pub fn mac_address() -> [u8; 6] {
    let uid = uid();
    let mut mac = [0x02, 0, 0, 0, 0, 0];
    for (i, byte) in uid.iter().enumerate() {
        mac[1 + i % 5] ^= byte;
    }
    mac
}

/// Seed for the network stack (DHCP transaction IDs, ephemeral ports)
pub fn stack_seed() -> u64 {
    let uid = uid();
    let mut low = [0u8; 8];
    let mut high = [0u8; 8];
    low.copy_from_slice(&uid[0..8]);
    high[..4].copy_from_slice(&uid[8..12]);
    u64::from_le_bytes(low) ^ u64::from_le_bytes(high).rotate_left(32)
}
