//! Network stack manager

use defmt::{info, warn};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};

/// Wait up to `settle_ms` for DHCP and log the address
///
/// Returns whether the link came up. Sampling starts either way; sends made
/// before the stack has a route fail individually.
pub async fn wait_for_config(stack: &Stack<'_>, settle_ms: u32) -> bool {
    info!("Waiting for DHCP...");
    let settle = Duration::from_millis(u64::from(settle_ms));
    if with_timeout(settle, stack.wait_config_up()).await.is_err() {
        warn!("Network not up after {} ms, starting anyway", settle_ms);
        return false;
    }
    info!("Network is UP!");

    if let Some(config) = stack.config_v4() {
        let octets = config.address.address().octets();
        info!("IP: {}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3]);

        if let Some(gateway) = config.gateway {
            let gw_octets = gateway.octets();
            info!("Gateway: {}.{}.{}.{}", gw_octets[0], gw_octets[1], gw_octets[2], gw_octets[3]);
        }
    }
    true
}
