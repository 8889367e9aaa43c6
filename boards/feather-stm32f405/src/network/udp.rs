//! UDP transport

use defmt::{info, warn};
use embassy_net::udp::{self, PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, IpEndpoint, Stack};
use relay_core::{InitError, RelayConfig};
use relay_hal::{SendError, Transport};

/// Socket buffers; the relay only sends, so the receive side stays minimal
pub struct UdpBuffers {
    rx_meta: [PacketMetadata; 1],
    rx_buffer: [u8; 64],
    tx_meta: [PacketMetadata; 4],
    tx_buffer: [u8; 256],
}

impl UdpBuffers {
    pub const fn new() -> Self {
        Self {
            rx_meta: [PacketMetadata::EMPTY; 1],
            rx_buffer: [0; 64],
            tx_meta: [PacketMetadata::EMPTY; 4],
            tx_buffer: [0; 256],
        }
    }
}

/// Bound socket plus the collector endpoint, both fixed at setup
pub struct UdpTransport {
    socket: UdpSocket<'static>,
    endpoint: IpEndpoint,
}

impl UdpTransport {
    /// Resolve the collector and bind an ephemeral local port
    pub fn bind(
        stack: Stack<'static>,
        buffers: &'static mut UdpBuffers,
        config: &RelayConfig,
    ) -> Result<Self, InitError> {
        let (address, port) = config.endpoint().map_err(|e| {
            warn!("Collector address rejected: {}", e);
            InitError::InvalidDestination
        })?;

        let UdpBuffers {
            rx_meta,
            rx_buffer,
            tx_meta,
            tx_buffer,
        } = buffers;
        let mut socket = UdpSocket::new(stack, rx_meta, rx_buffer, tx_meta, tx_buffer);
        socket.bind(0).map_err(|e| {
            warn!("UDP bind failed: {:?}", e);
            InitError::SocketUnavailable
        })?;

        let endpoint = IpEndpoint::new(IpAddress::Ipv4(address), port);
        info!("UDP transport bound, collector {:?}", endpoint);
        Ok(Self { socket, endpoint })
    }
}

impl Transport for UdpTransport {
    async fn send(&mut self, datagram: &[u8]) -> Result<(), SendError> {
        // embassy-net queues the whole datagram or nothing
        self.socket
            .send_to(datagram, self.endpoint)
            .await
            .map_err(|e| {
                warn!("UDP send failed: {:?}", e);
                match e {
                    udp::SendError::SocketNotBound => SendError::Unavailable,
                    _ => SendError::Rejected,
                }
            })
    }
}
