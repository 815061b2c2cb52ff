//! Serial port transport

use super::Transport;
use crate::Result;
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use std::io::{Read, Write};
use std::time::Duration;

/// Read timeout; a read with nothing pending returns 0 after this long
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// A serial port present on this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Path to open (e.g., "/dev/ttyACM0", "COM3")
    pub path: String,
    /// Human-readable description, for picking the port of each node
    pub description: String,
}

/// USB serial link to one node
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port at 8-N-1
    ///
    /// # Arguments
    /// * `path` - Port path (e.g., "/dev/ttyACM0")
    /// * `baud_rate` - Baud rate, 115200 for both nodes
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;

        log::info!("Opened serial port: {} at {} baud", path, baud_rate);
        Ok(Self { port })
    }

    /// List the serial ports present on this host
    pub fn available_ports() -> Result<Vec<PortInfo>> {
        let ports = serialport::available_ports()?;
        log::debug!("Found {} serial ports", ports.len());

        Ok(ports
            .into_iter()
            .map(|port| PortInfo {
                description: describe(&port.port_type),
                path: port.port_name,
            })
            .collect())
    }
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => usb
            .product
            .clone()
            .or_else(|| usb.manufacturer.clone())
            .unwrap_or_else(|| format!("USB device {:04x}:{:04x}", usb.vid, usb.pid)),
        SerialPortType::BluetoothPort => "Bluetooth serial port".to_owned(),
        SerialPortType::PciPort => "PCI serial port".to_owned(),
        SerialPortType::Unknown => "n/a".to_owned(),
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.port.flush()?;
        Ok(())
    }
}
