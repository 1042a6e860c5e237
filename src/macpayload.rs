//! MACPayload: frame header, port and frame payload of a data message.
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::header::FHDR;
use crate::maccommands::Direction;
use crate::maccommandset::MacCommandSet;
use crate::packet_length::phy::mac::{FPORT_MAX, MAC_COMMANDS_MAX_LEN};

/// MacPayload of a data message.
///
/// Port 0 carries MAC commands in place of the FRMPayload; those are kept in
/// `mac_commands` and `frm_payload` stays empty. Ports 1 to 223 carry
/// application data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacPayload {
    pub fhdr: FHDR,
    pub fport: u8,
    pub frm_payload: Vec<u8>,
    pub mac_commands: MacCommandSet,
}

impl MacPayload {
    pub fn new(direction: Direction) -> Self {
        Self {
            fhdr: FHDR::new(direction),
            fport: 0,
            frm_payload: Vec::new(),
            mac_commands: MacCommandSet::new(direction, MAC_COMMANDS_MAX_LEN),
        }
    }

    pub fn direction(&self) -> Direction {
        self.fhdr.direction()
    }

    /// Reads the header and everything after it. The reader must hold the
    /// payload only, without the MIC.
    pub fn read_from(r: &mut Reader<'_>, direction: Direction) -> Result<Self> {
        let mut payload = Self::new(direction);
        payload.fhdr = FHDR::read_from(r, direction)?;
        match r.remaining() {
            0 => return Ok(payload),
            // a port without a payload
            1 => return Err(Error::BufferTruncated),
            _ => {}
        }

        payload.fport = r.read_u8()?;
        if payload.fport > FPORT_MAX {
            debug!("Reserved FPort {}", payload.fport);
            return Err(Error::InvalidSource);
        }
        if payload.fport != 0 {
            payload.frm_payload = r.rest().to_vec();
            return Ok(payload);
        }

        let mut commands = MacCommandSet::new(direction, r.remaining());
        match commands.decode(r) {
            Ok(()) => {}
            Err(Error::UnknownMacCommand) => {
                debug!("Ignoring {} bytes after unknown MAC command", r.remaining());
            }
            Err(e) => return Err(e),
        }
        r.rest();
        commands.grow_to(MAC_COMMANDS_MAX_LEN);
        payload.mac_commands = commands;
        Ok(payload)
    }

    /// Writes the header, the port and either the FRMPayload or the MAC
    /// commands. An empty FRMPayload forces the port to 0; with no commands
    /// either, neither port nor payload is written.
    pub fn write_to(&mut self, w: &mut Writer<'_>) -> Result<()> {
        if self.frm_payload.is_empty() {
            self.fport = 0;
        }
        if self.fport > FPORT_MAX {
            return Err(Error::ParameterOutOfRange);
        }
        if self.fport == 0 && !self.frm_payload.is_empty() {
            return Err(Error::ParameterOutOfRange);
        }

        self.fhdr.write_to(w)?;
        if !self.frm_payload.is_empty() {
            w.write_u8(self.fport)?;
            w.write_slice(&self.frm_payload)
        } else if !self.mac_commands.is_empty() {
            w.write_u8(0)?;
            self.mac_commands.write_to(w)
        } else {
            Ok(())
        }
    }
}
