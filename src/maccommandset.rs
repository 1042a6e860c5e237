//! Bounded, direction-aware collection of MAC commands.
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::maccommands::{Direction, MacCommand};
use crate::packet_length::phy::mac::fhdr::FOPTS_MAX_LEN;

/// Upper bound on distinct CIDs in one direction.
pub const MAX_COMMANDS: usize = 16;

/// A set of MAC commands keyed by CID, holding at most one command per CID.
///
/// The set has a byte budget: the encoded length of all members may never
/// exceed `max_len`. When decoding, the budget is the number of bytes the
/// frame declares for the commands. Members are kept in ascending CID order,
/// which is the order they are encoded in.
///
/// Every frame owns its own set; it is not meant to be shared between
/// concurrent encode or decode calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacCommandSet {
    commands: heapless::Vec<MacCommand, MAX_COMMANDS>,
    max_len: usize,
    direction: Direction,
}

impl MacCommandSet {
    pub fn new(direction: Direction, max_len: usize) -> Self {
        Self { commands: heapless::Vec::new(), max_len, direction }
    }

    /// A set sized for the FOpts field of the frame header.
    pub fn fopts(direction: Direction) -> Self {
        Self::new(direction, FOPTS_MAX_LEN)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Raises the budget to `max_len`; a smaller value leaves it unchanged.
    pub(crate) fn grow_to(&mut self, max_len: usize) {
        self.max_len = self.max_len.max(max_len);
    }

    /// Adds `cmd`, replacing any member with the same CID.
    ///
    /// Returns `false` and leaves the set untouched if the command would
    /// push the encoded length past the budget or if its direction is not
    /// the set's direction.
    pub fn add(&mut self, cmd: impl Into<MacCommand>) -> bool {
        let cmd = cmd.into();
        let replaced = self.get(cmd.cid()).map_or(0, MacCommand::len);
        let new_len = self.encoded_len() - replaced + cmd.len();
        if new_len > self.max_len {
            warn!(
                "Unable to add {} to set: length would be {} ({} is max)",
                cmd.name(),
                new_len,
                self.max_len
            );
            return false;
        }
        if cmd.direction() != self.direction {
            warn!("{} has the wrong direction for this set", cmd.name());
            return false;
        }
        match self.commands.binary_search_by_key(&cmd.cid(), MacCommand::cid) {
            Ok(i) => self.commands[i] = cmd,
            Err(i) => {
                if self.commands.insert(i, cmd).is_err() {
                    return false;
                }
            }
        }
        true
    }

    pub fn contains(&self, cid: u8) -> bool {
        self.get(cid).is_some()
    }

    pub fn get(&self, cid: u8) -> Option<&MacCommand> {
        self.commands.iter().find(|c| c.cid() == cid)
    }

    pub fn remove(&mut self, cid: u8) -> Option<MacCommand> {
        let i = self.commands.iter().position(|c| c.cid() == cid)?;
        Some(self.commands.remove(i))
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Members in ascending CID order.
    pub fn list(&self) -> &[MacCommand] {
        &self.commands
    }

    pub fn iter(&self) -> impl Iterator<Item = &MacCommand> {
        self.commands.iter()
    }

    /// Sum of the encoded lengths of all members.
    pub fn encoded_len(&self) -> usize {
        self.commands.iter().map(MacCommand::len).sum()
    }

    /// Number of commands in the set.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Adds every command of `other`. Stops and returns `false` at the first
    /// one that does not fit.
    pub fn copy_from(&mut self, other: &MacCommandSet) -> bool {
        other.iter().all(|cmd| self.add(*cmd))
    }

    pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
        self.commands.iter().try_for_each(|cmd| cmd.write_to(w))
    }

    /// Replaces the contents with the commands at the reader.
    ///
    /// Decoding ends successfully when the reader is exhausted or when the
    /// next command would exceed the budget; in the latter case the rest of
    /// the reader is left unread. An id that is unknown for the set's
    /// direction stops decoding with [`Error::UnknownMacCommand`], keeping
    /// whatever was decoded before it.
    pub fn decode(&mut self, r: &mut Reader<'_>) -> Result<()> {
        self.clear();
        let mut consumed = 0;
        while !r.is_empty() {
            let cid = r.peek_u8()?;
            let Some(mut cmd) = MacCommand::new(self.direction, cid) else {
                debug!("Unknown MAC command {:#x} after {} bytes", cid, consumed);
                return Err(Error::UnknownMacCommand);
            };
            consumed += cmd.len();
            if consumed > self.max_len {
                trace!("MAC command set full at {} of {} bytes", consumed - cmd.len(), self.max_len);
                return Ok(());
            }
            cmd.read_from(r)?;
            if !self.add(cmd) {
                return Err(Error::InvalidSource);
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a MacCommandSet {
    type Item = &'a MacCommand;
    type IntoIter = core::slice::Iter<'a, MacCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::maccommands::*;

    #[test]
    fn list_is_sorted_by_cid() {
        let mut set = MacCommandSet::new(Direction::Downlink, 20);
        assert!(set.add(RXTimingSetupReqPayload { delay: 1 }));
        assert!(set.add(DevStatusReqPayload));
        assert!(set.add(LinkCheckAnsPayload { margin: 7, gw_cnt: 2 }));
        let cids: Vec<u8> = set.list().iter().map(MacCommand::cid).collect();
        assert_eq!(cids, [0x02, 0x06, 0x08]);
        assert_eq!(set.encoded_len(), 3 + 1 + 2);

        let mut buf = [0u8; 6];
        set.write_to(&mut Writer::new(&mut buf)).unwrap();
        assert_eq!(buf, [0x02, 7, 2, 0x06, 0x08, 1]);
    }

    #[test]
    fn add_over_budget_leaves_set_untouched() {
        let mut set = MacCommandSet::new(Direction::Downlink, 6);
        assert!(set.add(LinkADRReqPayload::default()));
        let before = set.clone();
        assert!(!set.add(LinkCheckAnsPayload::default()));
        assert_eq!(set, before);
        assert!(set.add(DevStatusReqPayload));
        assert_eq!(set.encoded_len(), 6);
    }

    #[test]
    fn add_wrong_direction_fails() {
        let mut set = MacCommandSet::fopts(Direction::Uplink);
        assert!(!set.add(DevStatusReqPayload));
        assert!(set.is_empty());
        assert!(set.add(DevStatusAnsPayload { battery: 10, margin: 3 }));
    }

    #[test]
    fn add_replaces_same_cid() {
        let mut set = MacCommandSet::new(Direction::Downlink, 3);
        assert!(set.add(LinkCheckAnsPayload { margin: 1, gw_cnt: 1 }));
        assert!(set.add(LinkCheckAnsPayload { margin: 2, gw_cnt: 2 }));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(0x02),
            Some(&MacCommand::from(LinkCheckAnsPayload { margin: 2, gw_cnt: 2 }))
        );
    }

    #[test]
    fn contains_remove_clear() {
        let mut set = MacCommandSet::fopts(Direction::Uplink);
        set.add(LinkCheckReqPayload);
        set.add(DutyCycleAnsPayload);
        assert!(set.contains(0x02));
        assert!(set.remove(0x02).is_some());
        assert!(!set.contains(0x02));
        assert!(set.remove(0x02).is_none());
        set.clear();
        assert_eq!(set.len(), 0);
        assert_eq!(set.encoded_len(), 0);
    }

    #[test]
    fn copy_from_respects_budget() {
        let mut big = MacCommandSet::new(Direction::Uplink, 20);
        big.add(LinkCheckReqPayload);
        big.add(DevStatusAnsPayload::default());
        big.add(LinkADRAnsPayload::default());

        let mut fits = MacCommandSet::new(Direction::Uplink, 6);
        assert!(fits.copy_from(&big));
        assert_eq!(fits, MacCommandSet { max_len: 6, ..big.clone() });

        let mut small = MacCommandSet::new(Direction::Uplink, 3);
        assert!(!small.copy_from(&big));
    }

    #[test]
    fn decode_stops_silently_at_budget() {
        // LinkCheckAns, DevStatusReq, RXTimingSetupReq: 6 bytes in total
        let data = [0x02, 7, 2, 0x06, 0x08, 1];
        let mut set = MacCommandSet::new(Direction::Downlink, 4);
        let mut r = Reader::new(&data);
        assert_eq!(set.decode(&mut r), Ok(()));
        assert_eq!(set.len(), 2);
        assert_eq!(r.position(), 4);

        let mut set = MacCommandSet::new(Direction::Downlink, data.len());
        assert_eq!(set.decode(&mut Reader::new(&data)), Ok(()));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn decode_unknown_keeps_earlier_commands() {
        let data = [0x06, 0x0A, 0x00, 0x08, 1];
        let mut set = MacCommandSet::fopts(Direction::Downlink);
        let mut r = Reader::new(&data);
        assert_eq!(set.decode(&mut r), Err(Error::UnknownMacCommand));
        assert_eq!(set.len(), 1);
        assert_eq!(r.position(), 1);
    }

    #[test]
    fn decode_truncated_command() {
        let data = [0x03, 0x21, 0xff];
        let mut set = MacCommandSet::fopts(Direction::Downlink);
        assert_eq!(set.decode(&mut Reader::new(&data)), Err(Error::BufferTruncated));
    }

    #[test]
    fn decode_uses_direction() {
        let data = [0x03, 0x07];
        let mut up = MacCommandSet::fopts(Direction::Uplink);
        assert_eq!(up.decode(&mut Reader::new(&data)), Ok(()));
        assert_eq!(up.list()[0].name(), "LinkADRAns");

        let mut down = MacCommandSet::fopts(Direction::Downlink);
        assert_eq!(down.decode(&mut Reader::new(&data)), Err(Error::BufferTruncated));
    }
}
