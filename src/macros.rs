macro_rules! mac_cmd_zero_len {
    (
        $(
            $(#[$outer:meta])*
            struct $type:ident[cmd=$name:ident, cid=$cid:expr, uplink=$uplink:expr]
            )*
    ) => {
        $(
            $(#[$outer])*
            #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
            #[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
            #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
            pub struct $type;

            impl MacCommandPayload for $type {
                const CID: u8 = $cid;
                const UPLINK: bool = $uplink;
                const LEN: usize = 0;

                fn read_payload(_: &mut Reader<'_>) -> Result<Self> {
                    Ok($type)
                }

                fn write_payload(&self, _: &mut Writer<'_>) -> Result<()> {
                    Ok(())
                }
            }
        )*
    }
}

macro_rules! mac_cmds_enum {
    (
        $(#[$outer:meta])*
        $outer_vis:vis enum $outer_type:ident[$direction:ident] {
        $(
            $name:ident($type:ident),
        )*
    }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[allow(clippy::len_without_is_empty)]
        $outer_vis enum $outer_type {
            $(
                $name($type),
            )*
        }

        impl $outer_type {
            /// Instantiates the command with id `cid` and zeroed fields, or
            /// `None` if `cid` is not a known command in this direction.
            pub fn new(cid: u8) -> Option<Self> {
                $(
                    if cid == <$type as MacCommandPayload>::CID {
                        return Some(Self::$name($type::default()));
                    }
                )*
                None
            }

            /// Get the CID.
            pub fn cid(&self) -> u8 {
                match *self {
                    $(
                        Self::$name(_) => <$type as MacCommandPayload>::CID,
                    )*
                }
            }

            /// Command name, for logging.
            pub fn name(&self) -> &'static str {
                match *self {
                    $(
                        Self::$name(_) => stringify!($name),
                    )*
                }
            }

            /// Length of payload without the CID.
            pub fn payload_len(&self) -> usize {
                match *self {
                    $(
                        Self::$name(_) => <$type as MacCommandPayload>::LEN,
                    )*
                }
            }

            /// Encoded length, CID included.
            pub fn len(&self) -> usize {
                self.payload_len() + 1
            }

            pub fn direction(&self) -> Direction {
                Direction::$direction
            }

            /// Replaces the fields with the command at the reader. Fails with
            /// [`Error::InvalidSource`] if the id there belongs to another command.
            pub fn read_from(&mut self, r: &mut Reader<'_>) -> Result<()> {
                if r.peek_u8()? != self.cid() {
                    return Err(Error::InvalidSource);
                }
                let mut body = r.sub_reader(self.len())?;
                body.skip(1)?;
                match self {
                    $(
                        Self::$name(v) => *v = $type::read_payload(&mut body)?,
                    )*
                }
                Ok(())
            }

            /// Decodes the next command, looking its id up first.
            pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
                let mut cmd = Self::new(r.peek_u8()?).ok_or(Error::UnknownMacCommand)?;
                cmd.read_from(r)?;
                Ok(cmd)
            }

            pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
                w.write_u8(self.cid())?;
                match self {
                    $(
                        Self::$name(v) => v.write_payload(w),
                    )*
                }
            }
        }

        $(
            const _: () = assert!(
                <$type as MacCommandPayload>::UPLINK == matches!(Direction::$direction, Direction::Uplink)
            );

            impl From<$type> for $outer_type {
                fn from(v: $type) -> Self {
                    $outer_type::$name(v)
                }
            }

            impl From<$type> for MacCommand {
                fn from(v: $type) -> Self {
                    MacCommand::$direction($outer_type::$name(v))
                }
            }
        )*

        impl From<$outer_type> for MacCommand {
            fn from(v: $outer_type) -> Self {
                MacCommand::$direction(v)
            }
        }
    }
}

// Export the macros for internal use
pub(crate) use {mac_cmd_zero_len, mac_cmds_enum};
