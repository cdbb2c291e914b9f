use crate::{
    codec::{Class, Codec, Endianness},
    DecodeError,
};
use scroll::Pread;

pub const MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
pub const IDENT_SIZE: usize = 16;

const CLASS_OFFSET: usize = 4;
const DATA_OFFSET: usize = 5;

/// The `e_ident` block, as laid out in the file. Every field is a single byte, so this can be read without
/// knowing the byte order.
#[derive(Debug, Pread)]
#[repr(C)]
struct RawIdentification {
    magic: [u8; 4],
    class: u8,
    data: u8,
    version: u8,
    os_abi: u8,
    abi_version: u8,
    _padding: [u8; 7],
}

/// The first 16 bytes of an ELF file.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Identification {
    pub magic: [u8; 4],
    pub class: Class,
    pub endianness: Endianness,

    /// The version of the identification block. Should be `1`, but is recorded rather than checked.
    pub version: u8,
    pub os_abi: OsAbi,
    pub abi_version: u8,
}

impl Identification {
    /// Read and check the identification block at the start of `bytes`.
    pub fn read(bytes: &[u8]) -> Result<Identification, DecodeError> {
        /*
         * Check the magic first, byte by byte, so that nothing else is trusted from a file that isn't ELF, and so
         * we can report exactly where it went wrong.
         */
        for (offset, &expected) in MAGIC.iter().enumerate() {
            match bytes.get(offset) {
                Some(&byte) if byte == expected => (),
                _ => return Err(DecodeError::BadMagic { offset }),
            }
        }

        let raw = bytes
            .pread_with::<RawIdentification>(0, scroll::LE)
            .map_err(|_| DecodeError::TruncatedHeader { offset: bytes.len(), field: "e_ident" })?;

        let class = Class::from_byte(raw.class)
            .ok_or(DecodeError::UnsupportedBitWidth { offset: CLASS_OFFSET, value: raw.class })?;
        let endianness = Endianness::from_byte(raw.data)
            .ok_or(DecodeError::UnsupportedEndianness { offset: DATA_OFFSET, value: raw.data })?;

        Ok(Identification {
            magic: raw.magic,
            class,
            endianness,
            version: raw.version,
            os_abi: OsAbi::from(raw.os_abi),
            abi_version: raw.abi_version,
        })
    }

    /// The codec that the rest of the file must be decoded with.
    pub fn codec(&self) -> Codec {
        Codec::new(self.class, self.endianness)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OsAbi {
    SystemV,
    HpUx,
    NetBsd,
    Linux,
    Hurd,
    Solaris,
    Aix,
    Irix,
    FreeBsd,
    Tru64,
    Modesto,
    OpenBsd,
    OpenVms,
    Nsk,
    Aros,
    FenixOs,
    CloudAbi,
    OpenVos,
    ArmAeabi,
    Arm,

    /// A standalone (embedded) application.
    Standalone,
    Unknown(u8),
}

impl From<u8> for OsAbi {
    fn from(value: u8) -> OsAbi {
        match value {
            0 => OsAbi::SystemV,
            1 => OsAbi::HpUx,
            2 => OsAbi::NetBsd,
            3 => OsAbi::Linux,
            4 => OsAbi::Hurd,
            6 => OsAbi::Solaris,
            7 => OsAbi::Aix,
            8 => OsAbi::Irix,
            9 => OsAbi::FreeBsd,
            10 => OsAbi::Tru64,
            11 => OsAbi::Modesto,
            12 => OsAbi::OpenBsd,
            13 => OsAbi::OpenVms,
            14 => OsAbi::Nsk,
            15 => OsAbi::Aros,
            16 => OsAbi::FenixOs,
            17 => OsAbi::CloudAbi,
            18 => OsAbi::OpenVos,
            64 => OsAbi::ArmAeabi,
            97 => OsAbi::Arm,
            255 => OsAbi::Standalone,
            other => OsAbi::Unknown(other),
        }
    }
}
