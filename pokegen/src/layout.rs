//! Static layout of the 32 KiB cartridge SRAM image.
//!
//! The image is made of three regions written back to back:
//!
//! - the header (bank 0): sprite tiles and scratch space, never checksummed;
//! - the main data block (bank 1): player state including the three variable fields, followed by a one byte checksum;
//! - the trailer (banks 2 and 3): empty box storage, filled with `0xff`.
//!
//! Each region is a list of [`Segment`]s. Offsets of the variable fields are derived from the lists at compile time, so
//! moving a segment around fails the build instead of silently shifting the checksum.

use std::io::Read;

/// A variable field inside the main data block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    PlayerName,
    Money,
    RivalName,
}

impl Field {
    pub const fn size(self) -> usize {
        match self {
            Field::PlayerName => PLAYER_NAME_SIZE,
            Field::Money => MONEY_SIZE,
            Field::RivalName => RIVAL_NAME_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Segment {
    /// `len` repetitions of the same byte.
    Fill(u8, usize),
    Bytes(&'static [u8]),
    Field(Field),
}

impl Segment {
    pub const fn size(self) -> usize {
        match self {
            Segment::Fill(_, len) => len,
            Segment::Bytes(b) => b.len(),
            Segment::Field(field) => field.size(),
        }
    }
}

pub const fn region_size(region: &[Segment]) -> usize {
    let mut size = 0;
    let mut i = 0;
    while i < region.len() {
        size += region[i].size();
        i += 1;
    }
    size
}

/// Offset of `field` from the start of `region`. Fails the build if the field is missing or repeated.
const fn field_offset(region: &[Segment], field: Field) -> usize {
    let mut offset = 0;
    let mut found = None;
    let mut i = 0;
    while i < region.len() {
        if let Segment::Field(f) = region[i] {
            if f as u8 == field as u8 {
                assert!(found.is_none(), "field appears more than once");
                found = Some(offset);
            }
        }
        offset += region[i].size();
        i += 1;
    }
    match found {
        Some(offset) => offset,
        None => panic!("field missing from region"),
    }
}

const fn has_fields(region: &[Segment]) -> bool {
    let mut i = 0;
    while i < region.len() {
        if let Segment::Field(_) = region[i] {
            return true;
        }
        i += 1;
    }
    false
}

pub const PLAYER_NAME_SIZE: usize = 11;
pub const MONEY_SIZE: usize = 3;
pub const RIVAL_NAME_SIZE: usize = 11;

/// Player ID, stored big endian.
pub const PLAYER_ID: [u8; 2] = [0xc0, 0xb2];

/// Play time seconds and frames.
pub const PLAY_TIME: [u8; 2] = [0x07, 0x05];

pub const HEADER: &[Segment] = &[
    Segment::Fill(0x00, 132),
    Segment::Bytes(&[
        0x03, 0x0c, 0x10, 0x10, 0x20, 0x20, 0x20, 0x10, 0x10, 0x08, 0x18, 0x20, 0x20, 0x40, 0x48, 0x38, 0x08, 0x10,
        0x11, 0x11, 0x22, 0x22, 0x1c,
    ]),
    Segment::Fill(0x00, 33),
    Segment::Bytes(&[
        0xc0, 0x30, 0x08, 0x08, 0x04, 0x04, 0x04, 0x08, 0x08, 0x10, 0x18, 0x04, 0x04, 0x02, 0x12, 0x1c, 0x10, 0x08,
        0x88, 0x88, 0x44, 0x44, 0x38,
    ]),
    Segment::Fill(0x00, 445),
    Segment::Bytes(&[
        0x03, 0x03, 0x0c, 0x0c, 0x10, 0x10, 0x10, 0x10, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x10, 0x10, 0x10, 0x10,
        0x08, 0x08, 0x18, 0x18, 0x20, 0x20, 0x20, 0x20, 0x40, 0x40, 0x48, 0x48, 0x38, 0x38, 0x08, 0x08, 0x10, 0x10,
        0x11, 0x11, 0x11, 0x11, 0x22, 0x22, 0x22, 0x22, 0x1c, 0x1c,
    ]),
    Segment::Fill(0x00, 66),
    Segment::Bytes(&[
        0xc0, 0xc0, 0x30, 0x30, 0x08, 0x08, 0x08, 0x08, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x08, 0x08, 0x08, 0x08,
        0x10, 0x10, 0x18, 0x18, 0x04, 0x04, 0x04, 0x04, 0x02, 0x02, 0x12, 0x12, 0x1c, 0x1c, 0x10, 0x10, 0x08, 0x08,
        0x88, 0x88, 0x88, 0x88, 0x44, 0x44, 0x44, 0x44, 0x38, 0x38,
    ]),
    Segment::Fill(0x00, 362),
    Segment::Fill(0xff, 8448),
];

/// Main data block, excluding the trailing checksum byte.
pub const MAIN_DATA: &[Segment] = &[
    Segment::Field(Field::PlayerName),
    Segment::Fill(0x00, 39),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 40),
    Segment::Field(Field::Money),
    Segment::Field(Field::RivalName),
    Segment::Bytes(&[0x03, 0x00, 0x00, 0x01]),
    Segment::Bytes(&PLAYER_ID),
    Segment::Bytes(&[
        0xba, 0x02, 0x00, 0x26, 0x12, 0xc7, 0x06, 0x03, 0x00, 0x01, 0x00, 0x00, 0x04, 0x04, 0x04, 0x10, 0x40, 0xcf,
        0x40, 0xb0, 0x40, 0x00, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0xff, 0x00,
    ]),
    Segment::Fill(0x00, 20),
    Segment::Bytes(&[0x00, 0xd0, 0x40, 0x00, 0x00, 0x0a, 0x01, 0x01, 0x07, 0x02, 0x25, 0x00]),
    Segment::Fill(0x00, 123),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 244),
    Segment::Bytes(&[
        0x08, 0x08, 0x00, 0x98, 0x00, 0x08, 0x00, 0x19, 0x70, 0x52, 0xe0, 0x4d, 0x49, 0x17, 0xff, 0xff, 0xff, 0xff,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x14, 0x01, 0xff, 0x00, 0x00,
    ]),
    Segment::Fill(0x00, 102),
    Segment::Bytes(&[
        0xa5, 0x00, 0x7e, 0x01, 0x0c, 0x41, 0x02, 0x00, 0x10, 0x10, 0x00, 0x00, 0x0c, 0x00, 0x02, 0x00, 0x80, 0x01,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x9e, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0xff, 0xff, 0x00,
    ]),
    Segment::Fill(0x00, 60),
    Segment::Fill(0x01, 1),
    Segment::Fill(0x00, 270),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 22),
    Segment::Fill(0x01, 1),
    Segment::Fill(0x00, 785),
    Segment::Bytes(&PLAY_TIME),
    Segment::Fill(0x00, 58),
    Segment::Bytes(&[0x01, 0x00, 0xff, 0x00, 0x3c, 0x00, 0x40, 0x00, 0x00, 0x04, 0x40, 0x40]),
    Segment::Fill(0x00, 6),
    // Empty list slots, each opened by a 0xff end marker.
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 15),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 26),
    Segment::Bytes(&[0x01, 0x01]),
    Segment::Fill(0x00, 242),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 403),
    Segment::Fill(0xff, 1),
    Segment::Fill(0x00, 1121),
];

pub const TRAILER: &[Segment] = &[Segment::Fill(0xff, 19164)];

pub const HEADER_SIZE: usize = region_size(HEADER);
pub const MAIN_DATA_SIZE: usize = region_size(MAIN_DATA);
pub const TRAILER_SIZE: usize = region_size(TRAILER);

pub const MAIN_DATA_OFFSET: usize = HEADER_SIZE;
pub const PLAYER_NAME_OFFSET: usize = MAIN_DATA_OFFSET + field_offset(MAIN_DATA, Field::PlayerName);
pub const MONEY_OFFSET: usize = MAIN_DATA_OFFSET + field_offset(MAIN_DATA, Field::Money);
pub const RIVAL_NAME_OFFSET: usize = MAIN_DATA_OFFSET + field_offset(MAIN_DATA, Field::RivalName);
pub const CHECKSUM_OFFSET: usize = MAIN_DATA_OFFSET + MAIN_DATA_SIZE;
pub const TRAILER_OFFSET: usize = CHECKSUM_OFFSET + 1;

pub const SAVE_SIZE: usize = TRAILER_OFFSET + TRAILER_SIZE;

const _: () = assert!(!has_fields(HEADER) && !has_fields(TRAILER));
const _: () = assert!(HEADER_SIZE == 0x2598);
const _: () = assert!(PLAYER_NAME_OFFSET == 0x2598);
const _: () = assert!(MONEY_OFFSET == 0x25f3);
const _: () = assert!(RIVAL_NAME_OFFSET == 0x25f6);
const _: () = assert!(CHECKSUM_OFFSET == 0x3523);
const _: () = assert!(SAVE_SIZE == 0x8000);

/// Writes the constant parts of `region` and calls `write_field` for each field slot.
pub fn write_region<W, E>(
    w: &mut W,
    region: &[Segment],
    mut write_field: impl FnMut(&mut W, Field) -> Result<(), E>,
) -> Result<(), E>
where
    W: std::io::Write,
    E: From<std::io::Error>,
{
    for segment in region {
        match *segment {
            Segment::Fill(b, len) => {
                std::io::copy(&mut std::io::repeat(b).take(len as u64), w)?;
            }
            Segment::Bytes(buf) => {
                w.write_all(buf)?;
            }
            Segment::Field(field) => {
                write_field(w, field)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_fields(_: &mut Vec<u8>, field: Field) -> Result<(), std::io::Error> {
        panic!("unexpected field {:?}", field);
    }

    #[test]
    fn test_region_sizes() {
        assert_eq!(HEADER_SIZE, 9624);
        assert_eq!(MAIN_DATA_SIZE, 3979);
        assert_eq!(TRAILER_SIZE, 19164);
    }

    #[test]
    fn test_write_header() {
        let mut buf = vec![];
        write_region(&mut buf, HEADER, no_fields).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert!(buf[..132].iter().all(|b| *b == 0x00));
        assert_eq!(&buf[132..135], &[0x03, 0x0c, 0x10]);
        assert!(buf[HEADER_SIZE - 8448..].iter().all(|b| *b == 0xff));
    }

    #[test]
    fn test_write_trailer() {
        let mut buf = vec![];
        write_region(&mut buf, TRAILER, no_fields).unwrap();
        assert_eq!(buf, vec![0xff; TRAILER_SIZE]);
    }

    #[test]
    fn test_write_fields_in_order() {
        let mut seen = vec![];
        let mut buf = vec![];
        write_region(&mut buf, MAIN_DATA, |w: &mut Vec<u8>, field| {
            seen.push((field, w.len()));
            w.resize(w.len() + field.size(), 0xaa);
            Ok::<_, std::io::Error>(())
        })
        .unwrap();
        assert_eq!(buf.len(), MAIN_DATA_SIZE);
        assert_eq!(
            seen,
            vec![
                (Field::PlayerName, PLAYER_NAME_OFFSET - MAIN_DATA_OFFSET),
                (Field::Money, MONEY_OFFSET - MAIN_DATA_OFFSET),
                (Field::RivalName, RIVAL_NAME_OFFSET - MAIN_DATA_OFFSET),
            ]
        );
    }
}
