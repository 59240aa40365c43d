use crate::{bcd, checksum, layout, text, EncodeError};

pub use layout::SAVE_SIZE;

/// Generates a complete save file.
///
/// Either the whole image is returned or nothing is: the regions are staged in a private buffer that is dropped on
/// error.
pub fn gen(player_name: &str, rival_name: &str, money: u64) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::with_capacity(SAVE_SIZE);
    write(&mut buf, player_name, rival_name, money)?;
    Ok(buf)
}

/// Writes a complete save file to `w`, returning the checksum byte.
pub fn write(w: &mut impl std::io::Write, player_name: &str, rival_name: &str, money: u64) -> Result<u8, EncodeError> {
    layout::write_region(w, layout::HEADER, no_fields)?;

    let mut csw = checksum::Writer::new(&mut *w);
    layout::write_region(&mut csw, layout::MAIN_DATA, |w, field| match field {
        layout::Field::PlayerName => text::write(w, player_name, layout::PLAYER_NAME_SIZE),
        layout::Field::Money => bcd::write(w, money, layout::MONEY_SIZE),
        layout::Field::RivalName => text::write(w, rival_name, layout::RIVAL_NAME_SIZE),
    })?;
    let checksum = csw.finalize()?;

    layout::write_region(w, layout::TRAILER, no_fields)?;
    Ok(checksum)
}

fn no_fields<W>(_w: &mut W, field: layout::Field) -> Result<(), EncodeError> {
    unreachable!("{:?} outside of main data", field)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid size: {0} bytes")]
    InvalidSize(usize),

    #[error("invalid checksum: {actual:02x} != {expected:02x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("invalid text: {0:02x?}")]
    InvalidText(Vec<u8>),

    #[error("invalid money: {0:02x?}")]
    InvalidMoney(Vec<u8>),
}

#[derive(Clone)]
pub struct Save {
    buf: Box<[u8; SAVE_SIZE]>,
}

impl Save {
    pub fn new(buf: &[u8]) -> Result<Self, Error> {
        let save = Self::from_raw(buf)?;

        let computed_checksum = save.compute_checksum();
        if save.checksum() != computed_checksum {
            return Err(Error::ChecksumMismatch {
                expected: computed_checksum,
                actual: save.checksum(),
            });
        }

        Ok(save)
    }

    /// Like [`Save::new`], but does not verify the checksum.
    pub fn from_raw(buf: &[u8]) -> Result<Self, Error> {
        let buf: Box<[u8; SAVE_SIZE]> = buf
            .get(..SAVE_SIZE)
            .and_then(|buf| <[u8; SAVE_SIZE]>::try_from(buf).ok())
            .map(Box::new)
            .ok_or(Error::InvalidSize(buf.len()))?;
        Ok(Self { buf })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..]
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub fn checksum(&self) -> u8 {
        self.buf[layout::CHECKSUM_OFFSET]
    }

    pub fn compute_checksum(&self) -> u8 {
        checksum::compute(&self.buf[layout::MAIN_DATA_OFFSET..layout::CHECKSUM_OFFSET])
    }

    pub fn rebuild_checksum(&mut self) {
        self.buf[layout::CHECKSUM_OFFSET] = self.compute_checksum();
    }

    fn field(&self, offset: usize, size: usize) -> &[u8] {
        &self.buf[offset..][..size]
    }

    fn text_field(&self, offset: usize, size: usize) -> Result<String, Error> {
        let raw = self.field(offset, size);
        text::decode(raw).ok_or_else(|| Error::InvalidText(raw.to_vec()))
    }

    pub fn player_name(&self) -> Result<String, Error> {
        self.text_field(layout::PLAYER_NAME_OFFSET, layout::PLAYER_NAME_SIZE)
    }

    pub fn rival_name(&self) -> Result<String, Error> {
        self.text_field(layout::RIVAL_NAME_OFFSET, layout::RIVAL_NAME_SIZE)
    }

    pub fn money(&self) -> Result<u64, Error> {
        let raw = self.field(layout::MONEY_OFFSET, layout::MONEY_SIZE);
        bcd::decode(raw).ok_or_else(|| Error::InvalidMoney(raw.to_vec()))
    }

    // The setters leave the checksum alone so several fields can be changed before calling rebuild_checksum.

    pub fn set_player_name(&mut self, name: &str) -> Result<(), EncodeError> {
        let raw = text::encode(name, layout::PLAYER_NAME_SIZE)?;
        self.buf[layout::PLAYER_NAME_OFFSET..][..layout::PLAYER_NAME_SIZE].copy_from_slice(&raw);
        Ok(())
    }

    pub fn set_rival_name(&mut self, name: &str) -> Result<(), EncodeError> {
        let raw = text::encode(name, layout::RIVAL_NAME_SIZE)?;
        self.buf[layout::RIVAL_NAME_OFFSET..][..layout::RIVAL_NAME_SIZE].copy_from_slice(&raw);
        Ok(())
    }

    pub fn set_money(&mut self, money: u64) -> Result<(), EncodeError> {
        let raw = bcd::encode(money, layout::MONEY_SIZE)?;
        self.buf[layout::MONEY_OFFSET..][..layout::MONEY_SIZE].copy_from_slice(&raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_size() {
        for (player_name, rival_name, money) in [("RED", "BLUE", 3000), ("", "", 0), ("AaBbCcDdEe", "♂♀", 999999)] {
            assert_eq!(gen(player_name, rival_name, money).unwrap().len(), SAVE_SIZE);
        }
    }

    #[test]
    fn test_gen_is_deterministic() {
        assert_eq!(gen("RED", "BLUE", 3000).unwrap(), gen("RED", "BLUE", 3000).unwrap());
    }

    #[test]
    fn test_gen_checksum_identity() {
        for (player_name, rival_name, money) in [("RED", "BLUE", 3000), ("", "", 0), ("Ash", "Gary", 123456)] {
            let buf = gen(player_name, rival_name, money).unwrap();
            let region = &buf[layout::MAIN_DATA_OFFSET..=layout::CHECKSUM_OFFSET];
            assert_eq!(checksum::sum(region), 0xff);
        }
    }

    #[test]
    fn test_write_returns_checksum() {
        let mut buf = vec![];
        let checksum = write(&mut buf, "RED", "BLUE", 3000).unwrap();
        assert_eq!(buf[layout::CHECKSUM_OFFSET], checksum);
    }

    #[test]
    fn test_gen_errors() {
        assert!(matches!(
            gen("RED*", "BLUE", 3000),
            Err(EncodeError::UnsupportedCharacter('*'))
        ));
        assert!(matches!(
            gen("RED", "BLUE BLUE", 3000),
            Err(EncodeError::UnsupportedCharacter(' '))
        ));
        assert!(matches!(
            gen("REDREDREDRE", "BLUE", 3000),
            Err(EncodeError::InsufficientSpace {
                required: 12,
                reserved: 11
            })
        ));
        assert!(matches!(
            gen("RED", "BLUE", 1000000),
            Err(EncodeError::ValueTooLarge { .. })
        ));
    }

    #[test]
    fn test_gen_empty_names() {
        let buf = gen("", "", 3000).unwrap();
        let mut expected = vec![0x00; layout::PLAYER_NAME_SIZE];
        expected[0] = text::TERMINATOR;
        assert_eq!(&buf[layout::PLAYER_NAME_OFFSET..][..layout::PLAYER_NAME_SIZE], &expected[..]);
        assert_eq!(&buf[layout::RIVAL_NAME_OFFSET..][..layout::RIVAL_NAME_SIZE], &expected[..]);
        assert!(Save::new(&buf).is_ok());
    }

    #[test]
    fn test_only_fields_and_checksum_vary() {
        let a = gen("RED", "BLUE", 3000).unwrap();
        let b = gen("Gary", "Ash", 999999).unwrap();
        let varying = [
            layout::PLAYER_NAME_OFFSET..layout::PLAYER_NAME_OFFSET + layout::PLAYER_NAME_SIZE,
            layout::MONEY_OFFSET..layout::MONEY_OFFSET + layout::MONEY_SIZE,
            layout::RIVAL_NAME_OFFSET..layout::RIVAL_NAME_OFFSET + layout::RIVAL_NAME_SIZE,
            layout::CHECKSUM_OFFSET..layout::CHECKSUM_OFFSET + 1,
        ];
        for i in 0..SAVE_SIZE {
            if !varying.iter().any(|r| r.contains(&i)) {
                assert_eq!(a[i], b[i], "byte {:#06x} differs", i);
            }
        }
    }

    #[test]
    fn test_save_view() {
        let save = Save::new(&gen("Red", "Gary", 4321).unwrap()).unwrap();
        assert_eq!(save.player_name().unwrap(), "Red");
        assert_eq!(save.rival_name().unwrap(), "Gary");
        assert_eq!(save.money().unwrap(), 4321);
    }

    #[test]
    fn test_save_invalid_size() {
        assert!(matches!(Save::new(&[0u8; 100]), Err(Error::InvalidSize(100))));
    }

    #[test]
    fn test_save_accepts_trailing_bytes() {
        let mut buf = gen("RED", "BLUE", 3000).unwrap();
        buf.resize(SAVE_SIZE * 2, 0xff);
        assert_eq!(Save::new(&buf).unwrap().as_bytes(), &buf[..SAVE_SIZE]);
    }

    #[test]
    fn test_save_checksum_mismatch() {
        let mut buf = gen("RED", "BLUE", 3000).unwrap();
        buf[layout::PLAYER_NAME_OFFSET] = 0x80;
        assert!(matches!(Save::new(&buf), Err(Error::ChecksumMismatch { .. })));

        let mut save = Save::from_raw(&buf).unwrap();
        assert_eq!(save.player_name().unwrap(), "AED");
        save.rebuild_checksum();
        assert!(Save::new(save.as_bytes()).is_ok());
    }

    #[test]
    fn test_save_edit_matches_gen() {
        let mut save = Save::new(&gen("RED", "BLUE", 3000).unwrap()).unwrap();
        save.set_player_name("Ash").unwrap();
        save.set_rival_name("Gary").unwrap();
        save.set_money(123456).unwrap();
        save.rebuild_checksum();
        assert_eq!(save.to_vec(), gen("Ash", "Gary", 123456).unwrap());
    }

    #[test]
    fn test_save_edit_rejects_bad_values() {
        let mut save = Save::new(&gen("RED", "BLUE", 3000).unwrap()).unwrap();
        assert!(save.set_player_name("ABCDEFGHIJK").is_err());
        assert!(save.set_rival_name("日本").is_err());
        assert!(save.set_money(1000000).is_err());
        assert_eq!(save.to_vec(), gen("RED", "BLUE", 3000).unwrap());
    }

    #[test]
    fn test_save_invalid_fields() {
        let mut buf = gen("RED", "BLUE", 3000).unwrap();
        buf[layout::MONEY_OFFSET] = 0xaa;
        buf[layout::RIVAL_NAME_OFFSET..][..layout::RIVAL_NAME_SIZE].fill(0x80);
        let save = Save::from_raw(&buf).unwrap();
        assert!(matches!(save.money(), Err(Error::InvalidMoney(_))));
        assert!(matches!(save.rival_name(), Err(Error::InvalidText(_))));
    }
}
