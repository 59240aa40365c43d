use crate::EncodeError;

pub const TERMINATOR: u8 = 0x50;
pub const PADDING: u8 = 0x00;

/// Characters the English cartridge can render in a name, with their tile indexes.
pub const CHARSET: &[(char, u8)] = &[
    ('A', 0x80),
    ('B', 0x81),
    ('C', 0x82),
    ('D', 0x83),
    ('E', 0x84),
    ('F', 0x85),
    ('G', 0x86),
    ('H', 0x87),
    ('I', 0x88),
    ('J', 0x89),
    ('K', 0x8a),
    ('L', 0x8b),
    ('M', 0x8c),
    ('N', 0x8d),
    ('O', 0x8e),
    ('P', 0x8f),
    ('Q', 0x90),
    ('R', 0x91),
    ('S', 0x92),
    ('T', 0x93),
    ('U', 0x94),
    ('V', 0x95),
    ('W', 0x96),
    ('X', 0x97),
    ('Y', 0x98),
    ('Z', 0x99),
    ('(', 0x9a),
    (')', 0x9b),
    (':', 0x9c),
    (';', 0x9d),
    ('[', 0x9e),
    (']', 0x9f),
    ('a', 0xa0),
    ('b', 0xa1),
    ('c', 0xa2),
    ('d', 0xa3),
    ('e', 0xa4),
    ('f', 0xa5),
    ('g', 0xa6),
    ('h', 0xa7),
    ('i', 0xa8),
    ('j', 0xa9),
    ('k', 0xaa),
    ('l', 0xab),
    ('m', 0xac),
    ('n', 0xad),
    ('o', 0xae),
    ('p', 0xaf),
    ('q', 0xb0),
    ('r', 0xb1),
    ('s', 0xb2),
    ('t', 0xb3),
    ('u', 0xb4),
    ('v', 0xb5),
    ('w', 0xb6),
    ('x', 0xb7),
    ('y', 0xb8),
    ('z', 0xb9),
    ('-', 0xe3),
    ('?', 0xe6),
    ('!', 0xe7),
    ('.', 0xe8),
    ('♂', 0xef),
    ('/', 0xf3),
    (',', 0xf4),
    ('♀', 0xf5),
];

const fn build_decode_table() -> [Option<char>; 0x80] {
    let mut table = [None; 0x80];
    let mut i = 0;
    while i < CHARSET.len() {
        let (c, b) = CHARSET[i];
        assert!(b >= 0x80, "charset bytes live in the upper half");
        assert!(table[(b - 0x80) as usize].is_none(), "charset bytes must be unique");
        table[(b - 0x80) as usize] = Some(c);
        i += 1;
    }
    table
}

static DECODE_TABLE: [Option<char>; 0x80] = build_decode_table();

pub fn encode_char(c: char) -> Option<u8> {
    CHARSET.iter().find(|(ch, _)| *ch == c).map(|(_, b)| *b)
}

pub fn decode_byte(b: u8) -> Option<char> {
    b.checked_sub(0x80).and_then(|i| DECODE_TABLE[i as usize])
}

/// Encodes `text` into exactly `reserved` bytes: the mapped characters, the terminator, then padding.
///
/// Length is counted in chars, not UTF-8 bytes, since ♂ and ♀ take one byte on the cartridge.
pub fn encode(text: &str, reserved: usize) -> Result<Vec<u8>, EncodeError> {
    let required = text.chars().count() + 1;
    if reserved < required {
        return Err(EncodeError::InsufficientSpace { required, reserved });
    }

    let mut buf = Vec::with_capacity(reserved);
    for c in text.chars() {
        buf.push(encode_char(c).ok_or(EncodeError::UnsupportedCharacter(c))?);
    }
    buf.push(TERMINATOR);
    buf.resize(reserved, PADDING);
    Ok(buf)
}

/// Like [`encode`], but writes the field to `w`. Nothing is written if encoding fails.
pub fn write(w: &mut impl std::io::Write, text: &str, reserved: usize) -> Result<(), EncodeError> {
    w.write_all(&encode(text, reserved)?)?;
    Ok(())
}

/// Decodes a text field up to its terminator.
///
/// Returns `None` if the field has no terminator or contains a byte outside the charset.
pub fn decode(buf: &[u8]) -> Option<String> {
    let end = buf.iter().position(|b| *b == TERMINATOR)?;
    buf[..end].iter().map(|b| decode_byte(*b)).collect()
}
