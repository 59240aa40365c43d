use crate::EncodeError;

/// Largest value that fits in `width` bytes of packed BCD.
pub fn max_value(width: usize) -> u64 {
    u32::try_from(width * 2)
        .ok()
        .and_then(|digits| 10u64.checked_pow(digits))
        .map_or(u64::MAX, |limit| limit - 1)
}

/// Packs `value` into `width` bytes, two decimal digits per byte, most significant byte first.
pub fn encode(value: u64, width: usize) -> Result<Vec<u8>, EncodeError> {
    if value > max_value(width) {
        return Err(EncodeError::ValueTooLarge { value, width });
    }

    let mut buf = vec![0u8; width];
    let mut rest = value;
    for b in buf.iter_mut().rev() {
        *b = (((rest / 10 % 10) << 4) | (rest % 10)) as u8;
        rest /= 100;
    }
    Ok(buf)
}

pub fn write(w: &mut impl std::io::Write, value: u64, width: usize) -> Result<(), EncodeError> {
    w.write_all(&encode(value, width)?)?;
    Ok(())
}

/// Returns `None` if any nibble is not a decimal digit or the value overflows.
pub fn decode(buf: &[u8]) -> Option<u64> {
    buf.iter().try_fold(0u64, |acc, b| {
        let (hi, lo) = ((b >> 4) as u64, (b & 0xf) as u64);
        if hi > 9 || lo > 9 {
            return None;
        }
        acc.checked_mul(100)?.checked_add(hi * 10 + lo)
    })
}
