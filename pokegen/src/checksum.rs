use byteorder::WriteBytesExt;

/// Forwards writes to an inner sink while keeping an 8-bit running sum of every byte that went through.
pub struct Writer<W> {
    inner: W,
    sum: u8,
}

impl<W> Writer<W>
where
    W: std::io::Write,
{
    pub fn new(inner: W) -> Self {
        Self { inner, sum: 0 }
    }

    pub fn sum(&self) -> u8 {
        self.sum
    }

    /// Writes the complement of the running sum and hands back the checksum byte.
    ///
    /// The checksum byte itself is not added to the sum.
    pub fn finalize(mut self) -> std::io::Result<u8> {
        let checksum = !self.sum;
        self.inner.write_u8(checksum)?;
        Ok(checksum)
    }
}

impl<W> std::io::Write for Writer<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.sum = sum(&buf[..n]).wrapping_add(self.sum);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

pub fn sum(buf: &[u8]) -> u8 {
    buf.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Checksum of a region that has already been written out.
pub fn compute(buf: &[u8]) -> u8 {
    !sum(buf)
}
