/// Variable-byte integers stop growing once the shift passes this bound.
const MAX_VB_SHIFT: u32 = 28;

/// BBL data stream for reading the header lines and binary frames.
///
/// Reads never fail: running off the end of the buffer is reported as `None`
/// and callers decide what a truncated read means.
pub struct BBLDataStream<'a> {
    data: &'a [u8],
    pub pos: usize,
    end: usize,
    pub eof: bool,
}

impl<'a> BBLDataStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
            eof: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        if self.pos < self.end {
            let byte = self.data[self.pos];
            self.pos += 1;
            Some(byte)
        } else {
            self.eof = true;
            None
        }
    }

    /// Read up to the next line feed. Carriage returns are dropped and the
    /// terminator is not included.
    ///
    /// Returns `None` only when the stream was already exhausted; a blank
    /// line comes back as an empty vector.
    pub fn read_line(&mut self) -> Option<Vec<u8>> {
        if self.pos >= self.end {
            self.eof = true;
            return None;
        }

        let mut line = Vec::new();
        while let Some(byte) = self.read_byte() {
            match byte {
                b'\n' => break,
                b'\r' => {}
                _ => line.push(byte),
            }
        }
        Some(line)
    }

    /// Step back `count` bytes. Only the header parser uses this, to hand a
    /// field-definition line to the next stage.
    pub fn rewind(&mut self, count: usize) {
        self.pos = self.pos.saturating_sub(count);
        self.eof = self.pos >= self.end;
    }

    /// Read unsigned variable byte
    pub fn read_unsigned_vb(&mut self) -> Option<u64> {
        self.read_vb().map(|(value, _)| value)
    }

    /// Read signed variable byte.
    ///
    /// The sign lives in the top data bit of the last group, so the value is
    /// sign-extended from bit `shift + 6`. This is not ZigZag.
    pub fn read_signed_vb(&mut self) -> Option<i64> {
        let (magnitude, shift) = self.read_vb()?;

        let mut value = magnitude as i64;
        if magnitude & (1u64 << (shift + 6)) != 0 {
            value -= 1i64 << (shift + 7);
        }
        Some(value)
    }

    /// Read negative 14-bit encoding: a little-endian u16, low 14 bits,
    /// negated.
    pub fn read_neg_14bit(&mut self) -> Option<i64> {
        let byte1 = self.read_byte()?;
        let byte2 = self.read_byte()?;

        let unsigned_value = u16::from_le_bytes([byte1, byte2]) & 0x3fff;
        Some(-i64::from(unsigned_value))
    }

    fn read_vb(&mut self) -> Option<(u64, u32)> {
        let mut result = 0u64;
        let mut shift = 0u32;

        loop {
            let b = self.read_byte()?;
            result |= u64::from(b & 0x7f) << shift;

            // Final byte?
            if b & 0x80 == 0 {
                break;
            }

            shift += 7;
            if shift > MAX_VB_SHIFT {
                break;
            }
        }

        Some((result, shift))
    }
}
