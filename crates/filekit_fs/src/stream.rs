use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use crate::charset::{Charset, Decoder, Encoder};

pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Byte stream returned by [`crate::FileHandle::read`].
pub type ByteStream = Box<dyn Read + Send>;

/// Copies everything from `input` into `output` through a
/// [`DEFAULT_BUFFER_SIZE`] buffer. Neither stream is closed.
pub fn copy_stream<R: Read + ?Sized, W: Write + ?Sized>(
    input: &mut R,
    output: &mut W,
) -> io::Result<u64> {
    let mut buffer = [0u8; DEFAULT_BUFFER_SIZE];
    let mut copied = 0u64;
    loop {
        let count = match input.read(&mut buffer) {
            Ok(0) => return Ok(copied),
            Ok(count) => count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        output.write_all(&buffer[..count])?;
        copied += count as u64;
    }
}

/// Text reader that decodes a byte stream from a [`Charset`] and yields
/// UTF-8 through [`Read`], so `read_to_string` and `BufRead::lines` work
/// for every supported charset.
pub struct Reader {
    inner: ByteStream,
    decoder: Decoder,
    pending: Vec<u8>,
    decoded: Vec<u8>,
    position: usize,
    eof: bool,
}

impl Reader {
    pub fn new(inner: ByteStream, charset: Charset) -> Self {
        Self {
            inner,
            decoder: Decoder::new(charset),
            pending: Vec::new(),
            decoded: Vec::new(),
            position: 0,
            eof: false,
        }
    }

    pub fn charset(&self) -> Charset {
        self.decoder.charset()
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut chunk = [0u8; DEFAULT_BUFFER_SIZE];
        while self.position >= self.decoded.len() && !self.eof {
            match self.inner.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(count) => self.pending.extend_from_slice(&chunk[..count]),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }

            let mut text = String::new();
            let consumed = self.decoder.decode(&self.pending, self.eof, &mut text);
            self.pending.drain(..consumed);
            self.decoded = text.into_bytes();
            self.position = 0;
        }
        Ok(())
    }
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.fill()?;
        let available = &self.decoded[self.position..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.position += count;
        Ok(count)
    }
}

/// Text writer that accepts UTF-8 through [`Write`] and encodes it into a
/// [`Charset`]. A UTF-8 sequence split across two `write` calls is held
/// back until it is complete. Output is buffered and flushed on drop.
pub struct Writer<W: Write = File> {
    inner: BufWriter<W>,
    encoder: Encoder,
    charset: Charset,
    pending: Vec<u8>,
}

impl<W: Write> Writer<W> {
    pub fn new(inner: W, charset: Charset) -> Self {
        Self {
            inner: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, inner),
            encoder: Encoder::new(charset),
            charset,
            pending: Vec::new(),
        }
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.write_all(text.as_bytes())
    }

    /// Flushes everything and returns the underlying sink. Fails if a
    /// partial UTF-8 sequence is still pending.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "stream ended inside a UTF-8 sequence",
            ));
        }
        self.inner.flush()?;
        self.inner.into_inner().map_err(|error| error.into_error())
    }
}

impl<W: Write> Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(error) if error.error_len().is_none() => error.valid_up_to(),
            Err(error) => {
                self.pending.truncate(self.pending.len() - buf.len());
                return Err(io::Error::new(io::ErrorKind::InvalidData, error));
            }
        };

        let text = std::str::from_utf8(&self.pending[..valid])
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        let mut encoded = Vec::with_capacity(valid);
        self.encoder.encode(text, &mut encoded);
        self.inner.write_all(&encoded)?;
        self.pending.drain(..valid);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod test {
    use std::io::{BufRead, BufReader, Cursor};

    use pretty_assertions::assert_eq;

    use super::*;

    /// Reader that hands out at most one byte per call
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn test_copy_stream_copies_everything() {
        let content = vec![7u8; DEFAULT_BUFFER_SIZE * 2 + 13];
        let mut output = Vec::new();

        let copied = copy_stream(&mut Cursor::new(content.clone()), &mut output).unwrap();

        assert_eq!(copied, content.len() as u64);
        assert_eq!(output, content);
    }

    #[test]
    fn test_reader_decodes_across_tiny_reads() {
        let encoded = Charset::Utf16Le.encode("añb🦀");
        let mut reader = Reader::new(Box::new(Trickle(Cursor::new(encoded))), Charset::Utf16Le);

        let mut actual = String::new();
        reader.read_to_string(&mut actual).unwrap();

        assert_eq!(actual, "añb🦀");
    }

    #[test]
    fn test_reader_supports_line_iteration() {
        let encoded = Charset::Latin1.encode("één\ntwee\n");
        let reader = Reader::new(Box::new(Cursor::new(encoded)), Charset::Latin1);

        let actual: Vec<String> = BufReader::new(reader).lines().map(|l| l.unwrap()).collect();

        assert_eq!(actual, vec!["één".to_string(), "twee".to_string()]);
    }

    #[test]
    fn test_writer_holds_back_split_utf8_sequences() {
        let mut writer = Writer::new(Vec::new(), Charset::Utf16Be);
        let bytes = "é".as_bytes();

        writer.write_all(&bytes[..1]).unwrap();
        writer.write_all(&bytes[1..]).unwrap();
        let actual = writer.finish().unwrap();

        assert_eq!(actual, vec![0x00, 0xE9]);
    }

    #[test]
    fn test_writer_rejects_invalid_utf8() {
        let mut writer = Writer::new(Vec::new(), Charset::Utf8);

        let error = writer.write(&[b'a', 0xFF]).unwrap_err();

        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_finish_fails_on_dangling_sequence() {
        let mut writer = Writer::new(Vec::new(), Charset::Utf8);
        writer.write_all(&"é".as_bytes()[..1]).unwrap();

        assert!(writer.finish().is_err());
    }
}
