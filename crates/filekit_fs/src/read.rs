use std::fs::File;
use std::io::{self, BufReader, Read};

use crate::charset::Charset;
use crate::error::{Error, Result};
use crate::stream::{ByteStream, Reader};
use crate::FileHandle;

/// Buffer hint used when the length of a file is unknown or zero.
const FALLBACK_CAPACITY: usize = 512;

impl FileHandle {
    fn read_error(&self, source: io::Error) -> Error {
        Error::operate_io(format!("Error reading file: {}", self.path()), source)
    }

    /// Opens a byte stream over the file. The caller owns the stream.
    pub fn read(&self) -> Result<ByteStream> {
        if let Some(bundle) = self.bundle() {
            return bundle.open(self.path()).map_err(|e| self.read_error(e));
        }

        if self.is_directory() {
            return Err(Error::operate(format!(
                "Cannot open a stream to a directory: {}",
                self.path()
            )));
        }
        File::open(self.as_path())
            .map(|file| Box::new(file) as ByteStream)
            .map_err(|e| self.read_error(e))
    }

    pub fn read_buffered(&self, buffer_size: usize) -> Result<BufReader<ByteStream>> {
        Ok(BufReader::with_capacity(buffer_size, self.read()?))
    }

    /// Opens a text reader. `None` selects UTF-8.
    pub fn reader(&self, charset: Option<&str>) -> Result<Reader> {
        let stream = self.read()?;
        match Charset::lookup(charset) {
            Ok(charset) => Ok(Reader::new(stream, charset)),
            Err(error) => {
                drop(stream);
                Err(self.read_error(error))
            }
        }
    }

    pub fn reader_buffered(
        &self,
        buffer_size: usize,
        charset: Option<&str>,
    ) -> Result<BufReader<Reader>> {
        Ok(BufReader::with_capacity(buffer_size, self.reader(charset)?))
    }

    /// Reads the whole file into a string.
    pub fn read_string(&self, charset: Option<&str>) -> Result<String> {
        let mut reader = self.reader(charset)?;
        let mut output = String::with_capacity(self.estimate_length());
        reader
            .read_to_string(&mut output)
            .map_err(|e| self.read_error(e))?;
        Ok(output)
    }

    /// Reads the whole file into a byte vector.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        let mut input = self.read()?;
        let mut output = Vec::with_capacity(self.estimate_length());
        input
            .read_to_end(&mut output)
            .map_err(|e| self.read_error(e))?;
        Ok(output)
    }

    /// Reads up to `size` bytes into `buffer[offset..]` and returns how many
    /// were read, which is less than `size` when the file ends first.
    pub fn read_bytes_into(&self, buffer: &mut [u8], offset: usize, size: usize) -> Result<usize> {
        let end = offset
            .checked_add(size)
            .filter(|end| *end <= buffer.len())
            .ok_or_else(|| {
                Error::operate(format!(
                    "Cannot read {size} bytes at offset {offset} into a buffer of {} bytes: {}",
                    buffer.len(),
                    self.path()
                ))
            })?;

        let mut input = self.read()?;
        let target = &mut buffer[offset..end];
        let mut position = 0;
        while position < target.len() {
            match input.read(&mut target[position..]) {
                Ok(0) => break,
                Ok(count) => position += count,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(self.read_error(error)),
            }
        }
        Ok(position)
    }

    fn estimate_length(&self) -> usize {
        match self.length() {
            0 => FALLBACK_CAPACITY,
            length => usize::try_from(length).unwrap_or(FALLBACK_CAPACITY),
        }
    }
}
