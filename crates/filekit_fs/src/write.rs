use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};

use crate::charset::Charset;
use crate::error::{Error, Result};
use crate::handle::LINE_SEPARATOR;
use crate::stream::{copy_stream, Writer};
use crate::FileHandle;

const WRITE_TO: &str = "write to";

impl FileHandle {
    fn write_error(&self, source: io::Error) -> Error {
        Error::operate_io(format!("Error writing file: {}", self.path()), source)
    }

    /// Opens the file for writing after creating missing parent directories.
    fn open_write(&self, append: bool) -> Result<File> {
        self.parent().create_dirs();
        OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(self.as_path())
            .map_err(|e| {
                if self.is_directory() {
                    Error::operate_io(
                        format!("Cannot open a stream to a directory: {}", self.path()),
                        e,
                    )
                } else {
                    self.write_error(e)
                }
            })
    }

    /// Opens a byte sink, appending or truncating. Parent directories are
    /// created as needed. The caller owns the returned file.
    pub fn write(&self, append: bool) -> Result<File> {
        self.ensure_writable(WRITE_TO)?;
        self.open_write(append)
    }

    pub fn write_buffered(&self, append: bool, buffer_size: usize) -> Result<BufWriter<File>> {
        Ok(BufWriter::with_capacity(buffer_size, self.write(append)?))
    }

    /// Copies everything from `input` into this file. Both streams are
    /// dropped before returning, whether the copy succeeded or not.
    pub fn write_from<R: Read>(&self, mut input: R, append: bool) -> Result<()> {
        self.ensure_writable(WRITE_TO)?;
        let message = || format!("Error stream writing to file: {}", self.path());

        let mut output = self
            .open_write(append)
            .map_err(|e| Error::nested(message(), e))?;
        copy_stream(&mut input, &mut output)
            .and_then(|_| output.flush())
            .map_err(|e| Error::operate_io(message(), e))
    }

    /// Opens a text sink in `charset` (`None` selects UTF-8). An unsupported
    /// charset is rejected before the file is touched.
    pub fn writer(&self, append: bool, charset: Option<&str>) -> Result<Writer> {
        self.ensure_writable(WRITE_TO)?;
        let charset = Charset::lookup(charset).map_err(|e| self.write_error(e))?;
        Ok(Writer::new(self.open_write(append)?, charset))
    }

    pub fn write_bytes(&self, bytes: &[u8], append: bool) -> Result<&Self> {
        self.ensure_writable(WRITE_TO)?;
        let mut output = self.open_write(append)?;
        output.write_all(bytes).map_err(|e| self.write_error(e))?;
        Ok(self)
    }

    /// Writes `bytes[offset..offset + length]`.
    pub fn write_bytes_range(
        &self,
        bytes: &[u8],
        offset: usize,
        length: usize,
        append: bool,
    ) -> Result<&Self> {
        self.ensure_writable(WRITE_TO)?;
        let range = offset
            .checked_add(length)
            .filter(|end| *end <= bytes.len())
            .map(|end| offset..end)
            .ok_or_else(|| {
                Error::operate(format!(
                    "Cannot write {length} bytes at offset {offset} from {} bytes: {}",
                    bytes.len(),
                    self.path()
                ))
            })?;
        self.write_bytes(&bytes[range], append)
    }

    pub fn write_string(&self, text: &str, append: bool) -> Result<&Self> {
        self.write_string_with(text, append, None)
    }

    pub fn write_string_with(
        &self,
        text: &str,
        append: bool,
        charset: Option<&str>,
    ) -> Result<&Self> {
        let mut writer = self.writer(append, charset)?;
        writer
            .write_str(text)
            .and_then(|_| writer.flush())
            .map_err(|e| self.write_error(e))?;
        Ok(self)
    }

    /// Appends `text` and then the line separator.
    ///
    /// These are two separate appends. If the second one fails the file is
    /// left without the trailing separator.
    pub fn write_line(&self, text: &str) -> Result<&Self> {
        self.write_string(text, true)?
            .write_string(LINE_SEPARATOR, true)
    }
}
