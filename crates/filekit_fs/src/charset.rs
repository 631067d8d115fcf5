use std::io;
use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;
const UNMAPPABLE: u8 = b'?';
const BOM: u16 = 0xFEFF;

/// Character sets understood by the text readers and writers.
///
/// Names parse case-insensitively, so `"utf-8"`, `"UTF8"` and `"Utf-8"` all
/// resolve to [`Charset::Utf8`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Charset {
    #[default]
    #[strum(to_string = "UTF-8", serialize = "utf8")]
    Utf8,
    /// Byte order is taken from a leading BOM (big-endian when absent).
    /// Encoding writes a big-endian BOM first.
    #[strum(to_string = "UTF-16", serialize = "utf16")]
    Utf16,
    #[strum(to_string = "UTF-16BE", serialize = "utf16be")]
    Utf16Be,
    #[strum(to_string = "UTF-16LE", serialize = "utf16le")]
    Utf16Le,
    #[strum(
        to_string = "ISO-8859-1",
        serialize = "iso8859-1",
        serialize = "iso_8859_1",
        serialize = "latin1"
    )]
    Latin1,
    #[strum(to_string = "US-ASCII", serialize = "ascii")]
    Ascii,
}

impl Charset {
    /// Resolves an optional charset name, falling back to UTF-8 for `None`.
    pub fn lookup(name: Option<&str>) -> io::Result<Self> {
        match name {
            None => Ok(Self::default()),
            Some(name) => Self::from_str(name.trim()).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Unsupported charset: {name}"),
                )
            }),
        }
    }

    /// Decodes a complete byte sequence. Malformed input becomes U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> String {
        let mut text = String::with_capacity(bytes.len());
        Decoder::new(self).decode(bytes, true, &mut text);
        text
    }

    /// Encodes text. Characters the charset cannot represent become `?`.
    pub fn encode(self, text: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(text.len());
        Encoder::new(self).encode(text, &mut bytes);
        bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Big,
    Little,
}

/// Incremental decoder that carries partial sequences between chunks.
#[derive(Debug)]
pub(crate) struct Decoder {
    charset: Charset,
    endian: Option<Endian>,
}

impl Decoder {
    pub(crate) fn new(charset: Charset) -> Self {
        let endian = match charset {
            Charset::Utf16Be => Some(Endian::Big),
            Charset::Utf16Le => Some(Endian::Little),
            _ => None,
        };
        Self { charset, endian }
    }

    pub(crate) fn charset(&self) -> Charset {
        self.charset
    }

    /// Decodes as much of `bytes` as forms complete characters and returns
    /// the number of bytes consumed. With `eof` set everything is consumed.
    pub(crate) fn decode(&mut self, bytes: &[u8], eof: bool, out: &mut String) -> usize {
        match self.charset {
            Charset::Utf8 => decode_utf8(bytes, eof, out),
            Charset::Latin1 => {
                out.extend(bytes.iter().map(|&b| char::from(b)));
                bytes.len()
            }
            Charset::Ascii => {
                out.extend(
                    bytes
                        .iter()
                        .map(|&b| if b.is_ascii() { char::from(b) } else { REPLACEMENT }),
                );
                bytes.len()
            }
            Charset::Utf16 | Charset::Utf16Be | Charset::Utf16Le => {
                let mut skipped = 0;
                let endian = match self.endian {
                    Some(endian) => endian,
                    None if bytes.len() < 2 && !eof => return 0,
                    None => {
                        let endian = match bytes {
                            [0xFF, 0xFE, ..] => {
                                skipped = 2;
                                Endian::Little
                            }
                            [0xFE, 0xFF, ..] => {
                                skipped = 2;
                                Endian::Big
                            }
                            _ => Endian::Big,
                        };
                        self.endian = Some(endian);
                        endian
                    }
                };
                skipped + decode_utf16(&bytes[skipped..], endian, eof, out)
            }
        }
    }
}

fn decode_utf8(bytes: &[u8], eof: bool, out: &mut String) -> usize {
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                out.push_str(text);
                return bytes.len();
            }
            Err(error) => {
                let valid = error.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                match error.error_len() {
                    Some(len) => {
                        out.push(REPLACEMENT);
                        rest = &rest[valid + len..];
                    }
                    // Incomplete sequence at the end of the chunk
                    None if eof => {
                        out.push(REPLACEMENT);
                        return bytes.len();
                    }
                    None => return bytes.len() - (rest.len() - valid),
                }
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], endian: Endian, eof: bool, out: &mut String) -> usize {
    let even = bytes.len() & !1;
    let mut units: Vec<u16> = bytes[..even]
        .chunks_exact(2)
        .map(|pair| match endian {
            Endian::Big => u16::from_be_bytes([pair[0], pair[1]]),
            Endian::Little => u16::from_le_bytes([pair[0], pair[1]]),
        })
        .collect();
    let mut consumed = even;

    // A trailing high surrogate waits for its pair in the next chunk
    if !eof && units.last().is_some_and(|unit| (0xD800..=0xDBFF).contains(unit)) {
        units.pop();
        consumed -= 2;
    }

    out.extend(char::decode_utf16(units).map(|unit| unit.unwrap_or(REPLACEMENT)));

    if eof && even < bytes.len() {
        out.push(REPLACEMENT);
        return bytes.len();
    }
    consumed
}

/// Stateful encoder; the UTF-16 BOM is written once per encoder.
#[derive(Debug)]
pub(crate) struct Encoder {
    charset: Charset,
    bom_pending: bool,
}

impl Encoder {
    pub(crate) fn new(charset: Charset) -> Self {
        Self { charset, bom_pending: charset == Charset::Utf16 }
    }

    pub(crate) fn encode(&mut self, text: &str, out: &mut Vec<u8>) {
        match self.charset {
            Charset::Utf8 => out.extend_from_slice(text.as_bytes()),
            Charset::Latin1 => out.extend(
                text.chars()
                    .map(|c| u8::try_from(u32::from(c)).unwrap_or(UNMAPPABLE)),
            ),
            Charset::Ascii => out.extend(text.chars().map(|c| {
                if c.is_ascii() {
                    c as u8
                } else {
                    UNMAPPABLE
                }
            })),
            Charset::Utf16 | Charset::Utf16Be => {
                if std::mem::take(&mut self.bom_pending) {
                    out.extend_from_slice(&BOM.to_be_bytes());
                }
                out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
            }
            Charset::Utf16Le => out.extend(text.encode_utf16().flat_map(u16::to_le_bytes)),
        }
    }
}
