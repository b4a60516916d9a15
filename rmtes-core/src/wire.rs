//! Кадр на проводе: `u32` BE длина | версия | postcard(`Envelope`).
//!
//! Длина покрывает версию и payload.

use std::io::{self, Read, Write};

use crate::error::WireError;
use crate::message::Envelope;

/// Версия wire-формата
pub const WIRE_VERSION: u8 = 1;

/// Верхняя граница длины кадра
pub const MAX_FRAME_LEN: usize = 1 << 20;

const LEN_PREFIX: usize = 4;

/// Сериализует сообщение в кадр
pub fn encode_frame(env: &Envelope) -> Result<Vec<u8>, WireError> {
    let body = postcard::to_allocvec(env)?;
    let len = body.len() + 1;
    if len > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLong(len));
    }

    let mut out = Vec::with_capacity(LEN_PREFIX + len);
    out.extend_from_slice(&(len as u32).to_be_bytes());
    out.push(WIRE_VERSION);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Разбирает тело кадра (без префикса длины)
pub fn decode_body(buf: &[u8]) -> Result<Envelope, WireError> {
    let (&ver, payload) = buf.split_first().ok_or(WireError::FrameTooShort)?;
    if ver != WIRE_VERSION {
        return Err(WireError::UnsupportedWireVersion(ver));
    }
    Ok(postcard::from_bytes(payload)?)
}

/// Пишет кадр в поток
pub fn write_frame<W: Write>(w: &mut W, env: &Envelope) -> io::Result<()> {
    let frame = encode_frame(env).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    w.write_all(&frame)?;
    w.flush()
}

/// Читает один кадр. `Ok(None)` - чистый EOF на границе кадра.
///
/// `buf` переиспользуется между вызовами.
pub fn read_frame<R: Read>(r: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<Envelope>> {
    let mut len_bytes = [0u8; LEN_PREFIX];
    match r.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, WireError::FrameTooShort));
    }
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            WireError::FrameTooLong(len),
        ));
    }

    buf.clear();
    buf.resize(len, 0);
    r.read_exact(buf)?;

    decode_body(buf)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
