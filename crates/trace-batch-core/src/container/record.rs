//! Fixed-width on-disk encoding of trace header records.
//!
//! One record is always [`RECORD_LEN`] bytes: the numeric fields in native
//! byte order, the four identity strings NUL-padded to
//! [`CODE_CAPACITY`](crate::batch::CODE_CAPACITY) bytes each, and the two
//! missing-flags as single bytes. The explicit field-by-field layout is
//! what gives the container its exact layout guarantee.

use bytes::{Buf, BufMut};

use crate::batch::{CODE_CAPACITY, TraceHeader};

/// Encoded length of one trace header record, bytes.
pub(crate) const RECORD_LEN: usize = 102;

pub(crate) fn encode(header: &TraceHeader, buf: &mut impl BufMut) {
    buf.put_u32_ne(header.npts);
    buf.put_f32_ne(header.dt);
    buf.put_f32_ne(header.b);
    buf.put_i32_ne(header.year);
    buf.put_i32_ne(header.yday);
    buf.put_i32_ne(header.hour);
    buf.put_i32_ne(header.min);
    buf.put_i32_ne(header.sec);
    buf.put_i32_ne(header.msec);
    buf.put_i64_ne(header.t);
    put_code(buf, &header.net);
    put_code(buf, &header.sta);
    put_code(buf, &header.chn);
    put_code(buf, &header.loc);
    buf.put_f32_ne(header.stla);
    buf.put_f32_ne(header.stlo);
    buf.put_f32_ne(header.stel);
    buf.put_f32_ne(header.stdp);
    buf.put_f32_ne(header.cmpaz);
    buf.put_f32_ne(header.cmpinc);
    buf.put_u8(header.no_coords as u8);
    buf.put_u8(header.no_orient as u8);
}

/// Decode one record from a buffer holding at least [`RECORD_LEN`] bytes.
pub(crate) fn decode(buf: &mut impl Buf) -> TraceHeader {
    debug_assert!(buf.remaining() >= RECORD_LEN);

    let npts = buf.get_u32_ne();
    let dt = buf.get_f32_ne();
    let b = buf.get_f32_ne();
    let year = buf.get_i32_ne();
    let yday = buf.get_i32_ne();
    let hour = buf.get_i32_ne();
    let min = buf.get_i32_ne();
    let sec = buf.get_i32_ne();
    let msec = buf.get_i32_ne();
    let t = buf.get_i64_ne();
    let net = get_code(buf);
    let sta = get_code(buf);
    let chn = get_code(buf);
    let loc = get_code(buf);
    let stla = buf.get_f32_ne();
    let stlo = buf.get_f32_ne();
    let stel = buf.get_f32_ne();
    let stdp = buf.get_f32_ne();
    let cmpaz = buf.get_f32_ne();
    let cmpinc = buf.get_f32_ne();
    let no_coords = buf.get_u8() != 0;
    let no_orient = buf.get_u8() != 0;

    TraceHeader {
        npts,
        dt,
        b,
        year,
        yday,
        hour,
        min,
        sec,
        msec,
        t,
        net,
        sta,
        chn,
        loc,
        stla,
        stlo,
        stel,
        stdp,
        cmpaz,
        cmpinc,
        no_coords,
        no_orient,
    }
}

fn put_code(buf: &mut impl BufMut, code: &str) {
    let mut field = [0u8; CODE_CAPACITY];
    let len = code.len().min(CODE_CAPACITY);
    field[..len].copy_from_slice(&code.as_bytes()[..len]);
    buf.put_slice(&field);
}

fn get_code(buf: &mut impl Buf) -> String {
    let mut field = [0u8; CODE_CAPACITY];
    buf.copy_to_slice(&mut field);
    let end = field.iter().position(|&b| b == 0).unwrap_or(CODE_CAPACITY);
    String::from_utf8_lossy(&field[..end]).into_owned()
}
