//! A log-linear histogram, the distribution type the collector ingests.
//!
//! Every sample lands in a bin of two significant decimal digits,
//! `val / 10 * 10^exp` with `10 <= |val| <= 99`. Zero has a bin of its own and
//! anything that cannot be binned (NaN, infinities, overflowing exponents)
//! falls in the invalid bin. Bins carry a count and histograms merge by
//! summing counts, so one histogram can soak up a whole flush interval.
//!
//! The binary serialization is a wire contract with the collector and must
//! stay byte for byte identical to the reference encoder:
//!
//! ```text
//! i16 (BE)  number of non-empty bins
//! per bin, ascending:
//!   i8      val
//!   i8      exp
//!   u8      t, the count is stored in t + 1 bytes
//!   [u8]    count, big endian
//! ```

use byteorder::{BigEndian, WriteBytesExt};
use std::cmp::Ordering;
use std::io::{self, Write};
use std::ops::AddAssign;
use std::time::Duration;

lazy_static! {
    /// 10^(i - 128), each entry the correctly rounded double.
    static ref POWER_OF_TEN: Vec<f64> = (0..256)
        .map(|i: i32| format!("1e{}", i - 128).parse::<f64>().unwrap_or(0.0))
        .collect();
}

#[inline]
fn power_of_ten(exp: i8) -> f64 {
    POWER_OF_TEN[(i32::from(exp) + 128) as usize]
}

/// Largest count length index. Counts use at most eight bytes.
const MAX_COUNT_LEN: u8 = 7;

/// The operations metric recording needs from a distribution. Anything that
/// can take values and produce the collector's binary format can stand in for
/// `Histogram`.
pub trait Distribution {
    /// Record a single value.
    fn record_value(&mut self, value: f64);
    /// Record a duration, in seconds with nanosecond resolution.
    fn record_duration(&mut self, value: Duration);
    /// Record `count` occurrences of `value`.
    fn record_count_for_value(&mut self, count: u64, value: f64);
    /// Write the canonical binary serialization.
    fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()>;
}

/// A histogram bin, `val / 10 * 10^exp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bin {
    val: i8,
    exp: i8,
}

impl Bin {
    /// The bin holding exact zeros.
    pub const ZERO: Bin = Bin { val: 0, exp: 0 };
    /// The bin holding everything that is not a representable number.
    pub const INVALID: Bin = Bin { val: -1, exp: 0 };

    /// Construct a bin from its raw parts.
    pub fn new(val: i8, exp: i8) -> Bin {
        Bin { val, exp }
    }

    /// Two significant digits of the bin's lower bound magnitude.
    pub fn val(&self) -> i8 {
        self.val
    }

    /// Decimal exponent of the bin.
    pub fn exp(&self) -> i8 {
        self.exp
    }

    /// Bin a floating point value.
    pub fn from_f64(d: f64) -> Bin {
        if d.is_nan() || d.is_infinite() {
            return Bin::INVALID;
        }
        if d == 0.0 {
            return Bin::ZERO;
        }
        let sign: i32 = if d.is_sign_negative() { -1 } else { 1 };
        let d = d.abs();
        let big_exp = d.log10().floor() as i32;
        if big_exp < i32::from(i8::min_value()) || big_exp > i32::from(i8::max_value()) {
            return if big_exp < 0 { Bin::ZERO } else { Bin::INVALID };
        }
        let mut exp = big_exp as i8;
        let scaled = d / power_of_ten(exp) * 10.0;
        let mut val = sign * (scaled + 1e-13).floor() as i32;
        if val == 100 || val == -100 {
            if exp < i8::max_value() {
                val /= 10;
                exp += 1;
            } else {
                return Bin::ZERO;
            }
        }
        if val == 0 {
            return Bin::ZERO;
        }
        if !((val >= 10 && val < 100) || (val <= -10 && val > -100)) {
            return Bin::INVALID;
        }
        Bin {
            val: val as i8,
            exp,
        }
    }

    /// Bin an integer value scaled by a power of ten, `value * 10^scale`.
    /// Exact, no floating point involved.
    pub fn from_int_scale(value: i64, scale: i32) -> Bin {
        if value == 0 {
            return Bin::ZERO;
        }
        let sign: i64 = if value < 0 { -1 } else { 1 };
        let mut v = i128::from(value).abs();
        let mut scale = scale + 1;
        if v < 10 {
            v *= 10;
            scale -= 1;
        }
        while v >= 100 {
            v /= 10;
            scale += 1;
        }
        if scale < i32::from(i8::min_value()) {
            return Bin::ZERO;
        }
        if scale > i32::from(i8::max_value()) {
            return Bin::INVALID;
        }
        Bin {
            val: (sign * v as i64) as i8,
            exp: scale as i8,
        }
    }

    /// Position of the bin on the wire. Zero first, then by decade and
    /// magnitude; for equal magnitudes negative sorts first.
    fn order_key(&self) -> (i32, i8, i8) {
        let magnitude = if self.val == 0 {
            0
        } else {
            ((i32::from(self.exp) + 256) << 8) + i32::from(self.val).abs()
        };
        (magnitude, self.val, self.exp)
    }
}

impl Ord for Bin {
    fn cmp(&self, other: &Bin) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl PartialOrd for Bin {
    fn partial_cmp(&self, other: &Bin) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A mergeable log-linear histogram.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Histogram {
    bins: Vec<(Bin, u64)>,
}

impl Histogram {
    /// Create an empty histogram
    pub fn new() -> Histogram {
        Histogram::default()
    }

    /// Add `count` to `bin`, creating it if need be. Counts saturate.
    pub fn insert(&mut self, bin: Bin, count: u64) {
        match self.bins.binary_search_by(|probe| probe.0.cmp(&bin)) {
            Ok(idx) => {
                let c = &mut self.bins[idx].1;
                *c = c.saturating_add(count);
            }
            Err(idx) => self.bins.insert(idx, (bin, count)),
        }
    }

    /// Record `count` occurrences of `value * 10^scale`.
    pub fn record_int_scale(&mut self, value: i64, scale: i32, count: u64) {
        self.insert(Bin::from_int_scale(value, scale), count);
    }

    /// Count recorded in `bin`.
    pub fn get(&self, bin: Bin) -> u64 {
        match self.bins.binary_search_by(|probe| probe.0.cmp(&bin)) {
            Ok(idx) => self.bins[idx].1,
            Err(_) => 0,
        }
    }

    /// Total number of recorded samples.
    pub fn count(&self) -> u64 {
        self.bins
            .iter()
            .fold(0u64, |acc, &(_, c)| acc.saturating_add(c))
    }

    /// Determine if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.bins.iter().all(|&(_, c)| c == 0)
    }

    /// Iterate the bins in wire order.
    pub fn bins(&self) -> impl Iterator<Item = &(Bin, u64)> {
        self.bins.iter()
    }

    /// The serialization, base64 encoded, as the httptrap JSON carries it.
    pub fn serialize_b64(&self) -> io::Result<String> {
        let mut buf = Vec::with_capacity(2 + self.bins.len() * 4);
        self.serialize(&mut buf)?;
        Ok(base64::encode(&buf))
    }
}

impl<'a> AddAssign<&'a Histogram> for Histogram {
    fn add_assign(&mut self, rhs: &'a Histogram) {
        for &(bin, count) in &rhs.bins {
            self.insert(bin, count);
        }
    }
}

#[inline]
fn count_len(count: u64) -> u8 {
    for i in 0..MAX_COUNT_LEN {
        if count < 1u64 << (8 * (u32::from(i) + 1)) {
            return i;
        }
    }
    MAX_COUNT_LEN
}

impl Distribution for Histogram {
    fn record_value(&mut self, value: f64) {
        self.insert(Bin::from_f64(value), 1);
    }

    fn record_duration(&mut self, value: Duration) {
        let nanos = value.as_nanos();
        let nanos = if nanos > i64::max_value() as u128 {
            i64::max_value()
        } else {
            nanos as i64
        };
        self.record_int_scale(nanos, -9, 1);
    }

    fn record_count_for_value(&mut self, count: u64, value: f64) {
        self.insert(Bin::from_f64(value), count);
    }

    fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let nbins = self.bins.iter().filter(|&&(_, c)| c != 0).count();
        w.write_i16::<BigEndian>(nbins as i16)?;
        for &(bin, count) in self.bins.iter().filter(|&&(_, c)| c != 0) {
            w.write_i8(bin.val)?;
            w.write_i8(bin.exp)?;
            let len = count_len(count);
            w.write_u8(len)?;
            for i in (0..=len).rev() {
                w.write_u8((count >> (u32::from(i) * 8)) as u8)?;
            }
        }
        Ok(())
    }
}
