use crate::error::BoxError;
use crate::transport::{CheckBundle, Context, TrapResult, Transport};
use chrono::Utc;
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Counts the top level entries of an httptrap document. Gauge and text
/// metrics repeat their key once per timestamp, so every entry counts, not
/// every distinct key.
struct EntryCount;

impl<'de> Visitor<'de> for EntryCount {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an httptrap json object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<u64, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = 0;
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {
            entries += 1;
        }
        Ok(entries)
    }
}

fn count_entries(data: &[u8]) -> serde_json::Result<u64> {
    let mut de = serde_json::Deserializer::from_slice(data);
    let entries = (&mut de).deserialize_map(EntryCount)?;
    de.end()?;
    Ok(entries)
}

/// Console transport
///
/// Writes every submission, preceded by a timestamped header line, to the
/// wrapped writer. Submissions are parsed back the way a collector would so
/// `stats` carries the number of entries submitted.
#[derive(Debug)]
pub struct Console<W> {
    out: Mutex<W>,
}

impl Console<io::Stdout> {
    /// Create a Console transport writing to stdout
    pub fn stdout() -> Console<io::Stdout> {
        Console::new(io::stdout())
    }
}

impl<W> Console<W>
where
    W: Write + Send,
{
    /// Create a Console transport writing to `out`
    pub fn new(out: W) -> Console<W> {
        Console {
            out: Mutex::new(out),
        }
    }

    /// Recover the wrapped writer
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W> Transport for Console<W>
where
    W: Write + Send,
{
    fn send_metrics(&self, _: &Context, data: &[u8]) -> Result<TrapResult, BoxError> {
        let start = Instant::now();
        let (stats, error) = match count_entries(data) {
            Ok(entries) => (entries, String::new()),
            Err(e) => (0, format!("invalid httptrap json: {}", e)),
        };

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "Flushing metrics: {}", Utc::now().to_rfc3339())?;
        out.write_all(data)?;
        out.write_all(b"\n")?;
        out.flush()?;

        let elapsed = start.elapsed();
        Ok(TrapResult {
            error,
            stats,
            submit_duration: elapsed,
            last_req_duration: elapsed,
            bytes_sent: data.len() as u64,
            ..Default::default()
        })
    }

    fn update_check_tags(
        &self,
        _: &Context,
        tags: &[String],
    ) -> Result<Option<CheckBundle>, BoxError> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "Check tags: {}", tags.join(","))?;
        Ok(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn writes_submission() {
        let console = Console::new(Vec::new());
        let data = br#"{"a":{"_type":"i","_ts":1,"_value":1},"b":{"_type":"i","_ts":1,"_value":2}}"#;
        let res = console.send_metrics(&Context::new(), data).unwrap();
        assert_eq!(2, res.stats);
        assert_eq!(data.len() as u64, res.bytes_sent);
        assert_eq!("", res.error);

        let out = String::from_utf8(console.into_inner()).unwrap();
        let mut lines = out.lines();
        assert!(lines.next().unwrap().starts_with("Flushing metrics: "));
        assert_eq!(Some(&String::from_utf8_lossy(data)[..]), lines.next());
    }

    #[test]
    fn counts_repeated_keys() {
        let console = Console::new(Vec::new());
        let data = br#"{"g":{"_type":"i","_ts":1000,"_value":1},"g":{"_type":"i","_ts":2000,"_value":2},"c":{"_type":"l","_ts":5,"_value":"3"}}"#;
        let res = console.send_metrics(&Context::new(), data).unwrap();
        assert_eq!(3, res.stats);
    }

    #[test]
    fn reports_trailing_garbage() {
        let console = Console::new(Vec::new());
        let res = console.send_metrics(&Context::new(), b"{} {}").unwrap();
        assert_eq!(0, res.stats);
        assert!(!res.error.is_empty());
    }

    #[test]
    fn reports_unparseable_submission() {
        let console = Console::new(Vec::new());
        let res = console.send_metrics(&Context::new(), b"{nope").unwrap();
        assert_eq!(0, res.stats);
        assert!(res.error.starts_with("invalid httptrap json"));
    }

    #[test]
    fn writes_check_tags() {
        let console = Console::new(Vec::new());
        let tags = vec!["a:b".to_string(), "c:d".to_string()];
        assert_eq!(None, console.update_check_tags(&Context::new(), &tags).unwrap());
        let out = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!("Check tags: a:b,c:d\n", out);
    }
}
