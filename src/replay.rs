//! Replay Module
//!
//! Reads the call count and input/output history of an instrumented
//! operation and renders it as a call log.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::cache::HistoryKeys;
use crate::error::Result;
use crate::store::KvStore;

// == Call Entry ==
/// One recorded call: rendered argument tuple and rendered result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallEntry {
    pub input: String,
    pub output: String,
}

// == Call Log ==
/// Call history of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallLog {
    /// Operation name
    pub name: String,
    /// Value of the invocation counter
    pub calls: i64,
    /// Recorded calls, oldest first
    pub entries: Vec<CallEntry>,
}

impl CallLog {
    /// Loads the call log of `name` from `store`.
    ///
    /// A missing or non-numeric counter reads as `0`. Input and output lists
    /// are paired by position; a surplus on either side is dropped. Entries
    /// that are not valid UTF-8 render as an empty string.
    pub async fn load<S: KvStore>(store: &S, name: &str) -> Result<Self> {
        let keys = HistoryKeys::for_operation(name);

        let calls = store
            .get(&keys.counter)
            .await?
            .and_then(|raw| String::from_utf8(raw).ok())
            .and_then(|text| text.trim().parse::<i64>().ok())
            .unwrap_or(0);

        let inputs = store.lrange(&keys.inputs, 0, -1).await?;
        let outputs = store.lrange(&keys.outputs, 0, -1).await?;

        let entries = inputs
            .into_iter()
            .zip(outputs)
            .map(|(input, output)| CallEntry {
                input: text_or_empty(input),
                output: text_or_empty(output),
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            calls,
            entries,
        })
    }
}

impl fmt::Display for CallLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} was called {} times:", self.name, self.calls)?;
        for entry in &self.entries {
            writeln!(f, "{}(*{}) -> {}", self.name, entry.input, entry.output)?;
        }
        Ok(())
    }
}

fn text_or_empty(raw: Vec<u8>) -> String {
    String::from_utf8(raw).unwrap_or_default()
}

// == Replay ==
/// Prints the call log of `name` to stdout.
pub async fn replay<S: KvStore>(store: &S, name: &str) -> Result<()> {
    let log = CallLog::load(store, name).await?;
    write_log(&log, &mut io::stdout().lock())
}

/// Writes the call log of `name` to `out`.
pub async fn replay_to<S: KvStore, W: Write>(store: &S, name: &str, out: &mut W) -> Result<()> {
    let log = CallLog::load(store, name).await?;
    write_log(&log, out)
}

fn write_log<W: Write>(log: &CallLog, out: &mut W) -> Result<()> {
    write!(out, "{log}")?;
    out.flush()?;
    Ok(())
}
