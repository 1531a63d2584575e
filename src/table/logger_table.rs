use std::{
    collections::{HashMap, hash_map},
    fmt,
    sync::Arc,
};

use crate::{
    config::Config,
    log::{NoopLogSink, log_sink::LogSink},
    sink_debug,
    table::{
        argument::{Arg, SinkRef, Value, normalize},
        table_error::TableError,
        threshold::ThresholdLevel,
    },
};

/// Config key holding the levels for [`LoggerTable::add_from_config`].
pub const LEVELS_KEY: &str = "levels";

/// Used when a config has no non-blank `levels` value.
const DEFAULT_LEVELS: &str = "debug";

/// A registered sink together with its threshold.
#[derive(Clone)]
pub struct Entry {
    sink: SinkRef,
    level: ThresholdLevel,
}

impl Entry {
    #[must_use]
    pub fn sink(&self) -> &SinkRef {
        &self.sink
    }

    #[must_use]
    pub fn level(&self) -> ThresholdLevel {
        self.level
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("sink", &self.sink.name())
            .field("level", &self.level)
            .finish()
    }
}

/// Named sinks and the minimum level recorded for each.
///
/// Entries are keyed by [`LogSink::name`]; registering a name again replaces
/// the previous entry. The table never writes through the sinks it tracks.
///
/// Every insertion goes through normalization and broadcasting:
///
/// ```rust,ignore
/// let mut table = LoggerTable::new();
/// table.add(vec![root.clone(), child.clone()], 10)?; // both at 10
/// table.add(root, LogLevel::Warn)?;                  // root now at 30
/// table.remove(["child"])?;
/// ```
pub struct LoggerTable {
    entries: HashMap<String, Entry>,
    #[cfg_attr(not(feature = "log-debug"), allow(dead_code))]
    diagnostics: Arc<dyn LogSink>,
}

impl Default for LoggerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            diagnostics: Arc::new(NoopLogSink::default()),
        }
    }

    /// Creates a table and registers `loggers` at `levels`.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub fn with_loggers(
        loggers: impl Into<Arg<SinkRef>>,
        levels: impl Into<Arg<ThresholdLevel>>,
    ) -> Result<Self, TableError> {
        let mut table = Self::new();
        table.add(loggers, levels)?;
        Ok(table)
    }

    /// Routes the table's own registration/removal traces to `sink`.
    ///
    /// Messages are written at debug level and only when the `log-debug`
    /// feature is enabled; in other builds the sink receives nothing.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Registers one or many sinks at one or many levels.
    ///
    /// A single level is broadcast to every logger. Otherwise loggers and
    /// levels are paired positionally. Nothing is inserted unless the whole
    /// batch is valid.
    ///
    /// # Errors
    ///
    /// [`TableError::LengthMismatch`] when the two sides differ in length
    /// after broadcasting.
    pub fn add(
        &mut self,
        loggers: impl Into<Arg<SinkRef>>,
        levels: impl Into<Arg<ThresholdLevel>>,
    ) -> Result<(), TableError> {
        self.insert_all(loggers.into().into_vec(), levels.into().into_vec())
    }

    /// Registers sinks at [`ThresholdLevel::DEFAULT`].
    pub fn add_default(&mut self, loggers: impl Into<Arg<SinkRef>>) {
        let pairs = loggers
            .into()
            .into_vec()
            .into_iter()
            .map(|sink| (sink, ThresholdLevel::DEFAULT));
        self.insert_pairs(pairs);
    }

    /// Registers dynamically-typed loggers and levels.
    ///
    /// # Errors
    ///
    /// [`TableError::TypeValidation`] when either argument is not `None`, a
    /// single item of the right kind, or a list of such items;
    /// [`TableError::LengthMismatch`] as for [`add`](Self::add).
    pub fn add_values(&mut self, loggers: Value, levels: Value) -> Result<(), TableError> {
        let loggers = normalize::<SinkRef>(loggers)?;
        let levels = normalize::<ThresholdLevel>(levels)?;
        self.insert_all(loggers, levels)
    }

    /// Registers `loggers` at the levels configured under `section`.
    ///
    /// Looks up [`LEVELS_KEY`] in the section, then globally, then falls back
    /// to `debug`. Blank values are skipped at each step. The text is read
    /// with [`Value::parse_levels`].
    ///
    /// # Errors
    ///
    /// As for [`add_values`](Self::add_values).
    pub fn add_from_config(
        &mut self,
        loggers: impl Into<Arg<SinkRef>>,
        config: &Config,
        section: &str,
    ) -> Result<(), TableError> {
        let text = config.get_non_empty_or_default(section, LEVELS_KEY, DEFAULT_LEVELS);
        let levels = normalize::<ThresholdLevel>(Value::parse_levels(text))?;
        self.insert_all(loggers.into().into_vec(), levels)
    }

    /// Removes every named entry, in order.
    ///
    /// Stops at the first name that is not registered; entries removed
    /// before it stay removed.
    ///
    /// # Errors
    ///
    /// [`TableError::KeyNotFound`] naming the missing entry.
    pub fn remove<I, S>(&mut self, names: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if self.entries.remove(name).is_none() {
                return Err(TableError::KeyNotFound(name.to_owned()));
            }
            sink_debug!(self.diagnostics, "removed logger {name}");
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, entry)` pairs in no particular order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn insert_all(
        &mut self,
        loggers: Vec<SinkRef>,
        levels: Vec<ThresholdLevel>,
    ) -> Result<(), TableError> {
        let pairs = broadcast(loggers, levels)?;
        self.insert_pairs(pairs);
        Ok(())
    }

    fn insert_pairs(&mut self, pairs: impl IntoIterator<Item = (SinkRef, ThresholdLevel)>) {
        for (sink, level) in pairs {
            sink_debug!(self.diagnostics, "registered logger {} at level {}", sink.name(), level);
            self.entries.insert(sink.name().to_owned(), Entry { sink, level });
        }
    }
}

/// Pairs loggers with levels, replicating a lone level across all loggers.
fn broadcast(
    loggers: Vec<SinkRef>,
    levels: Vec<ThresholdLevel>,
) -> Result<Vec<(SinkRef, ThresholdLevel)>, TableError> {
    let levels = if levels.len() == 1 {
        vec![levels[0]; loggers.len()]
    } else {
        levels
    };

    if loggers.len() != levels.len() {
        return Err(TableError::LengthMismatch {
            loggers: loggers.len(),
            levels: levels.len(),
        });
    }
    Ok(loggers.into_iter().zip(levels).collect())
}

impl fmt::Debug for LoggerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Iterator over the `(name, entry)` pairs of a [`LoggerTable`].
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(name, entry)| (name.as_str(), entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a LoggerTable {
    type Item = (&'a str, &'a Entry);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::log_level::LogLevel;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    fn sink(name: &str) -> SinkRef {
        Arc::new(NoopLogSink::new(name))
    }

    /// Diagnostics sink that keeps every message it receives.
    #[derive(Default)]
    struct Recorder(Mutex<Vec<(LogLevel, String)>>);

    impl LogSink for Recorder {
        fn log(&self, level: LogLevel, msg: &str, _target: &'static str) {
            self.0.lock().unwrap().push((level, msg.to_owned()));
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    #[test]
    fn new_table_is_empty() {
        let t = LoggerTable::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);

        let t =
            LoggerTable::with_loggers(Arg::<SinkRef>::Absent, ThresholdLevel::DEFAULT).unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn single_sink_single_level() {
        let a = sink("root");
        let mut t = LoggerTable::new();
        t.add(a.clone(), 25).unwrap();

        assert_eq!(t.len(), 1);
        let e = t.get("root").expect("root registered");
        assert!(Arc::ptr_eq(e.sink(), &a));
        assert_eq!(e.level(), ThresholdLevel(25));
    }

    #[test]
    fn single_level_is_broadcast() {
        let t = LoggerTable::with_loggers(vec![sink("root"), sink("child")], 10).unwrap();

        assert_eq!(t.len(), 2);
        assert_eq!(t.get("root").unwrap().level(), ThresholdLevel(10));
        assert_eq!(t.get("child").unwrap().level(), ThresholdLevel(10));
    }

    #[test]
    fn levels_pair_positionally() {
        let mut t = LoggerTable::new();
        t.add([sink("a"), sink("b")], vec![10, 40]).unwrap();

        assert_eq!(t.get("a").unwrap().level(), ThresholdLevel(10));
        assert_eq!(t.get("b").unwrap().level(), ThresholdLevel(40));
    }

    #[test]
    fn unequal_lengths_fail_without_mutating() {
        let mut t = LoggerTable::with_loggers(vec![sink("a"), sink("keep")], 20).unwrap();

        let err = t.add(vec![sink("a"), sink("b"), sink("c")], vec![10, 30]).unwrap_err();
        assert_eq!(
            err,
            TableError::LengthMismatch {
                loggers: 3,
                levels: 2
            }
        );

        assert_eq!(t.len(), 2);
        assert_eq!(t.get("a").unwrap().level(), ThresholdLevel(20));
        assert_eq!(t.get("keep").unwrap().level(), ThresholdLevel(20));
        assert!(!t.contains("b"));
        assert!(!t.contains("c"));
    }

    #[test]
    fn one_sink_two_levels_is_a_mismatch() {
        let res = LoggerTable::with_loggers(sink("root"), vec![10, 20]);
        assert_matches!(
            res.map(|t| t.len()),
            Err(TableError::LengthMismatch {
                loggers: 1,
                levels: 2
            })
        );
    }

    #[test]
    fn absent_levels_with_loggers_is_a_mismatch() {
        let mut t = LoggerTable::new();
        assert_matches!(
            t.add(sink("root"), Arg::<ThresholdLevel>::Absent),
            Err(TableError::LengthMismatch {
                loggers: 1,
                levels: 0
            })
        );
    }

    #[test]
    fn re_adding_overwrites_level() {
        let a = sink("root");
        let mut t = LoggerTable::new();
        t.add(a.clone(), LogLevel::Debug).unwrap();
        t.add(a, LogLevel::Error).unwrap();

        assert_eq!(t.len(), 1);
        assert_eq!(t.get("root").unwrap().level(), ThresholdLevel(40));
    }

    #[test]
    fn same_name_different_sink_last_wins() {
        let first = sink("net");
        let second = sink("net");
        let mut t = LoggerTable::new();
        t.add(vec![first, second.clone()], 10).unwrap();

        assert_eq!(t.len(), 1);
        assert!(Arc::ptr_eq(t.get("net").unwrap().sink(), &second));
    }

    #[test]
    fn add_default_uses_debug_threshold() {
        let mut t = LoggerTable::new();
        t.add_default(vec![sink("a"), sink("b")]);
        t.add_default(Arg::<SinkRef>::Absent);

        assert_eq!(t.len(), 2);
        assert!(t.iter().all(|(_, e)| e.level() == ThresholdLevel::DEFAULT));
        assert_eq!(ThresholdLevel::DEFAULT, ThresholdLevel(10));
    }

    #[test]
    fn add_values_rejects_non_sink_loggers() {
        let mut t = LoggerTable::new();
        assert_matches!(
            t.add_values(Value::Int(3), Value::Int(10)),
            Err(TableError::TypeValidation {
                actual: "int",
                expected: "sink"
            })
        );
        assert_matches!(
            t.add_values(Value::from("root"), Value::Int(10)),
            Err(TableError::TypeValidation { actual: "str", .. })
        );
        assert!(t.is_empty());
    }

    #[test]
    fn add_values_rejects_bad_level_element() {
        let mut t = LoggerTable::new();
        let loggers = Value::from(vec![sink("a"), sink("b")]);
        let levels = Value::List(vec![Value::Int(10), Value::from("loud")]);
        assert_matches!(
            t.add_values(loggers, levels),
            Err(TableError::TypeValidation {
                actual: "str",
                expected: "int"
            })
        );
        assert!(t.is_empty());
    }

    #[test]
    fn add_values_broadcasts_like_add() {
        let mut t = LoggerTable::new();
        t.add_values(Value::from(vec![sink("a"), sink("b")]), Value::Int(20)).unwrap();
        assert_eq!(t.len(), 2);
        assert!(t.iter().all(|(_, e)| e.level() == ThresholdLevel(20)));
    }

    #[test]
    fn remove_round_trip() {
        let mut t = LoggerTable::with_loggers(sink("root"), 10).unwrap();
        t.remove(["root"]).unwrap();
        assert!(!t.contains("root"));

        assert_eq!(t.remove(["root"]), Err(TableError::KeyNotFound("root".into())));
    }

    #[test]
    fn remove_stops_at_first_missing_name() {
        let mut t = LoggerTable::with_loggers(vec![sink("a"), sink("b"), sink("c")], 10).unwrap();

        let err = t.remove(vec!["a", "missing", "b"]).unwrap_err();
        assert_eq!(err, TableError::KeyNotFound("missing".into()));

        assert!(!t.contains("a"));
        assert!(t.contains("b"));
        assert!(t.contains("c"));
    }

    #[test]
    fn names_and_iteration_cover_all_entries() {
        let t = LoggerTable::with_loggers(vec![sink("x"), sink("y")], 10).unwrap();

        let mut names: Vec<&str> = t.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["x", "y"]);

        let mut via_iter: Vec<&str> = t.iter().map(|(k, _)| k).collect();
        let mut via_ref: Vec<&str> = (&t).into_iter().map(|(k, _)| k).collect();
        via_iter.sort_unstable();
        via_ref.sort_unstable();
        assert_eq!(via_iter, via_ref);
        assert_eq!(t.iter().len(), 2);

        let mut looped = 0;
        for (name, entry) in &t {
            assert_eq!(entry.sink().name(), name);
            looped += 1;
        }
        assert_eq!(looped, 2);
    }

    #[test]
    fn add_from_config_reads_section_then_global_then_default() {
        let cfg = Config::parse(
            "levels = warn\n\
             [Net]\n\
             levels = 10, 20\n\
             [Bad]\n\
             levels = loud\n",
        );
        let mut t = LoggerTable::new();

        t.add_from_config(vec![sink("a"), sink("b")], &cfg, "Net").unwrap();
        assert_eq!(t.get("a").unwrap().level(), ThresholdLevel(10));
        assert_eq!(t.get("b").unwrap().level(), ThresholdLevel(20));

        t.add_from_config(sink("c"), &cfg, "Missing").unwrap();
        assert_eq!(t.get("c").unwrap().level(), ThresholdLevel(30));

        assert_matches!(
            t.add_from_config(sink("d"), &cfg, "Bad"),
            Err(TableError::TypeValidation { actual: "str", .. })
        );

        t.add_from_config(sink("e"), &Config::empty(), "Net").unwrap();
        assert_eq!(t.get("e").unwrap().level(), ThresholdLevel::DEFAULT);
    }

    #[test]
    fn add_from_config_skips_blank_levels() {
        let mut t = LoggerTable::new();

        let cfg = Config::parse("levels = warn\n[Net]\nlevels =\n");
        t.add_from_config(sink("a"), &cfg, "Net").unwrap();
        assert_eq!(t.get("a").unwrap().level(), ThresholdLevel(30));

        let cfg = Config::parse("levels = \"\"\n[Net]\nlevels =\n");
        t.add_from_config(vec![sink("b"), sink("c")], &cfg, "Net").unwrap();
        assert_eq!(t.get("b").unwrap().level(), ThresholdLevel::DEFAULT);
        assert_eq!(t.get("c").unwrap().level(), ThresholdLevel::DEFAULT);
    }

    #[cfg(feature = "log-debug")]
    #[test]
    fn diagnostics_trace_mutations() {
        let rec = Arc::new(Recorder::default());
        let mut t = LoggerTable::new().with_diagnostics(rec.clone());
        t.add(sink("root"), 20).unwrap();
        t.remove(["root"]).unwrap();

        let lines = rec.0.lock().unwrap();
        assert_eq!(
            *lines,
            [
                (LogLevel::Debug, "registered logger root at level 20".to_owned()),
                (LogLevel::Debug, "removed logger root".to_owned()),
            ]
        );
    }

    #[cfg(not(feature = "log-debug"))]
    #[test]
    fn diagnostics_stay_silent_below_debug_builds() {
        let rec = Arc::new(Recorder::default());
        let mut t = LoggerTable::new().with_diagnostics(rec.clone());
        t.add(vec![sink("root"), sink("child")], 20).unwrap();
        t.remove(["root"]).unwrap();

        assert!(rec.0.lock().unwrap().is_empty());
        assert_eq!(t.len(), 1);
        assert!(t.contains("child"));
    }
}
