//! Pattern search over indexed class names.
//!
//! The table scan runs on a background thread and hands matches over a zero-capacity
//! channel, so callers can print the first results before the scan has finished and at
//! most one match is in flight at a time.

use regex::Regex;
use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::JoinHandle;
use tracing::{error, warn};

use crate::error::FindError;
use crate::store::IndexStore;

const SCAN_PAGE_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Match {
    pub class_name: String,
    pub jar_path: String,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class_name, self.jar_path)
    }
}

/// Accepts `a.b.C`, `a/b/C` or `a/b/C.class` and yields the dotted form.
pub fn normalize_pattern(raw: &str) -> String {
    let dotted = raw.replace('/', ".");
    match dotted.strip_suffix(".class") {
        Some(stem) => stem.to_string(),
        None => dotted,
    }
}

/// Starts a search for classes whose name contains a match of `pattern`.
///
/// Order of the results is the store's key order and should not be relied upon.
pub fn find(store: Arc<dyn IndexStore>, pattern: &str) -> Result<Matches, FindError> {
    let matcher = Regex::new(&normalize_pattern(pattern))?;
    let (tx, rx) = sync_channel(0);
    let producer = std::thread::spawn(move || produce(store.as_ref(), &matcher, &tx));
    Ok(Matches {
        rx: Some(rx),
        producer: Some(producer),
    })
}

/// Stream of matches; ends once the scan has covered every class.
///
/// Dropping it early does not cut the scan short: the producer runs to the end of the
/// class table, discarding what it finds, and the drop waits for it.
pub struct Matches {
    rx: Option<Receiver<Match>>,
    producer: Option<JoinHandle<()>>,
}

impl Matches {
    fn finish(&mut self) {
        self.rx = None;
        if let Some(handle) = self.producer.take()
            && handle.join().is_err()
        {
            error!("find producer panicked");
        }
    }
}

impl Iterator for Matches {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        let received = self.rx.as_ref()?.recv();
        match received {
            Ok(m) => Some(m),
            Err(_) => {
                self.finish();
                None
            }
        }
    }
}

impl Drop for Matches {
    fn drop(&mut self) {
        self.finish();
    }
}

fn produce(store: &dyn IndexStore, matcher: &Regex, tx: &SyncSender<Match>) {
    let mut cursor: Option<String> = None;
    let mut listening = true;
    loop {
        let page = match store.scan_classes(cursor.as_deref(), SCAN_PAGE_SIZE) {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, "failed to scan class index");
                return;
            }
        };
        let Some(last) = page.last() else {
            return;
        };
        cursor = Some(last.class_name.clone());
        if !listening {
            continue;
        }

        'page: for entry in page.iter().filter(|e| matcher.is_match(&e.class_name)) {
            for fingerprint in entry.archives.iter() {
                let jar_path = match store.get_archive(fingerprint) {
                    Ok(Some(record)) => record.path,
                    Ok(None) => {
                        warn!(class = %entry.class_name, fingerprint = %fingerprint, "no jar record for fingerprint");
                        continue;
                    }
                    Err(e) => {
                        warn!(class = %entry.class_name, fingerprint = %fingerprint, error = %e, "failed to fetch jar record");
                        continue;
                    }
                };
                let found = Match {
                    class_name: entry.class_name.clone(),
                    jar_path,
                };
                if tx.send(found).is_err() {
                    // Consumer is gone; walk the rest of the table without resolving matches.
                    listening = false;
                    break 'page;
                }
            }
        }
    }
}
