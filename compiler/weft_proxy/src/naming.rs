//! Unique name allocation for generated types and their members.

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

/// Hands out names unique within this scope.
///
/// The first request for a base name gets it unchanged; later requests get
/// the first free `base_1`, `base_2`, ... A suffixed name that was already
/// issued, or requested verbatim as a base, is never handed out again.
#[derive(Debug, Default)]
pub struct NamingScope {
    state: Mutex<Names>,
}

#[derive(Debug, Default)]
struct Names {
    issued: FxHashSet<String>,
    /// Last suffix tried per base.
    counters: FxHashMap<String, u32>,
}

impl NamingScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique_name(&self, base: &str) -> String {
        let mut names = self.state.lock();
        let Names { issued, counters } = &mut *names;
        if issued.insert(base.to_owned()) {
            return base.to_owned();
        }
        let count = counters.entry(base.to_owned()).or_insert(0);
        loop {
            *count += 1;
            let candidate = format!("{base}_{count}");
            if issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// A fresh scope for names that only need to be unique inside one
    /// generated type.
    pub fn safe_sub_scope(&self) -> NamingScope {
        NamingScope::new()
    }
}
