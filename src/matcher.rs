//! Pairing two free-text lists through the name patterns.
//!
//! Each entry of list A is identified by the patterns it matches; every entry
//! of list B matched by one of those same patterns is its counterpart. The
//! table's columns play no part, so both lists may use any spelling the
//! patterns recognise.

use indexmap::IndexMap;
use tracing::warn;

use crate::{CountryConverter, MatchOptions, Resolution, Value};

impl CountryConverter {
    /// Map every entry of `list_a` to its counterpart(s) in `list_b`.
    ///
    /// ```
    /// use country_converter::{CountryConverter, MatchOptions};
    ///
    /// let cc = CountryConverter::new().unwrap();
    /// let m = cc.match_names(&["united states"], &["USA", "The Swedish Kingdom"], &MatchOptions::default());
    /// assert_eq!(m["united states"], "USA");
    /// ```
    pub fn match_names<A, B>(&self, list_a: &[A], list_b: &[B], options: &MatchOptions) -> IndexMap<String, Resolution>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut out = IndexMap::with_capacity(list_a.len());
        for name_a in list_a.iter().map(AsRef::as_ref) {
            let fill = || {
                let fill = options.not_found.as_deref().filter(|s| !s.is_empty()).unwrap_or(name_a);
                if options.enforce_sublist {
                    Resolution::Many(vec![Value::from(fill)])
                } else {
                    Resolution::One(Value::from(fill))
                }
            };

            let patterns: Vec<_> = self.regexes.iter().filter(|(_, re)| re.is_match(name_a)).collect();
            if patterns.is_empty() {
                warn!("Could not identify {name_a} in list_a");
                out.insert(name_a.to_string(), fill());
                continue;
            }
            if patterns.len() > 1 {
                warn!("Multiple matches for name {name_a} in list_a");
            }

            let mut hits: Vec<Value> = Vec::new();
            for (_, re) in &patterns {
                for name_b in list_b.iter().map(AsRef::as_ref) {
                    if re.is_match(name_b) {
                        hits.push(Value::from(name_b));
                    }
                }
            }

            let resolution = match hits.len() {
                0 => {
                    warn!("Could not find any correspondence for {name_a} in list_b");
                    fill()
                }
                n => {
                    if n > 1 {
                        warn!("Multiple matches for name {name_a} in list_b");
                    }
                    Resolution::from_values(hits, options.enforce_sublist)
                }
            };
            out.insert(name_a.to_string(), resolution);
        }
        out
    }
}
