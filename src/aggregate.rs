//! Aggregation concordances.
//!
//! Entities (countries in some classification) are assigned to groups by an
//! ordered plan of mappings. The first mapping that yields a group for an
//! entity wins; entities no mapping assigns fall back to the missing policy.
//!
//! ```text
//! entities ──▶ for each mapping in plan ──▶ group(s) for still-unassigned entities
//!                                             ├─ none      -> try next mapping
//!                                             ├─ one       -> assigned
//!                                             └─ several   -> joined with the merge separator
//!                                                             (unassigned if disabled)
//!          ──▶ missing policy for the rest ──▶ Aggregation
//! ```

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::correspondence::CorrespondenceOptions;
use crate::engine::{Exclusions, InputScan, clean_alpha_code};
use crate::error::Result;
use crate::{CountryConverter, Value, scheme};

/// Entities to aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum Entities {
    /// An explicit list, in order.
    List(Vec<String>),
    /// The distinct values of a table column.
    Column(String),
}

impl Entities {
    pub fn list<S: AsRef<str>>(items: &[S]) -> Self {
        Entities::List(items.iter().map(|s| s.as_ref().to_string()).collect())
    }
}

/// One step of an aggregation plan.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateMapping {
    /// Use the table's correspondence from the entity class to this column.
    Column(String),
    /// Explicit entity -> group(s).
    Explicit(IndexMap<String, Vec<String>>),
}

impl AggregateMapping {
    pub fn column(name: impl Into<String>) -> Self {
        AggregateMapping::Column(name.into())
    }

    /// Entity -> single group.
    pub fn explicit<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        AggregateMapping::Explicit(pairs.into_iter().map(|(k, v)| (k.into(), vec![v.into()])).collect())
    }

    /// Entity -> several candidate groups.
    pub fn explicit_multi<K, V>(pairs: impl IntoIterator<Item = (K, Vec<V>)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        AggregateMapping::Explicit(
            pairs.into_iter().map(|(k, vs)| (k.into(), vs.into_iter().map(Into::into).collect())).collect(),
        )
    }
}

/// What to do with entities no mapping assigns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Keep the entity's own name as its group.
    #[default]
    KeepOwn,
    /// Use this literal group.
    Fill(String),
    /// Leave the entity out.
    Drop,
    /// Keep the entity with no group.
    Null,
}

type Observer<'a> = Box<dyn FnMut(&str) + 'a>;

/// Options for [`CountryConverter::agg_conc`].
pub struct AggOptions<'a> {
    pub missing: MissingPolicy,
    /// Separator joining several candidate groups; `None` or an empty
    /// separator leaves such entities unassigned.
    pub merge_multiple: Option<String>,
    /// Classification of the entities; inferred from the first one if unset.
    pub entity_class: Option<String>,
    /// Called once per entity that falls back to the missing policy.
    pub on_missing: Option<Observer<'a>>,
    /// Called once per entity whose candidate groups are merged.
    pub on_merge: Option<Observer<'a>>,
}

impl Default for AggOptions<'_> {
    fn default() -> Self {
        AggOptions {
            missing: MissingPolicy::KeepOwn,
            merge_multiple: Some("_&_".to_string()),
            entity_class: None,
            on_missing: None,
            on_merge: None,
        }
    }
}

impl fmt::Debug for AggOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggOptions")
            .field("missing", &self.missing)
            .field("merge_multiple", &self.merge_multiple)
            .field("entity_class", &self.entity_class)
            .field("on_missing", &self.on_missing.is_some())
            .field("on_merge", &self.on_merge.is_some())
            .finish()
    }
}

impl<'a> AggOptions<'a> {
    pub fn with_missing(mut self, missing: MissingPolicy) -> Self {
        self.missing = missing;
        self
    }

    pub fn with_merge_multiple(mut self, separator: Option<&str>) -> Self {
        self.merge_multiple = separator.map(str::to_string);
        self
    }

    pub fn with_entity_class(mut self, class: impl Into<String>) -> Self {
        self.entity_class = Some(class.into());
        self
    }

    pub fn on_missing(mut self, observer: impl FnMut(&str) + 'a) -> Self {
        self.on_missing = Some(Box::new(observer));
        self
    }

    pub fn on_merge(mut self, observer: impl FnMut(&str) + 'a) -> Self {
        self.on_merge = Some(Box::new(observer));
        self
    }
}

/// Entity -> group, in entity order. `None` is an entity kept without a group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregation {
    pub entries: IndexMap<String, Option<String>>,
}

/// One row of the two-column view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatePair {
    pub original: String,
    pub aggregated: Option<String>,
}

/// Dense indicator matrix: one row per entity, one column per group.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcordanceMatrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl ConcordanceMatrix {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        Some(self.values[r][c])
    }
}

impl Aggregation {
    pub fn get(&self, entity: &str) -> Option<&Option<String>> {
        self.entries.get(entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pairs(&self) -> Vec<AggregatePair> {
        self.entries
            .iter()
            .map(|(original, aggregated)| AggregatePair { original: original.clone(), aggregated: aggregated.clone() })
            .collect()
    }

    /// Indicator matrix; columns are the distinct groups, sorted. Entities
    /// without a group get an all-zero row.
    pub fn matrix(&self) -> ConcordanceMatrix {
        let groups: BTreeSet<&String> = self.entries.values().flatten().collect();
        let columns: Vec<String> = groups.into_iter().cloned().collect();
        let values = self
            .entries
            .values()
            .map(|group| {
                columns.iter().map(|c| if group.as_ref() == Some(c) { 1.0 } else { 0.0 }).collect::<Vec<f64>>()
            })
            .collect();
        ConcordanceMatrix { rows: self.entries.keys().cloned().collect(), columns, values }
    }
}

impl CountryConverter {
    /// Build an aggregation concordance.
    ///
    /// ```
    /// use country_converter::{AggOptions, AggregateMapping, CountryConverter, Entities, MissingPolicy};
    ///
    /// let cc = CountryConverter::new().unwrap();
    /// let plan = [AggregateMapping::column("EU"), AggregateMapping::column("continent")];
    /// let mut options = AggOptions::default();
    /// let agg = cc.agg_conc(Entities::list(&["AT", "JP"]), &plan, &mut options).unwrap();
    /// assert_eq!(agg.get("AT"), Some(&Some("EU".to_string())));
    /// assert_eq!(agg.get("JP"), Some(&Some("Asia".to_string())));
    /// ```
    pub fn agg_conc(
        &self,
        original: Entities,
        aggregates: &[AggregateMapping],
        options: &mut AggOptions<'_>,
    ) -> Result<Aggregation> {
        let (entities, column_class) = match original {
            Entities::List(list) => (list, None),
            Entities::Column(column) => {
                let col = self.table.resolve_column(&column)?;
                let values = self.table.distinct_values(col).iter().map(|v| v.to_string()).collect();
                (values, Some(self.table.columns()[col].clone()))
            }
        };

        let uses_columns = aggregates.iter().any(|m| matches!(m, AggregateMapping::Column(_)));
        let entity_class = match options.entity_class.as_deref().or(column_class.as_deref()) {
            Some(class) => Some(scheme::validate(class, self.table.columns())?),
            None if uses_columns => match entities.first() {
                Some(first) => {
                    let inferred = InputScan::scan(first, Exclusions::default_set()).inferred_source();
                    Some(scheme::validate(inferred, self.table.columns())?)
                }
                None => None,
            },
            None => None,
        };
        debug!(entities = entities.len(), mappings = aggregates.len(), class = ?entity_class, "aggregating");

        let mut assigned: IndexMap<String, Option<String>> = entities.into_iter().map(|e| (e, None)).collect();

        for mapping in aggregates {
            let lookup: Cow<'_, IndexMap<String, Vec<String>>> = match mapping {
                AggregateMapping::Explicit(map) => Cow::Borrowed(map),
                AggregateMapping::Column(column) => match &entity_class {
                    Some(class) => Cow::Owned(self.column_lookup(class, column)?),
                    None => continue,
                },
            };

            for (entity, group) in assigned.iter_mut() {
                if group.is_some() {
                    continue;
                }
                let candidates = match lookup.get(entity.as_str()) {
                    Some(c) if !c.is_empty() => c,
                    _ => continue,
                };
                *group = if candidates.len() > 1 {
                    if let Some(observer) = options.on_merge.as_mut() {
                        observer(entity.as_str());
                    }
                    options.merge_multiple.as_deref().filter(|sep| !sep.is_empty()).map(|sep| candidates.join(sep))
                } else {
                    Some(candidates[0].clone())
                };
            }
        }

        let mut entries = IndexMap::with_capacity(assigned.len());
        for (entity, group) in assigned {
            if group.is_some() {
                entries.insert(entity, group);
                continue;
            }
            if let Some(observer) = options.on_missing.as_mut() {
                observer(entity.as_str());
            }
            match &options.missing {
                MissingPolicy::KeepOwn => {
                    entries.insert(entity.clone(), Some(entity));
                }
                MissingPolicy::Fill(fill) => {
                    entries.insert(entity, Some(fill.clone()));
                }
                MissingPolicy::Drop => {}
                MissingPolicy::Null => {
                    entries.insert(entity, None);
                }
            }
        }
        Ok(Aggregation { entries })
    }

    /// Correspondence `class` -> `column` with stringified keys and groups.
    /// Alphabetic code keys are also registered under each `|` alternative.
    fn column_lookup(&self, class: &str, column: &str) -> Result<IndexMap<String, Vec<String>>> {
        let dict = self.get_correspondence_dict(class, column, &CorrespondenceOptions::default())?;
        let alpha = scheme::is_alpha_code(class);
        let mut lookup = IndexMap::with_capacity(dict.len());
        for (key, values) in dict {
            let groups: Vec<String> = values.iter().map(Value::to_string).collect();
            let alternatives = key.as_str().filter(|raw| alpha && raw.contains('|'));
            for alt in alternatives.into_iter().flat_map(|raw| raw.split('|')) {
                if let Value::Text(code) = clean_alpha_code(Value::from(alt)) {
                    lookup.entry(code).or_insert_with(|| groups.clone());
                }
            }
            lookup.insert(key.to_string(), groups);
        }
        Ok(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CocoError;

    fn cc() -> CountryConverter {
        CountryConverter::new().unwrap()
    }

    fn explicit() -> AggregateMapping {
        AggregateMapping::explicit([("c1", "r1"), ("c2", "r1"), ("c3", "r2")])
    }

    fn group(agg: &Aggregation, entity: &str) -> Option<String> {
        agg.get(entity).cloned().flatten()
    }

    #[test]
    fn explicit_mapping_keeps_own_names() {
        let agg = cc()
            .agg_conc(Entities::list(&["c1", "c2", "c3", "c4"]), &[explicit()], &mut AggOptions::default())
            .unwrap();
        let pairs: Vec<(String, Option<String>)> = agg.entries.clone().into_iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("c1".to_string(), Some("r1".to_string())),
                ("c2".to_string(), Some("r1".to_string())),
                ("c3".to_string(), Some("r2".to_string())),
                ("c4".to_string(), Some("c4".to_string())),
            ]
        );
    }

    #[test]
    fn missing_policies() {
        let cc = cc();
        let run = |policy: MissingPolicy| {
            let mut opts = AggOptions::default().with_missing(policy);
            cc.agg_conc(Entities::list(&["c1", "c4"]), &[explicit()], &mut opts).unwrap()
        };
        assert_eq!(group(&run(MissingPolicy::Fill("RoW".into())), "c4").as_deref(), Some("RoW"));
        assert_eq!(run(MissingPolicy::Drop).len(), 1);
        assert_eq!(run(MissingPolicy::Null).get("c4"), Some(&None));
    }

    #[test]
    fn composite_groups() {
        let cc = cc();
        let multi = AggregateMapping::explicit_multi([("c1", vec!["r1", "r2"]), ("c2", vec!["r1"])]);
        let mut merged = Vec::new();
        let mut missing = Vec::new();
        {
            let mut opts = AggOptions::default()
                .on_merge(|e: &str| merged.push(e.to_string()))
                .on_missing(|e: &str| missing.push(e.to_string()));
            let agg = cc.agg_conc(Entities::list(&["c1", "c2"]), &[multi.clone()], &mut opts).unwrap();
            assert_eq!(group(&agg, "c1").as_deref(), Some("r1_&_r2"));
        }
        assert_eq!(merged, vec!["c1"]);
        assert!(missing.is_empty());

        let mut opts =
            AggOptions::default().with_merge_multiple(None).with_missing(MissingPolicy::Fill("none".into()));
        let agg = cc.agg_conc(Entities::list(&["c1", "c2"]), &[multi], &mut opts).unwrap();
        assert_eq!(group(&agg, "c1").as_deref(), Some("none"));
        assert_eq!(group(&agg, "c2").as_deref(), Some("r1"));
    }

    #[test]
    fn empty_separator_disables_merging() {
        let multi = AggregateMapping::explicit_multi([("c1", vec!["r1", "r2"])]);
        let mut merged = 0;
        let mut opts = AggOptions::default()
            .with_merge_multiple(Some(""))
            .with_missing(MissingPolicy::Fill("MISSING".into()))
            .on_merge(|_: &str| merged += 1);
        let agg = cc().agg_conc(Entities::list(&["c1"]), &[multi], &mut opts).unwrap();
        drop(opts);
        assert_eq!(agg.get("c1"), Some(&Some("MISSING".to_string())));
        assert_eq!(merged, 1);
    }

    #[test]
    fn explicit_mappings_chain() {
        let first = AggregateMapping::explicit([("c1", "r1")]);
        let second = AggregateMapping::explicit([("c1", "ignored"), ("c2", "r2")]);
        let plan = [first, second];
        let agg = cc().agg_conc(Entities::list(&["c1", "c2"]), &plan, &mut AggOptions::default()).unwrap();
        assert_eq!(group(&agg, "c1").as_deref(), Some("r1"));
        assert_eq!(group(&agg, "c2").as_deref(), Some("r2"));
        assert_eq!(plan[1], AggregateMapping::explicit([("c1", "ignored"), ("c2", "r2")]));
    }

    #[test]
    fn plan_order_first_assignment_wins() {
        let plan = ["EU", "OECD", "continent"].map(AggregateMapping::column);
        let mut missing = Vec::new();
        let mut opts = AggOptions::default()
            .with_missing(MissingPolicy::Fill("RoW".into()))
            .on_missing(|e: &str| missing.push(e.to_string()));
        let agg = cc().agg_conc(Entities::list(&["TW", "XX", "AT", "US", "WA"]), &plan, &mut opts).unwrap();
        drop(opts);
        let expected = [("TW", "Asia"), ("XX", "RoW"), ("AT", "EU"), ("US", "OECD"), ("WA", "RoW")];
        for (entity, grp) in expected {
            assert_eq!(group(&agg, entity).as_deref(), Some(grp), "entity {entity}");
        }
        assert_eq!(missing, vec!["XX", "WA"]);
    }

    #[test]
    fn alternative_codes_are_keys() {
        let plan = [AggregateMapping::column("continent")];
        let mut opts = AggOptions::default().with_entity_class("ISO2");
        let agg = cc().agg_conc(Entities::list(&["UK", "EL", "GB"]), &plan, &mut opts).unwrap();
        assert_eq!(group(&agg, "UK").as_deref(), Some("Europe"));
        assert_eq!(group(&agg, "EL").as_deref(), Some("Europe"));
        assert_eq!(group(&agg, "GB").as_deref(), Some("Europe"));
    }

    #[test]
    fn column_entities() {
        let plan = [AggregateMapping::column("EXIO1")];
        let agg = cc().agg_conc(Entities::Column("ISO2".into()), &plan, &mut AggOptions::default()).unwrap();
        assert_eq!(agg.len(), 40);
        assert_eq!(group(&agg, "AR").as_deref(), Some("WW"));
        assert_eq!(group(&agg, "GB|UK").as_deref(), Some("GB"));
    }

    #[test]
    fn duplicate_entities_collapse() {
        let agg =
            cc().agg_conc(Entities::list(&["c1", "c1", "c2"]), &[explicit()], &mut AggOptions::default()).unwrap();
        assert_eq!(agg.len(), 2);
    }

    #[test]
    fn matrix_and_pairs() {
        let agg = cc()
            .agg_conc(Entities::list(&["c1", "c2", "c3", "c4"]), &[explicit()], &mut AggOptions::default())
            .unwrap();
        let pairs = agg.pairs();
        assert_eq!(pairs[3], AggregatePair { original: "c4".into(), aggregated: Some("c4".into()) });
        let m = agg.matrix();
        assert_eq!(m.columns, vec!["c4", "r1", "r2"]);
        assert_eq!(m.rows, vec!["c1", "c2", "c3", "c4"]);
        assert_eq!(m.get("c2", "r1"), Some(1.0));
        assert_eq!(m.get("c2", "r2"), Some(0.0));
        assert_eq!(m.values.iter().map(|r| r.iter().sum::<f64>()).sum::<f64>(), 4.0);
    }

    #[test]
    fn unknown_aggregate_column() {
        let err = cc()
            .agg_conc(Entities::list(&["AT"]), &[AggregateMapping::column("nonsense")], &mut AggOptions::default())
            .unwrap_err();
        assert!(matches!(err, CocoError::UnknownScheme(_)));
    }
}
