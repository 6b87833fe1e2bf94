//! The converter: a loaded classification table plus its pattern indexes.
//!
//! ```text
//! ConverterOptions ──▶ load base ──▶ filter (UN members, obsolete)
//!                                        │
//!        additional data ──▶ load ──────▶ merge ──▶ drop duplicates (keep last)
//!                                                        │
//!                                                        v
//!                                      compile regex + code indexes
//! ```
//!
//! Construction is the only mutating phase. Every query takes `&self`.

use std::time::Instant;

use tracing::{debug, debug_span};

use crate::api::{ConvertDetails, ConvertOptions, ConvertOutput, ConvertRun};
use crate::engine::{ConvertPlan, Exclusions, NameTrace, PatternIndex, Resolver, is_alpha_target};
use crate::error::{CocoError, Result};
use crate::scheme::{self, ISO2, OBSOLETE, REGEX, UN_MEMBER};
use crate::table::{ClassificationTable, TableSource, drop_duplicates_keep_last, merge_tables, report_duplicates};
use crate::{DEFAULT_EXCLUDE_PREFIX, NameInput, Value};

/// Options for building a [`CountryConverter`].
#[derive(Debug, Clone, Default)]
pub struct ConverterOptions {
    /// Base table; the bundled data by default.
    pub country_data: TableSource,
    /// Tables appended after the base (same column layout).
    pub additional_data: Vec<TableSource>,
    /// Keep only rows with a `UNmember` entry (base table only).
    pub only_un_member: bool,
    /// Keep rows with an `obsolete` entry (base table only).
    pub include_obsolete: bool,
    /// Fail instead of warning when a name matches several patterns.
    pub strict: bool,
}

impl ConverterOptions {
    pub fn with_country_data(mut self, source: impl Into<TableSource>) -> Self {
        self.country_data = source.into();
        self
    }

    pub fn with_additional_data(mut self, source: impl Into<TableSource>) -> Self {
        self.additional_data.push(source.into());
        self
    }

    pub fn with_only_un_member(mut self, only: bool) -> Self {
        self.only_un_member = only;
        self
    }

    pub fn with_include_obsolete(mut self, include: bool) -> Self {
        self.include_obsolete = include;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Classification table and pattern indexes, immutable once built.
#[derive(Debug, Clone)]
pub struct CountryConverter {
    pub(crate) table: ClassificationTable,
    pub(crate) regexes: PatternIndex,
    pub(crate) codes: Option<PatternIndex>,
    strict: bool,
}

impl CountryConverter {
    /// Converter over the bundled country data with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(ConverterOptions::default())
    }

    pub fn with_options(options: ConverterOptions) -> Result<Self> {
        let span = debug_span!("build_converter", origin = %options.country_data.origin());
        let _enter = span.enter();

        let mut base = options.country_data.load()?;
        report_duplicates(&base, &options.country_data.origin());
        if options.only_un_member {
            if let Some(col) = base.column_index(UN_MEMBER) {
                base.retain_rows(|row| !row.get(col).is_missing());
            }
        }
        if !options.include_obsolete {
            if let Some(col) = base.column_index(OBSOLETE) {
                base.retain_rows(|row| row.get(col).is_missing());
            }
        }

        let mut extra = Vec::with_capacity(options.additional_data.len());
        for source in &options.additional_data {
            let table = source.load()?;
            report_duplicates(&table, &source.origin());
            extra.push(table);
        }
        let merging = !extra.is_empty();
        let mut table = merge_tables(base, extra);
        if merging {
            report_duplicates(&table, "merged data - keep last one");
        }
        drop_duplicates_keep_last(&mut table);

        Self::build(table, options.strict)
    }

    /// Converter over an already-built table, used as is.
    pub fn from_table(table: ClassificationTable) -> Result<Self> {
        Self::with_options(ConverterOptions::default().with_country_data(table).with_include_obsolete(true))
    }

    fn build(table: ClassificationTable, strict: bool) -> Result<Self> {
        let regex_col = table
            .column_index(REGEX)
            .ok_or_else(|| CocoError::MissingColumn { column: REGEX.to_string(), origin: "merged table".to_string() })?;
        let regexes = PatternIndex::from_regex_column(&table, regex_col)?;
        let codes = table.column_index(ISO2).map(|col| PatternIndex::from_code_column(&table, col)).transpose()?;
        debug!(rows = table.len(), patterns = regexes.len(), strict, "converter ready");
        Ok(CountryConverter { table, regexes, codes, strict })
    }

    /// Valid classification names (the table's columns).
    pub fn valid_class(&self) -> &[String] {
        self.table.columns()
    }

    pub fn data(&self) -> &ClassificationTable {
        &self.table
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub(crate) fn resolver(&self) -> Resolver<'_> {
        Resolver { table: &self.table, regexes: &self.regexes, codes: self.codes.as_ref(), strict: self.strict }
    }

    /// `to` values of the rows whose `column` value satisfies `predicate`,
    /// in table order.
    ///
    /// ```
    /// use country_converter::{CountryConverter, member_before};
    ///
    /// let cc = CountryConverter::new().unwrap();
    /// let founders = cc.project("EU", member_before(1960), "ISO3").unwrap();
    /// assert!(founders.iter().any(|v| v == "DEU"));
    /// ```
    pub fn project(&self, column: &str, predicate: impl Fn(&Value) -> bool, to: &str) -> Result<Vec<Value>> {
        let mask = self.table.mask_where(column, predicate)?;
        let to_col = self.table.resolve_column(to)?;
        Ok(mask
            .iter()
            .enumerate()
            .filter(|&(_, &keep)| keep)
            .map(|(row, _)| self.table.value(row, to_col).clone())
            .collect())
    }

    /// Convert names between classification schemes.
    ///
    /// ```
    /// use country_converter::{ConvertOptions, CountryConverter};
    ///
    /// let cc = CountryConverter::new().unwrap();
    /// let out = cc.convert(vec!["AT", "Deutschland"], &ConvertOptions::default().with_to("name_short")).unwrap();
    /// assert_eq!(out.to_string(), "Austria Germany");
    /// ```
    pub fn convert(&self, names: impl Into<NameInput>, options: &ConvertOptions) -> Result<ConvertOutput> {
        let (output, _) = self.run_convert(names.into(), options, false)?;
        Ok(output)
    }

    /// Same as [`CountryConverter::convert`], with a trace per name.
    pub fn convert_verbose(&self, names: impl Into<NameInput>, options: &ConvertOptions) -> Result<ConvertRun> {
        let started = Instant::now();
        let (output, names) = self.run_convert(names.into(), options, true)?;
        Ok(ConvertRun { output, details: ConvertDetails { total: started.elapsed(), names } })
    }

    fn run_convert(
        &self,
        names: NameInput,
        options: &ConvertOptions,
        trace: bool,
    ) -> Result<(ConvertOutput, Vec<NameTrace>)> {
        let names = names.into_strings()?;
        let to_col = self.table.resolve_column(&options.to)?;
        let src = options.src.as_deref().map(|s| scheme::validate(s, self.table.columns())).transpose()?;

        let custom;
        let exclusions = if options.exclude_prefix.iter().map(String::as_str).eq(DEFAULT_EXCLUDE_PREFIX) {
            Exclusions::default_set()
        } else {
            custom = Exclusions::compile(&options.exclude_prefix)?;
            &custom
        };

        let plan = ConvertPlan {
            src: src.as_deref(),
            to_col,
            to_alpha: is_alpha_target(&self.table.columns()[to_col]),
            not_found: options.not_found.as_deref(),
            enforce_list: options.enforce_list,
            exclusions,
        };

        let resolver = self.resolver();
        let mut results = Vec::with_capacity(names.len());
        let mut traces = Vec::new();
        for name in &names {
            let (resolution, name_trace) = resolver.resolve(name, &plan, trace)?;
            results.push(resolution);
            traces.extend(name_trace);
        }

        let output = match results.pop() {
            Some(only) if results.is_empty() && !options.enforce_list => ConvertOutput::Single(only),
            Some(last) => {
                results.push(last);
                ConvertOutput::Batch(results)
            }
            None => ConvertOutput::Batch(results),
        };
        Ok((output, traces))
    }
}

/// Predicate for membership columns: any entry counts, except zero.
pub fn is_member() -> impl Fn(&Value) -> bool {
    |value| match value {
        Value::Missing => false,
        Value::Int(i) => *i > 0,
        Value::Float(f) => *f > 0.0,
        Value::Text(s) => !s.trim().is_empty(),
    }
}

/// Predicate for membership-year columns: joined strictly before `year`.
pub fn member_before(year: i64) -> impl Fn(&Value) -> bool {
    move |value| value.as_f64().is_some_and(|joined| joined < year as f64)
}
