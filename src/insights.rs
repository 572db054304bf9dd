//! Page Insights over FQL.
//!
//! Fetching a set of metrics for several period-end dates takes one FQL query
//! per date. All of them are sent as a single `fql.multiquery`, keyed by the
//! date's position in the sorted date list, and the combined answer is split
//! back up by date and, optionally, by metric.
//!
//! ```rust,no_run
//! use chrono::{TimeZone, Utc};
//! use fb_graph_client::{FacebookClient, insights::{InsightsQuery, Period}};
//!
//! # async fn run(client: FacebookClient) -> Result<(), Box<dyn std::error::Error>> {
//! let query = InsightsQuery::builder()
//!     .page_object_id("31698190356")
//!     .metrics(vec!["page_active_users".to_string()])
//!     .period(Period::Day)
//!     .period_end_dates(vec![Utc.with_ymd_and_hms(2010, 9, 16, 18, 0, 0).unwrap()])
//!     .build();
//!
//! let by_metric = client.insights_by_metric_by_date(&query).await?;
//! for (metric, values) in by_metric {
//!     println!("{metric}: {values:?}");
//! }
//! # Ok(()) }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use bon::Builder;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    FacebookClient,
    error::{FacebookError, Result},
    multiquery::decompose_by_metric,
};

/// Facebook's insight day boundaries are midnight, US Pacific time.
pub const PACIFIC_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day,
    Week,
    Days28,
    Month,
    Lifetime,
}

impl Period {
    /// The `period` value FQL expects, in seconds.
    pub const fn length_seconds(self) -> u64 {
        match self {
            Self::Day => 60 * 60 * 24,
            Self::Week => 60 * 60 * 24 * 7,
            Self::Days28 => 60 * 60 * 24 * 28,
            Self::Month => 2_592_000,
            Self::Lifetime => 0,
        }
    }
}

#[derive(Debug, Clone, Builder)]
pub struct InsightsQuery {
    #[builder(into)]
    pub page_object_id: String,
    /// Empty means every metric Facebook has for the object.
    #[builder(default)]
    pub metrics: Vec<String>,
    pub period: Period,
    pub period_end_dates: Vec<DateTime<Utc>>,
    #[builder(default = PACIFIC_TIME_ZONE)]
    pub time_zone: Tz,
}

impl InsightsQuery {
    pub fn validate(&self) -> Result<()> {
        if self.page_object_id.trim().is_empty() {
            return Err(FacebookError::configuration(
                "page_object_id should be a non-empty string, probably a positive number",
            ));
        }
        if self.period_end_dates.is_empty() {
            return Err(FacebookError::configuration(
                "period_end_dates should be non-empty",
            ));
        }
        Ok(())
    }

    pub fn base_query(&self) -> String {
        create_base_query(self.period, self.page_object_id.trim(), &self.metrics)
    }

    /// Period-end dates moved to local midnight, de-duplicated and sorted.
    /// A date's position in this list is its multiquery key.
    pub fn query_dates(&self) -> Result<Vec<DateTime<Utc>>> {
        let normalized = self
            .period_end_dates
            .iter()
            .map(|date| midnight_in(*date, &self.time_zone))
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(normalized.into_iter().collect())
    }
}

/// `SELECT metric, value FROM insights WHERE object_id='<id>' [AND metric IN (...)]
/// AND period=<seconds> AND end_time=`, ready for a timestamp to be appended.
pub fn create_base_query<I, S>(period: Period, page_object_id: &str, metrics: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut query = format!(
        "SELECT metric, value FROM insights WHERE object_id='{}'",
        escape_fql(page_object_id)
    );

    let metric_list = metrics
        .into_iter()
        .map(|metric| metric.as_ref().trim().to_string())
        .filter(|metric| !metric.is_empty())
        .map(|metric| format!("'{}'", escape_fql(&metric)))
        .collect::<Vec<_>>()
        .join(",");
    if !metric_list.is_empty() {
        query.push_str(" AND metric IN (");
        query.push_str(&metric_list);
        query.push(')');
    }

    query.push_str(&format!(" AND period={} AND end_time=", period.length_seconds()));
    query
}

/// One query per date, keyed by the date's index.
pub fn build_queries(
    base_query: &str,
    dates_by_query_index: &[DateTime<Utc>],
) -> BTreeMap<String, String> {
    dates_by_query_index
        .iter()
        .enumerate()
        .map(|(index, date)| {
            (
                index.to_string(),
                format!("{base_query}{}", to_unix_time(*date)),
            )
        })
        .collect()
}

fn escape_fql(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Moves `date` to 00:00:00.000 of the same calendar day in `time_zone`.
pub fn midnight_in<Z: TimeZone>(date: DateTime<Utc>, time_zone: &Z) -> Result<DateTime<Utc>> {
    let local_day = date.with_timezone(time_zone).date_naive();
    local_day
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| time_zone.from_local_datetime(&midnight).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        .ok_or_else(|| {
            FacebookError::configuration(format!(
                "Midnight does not exist on {local_day} in the reference time zone"
            ))
        })
}

/// Whole seconds since the epoch; sub-second precision is dropped.
pub fn to_unix_time(date: DateTime<Utc>) -> i64 {
    date.timestamp()
}

pub fn unix_time_at_midnight<Z: TimeZone>(date: DateTime<Utc>, time_zone: &Z) -> Result<i64> {
    midnight_in(date, time_zone).map(to_unix_time)
}

/// Maps multiquery keys back to the dates they were built from.
fn resolve_dates(
    results: Map<String, Value>,
    dates_by_query_index: &[DateTime<Utc>],
) -> Result<BTreeMap<DateTime<Utc>, Vec<Value>>> {
    let mut by_date = BTreeMap::new();

    for (key, rows) in results {
        let date = key
            .parse::<usize>()
            .ok()
            .and_then(|index| dates_by_query_index.get(index))
            .ok_or_else(|| {
                FacebookError::json_mapping(format!(
                    "MultiQuery response had an unexpected key value: {key}"
                ))
            })?;

        let Value::Array(rows) = rows else {
            return Err(FacebookError::json_mapping(format!(
                "MultiQuery result for key {key} is not an array"
            )));
        };

        by_date.insert(*date, rows);
    }

    Ok(by_date)
}

impl FacebookClient {
    /// Runs one insights query per period-end date in a single multiquery and
    /// returns the raw `{metric, value}` rows per (normalized) date.
    pub async fn insights_by_date(
        &self,
        query: &InsightsQuery,
    ) -> Result<BTreeMap<DateTime<Utc>, Vec<Value>>> {
        query.validate()?;

        let dates = query.query_dates()?;
        let queries = build_queries(&query.base_query(), &dates);
        debug!(
            object_id = %query.page_object_id,
            dates = dates.len(),
            "Executing insights multiquery"
        );

        let results: Map<String, Value> = self.execute_multiquery(queries, &[]).await?;
        resolve_dates(results, &dates)
    }

    /// Same as [`insights_by_date`](Self::insights_by_date), regrouped as
    /// metric → date → value.
    pub async fn insights_by_metric_by_date(
        &self,
        query: &InsightsQuery,
    ) -> Result<BTreeMap<String, BTreeMap<DateTime<Utc>, Value>>> {
        let by_date = self.insights_by_date(query).await?;
        decompose_by_metric(&by_date)
    }
}
