//! Dashboard metrics aggregation
//!
//! Computes the derived analytics view over the analytics_events table
//! for one restaurant and date range. All aggregation is read-only and
//! deterministic: equal-count entries are tie-broken by name, then id,
//! so repeated runs over the same event set produce identical output.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{QrMenuError, Result};
use crate::storage::{BreakdownRow, SeaOrmStorage};
use migration::entities::analytics_event;

/// Entries kept in each ranked list
const TOP_N: usize = 10;

/// Ranked entity entry (item or category)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityStats {
    pub id: String,
    pub name: String,
    pub count: u64,
}

/// One slice of a breakdown (device, platform, traffic source)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

/// The dashboard view model, recomputed on every query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedMetrics {
    pub total_views: u64,
    pub total_clicks: u64,
    pub qr_scans: u64,
    pub total_events: u64,
    pub total_sessions: u64,
    pub top_clicked_items: Vec<EntityStats>,
    pub top_viewed_categories: Vec<EntityStats>,
    /// Items with the fewest views; zero-view items included
    pub least_viewed_items: Vec<EntityStats>,
    pub device_breakdown: Vec<CategoryCount>,
    pub platform_breakdown: Vec<CategoryCount>,
    pub traffic_sources: Vec<CategoryCount>,
    /// Event count per hour of day, always 24 buckets
    pub busy_hours: Vec<u64>,
    /// Event count per day of week, always 7 buckets, 0 = Sunday
    pub busy_days: Vec<u64>,
    /// Mean dwell time from matched enter/leave pairs, 0 without pairs
    pub avg_time_spent_secs: f64,
}

/// Metrics aggregation service
pub struct MetricsService {
    storage: Arc<SeaOrmStorage>,
}

impl MetricsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Parse a date range, failing loudly on malformed input.
    ///
    /// Supports RFC3339 and YYYY-MM-DD; a date-only end bound extends to
    /// the end of that day so the range stays inclusive. Both bounds
    /// absent means the last 30 days.
    pub fn parse_date_range_strict(
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        match (start_date, end_date) {
            (Some(s), Some(e)) => {
                let start = Self::parse_date(s, false).ok_or_else(|| {
                    QrMenuError::validation(format!(
                        "Invalid start date format: '{}'. Supported formats: RFC3339 or YYYY-MM-DD",
                        s
                    ))
                })?;
                let end = Self::parse_date(e, true).ok_or_else(|| {
                    QrMenuError::validation(format!(
                        "Invalid end date format: '{}'. Supported formats: RFC3339 or YYYY-MM-DD",
                        e
                    ))
                })?;
                if start > end {
                    return Err(QrMenuError::validation(
                        "Start date must not be later than end date",
                    ));
                }
                Ok((start, end))
            }
            (Some(_), None) => Err(QrMenuError::validation(
                "Start date is provided but end date is missing",
            )),
            (None, Some(_)) => Err(QrMenuError::validation(
                "End date is provided but start date is missing",
            )),
            (None, None) => Ok(Self::default_date_range()),
        }
    }

    fn parse_date(s: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| {
                        if end_of_day {
                            d.and_hms_opt(23, 59, 59)
                        } else {
                            d.and_hms_opt(0, 0, 0)
                        }
                    })
                    .map(|dt| dt.and_utc())
            })
    }

    fn default_date_range() -> (DateTime<Utc>, DateTime<Utc>) {
        let end = Utc::now();
        let start = end - Duration::days(30);
        (start, end)
    }

    /// Compute the full dashboard view for one restaurant and range
    pub async fn compute_metrics(
        &self,
        restaurant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AggregatedMetrics> {
        info!(
            "Metrics: compute for '{}' from {} to {}",
            restaurant_id, start, end
        );

        let (
            type_counts,
            total_sessions,
            clicked_items,
            viewed_categories,
            viewed_items,
            device_rows,
            platform_rows,
            source_rows,
        ) = tokio::try_join!(
            self.storage.count_events_by_type(restaurant_id, start, end),
            self.storage
                .count_distinct_sessions(restaurant_id, start, end),
            self.storage
                .count_entity_events(restaurant_id, "click", "item", start, end),
            self.storage
                .count_entity_events(restaurant_id, "view", "category", start, end),
            self.storage
                .count_entity_events(restaurant_id, "view", "item", start, end),
            self.storage.breakdown_by(
                restaurant_id,
                analytics_event::Column::DeviceType,
                start,
                end
            ),
            self.storage.breakdown_by(
                restaurant_id,
                analytics_event::Column::Platform,
                start,
                end
            ),
            self.storage.breakdown_by(
                restaurant_id,
                analytics_event::Column::QrEntrypoint,
                start,
                end
            ),
        )?;

        let (hour_rows, day_rows, timing_rows, items, categories) = tokio::try_join!(
            self.storage.bucket_by_hour(restaurant_id, start, end),
            self.storage.bucket_by_weekday(restaurant_id, start, end),
            self.storage.list_timing_events(restaurant_id, start, end),
            self.storage.list_active_items(restaurant_id),
            self.storage.list_active_categories(restaurant_id),
        )?;

        let mut total_views = 0u64;
        let mut total_clicks = 0u64;
        let mut qr_scans = 0u64;
        let mut total_events = 0u64;
        for row in &type_counts {
            let count = row.count.max(0) as u64;
            total_events += count;
            match row.event_type.as_str() {
                "view" => total_views = count,
                "click" => total_clicks = count,
                "qr_scan" => qr_scans = count,
                _ => {}
            }
        }

        let item_names: HashMap<&str, &str> = items
            .iter()
            .map(|i| (i.id.as_str(), i.name.as_str()))
            .collect();
        let category_names: HashMap<&str, &str> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        let top_clicked_items = rank_top(&clicked_items, &item_names);
        let top_viewed_categories = rank_top(&viewed_categories, &category_names);

        // Least-viewed walks the full catalog so zero-view items appear;
        // a pure event-count query would never surface them
        let view_counts: HashMap<&str, u64> = viewed_items
            .iter()
            .map(|r| (r.entity_id.as_str(), r.count.max(0) as u64))
            .collect();
        let mut least_viewed_items: Vec<EntityStats> = items
            .iter()
            .map(|item| EntityStats {
                id: item.id.clone(),
                name: item.name.clone(),
                count: view_counts.get(item.id.as_str()).copied().unwrap_or(0),
            })
            .collect();
        least_viewed_items.sort_by(|a, b| {
            a.count
                .cmp(&b.count)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        least_viewed_items.truncate(TOP_N);

        let device_breakdown = to_breakdown(device_rows);
        let platform_breakdown = to_breakdown(platform_rows);
        let traffic_sources = to_breakdown(source_rows);

        let mut busy_hours = vec![0u64; 24];
        for row in hour_rows {
            if let Some(slot) = busy_hours.get_mut(row.bucket.clamp(0, 23) as usize) {
                *slot = row.count.max(0) as u64;
            }
        }
        let mut busy_days = vec![0u64; 7];
        for row in day_rows {
            if let Some(slot) = busy_days.get_mut(row.bucket.clamp(0, 6) as usize) {
                *slot = row.count.max(0) as u64;
            }
        }

        let avg_time_spent_secs = average_dwell_secs(&timing_rows);

        debug!(
            "Metrics: '{}' -> {} events, {} sessions, {} ranked items",
            restaurant_id,
            total_events,
            total_sessions,
            top_clicked_items.len()
        );

        Ok(AggregatedMetrics {
            total_views,
            total_clicks,
            qr_scans,
            total_events,
            total_sessions,
            top_clicked_items,
            top_viewed_categories,
            least_viewed_items,
            device_breakdown,
            platform_breakdown,
            traffic_sources,
            busy_hours,
            busy_days,
            avg_time_spent_secs,
        })
    }
}

/// Rank entity counts descending with a stable name/id tie-break
fn rank_top(
    rows: &[crate::storage::EntityCountRow],
    names: &HashMap<&str, &str>,
) -> Vec<EntityStats> {
    let mut ranked: Vec<EntityStats> = rows
        .iter()
        .map(|row| EntityStats {
            id: row.entity_id.clone(),
            // Entities deleted from the catalog keep their id as label
            name: names
                .get(row.entity_id.as_str())
                .map(|n| n.to_string())
                .unwrap_or_else(|| row.entity_id.clone()),
            count: row.count.max(0) as u64,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.truncate(TOP_N);
    ranked
}

fn to_breakdown(rows: Vec<BreakdownRow>) -> Vec<CategoryCount> {
    let mut breakdown: Vec<CategoryCount> = rows
        .into_iter()
        .map(|row| CategoryCount {
            name: row.field_value.unwrap_or_else(|| "(direct)".to_string()),
            count: row.count.max(0) as u64,
        })
        .collect();
    breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    breakdown
}

/// Mean duration between matched enter/leave pairs.
///
/// Pairs match FIFO per (session, entity): the earliest unmatched enter
/// absorbs the next leave. Unmatched events on either side are ignored.
fn average_dwell_secs(rows: &[crate::storage::TimingEventRow]) -> f64 {
    use std::collections::VecDeque;

    let mut open: HashMap<(String, Option<String>), VecDeque<DateTime<Utc>>> = HashMap::new();
    let mut total_secs = 0f64;
    let mut pairs = 0u64;

    for row in rows {
        let key = (row.session_id.clone(), row.entity_id.clone());
        match row.event_type.as_str() {
            "enter" => {
                open.entry(key).or_default().push_back(row.created_at);
            }
            "leave" => {
                if let Some(queue) = open.get_mut(&key)
                    && let Some(entered_at) = queue.pop_front()
                {
                    let dwell = (row.created_at - entered_at).num_milliseconds();
                    if dwell >= 0 {
                        total_secs += dwell as f64 / 1000.0;
                        pairs += 1;
                    }
                }
            }
            _ => {}
        }
    }

    if pairs == 0 {
        0.0
    } else {
        total_secs / pairs as f64
    }
}
