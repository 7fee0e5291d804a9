use super::args::FilterArgs;
use crate::error::{FilterError, FilterResult};
use crate::sql::{Placeholder, QueryBuilder};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a drop.
///
/// The states are mutually exclusive for any row at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropState {
    /// Not started yet.
    Created,
    /// Started, not ended, claims remaining.
    Active,
    /// Every claimable unit was claimed.
    SoldOut,
    /// End time passed with claims remaining.
    Ended,
}

impl DropState {
    pub fn as_str(self) -> &'static str {
        match self {
            DropState::Created => "created",
            DropState::Active => "active",
            DropState::SoldOut => "sold_out",
            DropState::Ended => "ended",
        }
    }

    fn predicate(self, c: &DropColumns, now: Placeholder) -> String {
        let (start, end, max, claimed) = (
            c.start_time,
            c.end_time,
            c.max_claimable,
            c.current_claimed,
        );
        let remaining = format!("({max} = 0 OR {claimed} < {max})");
        match self {
            DropState::Created => format!("{start} > {now} AND {remaining}"),
            DropState::Active => format!(
                "{start} <= {now} AND ({end} = 0 OR {end} > {now}) AND {remaining}"
            ),
            DropState::SoldOut => format!("{max} > 0 AND {claimed} >= {max}"),
            DropState::Ended => format!(
                "{start} <= {now} AND {end} > 0 AND {end} <= {now} AND {remaining}"
            ),
        }
    }
}

impl fmt::Display for DropState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DropState {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(DropState::Created),
            "active" => Ok(DropState::Active),
            "sold_out" => Ok(DropState::SoldOut),
            "ended" => Ok(DropState::Ended),
            other => Err(FilterError::invalid_argument(
                "state",
                format!("unknown drop state '{other}'"),
            )),
        }
    }
}

/// Counter and timestamp columns of the drops table. Timestamps are epoch milliseconds,
/// `0` meaning unset; a `max_claimable` of `0` means unlimited.
#[derive(Debug, Clone, Copy)]
pub struct DropColumns {
    pub start_time: &'static str,
    pub end_time: &'static str,
    pub max_claimable: &'static str,
    pub current_claimed: &'static str,
}

impl Default for DropColumns {
    fn default() -> Self {
        Self {
            start_time: "ndrop.start_time",
            end_time: "ndrop.end_time",
            max_claimable: "ndrop.max_claimable",
            current_claimed: "ndrop.current_claimed",
        }
    }
}

/// Restrict drops to the lifecycle states listed in `state`, evaluated at `now`.
///
/// Several states are ORed into one condition; `now` is bound once and shared.
pub fn drop_state_filter(
    query: &mut QueryBuilder,
    args: &FilterArgs,
    columns: &DropColumns,
    now: DateTime<Utc>,
) -> FilterResult<()> {
    let mut states: Vec<DropState> = Vec::new();
    for value in args.list("state") {
        let state: DropState = value
            .as_str()
            .ok_or_else(|| FilterError::invalid_argument("state", "expected a state name"))?
            .parse()?;
        if !states.contains(&state) {
            states.push(state);
        }
    }

    if states.is_empty() {
        return Ok(());
    }

    let now = query.bind(now.timestamp_millis());
    let fragments: Vec<String> = states.iter().map(|s| s.predicate(columns, now)).collect();

    if fragments.len() == 1 {
        query.add_raw_condition(&fragments[0]);
    } else {
        let grouped: Vec<String> = fragments.iter().map(|f| format!("({f})")).collect();
        query.add_raw_condition(grouped.join(" OR "));
    }

    Ok(())
}
