use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::PgPool;
use tezos_indexer_types::Level;

use crate::error::StoreError;

/// Computes low/medium/high fee summaries per operation kind over the
/// trailing `window` operations (§4.6) and upserts a `fees` row for each
/// kind observed in that window. Runs once per indexing cycle.
pub async fn aggregate_fees(pool: &PgPool, window: i64) -> Result<(), StoreError> {
    let rows: Vec<(String, i64, Level, Option<Level>)> = sqlx::query_as(
        "SELECT kind, fee, block_level, cycle FROM operations \
         WHERE fee IS NOT NULL ORDER BY block_level DESC, operation_id DESC LIMIT $1",
    )
    .bind(window)
    .fetch_all(pool)
    .await?;

    let Some((_, _, latest_level, latest_cycle)) = rows.first().cloned() else {
        return Ok(());
    };

    let mut by_kind: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for (kind, fee, _, _) in rows {
        by_kind.entry(kind).or_default().push(fee);
    }

    let now = Utc::now();
    for (kind, fees) in by_kind {
        let (low, medium, high) = summarize(&fees);
        sqlx::query(
            "INSERT INTO fees (kind, low, medium, high, timestamp, cycle, level) \
             VALUES ($1,$2,$3,$4,$5,$6,$7) \
             ON CONFLICT (kind, level) DO UPDATE SET \
             low = EXCLUDED.low, medium = EXCLUDED.medium, high = EXCLUDED.high, \
             timestamp = EXCLUDED.timestamp, cycle = EXCLUDED.cycle",
        )
        .bind(&kind)
        .bind(low)
        .bind(medium)
        .bind(high)
        .bind(now)
        .bind(latest_cycle)
        .bind(latest_level)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Mean, and mean +/- population standard deviation, floored to integers
/// with the low bound clipped to zero (§4.6).
fn summarize(fees: &[i64]) -> (i64, i64, i64) {
    let n = fees.len() as f64;
    let mean = fees.iter().sum::<i64>() as f64 / n;
    let variance = fees.iter().map(|&f| (f as f64 - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    let low = (mean - stddev).max(0.0).floor() as i64;
    let medium = mean.floor() as i64;
    let high = (mean + stddev).floor() as i64;
    (low, medium, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_clips_low_to_zero() {
        let (low, medium, high) = summarize(&[1, 1, 1, 1]);
        assert_eq!((low, medium, high), (1, 1, 1));
    }

    #[test]
    fn summarize_computes_mean_and_spread() {
        let (low, medium, high) = summarize(&[100, 200, 300]);
        assert_eq!(medium, 200);
        assert!(low < medium && medium < high);
    }
}
