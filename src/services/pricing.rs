//! Booking cost computation.
//!
//! A quote is computed once at booking creation and stored on the row; later
//! edits to duration, sale state, or status never recompute it.

use crate::db::Db;
use crate::errors::AppResult;

/// The sale applied to new bookings, if any.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActiveSale {
    pub id:                  String,
    pub discount_percentage: f64,
}

/// Select the sale used for pricing. Nothing prevents several sales from
/// being active at once; the oldest one wins (`created_at`, then `id`) so
/// the pick is stable across requests.
pub async fn find_active_sale(pool: &Db) -> AppResult<Option<ActiveSale>> {
    let sale = sqlx::query_as::<_, ActiveSale>(
        "SELECT id, discount_percentage FROM sales
         WHERE is_active = 1
         ORDER BY created_at, id
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(sale)
}

/// A priced booking: the final cost and the sale that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub total_cost: f64,
    pub sale_id:    Option<String>,
}

/// `base_hourly_rate * duration`, discounted by the active sale's percentage
/// when one applies.
pub fn quote(
    base_hourly_rate: f64,
    duration_hours: f64,
    active_sale: Option<&ActiveSale>,
) -> Quote {
    let base_cost = base_hourly_rate * duration_hours;

    match active_sale {
        Some(sale) => {
            let discount = base_cost * (sale.discount_percentage / 100.0);
            Quote {
                total_cost: base_cost - discount,
                sale_id:    Some(sale.id.clone()),
            }
        }
        None => Quote {
            total_cost: base_cost,
            sale_id:    None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(pct: f64) -> ActiveSale {
        ActiveSale {
            id: "sale-1".to_owned(),
            discount_percentage: pct,
        }
    }

    #[test]
    fn no_active_sale_charges_the_base_rate() {
        let q = quote(15.0, 2.0, None);
        assert_eq!(q.total_cost, 30.0);
        assert_eq!(q.sale_id, None);
    }

    #[test]
    fn active_sale_discounts_by_percentage() {
        let q = quote(15.0, 2.0, Some(&sale(20.0)));
        assert_eq!(q.total_cost, 24.0);
        assert_eq!(q.sale_id.as_deref(), Some("sale-1"));
    }

    #[test]
    fn zero_percent_sale_still_records_the_reference() {
        let q = quote(15.0, 2.0, Some(&sale(0.0)));
        assert_eq!(q.total_cost, 30.0);
        assert!(q.sale_id.is_some());
    }

    #[test]
    fn hundred_percent_sale_is_free() {
        let q = quote(15.0, 2.0, Some(&sale(100.0)));
        assert_eq!(q.total_cost, 0.0);
    }

    #[test]
    fn fractional_durations_price_proportionally() {
        let q = quote(15.0, 1.5, None);
        assert_eq!(q.total_cost, 22.5);
    }
}
