//! Price series for a single card.

use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::Statistics;

/// One daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Summary shown next to the price chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub lowest: f64,
    pub highest: f64,
    /// Price at the latest date.
    pub current: f64,
    pub average: f64,
}

/// Date-ordered prices for one card identity key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    pub card_identity_key: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(card_identity_key: impl Into<String>) -> Self {
        Self {
            card_identity_key: card_identity_key.into(),
            points: Vec::new(),
        }
    }

    /// Append a point. Points arrive in date order from the store; out of
    /// order pushes are re-sorted so `current` stays the latest date.
    pub fn push(&mut self, point: PricePoint) {
        let in_order = self.points.last().map_or(true, |last| last.date <= point.date);
        self.points.push(point);
        if !in_order {
            self.points.sort_by_key(|p| p.date);
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `None` for an empty series.
    pub fn stats(&self) -> Option<SeriesStats> {
        let current = self.points.last()?.price;
        let prices = self.points.iter().map(|p| p.price);
        let lowest = prices.clone().fold(f64::INFINITY, f64::min);
        let highest = prices.clone().fold(f64::NEG_INFINITY, f64::max);
        let average = prices.collect::<Vec<_>>().mean();
        Some(SeriesStats {
            lowest,
            highest,
            current,
            average,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(day: u32, price: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            price,
        }
    }

    #[test]
    fn test_stats() {
        let mut series = PriceSeries::new("Black Lotus - Alpha - Regular");
        series.push(point(1, 10000.0));
        series.push(point(2, 12000.0));
        series.push(point(3, 11000.0));

        let stats = series.stats().unwrap();
        assert_relative_eq!(stats.lowest, 10000.0);
        assert_relative_eq!(stats.highest, 12000.0);
        assert_relative_eq!(stats.current, 11000.0);
        assert_relative_eq!(stats.average, 11000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_order_push() {
        let mut series = PriceSeries::new("Sol Ring - Alpha - Regular");
        series.push(point(3, 2.0));
        series.push(point(1, 5.0));
        assert_eq!(series.points()[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_relative_eq!(series.stats().unwrap().current, 2.0);
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::new("Island - Promo - Regular");
        assert!(series.is_empty());
        assert_eq!(series.stats(), None);
    }
}
