//! Trade breakdowns by trend, entry RSI band, and profit/loss group.
//!
//! The profit group is profit_loss > 0; everything else (including breakeven)
//! falls in the loss group. Undefined snapshot values are skipped per feature.

use super::position::{Trade, Trend};

/// Entry RSI bands, each `(lower, upper]`.
pub const RSI_BANDS: [(f64, f64); 6] = [
    (0.0, 30.0),
    (30.0, 40.0),
    (40.0, 50.0),
    (50.0, 60.0),
    (60.0, 70.0),
    (70.0, 100.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct TrendBreakdown {
    pub trend: Trend,
    pub trades: usize,
    pub win_rate: f64,
    pub avg_profit_loss: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiBandBreakdown {
    pub lower: f64,
    pub upper: f64,
    pub trades: usize,
    pub win_rate: f64,
    pub avg_profit_loss: Option<f64>,
}

/// Count, mean and population standard deviation of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

impl FeatureStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return FeatureStats::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        FeatureStats {
            count: values.len(),
            mean: Some(mean),
            std_dev: Some(variance.sqrt()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupSummary {
    pub trades: usize,
    pub entry_rsi: FeatureStats,
    pub entry_atr: FeatureStats,
    pub ma_short_deviation_pct: FeatureStats,
    pub ma_medium_deviation_pct: FeatureStats,
    pub duration_days: FeatureStats,
    pub pre_entry_above_ma_medium_pct: FeatureStats,
    pub ma_short_change_pct: FeatureStats,
    pub ma_medium_change_pct: FeatureStats,
    pub ma_long_change_pct: FeatureStats,
}

impl GroupSummary {
    fn from_trades(trades: &[&Trade]) -> Self {
        GroupSummary {
            trades: trades.len(),
            entry_rsi: FeatureStats::from_values(trades.iter().filter_map(|t| t.entry_rsi)),
            entry_atr: FeatureStats::from_values(trades.iter().filter_map(|t| t.entry_atr)),
            ma_short_deviation_pct: FeatureStats::from_values(
                trades.iter().filter_map(|t| t.entry_ma_short_deviation_pct),
            ),
            ma_medium_deviation_pct: FeatureStats::from_values(
                trades.iter().filter_map(|t| t.entry_ma_medium_deviation_pct),
            ),
            duration_days: FeatureStats::from_values(
                trades.iter().map(|t| t.duration_days as f64),
            ),
            pre_entry_above_ma_medium_pct: FeatureStats::from_values(
                trades.iter().filter_map(|t| t.pre_entry_above_ma_medium_pct),
            ),
            ma_short_change_pct: FeatureStats::from_values(
                trades.iter().filter_map(|t| t.ma_change_pct.short),
            ),
            ma_medium_change_pct: FeatureStats::from_values(
                trades.iter().filter_map(|t| t.ma_change_pct.medium),
            ),
            ma_long_change_pct: FeatureStats::from_values(
                trades.iter().filter_map(|t| t.ma_change_pct.long),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeBreakdown {
    pub by_trend: Vec<TrendBreakdown>,
    pub by_rsi_band: Vec<RsiBandBreakdown>,
    pub profit_group: GroupSummary,
    pub loss_group: GroupSummary,
}

impl TradeBreakdown {
    pub fn compute(trades: &[Trade]) -> Self {
        let by_trend = [Trend::Bullish, Trend::Bearish]
            .into_iter()
            .map(|trend| {
                let group: Vec<&Trade> = trades.iter().filter(|t| t.trend == trend).collect();
                TrendBreakdown {
                    trend,
                    trades: group.len(),
                    win_rate: win_rate(&group),
                    avg_profit_loss: avg_profit_loss(&group),
                }
            })
            .collect();

        let by_rsi_band = RSI_BANDS
            .iter()
            .map(|&(lower, upper)| {
                let group: Vec<&Trade> = trades
                    .iter()
                    .filter(|t| t.entry_rsi.is_some_and(|r| r > lower && r <= upper))
                    .collect();
                RsiBandBreakdown {
                    lower,
                    upper,
                    trades: group.len(),
                    win_rate: win_rate(&group),
                    avg_profit_loss: avg_profit_loss(&group),
                }
            })
            .collect();

        let (profit, loss): (Vec<&Trade>, Vec<&Trade>) =
            trades.iter().partition(|t| t.profit_loss > 0.0);

        TradeBreakdown {
            by_trend,
            by_rsi_band,
            profit_group: GroupSummary::from_trades(&profit),
            loss_group: GroupSummary::from_trades(&loss),
        }
    }
}

fn win_rate(trades: &[&Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.profit_loss > 0.0).count();
    wins as f64 / trades.len() as f64 * 100.0
}

fn avg_profit_loss(trades: &[&Trade]) -> Option<f64> {
    if trades.is_empty() {
        return None;
    }
    let total: f64 = trades.iter().map(|t| t.profit_loss).sum();
    Some(total / trades.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_helpers::MaChangePct;
    use crate::domain::position::ExitReason;
    use chrono::{Duration, NaiveDate};

    fn make_trade(trend: Trend, pnl: f64, rsi: Option<f64>, days: i64) -> Trade {
        let entry_time = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Trade {
            trend,
            entry_index: 0,
            exit_index: 1,
            entry_time,
            exit_time: entry_time + Duration::days(days),
            entry_price: 100.0,
            exit_price: 100.0,
            exit_reason: ExitReason::CrossExit,
            price_change: 0.0,
            price_change_pct: 0.0,
            profit_loss: pnl,
            profit_loss_pct: 0.0,
            duration_days: days,
            entry_rsi: rsi,
            exit_rsi: None,
            entry_atr: Some(2.0),
            entry_ma_short_deviation_pct: Some(1.0),
            entry_ma_medium_deviation_pct: None,
            pre_entry_above_ma_medium_pct: None,
            ma_change_pct: MaChangePct::default(),
        }
    }

    #[test]
    fn empty_breakdown() {
        let b = TradeBreakdown::compute(&[]);
        assert_eq!(b.by_trend.len(), 2);
        assert!(b.by_trend.iter().all(|t| t.trades == 0 && t.avg_profit_loss.is_none()));
        assert_eq!(b.by_rsi_band.len(), 6);
        assert_eq!(b.profit_group.trades, 0);
        assert_eq!(b.loss_group.entry_rsi.mean, None);
    }

    #[test]
    fn per_trend_win_rate() {
        let trades = vec![
            make_trade(Trend::Bullish, 100.0, Some(45.0), 1),
            make_trade(Trend::Bullish, -50.0, Some(55.0), 1),
            make_trade(Trend::Bearish, 30.0, Some(35.0), 1),
        ];
        let b = TradeBreakdown::compute(&trades);
        let bull = &b.by_trend[0];
        assert_eq!(bull.trend, Trend::Bullish);
        assert_eq!(bull.trades, 2);
        assert!((bull.win_rate - 50.0).abs() < 1e-9);
        assert!((bull.avg_profit_loss.unwrap() - 25.0).abs() < 1e-9);
        let bear = &b.by_trend[1];
        assert!((bear.win_rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_bands_are_upper_inclusive() {
        let trades = vec![
            make_trade(Trend::Bullish, 10.0, Some(30.0), 1),
            make_trade(Trend::Bullish, -10.0, Some(30.5), 1),
            make_trade(Trend::Bullish, 10.0, Some(40.0), 1),
            make_trade(Trend::Bullish, 10.0, None, 1),
        ];
        let b = TradeBreakdown::compute(&trades);
        assert_eq!(b.by_rsi_band[0].trades, 1);
        assert_eq!(b.by_rsi_band[1].trades, 2);
        assert!((b.by_rsi_band[1].win_rate - 50.0).abs() < 1e-9);
        assert_eq!(b.by_rsi_band[1].avg_profit_loss, Some(0.0));
        assert_eq!(b.by_rsi_band[0].avg_profit_loss, Some(10.0));
        assert_eq!(b.by_rsi_band[5].avg_profit_loss, None);
        let counted: usize = b.by_rsi_band.iter().map(|r| r.trades).sum();
        assert_eq!(counted, 3);
    }

    #[test]
    fn breakeven_lands_in_loss_group() {
        let trades = vec![
            make_trade(Trend::Bullish, 10.0, Some(40.0), 2),
            make_trade(Trend::Bullish, 0.0, Some(50.0), 4),
            make_trade(Trend::Bullish, -10.0, Some(60.0), 6),
        ];
        let b = TradeBreakdown::compute(&trades);
        assert_eq!(b.profit_group.trades, 1);
        assert_eq!(b.loss_group.trades, 2);
        assert!((b.loss_group.entry_rsi.mean.unwrap() - 55.0).abs() < 1e-9);
        // population std of [50, 60] = 5
        assert!((b.loss_group.entry_rsi.std_dev.unwrap() - 5.0).abs() < 1e-9);
        assert!((b.loss_group.duration_days.mean.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn undefined_values_skipped() {
        let trades = vec![
            make_trade(Trend::Bullish, 10.0, None, 1),
            make_trade(Trend::Bullish, 20.0, Some(50.0), 1),
        ];
        let b = TradeBreakdown::compute(&trades);
        assert_eq!(b.profit_group.entry_rsi.count, 1);
        assert_eq!(b.profit_group.ma_medium_deviation_pct.count, 0);
        assert_eq!(b.profit_group.ma_medium_deviation_pct.mean, None);
        assert!((b.profit_group.entry_rsi.std_dev.unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn entry_context_split_by_outcome() {
        let mut winner = make_trade(Trend::Bullish, 40.0, Some(55.0), 3);
        winner.pre_entry_above_ma_medium_pct = Some(100.0);
        winner.ma_change_pct = MaChangePct {
            short: Some(0.6),
            medium: Some(0.3),
            long: Some(0.1),
        };
        let mut loser = make_trade(Trend::Bullish, -20.0, Some(65.0), 3);
        loser.pre_entry_above_ma_medium_pct = Some(60.0);
        loser.ma_change_pct.short = Some(0.2);
        let mut other_loser = make_trade(Trend::Bullish, -30.0, Some(62.0), 3);
        other_loser.pre_entry_above_ma_medium_pct = Some(80.0);

        let b = TradeBreakdown::compute(&[winner, loser, other_loser]);
        assert_eq!(b.profit_group.pre_entry_above_ma_medium_pct.mean, Some(100.0));
        assert_eq!(b.profit_group.ma_long_change_pct.mean, Some(0.1));
        assert_eq!(b.loss_group.pre_entry_above_ma_medium_pct.count, 2);
        assert!((b.loss_group.pre_entry_above_ma_medium_pct.mean.unwrap() - 70.0).abs() < 1e-9);
        assert!((b.loss_group.pre_entry_above_ma_medium_pct.std_dev.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(b.loss_group.ma_short_change_pct.count, 1);
        assert_eq!(b.loss_group.ma_medium_change_pct.mean, None);
        assert!((b.by_rsi_band[4].avg_profit_loss.unwrap() + 25.0).abs() < 1e-9);
    }
}
