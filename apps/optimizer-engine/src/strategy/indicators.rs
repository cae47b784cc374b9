//! Indicator math used by the bundled strategy families.
//!
//! Crate-internal helpers, not a public indicator library. Warmup indices are
//! `None` and never produce a signal.

use rust_decimal::Decimal;

/// Simple moving average; `None` until `period` values are available.
pub fn sma(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let divisor = Decimal::from(period as u64);
    let mut window_sum: Decimal = values[..period].iter().copied().sum();
    out[period - 1] = Some(window_sum / divisor);

    for i in period..values.len() {
        window_sum += values[i] - values[i - period];
        out[i] = Some(window_sum / divisor);
    }

    out
}

/// Exponential moving average seeded with the SMA of the first `period` values.
pub fn ema(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let divisor = Decimal::from(period as u64);
    let multiplier = Decimal::TWO / Decimal::from(period as u64 + 1);

    let seed: Decimal = values[..period].iter().copied().sum::<Decimal>() / divisor;
    out[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..values.len() {
        let next = (values[i] - prev) * multiplier + prev;
        out[i] = Some(next);
        prev = next;
    }

    out
}

/// Wilder's RSI; `None` until `period` price changes are available.
///
/// A flat window (no gains, no losses) reads as a neutral 50 rather than the
/// conventional 100, so threshold rules stay silent on constant series.
pub fn rsi(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() <= period {
        return out;
    }

    let divisor = Decimal::from(period as u64);
    let mut avg_gain = Decimal::ZERO;
    let mut avg_loss = Decimal::ZERO;

    for i in 1..=period {
        let change = values[i] - values[i - 1];
        if change > Decimal::ZERO {
            avg_gain += change;
        } else {
            avg_loss += change.abs();
        }
    }
    avg_gain /= divisor;
    avg_loss /= divisor;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    let smoothing = divisor - Decimal::ONE;
    for i in period + 1..values.len() {
        let change = values[i] - values[i - 1];
        let (gain, loss) = if change > Decimal::ZERO {
            (change, Decimal::ZERO)
        } else {
            (Decimal::ZERO, change.abs())
        };
        avg_gain = (avg_gain * smoothing + gain) / divisor;
        avg_loss = (avg_loss * smoothing + loss) / divisor;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    out
}

fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss == Decimal::ZERO {
        if avg_gain == Decimal::ZERO {
            // Flat window: neutral
            return Decimal::new(50, 0);
        }
        return Decimal::ONE_HUNDRED;
    }
    let rs = avg_gain / avg_loss;
    Decimal::ONE_HUNDRED - Decimal::ONE_HUNDRED / (Decimal::ONE + rs)
}

/// MACD line and signal line.
///
/// The MACD line is `EMA(short) - EMA(long)`; the signal line is an EMA of
/// the MACD line over its defined suffix.
pub fn macd(
    values: &[Decimal],
    short_period: usize,
    long_period: usize,
    signal_period: usize,
) -> (Vec<Option<Decimal>>, Vec<Option<Decimal>>) {
    let short_ema = ema(values, short_period);
    let long_ema = ema(values, long_period);

    let mut macd_line = vec![None; values.len()];
    for i in 0..values.len() {
        if let (Some(s), Some(l)) = (short_ema[i], long_ema[i]) {
            macd_line[i] = Some(s - l);
        }
    }

    let mut signal_line = vec![None; values.len()];
    let defined_start = macd_line.iter().position(Option::is_some);
    if let Some(start) = defined_start {
        let defined: Vec<Decimal> = macd_line[start..].iter().filter_map(|v| *v).collect();
        for (offset, value) in ema(&defined, signal_period).into_iter().enumerate() {
            signal_line[start + offset] = value;
        }
    }

    (macd_line, signal_line)
}

/// Rolling maximum of the `lookback` values strictly before each index.
pub fn rolling_high(values: &[Decimal], lookback: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    if lookback == 0 {
        return out;
    }

    for i in lookback..values.len() {
        let high = values[i - lookback..i].iter().copied().max();
        out[i] = high;
    }

    out
}

/// Rolling minimum of the `lookback` values strictly before each index.
pub fn rolling_low(values: &[Decimal], lookback: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    if lookback == 0 {
        return out;
    }

    for i in lookback..values.len() {
        let low = values[i - lookback..i].iter().copied().min();
        out[i] = low;
    }

    out
}
