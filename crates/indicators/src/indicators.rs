use dashboard_core::Bar;

/// Simple Moving Average. Returns one value per full window,
/// aligned to the end of the input.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut out = Vec::with_capacity(data.len() - period + 1);
    for window in data.windows(period) {
        out.push(window.iter().sum::<f64>() / period as f64);
    }
    out
}

/// Exponential Moving Average, seeded with the first value.
/// Returns a series as long as the input.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(data.len());
    out.push(data[0]);

    for i in 1..data.len() {
        let prev = out[i - 1];
        out.push(prev + alpha * (data[i] - prev));
    }
    out
}

/// Relative Strength Index with Wilder smoothing
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let changes: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: &f64| c.max(0.0);
    let loss = |c: &f64| (-c).max(0.0);

    let mut avg_gain = changes[..period].iter().map(gain).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(loss).sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(changes.len() - period + 1);
    let rsi_of = |avg_gain: f64, avg_loss: f64| {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    };
    out.push(rsi_of(avg_gain, avg_loss));

    for change in &changes[period..] {
        avg_gain = (avg_gain * (period - 1) as f64 + gain(change)) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss(change)) / period as f64;
        out.push(rsi_of(avg_gain, avg_loss));
    }
    out
}

/// MACD line, signal line, and histogram. All three series are as
/// long as the input; only the tail is meaningful once both EMAs
/// have converged.
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(data: &[f64], fast: usize, slow: usize, signal_period: usize) -> Macd {
    if fast == 0 || slow == 0 || signal_period == 0 || fast >= slow || data.len() < slow {
        return Macd {
            line: vec![],
            signal: vec![],
            histogram: vec![],
        };
    }

    let ema_fast = ema(data, fast);
    let ema_slow = ema(data, slow);
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let signal = ema(&line, signal_period);
    let histogram = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Macd {
        line,
        signal,
        histogram,
    }
}

/// Average True Range with Wilder smoothing
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period + 1 {
        return vec![];
    }

    let true_ranges: Vec<f64> = bars
        .windows(2)
        .map(|w| {
            let (prev, cur) = (&w[0], &w[1]);
            (cur.high - cur.low)
                .max((cur.high - prev.close).abs())
                .max((cur.low - prev.close).abs())
        })
        .collect();

    let mut out = Vec::with_capacity(true_ranges.len() - period + 1);
    let mut value = true_ranges[..period].iter().sum::<f64>() / period as f64;
    out.push(value);

    for tr in &true_ranges[period..] {
        value = (value * (period - 1) as f64 + tr) / period as f64;
        out.push(value);
    }
    out
}

/// Slow stochastic oscillator: raw %K over `k_period`, smoothed by a
/// `smooth_k`-period SMA into %K, with %D the `d_period`-period SMA
/// of %K. (9,3,3) is the standard slow parameterization.
pub struct Stochastic {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(bars: &[Bar], k_period: usize, smooth_k: usize, d_period: usize) -> Stochastic {
    if k_period == 0 || smooth_k == 0 || d_period == 0 || bars.len() < k_period {
        return Stochastic { k: vec![], d: vec![] };
    }

    let mut raw_k = Vec::with_capacity(bars.len() - k_period + 1);
    for window in bars.windows(k_period) {
        let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let close = window[k_period - 1].close;

        // Flat window: price sat exactly mid-range by convention
        raw_k.push(if highest == lowest {
            50.0
        } else {
            100.0 * (close - lowest) / (highest - lowest)
        });
    }

    let k = sma(&raw_k, smooth_k);
    let d = sma(&k, d_period);

    Stochastic { k, d }
}
