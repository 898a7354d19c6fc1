//! Macros for recording metrics.

/// Sets a gauge value, optionally with a label.
#[macro_export]
macro_rules! set {
    ($instrument:ident, $metric:path, $key:expr, $value:expr, $amount:expr) => {
        #[cfg(feature = "metrics")]
        metrics::$instrument!($metric, $key => $value).set($amount as f64);
    };
    ($instrument:ident, $metric:path, $amount:expr) => {
        #[cfg(feature = "metrics")]
        metrics::$instrument!($metric).set($amount as f64);
    };
}

/// Increments a counter, optionally with a label.
#[macro_export]
macro_rules! inc {
    ($instrument:ident, $metric:path, $key:expr, $value:expr) => {
        #[cfg(feature = "metrics")]
        metrics::$instrument!($metric, $key => $value).increment(1);
    };
    ($instrument:ident, $metric:path) => {
        #[cfg(feature = "metrics")]
        metrics::$instrument!($metric).increment(1);
    };
}
