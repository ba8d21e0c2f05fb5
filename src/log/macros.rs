//! Logging macros
//!
//! Linux kernel-style `pr_*` macros plus `dev_*` variants that prefix the
//! message with a device name, the way `dev_info(dev, ...)` does.
//!
//! # Usage
//!
//! ```ignore
//! use pcdev::{dev_err, pr_info};
//!
//! pr_info!("pcd platform driver loaded");
//! dev_err!("pcdev-A1X", "cannot allocate {} bytes for device buffer", size);
//! ```
//!
//! # Macro List
//!
//! - `pr_emerg!` / `pr_alert!` / `pr_crit!` - Emergency, alert and critical levels
//! - `pr_err!` / `dev_err!` - Error level (error conditions)
//! - `pr_warn!` / `dev_warn!` - Warning level (warning conditions)
//! - `pr_notice!` - Notice level (normal but significant)
//! - `pr_info!` / `dev_info!` - Info level (informational messages)
//! - `pr_debug!` - Debug level (debug messages)
//!
//! The global level is checked before formatting, so disabled levels never
//! evaluate their arguments.

/// Internal implementation macro with level filtering
#[doc(hidden)]
#[macro_export]
macro_rules! __log_impl_filtered {
    ($level:expr, $args:expr) => {
        if $crate::log::is_level_enabled($level) {
            $crate::log::log_impl($level, $args);
        }
    };
}

/// Logs a message at the EMERGENCY level
#[macro_export]
macro_rules! pr_emerg {
    ($($arg:tt)*) => {
        $crate::__log_impl_filtered!($crate::log::LogLevel::Emergency, format_args!($($arg)*))
    }
}

/// Logs a message at the ALERT level
#[macro_export]
macro_rules! pr_alert {
    ($($arg:tt)*) => {
        $crate::__log_impl_filtered!($crate::log::LogLevel::Alert, format_args!($($arg)*))
    }
}

/// Logs a message at the CRITICAL level
#[macro_export]
macro_rules! pr_crit {
    ($($arg:tt)*) => {
        $crate::__log_impl_filtered!($crate::log::LogLevel::Critical, format_args!($($arg)*))
    }
}

/// Logs a message at the ERROR level
#[macro_export]
macro_rules! pr_err {
    ($($arg:tt)*) => {
        $crate::__log_impl_filtered!($crate::log::LogLevel::Error, format_args!($($arg)*))
    }
}

/// Logs a message at the WARNING level
#[macro_export]
macro_rules! pr_warn {
    ($($arg:tt)*) => {
        $crate::__log_impl_filtered!($crate::log::LogLevel::Warning, format_args!($($arg)*))
    }
}

/// Logs a message at the NOTICE level
#[macro_export]
macro_rules! pr_notice {
    ($($arg:tt)*) => {
        $crate::__log_impl_filtered!($crate::log::LogLevel::Notice, format_args!($($arg)*))
    }
}

/// Logs a message at the INFO level
#[macro_export]
macro_rules! pr_info {
    ($($arg:tt)*) => {
        $crate::__log_impl_filtered!($crate::log::LogLevel::Info, format_args!($($arg)*))
    }
}

/// Logs a message at the DEBUG level
///
/// Used for per-call I/O detail (requested counts, file positions).
#[macro_export]
macro_rules! pr_debug {
    ($($arg:tt)*) => {
        $crate::__log_impl_filtered!($crate::log::LogLevel::Debug, format_args!($($arg)*))
    }
}

/// Logs `"<dev>: <message>"` at the ERROR level
#[macro_export]
macro_rules! dev_err {
    ($dev:expr, $fmt:literal $($arg:tt)*) => {
        $crate::pr_err!(concat!("{}: ", $fmt), $dev $($arg)*)
    }
}

/// Logs `"<dev>: <message>"` at the WARNING level
#[macro_export]
macro_rules! dev_warn {
    ($dev:expr, $fmt:literal $($arg:tt)*) => {
        $crate::pr_warn!(concat!("{}: ", $fmt), $dev $($arg)*)
    }
}

/// Logs `"<dev>: <message>"` at the INFO level
#[macro_export]
macro_rules! dev_info {
    ($dev:expr, $fmt:literal $($arg:tt)*) => {
        $crate::pr_info!(concat!("{}: ", $fmt), $dev $($arg)*)
    }
}
