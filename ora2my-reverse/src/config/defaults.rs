//! Default configuration values - single source of truth

/// Default include tables pattern (all tables)
pub const INCLUDE_TABLES: &str = "*";

/// Default exclude tables pattern (none)
pub const EXCLUDE_TABLES: &str = "";

/// Default output directory for the reverse, compatibility and log files
pub const OUTPUT_DIR: &str = ".";

/// Default worker pool size
pub const THREADS: usize = 4;

/// Table options appended to every CREATE TABLE
pub const TABLE_OPTION: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_bin";

/// Whether the first failed table stops the run
pub const FAIL_FAST: bool = false;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;

/// Default config file name looked up by `ReverseConfig::load`
pub const CONFIG_FILE_NAME: &str = "ora2my";

/// Environment variable prefix (ORA2MY_THREADS, ORA2MY_OUTPUT_DIR, ...)
pub const ENV_PREFIX: &str = "ORA2MY";

/// Last MySQL version that parses but ignores CHECK constraints
pub const MYSQL_CHECK_CONS_VERSION: &str = "8.0.15";

/// Separates the numeric version from build suffixes (`5.7.25-TiDB-v5.0.1`)
pub const MYSQL_VERSION_DELIMITER: &str = "-";
