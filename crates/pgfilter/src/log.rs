//! `tracing`-based SQL logging.
//!
//! Enable via the crate feature: `pgfilter = { features = ["tracing"] }` (on by default).

use crate::client::GenericClient;
use crate::error::FilterResult;
use crate::sql::RenderedSql;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Emits the SQL that is about to run on the `pgfilter.sql` target.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Log [`RenderedSql::debug_sql`] instead of the placeholder form.
    ///
    /// Bound values end up in logs; leave this off where they may be sensitive.
    pub inline_values: bool,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            inline_values: false,
        }
    }
}

impl SqlLogger {
    /// Create a new logger with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Substitute bound values into logged SQL.
    pub fn inline_values(mut self, inline: bool) -> Self {
        self.inline_values = inline;
        self
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    /// Log a rendered statement, honoring [`inline_values`](SqlLogger::inline_values).
    pub fn log_rendered(&self, rendered: &RenderedSql) {
        let sql = if self.inline_values {
            rendered.debug_sql()
        } else {
            rendered.sql.clone()
        };
        self.emit(rendered.tag(), &sql, rendered.params.len());
    }

    /// Log a statement in placeholder form.
    pub fn log_statement(&self, tag: Option<&str>, sql: &str, param_count: usize) {
        self.emit(tag, sql, param_count);
    }

    fn emit(&self, tag: Option<&str>, sql: &str, param_count: usize) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(sql);
        let tag = tag.unwrap_or("-");
        emit_at_level!(
            self.level,
            target: "pgfilter.sql",
            tag,
            param_count,
            sql = %sql,
        );
    }
}

/// A [`GenericClient`] wrapper that logs every statement before running it.
#[derive(Debug, Clone)]
pub struct LoggedClient<C> {
    client: C,
    logger: SqlLogger,
}

impl<C: GenericClient> LoggedClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            logger: SqlLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: SqlLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

impl<C: GenericClient> GenericClient for LoggedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<Vec<Row>> {
        self.logger.log_statement(None, sql, params.len());
        self.client.query(sql, params).await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> FilterResult<Vec<Row>> {
        self.logger.log_statement(Some(tag), sql, params.len());
        self.client.query_tagged(tag, sql, params).await
    }

    async fn query_rendered(&self, rendered: &RenderedSql) -> FilterResult<Vec<Row>> {
        self.logger.log_rendered(rendered);
        let params = rendered.params_ref();
        match rendered.tag() {
            Some(tag) => self.client.query_tagged(tag, &rendered.sql, &params).await,
            None => self.client.query(&rendered.sql, &params).await,
        }
    }
}
