//! Execution seam for rendered statements.

use crate::error::FilterResult;
use crate::sql::RenderedSql;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients and transactions.
///
/// The composer never executes SQL itself; this is the boundary a [`RenderedSql`] is handed
/// across. Timeouts, retries and pooling belong to implementations of this trait.
///
/// [`RenderedSql`]: crate::RenderedSql
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = FilterResult<Vec<Row>>> + Send;

    /// Execute a query and return all rows, associating a tag for logging/observability.
    ///
    /// The default implementation ignores `tag` and calls [`GenericClient::query`].
    fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = FilterResult<Vec<Row>>> + Send {
        let _ = tag;
        self.query(sql, params)
    }

    /// Execute a rendered statement, through `query_tagged` when it carries a tag.
    ///
    /// Wrappers override this to see the statement together with its bound values.
    fn query_rendered(
        &self,
        rendered: &RenderedSql,
    ) -> impl std::future::Future<Output = FilterResult<Vec<Row>>> + Send {
        async move {
            let params = rendered.params_ref();
            match rendered.tag() {
                Some(tag) => self.query_tagged(tag, &rendered.sql, &params).await,
                None => self.query(&rendered.sql, &params).await,
            }
        }
    }
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<Vec<Row>> {
        Ok(tokio_postgres::Client::query(self, sql, params).await?)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<Vec<Row>> {
        Ok(tokio_postgres::Transaction::query(self, sql, params).await?)
    }
}

impl<C: GenericClient> GenericClient for &C {
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = FilterResult<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }

    fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = FilterResult<Vec<Row>>> + Send {
        (**self).query_tagged(tag, sql, params)
    }

    fn query_rendered(
        &self,
        rendered: &RenderedSql,
    ) -> impl std::future::Future<Output = FilterResult<Vec<Row>>> + Send {
        (**self).query_rendered(rendered)
    }
}
