//! PostgreSQL adapter implementing the storage traits

use crate::adapters::database::traits::{AddressCache, StagingStore};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    escape_like, insert_sql, record_from_row, record_values, select_sql,
};
use crate::domain::{
    AddressInfo, BpaError, Competence, Municipality, PostalCode, ProductionRecord, Result,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

/// PostgreSQL implementation of [`StagingStore`] and [`AddressCache`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

fn database_error(action: &str) -> impl Fn(tokio_postgres::Error) -> BpaError + '_ {
    move |e| BpaError::Database(format!("{action}: {e}"))
}

fn address_from_row(row: &Row) -> Result<AddressInfo> {
    let text = |idx: usize| -> Result<String> {
        row.try_get::<_, Option<String>>(idx)
            .map(Option::unwrap_or_default)
            .map_err(database_error("Failed to read address cache row"))
    };
    Ok(AddressInfo::new(text(0)?, text(1)?, text(2)?, text(3)?))
}

#[async_trait]
impl StagingStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn load_records(&self) -> Result<Vec<ProductionRecord>> {
        let rows = self.client.query(&select_sql(), &[]).await?;
        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(rows = records.len(), "Loaded staged records");
        Ok(records)
    }

    async fn replace_records(&self, records: &[ProductionRecord]) -> Result<()> {
        let mut connection = self.client.get_connection().await?;
        let transaction = connection
            .transaction()
            .await
            .map_err(database_error("Failed to open transaction"))?;

        let deleted = transaction
            .execute("DELETE FROM tb_bpa", &[])
            .await
            .map_err(database_error("Failed to clear staged records"))?;

        let statement = transaction
            .prepare(&insert_sql())
            .await
            .map_err(database_error("Failed to prepare insert"))?;

        for record in records {
            let values: Vec<Option<&str>> = record_values(record)
                .iter()
                .map(|v| (!v.is_empty()).then_some(*v))
                .collect();
            let params: Vec<&(dyn ToSql + Sync)> =
                values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

            transaction
                .execute(&statement, &params)
                .await
                .map_err(database_error("Failed to insert staged record"))?;
        }

        transaction
            .commit()
            .await
            .map_err(database_error("Failed to commit staged records"))?;

        tracing::info!(
            deleted,
            inserted = records.len(),
            "Replaced staged records"
        );
        Ok(())
    }

    async fn competence(&self) -> Result<Option<Competence>> {
        let rows = self
            .client
            .query(
                "SELECT MAX(TRIM(prd_cmp)) FROM tb_bpa WHERE TRIM(COALESCE(prd_cmp, '')) <> ''",
                &[],
            )
            .await?;

        // MAX over no rows yields a single NULL
        let value: Option<String> = match rows.first() {
            Some(row) => row
                .try_get(0)
                .map_err(database_error("Failed to read competence"))?,
            None => None,
        };
        value
            .map(|v| Competence::new(v.trim()).map_err(BpaError::Validation))
            .transpose()
    }
}

#[async_trait]
impl AddressCache for PostgreSQLAdapter {
    async fn find_by_postal_code(&self, code: &PostalCode) -> Result<Option<AddressInfo>> {
        let rows = self
            .client
            .query(
                "SELECT logradouro, bairro, cep, ibge FROM correios_ceps WHERE cep = $1 LIMIT 1",
                &[&code.as_str()],
            )
            .await?;

        rows.first().map(address_from_row).transpose()
    }

    async fn find_by_street(
        &self,
        street: &str,
        municipality_code: &str,
        state: &str,
    ) -> Result<Option<AddressInfo>> {
        let street_pattern = format!("%{}%", escape_like(street.trim()));
        let municipality_pattern = format!("{}%", escape_like(municipality_code));

        let rows = self
            .client
            .query(
                "SELECT logradouro, bairro, cep, ibge FROM correios_ceps \
                 WHERE logradouro ILIKE $1 AND ibge LIKE $2 AND uf = $3 LIMIT 1",
                &[&street_pattern, &municipality_pattern, &state],
            )
            .await?;

        rows.first().map(address_from_row).transpose()
    }

    async fn find_municipality(&self, code_prefix: &str) -> Result<Option<Municipality>> {
        let pattern = format!("{}%", escape_like(code_prefix));
        let rows = self
            .client
            .query(
                "SELECT municipio, uf FROM tb_ibge WHERE ibge LIKE $1 LIMIT 1",
                &[&pattern],
            )
            .await?;

        rows.first()
            .map(|row| {
                Ok(Municipality {
                    name: row
                        .try_get(0)
                        .map_err(database_error("Failed to read municipality"))?,
                    state: row
                        .try_get(1)
                        .map_err(database_error("Failed to read municipality"))?,
                })
            })
            .transpose()
    }
}
