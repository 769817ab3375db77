use diesel::prelude::*;
use serde::Serialize;
use url::Url;

use crate::domain::entities::SampleQuery as DomainSampleQuery;
use crate::infrastructure::database::schema::sample_queries;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = sample_queries)]
#[diesel(primary_key(query_name))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SampleQueryModel {
    pub query_name: String,
    pub query: String,
    pub source_url: Option<String>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = sample_queries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewSampleQueryModel {
    pub query_name: String,
    pub query: String,
    pub source_url: Option<String>,
}

impl From<&DomainSampleQuery> for NewSampleQueryModel {
    fn from(domain_query: &DomainSampleQuery) -> Self {
        Self {
            query_name: domain_query.name().to_string(),
            query: domain_query.sql().to_string(),
            source_url: domain_query.source_url().map(|u| u.to_string()),
        }
    }
}

impl TryFrom<SampleQueryModel> for DomainSampleQuery {
    type Error = String;

    fn try_from(model: SampleQueryModel) -> Result<Self, Self::Error> {
        let source_url = match model.source_url {
            Some(raw) => Some(
                Url::parse(&raw).map_err(|e| format!("Invalid source URL {}: {}", raw, e))?,
            ),
            None => None,
        };

        Ok(DomainSampleQuery::new(
            model.query_name,
            model.query,
            source_url,
        ))
    }
}
