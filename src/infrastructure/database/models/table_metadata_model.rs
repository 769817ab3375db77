use diesel::prelude::*;
use serde::Serialize;

use crate::domain::entities::TableMetadata as DomainTableMetadata;
use crate::infrastructure::database::schema::table_metadata;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = table_metadata)]
#[diesel(primary_key(table_name))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TableMetadataModel {
    pub table_name: String,
    pub metadata: String,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = table_metadata)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewTableMetadataModel {
    pub table_name: String,
    pub metadata: String,
}

impl From<&DomainTableMetadata> for NewTableMetadataModel {
    fn from(domain_metadata: &DomainTableMetadata) -> Self {
        Self {
            table_name: domain_metadata.name().to_string(),
            metadata: domain_metadata.description().to_string(),
        }
    }
}

impl From<TableMetadataModel> for DomainTableMetadata {
    fn from(model: TableMetadataModel) -> Self {
        DomainTableMetadata::new(model.table_name, model.metadata)
    }
}
