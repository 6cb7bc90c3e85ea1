use crate::Site;

#[derive(sqlx::FromRow)]
pub(crate) struct SiteRow {
    pub(crate) exhibition: String,
    pub(crate) cors: String,
}
impl From<SiteRow> for Site {
    fn from(row: SiteRow) -> Self {
        Self {
            exhibition: row.exhibition,
            cors: row.cors,
        }
    }
}
