use crate::ExhibitionRecord;
use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use time::UtcDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct RecordRow {
    pub(crate) commit_time: i64,
    pub(crate) pathname: String,
    pub(crate) content_hash: String,
    pub(crate) exhibition: String,
    pub(crate) cors: String,
}
impl TryFrom<RecordRow> for ExhibitionRecord {
    type Error = Error;
    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            exhibition: row.exhibition,
            commit_time: UtcDateTime::from_unix_timestamp(row.commit_time)
                .or_raise(|| ErrorKind::InvalidData("commit time"))?,
            pathname: row.pathname,
            content_hash: row.content_hash,
            cors: row.cors,
        })
    }
}
