mod record;
mod site;

pub(crate) use self::record::RecordRow;
pub(crate) use self::site::SiteRow;
