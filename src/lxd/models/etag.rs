use std::fmt;

/// Opaque version marker returned alongside a record; submitting it back with
/// an update makes the remote reject the update if the record changed in the
/// meantime.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LxdEtag(String);

impl LxdEtag {
    pub fn new(etag: impl AsRef<str>) -> Self {
        Self(etag.as_ref().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LxdEtag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
