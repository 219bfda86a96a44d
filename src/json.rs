//! Minimal JSON inspection used by document inserts.

use std::fmt;

use serde::Deserializer as _;
use serde::de::{IgnoredAny, MapAccess, Visitor};

/// Key holding a document's identifier.
pub const ID_MEMBER: &str = "_id";

/// Whether `text` is a JSON object with `_id` among its top-level keys.
///
/// Keys are read in order and the scan stops at the first `_id`; member
/// values before it are skipped, not decoded, and nothing after it is read.
/// Anything that is not a JSON object reports `false` and is left for the
/// server to reject.
pub fn is_id_in_json(text: &str) -> bool {
    let mut found = false;
    // Stopping early leaves the map unfinished, so the result is an error
    // whenever `_id` was found.
    let _ = serde_json::Deserializer::from_str(text).deserialize_map(IdMemberVisitor(&mut found));
    found
}

struct IdMemberVisitor<'f>(&'f mut bool);

impl<'de> Visitor<'de> for IdMemberVisitor<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let found = self.0;
        while let Some(key) = map.next_key::<String>()? {
            if key == ID_MEMBER {
                *found = true;
                return Ok(());
            }
            map.next_value::<IgnoredAny>()?;
        }
        Ok(())
    }
}
