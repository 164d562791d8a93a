use serde_json::Value;

/// Primary attachment of a candidate: the first entry of `cvs`, kept opaque.
pub fn primary_attachment(cvs: Option<&Value>) -> Option<Value> {
    cvs?.as_array()?.first().cloned()
}
