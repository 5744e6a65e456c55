use serde_json::Value;

/// One article record from the news provider.
///
/// Kept as raw JSON so every provider field (and any non-object entry) is
/// relayed to clients exactly as received.
pub type Article = Value;
