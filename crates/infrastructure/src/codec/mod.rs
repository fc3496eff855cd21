//! Codecs and their equality checkers.
//!
//! The checkers are stateless and can be shared across concurrent tests.

mod bson;
mod json;
mod yaml;

use callcheck_application::CodecChecker;

pub use self::bson::BsonCodec;
pub use self::json::JsonCodec;
pub use self::yaml::YamlCodec;

/// Checks that bytes decoded as JSON equal an expected value.
pub static JSON_EQUALS: CodecChecker<JsonCodec> = CodecChecker::new(JsonCodec);

/// Checks that bytes decoded as YAML equal an expected value.
pub static YAML_EQUALS: CodecChecker<YamlCodec> = CodecChecker::new(YamlCodec);

/// Checks that bytes decoded as BSON equal an expected value.
pub static BSON_EQUALS: CodecChecker<BsonCodec> = CodecChecker::new(BsonCodec);
