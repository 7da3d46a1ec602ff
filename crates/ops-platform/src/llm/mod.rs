mod openai_compat;

pub use openai_compat::{message_to_json, OpenAiCompatProvider};
