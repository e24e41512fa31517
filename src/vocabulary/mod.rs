//! Skill and profile vocabularies loaded from static configuration

pub mod dictionary;
pub mod profiles;
pub mod store;

pub use dictionary::SkillDictionary;
pub use profiles::ProfileConfig;
pub use store::{Vocabulary, VocabularyStore};
