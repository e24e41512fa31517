//! Process-lifetime vocabulary state with an explicit reload entry point

use crate::config::VocabularyConfig;
use crate::error::{AnalyzerError, Result};
use crate::extraction::engine::SkillEngine;
use crate::vocabulary::dictionary::SkillDictionary;
use crate::vocabulary::profiles::ProfileConfig;
use log::{error, info};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Immutable vocabulary bundle. The skill engine is compiled when the
/// bundle is built so a bad dictionary fails here and never mid-scan.
#[derive(Debug)]
pub struct Vocabulary {
    dictionary: SkillDictionary,
    profiles: ProfileConfig,
    engine: Arc<SkillEngine>,
}

impl Vocabulary {
    pub fn new(dictionary: SkillDictionary, profiles: ProfileConfig) -> Result<Self> {
        let engine = SkillEngine::build(&dictionary)?;
        Ok(Self {
            dictionary,
            profiles,
            engine: Arc::new(engine),
        })
    }

    pub fn load(config: &VocabularyConfig) -> Result<Self> {
        let dictionary = SkillDictionary::load(&config.skill_keywords_path)?;
        let profiles = ProfileConfig::load(&config.profile_config_path)?;
        Self::new(dictionary, profiles)
    }

    pub fn dictionary(&self) -> &SkillDictionary {
        &self.dictionary
    }

    pub fn profiles(&self) -> &ProfileConfig {
        &self.profiles
    }

    pub fn engine(&self) -> Arc<SkillEngine> {
        Arc::clone(&self.engine)
    }

    pub fn canonical_skills(&self) -> Vec<String> {
        self.dictionary.canonical_names()
    }

    pub fn canonical_levels(&self) -> Vec<String> {
        self.profiles.canonical_levels()
    }

    pub fn canonical_profiles(&self) -> &[String] {
        &self.profiles.profiles
    }
}

/// Shared handle to the active vocabulary.
#[derive(Clone)]
pub struct VocabularyStore {
    current: Arc<RwLock<Arc<Vocabulary>>>,
    source: Option<(PathBuf, PathBuf)>,
}

impl VocabularyStore {
    pub fn load(config: &VocabularyConfig) -> Result<Self> {
        let vocabulary = Vocabulary::load(config)?;
        Ok(Self {
            current: Arc::new(RwLock::new(Arc::new(vocabulary))),
            source: Some((
                config.skill_keywords_path.clone(),
                config.profile_config_path.clone(),
            )),
        })
    }

    /// Store over a fixed vocabulary with no backing files.
    pub fn fixed(vocabulary: Vocabulary) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(vocabulary))),
            source: None,
        }
    }

    pub fn current(&self) -> Arc<Vocabulary> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Re-read the backing files. On failure the previous vocabulary stays active.
    pub fn reload(&self) -> Result<Arc<Vocabulary>> {
        let (skills_path, profiles_path) = self.source.clone().ok_or_else(|| {
            AnalyzerError::Configuration("Vocabulary has no backing files to reload".to_string())
        })?;

        let config = VocabularyConfig {
            skill_keywords_path: skills_path,
            profile_config_path: profiles_path,
        };

        match Vocabulary::load(&config) {
            Ok(vocabulary) => {
                let vocabulary = Arc::new(vocabulary);
                self.swap(Arc::clone(&vocabulary));
                info!("Vocabulary reloaded: {} canonical skills", vocabulary.engine.len());
                Ok(vocabulary)
            }
            Err(e) => {
                error!("Vocabulary reload failed, keeping previous vocabulary: {}", e);
                Err(e)
            }
        }
    }

    pub fn replace(&self, vocabulary: Vocabulary) {
        self.swap(Arc::new(vocabulary));
    }

    fn swap(&self, vocabulary: Arc<Vocabulary>) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = vocabulary;
    }
}
